//! ES9038Q2M DAC driver module (ESS Technology)
//!
//! Control only: the audio stream itself reaches the chip over I²S from the
//! SAI peripheral and never passes through this driver.

pub mod registers;

mod driver;

pub use driver::{Es9038q2mDriver, Es9038q2mError};
