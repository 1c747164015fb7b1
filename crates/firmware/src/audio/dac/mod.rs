//! DAC (Digital-to-Analogue Converter) control drivers
//!
//! - `es9038q2m` - ESS ES9038Q2M over async I2C (any `embedded_hal_async` bus)
//! - `mock` - In-process mock for host tests (always available)
//!
//! Both implement [`platform::AudioCodec`].

pub mod es9038q2m;
pub mod mock;
