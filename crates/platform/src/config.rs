//! Application configuration and constants
//!
//! Central naming used by the boot banner and the host emulator. All branding
//! should reference these constants rather than hardcoding values.

/// The application name
pub const APP_NAME: &str = "Selcall Tone Generator";

/// Board the firmware targets
pub const BOARD_NAME: &str = "STM32H743ZI + ES9038Q2M";

/// Application version (synchronized with Cargo.toml)
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Development mode banner
pub const fn dev_banner() -> &'static str {
    "Selcall Tone Generator - Host Emulator"
}
