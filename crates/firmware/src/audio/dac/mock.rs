//! Mock DAC for host-side testing
//!
//! Implements [`platform::AudioCodec`] without any hardware dependency.
//! Records all calls for assertion in tests.

use platform::{AudioCodec, OutputLevel, StreamConfig};

/// Error injected by [`MockCodec::fail_configure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockBusError;

/// Mock codec: records all calls for test assertions.
#[derive(Debug, Default)]
pub struct MockCodec {
    /// Number of [`AudioCodec::configure`] calls
    pub configure_calls: u32,
    /// Config from the last successful `configure`
    pub config: Option<StreamConfig>,
    /// Last level set via [`AudioCodec::set_output_level`]
    pub level: Option<OutputLevel>,
    /// Whether the output stage is enabled (`start_output` not followed by `stop_output`)
    pub output_enabled: bool,
    /// Make the next `configure` fail with [`MockBusError`]
    pub fail_configure: bool,
}

impl MockCodec {
    /// Create a new mock codec with no recorded calls.
    pub fn new() -> Self {
        Self::default()
    }
}

impl AudioCodec for MockCodec {
    type Error = MockBusError;

    async fn configure(&mut self, config: &StreamConfig) -> Result<(), Self::Error> {
        self.configure_calls = self.configure_calls.saturating_add(1);
        if core::mem::take(&mut self.fail_configure) {
            return Err(MockBusError);
        }
        self.config = Some(*config);
        self.output_enabled = false;
        Ok(())
    }

    async fn set_output_level(&mut self, level: OutputLevel) -> Result<(), Self::Error> {
        self.level = Some(level);
        Ok(())
    }

    async fn start_output(&mut self) -> Result<(), Self::Error> {
        self.output_enabled = true;
        Ok(())
    }

    async fn stop_output(&mut self) -> Result<(), Self::Error> {
        self.output_enabled = false;
        Ok(())
    }
}
