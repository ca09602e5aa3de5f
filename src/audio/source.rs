use crate::defaults;
use crate::error::{LivenoteError, Result};

/// Trait for audio source devices.
///
/// This trait allows swapping implementations (real audio device vs mock).
pub trait AudioSource: Send + Sync {
    /// Start capturing audio from the source.
    fn start(&mut self) -> Result<()>;

    /// Stop capturing audio from the source.
    fn stop(&mut self) -> Result<()>;

    /// Read and drain the samples captured since the last call.
    ///
    /// # Returns
    /// Vector of 16-bit PCM audio samples, possibly empty.
    fn read_samples(&mut self) -> Result<Vec<i16>>;

    /// Human-readable name of the underlying device, for the status view.
    fn device_name(&self) -> String {
        "unknown".to_string()
    }
}

/// Configuration for audio source initialization
#[derive(Debug, Clone)]
pub struct AudioSourceConfig {
    pub sample_rate: u32,
}

impl Default for AudioSourceConfig {
    fn default() -> Self {
        Self {
            sample_rate: defaults::SAMPLE_RATE,
        }
    }
}

/// Mock audio source for testing
#[derive(Debug, Clone)]
pub struct MockAudioSource {
    is_started: bool,
    samples: Vec<i16>,
    should_fail_start: bool,
    should_fail_read: bool,
    error_message: String,
    drain_once: bool,
    drained: bool,
}

impl MockAudioSource {
    /// Create a new mock audio source with default settings
    pub fn new() -> Self {
        Self {
            is_started: false,
            samples: vec![0i16; 160],
            should_fail_start: false,
            should_fail_read: false,
            error_message: "mock audio error".to_string(),
            drain_once: false,
            drained: false,
        }
    }

    /// Configure the mock to return specific samples
    pub fn with_samples(mut self, samples: Vec<i16>) -> Self {
        self.samples = samples;
        self
    }

    /// Configure the mock to return its samples only on the first read
    pub fn with_single_read(mut self) -> Self {
        self.drain_once = true;
        self
    }

    /// Configure the mock to fail on start
    pub fn with_start_failure(mut self) -> Self {
        self.should_fail_start = true;
        self
    }

    /// Configure the mock to fail on read
    pub fn with_read_failure(mut self) -> Self {
        self.should_fail_read = true;
        self
    }

    /// Configure the error message for failures
    pub fn with_error_message(mut self, message: &str) -> Self {
        self.error_message = message.to_string();
        self
    }

    /// Check if the audio source is started
    pub fn is_started(&self) -> bool {
        self.is_started
    }
}

impl Default for MockAudioSource {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioSource for MockAudioSource {
    fn start(&mut self) -> Result<()> {
        if self.should_fail_start {
            Err(LivenoteError::AudioCapture {
                message: self.error_message.clone(),
            })
        } else {
            self.is_started = true;
            Ok(())
        }
    }

    fn stop(&mut self) -> Result<()> {
        self.is_started = false;
        Ok(())
    }

    fn read_samples(&mut self) -> Result<Vec<i16>> {
        if self.should_fail_read {
            return Err(LivenoteError::AudioCapture {
                message: self.error_message.clone(),
            });
        }
        if self.drain_once {
            if self.drained {
                return Ok(Vec::new());
            }
            self.drained = true;
        }
        Ok(self.samples.clone())
    }

    fn device_name(&self) -> String {
        "mock".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_returns_configured_samples() {
        let test_samples = vec![100i16, 200, 300, 400, 500];
        let mut source = MockAudioSource::new().with_samples(test_samples.clone());

        assert_eq!(source.read_samples().unwrap(), test_samples);
    }

    #[test]
    fn test_mock_single_read_drains() {
        let mut source = MockAudioSource::new()
            .with_samples(vec![1i16, 2, 3])
            .with_single_read();

        assert_eq!(source.read_samples().unwrap(), vec![1i16, 2, 3]);
        assert!(source.read_samples().unwrap().is_empty());
    }

    #[test]
    fn test_mock_read_failure() {
        let mut source = MockAudioSource::new()
            .with_read_failure()
            .with_error_message("buffer overflow");

        match source.read_samples() {
            Err(LivenoteError::AudioCapture { message }) => {
                assert_eq!(message, "buffer overflow");
            }
            _ => panic!("Expected AudioCapture error"),
        }
    }

    #[test]
    fn test_mock_start_stop_state() {
        let mut source = MockAudioSource::new();

        assert!(!source.is_started());
        source.start().unwrap();
        assert!(source.is_started());
        source.stop().unwrap();
        assert!(!source.is_started());
    }

    #[test]
    fn test_mock_start_failure() {
        let mut source = MockAudioSource::new().with_start_failure();

        assert!(source.start().is_err());
        assert!(!source.is_started());
    }

    #[test]
    fn test_trait_is_object_safe() {
        let mut source: Box<dyn AudioSource> =
            Box::new(MockAudioSource::new().with_samples(vec![1i16, 2, 3]));

        assert!(source.start().is_ok());
        assert_eq!(source.read_samples().unwrap(), vec![1i16, 2, 3]);
        assert_eq!(source.device_name(), "mock");
        assert!(source.stop().is_ok());
    }

    #[test]
    fn test_audio_source_config_default() {
        let config = AudioSourceConfig::default();
        assert_eq!(config.sample_rate, 16000);
    }
}
