//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "server.port must be > 0".into(),
            ));
        }
        if self.limits.max_file_size_mb == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_file_size_mb must be > 0".into(),
            ));
        }
        if self.limits.max_image_dimension == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_image_dimension must be > 0".into(),
            ));
        }
        if self.limits.decode_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.decode_timeout_ms must be > 0".into(),
            ));
        }
        if self.limits.caption_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.caption_timeout_ms must be > 0".into(),
            ));
        }
        if self.extractor.image_size == 0 {
            return Err(ConfigError::ValidationError(
                "extractor.image_size must be > 0".into(),
            ));
        }
        if self.decoder.max_length == 0 {
            return Err(ConfigError::ValidationError(
                "decoder.max_length must be > 0".into(),
            ));
        }
        if self.decoder.start_token.trim().is_empty() || self.decoder.end_token.trim().is_empty()
        {
            return Err(ConfigError::ValidationError(
                "decoder.start_token and decoder.end_token must not be empty".into(),
            ));
        }
        if self.decoder.start_token == self.decoder.end_token {
            return Err(ConfigError::ValidationError(
                "decoder.start_token and decoder.end_token must differ".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_passes_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_max_length() {
        let mut config = Config::default();
        config.decoder.max_length = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_length"));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.limits.caption_timeout_ms = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("caption_timeout_ms"));
    }

    #[test]
    fn test_validate_rejects_identical_markers() {
        let mut config = Config::default();
        config.decoder.end_token = "startseq".into();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("must differ"));
    }

    #[test]
    fn test_validate_rejects_blank_marker() {
        let mut config = Config::default();
        config.decoder.start_token = "  ".into();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("must not be empty"));
    }
}
