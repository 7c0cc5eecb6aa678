use super::models::{Config, NegotiationConfig};
use crate::mediatype::{parse_accept_header, parse_media_type};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Unsupported charset '{charset}', responses are encoded as UTF-8")]
    UnsupportedCharset { charset: String },

    #[error("Default Accept header '{value}' does not parse")]
    InvalidDefaultAccept { value: String },

    #[error("stream_chunk_size must be positive")]
    InvalidChunkSize,

    #[error("Format alias name must not be empty")]
    EmptyFormatName,

    #[error("Format alias '{name}' lists no media types")]
    EmptyFormat { name: String },

    #[error("Format alias '{name}' has malformed media type '{media_type}'")]
    InvalidFormatMediaType { name: String, media_type: String },
}

/// Validate the entire configuration
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    validate_negotiation(&config.negotiation)?;
    validate_formats(&config.negotiation)?;
    Ok(())
}

fn validate_negotiation(negotiation: &NegotiationConfig) -> Result<(), ValidationError> {
    let charset = negotiation.charset.trim();
    if !charset.eq_ignore_ascii_case("utf-8") && !charset.eq_ignore_ascii_case("utf8") {
        return Err(ValidationError::UnsupportedCharset {
            charset: negotiation.charset.clone(),
        });
    }

    if parse_accept_header(&negotiation.default_accept).is_err() {
        return Err(ValidationError::InvalidDefaultAccept {
            value: negotiation.default_accept.clone(),
        });
    }

    if negotiation.stream_chunk_size == 0 {
        return Err(ValidationError::InvalidChunkSize);
    }

    Ok(())
}

fn validate_formats(negotiation: &NegotiationConfig) -> Result<(), ValidationError> {
    for (name, media_types) in &negotiation.formats {
        if name.trim().is_empty() {
            return Err(ValidationError::EmptyFormatName);
        }

        if media_types.is_empty() {
            return Err(ValidationError::EmptyFormat { name: name.clone() });
        }

        for media_type in media_types {
            if parse_media_type(media_type).is_err() {
                return Err(ValidationError::InvalidFormatMediaType {
                    name: name.clone(),
                    media_type: media_type.clone(),
                });
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_charset_must_be_utf8() {
        let mut config = Config::default();
        config.negotiation.charset = "utf8".to_string();
        assert!(validate(&config).is_ok());

        config.negotiation.charset = "latin-1".to_string();
        assert!(matches!(
            validate(&config),
            Err(ValidationError::UnsupportedCharset { .. })
        ));
    }

    #[test]
    fn test_default_accept_must_parse() {
        let mut config = Config::default();
        config.negotiation.default_accept = "html".to_string();
        assert!(matches!(
            validate(&config),
            Err(ValidationError::InvalidDefaultAccept { .. })
        ));
    }

    #[test]
    fn test_zero_chunk_size() {
        let mut config = Config::default();
        config.negotiation.stream_chunk_size = 0;
        assert!(matches!(
            validate(&config),
            Err(ValidationError::InvalidChunkSize)
        ));
    }

    #[test]
    fn test_format_aliases() {
        let mut config = Config::default();
        config
            .negotiation
            .formats
            .insert("yaml".to_string(), vec!["application/yaml".to_string()]);
        assert!(validate(&config).is_ok());

        config.negotiation.formats.insert("csv".to_string(), vec![]);
        assert!(matches!(
            validate(&config),
            Err(ValidationError::EmptyFormat { ref name }) if name == "csv"
        ));

        config
            .negotiation
            .formats
            .insert("csv".to_string(), vec!["csv".to_string()]);
        assert!(matches!(
            validate(&config),
            Err(ValidationError::InvalidFormatMediaType { .. })
        ));
    }
}
