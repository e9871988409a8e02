//! Error types for option access

use thiserror::Error;

use crate::options::{ConfigOption, ValueDomain};

/// Result type for SoundSetter operations
pub type Result<T> = std::result::Result<T, SoundSetterError>;

/// Error type for option resolution, validation and command handling
#[derive(Debug, Error)]
pub enum SoundSetterError {
    /// A UI-space code that is not part of the option table
    #[error("unknown option identifier: {0}")]
    UnknownIdentifier(u64),

    /// The UI-space and config-space tables disagree
    #[error("option table mismatch: {0}")]
    TableMismatch(String),

    /// The configuration structure has not been resolved yet
    #[error("option {0:?} is unavailable")]
    TargetUnavailable(ConfigOption),

    /// A caller-supplied value outside a bounded domain
    #[error("value {value} is outside {min}..={max}")]
    OutOfRangeValue { value: i64, min: i64, max: i64 },

    /// A typed option bound to a slot of another value domain
    #[error("option {option:?} does not hold a {expected:?} value")]
    DomainMismatch {
        option: ConfigOption,
        expected: ValueDomain,
    },

    /// A raw value that does not decode into the option's domain
    #[error("raw value {raw} does not decode to a known {domain}")]
    DecodeMismatch { domain: &'static str, raw: u64 },

    /// A chat command that could not be parsed
    #[error("invalid command: {0}")]
    InvalidCommand(String),

    /// Plugin preferences could not be (de)serialized
    #[error("plugin config: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_unknown_identifier() {
        let err = SoundSetterError::UnknownIdentifier(7);
        assert_eq!(err.to_string(), "unknown option identifier: 7");
    }

    #[test]
    fn test_display_out_of_range() {
        let err = SoundSetterError::OutOfRangeValue { value: 150, min: 0, max: 100 };
        assert!(err.to_string().contains("150"));
        assert!(err.to_string().contains("0..=100"));
    }

    #[test]
    fn test_display_target_unavailable() {
        let err = SoundSetterError::TargetUnavailable(ConfigOption::Master);
        assert!(err.to_string().contains("Master"));
    }

    #[test]
    fn test_display_domain_mismatch() {
        let err = SoundSetterError::DomainMismatch {
            option: ConfigOption::Master,
            expected: ValueDomain::Toggle,
        };
        assert_eq!(err.to_string(), "option Master does not hold a Toggle value");
    }

    #[test]
    fn test_json_error_converts() {
        let json_err = serde_json::from_str::<u32>("not json").unwrap_err();
        let err: SoundSetterError = json_err.into();
        assert!(matches!(err, SoundSetterError::Json(_)));
    }
}
