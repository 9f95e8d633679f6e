use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    /// Characters outside the nucleotide alphabet, or an empty template/primer
    InvalidSequence,
    /// A primer cannot reach the homology requirement on the template
    NoAnnealing,
    /// Unknown table/salt selector or an unusable concentration
    InvalidConfiguration,
    Io,
}

#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("{code:?}: {message}")]
pub struct PcrError {
    pub code: ErrorCode,
    pub message: String,
}

impl PcrError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn invalid_sequence(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidSequence, message)
    }

    pub fn no_annealing(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NoAnnealing, message)
    }

    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidConfiguration, message)
    }
}

impl From<std::io::Error> for PcrError {
    fn from(err: std::io::Error) -> Self {
        Self::new(ErrorCode::Io, err.to_string())
    }
}

impl From<serde_json::Error> for PcrError {
    fn from(err: serde_json::Error) -> Self {
        Self::invalid_configuration(err.to_string())
    }
}

pub type PcrResult<T> = Result<T, PcrError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_code() {
        let err = PcrError::no_annealing("Primer does not anneal");
        assert_eq!(err.to_string(), "NoAnnealing: Primer does not anneal");
    }

    #[test]
    fn test_json_error_is_configuration_error() {
        let err: PcrError = serde_json::from_str::<u8>("nope").unwrap_err().into();
        assert_eq!(err.code, ErrorCode::InvalidConfiguration);
    }
}
