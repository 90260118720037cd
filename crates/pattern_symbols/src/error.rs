//! Error types and result alias for the crate.
//!
//! This module defines [`enum@crate::error::Error`] and the crate-wide [Result] alias. Variants cover
//! malformed configuration, unknown node and effect tags, rejected parameter edits,
//! stale node handles, and JSON parse failures.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("unknown symbol type '{tag}'")]
    UnknownType { tag: String },

    #[error("unknown effect type '{tag}'")]
    UnknownEffect { tag: String },

    #[error("invalid parameter for '{tag}': {message}")]
    InvalidParameter { tag: String, message: String },

    #[error("unknown node {index}")]
    UnknownNode { index: usize },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    pub(crate) fn parameter(tag: &str, message: impl Into<String>) -> Self {
        Error::InvalidParameter {
            tag: tag.to_owned(),
            message: message.into(),
        }
    }
}

impl From<String> for Error {
    fn from(value: String) -> Self {
        Error::Other(value)
    }
}

impl From<&str> for Error {
    fn from(value: &str) -> Self {
        Error::Other(value.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_string_uses_other_variant() {
        let err: Error = String::from("boom").into();
        matches!(err, Error::Other(_))
            .then_some(())
            .expect("expected Other variant");
    }

    #[test]
    fn parameter_error_names_the_tag() {
        let err = Error::parameter("polygon-on-box", "vertex index 9 out of range");
        assert_eq!(
            err.to_string(),
            "invalid parameter for 'polygon-on-box': vertex index 9 out of range"
        );
    }

    #[test]
    fn json_errors_convert() {
        let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: Error = parse.into();
        assert!(matches!(err, Error::Json(_)));
    }
}
