//! Error types and result alias for the crate.
//!
//! Every fallible operation in the simulation core returns [`Result`]. The
//! stepper and the in-memory world operations never fail on well-formed input;
//! errors come from decoding keys, range-checked packing, configuration and
//! persisted chunk records.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    #[error("malformed coordinate key '{key}': {reason}")]
    Parse { key: String, reason: String },

    #[error("coordinate ({x}, {y}) does not fit the signed 16-bit packed range")]
    OutOfRange { x: i64, y: i64 },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("chunk ({chunk_x}, {chunk_y}) holds out-of-range local code {code:#x}")]
    InvalidChunk { chunk_x: i64, chunk_y: i64, code: u32 },

    #[error("unknown pattern '{0}'")]
    UnknownPattern(String),

    #[error(transparent)]
    Config(#[from] toml::de::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn parse(key: &str, reason: impl Into<String>) -> Self {
        Error::Parse {
            key: key.to_owned(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_keeps_offending_key() {
        let err = Error::parse("1;2", "missing ','");
        assert!(matches!(err, Error::Parse { ref key, .. } if key == "1;2"));
        assert_eq!(
            err.to_string(),
            "malformed coordinate key '1;2': missing ','"
        );
    }

    #[test]
    fn out_of_range_reports_coordinates() {
        let err = Error::OutOfRange { x: 40_000, y: -1 };
        assert!(err.to_string().contains("(40000, -1)"));
    }
}
