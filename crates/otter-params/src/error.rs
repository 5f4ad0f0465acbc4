//! Error types for otter-params

use thiserror::Error;

/// Errors that can occur while building or querying a parameter snapshot
#[derive(Error, Debug)]
pub enum ParamsError {
    /// A query was issued before any snapshot was taken
    #[error("Parameter snapshot is not initialized")]
    NotInitialized,

    /// Pair or character index past the end
    #[error("{what} index {index} out of range (len {len})")]
    IndexOutOfRange {
        what: &'static str,
        index: i64,
        len: usize,
    },

    /// The host handed over a URL that does not parse
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Bridge configuration could not be decoded
    #[error("Invalid bridge config: {0}")]
    InvalidConfig(#[from] serde_json::Error),

    /// Bytes crossing the FFI edge were not UTF-8
    #[error("Input is not valid UTF-8")]
    InvalidUtf8,

    /// No op is registered under this name
    #[error("Unknown op: {0}")]
    UnknownOp(String),

    /// Two ops share a name
    #[error("Op already registered: {0}")]
    DuplicateOp(String),

    /// An op was called with the wrong number of integer arguments
    #[error("Op {name} expects {expected} arguments, got {got}")]
    ArityMismatch {
        name: String,
        expected: usize,
        got: usize,
    },
}

impl ParamsError {
    /// Create an out-of-range error for a pair index
    pub fn pair_out_of_range(index: i64, len: usize) -> Self {
        Self::IndexOutOfRange {
            what: "pair",
            index,
            len,
        }
    }

    /// Create an out-of-range error for a character index
    pub fn char_out_of_range(index: i64, len: usize) -> Self {
        Self::IndexOutOfRange {
            what: "character",
            index,
            len,
        }
    }

    /// True for errors the FFI boundary answers with the sentinel
    pub fn is_out_of_range(&self) -> bool {
        matches!(self, Self::IndexOutOfRange { .. })
    }
}

/// Result type alias for parameter operations
pub type ParamsResult<T> = Result<T, ParamsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_range_message() {
        let err = ParamsError::pair_out_of_range(3, 2);
        assert!(err.is_out_of_range());
        assert_eq!(err.to_string(), "pair index 3 out of range (len 2)");
    }

    #[test]
    fn test_url_error_converts() {
        let err: ParamsError = url::Url::parse("not a url").unwrap_err().into();
        assert!(matches!(err, ParamsError::InvalidUrl(_)));
        assert!(!err.is_out_of_range());
    }
}
