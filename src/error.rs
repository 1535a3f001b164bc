//! Error types for Temporal-Store
//!
//! Store operations never fail: absence and rejected compare-and-swap are
//! ordinary return values. Errors only arise at the edges, when parsing
//! command scripts, validating TTLs or loading configuration.

use thiserror::Error;

/// Result type alias for Temporal-Store operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for Temporal-Store
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed command script
    #[error("Parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    /// TTL that cannot be represented (e.g. negative)
    #[error("Invalid TTL: {0}")]
    InvalidTtl(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Build a parse error for a 1-based script line
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Error::Parse {
            line,
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Configuration(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display() {
        let err = Error::parse(3, "unknown command `FROB`");
        assert_eq!(err.to_string(), "Parse error on line 3: unknown command `FROB`");
    }

    #[test]
    fn test_conversions() {
        let json_err = serde_json::from_str::<u32>("nope").unwrap_err();
        assert!(matches!(Error::from(json_err), Error::Serialization(_)));

        let toml_err = toml::from_str::<toml::Value>("= broken").unwrap_err();
        assert!(matches!(Error::from(toml_err), Error::Configuration(_)));
    }
}
