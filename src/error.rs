//! Error handling for Midcap
//!
//! Defines custom error types and establishes a unified Result type
//! using anyhow for context chaining and error propagation.
//!
//! The filter engine itself never fails: unparsable filter text degrades to
//! a plain `false`. Only the host plumbing (loading the snapshot, reading
//! the config file, writing the export) reports errors.

use thiserror::Error;

/// Core error types for the holdings explorer
#[derive(Error, Debug)]
pub enum MidcapError {
    #[error("data error: {0}")]
    DataError(String),

    #[error("config error: {0}")]
    ConfigError(String),

    #[error("export error: {0}")]
    ExportError(String),

    #[error("unknown column: {0}")]
    UnknownColumn(String),

    #[error("unknown preset: {0}")]
    UnknownPreset(String),
}

/// Result type alias for holdings operations
pub type Result<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_formatting_is_readable() {
        let err = MidcapError::UnknownColumn("mv%".to_string());
        assert_eq!(err.to_string(), "unknown column: mv%");
    }

    #[test]
    fn test_anyhow_context_chains_errors() {
        use anyhow::Context;
        let result: Result<()> =
            Err(anyhow::anyhow!("original error")).context("failed to load holdings");
        match result {
            Err(e) => {
                assert!(e.to_string().contains("failed to load holdings"));
                let debug_msg = format!("{:?}", e);
                assert!(debug_msg.contains("original error"));
            }
            Ok(_) => panic!("expected error"),
        }
    }

    #[test]
    fn test_error_variants() {
        assert!(MidcapError::DataError("x".into())
            .to_string()
            .starts_with("data error"));
        assert!(MidcapError::ConfigError("x".into())
            .to_string()
            .starts_with("config error"));
        assert!(MidcapError::UnknownPreset("x".into())
            .to_string()
            .starts_with("unknown preset"));
    }
}
