//! Error types for snakewrap
//!
//! Centralized error handling using thiserror.

use std::path::PathBuf;

use thiserror::Error;

/// All error types that can occur while binding, rendering or running a wrapper
#[derive(Debug, Error)]
pub enum SnakewrapError {
    /// Wrapper name not present in the catalog
    #[error("Unknown wrapper: {0}")]
    UnknownWrapper(String),

    /// Input or output slot not declared by the wrapper
    #[error("Unknown {direction} slot '{slot}' for wrapper {wrapper}")]
    UnknownSlot {
        wrapper: String,
        direction: &'static str,
        slot: String,
    },

    /// Required slot left unassigned
    #[error("Missing required {direction} '{slot}' for wrapper {wrapper}")]
    MissingSlot {
        wrapper: String,
        direction: &'static str,
        slot: String,
    },

    /// Several paths bound to a single-path slot
    #[error("Slot '{slot}' accepts a single path, got {count}")]
    TooManyPaths { slot: String, count: usize },

    /// Blank path string
    #[error("Empty path for slot '{0}'")]
    EmptyPath(String),

    /// Parameter not declared by the wrapper
    #[error("Unknown param '{param}' for wrapper {wrapper}")]
    UnknownParam { wrapper: String, param: String },

    /// Required parameter without default left unset
    #[error("Missing required param '{param}' for wrapper {wrapper}")]
    MissingParam { wrapper: String, param: String },

    /// Parameter value of the wrong kind or out of range
    #[error("Invalid param '{param}': {reason}")]
    InvalidParam { param: String, reason: String },

    /// Sample identifier with forbidden characters
    #[error("Invalid sample id '{0}': expected letters, digits, '.', '_' or '-'")]
    InvalidSampleId(String),

    /// Rule name that is not a Python identifier
    #[error("Invalid rule name '{0}'")]
    InvalidRuleName(String),

    /// Same output path declared twice
    #[error("Duplicate output path: {0}")]
    DuplicateOutput(String),

    /// Glob pattern that matched no file
    #[error("No files match pattern '{0}'")]
    NoGlobMatch(String),

    /// Malformed wrapper definition
    #[error("Invalid wrapper definition '{name}': {reason}")]
    InvalidDefinition { name: String, reason: String },

    /// Template registration or rendering failure
    #[error("Template error: {0}")]
    Template(String),

    /// Runner binary could not be started
    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Runner exceeded the configured timeout
    #[error("Runner timed out after {0}ms")]
    Timeout(u64),

    /// Runner exited non-zero
    #[error("Runner exited with code {code:?}: {stderr}")]
    RunnerFailed { code: Option<i32>, stderr: String },

    /// Declared outputs absent or empty after a run
    #[error("Missing outputs: {}", .0.iter().map(|p| p.display().to_string()).collect::<Vec<_>>().join(", "))]
    MissingOutputs(Vec<PathBuf>),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for snakewrap operations
pub type Result<T> = std::result::Result<T, SnakewrapError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_wrapper_error() {
        let err = SnakewrapError::UnknownWrapper("samtools/nope".to_string());
        assert_eq!(err.to_string(), "Unknown wrapper: samtools/nope");
    }

    #[test]
    fn test_unknown_slot_error() {
        let err = SnakewrapError::UnknownSlot {
            wrapper: "bwa/mem".to_string(),
            direction: "input",
            slot: "fasta".to_string(),
        };
        assert_eq!(err.to_string(), "Unknown input slot 'fasta' for wrapper bwa/mem");
    }

    #[test]
    fn test_missing_slot_error() {
        let err = SnakewrapError::MissingSlot {
            wrapper: "samtools/sort".to_string(),
            direction: "output",
            slot: "bam".to_string(),
        };
        assert_eq!(err.to_string(), "Missing required output 'bam' for wrapper samtools/sort");
    }

    #[test]
    fn test_invalid_param_error() {
        let err = SnakewrapError::InvalidParam {
            param: "min_qual".to_string(),
            reason: "expected int, got \"high\"".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid param 'min_qual': expected int, got \"high\"");
    }

    #[test]
    fn test_missing_outputs_error() {
        let err = SnakewrapError::MissingOutputs(vec![PathBuf::from("a.bam"), PathBuf::from("b.bai")]);
        assert_eq!(err.to_string(), "Missing outputs: a.bam, b.bai");
    }

    #[test]
    fn test_runner_failed_error() {
        let err = SnakewrapError::RunnerFailed {
            code: Some(1),
            stderr: "MissingInputException".to_string(),
        };
        assert_eq!(err.to_string(), "Runner exited with code Some(1): MissingInputException");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: SnakewrapError = io_err.into();
        assert!(matches!(err, SnakewrapError::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_yaml_error_conversion() {
        let yaml_err = serde_yaml::from_str::<Vec<String>>("{not: a list").unwrap_err();
        let err: SnakewrapError = yaml_err.into();
        assert!(matches!(err, SnakewrapError::Yaml(_)));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid").unwrap_err();
        let err: SnakewrapError = json_err.into();
        assert!(matches!(err, SnakewrapError::Json(_)));
    }

    #[test]
    fn test_result_type_alias() {
        fn returns_ok() -> Result<i32> {
            Ok(42)
        }

        fn returns_err() -> Result<i32> {
            Err(SnakewrapError::Timeout(100))
        }

        assert!(returns_ok().is_ok());
        assert!(returns_err().is_err());
    }
}
