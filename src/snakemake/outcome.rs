//! Result of one runner invocation

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{Result, SnakewrapError};

/// Lines of stderr kept in a `RunnerFailed` error
const STDERR_TAIL_LINES: usize = 20;

/// State of a declared output after the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase", tag = "state", content = "bytes")]
pub enum OutputState {
    /// Exists; byte count for files, 0 for directories
    Present(u64),
    /// File exists but holds no data
    Empty,
    Missing,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputStatus {
    pub path: PathBuf,
    #[serde(flatten)]
    pub state: OutputState,
}

impl OutputStatus {
    /// Inspect an output path, resolved against `workdir` when relative
    pub fn inspect(path: &str, workdir: Option<&Path>) -> Self {
        let resolved = match workdir {
            Some(dir) if Path::new(path).is_relative() => dir.join(path),
            _ => PathBuf::from(path),
        };
        let state = match std::fs::metadata(&resolved) {
            Ok(meta) if meta.is_dir() => OutputState::Present(0),
            Ok(meta) if meta.len() == 0 => OutputState::Empty,
            Ok(meta) => OutputState::Present(meta.len()),
            Err(_) => OutputState::Missing,
        };
        Self {
            path: PathBuf::from(path),
            state,
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self.state, OutputState::Present(_))
    }
}

/// Completed runner process: exit status, captured streams and output check
#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
    /// Program and arguments as executed
    pub command: Vec<String>,
    /// Rule file left on disk, when rule files are kept
    pub rule_file: Option<PathBuf>,
    /// `None` when the process was terminated by a signal
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub outputs: Vec<OutputStatus>,
}

impl RunOutcome {
    /// Runner exited zero
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Declared outputs that are absent or empty
    pub fn missing_outputs(&self) -> Vec<&Path> {
        self.outputs
            .iter()
            .filter(|o| !o.is_present())
            .map(|o| o.path.as_path())
            .collect()
    }

    /// Turn a failed run or missing outputs into an error
    pub fn ensure_success(&self) -> Result<()> {
        if !self.success() {
            return Err(SnakewrapError::RunnerFailed {
                code: self.exit_code,
                stderr: self.stderr_tail(),
            });
        }
        let missing = self.missing_outputs();
        if !missing.is_empty() {
            return Err(SnakewrapError::MissingOutputs(
                missing.into_iter().map(Path::to_path_buf).collect(),
            ));
        }
        Ok(())
    }

    /// Last lines of stderr, where snakemake reports the failing rule
    pub fn stderr_tail(&self) -> String {
        let lines: Vec<&str> = self.stderr.trim_end().lines().collect();
        let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
        lines[start..].join("\n")
    }
}
