use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::invocation::RuleSettings;
use crate::snakemake::RunnerSettings;

/// Default snakemake-wrappers release referenced by rendered rules.
pub const DEFAULT_WRAPPER_VERSION: &str = "v3.0.0";

/// Default runner binary.
pub const DEFAULT_RUNNER: &str = "snakemake";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,
    pub runner: RunnerConfig,
    pub wrappers: WrappersConfig,
    pub rule: RuleConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: Some("info".to_string()),
            runner: RunnerConfig::default(),
            wrappers: WrappersConfig::default(),
            rule: RuleConfig::default(),
        }
    }
}

/// How the workflow runner is invoked.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Runner binary, looked up on PATH.
    pub program: String,

    /// Cores handed to the runner; raised to the rule's threads when lower.
    pub cores: u32,

    /// Pass --use-conda.
    #[serde(rename = "use-conda")]
    pub use_conda: bool,

    /// Extra arguments placed before the targets.
    pub args: Vec<String>,

    /// Kill the runner after this many milliseconds.
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: Option<u64>,

    /// Working directory for the runner; outputs are checked relative to it.
    pub workdir: Option<PathBuf>,

    /// Keep rendered rule files instead of deleting them after the run.
    #[serde(rename = "keep-rule-files")]
    pub keep_rule_files: bool,

    /// Where kept rule files go.
    #[serde(rename = "rule-dir")]
    pub rule_dir: PathBuf,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            program: DEFAULT_RUNNER.to_string(),
            cores: 1,
            use_conda: true,
            args: Vec::new(),
            timeout_ms: None,
            workdir: None,
            keep_rule_files: false,
            rule_dir: PathBuf::from(".snakewrap/rules"),
        }
    }
}

/// Where wrappers come from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WrappersConfig {
    /// Release tag prefixed to wrapper paths; empty to reference paths as-is.
    pub version: String,

    /// Passed to the runner as --wrapper-prefix.
    pub prefix: Option<String>,

    /// Extra directories of wrapper definition files.
    #[serde(rename = "catalog-dirs")]
    pub catalog_dirs: Vec<PathBuf>,
}

impl Default for WrappersConfig {
    fn default() -> Self {
        Self {
            version: DEFAULT_WRAPPER_VERSION.to_string(),
            prefix: None,
            catalog_dirs: Vec::new(),
        }
    }
}

/// Rule rendering defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleConfig {
    /// Handlebars template replacing the built-in rule template.
    pub template: Option<PathBuf>,

    /// Threads for threaded wrappers when none are given.
    #[serde(rename = "default-threads")]
    pub default_threads: u32,

    /// Directory for per-rule logs when no log path is given.
    #[serde(rename = "log-dir")]
    pub log_dir: Option<String>,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            template: None,
            default_threads: 1,
            log_dir: None,
        }
    }
}

impl Config {
    /// Load configuration with fallback chain
    ///
    /// Search order:
    /// 1. Explicit path if provided
    /// 2. .snakewrap.yml in current directory
    /// 3. ~/.config/snakewrap/snakewrap.yml
    /// 4. Defaults
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        let project_name = env!("CARGO_PKG_NAME");

        let project_config = PathBuf::from(format!(".{}.yml", project_name));
        if project_config.exists() {
            match Self::load_from_file(&project_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    log::warn!("Failed to load config from {}: {}", project_config.display(), e);
                }
            }
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join(project_name).join(format!("{}.yml", project_name));
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;
        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;
        config.validate()?;

        log::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.runner.program.trim().is_empty() {
            eyre::bail!("runner.program must not be empty");
        }
        if self.runner.cores == 0 {
            eyre::bail!("runner.cores must be > 0");
        }
        if self.rule.default_threads == 0 {
            eyre::bail!("rule.default-threads must be > 0");
        }
        if self.runner.timeout_ms == Some(0) {
            eyre::bail!("runner.timeout-ms must be > 0 when set");
        }
        Ok(())
    }

    /// Settings used when binding invocations to rules.
    pub fn rule_settings(&self) -> RuleSettings {
        RuleSettings {
            version: self.wrappers.version.clone(),
            default_threads: self.rule.default_threads,
            log_dir: self.rule.log_dir.clone(),
        }
    }

    /// Settings used when invoking the runner.
    pub fn runner_settings(&self) -> RunnerSettings {
        RunnerSettings {
            program: self.runner.program.clone(),
            cores: self.runner.cores,
            use_conda: self.runner.use_conda,
            wrapper_prefix: self.wrappers.prefix.clone(),
            args: self.runner.args.clone(),
            timeout_ms: self.runner.timeout_ms,
            workdir: self.runner.workdir.clone(),
            rule_dir: self.runner.keep_rule_files.then(|| self.runner.rule_dir.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.runner.program, "snakemake");
        assert_eq!(config.runner.cores, 1);
        assert!(config.runner.use_conda);
        assert_eq!(config.wrappers.version, DEFAULT_WRAPPER_VERSION);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_explicit_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("snakewrap.yml");
        fs::write(
            &path,
            r#"
runner:
  program: /opt/snakemake/bin/snakemake
  cores: 8
  use-conda: false
  args: ["--printshellcmds"]
  keep-rule-files: true
wrappers:
  version: v2.6.0
  prefix: file:///srv/snakemake-wrappers/
rule:
  default-threads: 4
  log-dir: logs
"#,
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.runner.program, "/opt/snakemake/bin/snakemake");
        assert_eq!(config.runner.cores, 8);
        assert!(!config.runner.use_conda);
        assert_eq!(config.runner.args, vec!["--printshellcmds"]);
        assert_eq!(config.wrappers.version, "v2.6.0");
        assert_eq!(config.rule.default_threads, 4);
        // Unset keys keep their defaults
        assert_eq!(config.runner.rule_dir, PathBuf::from(".snakewrap/rules"));
        assert!(config.runner.timeout_ms.is_none());
    }

    #[test]
    fn test_load_explicit_missing_file() {
        let path = PathBuf::from("/nonexistent/snakewrap.yml");
        assert!(Config::load(Some(&path)).is_err());
    }

    #[test]
    fn test_load_rejects_zero_cores() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("snakewrap.yml");
        fs::write(&path, "runner:\n  cores: 0\n").unwrap();
        assert!(Config::load(Some(&path)).is_err());
    }

    #[test]
    fn test_rule_settings() {
        let mut config = Config::default();
        config.rule.log_dir = Some("logs".to_string());
        config.rule.default_threads = 3;

        let settings = config.rule_settings();
        assert_eq!(settings.version, DEFAULT_WRAPPER_VERSION);
        assert_eq!(settings.default_threads, 3);
        assert_eq!(settings.log_dir.as_deref(), Some("logs"));
    }

    #[test]
    fn test_runner_settings_rule_dir_only_when_kept() {
        let mut config = Config::default();
        assert!(config.runner_settings().rule_dir.is_none());

        config.runner.keep_rule_files = true;
        assert_eq!(config.runner_settings().rule_dir, Some(PathBuf::from(".snakewrap/rules")));
    }
}
