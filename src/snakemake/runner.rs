//! Runner - writes the rendered rule to a file and hands it to snakemake

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tokio::process::Command;

use super::outcome::{OutputStatus, RunOutcome};
use crate::error::{Result, SnakewrapError};
use crate::rule::Rule;

/// Runner invocation settings
#[derive(Debug, Clone, PartialEq)]
pub struct RunnerSettings {
    pub program: String,
    pub cores: u32,
    pub use_conda: bool,
    pub wrapper_prefix: Option<String>,
    /// Extra arguments placed before the targets
    pub args: Vec<String>,
    pub timeout_ms: Option<u64>,
    pub workdir: Option<PathBuf>,
    /// Keep rule files in this directory; temp files are used when `None`
    pub rule_dir: Option<PathBuf>,
}

impl Default for RunnerSettings {
    fn default() -> Self {
        Self {
            program: crate::config::DEFAULT_RUNNER.to_string(),
            cores: 1,
            use_conda: true,
            wrapper_prefix: None,
            args: Vec::new(),
            timeout_ms: None,
            workdir: None,
            rule_dir: None,
        }
    }
}

impl RunnerSettings {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Default::default()
        }
    }

    pub fn cores(mut self, cores: u32) -> Self {
        self.cores = cores;
        self
    }

    pub fn use_conda(mut self, use_conda: bool) -> Self {
        self.use_conda = use_conda;
        self
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn timeout_ms(mut self, ms: u64) -> Self {
        self.timeout_ms = Some(ms);
        self
    }

    pub fn workdir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.workdir = Some(dir.into());
        self
    }

    pub fn keep_rules_in(mut self, dir: impl Into<PathBuf>) -> Self {
        self.rule_dir = Some(dir.into());
        self
    }
}

/// Executes a rendered rule
#[async_trait]
pub trait RuleRunner: Send + Sync {
    /// Run the rule; a non-zero exit is reported in the outcome, not as an error
    async fn run(&self, rule: &Rule, rendered: &str) -> Result<RunOutcome>;
}

/// Runs rules through the snakemake command line
pub struct SnakemakeRunner {
    settings: RunnerSettings,
}

impl Default for SnakemakeRunner {
    fn default() -> Self {
        Self::new(RunnerSettings::default())
    }
}

impl SnakemakeRunner {
    pub fn new(settings: RunnerSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &RunnerSettings {
        &self.settings
    }

    /// Arguments after the program name
    pub fn arguments(&self, rule: &Rule, rule_file: &Path) -> Vec<String> {
        let cores = self.settings.cores.max(rule.threads.unwrap_or(1)).max(1);
        let mut args = vec![
            "--snakefile".to_string(),
            rule_file.display().to_string(),
            "--cores".to_string(),
            cores.to_string(),
        ];
        if self.settings.use_conda {
            args.push("--use-conda".to_string());
        }
        if let Some(prefix) = &self.settings.wrapper_prefix {
            args.push("--wrapper-prefix".to_string());
            args.push(prefix.clone());
        }
        args.extend(self.settings.args.iter().cloned());
        args.extend(rule.output_paths().into_iter().map(String::from));
        args
    }

    /// Path a kept rule file is written to: `<dir>/<rule>-<sha256 prefix>.smk`
    pub fn kept_rule_path(dir: &Path, rule: &Rule, rendered: &str) -> PathBuf {
        let digest = hex::encode(Sha256::digest(rendered.as_bytes()));
        dir.join(format!("{}-{}.smk", rule.name, &digest[..12]))
    }

    async fn execute(&self, args: &[String]) -> Result<std::process::Output> {
        let mut cmd = Command::new(&self.settings.program);
        cmd.args(args);
        if let Some(dir) = &self.settings.workdir {
            cmd.current_dir(dir);
        }
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = cmd.spawn().map_err(|source| SnakewrapError::Spawn {
            program: self.settings.program.clone(),
            source,
        })?;

        match self.settings.timeout_ms {
            Some(ms) => {
                let timeout = tokio::time::Duration::from_millis(ms);
                match tokio::time::timeout(timeout, child.wait_with_output()).await {
                    Ok(result) => Ok(result?),
                    Err(_) => Err(SnakewrapError::Timeout(ms)),
                }
            }
            None => Ok(child.wait_with_output().await?),
        }
    }
}

#[async_trait]
impl RuleRunner for SnakemakeRunner {
    async fn run(&self, rule: &Rule, rendered: &str) -> Result<RunOutcome> {
        // The temp file must outlive the child process
        let (rule_file, _temp) = match &self.settings.rule_dir {
            Some(dir) => {
                // Absolute, since the runner may start in another working directory
                let dir = std::path::absolute(dir)?;
                std::fs::create_dir_all(&dir)?;
                let path = Self::kept_rule_path(&dir, rule, rendered);
                std::fs::write(&path, rendered)?;
                (path, None)
            }
            None => {
                let temp = tempfile::Builder::new()
                    .prefix("snakewrap-")
                    .suffix(".smk")
                    .tempfile()?;
                std::fs::write(temp.path(), rendered)?;
                (temp.path().to_path_buf(), Some(temp))
            }
        };

        let args = self.arguments(rule, &rule_file);
        log::info!("Running {} {}", self.settings.program, args.join(" "));

        let output = self.execute(&args).await?;
        let exit_code = output.status.code();
        log::info!("Rule '{}' finished with exit code {:?}", rule.name, exit_code);

        let outputs = rule
            .output_paths()
            .into_iter()
            .map(|p| OutputStatus::inspect(p, self.settings.workdir.as_deref()))
            .collect();

        let mut command = vec![self.settings.program.clone()];
        command.extend(args);

        Ok(RunOutcome {
            command,
            rule_file: self.settings.rule_dir.as_ref().map(|_| rule_file),
            exit_code,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            outputs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::{Entry, ParamValue};
    use tempfile::TempDir;

    fn rule(outputs: &[&str]) -> Rule {
        Rule {
            name: "samtools_index".to_string(),
            input: vec![Entry::positional("a.bam")],
            output: outputs.iter().map(|p| Entry::positional(*p)).collect(),
            params: vec![("extra".into(), ParamValue::Str(String::new()))],
            threads: Some(4),
            log: None,
            wrapper: "v3.0.0/bio/samtools/index".to_string(),
        }
    }

    #[test]
    fn test_settings_builder() {
        let settings = RunnerSettings::new("snakemake")
            .cores(8)
            .use_conda(false)
            .arg("--printshellcmds")
            .timeout_ms(5000)
            .workdir("/tmp")
            .keep_rules_in("rules");
        assert_eq!(settings.cores, 8);
        assert!(!settings.use_conda);
        assert_eq!(settings.args, vec!["--printshellcmds"]);
        assert_eq!(settings.timeout_ms, Some(5000));
        assert_eq!(settings.workdir, Some(PathBuf::from("/tmp")));
        assert_eq!(settings.rule_dir, Some(PathBuf::from("rules")));
    }

    #[test]
    fn test_arguments() {
        let mut settings = RunnerSettings::new("snakemake").cores(2).arg("--quiet");
        settings.wrapper_prefix = Some("file:///srv/wrappers/".to_string());
        let runner = SnakemakeRunner::new(settings);

        let args = runner.arguments(&rule(&["a.bam.bai"]), Path::new("/tmp/r.smk"));
        assert_eq!(
            args,
            vec![
                "--snakefile",
                "/tmp/r.smk",
                "--cores",
                "4",
                "--use-conda",
                "--wrapper-prefix",
                "file:///srv/wrappers/",
                "--quiet",
                "a.bam.bai",
            ]
        );
    }

    #[test]
    fn test_arguments_cores_not_below_config() {
        let runner = SnakemakeRunner::new(RunnerSettings::new("snakemake").cores(16).use_conda(false));
        let args = runner.arguments(&rule(&["x"]), Path::new("r.smk"));
        assert_eq!(&args[2..4], &["--cores".to_string(), "16".to_string()]);
        assert!(!args.contains(&"--use-conda".to_string()));
    }

    #[test]
    fn test_kept_rule_path_is_content_addressed() {
        let dir = Path::new("rules");
        let r = rule(&["x"]);
        let a = SnakemakeRunner::kept_rule_path(dir, &r, "rule a:");
        let b = SnakemakeRunner::kept_rule_path(dir, &r, "rule a:");
        let c = SnakemakeRunner::kept_rule_path(dir, &r, "rule b:");
        assert_eq!(a, b);
        assert_ne!(a, c);
        let name = a.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("samtools_index-"));
        assert!(name.ends_with(".smk"));
        assert_eq!(name.len(), "samtools_index-".len() + 12 + ".smk".len());
    }

    #[tokio::test]
    async fn test_run_spawn_failure() {
        let runner = SnakemakeRunner::new(RunnerSettings::new("nonexistent_runner_xyz123"));
        let result = runner.run(&rule(&["x"]), "rule x:").await;
        assert!(matches!(result, Err(SnakewrapError::Spawn { .. })));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_captures_streams_and_exit_code() {
        let dir = TempDir::new().unwrap();
        let script = dir.path().join("fake-snakemake");
        std::fs::write(&script, "#!/bin/sh\necho \"args: $*\"\necho 'rule failed' >&2\nexit 3\n").unwrap();
        make_executable(&script);

        let runner = SnakemakeRunner::new(
            RunnerSettings::new(script.display().to_string())
                .use_conda(false)
                .workdir(dir.path()),
        );

        let outcome = runner.run(&rule(&["x"]), "rule x:").await.unwrap();
        assert!(!outcome.success());
        assert_eq!(outcome.exit_code, Some(3));
        assert!(outcome.stdout.contains("--snakefile"));
        assert!(outcome.stdout.contains("--cores 4"));
        assert!(outcome.stdout.trim_end().ends_with(" x"));
        assert_eq!(outcome.stderr.trim(), "rule failed");
        assert!(outcome.rule_file.is_none());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_keeps_rule_file() {
        let dir = TempDir::new().unwrap();
        let rules = dir.path().join("rules");
        let runner = SnakemakeRunner::new(
            RunnerSettings::new("true")
                .use_conda(false)
                .workdir(dir.path())
                .keep_rules_in(&rules),
        );

        let outcome = runner.run(&rule(&["a.bam.bai"]), "rule samtools_index:\n").await.unwrap();
        assert!(outcome.success());
        let kept = outcome.rule_file.clone().unwrap();
        assert_eq!(std::fs::read_to_string(&kept).unwrap(), "rule samtools_index:\n");
        // `true` creates nothing
        assert_eq!(outcome.missing_outputs(), vec![Path::new("a.bam.bai")]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_timeout() {
        let dir = TempDir::new().unwrap();
        let script = dir.path().join("slow.sh");
        std::fs::write(&script, "#!/bin/sh\nsleep 10\n").unwrap();
        make_executable(&script);

        let runner = SnakemakeRunner::new(
            RunnerSettings::new(script.display().to_string())
                .use_conda(false)
                .timeout_ms(100),
        );
        let result = runner.run(&rule(&["x"]), "rule x:").await;
        assert!(matches!(result, Err(SnakewrapError::Timeout(100))));
    }

    #[cfg(unix)]
    fn make_executable(path: &Path) {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = std::fs::metadata(path).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(path, perms).unwrap();
    }
}
