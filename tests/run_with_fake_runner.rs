//! Running rules through a fake snakemake script
//!
//! The script parses the runner arguments, checks the rule file and writes
//! every target it was given, so no real snakemake is needed.

#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use snakewrap::catalog::Catalog;
use snakewrap::error::{Result, SnakewrapError};
use snakewrap::executor::{Execution, Executor};
use snakewrap::invocation::{Invocation, RuleSettings};
use snakewrap::rule::RuleRenderer;
use snakewrap::snakemake::{OutputState, RunOutcome, RunnerSettings, SnakemakeRunner};
use snakewrap::wrappers::{SamtoolsSort, Wrapper};
use tempfile::TempDir;

const FAKE_SNAKEMAKE: &str = r#"#!/bin/sh
snakefile=""
while [ $# -gt 0 ]; do
  case "$1" in
    --snakefile) snakefile="$2"; shift 2 ;;
    --cores|--wrapper-prefix) shift 2 ;;
    --*) shift ;;
    *) mkdir -p "$(dirname "$1")"; echo "generated by fake snakemake" > "$1"; shift ;;
  esac
done
[ -f "$snakefile" ] || { echo "snakefile $snakefile not found" >&2; exit 1; }
grep -q '^rule ' "$snakefile" || { echo "no rule in $snakefile" >&2; exit 1; }
echo "Finished job 0."
"#;

const LAZY_SNAKEMAKE: &str = r#"#!/bin/sh
echo "Nothing to be done."
"#;

const FAILING_SNAKEMAKE: &str = r#"#!/bin/sh
echo "Building DAG of jobs..."
echo "MissingInputException in rule samtools_sort" >&2
exit 3
"#;

fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, body).unwrap();
    let mut perms = std::fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).unwrap();
    path
}

fn executor(script: &Path, workdir: &Path) -> Executor<SnakemakeRunner> {
    let settings = RunnerSettings::new(script.display().to_string())
        .use_conda(false)
        .workdir(workdir)
        .timeout_ms(30_000);
    Executor::new(
        Catalog::builtin(),
        RuleRenderer::new(),
        RuleSettings::default(),
        SnakemakeRunner::new(settings),
    )
}

fn completed(execution: Execution) -> RunOutcome {
    match execution {
        Execution::Completed(outcome) => outcome,
        Execution::Printed { .. } => panic!("expected the runner to be invoked"),
    }
}

#[tokio::test]
async fn test_runner_creates_outputs() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let script = write_script(temp_dir.path(), "snakemake", FAKE_SNAKEMAKE);
    let executor = executor(&script, temp_dir.path());

    let sort = SamtoolsSort {
        input: "mapped/a.bam".into(),
        output: "sorted/a.bam".into(),
        threads: Some(2),
        ..Default::default()
    };
    let outcome = completed(executor.run_wrapper(&sort, false).await?);

    assert_eq!(outcome.exit_code, Some(0));
    assert!(outcome.stdout.contains("Finished job 0."));
    assert_eq!(outcome.outputs.len(), 1);
    assert!(matches!(outcome.outputs[0].state, OutputState::Present(n) if n > 0));
    assert!(temp_dir.path().join("sorted/a.bam").exists());
    outcome.ensure_success()?;
    Ok(())
}

#[tokio::test]
async fn test_runner_receives_every_output() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let script = write_script(temp_dir.path(), "snakemake", FAKE_SNAKEMAKE);
    let executor = executor(&script, temp_dir.path());

    let call = Invocation::new("fastqc")
        .input_path("reads/a.fq")
        .output("html", "qc/a_fastqc.html")
        .output("zip", "qc/a_fastqc.zip");
    let outcome = completed(executor.execute(&call, false).await?);

    assert!(outcome.success());
    assert!(outcome.missing_outputs().is_empty());
    assert_eq!(&outcome.command[outcome.command.len() - 2..], &["qc/a_fastqc.html", "qc/a_fastqc.zip"]);
    Ok(())
}

#[tokio::test]
async fn test_failing_runner_is_reported() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let script = write_script(temp_dir.path(), "snakemake", FAILING_SNAKEMAKE);
    let executor = executor(&script, temp_dir.path());

    let sort = SamtoolsSort {
        input: "mapped/a.bam".into(),
        output: "sorted/a.bam".into(),
        ..Default::default()
    };
    let outcome = completed(executor.run_wrapper(&sort, false).await?);

    assert_eq!(outcome.exit_code, Some(3));
    assert_eq!(outcome.stdout, "Building DAG of jobs...\n");
    assert!(outcome.stderr.contains("MissingInputException"));
    assert_eq!(outcome.outputs[0].state, OutputState::Missing);

    match outcome.ensure_success() {
        Err(SnakewrapError::RunnerFailed { code, stderr }) => {
            assert_eq!(code, Some(3));
            assert!(stderr.contains("samtools_sort"));
        }
        other => panic!("unexpected result: {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn test_print_only_skips_runner() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let script = write_script(temp_dir.path(), "snakemake", FAILING_SNAKEMAKE);
    let executor = executor(&script, temp_dir.path());

    let sort = SamtoolsSort {
        input: "mapped/a.bam".into(),
        output: "sorted/a.bam".into(),
        ..Default::default()
    };
    let execution = executor.run_wrapper(&sort, true).await?;
    let text = execution.rule_text().unwrap();
    assert_eq!(text, executor.render(&sort.invocation()?)?);
    assert!(!temp_dir.path().join("sorted").exists());
    Ok(())
}

#[tokio::test]
async fn test_kept_rule_file() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let script = write_script(temp_dir.path(), "snakemake", FAKE_SNAKEMAKE);
    let rule_dir = temp_dir.path().join("rules");
    let settings = RunnerSettings::new(script.display().to_string())
        .use_conda(false)
        .workdir(temp_dir.path())
        .keep_rules_in(&rule_dir);
    let executor = Executor::new(
        Catalog::builtin(),
        RuleRenderer::new(),
        RuleSettings::default(),
        SnakemakeRunner::new(settings),
    );

    let call = Invocation::new("samtools/faidx")
        .input_path("genome.fa")
        .output_path("genome.fa.fai");
    let outcome = completed(executor.execute(&call, false).await?);
    outcome.ensure_success()?;

    let kept = outcome.rule_file.expect("rule file kept");
    assert!(kept.starts_with(&rule_dir));
    let content = std::fs::read_to_string(&kept)?;
    assert_eq!(content, executor.render(&call)?);
    Ok(())
}

#[tokio::test]
async fn test_relative_rule_dir_with_other_workdir() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let script = write_script(temp_dir.path(), "snakemake", FAKE_SNAKEMAKE);
    let workdir = temp_dir.path().join("work");
    std::fs::create_dir(&workdir)?;

    // Relative to the test's current directory, not to the runner's workdir
    let rules_parent = TempDir::new_in(".")?;
    let relative_rules = PathBuf::from(rules_parent.path().file_name().unwrap()).join("rules");
    assert!(relative_rules.is_relative());

    let settings = RunnerSettings::new(script.display().to_string())
        .use_conda(false)
        .workdir(&workdir)
        .keep_rules_in(&relative_rules);
    let executor = Executor::new(
        Catalog::builtin(),
        RuleRenderer::new(),
        RuleSettings::default(),
        SnakemakeRunner::new(settings),
    );

    let call = Invocation::new("samtools/faidx")
        .input_path("genome.fa")
        .output_path("genome.fa.fai");
    let outcome = completed(executor.execute(&call, false).await?);
    assert_eq!(outcome.exit_code, Some(0), "stderr: {}", outcome.stderr);
    outcome.ensure_success()?;

    let kept = outcome.rule_file.expect("rule file kept");
    assert!(kept.is_absolute());
    assert!(kept.exists());
    assert!(workdir.join("genome.fa.fai").exists());
    Ok(())
}

#[tokio::test]
async fn test_command_line_args_run_to_completion() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let script = write_script(temp_dir.path(), "snakemake", FAKE_SNAKEMAKE);
    let executor = executor(&script, temp_dir.path());

    let def = executor.catalog().require("fastqc")?;
    let call = Invocation::from_args(
        def,
        &["reads/a.fq".to_string()],
        &["html=qc/a.html".to_string(), "zip=qc/a.zip".to_string()],
        &["mem_mb=1024".to_string()],
    )?;
    let outcome = completed(executor.execute(&call, false).await?);
    outcome.ensure_success()?;
    assert!(temp_dir.path().join("qc/a.zip").exists());
    Ok(())
}

#[tokio::test]
async fn test_missing_output_fails_run() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let script = write_script(temp_dir.path(), "snakemake", LAZY_SNAKEMAKE);
    let executor = executor(&script, temp_dir.path());

    let def = executor.catalog().require("samtools/index")?;
    let call = Invocation::from_args(def, &["a.bam".to_string()], &["a.bam.bai".to_string()], &[])?;
    let outcome = completed(executor.execute(&call, false).await?);

    assert!(outcome.success());
    match outcome.ensure_success() {
        Err(SnakewrapError::MissingOutputs(paths)) => assert_eq!(paths, vec![PathBuf::from("a.bam.bai")]),
        other => panic!("unexpected result: {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn test_missing_runner_binary() {
    let temp_dir = TempDir::new().unwrap();
    let executor = executor(&temp_dir.path().join("no-such-snakemake"), temp_dir.path());
    let call = Invocation::new("samtools/faidx")
        .input_path("genome.fa")
        .output_path("genome.fa.fai");
    let result = executor.execute(&call, false).await;
    assert!(matches!(result, Err(SnakewrapError::Spawn { .. })));
}
