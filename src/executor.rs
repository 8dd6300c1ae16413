//! Executor - binds invocations, renders rules and hands them to a runner

use serde::Serialize;

use crate::catalog::Catalog;
use crate::config::Config;
use crate::error::Result;
use crate::invocation::{Invocation, RuleSettings};
use crate::rule::{Rule, RuleRenderer};
use crate::snakemake::{RuleRunner, RunOutcome, SnakemakeRunner};
use crate::wrappers::Wrapper;

/// Result of one wrapper call
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "lowercase", tag = "mode")]
pub enum Execution {
    /// Rendered rule text; nothing was run
    Printed { rule: String },
    /// The runner was invoked
    Completed(RunOutcome),
}

impl Execution {
    pub fn rule_text(&self) -> Option<&str> {
        match self {
            Execution::Printed { rule } => Some(rule),
            Execution::Completed(_) => None,
        }
    }

    pub fn outcome(&self) -> Option<&RunOutcome> {
        match self {
            Execution::Printed { .. } => None,
            Execution::Completed(outcome) => Some(outcome),
        }
    }
}

pub struct Executor<R: RuleRunner> {
    catalog: Catalog,
    renderer: RuleRenderer,
    settings: RuleSettings,
    runner: R,
}

impl Executor<SnakemakeRunner> {
    /// Build from configuration: catalog directories, rule template and runner settings
    pub fn from_config(config: &Config) -> Result<Self> {
        let catalog = Catalog::load(&config.wrappers.catalog_dirs)?;
        let renderer = match &config.rule.template {
            Some(path) => RuleRenderer::from_template_file(path)?,
            None => RuleRenderer::new(),
        };
        log::debug!("Executor ready with {} wrappers", catalog.len());
        Ok(Self::new(
            catalog,
            renderer,
            config.rule_settings(),
            SnakemakeRunner::new(config.runner_settings()),
        ))
    }
}

impl<R: RuleRunner> Executor<R> {
    pub fn new(catalog: Catalog, renderer: RuleRenderer, settings: RuleSettings, runner: R) -> Self {
        Self {
            catalog,
            renderer,
            settings,
            runner,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn settings(&self) -> &RuleSettings {
        &self.settings
    }

    /// Validate an invocation against its wrapper definition
    pub fn bind(&self, invocation: &Invocation) -> Result<Rule> {
        let def = self.catalog.require(&invocation.wrapper)?;
        invocation.bind(def, &self.settings)
    }

    /// Render the rule block for an invocation
    pub fn render(&self, invocation: &Invocation) -> Result<String> {
        let rule = self.bind(invocation)?;
        self.renderer.render(&rule)
    }

    /// Render, then either return the text or run it
    pub async fn execute(&self, invocation: &Invocation, print_only: bool) -> Result<Execution> {
        let rule = self.bind(invocation)?;
        let rendered = self.renderer.render(&rule)?;

        if print_only {
            return Ok(Execution::Printed { rule: rendered });
        }

        log::info!("Executing rule '{}' ({})", rule.name, rule.wrapper);
        let outcome = self.runner.run(&rule, &rendered).await?;
        Ok(Execution::Completed(outcome))
    }

    /// Execute a typed wrapper call
    pub async fn run_wrapper<W: Wrapper + ?Sized>(&self, wrapper: &W, print_only: bool) -> Result<Execution> {
        let invocation = wrapper.invocation()?;
        self.execute(&invocation, print_only).await
    }
}
