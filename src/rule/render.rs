//! Rule Renderer - Render rule blocks using Handlebars
//!
//! The built-in template produces a Snakemake rule with `input`, `output`,
//! `params`, `threads`, `log` and `wrapper` sections. A custom template file
//! can replace it; it sees the same context as the built-in one.

use std::path::Path;

use handlebars::Handlebars;
use serde::Serialize;

use super::block::Rule;
use super::value::quote;
use crate::error::{Result, SnakewrapError};

/// Name the rule template is registered under
pub const RULE_TEMPLATE: &str = "rule";

// Tags never sit alone on a line, so no standalone-line stripping is involved.
const BUILTIN_RULE_TEMPLATE: &str = "rule {{name}}:
{{#if input}}    input:
{{#each input}}        {{this}},
{{/each}}{{/if}}    output:
{{#each output}}        {{this}},
{{/each}}{{#if params}}    params:
{{#each params}}        {{this}},
{{/each}}{{/if}}{{#if threads}}    threads: {{threads}}
{{/if}}{{#if log}}    log:
        {{log}},
{{/if}}    wrapper:
        {{wrapper}}
";

/// Template context; every entry is already a Python literal
#[derive(Debug, Serialize)]
pub struct RuleContext {
    pub name: String,
    pub input: Vec<String>,
    pub output: Vec<String>,
    pub params: Vec<String>,
    pub threads: Option<u32>,
    pub log: Option<String>,
    pub wrapper: String,
}

impl From<&Rule> for RuleContext {
    fn from(rule: &Rule) -> Self {
        // Python rejects positional arguments after keyword arguments
        let ordered = |entries: &[super::block::Entry]| {
            let (positional, named): (Vec<_>, Vec<_>) = entries.iter().partition(|e| e.key.is_none());
            positional
                .into_iter()
                .chain(named)
                .map(|e| e.to_python())
                .collect::<Vec<_>>()
        };

        Self {
            name: rule.name.clone(),
            input: ordered(&rule.input),
            output: ordered(&rule.output),
            params: rule
                .params
                .iter()
                .map(|(k, v)| format!("{}={}", k, v.to_python()))
                .collect(),
            threads: rule.threads,
            log: rule.log.as_deref().map(quote),
            wrapper: quote(&rule.wrapper),
        }
    }
}

/// Renders rule blocks using Handlebars templating
pub struct RuleRenderer {
    handlebars: Handlebars<'static>,
}

impl Default for RuleRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleRenderer {
    /// Create a renderer using the built-in rule template
    pub fn new() -> Self {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(false);
        // Rule text is Python, not HTML
        handlebars.register_escape_fn(handlebars::no_escape);
        Self { handlebars }
    }

    /// Create a renderer whose rule template is read from a file
    pub fn from_template_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let template = std::fs::read_to_string(path).map_err(|e| {
            SnakewrapError::Template(format!("Failed to read template {}: {}", path.display(), e))
        })?;
        let mut renderer = Self::new();
        renderer.register_template(RULE_TEMPLATE, &template)?;
        log::debug!("Using rule template from {}", path.display());
        Ok(renderer)
    }

    /// Render a rule with the custom rule template if one is registered, else the built-in one
    pub fn render(&self, rule: &Rule) -> Result<String> {
        let context = RuleContext::from(rule);
        let rendered = if self.has_template(RULE_TEMPLATE) {
            self.handlebars.render(RULE_TEMPLATE, &context)
        } else {
            self.handlebars.render_template(BUILTIN_RULE_TEMPLATE, &context)
        };
        rendered.map_err(|e| SnakewrapError::Template(format!("Failed to render rule '{}': {}", rule.name, e)))
    }

    /// Render an ad-hoc template string with any serializable context
    pub fn render_with<T: Serialize>(&self, template: &str, context: &T) -> Result<String> {
        self.handlebars
            .render_template(template, context)
            .map_err(|e| SnakewrapError::Template(format!("Failed to render template: {}", e)))
    }

    /// Register a named template, replacing any template of the same name
    pub fn register_template(&mut self, name: &str, template: &str) -> Result<()> {
        self.handlebars
            .register_template_string(name, template)
            .map_err(|e| SnakewrapError::Template(format!("Failed to register template '{}': {}", name, e)))
    }

    /// Check if a named template is registered
    pub fn has_template(&self, name: &str) -> bool {
        self.handlebars.get_template(name).is_some()
    }
}
