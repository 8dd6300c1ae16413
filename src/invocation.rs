//! Invocation - caller arguments for one wrapper call
//!
//! An `Invocation` collects slot assignments, params, threads and log path
//! exactly as the caller gave them. `bind` checks them against a
//! `WrapperDef`, fills in defaults and produces a `Rule`.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::catalog::{SlotDef, WrapperDef};
use crate::error::{Result, SnakewrapError};
use crate::rule::{Entry, ParamValue, Rule, rule_name_for, validate_rule_name};

/// Settings applied while binding, taken from the configuration
#[derive(Debug, Clone, PartialEq)]
pub struct RuleSettings {
    /// Wrapper repository version prefixed to wrapper paths; empty for none
    pub version: String,
    /// Threads for threaded wrappers when the caller sets none
    pub default_threads: u32,
    /// Directory for per-rule log files when the caller sets none
    pub log_dir: Option<String>,
}

impl Default for RuleSettings {
    fn default() -> Self {
        Self {
            version: crate::config::DEFAULT_WRAPPER_VERSION.to_string(),
            default_threads: 1,
            log_dir: None,
        }
    }
}

/// A param as the caller supplied it
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParamArg {
    /// Typed value, checked against the declared kind
    Value(ParamValue),
    /// Command-line text, parsed with the declared kind
    Text(String),
}

/// Raw arguments for one wrapper call
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Invocation {
    pub wrapper: String,
    pub name: Option<String>,
    /// (slot, path); `None` binds to the wrapper's default slot
    pub input: Vec<(Option<String>, String)>,
    pub output: Vec<(Option<String>, String)>,
    pub params: Vec<(String, ParamArg)>,
    pub threads: Option<u32>,
    pub log: Option<String>,
}

impl Invocation {
    pub fn new(wrapper: impl Into<String>) -> Self {
        Self {
            wrapper: wrapper.into(),
            ..Default::default()
        }
    }

    /// Override the derived rule name
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Bind a path to a named input slot
    pub fn input(mut self, slot: impl Into<String>, path: impl Into<String>) -> Self {
        self.input.push((Some(slot.into()), path.into()));
        self
    }

    /// Bind several paths to a named input slot
    pub fn inputs<I, S>(mut self, slot: &str, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for path in paths {
            self.input.push((Some(slot.to_string()), path.into()));
        }
        self
    }

    /// Bind a path to the default input slot
    pub fn input_path(mut self, path: impl Into<String>) -> Self {
        self.input.push((None, path.into()));
        self
    }

    /// Bind a path to a named output slot
    pub fn output(mut self, slot: impl Into<String>, path: impl Into<String>) -> Self {
        self.output.push((Some(slot.into()), path.into()));
        self
    }

    /// Bind several paths to a named output slot
    pub fn outputs<I, S>(mut self, slot: &str, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for path in paths {
            self.output.push((Some(slot.to_string()), path.into()));
        }
        self
    }

    /// Bind a path to the default output slot
    pub fn output_path(mut self, path: impl Into<String>) -> Self {
        self.output.push((None, path.into()));
        self
    }

    /// Set a typed param
    pub fn param(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.params.push((name.into(), ParamArg::Value(value.into())));
        self
    }

    /// Set a param from command-line text
    pub fn param_text(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.params.push((name.into(), ParamArg::Text(text.into())));
        self
    }

    /// Set a param only when a value is present
    pub fn param_opt<V: Into<ParamValue>>(self, name: &str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.param(name, v),
            None => self,
        }
    }

    pub fn threads(mut self, threads: u32) -> Self {
        self.threads = Some(threads);
        self
    }

    pub fn log(mut self, path: impl Into<String>) -> Self {
        self.log = Some(path.into());
        self
    }

    /// Build from command-line strings: `[SLOT=]PATH` inputs and outputs and
    /// `NAME=VALUE` params, as accepted by `snakewrap run`
    pub fn from_args(def: &WrapperDef, inputs: &[String], outputs: &[String], params: &[String]) -> Result<Self> {
        let mut call = Self::new(def.name.clone());
        for arg in inputs {
            let (slot, path) = split_slot_arg(arg, &def.input);
            call.input.push((slot.map(String::from), path.to_string()));
        }
        for arg in outputs {
            let (slot, path) = split_slot_arg(arg, &def.output);
            call.output.push((slot.map(String::from), path.to_string()));
        }
        for arg in params {
            let (name, value) = split_param_arg(arg)?;
            call = call.param_text(name, value);
        }
        Ok(call)
    }

    /// Validate against a definition and produce a renderable rule
    pub fn bind(&self, def: &WrapperDef, settings: &RuleSettings) -> Result<Rule> {
        let name = match &self.name {
            Some(name) => name.trim().to_string(),
            None => rule_name_for(&def.name),
        };
        validate_rule_name(&name)?;

        let input = bind_slots(def, "input", &def.input, def.default_input(), &self.input)?;
        let output = bind_slots(def, "output", &def.output, def.default_output(), &self.output)?;

        if output.is_empty() {
            return Err(SnakewrapError::MissingSlot {
                wrapper: def.name.clone(),
                direction: "output",
                slot: def.output.iter().map(|s| s.name.as_str()).collect::<Vec<_>>().join(" or "),
            });
        }

        let mut seen = HashSet::new();
        for path in output.iter().flat_map(|e| e.paths.iter()) {
            if !seen.insert(path.as_str()) {
                return Err(SnakewrapError::DuplicateOutput(path.clone()));
            }
        }

        let params = self.bind_params(def)?;

        let threads = match self.threads {
            Some(0) => {
                return Err(SnakewrapError::InvalidParam {
                    param: "threads".to_string(),
                    reason: "must be at least 1".to_string(),
                });
            }
            Some(t) => {
                if !def.threaded {
                    log::warn!("Wrapper {} ignores threads, passing {} anyway", def.name, t);
                }
                Some(t)
            }
            None if def.threaded => Some(settings.default_threads.max(1)),
            None => None,
        };

        let log = match &self.log {
            Some(path) if path.trim().is_empty() => return Err(SnakewrapError::EmptyPath("log".to_string())),
            Some(path) => Some(path.trim().to_string()),
            None => settings
                .log_dir
                .as_deref()
                .map(|dir| format!("{}/{}.log", dir.trim_end_matches('/'), name)),
        };

        let rule = Rule {
            name,
            input,
            output,
            params,
            threads,
            log,
            wrapper: wrapper_reference(def, &settings.version),
        };
        log::debug!("Bound {} to rule '{}'", def.name, rule.name);
        Ok(rule)
    }

    fn bind_params(&self, def: &WrapperDef) -> Result<Vec<(String, ParamValue)>> {
        let mut given: HashMap<&str, ParamValue> = HashMap::new();
        for (name, arg) in &self.params {
            let param = def.param_def(name).ok_or_else(|| SnakewrapError::UnknownParam {
                wrapper: def.name.clone(),
                param: name.clone(),
            })?;
            let value = match arg {
                ParamArg::Text(text) => param.kind.parse(name, text)?,
                ParamArg::Value(value) => param.kind.check(name, value.clone())?,
            };
            if given.insert(param.name.as_str(), value).is_some() {
                return Err(SnakewrapError::InvalidParam {
                    param: name.clone(),
                    reason: "given more than once".to_string(),
                });
            }
        }

        let mut params = Vec::new();
        for param in &def.params {
            let value = match given.remove(param.name.as_str()) {
                Some(value) => value,
                None => match &param.default {
                    Some(default) => default.clone(),
                    None if param.required => {
                        return Err(SnakewrapError::MissingParam {
                            wrapper: def.name.clone(),
                            param: param.name.clone(),
                        });
                    }
                    None => continue,
                },
            };
            params.push((param.name.clone(), value));
        }
        Ok(params)
    }
}

/// Full wrapper reference: `<version>/<path>`, or the path alone when it is
/// already a URL/`file:` reference or no version is configured
pub fn wrapper_reference(def: &WrapperDef, version: &str) -> String {
    let path = def.wrapper_path();
    let version = version.trim_matches('/');
    if version.is_empty() || path.contains("://") || path.starts_with("file:") {
        path
    } else {
        format!("{}/{}", version, path)
    }
}

fn has_glob_chars(path: &str) -> bool {
    path.contains(['*', '?', '['])
}

fn expand_glob(pattern: &str) -> Result<Vec<String>> {
    let paths = glob::glob(pattern).map_err(|_| SnakewrapError::NoGlobMatch(pattern.to_string()))?;
    let mut matched: Vec<String> = paths
        .flatten()
        .map(|p| p.to_string_lossy().into_owned())
        .collect();
    matched.sort();
    if matched.is_empty() {
        return Err(SnakewrapError::NoGlobMatch(pattern.to_string()));
    }
    Ok(matched)
}

fn bind_slots(
    def: &WrapperDef,
    direction: &'static str,
    slots: &[SlotDef],
    default: Option<&SlotDef>,
    args: &[(Option<String>, String)],
) -> Result<Vec<Entry>> {
    let mut bound: HashMap<&str, Vec<String>> = HashMap::new();

    for (slot_name, path) in args {
        let slot = match slot_name {
            Some(name) => slots.iter().find(|s| &s.name == name),
            None => default,
        }
        .ok_or_else(|| SnakewrapError::UnknownSlot {
            wrapper: def.name.clone(),
            direction,
            slot: slot_name.clone().unwrap_or_else(|| "(unnamed)".to_string()),
        })?;

        let path = path.trim();
        if path.is_empty() {
            return Err(SnakewrapError::EmptyPath(slot.name.clone()));
        }

        let paths = bound.entry(slot.name.as_str()).or_default();
        if direction == "input" && slot.multiple && has_glob_chars(path) {
            paths.extend(expand_glob(path)?);
        } else {
            paths.push(path.to_string());
        }
    }

    let mut entries = Vec::new();
    for slot in slots {
        let paths = bound.remove(slot.name.as_str()).unwrap_or_default();
        if paths.is_empty() {
            if slot.required {
                return Err(SnakewrapError::MissingSlot {
                    wrapper: def.name.clone(),
                    direction,
                    slot: slot.name.clone(),
                });
            }
            continue;
        }
        if paths.len() > 1 && !slot.multiple {
            return Err(SnakewrapError::TooManyPaths {
                slot: slot.name.clone(),
                count: paths.len(),
            });
        }
        entries.push(Entry {
            key: if slot.positional { None } else { Some(slot.name.clone()) },
            paths,
            multiple: slot.multiple,
            directory: slot.directory,
        });
    }
    Ok(entries)
}

/// Split a `[SLOT=]PATH` argument; the prefix only counts when it names a slot
pub fn split_slot_arg<'a>(arg: &'a str, slots: &[SlotDef]) -> (Option<&'a str>, &'a str) {
    if let Some((prefix, rest)) = arg.split_once('=')
        && slots.iter().any(|s| s.name == prefix)
    {
        return (Some(prefix), rest);
    }
    (None, arg)
}

/// Split a `NAME=VALUE` param argument
pub fn split_param_arg(arg: &str) -> Result<(&str, &str)> {
    match arg.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => Ok((name.trim(), value)),
        _ => Err(SnakewrapError::InvalidParam {
            param: arg.to_string(),
            reason: "expected NAME=VALUE".to_string(),
        }),
    }
}
