//! Validated rule model
//!
//! A `Rule` is what an `Invocation` becomes once it has been checked against
//! its wrapper definition. Everything in here is ready to render.

use serde::Serialize;

use super::value::{ParamValue, quote};
use crate::error::{Result, SnakewrapError};

/// Paths bound to one input or output slot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entry {
    /// Keyword name, `None` for positional entries
    pub key: Option<String>,
    pub paths: Vec<String>,
    /// Render as a list even when there is a single path
    pub multiple: bool,
    /// Wrap in `directory(...)`
    pub directory: bool,
}

impl Entry {
    pub fn positional(path: impl Into<String>) -> Self {
        Self {
            key: None,
            paths: vec![path.into()],
            multiple: false,
            directory: false,
        }
    }

    pub fn named(key: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            paths: vec![path.into()],
            multiple: false,
            directory: false,
        }
    }

    /// Render as one line of an `input:`/`output:` section, without the trailing comma
    pub fn to_python(&self) -> String {
        let wrap = |p: &String| {
            if self.directory {
                format!("directory({})", quote(p))
            } else {
                quote(p)
            }
        };
        let value = if self.multiple {
            let items: Vec<String> = self.paths.iter().map(wrap).collect();
            format!("[{}]", items.join(", "))
        } else {
            self.paths.first().map(wrap).unwrap_or_else(|| quote(""))
        };
        match &self.key {
            Some(key) => format!("{}={}", key, value),
            None => value,
        }
    }
}

/// A rule block ready for rendering
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rule {
    pub name: String,
    pub input: Vec<Entry>,
    pub output: Vec<Entry>,
    pub params: Vec<(String, ParamValue)>,
    pub threads: Option<u32>,
    pub log: Option<String>,
    /// Wrapper reference, e.g. `v3.0.0/bio/samtools/sort`
    pub wrapper: String,
}

impl Rule {
    /// Every declared output path, in declaration order
    pub fn output_paths(&self) -> Vec<&str> {
        self.output
            .iter()
            .flat_map(|e| e.paths.iter().map(String::as_str))
            .collect()
    }

    /// Every declared input path, in declaration order
    pub fn input_paths(&self) -> Vec<&str> {
        self.input
            .iter()
            .flat_map(|e| e.paths.iter().map(String::as_str))
            .collect()
    }

    pub fn param(&self, name: &str) -> Option<&ParamValue> {
        self.params.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }
}

/// Check that a rule name is a valid Python identifier
pub fn validate_rule_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => chars.all(|c| c.is_ascii_alphanumeric() || c == '_'),
        _ => false,
    };
    if valid {
        Ok(())
    } else {
        Err(SnakewrapError::InvalidRuleName(name.to_string()))
    }
}

/// Derive a rule name from a wrapper name (`samtools/sort` -> `samtools_sort`)
pub fn rule_name_for(wrapper: &str) -> String {
    let mut name: String = wrapper
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if name.chars().next().is_none_or(|c| c.is_ascii_digit()) {
        name.insert(0, '_');
    }
    name
}
