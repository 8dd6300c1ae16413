//! Wrapper definitions
//!
//! A `WrapperDef` describes one snakemake wrapper: which input and output
//! slots it has, which params it takes and where the wrapper lives.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SnakewrapError};
use crate::rule::{ParamKind, ParamValue, validate_rule_name};

fn default_true() -> bool {
    true
}

/// An input or output slot of a wrapper
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotDef {
    /// Slot name, also the keyword used in the rule unless positional
    pub name: String,

    /// Rendered without a keyword
    #[serde(default)]
    pub positional: bool,

    #[serde(default = "default_true")]
    pub required: bool,

    /// Accepts a list of paths
    #[serde(default)]
    pub multiple: bool,

    /// Output is a directory
    #[serde(default)]
    pub directory: bool,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

impl SlotDef {
    /// A required keyword slot
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            positional: false,
            required: true,
            multiple: false,
            directory: false,
            description: String::new(),
        }
    }

    /// A required positional slot
    pub fn positional(name: impl Into<String>) -> Self {
        Self {
            positional: true,
            ..Self::named(name)
        }
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn multiple(mut self) -> Self {
        self.multiple = true;
        self
    }

    pub fn directory(mut self) -> Self {
        self.directory = true;
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// A parameter accepted by a wrapper
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamDef {
    pub name: String,

    #[serde(default)]
    pub kind: ParamKind,

    #[serde(default)]
    pub required: bool,

    /// Value used when the caller does not set the param
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<ParamValue>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

impl ParamDef {
    pub fn new(name: impl Into<String>, kind: ParamKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: false,
            default: None,
            description: String::new(),
        }
    }

    /// Free-form string param, the `extra` of most wrappers
    pub fn str(name: impl Into<String>) -> Self {
        Self::new(name, ParamKind::Str)
    }

    pub fn int(name: impl Into<String>) -> Self {
        Self::new(name, ParamKind::Int)
    }

    pub fn float(name: impl Into<String>) -> Self {
        Self::new(name, ParamKind::Float)
    }

    pub fn bool(name: impl Into<String>) -> Self {
        Self::new(name, ParamKind::Bool)
    }

    pub fn path(name: impl Into<String>) -> Self {
        Self::new(name, ParamKind::Path)
    }

    pub fn list(name: impl Into<String>) -> Self {
        Self::new(name, ParamKind::List)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn default_value(mut self, value: impl Into<ParamValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Definition of one snakemake wrapper
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WrapperDef {
    /// Catalog key, e.g. `samtools/sort`
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Path inside the wrapper repository; `bio/<name>` when empty
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub path: String,

    #[serde(default)]
    pub input: Vec<SlotDef>,

    #[serde(default)]
    pub output: Vec<SlotDef>,

    #[serde(default)]
    pub params: Vec<ParamDef>,

    /// Wrapper honours `threads`
    #[serde(default)]
    pub threaded: bool,
}

impl WrapperDef {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            path: String::new(),
            input: Vec::new(),
            output: Vec::new(),
            params: Vec::new(),
            threaded: false,
        }
    }

    /// Load a wrapper definition from a YAML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        let def: Self = serde_yaml::from_str(&content)?;
        def.validate()?;
        Ok(def)
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn input(mut self, slot: SlotDef) -> Self {
        self.input.push(slot);
        self
    }

    pub fn output(mut self, slot: SlotDef) -> Self {
        self.output.push(slot);
        self
    }

    pub fn param(mut self, param: ParamDef) -> Self {
        self.params.push(param);
        self
    }

    pub fn threaded(mut self) -> Self {
        self.threaded = true;
        self
    }

    /// Path inside the wrapper repository
    pub fn wrapper_path(&self) -> String {
        if self.path.is_empty() {
            format!("bio/{}", self.name)
        } else {
            self.path.clone()
        }
    }

    /// Tool family, the part of the name before the first `/`
    pub fn tool(&self) -> &str {
        self.name.split('/').next().unwrap_or(&self.name)
    }

    pub fn input_slot(&self, name: &str) -> Option<&SlotDef> {
        self.input.iter().find(|s| s.name == name)
    }

    pub fn output_slot(&self, name: &str) -> Option<&SlotDef> {
        self.output.iter().find(|s| s.name == name)
    }

    pub fn param_def(&self, name: &str) -> Option<&ParamDef> {
        self.params.iter().find(|p| p.name == name)
    }

    /// Slot that bare (unnamed) input paths bind to
    pub fn default_input(&self) -> Option<&SlotDef> {
        default_slot(&self.input)
    }

    /// Slot that bare (unnamed) output paths bind to
    pub fn default_output(&self) -> Option<&SlotDef> {
        default_slot(&self.output)
    }

    /// Check the definition is internally consistent
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: String| SnakewrapError::InvalidDefinition {
            name: self.name.clone(),
            reason,
        };

        if self.name.trim().is_empty() {
            return Err(invalid("name is empty".to_string()));
        }
        if self.output.is_empty() {
            return Err(invalid("no output slots".to_string()));
        }

        for (direction, slots) in [("input", &self.input), ("output", &self.output)] {
            let mut seen = HashSet::new();
            for slot in slots {
                if slot.name.trim().is_empty() {
                    return Err(invalid(format!("{} slot with empty name", direction)));
                }
                if !seen.insert(slot.name.as_str()) {
                    return Err(invalid(format!("duplicate {} slot '{}'", direction, slot.name)));
                }
                // Keyword slots render as `name=...`
                if !slot.positional && validate_rule_name(&slot.name).is_err() {
                    return Err(invalid(format!(
                        "{} slot '{}' is not a valid identifier",
                        direction, slot.name
                    )));
                }
            }
            if slots.iter().filter(|s| s.positional).count() > 1 {
                return Err(invalid(format!("more than one positional {} slot", direction)));
            }
        }

        if let Some(slot) = self.input.iter().find(|s| s.directory) {
            return Err(invalid(format!("input slot '{}' marked as directory", slot.name)));
        }

        let mut seen = HashSet::new();
        for param in &self.params {
            if !seen.insert(param.name.as_str()) {
                return Err(invalid(format!("duplicate param '{}'", param.name)));
            }
            if validate_rule_name(&param.name).is_err() {
                return Err(invalid(format!("param '{}' is not a valid identifier", param.name)));
            }
            if let Some(default) = &param.default {
                param.kind.check(&param.name, default.clone())?;
            }
        }

        Ok(())
    }
}

fn default_slot(slots: &[SlotDef]) -> Option<&SlotDef> {
    slots
        .iter()
        .find(|s| s.positional)
        .or_else(|| if slots.len() == 1 { slots.first() } else { None })
}
