//! Parameter values and their Python-literal form
//!
//! Rule blocks are Python, so every value that lands in a rule has to be
//! rendered as a Python literal.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SnakewrapError};

/// Quote a string as a double-quoted Python string literal
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

/// A parameter value passed into the `params:` section of a rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<String>),
}

impl ParamValue {
    /// Render as a Python literal
    pub fn to_python(&self) -> String {
        match self {
            Self::Bool(true) => "True".to_string(),
            Self::Bool(false) => "False".to_string(),
            Self::Int(i) => i.to_string(),
            Self::Float(f) if f.is_nan() => "float(\"nan\")".to_string(),
            Self::Float(f) if f.is_infinite() => {
                if *f > 0.0 {
                    "float(\"inf\")".to_string()
                } else {
                    "float(\"-inf\")".to_string()
                }
            }
            Self::Float(f) if f.fract() == 0.0 => format!("{:.1}", f),
            Self::Float(f) => f.to_string(),
            Self::Str(s) => quote(s),
            Self::List(items) => {
                let quoted: Vec<String> = items.iter().map(|s| quote(s)).collect();
                format!("[{}]", quoted.join(", "))
            }
        }
    }

    /// Short kind name used in error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "str",
            Self::List(_) => "list",
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_python())
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for ParamValue {
    fn from(v: i32) -> Self {
        Self::Int(v as i64)
    }
}

impl From<u32> for ParamValue {
    fn from(v: u32) -> Self {
        Self::Int(v as i64)
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(v: Vec<String>) -> Self {
        Self::List(v)
    }
}

impl From<Vec<&str>> for ParamValue {
    fn from(v: Vec<&str>) -> Self {
        Self::List(v.into_iter().map(String::from).collect())
    }
}

/// Declared kind of a wrapper parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamKind {
    #[default]
    Str,
    Int,
    Float,
    Bool,
    Path,
    List,
}

impl ParamKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Str => "str",
            Self::Int => "int",
            Self::Float => "float",
            Self::Bool => "bool",
            Self::Path => "path",
            Self::List => "list",
        }
    }

    /// Parse command-line text into a value of this kind
    pub fn parse(&self, param: &str, text: &str) -> Result<ParamValue> {
        let invalid = || SnakewrapError::InvalidParam {
            param: param.to_string(),
            reason: format!("expected {}, got {}", self.as_str(), quote(text)),
        };
        match self {
            Self::Str | Self::Path => Ok(ParamValue::Str(text.to_string())),
            Self::Int => text.trim().parse::<i64>().map(ParamValue::Int).map_err(|_| invalid()),
            Self::Float => text.trim().parse::<f64>().map(ParamValue::Float).map_err(|_| invalid()),
            Self::Bool => match text.trim().to_lowercase().as_str() {
                "true" | "yes" | "1" => Ok(ParamValue::Bool(true)),
                "false" | "no" | "0" => Ok(ParamValue::Bool(false)),
                _ => Err(invalid()),
            },
            Self::List => Ok(ParamValue::List(
                text.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect(),
            )),
        }
    }

    /// Check a value against this kind, widening where the conversion is lossless
    pub fn check(&self, param: &str, value: ParamValue) -> Result<ParamValue> {
        match (self, value) {
            (Self::Str | Self::Path, v @ ParamValue::Str(_)) => Ok(v),
            (Self::Int, v @ ParamValue::Int(_)) => Ok(v),
            (Self::Float, v @ ParamValue::Float(_)) => Ok(v),
            (Self::Float, ParamValue::Int(i)) => Ok(ParamValue::Float(i as f64)),
            (Self::Bool, v @ ParamValue::Bool(_)) => Ok(v),
            (Self::List, v @ ParamValue::List(_)) => Ok(v),
            (Self::List, ParamValue::Str(s)) => Ok(ParamValue::List(vec![s])),
            (kind, other) => Err(SnakewrapError::InvalidParam {
                param: param.to_string(),
                reason: format!("expected {}, got {} {}", kind.as_str(), other.kind_name(), other),
            }),
        }
    }
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
