//! Rule blocks - validated model, Python literal values and rendering

mod block;
mod render;
mod value;

pub use block::{Entry, Rule, rule_name_for, validate_rule_name};
pub use render::{RULE_TEMPLATE, RuleContext, RuleRenderer};
pub use value::{ParamKind, ParamValue, quote};
