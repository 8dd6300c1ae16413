use super::{Wrapper, join_extra};
use crate::error::{Result, SnakewrapError};
use crate::invocation::Invocation;

/// `bedtools intersect` of two feature files
#[derive(Debug, Clone, Default)]
pub struct BedtoolsIntersect {
    pub left: String,
    pub right: String,
    pub output: String,
    /// Minimum overlap as a fraction of the left feature (`-f`)
    pub min_overlap: Option<f64>,
    /// Require the fraction on both sides (`-r`)
    pub reciprocal: bool,
    /// Report left features without overlap (`-v`)
    pub invert: bool,
    /// Report each left feature once (`-u`)
    pub unique: bool,
    pub extra: String,
    pub log: Option<String>,
}

impl Wrapper for BedtoolsIntersect {
    fn wrapper(&self) -> &'static str {
        "bedtools/intersect"
    }

    fn invocation(&self) -> Result<Invocation> {
        if self.invert && self.unique {
            return Err(SnakewrapError::InvalidParam {
                param: "invert".to_string(),
                reason: "cannot be combined with unique".to_string(),
            });
        }
        if self.reciprocal && self.min_overlap.is_none() {
            return Err(SnakewrapError::InvalidParam {
                param: "reciprocal".to_string(),
                reason: "requires min_overlap".to_string(),
            });
        }

        let mut opts = Vec::new();
        if let Some(fraction) = self.min_overlap {
            if !(fraction > 0.0 && fraction <= 1.0) {
                return Err(SnakewrapError::InvalidParam {
                    param: "min_overlap".to_string(),
                    reason: format!("must be in (0, 1], got {}", fraction),
                });
            }
            opts.push(format!("-f {}", fraction));
        }
        if self.reciprocal {
            opts.push("-r".to_string());
        }
        if self.invert {
            opts.push("-v".to_string());
        }
        if self.unique {
            opts.push("-u".to_string());
        }
        opts.push(self.extra.clone());

        let mut call = Invocation::new(self.wrapper())
            .input("left", self.left.clone())
            .input("right", self.right.clone())
            .output_path(self.output.clone())
            .param("extra", join_extra(opts.iter().map(String::as_str)));
        if let Some(log) = &self.log {
            call = call.log(log.clone());
        }
        Ok(call)
    }
}
