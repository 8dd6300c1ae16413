use super::{Wrapper, join_extra, validate_sample_id};
use crate::error::{Result, SnakewrapError};
use crate::invocation::Invocation;

/// Calling model for `bcftools call`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Caller {
    #[default]
    Multiallelic,
    Consensus,
}

impl Caller {
    pub fn flag(&self) -> &'static str {
        match self {
            Caller::Multiallelic => "-m",
            Caller::Consensus => "-c",
        }
    }
}

/// `bcftools call`
#[derive(Debug, Clone, Default)]
pub struct BcftoolsCall {
    pub pileup: String,
    pub calls: String,
    pub caller: Caller,
    /// Output variant sites only (`-v`)
    pub variants_only: bool,
    pub threads: Option<u32>,
    pub extra: String,
    pub log: Option<String>,
}

impl Wrapper for BcftoolsCall {
    fn wrapper(&self) -> &'static str {
        "bcftools/call"
    }

    fn invocation(&self) -> Result<Invocation> {
        let extra = join_extra([if self.variants_only { "-v" } else { "" }, self.extra.as_str()]);
        let mut call = Invocation::new(self.wrapper())
            .input("pileup", self.pileup.clone())
            .output("calls", self.calls.clone())
            .param("caller", self.caller.flag())
            .param("extra", extra);
        if let Some(threads) = self.threads {
            call = call.threads(threads);
        }
        if let Some(log) = &self.log {
            call = call.log(log.clone());
        }
        Ok(call)
    }
}

/// `bcftools view` with sample, region and quality filters
#[derive(Debug, Clone, Default)]
pub struct BcftoolsView {
    pub input: String,
    pub output: String,
    /// Keep only these samples (`-s`)
    pub samples: Vec<String>,
    /// Comma-separated regions (`-r`)
    pub regions: Option<String>,
    /// Minimum QUAL (`-i 'QUAL>=x'`)
    pub min_qual: Option<f64>,
    pub threads: Option<u32>,
    pub extra: String,
    pub log: Option<String>,
}

impl BcftoolsView {
    /// `-O` output type derived from the output extension
    fn output_type(path: &str) -> &'static str {
        if path.ends_with(".vcf.gz") {
            "-Oz"
        } else if path.ends_with(".bcf") {
            "-Ob"
        } else {
            "-Ov"
        }
    }
}

impl Wrapper for BcftoolsView {
    fn wrapper(&self) -> &'static str {
        "bcftools/view"
    }

    fn invocation(&self) -> Result<Invocation> {
        for sample in &self.samples {
            validate_sample_id(sample)?;
        }

        let mut opts = vec![Self::output_type(&self.output).to_string()];
        if !self.samples.is_empty() {
            opts.push(format!("-s {}", self.samples.join(",")));
        }
        if let Some(regions) = &self.regions {
            opts.push(format!("-r {}", regions));
        }
        if let Some(qual) = self.min_qual {
            if !qual.is_finite() || qual < 0.0 {
                return Err(SnakewrapError::InvalidParam {
                    param: "min_qual".to_string(),
                    reason: format!("must be a non-negative number, got {}", qual),
                });
            }
            opts.push(format!("-i 'QUAL>={}'", qual));
        }
        opts.push(self.extra.clone());

        let mut call = Invocation::new(self.wrapper())
            .input_path(self.input.clone())
            .output_path(self.output.clone())
            .param("extra", join_extra(opts.iter().map(String::as_str)));
        if let Some(threads) = self.threads {
            call = call.threads(threads);
        }
        if let Some(log) = &self.log {
            call = call.log(log.clone());
        }
        Ok(call)
    }
}
