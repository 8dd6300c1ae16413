use super::{Wrapper, join_extra};
use crate::error::{Result, SnakewrapError};
use crate::invocation::Invocation;

/// `gatk HaplotypeCaller`; writes a GVCF when `gvcf` is set, a VCF otherwise
#[derive(Debug, Clone, Default)]
pub struct GatkHaplotypeCaller {
    pub bam: String,
    pub reference: String,
    pub output: String,
    pub gvcf: bool,
    pub known: Option<String>,
    pub intervals: Option<String>,
    /// `--standard-min-confidence-threshold-for-calling`
    pub min_confidence: Option<f64>,
    /// JVM heap in MB, passed as `-Xmx<n>m`
    pub java_mem_mb: Option<u32>,
    pub threads: Option<u32>,
    pub extra: String,
    pub log: Option<String>,
}

impl Wrapper for GatkHaplotypeCaller {
    fn wrapper(&self) -> &'static str {
        "gatk/haplotypecaller"
    }

    fn invocation(&self) -> Result<Invocation> {
        let confidence = match self.min_confidence {
            Some(c) if !c.is_finite() || c < 0.0 => {
                return Err(SnakewrapError::InvalidParam {
                    param: "min_confidence".to_string(),
                    reason: format!("must be a non-negative number, got {}", c),
                });
            }
            Some(c) => format!("--standard-min-confidence-threshold-for-calling {}", c),
            None => String::new(),
        };

        let mut call = Invocation::new(self.wrapper())
            .input("bam", self.bam.clone())
            .input("ref", self.reference.clone())
            .output(if self.gvcf { "gvcf" } else { "vcf" }, self.output.clone())
            .param("extra", join_extra([confidence.as_str(), self.extra.as_str()]))
            .param_opt("java_opts", self.java_mem_mb.map(|mb| format!("-Xmx{}m", mb)));
        if let Some(known) = &self.known {
            call = call.input("known", known.clone());
        }
        if let Some(intervals) = &self.intervals {
            call = call.input("intervals", intervals.clone());
        }
        if let Some(threads) = self.threads {
            call = call.threads(threads);
        }
        if let Some(log) = &self.log {
            call = call.log(log.clone());
        }
        Ok(call)
    }
}
