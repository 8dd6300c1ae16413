use super::{Wrapper, join_extra};
use crate::error::{Result, SnakewrapError};
use crate::invocation::Invocation;

/// `samtools sort`
#[derive(Debug, Clone, Default)]
pub struct SamtoolsSort {
    pub input: String,
    pub output: String,
    /// Sort by read name (`-n`) instead of coordinate
    pub by_name: bool,
    /// Memory per thread in MB (`-m`)
    pub mem_per_thread_mb: Option<u32>,
    pub threads: Option<u32>,
    pub extra: String,
    pub log: Option<String>,
}

impl Wrapper for SamtoolsSort {
    fn wrapper(&self) -> &'static str {
        "samtools/sort"
    }

    fn invocation(&self) -> Result<Invocation> {
        let mem = self.mem_per_thread_mb.map(|mb| format!("-m {}M", mb)).unwrap_or_default();
        let extra = join_extra([if self.by_name { "-n" } else { "" }, mem.as_str(), self.extra.as_str()]);

        let call = Invocation::new(self.wrapper())
            .input_path(self.input.clone())
            .output_path(self.output.clone())
            .param("extra", extra);
        Ok(common(call, self.threads, self.log.as_deref()))
    }
}

/// `samtools index`
#[derive(Debug, Clone, Default)]
pub struct SamtoolsIndex {
    pub input: String,
    /// Defaults to `<input>.bai`
    pub output: Option<String>,
    /// Write a CSI index (`-c`) instead of BAI
    pub csi: bool,
    pub threads: Option<u32>,
    pub extra: String,
    pub log: Option<String>,
}

impl Wrapper for SamtoolsIndex {
    fn wrapper(&self) -> &'static str {
        "samtools/index"
    }

    fn invocation(&self) -> Result<Invocation> {
        let suffix = if self.csi { "csi" } else { "bai" };
        let output = self
            .output
            .clone()
            .unwrap_or_else(|| format!("{}.{}", self.input, suffix));
        let extra = join_extra([if self.csi { "-c" } else { "" }, self.extra.as_str()]);

        let call = Invocation::new(self.wrapper())
            .input_path(self.input.clone())
            .output_path(output)
            .param("extra", extra);
        Ok(common(call, self.threads, self.log.as_deref()))
    }
}

/// `samtools view` filtering and conversion
#[derive(Debug, Clone, Default)]
pub struct SamtoolsView {
    pub input: String,
    pub output: String,
    /// Minimum mapping quality (`-q`)
    pub min_mapq: Option<u32>,
    /// Required flags (`-f`)
    pub require_flags: Option<u32>,
    /// Excluded flags (`-F`)
    pub exclude_flags: Option<u32>,
    /// Fraction of reads kept (`--subsample`), in (0, 1]
    pub subsample: Option<f64>,
    pub region: Option<String>,
    pub threads: Option<u32>,
    pub extra: String,
    pub log: Option<String>,
}

impl Wrapper for SamtoolsView {
    fn wrapper(&self) -> &'static str {
        "samtools/view"
    }

    fn invocation(&self) -> Result<Invocation> {
        if let Some(fraction) = self.subsample
            && !(fraction > 0.0 && fraction <= 1.0)
        {
            return Err(SnakewrapError::InvalidParam {
                param: "subsample".to_string(),
                reason: format!("must be in (0, 1], got {}", fraction),
            });
        }

        let mut opts = Vec::new();
        if let Some(q) = self.min_mapq {
            opts.push(format!("-q {}", q));
        }
        if let Some(f) = self.require_flags {
            opts.push(format!("-f {}", f));
        }
        if let Some(f) = self.exclude_flags {
            opts.push(format!("-F {}", f));
        }
        if let Some(fraction) = self.subsample {
            opts.push(format!("--subsample {}", fraction));
        }
        if self.output.ends_with(".bam") {
            opts.push("-b".to_string());
        } else if self.output.ends_with(".cram") {
            opts.push("-C".to_string());
        }
        opts.push(self.extra.clone());

        let call = Invocation::new(self.wrapper())
            .input_path(self.input.clone())
            .output_path(self.output.clone())
            .param("extra", join_extra(opts.iter().map(String::as_str)))
            .param_opt("region", self.region.clone());
        Ok(common(call, self.threads, self.log.as_deref()))
    }
}

fn common(mut call: Invocation, threads: Option<u32>, log: Option<&str>) -> Invocation {
    if let Some(threads) = threads {
        call = call.threads(threads);
    }
    if let Some(log) = log {
        call = call.log(log);
    }
    call
}
