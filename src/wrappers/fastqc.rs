use super::Wrapper;
use crate::error::{Result, SnakewrapError};
use crate::invocation::Invocation;

/// FastQC report for one reads file
#[derive(Debug, Clone, Default)]
pub struct Fastqc {
    pub reads: String,
    pub html: String,
    pub zip: String,
    pub mem_mb: Option<u32>,
    pub threads: Option<u32>,
    pub extra: String,
    pub log: Option<String>,
}

impl Fastqc {
    /// Reports under `dir`, named the way FastQC names them
    pub fn for_reads(reads: impl Into<String>, dir: &str) -> Self {
        let reads = reads.into();
        let base = report_stem(&reads);
        let dir = dir.trim_end_matches('/');
        Self {
            html: format!("{}/{}_fastqc.html", dir, base),
            zip: format!("{}/{}_fastqc.zip", dir, base),
            reads,
            ..Default::default()
        }
    }
}

fn report_stem(reads: &str) -> &str {
    let file = reads.rsplit('/').next().unwrap_or(reads);
    [".fastq.gz", ".fq.gz", ".fastq", ".fq", ".bam"]
        .iter()
        .find_map(|ext| file.strip_suffix(ext))
        .unwrap_or(file)
}

impl Wrapper for Fastqc {
    fn wrapper(&self) -> &'static str {
        "fastqc"
    }

    fn invocation(&self) -> Result<Invocation> {
        if self.mem_mb == Some(0) {
            return Err(SnakewrapError::InvalidParam {
                param: "mem_mb".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        let mut call = Invocation::new(self.wrapper())
            .input_path(self.reads.clone())
            .output("html", self.html.clone())
            .output("zip", self.zip.clone())
            .param("extra", self.extra.clone())
            .param_opt("mem_mb", self.mem_mb);
        if let Some(threads) = self.threads {
            call = call.threads(threads);
        }
        if let Some(log) = &self.log {
            call = call.log(log.clone());
        }
        Ok(call)
    }
}
