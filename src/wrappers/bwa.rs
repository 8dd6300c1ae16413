use serde::{Deserialize, Serialize};

use super::{Wrapper, join_extra, validate_sample_id};
use crate::error::Result;
use crate::invocation::Invocation;

/// Post-alignment sorting done by the bwa/mem wrapper
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sorting {
    #[default]
    None,
    Samtools,
    Picard,
}

impl Sorting {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sorting::None => "none",
            Sorting::Samtools => "samtools",
            Sorting::Picard => "picard",
        }
    }
}

/// `bwa mem` alignment of one sample
#[derive(Debug, Clone, Default)]
pub struct BwaMem {
    /// One FASTQ for single-end, two for paired-end
    pub reads: Vec<String>,
    pub index: Vec<String>,
    pub bam: String,
    /// Written into the read group as ID and SM
    pub sample: Option<String>,
    pub sorting: Sorting,
    pub threads: Option<u32>,
    pub extra: String,
    pub log: Option<String>,
}

impl BwaMem {
    /// Read group header line, with `\t` left for bwa to expand
    fn read_group(sample: &str) -> String {
        format!(r"-R '@RG\tID:{sample}\tSM:{sample}'")
    }
}

impl Wrapper for BwaMem {
    fn wrapper(&self) -> &'static str {
        "bwa/mem"
    }

    fn invocation(&self) -> Result<Invocation> {
        let read_group = match &self.sample {
            Some(sample) => {
                validate_sample_id(sample)?;
                Self::read_group(sample)
            }
            None => String::new(),
        };

        let mut call = Invocation::new(self.wrapper())
            .inputs("reads", self.reads.iter().cloned())
            .inputs("idx", self.index.iter().cloned())
            .output_path(self.bam.clone())
            .param("extra", join_extra([read_group.as_str(), self.extra.as_str()]))
            .param("sorting", self.sorting.as_str());
        if let Some(threads) = self.threads {
            call = call.threads(threads);
        }
        if let Some(log) = &self.log {
            call = call.log(log.clone());
        }
        Ok(call)
    }
}
