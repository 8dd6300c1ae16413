//! Typed wrapper calls
//!
//! Each struct holds the arguments for one wrapper with real types and turns
//! them into an `Invocation` for the generic bind/render/run path.

mod bcftools;
mod bedtools;
mod bwa;
mod fastqc;
mod gatk;
mod salmon;
mod samtools;

pub use bcftools::{BcftoolsCall, BcftoolsView, Caller};
pub use bedtools::BedtoolsIntersect;
pub use bwa::{BwaMem, Sorting};
pub use fastqc::Fastqc;
pub use gatk::GatkHaplotypeCaller;
pub use salmon::SalmonQuant;
pub use samtools::{SamtoolsIndex, SamtoolsSort, SamtoolsView};

use crate::error::{Result, SnakewrapError};
use crate::invocation::Invocation;

/// A typed call of one catalog wrapper
pub trait Wrapper {
    /// Catalog name of the wrapper, e.g. `samtools/sort`
    fn wrapper(&self) -> &'static str;

    /// Arguments for the generic path; fails on invalid typed values
    fn invocation(&self) -> Result<Invocation>;
}

/// Check a sample ID: non-empty, only `[A-Za-z0-9._-]`, not made of dots alone
pub fn validate_sample_id(sample: &str) -> Result<()> {
    let valid = !sample.is_empty()
        && !sample.chars().all(|c| c == '.')
        && sample
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
    if valid {
        Ok(())
    } else {
        Err(SnakewrapError::InvalidSampleId(sample.to_string()))
    }
}

/// Join non-empty option fragments into one `extra` string
fn join_extra<'a>(parts: impl IntoIterator<Item = &'a str>) -> String {
    parts
        .into_iter()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
