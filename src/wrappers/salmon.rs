use super::{Wrapper, validate_sample_id};
use crate::error::{Result, SnakewrapError};
use crate::invocation::Invocation;

/// `salmon quant` for one sample
///
/// Outputs land in `<out_dir>/<sample>/quant.sf` and
/// `<out_dir>/<sample>/lib_format_counts.json`.
#[derive(Debug, Clone, Default)]
pub struct SalmonQuant {
    pub sample: String,
    pub index: String,
    pub r1: Option<String>,
    pub r2: Option<String>,
    /// Unpaired reads
    pub reads: Vec<String>,
    pub out_dir: String,
    /// Library type, `A` (automatic) when unset
    pub libtype: Option<String>,
    pub threads: Option<u32>,
    pub extra: String,
    pub log: Option<String>,
}

impl SalmonQuant {
    fn sample_dir(&self) -> String {
        format!("{}/{}", self.out_dir.trim_end_matches('/'), self.sample)
    }
}

impl Wrapper for SalmonQuant {
    fn wrapper(&self) -> &'static str {
        "salmon/quant"
    }

    fn invocation(&self) -> Result<Invocation> {
        validate_sample_id(&self.sample)?;

        let paired = self.r1.is_some() || self.r2.is_some();
        if paired && (self.r1.is_none() || self.r2.is_none()) {
            return Err(SnakewrapError::MissingSlot {
                wrapper: self.wrapper().to_string(),
                direction: "input",
                slot: if self.r1.is_none() { "r1" } else { "r2" }.to_string(),
            });
        }
        if paired == !self.reads.is_empty() {
            return Err(SnakewrapError::InvalidParam {
                param: "reads".to_string(),
                reason: "give either r1 and r2 or unpaired reads".to_string(),
            });
        }

        let dir = self.sample_dir();
        let mut call = Invocation::new(self.wrapper())
            .input("index", self.index.clone())
            .inputs("r", self.reads.iter().cloned())
            .output("quant", format!("{}/quant.sf", dir))
            .output("lib", format!("{}/lib_format_counts.json", dir))
            .param_opt("libtype", self.libtype.clone())
            .param("extra", self.extra.clone())
            .name(format!("salmon_quant_{}", self.sample.replace(['.', '-'], "_")));
        if let (Some(r1), Some(r2)) = (&self.r1, &self.r2) {
            call = call.input("r1", r1.clone()).input("r2", r2.clone());
        }
        if let Some(threads) = self.threads {
            call = call.threads(threads);
        }
        call = call.log(
            self.log
                .clone()
                .unwrap_or_else(|| format!("logs/salmon/{}.log", self.sample)),
        );
        Ok(call)
    }
}
