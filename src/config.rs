//! Fail-fast resolution of raw option values into a validated search
//! configuration.
//!
//! Everything here runs before any external work: a bad option aborts
//! with a configuration error instead of surfacing mid-search.

use std::time::Duration;

use crate::error::{Error, Result};
use crate::params::{KernelType, Measure, SvmType, Tunable};
use crate::pso::PsoConfig;
use crate::space::{RawVariable, VariableSpace};

/// Option values as the command line delivers them, before validation.
#[derive(Clone, Debug)]
pub struct RawOptions {
    pub measure: String,
    pub svm_type: String,
    pub kernel: String,
    pub population: usize,
    pub steps: usize,
    pub seed: u64,
    /// Worker pool size; `None` means available parallelism.
    pub workers: Option<usize>,
    /// Per-step timeout in seconds; 0 means unlimited.
    pub timeout_secs: u64,
    pub cost: String,
    pub gamma: String,
    pub degree: String,
    pub coef0: String,
    pub eps: String,
    pub nu: String,
}

/// The validated search configuration.
#[derive(Clone, Debug)]
pub struct SearchConfig {
    pub measure: Measure,
    pub svm_type: SvmType,
    pub kernel: KernelType,
    pub pso: PsoConfig,
    pub workers: usize,
    pub timeout: Option<Duration>,
    pub space: VariableSpace,
}

impl SearchConfig {
    /// Validates every option and resolves the variable space.
    ///
    /// # Errors
    ///
    /// Any [`Error`] produced here is a configuration error: unknown
    /// selector values, unparseable numbers, a wrong value count for a
    /// tunable, a zero population or step budget, or a space with no
    /// optimization dimension.
    pub fn resolve(raw: &RawOptions) -> Result<Self> {
        let measure: Measure = raw.measure.parse()?;
        let svm_type: SvmType = raw.svm_type.parse()?;
        let kernel: KernelType = raw.kernel.parse()?;

        let pso = PsoConfig {
            population: raw.population,
            steps: raw.steps,
            seed: raw.seed,
            ..PsoConfig::default()
        };
        pso.validate()?;

        let workers = match raw.workers {
            Some(0) => {
                return Err(Error::BadSetting {
                    name: "workers",
                    reason: "must be at least 1".to_string(),
                });
            }
            Some(n) => n,
            None => std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get),
        };

        let timeout = match raw.timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };

        let mut variables = Vec::with_capacity(Tunable::ALL.len());
        for tunable in Tunable::ALL {
            let values = parse_values(tunable, raw_value(raw, tunable))?;
            variables.push(RawVariable { tunable, values });
        }
        let space = VariableSpace::resolve(variables)?;

        Ok(Self {
            measure,
            svm_type,
            kernel,
            pso,
            workers,
            timeout,
            space,
        })
    }
}

fn raw_value(raw: &RawOptions, tunable: Tunable) -> &str {
    match tunable {
        Tunable::Cost => &raw.cost,
        Tunable::Gamma => &raw.gamma,
        Tunable::Degree => &raw.degree,
        Tunable::Coef0 => &raw.coef0,
        Tunable::Eps => &raw.eps,
        Tunable::Nu => &raw.nu,
    }
}

/// Parses a tunable's option text: one number fixes it, two
/// comma-separated numbers declare a range.
///
/// # Errors
///
/// [`Error::BadValue`] naming the parameter when a token is not numeric.
/// (The value-count check happens in [`VariableSpace::resolve`].)
pub fn parse_values(tunable: Tunable, text: &str) -> Result<Vec<f64>> {
    text.split(',')
        .map(|token| {
            let token = token.trim();
            token.parse::<f64>().map_err(|_| Error::BadValue {
                name: tunable.name(),
                token: token.to_string(),
            })
        })
        .collect()
}
