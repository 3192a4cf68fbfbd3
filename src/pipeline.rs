//! The seam between the search core and the external classifier tooling.
//!
//! The search only ever talks to a [`ClassifierPipeline`]: train a model
//! from a named parameter set, predict with it, score the prediction
//! against reference labels, and clean the transient artifacts up. The
//! production implementation shells out to the geospatial toolchain
//! ([`GrassPipeline`](crate::grass::GrassPipeline)); tests substitute a
//! deterministic stub.

use core::fmt;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::Result;
use crate::params::SvmParams;

/// Which step of the external chain an error came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineStep {
    Train,
    Predict,
    Score,
    Cleanup,
}

impl fmt::Display for PipelineStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PipelineStep::Train => "training",
            PipelineStep::Predict => "prediction",
            PipelineStep::Score => "scoring",
            PipelineStep::Cleanup => "cleanup",
        })
    }
}

/// The metrics reported by the scoring step.
///
/// Deserialized from the score tool's structured (JSON) output; a missing
/// or non-numeric key is a malformed-output failure, not a panic.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct Scores {
    /// Matthews correlation coefficient, theoretically in `[-1, 1]`.
    pub mcc: f64,
    /// Cohen's kappa.
    pub kappa: f64,
    /// Overall classification accuracy.
    pub overall_accuracy: f64,
}

/// One train → predict → score chain plus artifact cleanup.
///
/// Every method may fail independently; the evaluator maps any failure to
/// the penalty fitness instead of propagating it. Implementations must be
/// safe to call concurrently: parallel evaluations share one pipeline
/// value and distinguish their transient artifacts by handle name only.
#[async_trait]
pub trait ClassifierPipeline: Send + Sync {
    /// Trains a model with the given hyperparameters, storing it under
    /// `signature`.
    async fn train(&self, params: &SvmParams, signature: &str) -> Result<()>;

    /// Classifies the evaluation data with the model stored under
    /// `signature`, writing the result under `output`.
    async fn predict(&self, signature: &str, output: &str) -> Result<()>;

    /// Scores the classification stored under `output` against the
    /// reference labels.
    async fn score(&self, output: &str) -> Result<Scores>;

    /// Removes the transient artifacts of one evaluation. Best-effort:
    /// callers log failures and move on.
    async fn cleanup(&self, signature: &str, output: &str) -> Result<()>;
}
