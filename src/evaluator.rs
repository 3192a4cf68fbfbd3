//! Maps one candidate vector to a scalar fitness via the external pipeline.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, warn};

use crate::params::{Measure, SvmParams};
use crate::pipeline::{ClassifierPipeline, Scores};
use crate::sink::{ResultRecord, ResultSink};
use crate::space::VariableSpace;

/// Fitness assigned to any failed or degenerate evaluation.
///
/// Valid evaluations score `1 - metric`, which stays within `[0, 2]`, so
/// the penalty is strictly worse than any attainable real score.
pub const PENALTY_FITNESS: f64 = 10.0;

static NEXT_EVAL_ID: AtomicU64 = AtomicU64::new(0);

/// Collision-resistant tag for one evaluation's transient artifacts.
///
/// Concurrent evaluations share the external storage namespace, so every
/// signature and output handle carries a process-unique sequence number
/// plus a random suffix.
fn transient_tag() -> String {
    let seq = NEXT_EVAL_ID.fetch_add(1, Ordering::Relaxed);
    let suffix: String = core::iter::repeat_with(fastrand::alphanumeric)
        .take(6)
        .collect();
    format!("{}_{}_{}", std::process::id(), seq, suffix)
}

/// Evaluates candidates: rebuilds the named parameter set, runs
/// train → predict → score, translates failures into the penalty fitness,
/// and reports every outcome to the result sink.
pub struct Evaluator<P> {
    space: Arc<VariableSpace>,
    pipeline: P,
    sink: Arc<ResultSink>,
    measure: Measure,
}

impl<P: ClassifierPipeline> Evaluator<P> {
    /// Creates an evaluator over a resolved space and a pipeline.
    #[must_use]
    pub fn new(
        space: Arc<VariableSpace>,
        pipeline: P,
        sink: Arc<ResultSink>,
        measure: Measure,
    ) -> Self {
        Self {
            space,
            pipeline,
            sink,
            measure,
        }
    }

    /// Computes the fitness of one candidate. Lower is better.
    ///
    /// Never fails: pipeline errors, malformed score output, and
    /// out-of-range metrics all collapse into [`PENALTY_FITNESS`], and
    /// the search keeps moving. Exactly one [`ResultRecord`] is emitted
    /// per call, before cleanup runs.
    pub async fn evaluate(&self, candidate: &[f64]) -> f64 {
        let params = SvmParams::from_candidate(&self.space, candidate);
        let tag = transient_tag();
        let signature = format!("svm_optimize_sig_{tag}");
        let output = format!("svm_optimize_cls_{tag}");

        let scores = match self.run_chain(&params, &signature, &output).await {
            Ok(scores) => Some(scores),
            Err(e) => {
                warn!(%params, error = %e, "evaluation failed, assigning penalty fitness");
                None
            }
        };

        let fitness = match &scores {
            Some(scores) => self.fitness_of(scores),
            None => PENALTY_FITNESS,
        };

        let record = ResultRecord {
            position: candidate.to_vec(),
            scores,
        };
        if let Err(e) = self.sink.record(&record) {
            warn!(error = %e, "failed to write result record");
        }

        if let Err(e) = self.pipeline.cleanup(&signature, &output).await {
            warn!(error = %e, "failed to remove transient artifacts");
        }

        debug!(%params, fitness, "candidate evaluated");
        fitness
    }

    async fn run_chain(
        &self,
        params: &SvmParams,
        signature: &str,
        output: &str,
    ) -> crate::Result<Scores> {
        self.pipeline.train(params, signature).await?;
        self.pipeline.predict(signature, output).await?;
        self.pipeline.score(output).await
    }

    /// Fitness of a successfully scored candidate: `1 - metric`, except
    /// that a non-finite metric or one below the theoretical minimum of
    /// -1 marks a degenerate model and earns the full penalty.
    fn fitness_of(&self, scores: &Scores) -> f64 {
        let metric = self.measure.of(scores);
        if !metric.is_finite() || metric < -1.0 {
            PENALTY_FITNESS
        } else {
            1.0 - metric
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_tags_are_unique() {
        let tags: Vec<_> = (0..100).map(|_| transient_tag()).collect();
        let mut deduped = tags.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(deduped.len(), tags.len());
    }
}
