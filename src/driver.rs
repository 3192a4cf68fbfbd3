//! The search loop: generations of parallel evaluation, sequential updates.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, info_span};

use crate::error::{Error, Result};
use crate::evaluator::{Evaluator, PENALTY_FITNESS};
use crate::params::SvmParams;
use crate::pipeline::ClassifierPipeline;
use crate::pso::{PsoConfig, Swarm};
use crate::space::VariableSpace;

/// The search result: the global-best candidate translated back to named
/// parameters, plus its fitness.
#[derive(Clone, Debug)]
pub struct SearchOutcome {
    /// Best candidate's raw dimension values.
    pub best_position: Vec<f64>,
    /// Best candidate's fitness (lower is better).
    pub best_fitness: f64,
    /// Best candidate's full named parameter set.
    pub best_params: SvmParams,
}

/// Drives the particle swarm over the variable space.
///
/// Within a generation, candidate evaluations run concurrently on a
/// fixed-size worker pool; the swarm update only starts once every
/// fitness of the generation is in. There is no cross-generation overlap.
pub struct SearchDriver<P> {
    space: Arc<VariableSpace>,
    evaluator: Arc<Evaluator<P>>,
    config: PsoConfig,
    workers: usize,
}

impl<P: ClassifierPipeline + 'static> SearchDriver<P> {
    /// Creates a driver.
    ///
    /// # Errors
    ///
    /// [`Error::BadSetting`] when the swarm configuration or worker
    /// count is invalid. Setup errors are the only fatal errors: once
    /// [`run`](Self::run) starts, evaluation failures are absorbed.
    pub fn new(
        space: Arc<VariableSpace>,
        evaluator: Evaluator<P>,
        config: PsoConfig,
        workers: usize,
    ) -> Result<Self> {
        config.validate()?;
        if workers == 0 {
            return Err(Error::BadSetting {
                name: "workers",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(Self {
            space,
            evaluator: Arc::new(evaluator),
            config,
            workers,
        })
    }

    /// Runs the full step budget and reports the best-found candidate.
    ///
    /// # Errors
    ///
    /// [`Error::Task`] only when an evaluation task panics or is
    /// cancelled; pipeline failures never surface here.
    pub async fn run(&self) -> Result<SearchOutcome> {
        let _span = info_span!(
            "search",
            population = self.config.population,
            steps = self.config.steps,
            dimensions = self.space.dimensions(),
        )
        .entered();

        let mut swarm = Swarm::new(
            &self.config,
            self.space.lower_bounds(),
            self.space.upper_bounds(),
        );

        for step in 0..self.config.steps {
            let values = self.evaluate_generation(swarm.positions()).await?;
            swarm.observe(&values);
            info!(
                step = step + 1,
                best_fitness = swarm.best_value(),
                "generation complete"
            );
            if step + 1 < self.config.steps {
                swarm.advance();
            }
        }

        let best_position = swarm.best_position().to_vec();
        let best_params = SvmParams::from_candidate(&self.space, &best_position);
        Ok(SearchOutcome {
            best_position,
            best_fitness: swarm.best_value(),
            best_params,
        })
    }

    /// Evaluates one generation on the worker pool and returns the
    /// fitness of each candidate, index-aligned with `positions`.
    async fn evaluate_generation(&self, positions: &[Vec<f64>]) -> Result<Vec<f64>> {
        let semaphore = Arc::new(Semaphore::new(self.workers));
        let mut join_set: JoinSet<(usize, f64)> = JoinSet::new();

        for (index, position) in positions.iter().enumerate() {
            let permit = semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|e| Error::Task(e.to_string()))?;
            let evaluator = Arc::clone(&self.evaluator);
            let position = position.clone();
            join_set.spawn(async move {
                let value = evaluator.evaluate(&position).await;
                drop(permit);
                (index, value)
            });
        }

        let mut values = vec![PENALTY_FITNESS; positions.len()];
        while let Some(joined) = join_set.join_next().await {
            let (index, value) = joined.map_err(|e| Error::Task(e.to_string()))?;
            values[index] = value;
        }
        Ok(values)
    }
}
