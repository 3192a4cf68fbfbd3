//! Particle swarm over the optimization dimensions.
//!
//! The swarm keeps a population of positions and velocities. Each
//! generation, every particle is pulled toward its own best-seen position
//! (cognitive term) and the swarm's best-seen position (social term),
//! with an inertia weight damping the previous velocity:
//!
//! `v ← w·v + c1·r1·(pbest − x) + c2·r2·(gbest − x)`
//!
//! `r1`, `r2` are fresh uniform draws per dimension. Updated positions are
//! clamped back into the per-dimension bounds. All randomness comes from
//! one seeded generator, so a fixed seed reproduces the full trajectory
//! when evaluation is deterministic.

use crate::error::{Error, Result};

/// Swarm configuration.
///
/// The inertia/cognitive/social coefficients default to the canonical
/// constriction-equivalent values.
#[derive(Clone, Copy, Debug)]
pub struct PsoConfig {
    /// Number of particles.
    pub population: usize,
    /// Number of generations to run.
    pub steps: usize,
    /// Seed for the swarm's random generator.
    pub seed: u64,
    /// Inertia weight (w).
    pub inertia: f64,
    /// Cognitive coefficient (c1), pull toward the personal best.
    pub cognitive: f64,
    /// Social coefficient (c2), pull toward the global best.
    pub social: f64,
}

impl Default for PsoConfig {
    fn default() -> Self {
        Self {
            population: 100,
            steps: 50,
            seed: 42,
            inertia: 0.7298,
            cognitive: 1.496_18,
            social: 1.496_18,
        }
    }
}

impl PsoConfig {
    /// Rejects configurations the update rule cannot run with.
    ///
    /// # Errors
    ///
    /// [`Error::BadSetting`] when the population or step budget is zero.
    pub fn validate(&self) -> Result<()> {
        if self.population == 0 {
            return Err(Error::BadSetting {
                name: "population",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.steps == 0 {
            return Err(Error::BadSetting {
                name: "steps",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// The evolving population state.
///
/// Owned exclusively by the search driver; [`observe`](Swarm::observe)
/// and [`advance`](Swarm::advance) run strictly sequentially between
/// generations, never concurrently with evaluation.
pub struct Swarm {
    rng: fastrand::Rng,
    lower: Vec<f64>,
    upper: Vec<f64>,
    inertia: f64,
    cognitive: f64,
    social: f64,
    positions: Vec<Vec<f64>>,
    velocities: Vec<Vec<f64>>,
    personal_best: Vec<Vec<f64>>,
    personal_best_value: Vec<f64>,
    best_idx: usize,
}

impl Swarm {
    /// Initializes a swarm: positions uniform within the bounds, zero
    /// velocities, no bests yet.
    #[must_use]
    pub fn new(config: &PsoConfig, lower: &[f64], upper: &[f64]) -> Self {
        let mut rng = fastrand::Rng::with_seed(config.seed);
        let dims = lower.len();

        let positions: Vec<Vec<f64>> = (0..config.population)
            .map(|_| {
                (0..dims)
                    .map(|j| lower[j] + rng.f64() * (upper[j] - lower[j]))
                    .collect()
            })
            .collect();

        Self {
            rng,
            lower: lower.to_vec(),
            upper: upper.to_vec(),
            inertia: config.inertia,
            cognitive: config.cognitive,
            social: config.social,
            velocities: vec![vec![0.0; dims]; config.population],
            personal_best: positions.clone(),
            personal_best_value: vec![f64::INFINITY; config.population],
            best_idx: 0,
            positions,
        }
    }

    /// The current generation's candidate positions.
    #[must_use]
    pub fn positions(&self) -> &[Vec<f64>] {
        &self.positions
    }

    /// Folds one generation's fitness values into the personal and
    /// global bests. `values[i]` must belong to `positions()[i]`.
    pub fn observe(&mut self, values: &[f64]) {
        for (i, &value) in values.iter().enumerate() {
            if value < self.personal_best_value[i] {
                self.personal_best_value[i] = value;
                self.personal_best[i].clone_from(&self.positions[i]);
            }
        }
        for i in 0..self.personal_best_value.len() {
            if self.personal_best_value[i] < self.personal_best_value[self.best_idx] {
                self.best_idx = i;
            }
        }
    }

    /// Moves every particle one step: velocity update, position update,
    /// clamp into bounds.
    pub fn advance(&mut self) {
        let global_best = self.personal_best[self.best_idx].clone();
        for i in 0..self.positions.len() {
            for j in 0..self.lower.len() {
                let r1 = self.rng.f64();
                let r2 = self.rng.f64();
                let velocity = self.inertia * self.velocities[i][j]
                    + self.cognitive * r1 * (self.personal_best[i][j] - self.positions[i][j])
                    + self.social * r2 * (global_best[j] - self.positions[i][j]);
                self.velocities[i][j] = velocity;
                self.positions[i][j] =
                    (self.positions[i][j] + velocity).clamp(self.lower[j], self.upper[j]);
            }
        }
    }

    /// The best position observed so far.
    #[must_use]
    pub fn best_position(&self) -> &[f64] {
        &self.personal_best[self.best_idx]
    }

    /// The best fitness observed so far.
    #[must_use]
    pub fn best_value(&self) -> f64 {
        self.personal_best_value[self.best_idx]
    }
}
