#![forbid(unsafe_code)]
#![deny(clippy::all)]

//! Hyperparameter search for SVM classifiers over an external
//! train → predict → score pipeline.
//!
//! Candidate parameter settings are points in a bounded space resolved by
//! [`VariableSpace`](space::VariableSpace): each tunable is either held
//! fixed or searched within a range. A particle swarm
//! ([`pso::Swarm`], driven by [`driver::SearchDriver`]) samples
//! candidates, an [`Evaluator`](evaluator::Evaluator) turns each one into
//! a scalar fitness by running the external pipeline, and every outcome —
//! including failed runs — lands in a concurrency-safe
//! [`ResultSink`](sink::ResultSink) log.
//!
//! Failure policy: configuration errors are fatal before the search
//! starts; everything the external pipeline can do wrong afterwards
//! (crash, time out, emit garbage) is absorbed as a penalty fitness so
//! the swarm keeps moving through the valid region of the space.
//!
//! The external toolchain is reached only through the
//! [`ClassifierPipeline`](pipeline::ClassifierPipeline) trait;
//! [`GrassPipeline`](grass::GrassPipeline) is the production
//! implementation and tests substitute deterministic stubs.

pub mod config;
pub mod driver;
mod error;
pub mod evaluator;
pub mod grass;
pub mod params;
pub mod pipeline;
pub mod pso;
pub mod sink;
pub mod space;

pub use config::{RawOptions, SearchConfig};
pub use driver::{SearchDriver, SearchOutcome};
pub use error::{Error, Result};
pub use evaluator::{Evaluator, PENALTY_FITNESS};
pub use params::{KernelType, Measure, SvmParams, SvmType, Tunable};
pub use pipeline::{ClassifierPipeline, PipelineStep, Scores};
pub use sink::{ResultRecord, ResultSink};
pub use space::{VariableKind, VariableSpace, VariableSpec};
