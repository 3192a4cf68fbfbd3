//! Command-line entry point for the SVM hyperparameter search.

use std::sync::Arc;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use svm_optimize::grass::{GrassContext, GrassPipeline};
use svm_optimize::{
    Evaluator, RawOptions, ResultSink, SearchConfig, SearchDriver, SearchOutcome,
};

/// Finds optimal SVM classifier hyperparameters with a particle swarm.
#[derive(Parser)]
#[command(name = "svm-optimize", version)]
struct Cli {
    /// Imagery group with feature value maps
    #[arg(long)]
    group: String,
    /// Subgroup within the imagery group
    #[arg(long)]
    subgroup: String,
    /// Raster map with training labels
    #[arg(long)]
    trainingmap: String,
    /// Raster map with validation labels
    #[arg(long)]
    validationmap: String,
    /// Search log destination ('-' for standard output)
    #[arg(long, default_value = "-")]
    output: String,

    /// Metric that drives the fitness: mcc, kappa or acc
    #[arg(long, default_value = "mcc")]
    measure: String,
    /// SVM formulation (fixed, not optimized)
    #[arg(long = "type", default_value = "c_svc")]
    svm_type: String,
    /// Kernel family (fixed, not optimized)
    #[arg(long, default_value = "rbf")]
    kernel: String,

    /// Swarm population size
    #[arg(long, default_value_t = 100)]
    population: usize,
    /// Number of search generations
    #[arg(long, default_value_t = 50)]
    steps: usize,
    /// Random seed for reproducible runs
    #[arg(long, default_value_t = 42)]
    seed: u64,
    /// Parallel evaluations (defaults to available parallelism)
    #[arg(long)]
    workers: Option<usize>,
    /// Per-step timeout in seconds for external tools (0 = unlimited)
    #[arg(long, default_value_t = 0)]
    timeout: u64,

    /// Soft-margin cost: one value fixes it, 'low,high' searches a range
    #[arg(long, default_value = "1")]
    cost: String,
    /// Kernel gamma: one value or 'low,high'
    #[arg(long, default_value = "1")]
    gamma: String,
    /// Polynomial degree: one value or 'low,high'
    #[arg(long, default_value = "3")]
    degree: String,
    /// Kernel coef0: one value or 'low,high'
    #[arg(long, default_value = "0")]
    coef0: String,
    /// Termination tolerance: one value or 'low,high'
    #[arg(long, default_value = "0.001")]
    eps: String,
    /// Nu parameter: one value or 'low,high'
    #[arg(long, default_value = "0.5")]
    nu: String,
}

impl Cli {
    fn raw_options(&self) -> RawOptions {
        RawOptions {
            measure: self.measure.clone(),
            svm_type: self.svm_type.clone(),
            kernel: self.kernel.clone(),
            population: self.population,
            steps: self.steps,
            seed: self.seed,
            workers: self.workers,
            timeout_secs: self.timeout,
            cost: self.cost.clone(),
            gamma: self.gamma.clone(),
            degree: self.degree.clone(),
            coef0: self.coef0.clone(),
            eps: self.eps.clone(),
            nu: self.nu.clone(),
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(&cli).await {
        Ok(outcome) => report(&outcome),
        Err(e) => {
            if e.is_config() {
                eprintln!("ERROR: {e}");
            } else {
                eprintln!("ERROR: search aborted: {e}");
            }
            std::process::exit(1);
        }
    }
}

async fn run(cli: &Cli) -> svm_optimize::Result<SearchOutcome> {
    let config = SearchConfig::resolve(&cli.raw_options())?;

    let sink = if cli.output == "-" {
        ResultSink::stdout()
    } else {
        ResultSink::file(&cli.output)?
    };
    let sink = Arc::new(sink);

    let pipeline = GrassPipeline::new(
        GrassContext {
            group: cli.group.clone(),
            subgroup: cli.subgroup.clone(),
            trainingmap: cli.trainingmap.clone(),
            validationmap: cli.validationmap.clone(),
        },
        config.svm_type,
        config.kernel,
        config.timeout,
    );

    let space = Arc::new(config.space.clone());
    let evaluator = Evaluator::new(
        Arc::clone(&space),
        pipeline,
        Arc::clone(&sink),
        config.measure,
    );
    let driver = SearchDriver::new(space, evaluator, config.pso, config.workers)?;

    info!(
        measure = %config.measure,
        population = config.pso.population,
        steps = config.pso.steps,
        seed = config.pso.seed,
        workers = config.workers,
        "starting hyperparameter search"
    );
    let outcome = driver.run().await;

    if let Err(e) = sink.finalize() {
        tracing::warn!(error = %e, "failed to flush result log");
    }
    outcome
}

fn report(outcome: &SearchOutcome) {
    info!(
        best_fitness = outcome.best_fitness,
        params = %outcome.best_params,
        "search finished"
    );
    println!("Best parameters: {}", outcome.best_params);
    println!("Best fitness: {}", outcome.best_fitness);
    if outcome.best_fitness <= 2.0 {
        println!("Best metric value: {}", 1.0 - outcome.best_fitness);
    } else {
        println!("Best metric value: not available (all evaluations failed)");
    }
}
