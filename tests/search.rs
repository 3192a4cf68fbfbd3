//! End-to-end search tests against a deterministic in-memory pipeline.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use svm_optimize::space::RawVariable;
use svm_optimize::{
    ClassifierPipeline, Error, Evaluator, Measure, PENALTY_FITNESS, PipelineStep, ResultSink,
    Result, Scores, SearchDriver, SvmParams, Tunable, VariableSpace,
};
use svm_optimize::pso::PsoConfig;

fn temp_path() -> std::path::PathBuf {
    static COUNTER: AtomicUsize = AtomicUsize::new(0);

    let mut path = std::env::temp_dir();
    path.push(format!(
        "svm_optimize_search_test_{}_{}.csv",
        std::process::id(),
        COUNTER.fetch_add(1, Ordering::Relaxed)
    ));
    path
}

/// In-memory pipeline: remembers which parameters trained which
/// signature so the score step can be a pure function of the candidate.
struct StubPipeline {
    score_fn: Box<dyn Fn(&SvmParams) -> Result<Scores> + Send + Sync>,
    fail_at: Option<PipelineStep>,
    trained: Mutex<HashMap<String, SvmParams>>,
    predicted: Mutex<HashMap<String, SvmParams>>,
    train_calls: Arc<AtomicUsize>,
    cleanup_calls: Arc<AtomicUsize>,
}

impl StubPipeline {
    fn with_scores(score_fn: impl Fn(&SvmParams) -> Result<Scores> + Send + Sync + 'static) -> Self {
        Self {
            score_fn: Box::new(score_fn),
            fail_at: None,
            trained: Mutex::new(HashMap::new()),
            predicted: Mutex::new(HashMap::new()),
            train_calls: Arc::new(AtomicUsize::new(0)),
            cleanup_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn constant_mcc(mcc: f64) -> Self {
        Self::with_scores(move |_| {
            Ok(Scores {
                mcc,
                kappa: 0.4,
                overall_accuracy: 0.9,
            })
        })
    }

    fn failing_at(step: PipelineStep) -> Self {
        let mut stub = Self::constant_mcc(0.5);
        stub.fail_at = Some(step);
        stub
    }

    fn fail(&self, step: PipelineStep) -> Result<()> {
        if self.fail_at == Some(step) {
            return Err(Error::Pipeline {
                step,
                reason: "stubbed failure".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ClassifierPipeline for StubPipeline {
    async fn train(&self, params: &SvmParams, signature: &str) -> Result<()> {
        self.train_calls.fetch_add(1, Ordering::Relaxed);
        self.fail(PipelineStep::Train)?;
        self.trained.lock().insert(signature.to_string(), *params);
        Ok(())
    }

    async fn predict(&self, signature: &str, output: &str) -> Result<()> {
        self.fail(PipelineStep::Predict)?;
        let params =
            self.trained
                .lock()
                .get(signature)
                .copied()
                .ok_or_else(|| Error::Pipeline {
                    step: PipelineStep::Predict,
                    reason: format!("unknown signature '{signature}'"),
                })?;
        self.predicted.lock().insert(output.to_string(), params);
        Ok(())
    }

    async fn score(&self, output: &str) -> Result<Scores> {
        self.fail(PipelineStep::Score)?;
        let params = self
            .predicted
            .lock()
            .get(output)
            .copied()
            .ok_or_else(|| Error::Pipeline {
                step: PipelineStep::Score,
                reason: format!("unknown classification '{output}'"),
            })?;
        (self.score_fn)(&params)
    }

    async fn cleanup(&self, signature: &str, output: &str) -> Result<()> {
        self.cleanup_calls.fetch_add(1, Ordering::Relaxed);
        self.trained.lock().remove(signature);
        self.predicted.lock().remove(output);
        Ok(())
    }
}

fn gamma_cost_space() -> Arc<VariableSpace> {
    Arc::new(
        VariableSpace::resolve([
            RawVariable {
                tunable: Tunable::Cost,
                values: vec![100.0],
            },
            RawVariable {
                tunable: Tunable::Gamma,
                values: vec![0.1, 10.0],
            },
        ])
        .unwrap(),
    )
}

fn evaluator(space: &Arc<VariableSpace>, pipeline: StubPipeline) -> (Evaluator<StubPipeline>, std::path::PathBuf) {
    let path = temp_path();
    let sink = Arc::new(ResultSink::file(&path).unwrap());
    (
        Evaluator::new(Arc::clone(space), pipeline, sink, Measure::Mcc),
        path,
    )
}

#[tokio::test]
async fn pipeline_failure_becomes_penalty_fitness() {
    for step in [PipelineStep::Train, PipelineStep::Predict, PipelineStep::Score] {
        let space = gamma_cost_space();
        let (evaluator, path) = evaluator(&space, StubPipeline::failing_at(step));

        let fitness = evaluator.evaluate(&[1.0]).await;
        assert!(fitness.is_finite());
        assert_eq!(fitness, PENALTY_FITNESS, "failing step: {step}");

        let log = std::fs::read_to_string(&path).unwrap();
        assert_eq!(log.trim(), "1,NA,NA,NA");
        std::fs::remove_file(&path).ok();
    }
}

#[tokio::test]
async fn malformed_score_output_becomes_penalty_fitness() {
    let space = gamma_cost_space();
    let stub = StubPipeline::with_scores(|_| {
        Err(Error::MalformedOutput("missing key 'mcc'".to_string()))
    });
    let (evaluator, path) = evaluator(&space, stub);

    assert_eq!(evaluator.evaluate(&[2.5]).await, PENALTY_FITNESS);
    let log = std::fs::read_to_string(&path).unwrap();
    assert_eq!(log.trim(), "2.5,NA,NA,NA");
    std::fs::remove_file(&path).ok();
}

#[tokio::test]
async fn degenerate_metric_gets_full_penalty() {
    let space = gamma_cost_space();
    let (evaluator, path) = evaluator(&space, StubPipeline::constant_mcc(-1.5));

    // -1.5 is outside the metric's theoretical range: penalty, not 2.5.
    assert_eq!(evaluator.evaluate(&[1.0]).await, PENALTY_FITNESS);
    std::fs::remove_file(&path).ok();
}

#[tokio::test]
async fn boundary_metric_is_still_valid() {
    let space = gamma_cost_space();
    let (evaluator, path) = evaluator(&space, StubPipeline::constant_mcc(-1.0));

    // Exactly -1 is the metric's legitimate worst value.
    assert_eq!(evaluator.evaluate(&[1.0]).await, 2.0);
    std::fs::remove_file(&path).ok();
}

#[tokio::test]
async fn fitness_is_one_minus_metric() {
    let space = gamma_cost_space();
    let (evaluator, path) = evaluator(&space, StubPipeline::constant_mcc(0.8));

    let fitness = evaluator.evaluate(&[1.0]).await;
    assert!((fitness - 0.2).abs() < 1e-9, "fitness = {fitness}");
    std::fs::remove_file(&path).ok();
}

#[tokio::test]
async fn successful_evaluation_logs_all_metrics() {
    let space = gamma_cost_space();
    let (evaluator, path) = evaluator(&space, StubPipeline::constant_mcc(0.5));

    evaluator.evaluate(&[3.0]).await;
    let log = std::fs::read_to_string(&path).unwrap();
    assert_eq!(log.trim(), "3,0.5,0.4,0.9");
    std::fs::remove_file(&path).ok();
}

#[tokio::test]
async fn end_to_end_search_with_fixed_budget() {
    let space = gamma_cost_space();
    let path = temp_path();
    let sink = Arc::new(ResultSink::file(&path).unwrap());
    let pipeline = StubPipeline::constant_mcc(0.5);
    let train_calls = Arc::clone(&pipeline.train_calls);
    let cleanup_calls = Arc::clone(&pipeline.cleanup_calls);

    let evaluator = Evaluator::new(Arc::clone(&space), pipeline, Arc::clone(&sink), Measure::Mcc);
    let config = PsoConfig {
        population: 5,
        steps: 3,
        seed: 1,
        ..PsoConfig::default()
    };
    let driver = SearchDriver::new(Arc::clone(&space), evaluator, config, 4).unwrap();
    let outcome = driver.run().await.unwrap();

    // Every candidate scores mcc 0.5, so the best fitness is 0.5 and the
    // best named set carries the fixed cost.
    assert!((outcome.best_fitness - 0.5).abs() < 1e-12);
    assert_eq!(outcome.best_params.cost, 100.0);
    assert!(outcome.best_position[0] >= 0.1 && outcome.best_position[0] <= 10.0);

    // 5 particles x 3 generations: 15 evaluations, each trained and
    // cleaned up once, each logged as one well-formed line.
    assert_eq!(train_calls.load(Ordering::Relaxed), 15);
    assert_eq!(cleanup_calls.load(Ordering::Relaxed), 15);

    sink.finalize().unwrap();
    let log = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<_> = log.lines().collect();
    assert_eq!(lines.len(), 15);
    for line in lines {
        assert_eq!(line.split(',').count(), 4, "malformed line: {line}");
    }
    std::fs::remove_file(&path).ok();
}

#[tokio::test]
async fn identical_seeds_reproduce_the_search() {
    async fn run_once() -> Vec<f64> {
        let space = gamma_cost_space();
        let path = temp_path();
        let sink = Arc::new(ResultSink::file(&path).unwrap());
        // Deterministic, candidate-dependent score: better the closer
        // gamma is to 2.
        let pipeline = StubPipeline::with_scores(|params| {
            Ok(Scores {
                mcc: 1.0 - (params.gamma - 2.0).abs() / 10.0,
                kappa: 0.0,
                overall_accuracy: 0.0,
            })
        });
        let evaluator = Evaluator::new(Arc::clone(&space), pipeline, sink, Measure::Mcc);
        let config = PsoConfig {
            population: 8,
            steps: 5,
            seed: 42,
            ..PsoConfig::default()
        };
        let driver = SearchDriver::new(Arc::clone(&space), evaluator, config, 4).unwrap();
        let outcome = driver.run().await.unwrap();
        std::fs::remove_file(&path).ok();
        outcome.best_position
    }

    let first = run_once().await;
    let second = run_once().await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn search_survives_a_fully_failing_pipeline() {
    let space = gamma_cost_space();
    let path = temp_path();
    let sink = Arc::new(ResultSink::file(&path).unwrap());
    let evaluator = Evaluator::new(
        Arc::clone(&space),
        StubPipeline::failing_at(PipelineStep::Train),
        Arc::clone(&sink),
        Measure::Mcc,
    );
    let config = PsoConfig {
        population: 4,
        steps: 2,
        seed: 9,
        ..PsoConfig::default()
    };
    let driver = SearchDriver::new(Arc::clone(&space), evaluator, config, 2).unwrap();

    // Every evaluation fails; the search still completes its budget and
    // reports the penalty fitness rather than erroring out.
    let outcome = driver.run().await.unwrap();
    assert_eq!(outcome.best_fitness, PENALTY_FITNESS);

    sink.finalize().unwrap();
    let log = std::fs::read_to_string(&path).unwrap();
    assert_eq!(log.lines().count(), 8);
    assert!(log.lines().all(|l| l.ends_with("NA,NA,NA")));
    std::fs::remove_file(&path).ok();
}
