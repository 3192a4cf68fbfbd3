//! Production pipeline backed by the GRASS GIS command-line tools.
//!
//! Each step shells out to one tool: `i.svm.train`, `i.svm.predict`,
//! `r.kappa` (with structured JSON output), and `g.remove`/`i.signatures`
//! for cleanup. Commands run under an optional wall-clock timeout; a
//! timeout is reported as an ordinary pipeline failure so the search
//! degrades instead of hanging.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::error::{Error, Result};
use crate::params::{KernelType, SvmParams, SvmType};
use crate::pipeline::{ClassifierPipeline, PipelineStep, Scores};

/// Identifies the imagery group and label maps every evaluation shares.
#[derive(Clone, Debug)]
pub struct GrassContext {
    /// Imagery group with the feature maps.
    pub group: String,
    /// Subgroup within the imagery group.
    pub subgroup: String,
    /// Raster map with training labels.
    pub trainingmap: String,
    /// Raster map with validation labels.
    pub validationmap: String,
}

/// [`ClassifierPipeline`] implementation invoking the GRASS toolchain.
pub struct GrassPipeline {
    context: GrassContext,
    svm_type: SvmType,
    kernel: KernelType,
    timeout: Option<Duration>,
}

impl GrassPipeline {
    /// Creates a pipeline over the given imagery context.
    ///
    /// `timeout` bounds each external step's wall-clock time; `None`
    /// leaves steps unlimited.
    #[must_use]
    pub fn new(
        context: GrassContext,
        svm_type: SvmType,
        kernel: KernelType,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            context,
            svm_type,
            kernel,
            timeout,
        }
    }

    /// Runs one tool to completion, enforcing the timeout and mapping a
    /// non-zero exit into a pipeline error carrying a stderr excerpt.
    async fn run(&self, step: PipelineStep, mut cmd: Command) -> Result<std::process::Output> {
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        debug!(%step, command = ?cmd.as_std(), "running external tool");

        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, cmd.output())
                .await
                .map_err(|_| Error::Pipeline {
                    step,
                    reason: format!("timed out after {}s", limit.as_secs()),
                })?,
            None => cmd.output().await,
        }
        .map_err(|e| Error::Pipeline {
            step,
            reason: e.to_string(),
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Pipeline {
                step,
                reason: format!(
                    "exit status {}: {}",
                    output.status,
                    stderr.trim().lines().last().unwrap_or("")
                ),
            });
        }
        Ok(output)
    }
}

#[async_trait]
impl ClassifierPipeline for GrassPipeline {
    async fn train(&self, params: &SvmParams, signature: &str) -> Result<()> {
        let mut cmd = Command::new("i.svm.train");
        cmd.arg(format!("group={}", self.context.group))
            .arg(format!("subgroup={}", self.context.subgroup))
            .arg(format!("trainingmap={}", self.context.trainingmap))
            .arg(format!("signaturefile={signature}"))
            .arg(format!("type={}", self.svm_type))
            .arg(format!("kernel={}", self.kernel))
            .arg(format!("cost={}", params.cost))
            .arg(format!("gamma={}", params.gamma))
            .arg(format!("degree={}", params.degree))
            .arg(format!("coef0={}", params.coef0))
            .arg(format!("eps={}", params.eps))
            .arg(format!("nu={}", params.nu))
            .arg("--overwrite")
            .arg("--quiet");
        self.run(PipelineStep::Train, cmd).await.map(|_| ())
    }

    async fn predict(&self, signature: &str, output: &str) -> Result<()> {
        let mut cmd = Command::new("i.svm.predict");
        cmd.arg(format!("group={}", self.context.group))
            .arg(format!("subgroup={}", self.context.subgroup))
            .arg(format!("signaturefile={signature}"))
            .arg(format!("output={output}"))
            .arg("--overwrite")
            .arg("--quiet");
        self.run(PipelineStep::Predict, cmd).await.map(|_| ())
    }

    async fn score(&self, output: &str) -> Result<Scores> {
        let mut cmd = Command::new("r.kappa");
        cmd.arg(format!("reference={}", self.context.validationmap))
            .arg(format!("classification={output}"))
            .arg("format=json")
            .arg("--quiet");
        let out = self.run(PipelineStep::Score, cmd).await?;

        let stdout = String::from_utf8_lossy(&out.stdout);
        serde_json::from_str(&stdout).map_err(|e| Error::MalformedOutput(e.to_string()))
    }

    async fn cleanup(&self, signature: &str, output: &str) -> Result<()> {
        let mut remove_raster = Command::new("g.remove");
        remove_raster
            .arg("-f")
            .arg("type=raster")
            .arg(format!("name={output}"))
            .arg("--quiet");
        let raster = self.run(PipelineStep::Cleanup, remove_raster).await;

        let mut remove_signature = Command::new("i.signatures");
        remove_signature
            .arg("type=libsvm")
            .arg(format!("remove={signature}"))
            .arg("--quiet");
        let sig = self.run(PipelineStep::Cleanup, remove_signature).await;

        raster.and(sig).map(|_| ())
    }
}
