//! Append-only result log shared by concurrent evaluations.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use parking_lot::Mutex;

use crate::error::{Error, Result};
use crate::pipeline::Scores;

/// Sentinel written for each metric of a failed evaluation.
const NOT_AVAILABLE: &str = "NA";

/// One evaluated candidate's log entry: the raw dimension values plus the
/// reported metrics, or the `NA` sentinel per metric when the evaluation
/// failed.
#[derive(Clone, Debug, PartialEq)]
pub struct ResultRecord {
    /// The candidate's dimension values, in dimension order.
    pub position: Vec<f64>,
    /// The reported metrics; `None` when the pipeline failed.
    pub scores: Option<Scores>,
}

impl ResultRecord {
    /// Formats the record as one comma-separated log line (no newline).
    #[must_use]
    pub fn to_line(&self) -> String {
        let mut line = String::new();
        for value in &self.position {
            line.push_str(&value.to_string());
            line.push(',');
        }
        match &self.scores {
            Some(s) => {
                line.push_str(&format!("{},{},{}", s.mcc, s.kappa, s.overall_accuracy));
            }
            None => {
                line.push_str(&format!("{NOT_AVAILABLE},{NOT_AVAILABLE},{NOT_AVAILABLE}"));
            }
        }
        line
    }
}

/// Serialized destination for [`ResultRecord`]s.
///
/// Writes are line-atomic: each record is formatted in full before the
/// writer lock is taken, so concurrent producers never interleave bytes.
/// The arrival order across producers is whatever the scheduler gives —
/// the log is an unordered set of well-formed lines.
pub struct ResultSink {
    out: Mutex<Box<dyn Write + Send>>,
}

impl ResultSink {
    /// A sink appending to the file at `path` (created or truncated).
    ///
    /// # Errors
    ///
    /// [`Error::OutputLog`] if the file cannot be created.
    pub fn file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| Error::OutputLog {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self {
            out: Mutex::new(Box::new(BufWriter::new(file))),
        })
    }

    /// A sink writing to standard output.
    #[must_use]
    pub fn stdout() -> Self {
        Self {
            out: Mutex::new(Box::new(io::stdout())),
        }
    }

    /// A sink writing to an arbitrary destination (used by tests).
    #[must_use]
    pub fn from_writer(writer: Box<dyn Write + Send>) -> Self {
        Self {
            out: Mutex::new(writer),
        }
    }

    /// Appends one record as a single line.
    ///
    /// Safe to call from any number of threads; each call writes its
    /// whole line under the lock and flushes so the log stays readable
    /// while the search runs.
    ///
    /// # Errors
    ///
    /// Propagates the underlying I/O error; callers treat it as
    /// best-effort and log it rather than aborting the search.
    pub fn record(&self, record: &ResultRecord) -> io::Result<()> {
        let line = record.to_line();
        let mut out = self.out.lock();
        writeln!(out, "{line}")?;
        out.flush()
    }

    /// Flushes and releases the destination.
    ///
    /// # Errors
    ///
    /// Propagates the final flush failure.
    pub fn finalize(&self) -> io::Result<()> {
        self.out.lock().flush()
    }
}
