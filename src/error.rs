use crate::pipeline::PipelineStep;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when a tunable parameter is given neither a single fixed
    /// value nor a `low,high` range.
    #[error("parameter '{name}' takes one value or a 'low,high' range, got {got} values")]
    BadValueCount {
        /// The name of the offending parameter.
        name: &'static str,
        /// The number of values that were supplied.
        got: usize,
    },

    /// Returned when a parameter value cannot be parsed as a number.
    #[error("parameter '{name}': '{token}' is not a number")]
    BadValue {
        /// The name of the offending parameter.
        name: &'static str,
        /// The unparseable token.
        token: String,
    },

    /// Returned when every tunable parameter is fixed, leaving nothing
    /// to search over.
    #[error("at least one variable must have a range")]
    NoDimensions,

    /// Returned when a selector option has an unrecognized value.
    #[error("invalid value '{value}' for '{name}', expected one of: {expected}")]
    BadSelector {
        /// The name of the option.
        name: &'static str,
        /// The value that was supplied.
        value: String,
        /// The accepted values.
        expected: &'static str,
    },

    /// Returned when a numeric search setting is out of its valid range.
    #[error("invalid {name}: {reason}")]
    BadSetting {
        /// The name of the setting.
        name: &'static str,
        /// Why the value is rejected.
        reason: String,
    },

    /// Returned when the result log destination cannot be opened.
    #[error("cannot open result log '{path}': {source}")]
    OutputLog {
        /// The requested log path.
        path: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Returned when an external pipeline step fails, exits non-zero,
    /// or exceeds the configured timeout.
    ///
    /// This kind is always recovered inside the evaluator as a penalty
    /// fitness; it never aborts the search.
    #[error("{step} failed: {reason}")]
    Pipeline {
        /// Which pipeline step failed.
        step: PipelineStep,
        /// Failure detail (exit status, stderr excerpt, or "timed out").
        reason: String,
    },

    /// Returned when the score step's output is not parseable or is
    /// missing an expected metric key. Recovered identically to
    /// [`Error::Pipeline`].
    #[error("malformed score output: {0}")]
    MalformedOutput(String),

    /// Returned when a spawned evaluation task panics or is cancelled.
    #[error("evaluation task failed: {0}")]
    Task(String),
}

impl Error {
    /// Whether this error is a pre-search configuration failure.
    ///
    /// Configuration failures are fatal and abort before any search
    /// work; everything else is absorbed by the evaluator.
    #[must_use]
    pub fn is_config(&self) -> bool {
        !matches!(
            self,
            Error::Pipeline { .. } | Error::MalformedOutput(_) | Error::Task(_)
        )
    }
}

pub type Result<T> = core::result::Result<T, Error>;
