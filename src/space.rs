//! Resolution of tunable parameters into fixed values and search dimensions.
//!
//! Each tunable is declared with either one value (held fixed for the whole
//! search) or two values (an inclusive range that becomes one optimization
//! dimension). [`VariableSpace::resolve`] validates the declaration once,
//! up front; afterwards the space is immutable and safely shared across
//! evaluation workers.

use crate::error::{Error, Result};
use crate::params::{SvmParams, Tunable};

/// How a single tunable participates in the search.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum VariableKind {
    /// Held at this value; not a search dimension.
    Fixed(f64),
    /// Searched within `[lower, upper]`; `index` is the dimension's
    /// position in every candidate vector.
    Ranged {
        lower: f64,
        upper: f64,
        index: usize,
    },
}

/// One resolved tunable parameter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VariableSpec {
    tunable: Tunable,
    integer: bool,
    kind: VariableKind,
}

impl VariableSpec {
    /// The tunable this spec describes.
    #[must_use]
    pub fn tunable(&self) -> Tunable {
        self.tunable
    }

    /// Whether the parameter is integer-typed.
    #[must_use]
    pub fn is_integer(&self) -> bool {
        self.integer
    }

    /// How the parameter participates in the search.
    #[must_use]
    pub fn kind(&self) -> VariableKind {
        self.kind
    }

    /// Whether this spec is an optimization dimension.
    #[must_use]
    pub fn in_use(&self) -> bool {
        matches!(self.kind, VariableKind::Ranged { .. })
    }

    /// This parameter's value under the given candidate: the sampled
    /// component for ranged specs, the fixed value otherwise.
    #[must_use]
    pub fn value_from(&self, candidate: &[f64]) -> f64 {
        match self.kind {
            VariableKind::Fixed(value) => value,
            VariableKind::Ranged { index, .. } => candidate[index],
        }
    }
}

/// A tunable's raw declaration: one value fixes it, two give it a range.
#[derive(Clone, Debug)]
pub struct RawVariable {
    pub tunable: Tunable,
    pub values: Vec<f64>,
}

/// The resolved search space: every tunable's spec plus the bounds of the
/// optimization dimensions, ordered by dimension index.
///
/// Immutable after [`resolve`](VariableSpace::resolve).
#[derive(Clone, Debug)]
pub struct VariableSpace {
    specs: Vec<VariableSpec>,
    lower: Vec<f64>,
    upper: Vec<f64>,
}

impl VariableSpace {
    /// Resolves raw declarations into a search space.
    ///
    /// Dimension indices are assigned in declaration order to exactly the
    /// two-value parameters, starting at 0. Range bounds are sorted
    /// ascending, so `10,0.1` and `0.1,10` declare the same range.
    ///
    /// # Errors
    ///
    /// [`Error::BadValueCount`] if a parameter has zero or more than two
    /// values; [`Error::NoDimensions`] if no parameter has a range.
    pub fn resolve(raw: impl IntoIterator<Item = RawVariable>) -> Result<Self> {
        let mut specs = Vec::new();
        let mut lower = Vec::new();
        let mut upper = Vec::new();

        for var in raw {
            let kind = match var.values.as_slice() {
                [value] => VariableKind::Fixed(*value),
                [a, b] => {
                    let (lo, hi) = if a <= b { (*a, *b) } else { (*b, *a) };
                    let index = lower.len();
                    lower.push(lo);
                    upper.push(hi);
                    VariableKind::Ranged {
                        lower: lo,
                        upper: hi,
                        index,
                    }
                }
                other => {
                    return Err(Error::BadValueCount {
                        name: var.tunable.name(),
                        got: other.len(),
                    });
                }
            };
            specs.push(VariableSpec {
                tunable: var.tunable,
                integer: var.tunable.is_integer(),
                kind,
            });
        }

        if lower.is_empty() {
            return Err(Error::NoDimensions);
        }

        Ok(Self {
            specs,
            lower,
            upper,
        })
    }

    /// Number of optimization dimensions.
    #[must_use]
    pub fn dimensions(&self) -> usize {
        self.lower.len()
    }

    /// Per-dimension lower bounds, ordered by dimension index.
    #[must_use]
    pub fn lower_bounds(&self) -> &[f64] {
        &self.lower
    }

    /// Per-dimension upper bounds, ordered by dimension index.
    #[must_use]
    pub fn upper_bounds(&self) -> &[f64] {
        &self.upper
    }

    /// All resolved specs, in declaration order.
    #[must_use]
    pub fn specs(&self) -> &[VariableSpec] {
        &self.specs
    }

    /// Projects a named parameter set back onto the optimization
    /// dimensions. Inverse of [`SvmParams::from_candidate`] for values
    /// within bounds.
    #[must_use]
    pub fn project(&self, params: &SvmParams) -> Vec<f64> {
        let mut candidate = vec![0.0; self.dimensions()];
        for spec in &self.specs {
            if let VariableKind::Ranged { index, .. } = spec.kind {
                candidate[index] = params.get(spec.tunable);
            }
        }
        candidate
    }
}
