//! Named SVM hyperparameters and the fixed categorical selectors.
//!
//! The six tunables ([`Tunable`]) are the parameters the search can either
//! hold fixed or optimize over a range. The SVM formulation
//! ([`SvmType`]) and kernel family ([`KernelType`]) are categorical
//! selectors chosen up front and never optimized.

use core::fmt;
use core::str::FromStr;

use crate::error::{Error, Result};
use crate::pipeline::Scores;
use crate::space::VariableSpace;

/// A tunable SVM hyperparameter.
///
/// The variant order is the declaration order: it fixes the dimension
/// ordering of candidate vectors when more than one parameter is given a
/// range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tunable {
    /// Soft-margin cost (C).
    Cost,
    /// Kernel coefficient gamma.
    Gamma,
    /// Polynomial kernel degree.
    Degree,
    /// Independent term in poly/sigmoid kernels.
    Coef0,
    /// Tolerance of the termination criterion.
    Eps,
    /// Nu parameter of nu-SVC/SVR formulations.
    Nu,
}

impl Tunable {
    /// All tunables in declaration order.
    pub const ALL: [Tunable; 6] = [
        Tunable::Cost,
        Tunable::Gamma,
        Tunable::Degree,
        Tunable::Coef0,
        Tunable::Eps,
        Tunable::Nu,
    ];

    /// The parameter name as the external pipeline spells it.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Tunable::Cost => "cost",
            Tunable::Gamma => "gamma",
            Tunable::Degree => "degree",
            Tunable::Coef0 => "coef0",
            Tunable::Eps => "eps",
            Tunable::Nu => "nu",
        }
    }

    /// Whether this parameter is integer-typed.
    ///
    /// Integer-typed dimensions are rounded before being handed to the
    /// training step.
    #[must_use]
    pub fn is_integer(self) -> bool {
        matches!(self, Tunable::Degree)
    }

    /// The default value used when the parameter is not mentioned at all.
    #[must_use]
    pub fn default_value(self) -> f64 {
        match self {
            Tunable::Cost | Tunable::Gamma => 1.0,
            Tunable::Degree => 3.0,
            Tunable::Coef0 => 0.0,
            Tunable::Eps => 0.001,
            Tunable::Nu => 0.5,
        }
    }
}

impl fmt::Display for Tunable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The full named hyperparameter set handed to the training step.
///
/// Built from a candidate vector plus the fixed values via
/// [`SvmParams::from_candidate`]; every evaluation gets exactly one.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SvmParams {
    pub cost: f64,
    pub gamma: f64,
    pub degree: i64,
    pub coef0: f64,
    pub eps: f64,
    pub nu: f64,
}

impl SvmParams {
    /// Reconstructs the full named set from a candidate vector: ranged
    /// parameters take their sampled value, fixed parameters their fixed
    /// value. Integer-typed values are rounded.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_candidate(space: &VariableSpace, candidate: &[f64]) -> Self {
        let mut params = SvmParams {
            cost: 0.0,
            gamma: 0.0,
            degree: 0,
            coef0: 0.0,
            eps: 0.0,
            nu: 0.0,
        };
        for spec in space.specs() {
            let value = spec.value_from(candidate);
            match spec.tunable() {
                Tunable::Cost => params.cost = value,
                Tunable::Gamma => params.gamma = value,
                Tunable::Degree => params.degree = value.round() as i64,
                Tunable::Coef0 => params.coef0 = value,
                Tunable::Eps => params.eps = value,
                Tunable::Nu => params.nu = value,
            }
        }
        params
    }

    /// The value of a single named parameter, as an `f64`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn get(&self, tunable: Tunable) -> f64 {
        match tunable {
            Tunable::Cost => self.cost,
            Tunable::Gamma => self.gamma,
            Tunable::Degree => self.degree as f64,
            Tunable::Coef0 => self.coef0,
            Tunable::Eps => self.eps,
            Tunable::Nu => self.nu,
        }
    }
}

impl fmt::Display for SvmParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cost={} gamma={} degree={} coef0={} eps={} nu={}",
            self.cost, self.gamma, self.degree, self.coef0, self.eps, self.nu
        )
    }
}

/// SVM formulation selector. Fixed for the whole search.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SvmType {
    /// C-classification.
    #[default]
    CSvc,
    /// Nu-classification.
    NuSvc,
    /// One-class novelty detection.
    OneClass,
    /// Epsilon-regression.
    EpsilonSvr,
    /// Nu-regression.
    NuSvr,
}

impl SvmType {
    /// The value the external training tool expects for its `type` option.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SvmType::CSvc => "c_svc",
            SvmType::NuSvc => "nu_svc",
            SvmType::OneClass => "one_class",
            SvmType::EpsilonSvr => "epsilon_svr",
            SvmType::NuSvr => "nu_svr",
        }
    }
}

impl FromStr for SvmType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "c_svc" => Ok(SvmType::CSvc),
            "nu_svc" => Ok(SvmType::NuSvc),
            "one_class" => Ok(SvmType::OneClass),
            "epsilon_svr" => Ok(SvmType::EpsilonSvr),
            "nu_svr" => Ok(SvmType::NuSvr),
            _ => Err(Error::BadSelector {
                name: "type",
                value: s.to_string(),
                expected: "c_svc, nu_svc, one_class, epsilon_svr, nu_svr",
            }),
        }
    }
}

impl fmt::Display for SvmType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kernel family selector. Fixed for the whole search.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum KernelType {
    Linear,
    Poly,
    #[default]
    Rbf,
    Sigmoid,
}

impl KernelType {
    /// The value the external training tool expects for its `kernel` option.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            KernelType::Linear => "linear",
            KernelType::Poly => "poly",
            KernelType::Rbf => "rbf",
            KernelType::Sigmoid => "sigmoid",
        }
    }
}

impl FromStr for KernelType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "linear" => Ok(KernelType::Linear),
            "poly" => Ok(KernelType::Poly),
            "rbf" => Ok(KernelType::Rbf),
            "sigmoid" => Ok(KernelType::Sigmoid),
            _ => Err(Error::BadSelector {
                name: "kernel",
                value: s.to_string(),
                expected: "linear, poly, rbf, sigmoid",
            }),
        }
    }
}

impl fmt::Display for KernelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which reported metric drives the fitness.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Measure {
    /// Matthews correlation coefficient.
    #[default]
    Mcc,
    /// Cohen's kappa.
    Kappa,
    /// Overall accuracy.
    Accuracy,
}

impl Measure {
    /// Extracts this measure's value from a score record.
    #[must_use]
    pub fn of(self, scores: &Scores) -> f64 {
        match self {
            Measure::Mcc => scores.mcc,
            Measure::Kappa => scores.kappa,
            Measure::Accuracy => scores.overall_accuracy,
        }
    }
}

impl FromStr for Measure {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "mcc" => Ok(Measure::Mcc),
            "kappa" => Ok(Measure::Kappa),
            "acc" => Ok(Measure::Accuracy),
            _ => Err(Error::BadSelector {
                name: "measure",
                value: s.to_string(),
                expected: "mcc, kappa, acc",
            }),
        }
    }
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Measure::Mcc => "mcc",
            Measure::Kappa => "kappa",
            Measure::Accuracy => "acc",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tunable_declaration_order() {
        let names: Vec<_> = Tunable::ALL.iter().map(|t| t.name()).collect();
        assert_eq!(names, ["cost", "gamma", "degree", "coef0", "eps", "nu"]);
    }

    #[test]
    fn degree_is_the_only_integer() {
        for t in Tunable::ALL {
            assert_eq!(t.is_integer(), t == Tunable::Degree);
        }
    }

    #[test]
    fn svm_type_roundtrip() {
        for s in ["c_svc", "nu_svc", "one_class", "epsilon_svr", "nu_svr"] {
            assert_eq!(s.parse::<SvmType>().unwrap().as_str(), s);
        }
        assert!("svc".parse::<SvmType>().is_err());
    }

    #[test]
    fn kernel_type_roundtrip() {
        for s in ["linear", "poly", "rbf", "sigmoid"] {
            assert_eq!(s.parse::<KernelType>().unwrap().as_str(), s);
        }
        assert!("gaussian".parse::<KernelType>().is_err());
    }

    #[test]
    fn measure_parses_and_selects() {
        let scores = Scores {
            mcc: 0.1,
            kappa: 0.2,
            overall_accuracy: 0.3,
        };
        assert_eq!("mcc".parse::<Measure>().unwrap().of(&scores), 0.1);
        assert_eq!("kappa".parse::<Measure>().unwrap().of(&scores), 0.2);
        assert_eq!("acc".parse::<Measure>().unwrap().of(&scores), 0.3);
        assert!("f1".parse::<Measure>().is_err());
    }
}
