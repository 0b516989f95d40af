//! Activation functions.
//!
//! A layer computes a pre-activation value `z = W x + b` and then applies an
//! activation function element-wise: `y = activation(z)`.
//!
//! Only the *post-activation* output `y` is cached between the forward and the
//! backward pass, so derivatives are expressed in terms of `y`:
//!
//! - sigmoid: `dsigmoid(y) = y * (1 - y)`, exact when `y = sigmoid(z)`.
//! - tanh: `dtanh(y) = 1 - tanh(tanh(y))`. This is *not* the textbook
//!   `1 - y^2`; networks trained and persisted with this rule depend on it, so
//!   it is kept as-is.

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "UPPERCASE"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
/// Element-wise activation function, chosen once per network.
pub enum Activation {
    #[default]
    Sigmoid,
    Tanh,
}

impl Activation {
    #[inline]
    pub fn forward(self, x: f64) -> f64 {
        match self {
            Activation::Sigmoid => sigmoid(x),
            Activation::Tanh => tanh(x),
        }
    }

    /// Derivative of the activation, evaluated on an already-activated value.
    #[inline]
    pub fn derivative(self, y: f64) -> f64 {
        match self {
            Activation::Sigmoid => dsigmoid(y),
            Activation::Tanh => dtanh(y),
        }
    }

    /// Upper-case name used by the network text format.
    pub fn name(self) -> &'static str {
        match self {
            Activation::Sigmoid => "SIGMOID",
            Activation::Tanh => "TANH",
        }
    }
}

impl fmt::Display for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Activation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "SIGMOID" => Ok(Activation::Sigmoid),
            "TANH" => Ok(Activation::Tanh),
            other => Err(Error::Parse(format!("unknown activation function {other:?}"))),
        }
    }
}

#[inline]
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Sigmoid derivative; `y` is expected to be `sigmoid(x)` already.
#[inline]
pub fn dsigmoid(y: f64) -> f64 {
    y * (1.0 - y)
}

/// Hyperbolic tangent via `f64::tanh`.
///
/// Mathematically equal to `(e^x - e^-x) / (e^x + e^-x)`, but that quotient
/// overflows to NaN for large `|x|`. Results can differ from it in the last
/// ulp, so a network trained with the quotient form may predict slightly
/// differently after loading.
#[inline]
pub fn tanh(x: f64) -> f64 {
    x.tanh()
}

#[inline]
pub fn dtanh(y: f64) -> f64 {
    1.0 - tanh(tanh(y))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64, abs_tol: f64) {
        let diff = (actual - expected).abs();
        assert!(diff <= abs_tol, "actual={actual} expected={expected} diff={diff}");
    }

    #[test]
    fn sigmoid_basic_values() {
        assert_eq!(sigmoid(0.0), 0.5);
        assert_eq!(dsigmoid(sigmoid(0.0)), 0.25);

        assert!(sigmoid(10.0) > 0.9999);
        assert!(sigmoid(-10.0) < 0.0001);
        assert_close(sigmoid(1.0), 0.731_058_578_6, 1e-10);
    }

    #[test]
    fn tanh_matches_exponential_form() {
        for &x in &[-2.0_f64, -0.5, 0.0, 0.3, 1.7] {
            let expected = (x.exp() - (-x).exp()) / (x.exp() + (-x).exp());
            assert_close(tanh(x), expected, 1e-12);
        }
    }

    #[test]
    fn tanh_saturates_where_the_quotient_overflows() {
        let x = 800.0_f64;
        assert!(((x.exp() - (-x).exp()) / (x.exp() + (-x).exp())).is_nan());
        assert_eq!(tanh(x), 1.0);
        assert_eq!(tanh(-x), -1.0);
    }

    #[test]
    fn tanh_derivative_applies_tanh_twice() {
        let y = tanh(0.8);
        assert_eq!(dtanh(y), 1.0 - y.tanh().tanh());
        assert_ne!(dtanh(y), 1.0 - y * y);
        assert_eq!(Activation::Tanh.derivative(y), dtanh(y));
    }

    #[test]
    fn names_round_trip_through_from_str() {
        for act in [Activation::Sigmoid, Activation::Tanh] {
            assert_eq!(act.name().parse::<Activation>().unwrap(), act);
        }
        assert!("RELU".parse::<Activation>().is_err());
        assert_eq!(Activation::default(), Activation::Sigmoid);
    }
}
