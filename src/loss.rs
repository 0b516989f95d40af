//! Loss signal.
//!
//! The network trains on the raw residual `target - output`. Because of that
//! sign, a gradient step *adds* to the weights (see [`crate::Layer::back_propagate`]).
//! Progress is reported as the squared sum of the residual.

use crate::{Matrix, Result};

/// `target - output`, shaped like the operands.
#[inline]
pub fn residual(target: &Matrix, output: &Matrix) -> Result<Matrix> {
    Matrix::subtract(target, output)
}

/// Sum of squared residual entries.
#[inline]
pub fn squared_error(residual: &Matrix) -> f64 {
    residual.squared_sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn residual_is_target_minus_output() {
        let r = residual(&Matrix::vector(&[1.0, 0.0]), &Matrix::vector(&[0.25, 0.5])).unwrap();
        assert_eq!(r.as_slice(), &[0.75, -0.5]);
        assert_eq!(squared_error(&r), 0.8125);
    }

    #[test]
    fn residual_requires_matching_shapes() {
        let err = residual(&Matrix::vector(&[1.0]), &Matrix::vector(&[0.0, 1.0])).unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch { op: "subtract", .. }));
    }
}
