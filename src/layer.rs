use rand::Rng;

use crate::{Activation, Error, Matrix, Result};

/// One affine transform followed by the network's activation.
///
/// Weights have shape `(out_dim, in_dim)` and the bias is an `(out_dim, 1)`
/// column. Neighbouring layers are not linked; the network owns the ordered
/// chain and hands each layer its input and cached output.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    weights: Matrix,
    bias: Matrix,
}

impl Layer {
    /// New layer with weights and bias drawn uniformly from `[-1, 1)`.
    pub fn new_with_rng<R: Rng + ?Sized>(
        in_dim: usize,
        out_dim: usize,
        rng: &mut R,
    ) -> Result<Self> {
        if in_dim == 0 || out_dim == 0 {
            return Err(Error::InvalidConfig(format!(
                "layer dims must be > 0, got in_dim={in_dim} out_dim={out_dim}"
            )));
        }

        let mut weights = Matrix::zeros(out_dim, in_dim);
        weights.randomize(rng);
        let mut bias = Matrix::zeros(out_dim, 1);
        bias.randomize(rng);

        Ok(Self { weights, bias })
    }

    /// Assemble a layer from existing parameters.
    ///
    /// `bias` must be a column vector with one entry per weight row.
    pub fn from_parts(weights: Matrix, bias: Matrix) -> Result<Self> {
        if weights.is_empty() {
            return Err(Error::InvalidConfig(format!(
                "layer weights must be non-empty, got {}x{}",
                weights.rows(),
                weights.cols()
            )));
        }
        if bias.shape() != (weights.rows(), 1) {
            return Err(Error::mismatch("layer bias", (weights.rows(), 1), bias.shape()));
        }
        Ok(Self { weights, bias })
    }

    #[inline]
    pub fn in_dim(&self) -> usize {
        self.weights.cols()
    }

    #[inline]
    pub fn out_dim(&self) -> usize {
        self.weights.rows()
    }

    #[inline]
    pub fn weights(&self) -> &Matrix {
        &self.weights
    }

    #[inline]
    pub fn bias(&self) -> &Matrix {
        &self.bias
    }

    /// Replace the weights; the new matrix must keep the layer's shape.
    pub fn set_weights(&mut self, weights: Matrix) -> Result<()> {
        if weights.shape() != self.weights.shape() {
            return Err(Error::mismatch("set_weights", self.weights.shape(), weights.shape()));
        }
        self.weights = weights;
        Ok(())
    }

    /// Replace the bias; the new matrix must keep the layer's shape.
    pub fn set_bias(&mut self, bias: Matrix) -> Result<()> {
        if bias.shape() != self.bias.shape() {
            return Err(Error::mismatch("set_bias", self.bias.shape(), bias.shape()));
        }
        self.bias = bias;
        Ok(())
    }

    /// Forward pass for a single sample.
    ///
    /// Computes `activation(W * input + b)`. `input` must be an `(in_dim, 1)`
    /// column.
    pub fn feed_forward(&self, input: &Matrix, activation: Activation) -> Result<Matrix> {
        let mut z = Matrix::matmul(&self.weights, input)?;
        z.add(&self.bias)?;
        z.activate(activation);
        Ok(z)
    }

    /// Backward pass for a single sample, updating the parameters in place.
    ///
    /// Inputs:
    /// - `input`: the input this layer saw in the forward pass (the previous
    ///   layer's output, or the sample itself for the first layer)
    /// - `output`: this layer's cached post-activation output
    /// - `loss`: error signal for this layer's output (`target - output` at the tail)
    ///
    /// Steps:
    /// - `gradient = activation'(output) ⊙ loss * learning_rate`
    /// - `W += gradient * inputᵀ`, `b += gradient`
    /// - returns `Wᵀ * loss` with the *updated* `W`, the loss for the previous layer
    ///
    /// The loss is `target - output`, so descent is an addition. On a shape
    /// error the parameters are left untouched.
    pub fn back_propagate(
        &mut self,
        input: &Matrix,
        output: &Matrix,
        loss: &Matrix,
        activation: Activation,
        learning_rate: f64,
    ) -> Result<Matrix> {
        let mut gradient = output.clone();
        gradient.activate_derivative(activation);
        gradient.hadamard(loss)?;
        gradient.scale(learning_rate);

        let delta = Matrix::matmul(&gradient, &input.transpose())?;
        if delta.shape() != self.weights.shape() {
            return Err(Error::mismatch(
                "back_propagate weights",
                self.weights.shape(),
                delta.shape(),
            ));
        }
        if gradient.shape() != self.bias.shape() {
            return Err(Error::mismatch("back_propagate bias", self.bias.shape(), gradient.shape()));
        }

        self.weights.add(&delta)?;
        self.bias.add(&gradient)?;

        Matrix::matmul(&self.weights.transpose(), loss)
    }
}
