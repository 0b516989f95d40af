use std::fmt;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::error;

use crate::{Activation, Config, Data, Error, Layer, Matrix, Result};

/// A fully connected feed-forward network.
///
/// Owns the ordered chain of layers; layer `i` maps `layer_sizes[i]` inputs to
/// `layer_sizes[i + 1]` outputs. The activation is fixed per network.
#[derive(Debug, Clone, PartialEq)]
pub struct NeuralNetwork {
    layer_sizes: Vec<usize>,
    layers: Vec<Layer>,
    activation: Activation,
}

/// Post-activation outputs of every layer for one forward pass.
///
/// Produced by [`NeuralNetwork::forward`] and consumed by
/// [`NeuralNetwork::backward`]; it is only meaningful for the input it was
/// computed from.
#[derive(Debug, Clone)]
pub struct ForwardPass {
    layer_outputs: Vec<Matrix>,
}

impl ForwardPass {
    /// The network's prediction (output of the last layer).
    #[inline]
    pub fn output(&self) -> &Matrix {
        self.layer_outputs
            .last()
            .expect("forward pass must have at least one layer output")
    }

    #[inline]
    pub fn into_output(mut self) -> Matrix {
        self.layer_outputs
            .pop()
            .expect("forward pass must have at least one layer output")
    }

    #[inline]
    pub fn layer_output(&self, idx: usize) -> Option<&Matrix> {
        self.layer_outputs.get(idx)
    }
}

impl NeuralNetwork {
    /// Build a randomly initialised network from `[input, hidden..., output]` sizes.
    pub fn new(sizes: &[usize], config: &Config) -> Result<Self> {
        Self::new_with_rng(sizes, config, &mut rand::thread_rng())
    }

    pub fn new_with_seed(sizes: &[usize], config: &Config, seed: u64) -> Result<Self> {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::new_with_rng(sizes, config, &mut rng)
    }

    pub fn new_with_rng<R: Rng + ?Sized>(
        sizes: &[usize],
        config: &Config,
        rng: &mut R,
    ) -> Result<Self> {
        if sizes.len() < 2 {
            return Err(Error::InvalidConfig(
                "sizes must include input and output dims".to_owned(),
            ));
        }
        if sizes.contains(&0) {
            return Err(Error::InvalidConfig(
                "all layer sizes must be > 0".to_owned(),
            ));
        }

        let mut layers = Vec::with_capacity(sizes.len() - 1);
        for w in sizes.windows(2) {
            layers.push(Layer::new_with_rng(w[0], w[1], rng)?);
        }
        Ok(Self {
            layer_sizes: sizes.to_vec(),
            layers,
            activation: config.activation,
        })
    }

    /// Assemble a network from existing layers. Adjacent widths must chain.
    pub fn from_layers(layers: Vec<Layer>, activation: Activation) -> Result<Self> {
        let Some(first) = layers.first() else {
            return Err(Error::InvalidConfig(
                "network must have at least one layer".to_owned(),
            ));
        };

        let mut layer_sizes = Vec::with_capacity(layers.len() + 1);
        layer_sizes.push(first.in_dim());
        for (i, layer) in layers.iter().enumerate() {
            let expected = layer_sizes[i];
            if layer.in_dim() != expected {
                return Err(Error::InvalidConfig(format!(
                    "layer {i} in_dim {} does not match previous out_dim {expected}",
                    layer.in_dim()
                )));
            }
            layer_sizes.push(layer.out_dim());
        }

        Ok(Self {
            layer_sizes,
            layers,
            activation,
        })
    }

    #[inline]
    pub fn layer_sizes(&self) -> &[usize] {
        &self.layer_sizes
    }

    #[inline]
    pub fn input_size(&self) -> usize {
        self.layer_sizes[0]
    }

    #[inline]
    pub fn output_size(&self) -> usize {
        self.layer_sizes[self.layer_sizes.len() - 1]
    }

    #[inline]
    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    #[inline]
    pub fn layer(&self, idx: usize) -> Option<&Layer> {
        self.layers.get(idx)
    }

    #[inline]
    pub fn layer_mut(&mut self, idx: usize) -> Option<&mut Layer> {
        self.layers.get_mut(idx)
    }

    #[inline]
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    #[inline]
    pub fn activation(&self) -> Activation {
        self.activation
    }

    pub(crate) fn set_activation(&mut self, activation: Activation) {
        self.activation = activation;
    }

    /// Forward pass for a single column-vector input, head to tail.
    pub fn forward(&self, input: &Matrix) -> Result<ForwardPass> {
        let mut layer_outputs: Vec<Matrix> = Vec::with_capacity(self.layers.len());
        for layer in &self.layers {
            let layer_input = layer_outputs.last().unwrap_or(input);
            let out = layer.feed_forward(layer_input, self.activation)?;
            layer_outputs.push(out);
        }
        Ok(ForwardPass { layer_outputs })
    }

    /// Backward pass for a single sample, tail to head, updating every layer.
    ///
    /// `pass` must come from `forward(input)` on this network and `loss` is
    /// `target - output`. Each layer receives the loss propagated through the
    /// already-updated weights of the layer after it. Stops at the first shape
    /// error; layers closer to the tail may already have been updated.
    pub fn backward(
        &mut self,
        input: &Matrix,
        pass: &ForwardPass,
        loss: Matrix,
        learning_rate: f64,
    ) -> Result<()> {
        if pass.layer_outputs.len() != self.layers.len() {
            return Err(Error::InvalidData(format!(
                "forward pass has {} layer outputs, network has {} layers",
                pass.layer_outputs.len(),
                self.layers.len()
            )));
        }

        let mut loss = loss;
        for idx in (0..self.layers.len()).rev() {
            let layer_input = if idx == 0 {
                input
            } else {
                &pass.layer_outputs[idx - 1]
            };
            loss = self.layers[idx].back_propagate(
                layer_input,
                &pass.layer_outputs[idx],
                &loss,
                self.activation,
                learning_rate,
            )?;
        }
        Ok(())
    }

    /// Run one forward pass on the example's input, flattened to a column vector.
    ///
    /// The example itself is not modified.
    pub fn try_predict(&self, data: &Data) -> Result<Matrix> {
        let input = data.input().to_vector();
        Ok(self.forward(&input)?.into_output())
    }

    /// Like [`NeuralNetwork::try_predict`], but logs the error and returns `None`.
    pub fn predict(&self, data: &Data) -> Option<Matrix> {
        match self.try_predict(data) {
            Ok(out) => Some(out),
            Err(e) => {
                error!(error = %e, "prediction failed");
                None
            }
        }
    }
}

impl fmt::Display for NeuralNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Layer sizes:\t\t{:?} ({})", self.layer_sizes, self.layer_sizes.len())?;
        writeln!(f, "Input size:\t\t{}", self.input_size())?;
        writeln!(f, "Target size:\t\t{}", self.output_size())?;
        writeln!(f, "Activation function:\t{}", self.activation)?;
        writeln!(f, "Layers:")?;
        for (i, layer) in self.layers.iter().enumerate() {
            writeln!(f, "[{i}. layer] {}x{}", layer.out_dim(), layer.in_dim())?;
            write!(f, "{}", layer.weights())?;
        }
        Ok(())
    }
}
