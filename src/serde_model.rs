//! JSON model format (feature: `serde`).
//!
//! A versioned alternative to the `KEY=VALUE` text format. Internal
//! `NeuralNetwork`/`Layer` structs are not serialized directly, so the file
//! format can stay stable if their representation changes. Deserialization
//! validates the layer chain, parameter lengths, and that every parameter is
//! finite.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Activation, Error, Layer, Matrix, NeuralNetwork, Result};

pub const MODEL_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedNetwork {
    pub format_version: u32,
    pub activation: Activation,
    pub layers: Vec<SerializedLayer>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedLayer {
    pub in_dim: usize,
    pub out_dim: usize,
    /// Row-major (out_dim, in_dim).
    pub weights: Vec<f64>,
    pub bias: Vec<f64>,
}

impl SerializedNetwork {
    pub fn validate(&self) -> Result<()> {
        if self.format_version != MODEL_FORMAT_VERSION {
            return Err(Error::Parse(format!(
                "unsupported model format_version {}; expected {}",
                self.format_version, MODEL_FORMAT_VERSION
            )));
        }
        if self.layers.is_empty() {
            return Err(Error::Parse(
                "serialized model must have at least one layer".to_owned(),
            ));
        }

        for (i, layer) in self.layers.iter().enumerate() {
            layer
                .validate()
                .map_err(|e| Error::Parse(format!("layer {i} invalid: {e}")))?;

            if i > 0 {
                let prev_out = self.layers[i - 1].out_dim;
                if layer.in_dim != prev_out {
                    return Err(Error::Parse(format!(
                        "layer {i} in_dim {} does not match previous out_dim {}",
                        layer.in_dim, prev_out
                    )));
                }
            }
        }

        Ok(())
    }
}

impl SerializedLayer {
    fn validate(&self) -> Result<()> {
        if self.in_dim == 0 || self.out_dim == 0 {
            return Err(Error::Parse(format!(
                "layer dims must be > 0, got in_dim={} out_dim={}",
                self.in_dim, self.out_dim
            )));
        }
        if self.weights.len() != self.in_dim * self.out_dim {
            return Err(Error::Parse(format!(
                "weights length {} does not match out_dim * in_dim ({} * {})",
                self.weights.len(),
                self.out_dim,
                self.in_dim
            )));
        }
        if self.bias.len() != self.out_dim {
            return Err(Error::Parse(format!(
                "bias length {} does not match out_dim {}",
                self.bias.len(),
                self.out_dim
            )));
        }
        if self.weights.iter().chain(&self.bias).any(|v| !v.is_finite()) {
            return Err(Error::Parse(
                "parameters must contain only finite values".to_owned(),
            ));
        }
        Ok(())
    }
}

impl From<&NeuralNetwork> for SerializedNetwork {
    fn from(network: &NeuralNetwork) -> Self {
        Self {
            format_version: MODEL_FORMAT_VERSION,
            activation: network.activation(),
            layers: network.layers().iter().map(SerializedLayer::from).collect(),
        }
    }
}

impl From<&Layer> for SerializedLayer {
    fn from(layer: &Layer) -> Self {
        Self {
            in_dim: layer.in_dim(),
            out_dim: layer.out_dim(),
            weights: layer.weights().as_slice().to_vec(),
            bias: layer.bias().as_slice().to_vec(),
        }
    }
}

impl TryFrom<SerializedNetwork> for NeuralNetwork {
    type Error = Error;

    fn try_from(value: SerializedNetwork) -> std::result::Result<Self, Self::Error> {
        value.validate()?;

        let mut layers = Vec::with_capacity(value.layers.len());
        for layer in value.layers {
            let weights = Matrix::from_flat(layer.out_dim, layer.in_dim, layer.weights)?;
            let bias = Matrix::from_flat(layer.out_dim, 1, layer.bias)?;
            layers.push(Layer::from_parts(weights, bias)?);
        }
        NeuralNetwork::from_layers(layers, value.activation)
    }
}

impl NeuralNetwork {
    /// Serialize the network to a pretty-printed JSON string.
    pub fn to_json_string_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(&SerializedNetwork::from(self))
            .map_err(|e| Error::Parse(format!("failed to serialize model: {e}")))
    }

    /// Serialize the network to a compact JSON string.
    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string(&SerializedNetwork::from(self))
            .map_err(|e| Error::Parse(format!("failed to serialize model: {e}")))
    }

    /// Parse a network from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let ser: SerializedNetwork = serde_json::from_str(s)
            .map_err(|e| Error::Parse(format!("failed to parse model json: {e}")))?;
        ser.try_into()
    }

    /// Save the network to a JSON file (pretty-printed).
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let s = self.to_json_string_pretty()?;
        let p = path.as_ref();
        std::fs::write(p, s).map_err(|e| Error::io(p, e))
    }

    /// Load a network from a JSON file.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let p = path.as_ref();
        let s = std::fs::read_to_string(p).map_err(|e| Error::io(p, e))?;
        Self::from_json_str(&s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Config;

    #[test]
    fn json_round_trip_is_exact() {
        let config = Config::default().with_activation(Activation::Tanh);
        let net = NeuralNetwork::new_with_seed(&[3, 4, 2], &config, 2).unwrap();
        let loaded = NeuralNetwork::from_json_str(&net.to_json_string().unwrap()).unwrap();
        assert_eq!(loaded, net);

        let pretty = net.to_json_string_pretty().unwrap();
        assert!(pretty.contains("\"activation\": \"TANH\""));
        assert_eq!(NeuralNetwork::from_json_str(&pretty).unwrap(), net);
    }

    #[test]
    fn rejects_unknown_version() {
        let bad = r#"{"format_version":999,"activation":"SIGMOID","layers":[]}"#;
        let err = NeuralNetwork::from_json_str(bad).unwrap_err();
        assert!(format!("{err}").contains("format_version"));
    }

    #[test]
    fn rejects_broken_chain_and_lengths() {
        let chain = r#"{"format_version":1,"activation":"SIGMOID","layers":[
            {"in_dim":2,"out_dim":2,"weights":[1,2,3,4],"bias":[0,0]},
            {"in_dim":3,"out_dim":1,"weights":[1,2,3],"bias":[0]}]}"#;
        assert!(NeuralNetwork::from_json_str(chain).is_err());

        let short = r#"{"format_version":1,"activation":"SIGMOID","layers":[
            {"in_dim":2,"out_dim":1,"weights":[1],"bias":[0]}]}"#;
        assert!(NeuralNetwork::from_json_str(short).is_err());
    }
}
