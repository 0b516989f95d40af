//! Line-oriented network text format.
//!
//! ```text
//! LAYER_SIZES=2,3,1
//! ACTIVATION_FUNCTION=SIGMOID
//! LAYER_W::0=<row-major weights of layer 0>
//! LAYER_B::0=<bias of layer 0>
//! LAYER_W::1=...
//! LAYER_B::1=...
//! ```
//!
//! On load, `LAYER_SIZES` rebuilds the layer chain with fresh random
//! parameters; each `LAYER_W`/`LAYER_B` line then replaces one matrix, laid out
//! in that layer's existing shape. Apart from `LAYER_SIZES` having to precede
//! the parameter lines, key order does not matter. Unknown keys are ignored.

use std::fs;
use std::path::Path;

use rand::Rng;
use tracing::{debug, error, info};

use crate::{Activation, Config, Error, Matrix, NeuralNetwork, Result};

const LAYER_SIZES: &str = "LAYER_SIZES";
const ACTIVATION_FUNCTION: &str = "ACTIVATION_FUNCTION";
const LAYER_W: &str = "LAYER_W::";
const LAYER_B: &str = "LAYER_B::";

fn key_value(out: &mut String, key: &str, value: &str) {
    out.push_str(&key.to_uppercase());
    out.push('=');
    out.push_str(value);
    out.push('\n');
}

impl NeuralNetwork {
    /// Serialize sizes, activation and every layer's parameters.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let sizes = self
            .layer_sizes()
            .iter()
            .map(usize::to_string)
            .collect::<Vec<_>>()
            .join(",");
        key_value(&mut out, LAYER_SIZES, &sizes);
        key_value(&mut out, ACTIVATION_FUNCTION, self.activation().name());
        for (i, layer) in self.layers().iter().enumerate() {
            key_value(&mut out, &format!("{LAYER_W}{i}"), &layer.weights().to_flat_line());
            key_value(&mut out, &format!("{LAYER_B}{i}"), &layer.bias().to_flat_line());
        }
        out
    }

    /// Parse the text format.
    pub fn from_text(text: &str) -> Result<Self> {
        Self::from_text_with_rng(text, &mut rand::thread_rng())
    }

    /// Parse the text format, drawing placeholder parameters from `rng`.
    pub fn from_text_with_rng<R: Rng + ?Sized>(text: &str, rng: &mut R) -> Result<Self> {
        let mut network: Option<NeuralNetwork> = None;
        let mut activation = Activation::default();

        for (line_no, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let (key, value) = line
                .split_once('=')
                .ok_or_else(|| Error::Parse(format!("line {}: expected KEY=VALUE", line_no + 1)))?;

            if key == LAYER_SIZES {
                let sizes = parse_sizes(value)?;
                let config = Config::default().with_activation(activation);
                network = Some(NeuralNetwork::new_with_rng(&sizes, &config, rng)?);
            } else if key == ACTIVATION_FUNCTION {
                activation = value.parse()?;
            } else if let Some(idx) = key.strip_prefix(LAYER_W) {
                let net = require_network(&mut network, key)?;
                let layer = layer_at(net, idx)?;
                let (rows, cols) = layer.weights().shape();
                layer.set_weights(Matrix::parse_flat_line(rows, cols, value)?)?;
            } else if let Some(idx) = key.strip_prefix(LAYER_B) {
                let net = require_network(&mut network, key)?;
                let layer = layer_at(net, idx)?;
                let (rows, cols) = layer.bias().shape();
                layer.set_bias(Matrix::parse_flat_line(rows, cols, value)?)?;
            } else {
                debug!(key, "ignoring unknown network key");
            }
        }

        let mut network =
            network.ok_or_else(|| Error::Parse(format!("missing {LAYER_SIZES} entry")))?;
        network.set_activation(activation);
        Ok(network)
    }

    /// Write the text format to `path`.
    ///
    /// A failure is logged; the error is also returned for callers that care.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let p = path.as_ref();
        match fs::write(p, self.to_text()) {
            Ok(()) => {
                info!(path = %p.display(), "network saved");
                Ok(())
            }
            Err(e) => {
                let e = Error::io(p, e);
                error!(error = %e, "network save failed");
                Err(e)
            }
        }
    }

    /// Read a network written by [`NeuralNetwork::save`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let p = path.as_ref();
        let result = fs::read_to_string(p)
            .map_err(|e| Error::io(p, e))
            .and_then(|text| Self::from_text(&text));
        match &result {
            Ok(_) => info!(path = %p.display(), "network loaded"),
            Err(e) => error!(path = %p.display(), error = %e, "network load failed"),
        }
        result
    }
}

fn parse_sizes(value: &str) -> Result<Vec<usize>> {
    value
        .split(',')
        .map(|s| {
            let s = s.trim();
            s.parse::<usize>()
                .map_err(|e| Error::Parse(format!("invalid layer size {s:?}: {e}")))
        })
        .collect()
}

fn require_network<'a>(
    network: &'a mut Option<NeuralNetwork>,
    key: &str,
) -> Result<&'a mut NeuralNetwork> {
    network
        .as_mut()
        .ok_or_else(|| Error::Parse(format!("{key} appears before {LAYER_SIZES}")))
}

fn layer_at<'a>(network: &'a mut NeuralNetwork, idx: &str) -> Result<&'a mut crate::Layer> {
    let i: usize = idx
        .trim()
        .parse()
        .map_err(|e| Error::Parse(format!("invalid layer index {idx:?}: {e}")))?;
    let num_layers = network.num_layers();
    network
        .layer_mut(i)
        .ok_or_else(|| {
            Error::Parse(format!("layer index {i} out of range for {num_layers} layers"))
        })
}
