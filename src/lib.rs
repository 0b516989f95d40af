//! A from-scratch multilayer perceptron.
//!
//! `neural` is a small dense feed-forward network built on its own `f64`
//! matrix type. It trains one example at a time with plain gradient descent
//! and persists networks in a line-oriented text format.
//!
//! # Model
//!
//! - A network is an ordered chain of [`Layer`]s. Layer `i` maps
//!   `layer_sizes[i]` inputs to `layer_sizes[i + 1]` outputs through
//!   `activation(W x + b)`.
//! - The activation ([`Activation::Sigmoid`] or [`Activation::Tanh`]) is chosen
//!   once per network.
//! - Inputs and targets are [`Matrix`] values. Non-vector inputs (an image
//!   grid, say) are flattened row-major into a column vector before use.
//!
//! # Training
//!
//! Each step draws one example at random, runs a forward pass, takes the loss
//! `target - output`, and walks the chain backwards. Every layer:
//!
//! - scales `activation'(output) ⊙ loss` by the learning rate,
//! - adds `gradient * inputᵀ` to its weights and `gradient` to its bias,
//! - hands `Wᵀ * loss` (with the updated `W`) to the layer before it.
//!
//! # Errors vs `Option`
//!
//! Matrix, layer and network operations return [`Result`] and never coerce
//! shapes. [`NeuralNetwork::predict`] and [`NeuralNetwork::train_one`] log the
//! error through `tracing` and return `None` instead, so that
//! [`NeuralNetwork::train`] keeps going when one example is malformed.
//!
//! # Quick start
//!
//! ```rust
//! use neural::{Config, Data, DataSet, Matrix, NeuralNetwork};
//!
//! # fn main() -> neural::Result<()> {
//! let mut train = DataSet::new();
//! for (x, y) in [([0.0, 0.0], 0.0), ([0.0, 1.0], 1.0), ([1.0, 0.0], 1.0), ([1.0, 1.0], 0.0)] {
//!     train.push(Data::new(Matrix::vector(&x), Matrix::vector(&[y])));
//! }
//!
//! let config = Config::default()
//!     .with_learning_rate(0.5)
//!     .with_iterations(2_000)
//!     .with_logging(false);
//! let mut net = NeuralNetwork::new_with_seed(&[2, 4, 1], &config, 0)?;
//! let report = net.train_with_seed(&train, &config, 0)?;
//! assert_eq!(report.failed_steps, 0);
//!
//! let out = net.try_predict(&train[1])?;
//! assert_eq!(out.shape(), (1, 1));
//!
//! let restored = NeuralNetwork::from_text(&net.to_text())?;
//! assert_eq!(restored, net);
//! # Ok(())
//! # }
//! ```

pub mod activation;
pub mod builder;
pub mod config;
pub mod data;
pub mod error;
pub mod layer;
pub mod loss;
pub(crate) mod matmul;
pub mod matrix;
pub mod network;
pub mod persist;
pub mod train;

#[cfg(feature = "serde")]
pub mod serde_model;

pub use activation::Activation;
pub use builder::NetworkBuilder;
pub use config::Config;
pub use data::{Data, DataSet};
pub use error::{Error, Result};
pub use layer::Layer;
pub use matrix::Matrix;
pub use network::{ForwardPass, NeuralNetwork};
pub use train::TrainReport;
