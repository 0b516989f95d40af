//! Network builder.
//!
//! `NetworkBuilder` spells out the layer widths one at a time instead of as a
//! raw sizes list, and validates each width as it is added:
//!
//! ```rust
//! use neural::{Activation, NetworkBuilder};
//!
//! # fn main() -> neural::Result<()> {
//! let net = NetworkBuilder::new(2)?
//!     .layer(4)?
//!     .layer(1)?
//!     .activation(Activation::Tanh)
//!     .build_with_seed(0)?;
//! assert_eq!(net.layer_sizes(), &[2, 4, 1]);
//! # Ok(())
//! # }
//! ```

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::{Activation, Config, Error, NeuralNetwork, Result};

#[derive(Debug, Clone)]
pub struct NetworkBuilder {
    sizes: Vec<usize>,
    activation: Activation,
}

impl NetworkBuilder {
    /// Start building a network that accepts inputs of `input_size` values.
    pub fn new(input_size: usize) -> Result<Self> {
        if input_size == 0 {
            return Err(Error::InvalidConfig("input size must be > 0".to_owned()));
        }
        Ok(Self {
            sizes: vec![input_size],
            activation: Activation::default(),
        })
    }

    /// Convenience constructor from a full `[input, hidden..., output]` list.
    pub fn from_sizes(sizes: &[usize]) -> Result<Self> {
        let Some((&input, rest)) = sizes.split_first() else {
            return Err(Error::InvalidConfig(
                "sizes must include input and output dims".to_owned(),
            ));
        };
        let mut b = Self::new(input)?;
        for &size in rest {
            b = b.layer(size)?;
        }
        Ok(b)
    }

    /// Add a layer with `size` outputs.
    pub fn layer(mut self, size: usize) -> Result<Self> {
        if size == 0 {
            return Err(Error::InvalidConfig("layer size must be > 0".to_owned()));
        }
        self.sizes.push(size);
        Ok(self)
    }

    pub fn activation(mut self, activation: Activation) -> Self {
        self.activation = activation;
        self
    }

    pub fn build(self) -> Result<NeuralNetwork> {
        self.build_with_rng(&mut rand::thread_rng())
    }

    /// Build using a deterministic seed.
    pub fn build_with_seed(self, seed: u64) -> Result<NeuralNetwork> {
        let mut rng = StdRng::seed_from_u64(seed);
        self.build_with_rng(&mut rng)
    }

    pub fn build_with_rng<R: Rng + ?Sized>(self, rng: &mut R) -> Result<NeuralNetwork> {
        if self.sizes.len() < 2 {
            return Err(Error::InvalidConfig(
                "network must have at least one layer".to_owned(),
            ));
        }
        let config = Config::default().with_activation(self.activation);
        NeuralNetwork::new_with_rng(&self.sizes, &config, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_matches_sizes_constructor() {
        let built = NetworkBuilder::from_sizes(&[3, 5, 2]).unwrap().build_with_seed(8).unwrap();
        let direct = NeuralNetwork::new_with_seed(&[3, 5, 2], &Config::default(), 8).unwrap();
        assert_eq!(built, direct);
    }

    #[test]
    fn builder_validates() {
        assert!(NetworkBuilder::new(0).is_err());
        assert!(NetworkBuilder::new(2).unwrap().layer(0).is_err());
        assert!(NetworkBuilder::new(2).unwrap().build_with_seed(0).is_err());
        assert!(NetworkBuilder::from_sizes(&[]).is_err());
    }

    #[test]
    fn builder_carries_activation() {
        let net = NetworkBuilder::new(1)
            .unwrap()
            .layer(1)
            .unwrap()
            .activation(Activation::Tanh)
            .build_with_seed(0)
            .unwrap();
        assert_eq!(net.activation(), Activation::Tanh);
    }
}
