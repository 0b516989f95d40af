use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, error, info, warn};

use crate::{Config, Data, DataSet, Error, Matrix, NeuralNetwork, Result, loss};

/// Summary of a [`NeuralNetwork::train`] run.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainReport {
    /// Draws performed.
    pub iterations: usize,
    /// Draws whose step failed and was skipped.
    pub failed_steps: usize,
    /// Squared sum of the loss of the last successful step.
    pub last_loss: Option<f64>,
}

impl NeuralNetwork {
    /// One gradient step on a single example.
    ///
    /// Input and target are flattened to column vectors on private copies, so
    /// `data` is never modified. Returns the loss vector `target - output`
    /// computed before the update.
    pub fn try_train_one(&mut self, data: &Data, learning_rate: f64) -> Result<Matrix> {
        let target = data
            .target()
            .ok_or_else(|| Error::InvalidData("training example has no target".to_owned()))?
            .to_vector();
        let input = data.input().to_vector();

        let pass = self.forward(&input)?;
        let residual = loss::residual(&target, pass.output())?;
        self.backward(&input, &pass, residual.clone(), learning_rate)?;
        Ok(residual)
    }

    /// Like [`NeuralNetwork::try_train_one`], but logs the error and returns `None`.
    pub fn train_one(&mut self, data: &Data, learning_rate: f64) -> Option<Matrix> {
        match self.try_train_one(data, learning_rate) {
            Ok(loss) => Some(loss),
            Err(e) => {
                error!(error = %e, "training step failed");
                None
            }
        }
    }

    /// Train for `config.iterations` steps, each on one example drawn uniformly
    /// at random (with replacement) from `dataset`.
    ///
    /// A failed step is logged and skipped. When `config.logging_enabled` is
    /// set, progress and the current squared loss are logged at every whole
    /// percent.
    pub fn train(&mut self, dataset: &DataSet, config: &Config) -> Result<TrainReport> {
        self.train_with_rng(dataset, config, &mut rand::thread_rng())
    }

    pub fn train_with_seed(
        &mut self,
        dataset: &DataSet,
        config: &Config,
        seed: u64,
    ) -> Result<TrainReport> {
        let mut rng = StdRng::seed_from_u64(seed);
        self.train_with_rng(dataset, config, &mut rng)
    }

    pub fn train_with_rng<R: Rng + ?Sized>(
        &mut self,
        dataset: &DataSet,
        config: &Config,
        rng: &mut R,
    ) -> Result<TrainReport> {
        config.validate()?;
        if dataset.is_empty() {
            return Err(Error::InvalidData(
                "train dataset must not be empty".to_owned(),
            ));
        }
        if config.activation != self.activation() {
            warn!(
                config = %config.activation,
                network = %self.activation(),
                "config activation differs from the network's; using the network's"
            );
        }

        let log = config.logging_enabled;
        if log {
            info!(
                iterations = config.iterations,
                learning_rate = config.learning_rate,
                "training start"
            );
        }

        let mut report = TrainReport {
            iterations: config.iterations,
            failed_steps: 0,
            last_loss: None,
        };

        for i in 0..config.iterations {
            let idx = rng.gen_range(0..dataset.len());
            let step_loss = self
                .train_one(&dataset[idx], config.learning_rate)
                .map(|l| loss::squared_error(&l));
            match step_loss {
                Some(l) => report.last_loss = Some(l),
                None => report.failed_steps += 1,
            }

            if !log {
                continue;
            }
            if let Some(percent) = whole_percent(i, config.iterations) {
                match step_loss {
                    Some(l) => info!(percent, loss = l, "training progress"),
                    None => info!(percent, "training progress"),
                }
            }
        }

        if log {
            info!(failed_steps = report.failed_steps, "training complete");
        }
        Ok(report)
    }

    /// Classification accuracy in percent.
    ///
    /// An example counts as correct when the arg-max of the prediction equals
    /// the arg-max of its target. Examples that cannot be evaluated count as
    /// incorrect.
    pub fn test(&self, dataset: &DataSet) -> Result<f64> {
        if dataset.is_empty() {
            return Err(Error::InvalidData("test dataset must not be empty".to_owned()));
        }

        let mut correct = 0_usize;
        for (i, data) in dataset.iter().enumerate() {
            match self.classify(data) {
                Ok((target, predicted, max)) => {
                    if target == predicted {
                        correct += 1;
                    }
                    debug!(
                        example = i,
                        label = data.label().unwrap_or("-"),
                        target_index = target,
                        predicted_index = predicted,
                        max,
                        "test prediction"
                    );
                }
                Err(e) => error!(example = i, error = %e, "test prediction failed"),
            }
        }

        let accuracy = correct as f64 / dataset.len() as f64 * 100.0;
        info!(accuracy, correct, total = dataset.len(), "test complete");
        Ok(accuracy)
    }

    /// `(target index, predicted index, max output)` for one example.
    fn classify(&self, data: &Data) -> Result<(usize, usize, f64)> {
        let target = data
            .target()
            .ok_or_else(|| Error::InvalidData("test example has no target".to_owned()))?
            .to_vector()
            .argmax_column()?;
        let output = self.try_predict(data)?;
        Ok((target, output.argmax_column()?, output.max_value()))
    }
}

/// `Some(percent)` when step `i` of `iterations` lands on a whole percent.
fn whole_percent(i: usize, iterations: usize) -> Option<usize> {
    let scaled = i as u128 * 100;
    let total = iterations as u128;
    (total > 0 && scaled % total == 0).then(|| (scaled / total) as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::{dsigmoid, sigmoid};
    use crate::{Activation, Layer};

    fn half_half() -> NeuralNetwork {
        let layer = Layer::from_parts(
            Matrix::from_flat(1, 2, vec![0.5, 0.5]).unwrap(),
            Matrix::zeros(1, 1),
        )
        .unwrap();
        NeuralNetwork::from_layers(vec![layer], Activation::Sigmoid).unwrap()
    }

    fn quiet() -> Config {
        Config::default().with_logging(false)
    }

    #[test]
    fn whole_percent_boundaries() {
        let hits = |n: usize| (0..n).filter_map(|i| whole_percent(i, n)).collect::<Vec<_>>();
        assert_eq!(hits(200).len(), 100);
        assert_eq!(hits(200)[1], 1);
        assert_eq!(hits(3), vec![0]);
        assert_eq!(hits(50).len(), 50);
        assert_eq!(hits(50)[1], 2);
        assert!(hits(0).is_empty());

        let huge = usize::MAX - 1;
        assert_eq!(whole_percent(huge / 2, huge), Some(50));
        assert_eq!(whole_percent(huge - 1, huge), None);
    }

    #[test]
    fn train_one_single_step_is_exact() {
        let mut net = half_half();
        let data = Data::new(Matrix::vector(&[1.0, 1.0]), Matrix::vector(&[1.0]));

        let loss = net.train_one(&data, 0.1).unwrap();

        let y = sigmoid(1.0);
        let g = dsigmoid(y) * (1.0 - y) * 0.1;
        assert_eq!(loss.as_slice(), &[1.0 - y]);
        let layer = net.layer(0).unwrap();
        assert_eq!(layer.weights().as_slice(), &[0.5 + g, 0.5 + g]);
        assert_eq!(layer.bias().as_slice(), &[g]);
    }

    #[test]
    fn train_one_does_not_mutate_example() {
        let mut net = NeuralNetwork::new_with_seed(&[4, 3, 4], &quiet(), 0).unwrap();
        let grid = Matrix::from_flat(2, 2, vec![0.0, 1.0, 1.0, 0.0]).unwrap();
        let data = Data::new(grid.clone(), grid.clone());
        assert!(net.train_one(&data, 0.1).is_some());
        assert_eq!(data.input(), &grid);
        assert_eq!(data.target().unwrap(), &grid);
    }

    #[test]
    fn train_one_without_target_fails_softly() {
        let mut net = half_half();
        let before = net.clone();
        assert!(net.train_one(&Data::unlabeled(Matrix::vector(&[1.0, 1.0])), 0.1).is_none());
        assert_eq!(net, before);
    }

    #[test]
    fn train_skips_failed_steps() {
        let mut net = half_half();
        let mut ds = DataSet::new();
        ds.push(Data::new(Matrix::vector(&[1.0, 1.0, 1.0]), Matrix::vector(&[1.0])));

        let report = net.train_with_seed(&ds, &quiet().with_iterations(5), 0).unwrap();
        assert_eq!(report.failed_steps, 5);
        assert_eq!(report.last_loss, None);
        assert_eq!(net, half_half());
    }

    #[test]
    fn train_rejects_empty_dataset_and_bad_config() {
        let mut net = half_half();
        assert!(net.train_with_seed(&DataSet::new(), &quiet(), 0).is_err());

        let mut ds = DataSet::new();
        ds.push(Data::new(Matrix::vector(&[1.0, 1.0]), Matrix::vector(&[1.0])));
        assert!(net.train_with_seed(&ds, &quiet().with_learning_rate(f64::NAN), 0).is_err());

        let report = net.train_with_seed(&ds, &quiet().with_iterations(0), 0).unwrap();
        assert_eq!(report.iterations, 0);
        assert_eq!(net, half_half());
    }

    #[test]
    fn training_reduces_loss_on_a_fixed_example() {
        let mut net = NeuralNetwork::new_with_seed(&[2, 3, 1], &quiet(), 4).unwrap();
        let data = Data::new(Matrix::vector(&[0.2, 0.9]), Matrix::vector(&[0.9]));
        let mut ds = DataSet::new();
        ds.push(data.clone());

        let error_of = |net: &NeuralNetwork| {
            let output = net.try_predict(&data).unwrap();
            loss::squared_error(&loss::residual(data.target().unwrap(), &output).unwrap())
        };

        let before = error_of(&net);
        net.train_with_seed(&ds, &quiet().with_iterations(500).with_learning_rate(0.5), 1)
            .unwrap();
        let after = error_of(&net);
        assert!(after < before, "before={before} after={after}");
    }

    #[test]
    fn test_counts_argmax_matches() {
        let net = NeuralNetwork::from_layers(
            vec![
                Layer::from_parts(
                    Matrix::from_flat(2, 2, vec![4.0, 0.0, 0.0, 4.0]).unwrap(),
                    Matrix::zeros(2, 1),
                )
                .unwrap(),
            ],
            Activation::Sigmoid,
        )
        .unwrap();

        let mut ds = DataSet::new();
        ds.push(Data::new(Matrix::vector(&[1.0, 0.0]), Matrix::vector(&[1.0, 0.0])));
        ds.push(Data::new(Matrix::vector(&[0.0, 1.0]), Matrix::vector(&[0.0, 1.0])));
        ds.push(Data::new(Matrix::vector(&[0.0, 1.0]), Matrix::vector(&[1.0, 0.0])));
        // No target: counted as a miss.
        ds.push(Data::unlabeled(Matrix::vector(&[1.0, 0.0])));

        assert_eq!(net.test(&ds).unwrap(), 50.0);
        assert!(net.test(&DataSet::new()).is_err());
    }
}
