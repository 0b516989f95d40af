use neural::activation::{dsigmoid, sigmoid};
use neural::{Activation, Config, Data, DataSet, Error, Layer, Matrix, NeuralNetwork};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

fn assert_close(actual: f64, expected: f64, abs_tol: f64) {
    let diff = (actual - expected).abs();
    assert!(diff <= abs_tol, "actual={actual} expected={expected} diff={diff}");
}

fn single_unit() -> NeuralNetwork {
    let layer = Layer::from_parts(
        Matrix::from_flat(1, 2, vec![0.5, 0.5]).unwrap(),
        Matrix::zeros(1, 1),
    )
    .unwrap();
    NeuralNetwork::from_layers(vec![layer], Activation::Sigmoid).unwrap()
}

#[test]
fn matmul_of_two_by_three_and_ones() {
    let a = Matrix::from_rows(&[vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap();
    let b = Matrix::vector(&[1.0, 1.0, 1.0]);
    assert_eq!(Matrix::matmul(&a, &b).unwrap(), Matrix::vector(&[6.0, 15.0]));
}

#[test]
fn single_unit_forward_is_sigmoid_of_one() {
    let net = single_unit();
    let out = net.predict(&Data::unlabeled(Matrix::vector(&[1.0, 1.0]))).unwrap();
    assert_close(out[(0, 0)], 0.731_058_578_6, 1e-10);
    assert_eq!(out[(0, 0)], sigmoid(1.0));
}

#[test]
fn single_unit_one_training_step() {
    let mut net = single_unit();
    let data = Data::new(Matrix::vector(&[1.0, 1.0]), Matrix::vector(&[1.0]));
    net.try_train_one(&data, 0.1).unwrap();

    let y = sigmoid(1.0);
    let g = dsigmoid(y) * (1.0 - y) * 0.1;
    let layer = net.layer(0).unwrap();
    assert_eq!(layer.weights().as_slice(), &[0.5 + g, 0.5 + g]);
    assert_eq!(layer.bias().as_slice(), &[g]);
    assert_close(layer.weights()[(0, 0)], 0.505_287_709_3, 1e-9);
}

#[test]
fn hidden_layer_receives_loss_through_updated_weights() {
    let l0 = Layer::from_parts(
        Matrix::from_flat(2, 1, vec![0.3, -0.4]).unwrap(),
        Matrix::vector(&[0.1, 0.2]),
    )
    .unwrap();
    let l1 = Layer::from_parts(
        Matrix::from_flat(1, 2, vec![0.7, -0.6]).unwrap(),
        Matrix::vector(&[0.05]),
    )
    .unwrap();
    let mut net =
        NeuralNetwork::from_layers(vec![l0.clone(), l1.clone()], Activation::Sigmoid).unwrap();

    let x = Matrix::vector(&[1.0]);
    let t = Matrix::vector(&[1.0]);
    net.try_train_one(&Data::new(x.clone(), t.clone()), 0.2).unwrap();

    // Replay the step layer by layer.
    let (mut r0, mut r1) = (l0, l1);
    let h = r0.feed_forward(&x, Activation::Sigmoid).unwrap();
    let y = r1.feed_forward(&h, Activation::Sigmoid).unwrap();
    let loss = Matrix::subtract(&t, &y).unwrap();
    let hidden_loss = r1.back_propagate(&h, &y, &loss, Activation::Sigmoid, 0.2).unwrap();
    r0.back_propagate(&x, &h, &hidden_loss, Activation::Sigmoid, 0.2).unwrap();

    assert_eq!(net.layer(1).unwrap(), &r1);
    assert_eq!(net.layer(0).unwrap(), &r0);

    // The propagated loss uses the post-update output weights.
    let expected = Matrix::matmul(&r1.weights().transpose(), &loss).unwrap();
    assert_eq!(hidden_loss, expected);
}

#[test]
fn save_then_load_reproduces_network_and_predictions() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("network.txt");

    let config = Config::default().with_activation(Activation::Tanh);
    let net = NeuralNetwork::new_with_seed(&[4, 6, 3], &config, 21).unwrap();
    net.save(&path).unwrap();
    let loaded = NeuralNetwork::load(&path).unwrap();

    assert_eq!(loaded, net);
    let sample = Data::unlabeled(Matrix::vector(&[0.1, -0.4, 0.9, 0.0]));
    assert_eq!(loaded.predict(&sample), net.predict(&sample));
}

#[test]
fn load_and_save_report_io_failures() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.txt");
    assert!(matches!(NeuralNetwork::load(&missing), Err(Error::Io { .. })));

    let net = single_unit();
    let bad = dir.path().join("no-such-dir").join("net.txt");
    assert!(matches!(net.save(&bad), Err(Error::Io { .. })));
}

#[test]
fn training_learns_a_separable_problem() {
    init_tracing();
    let mut train = DataSet::new();
    train.add_label("low");
    train.add_label("high");
    for i in 0..20 {
        let x = i as f64 / 20.0;
        let class = usize::from(x >= 0.5);
        let label = train.labels()[class].clone();
        let target = Data::one_hot(2, class).unwrap();
        train.push(Data::new(Matrix::vector(&[x, 1.0 - x]), target).with_label(label));
    }

    let config = Config::default()
        .with_learning_rate(0.5)
        .with_iterations(4_000)
        .with_logging(true);
    let mut net = NeuralNetwork::new_with_seed(&[2, 4, 2], &config, 3).unwrap();
    let report = net.train_with_seed(&train, &config, 3).unwrap();
    assert_eq!(report.failed_steps, 0);
    assert!(report.last_loss.is_some());

    let accuracy = net.test(&train).unwrap();
    assert!(accuracy >= 90.0, "accuracy={accuracy}");
}

#[test]
fn training_continues_past_malformed_examples() {
    let mut ds = DataSet::new();
    ds.push(Data::new(Matrix::vector(&[1.0, 1.0]), Matrix::vector(&[1.0])));
    ds.push(Data::new(Matrix::vector(&[1.0, 1.0, 1.0]), Matrix::vector(&[1.0])));

    let mut net = single_unit();
    let config = Config::default().with_iterations(200).with_logging(false);
    let report = net.train_with_seed(&ds, &config, 0).unwrap();

    assert!(report.failed_steps > 0 && report.failed_steps < 200);
    assert_ne!(&net, &single_unit());
}
