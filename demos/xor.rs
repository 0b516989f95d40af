use neural::{Activation, Config, Data, DataSet, Matrix, NetworkBuilder};

fn main() -> neural::Result<()> {
    tracing_subscriber::fmt().with_target(false).init();

    // Classic XOR dataset with one-hot targets, so `test` can score it.
    let mut train = DataSet::new();
    train.add_label("off");
    train.add_label("on");
    for (x, class) in [([0.0, 0.0], 0), ([0.0, 1.0], 1), ([1.0, 0.0], 1), ([1.0, 1.0], 0)] {
        let label = train.labels()[class].clone();
        train.push(Data::new(Matrix::vector(&x), Data::one_hot(2, class)?).with_label(label));
    }

    let config = Config::default()
        .with_learning_rate(0.3)
        .with_iterations(20_000)
        .with_activation(Activation::Sigmoid);

    // 2 -> 6 -> 2 network.
    let mut net = NetworkBuilder::new(2)?
        .layer(6)?
        .layer(2)?
        .activation(config.activation)
        .build_with_seed(7)?;
    println!("{net}");

    let report = net.train_with_seed(&train, &config, 7)?;
    let accuracy = net.test(&train)?;
    println!(
        "iterations={} last_loss={:?} accuracy={accuracy}%",
        report.iterations, report.last_loss
    );

    for data in &train {
        let out = net.try_predict(data)?;
        println!("x={:?} y={:?}", data.input().as_slice(), out.as_slice());
    }

    let path = std::env::temp_dir().join("neural-xor.txt");
    net.save(&path)?;
    let restored = neural::NeuralNetwork::load(&path)?;
    println!("restored from {} equal={}", path.display(), restored == net);

    Ok(())
}
