use feedforward_nn::{Activation, Dataset, GradientDescent, Layer, Loss, MlErr, Model, Trainer};
use ndarray::array;
use rand::{SeedableRng, rngs::StdRng};

fn linear_model(weight: f32) -> Model {
    let mut model = Model::new(1).unwrap();
    let layer = Layer::from_parts(array![[weight]], array![0.], Activation::None).unwrap();
    model.push_layer(layer).unwrap();
    model.set_loss(Loss::LeastSquares).unwrap();
    model
}

fn quadratic_model(rng: &mut StdRng) -> Model {
    let mut model = Model::new(1).unwrap();
    model.add_layer(10, Activation::Relu, rng).unwrap();
    model.add_layer(1, Activation::None, rng).unwrap();
    model.set_loss(Loss::LeastSquares).unwrap();
    model
}

#[test]
fn training_lowers_mean_loss_on_noisy_quadratic() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut model = quadratic_model(&mut rng);
    let dataset = Dataset::noisy_quadratic(100, 0.05, &mut rng).unwrap();

    let before = model.mean_objective(dataset.instances()).unwrap();
    let mut trainer = Trainer::new(GradientDescent::new(0.01), 10);
    trainer.train(&mut model, dataset.instances(), &mut rng).unwrap();
    let after = model.mean_objective(dataset.instances()).unwrap();

    assert!(after < before, "before = {before}, after = {after}");
}

#[test]
fn model_train_steps_by_half_the_least_squares_gradient() {
    let mut model = linear_model(0.5);
    let instances = vec![(array![1.], array![2.])];
    let grads = model.gradient(array![1.].view(), array![2.].view()).unwrap();
    let mut rng = StdRng::seed_from_u64(0);

    model.train(&instances, 1, &mut rng).unwrap();

    let layer = model.layer(0).unwrap();
    assert_eq!(layer.weights()[[0, 0]], 0.5 - 0.5 * grads[0].weights[[0, 0]]);
    assert_eq!(layer.bias()[0], -0.5 * grads[0].bias[0]);
    assert_eq!(layer.weights()[[0, 0]], 2.);
}

#[test]
fn model_train_stays_bounded_on_noisy_quadratic() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut model = quadratic_model(&mut rng);
    let dataset = Dataset::noisy_quadratic(100, 0.05, &mut rng).unwrap();

    model.train(dataset.instances(), 10, &mut rng).unwrap();
    let after = model.mean_objective(dataset.instances()).unwrap();

    assert!(after.is_finite() && after < 1., "after = {after}");
}

#[test]
fn unit_rate_trainer_subtracts_the_raw_gradient() {
    let mut model = linear_model(0.5);
    let instances = vec![(array![1.], array![2.])];
    let mut rng = StdRng::seed_from_u64(0);

    let mut trainer = Trainer::new(GradientDescent::default(), 1);
    trainer.train(&mut model, &instances, &mut rng).unwrap();

    // gradient = 2 * (0.5 - 2) = -3
    let layer = model.layer(0).unwrap();
    assert_eq!(layer.weights()[[0, 0]], 3.5);
    assert_eq!(layer.bias()[0], 3.);
}

#[test]
fn scaled_rate_subtracts_a_scaled_gradient() {
    let mut model = linear_model(0.5);
    let instances = vec![(array![1.], array![2.])];
    let mut rng = StdRng::seed_from_u64(0);

    let mut trainer = Trainer::new(GradientDescent::new(0.25), 1);
    trainer.train(&mut model, &instances, &mut rng).unwrap();

    let layer = model.layer(0).unwrap();
    assert_eq!(layer.weights()[[0, 0]], 1.25);
    assert_eq!(layer.bias()[0], 0.75);
}

#[test]
fn log_loss_saturated_outputs_keep_losses_finite() {
    let mut model = Model::new(1).unwrap();
    let layer = Layer::from_parts(array![[20.]], array![0.], Activation::Sigmoid).unwrap();
    model.push_layer(layer).unwrap();
    model.set_loss(Loss::LogLoss).unwrap();

    let instances = vec![(array![1.], array![1.]), (array![-1.], array![0.])];
    assert_eq!(model.score(array![1.].view(), array![1.].view()).unwrap(), 0.);
    assert!(model.mean_objective(&instances).unwrap().is_finite());

    let mut rng = StdRng::seed_from_u64(0);
    let mut trainer = Trainer::new(GradientDescent::new(0.5), 3);
    let losses = trainer.train(&mut model, &instances, &mut rng).unwrap();
    assert!(losses.iter().all(|loss| loss.is_finite()), "losses = {losses:?}");
}

#[test]
fn same_seed_gives_identical_runs() {
    let run = || {
        let mut rng = StdRng::seed_from_u64(1234);
        let mut model = quadratic_model(&mut rng);
        let dataset = Dataset::noisy_quadratic(20, 0.1, &mut rng).unwrap();
        let mut trainer = Trainer::new(GradientDescent::new(0.01), 2);
        let losses = trainer.train(&mut model, dataset.instances(), &mut rng).unwrap();
        (model, losses)
    };

    assert_eq!(run(), run());
}

#[test]
fn wrong_lengths_are_rejected() {
    let mut model = linear_model(1.);

    assert!(matches!(
        model.evaluate(array![1., 2.].view()),
        Err(MlErr::DimensionMismatch { what: "input", got: 2, expected: 1 })
    ));

    let before = model.clone();
    let instances = vec![(array![1.], array![1.]), (array![1.], array![1., 0.])];
    let mut rng = StdRng::seed_from_u64(0);
    assert!(matches!(
        model.train(&instances, 2, &mut rng),
        Err(MlErr::DimensionMismatch { what: "targets", .. })
    ));
    assert_eq!(model, before);
}

#[test]
fn training_without_loss_fails() {
    let mut model = Model::new(1).unwrap();
    let mut rng = StdRng::seed_from_u64(0);
    model.add_layer(1, Activation::None, &mut rng).unwrap();

    let instances = vec![(array![1.], array![1.])];
    assert!(matches!(
        model.train(&instances, 1, &mut rng),
        Err(MlErr::InvalidArgument(_))
    ));
}

#[test]
fn log_loss_training_separates_two_points() {
    let mut model = Model::new(1).unwrap();
    let layer = Layer::from_parts(array![[0.]], array![0.], Activation::Sigmoid).unwrap();
    model.push_layer(layer).unwrap();
    model.set_loss(Loss::LogLoss).unwrap();

    let instances = vec![(array![-1.], array![0.]), (array![1.], array![1.])];
    let before = model.mean_objective(&instances).unwrap();

    let mut rng = StdRng::seed_from_u64(3);
    let mut trainer = Trainer::new(GradientDescent::new(0.5), 20);
    trainer.train(&mut model, &instances, &mut rng).unwrap();

    assert!(model.mean_objective(&instances).unwrap() < before);
    assert!(model.layer(0).unwrap().weights()[[0, 0]] > 0.);
}
