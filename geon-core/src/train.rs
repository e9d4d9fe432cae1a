//! Minibatch training of a [`ClassifierGraph`].
//!
//! Training builds one evaluator computing predictions, the error, the
//! gradients and the gradient-descent updates in a single round per batch.
//! After every epoch the same environment is evaluated on validation data.

use log::{info, warn};

use crate::array::Array;
use crate::env::Environment;
use crate::error::GeonError;
use crate::eval::{Bindings, Evaluator, Interpreter};
use crate::nn::classifier::ClassifierGraph;
use crate::optim::{sgd_updates, InverseEpochDecay, LearningRateSchedule};

/// A stream of `(features, one-hot labels)` batches.
///
/// Features are laid out as `(sample axes..., N)` and labels as `(Y, N)`,
/// where `N` is the batch size.
pub trait DataSource {
    fn batch_size(&self) -> usize;

    fn sample_shape(&self) -> Vec<usize>;

    fn num_classes(&self) -> usize;

    /// Rewinds to the start of the data for the next pass.
    fn reset(&mut self);

    /// The next batch, or `None` once the pass is exhausted.
    fn next_batch(&mut self) -> Option<Result<(Array, Array), GeonError>>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrainConfig {
    pub epochs: usize,
    /// Base learning rate of the default schedule.
    pub learning_rate: f64,
    /// Seed of the parameter initializers.
    pub seed: u64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        TrainConfig {
            epochs: 10,
            learning_rate: 0.1,
            seed: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EpochReport {
    pub epoch: usize,
    pub learning_rate: f64,
    /// Mean per-sample training error over the epoch's batches.
    pub training_error: f64,
    /// Mean per-sample error on the validation data after the epoch.
    pub validation_error: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainingReport {
    pub epochs: Vec<EpochReport>,
}

impl TrainingReport {
    pub fn last(&self) -> Option<&EpochReport> {
        self.epochs.last()
    }
}

fn bind_source(model: &mut ClassifierGraph, source: &dyn DataSource) -> Result<(), GeonError> {
    model.bind_lengths(source.batch_size(), &source.sample_shape(), source.num_classes())
}

/// Mean per-sample error of `evaluator` over one pass of `source`.
fn error_pass(
    model: &ClassifierGraph,
    evaluator: &mut dyn Evaluator,
    env: &mut Environment,
    bindings: &mut Bindings,
    source: &mut dyn DataSource,
) -> Result<f64, GeonError> {
    let batch_size = source.batch_size() as f64;
    let mut total = 0.0;
    let mut batches = 0usize;
    while let Some(batch) = source.next_batch() {
        let (features, labels) = batch?;
        bindings.bind(model.x, features).bind(model.y, labels);
        let values = evaluator.evaluate(env, bindings)?;
        total += values.scalar(model.error)? / batch_size;
        batches += 1;
    }
    source.reset();
    if batches == 0 {
        warn!("Data source yielded no complete batch");
        return Ok(0.0);
    }
    Ok(total / batches as f64)
}

/// Mean per-sample error of the model on `source` under the parameters in `env`.
pub fn validate(
    model: &mut ClassifierGraph,
    env: &mut Environment,
    source: &mut dyn DataSource,
) -> Result<f64, GeonError> {
    bind_source(model, source)?;
    let model: &ClassifierGraph = model;
    let mut evaluator = Interpreter::new(&model.graph, &[model.value, model.error])?;
    let mut bindings = Bindings::new();
    error_pass(model, &mut evaluator, env, &mut bindings, source)
}

/// Trains with `base / (1 + epoch) / batch_size` as the learning rate.
pub fn train(
    model: &mut ClassifierGraph,
    training: &mut dyn DataSource,
    validation: &mut dyn DataSource,
    config: &TrainConfig,
) -> Result<(TrainingReport, Environment), GeonError> {
    let schedule = InverseEpochDecay::new(config.learning_rate, training.batch_size());
    train_with_schedule(model, training, validation, config, &schedule)
}

pub fn train_with_schedule(
    model: &mut ClassifierGraph,
    training: &mut dyn DataSource,
    validation: &mut dyn DataSource,
    config: &TrainConfig,
    schedule: &dyn LearningRateSchedule,
) -> Result<(TrainingReport, Environment), GeonError> {
    bind_source(model, training)?;
    bind_source(model, validation)?;

    let learning_rate = model.graph.input("learning_rate", &[])?;
    let params = model.parameters()?;
    let (updates, derivs) = sgd_updates(&mut model.graph, model.loss, &params, learning_rate)?;

    let model: &ClassifierGraph = model;
    let mut results = vec![model.value, model.error, updates];
    results.extend(derivs);
    let mut trainer = Interpreter::new(&model.graph, &results)?;
    let mut validator = Interpreter::new(&model.graph, &[model.value, model.error])?;

    let mut env = Environment::new("training", config.seed);
    let mut bindings = Bindings::new();
    let mut report = TrainingReport::default();

    for epoch in 0..config.epochs {
        let rate = schedule.learning_rate(epoch);
        info!("Epoch {} (learning rate {})", epoch, rate);
        bindings.bind(learning_rate, Array::scalar(rate));

        let training_error = error_pass(model, &mut trainer, &mut env, &mut bindings, training)?;
        info!("Training error: {}", training_error);

        let validation_error = error_pass(model, &mut validator, &mut env, &mut bindings, validation)?;
        info!("Validation error: {}", validation_error);

        report.epochs.push(EpochReport {
            epoch,
            learning_rate: rate,
            training_error,
            validation_error,
        });
    }
    Ok((report, env))
}
