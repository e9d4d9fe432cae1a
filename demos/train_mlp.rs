//! # Training an MLP classifier on synthetic blobs
//!
//! Builds a [`ClassifierGraph`], feeds it minibatches from a seeded
//! gaussian-blob dataset and trains it with the inverse-epoch learning-rate
//! schedule, validating after every epoch.
//!
//! ## Running
//! `cargo run --example train_mlp -- [epochs] [subset_pct]`
//!
//! Set `RUST_LOG=info` to follow per-epoch progress.

use geon_core::nn::{ClassifierGraph, ClassifierSpec};
use geon_core::train::train;
use geon_core::{GeonError, TrainConfig};
use geon_data::{gaussian_blobs, BlobConfig, DataLoader, LoaderConfig};

fn arg<T: std::str::FromStr>(position: usize, default: T) -> Result<T, GeonError> {
    match std::env::args().nth(position) {
        Some(raw) => raw
            .parse()
            .map_err(|_| GeonError::InvalidConfig(format!("cannot parse argument '{}'", raw))),
        None => Ok(default),
    }
}

fn main() -> Result<(), GeonError> {
    env_logger::init();
    let epochs: usize = arg(1, 10)?;
    let subset_pct: f64 = arg(2, 100.0)?;

    let blobs = BlobConfig {
        samples_per_class: 250,
        sample_shape: vec![3, 4, 4],
        num_classes: 4,
        spread: 0.6,
        seed: 7,
    };
    let (train_set, valid_set) = gaussian_blobs(&blobs)?.split_at(800)?;
    println!(
        "Synthetic data: {} training and {} validation samples",
        train_set.labels().len(),
        valid_set.labels().len()
    );

    let batch_size = 20;
    let mut training = DataLoader::new(
        train_set,
        &LoaderConfig {
            batch_size,
            subset_pct,
            shuffle: true,
            seed: 1,
        },
    )?;
    let mut validation = DataLoader::new(
        valid_set,
        &LoaderConfig {
            batch_size,
            subset_pct: 100.0,
            shuffle: false,
            seed: 0,
        },
    )?;

    let mut model = ClassifierGraph::new(blobs.sample_shape.len(), &ClassifierSpec::default())?;
    let config = TrainConfig {
        epochs,
        learning_rate: 0.5,
        seed: 42,
    };
    let (report, env) = train(&mut model, &mut training, &mut validation, &config)?;

    for epoch in &report.epochs {
        println!(
            "epoch {:>3}  lr {:.5}  training error {:.4}  validation error {:.4}",
            epoch.epoch, epoch.learning_rate, epoch.training_error, epoch.validation_error
        );
    }
    println!("Trained parameters: {:?}", env.parameter_names());
    Ok(())
}
