//! Seeded synthetic classification data.

use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_distr::Normal;

use super::array_dataset::ArrayDataset;
use geon_core::{Array, GeonError};

/// Parameters of [`gaussian_blobs`].
#[derive(Debug, Clone, PartialEq)]
pub struct BlobConfig {
    pub samples_per_class: usize,
    pub sample_shape: Vec<usize>,
    pub num_classes: usize,
    /// Standard deviation of each blob around its center.
    pub spread: f64,
    pub seed: u64,
}

impl Default for BlobConfig {
    fn default() -> Self {
        BlobConfig {
            samples_per_class: 100,
            sample_shape: vec![3, 4, 4],
            num_classes: 4,
            spread: 0.5,
            seed: 0,
        }
    }
}

/// One gaussian blob per class, centers drawn from `[-1, 1)` per feature.
///
/// Samples come out shuffled so that any prefix mixes every class. The same
/// config always produces the same dataset.
pub fn gaussian_blobs(config: &BlobConfig) -> Result<ArrayDataset, GeonError> {
    if config.num_classes == 0 || config.samples_per_class == 0 {
        return Err(GeonError::InvalidConfig(
            "gaussian blobs need at least one class and one sample per class".to_string(),
        ));
    }
    let noise = Normal::new(0.0, config.spread)
        .map_err(|e| GeonError::InvalidConfig(format!("Invalid blob spread: {}", e)))?;
    let mut rng = StdRng::seed_from_u64(config.seed);
    let sample_len: usize = config.sample_shape.iter().product();

    let center_dist = Uniform::new(-1.0, 1.0);
    let centers: Vec<Vec<f64>> = (0..config.num_classes)
        .map(|_| (0..sample_len).map(|_| center_dist.sample(&mut rng)).collect())
        .collect();

    let mut labels: Vec<usize> = (0..config.num_classes)
        .flat_map(|class| std::iter::repeat(class).take(config.samples_per_class))
        .collect();
    labels.shuffle(&mut rng);

    let mut features = Vec::with_capacity(labels.len() * sample_len);
    for &label in &labels {
        features.extend(centers[label].iter().map(|c| c + noise.sample(&mut rng)));
    }

    let mut shape = Vec::with_capacity(config.sample_shape.len() + 1);
    shape.push(labels.len());
    shape.extend_from_slice(&config.sample_shape);
    log::debug!(
        "Generated {} samples of shape {:?} in {} classes",
        labels.len(),
        config.sample_shape,
        config.num_classes
    );
    ArrayDataset::new(Array::new(features, shape)?, labels, config.num_classes)
}

#[cfg(test)]
#[path = "synthetic_test.rs"]
mod tests;
