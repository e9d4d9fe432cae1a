//! # DataLoader
//!
//! Turns a [`ClassificationDataset`] into the minibatch stream the training
//! driver consumes. Each batch is a pair of arrays laid out for a classifier
//! graph: features with axes `(sample..., N)` and one-hot labels with axes
//! `(Y, N)`, where `N` is the batch axis and `Y` the class axis.
//!
//! ```rust
//! use geon_core::DataSource;
//! use geon_data::dataloader::{DataLoader, LoaderConfig};
//! use geon_data::datasets::{gaussian_blobs, BlobConfig};
//!
//! let dataset = gaussian_blobs(&BlobConfig::default()).unwrap();
//! let config = LoaderConfig { batch_size: 10, ..LoaderConfig::default() };
//! let mut loader = DataLoader::new(dataset, &config).unwrap();
//! while let Some(batch) = loader.next_batch() {
//!     let (features, labels) = batch.unwrap();
//!     assert_eq!(features.shape(), &[3, 4, 4, 10]);
//!     assert_eq!(labels.shape(), &[4, 10]);
//! }
//! loader.reset();
//! ```

use log::{debug, warn};

use crate::datasets::{ClassificationDataset, Example};
use crate::samplers::{RandomSampler, Sampler, SequentialSampler};
use geon_core::{Array, DataSource, GeonError};

/// Loader settings supplied by the command-line collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct LoaderConfig {
    pub batch_size: usize,
    /// Percentage of the dataset (taken from its start) that is used at all.
    pub subset_pct: f64,
    /// Visit samples in a seeded random order that changes every pass.
    pub shuffle: bool,
    pub seed: u64,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        LoaderConfig {
            batch_size: 32,
            subset_pct: 100.0,
            shuffle: true,
            seed: 0,
        }
    }
}

/// Minibatch loader over a classification dataset.
///
/// Incomplete trailing batches are always dropped, since the batch axis has
/// a single bound length for a whole run.
pub struct DataLoader<D: ClassificationDataset> {
    dataset: D,
    batch_size: usize,
    active_len: usize,
    sampler: Box<dyn Sampler>,
    epoch: usize,
    indices: Box<dyn Iterator<Item = usize> + Send + Sync>,
}

impl<D: ClassificationDataset> DataLoader<D> {
    /// Creates a loader with a sequential or seeded random sampler depending
    /// on `config.shuffle`.
    pub fn new(dataset: D, config: &LoaderConfig) -> Result<Self, GeonError> {
        let sampler: Box<dyn Sampler> = if config.shuffle {
            Box::new(RandomSampler::new(config.seed))
        } else {
            Box::new(SequentialSampler::new())
        };
        Self::with_sampler(dataset, config.batch_size, config.subset_pct, sampler)
    }

    pub fn with_sampler(
        dataset: D,
        batch_size: usize,
        subset_pct: f64,
        sampler: Box<dyn Sampler>,
    ) -> Result<Self, GeonError> {
        if batch_size == 0 {
            return Err(GeonError::InvalidConfig("batch size must be positive".to_string()));
        }
        if !(subset_pct > 0.0 && subset_pct <= 100.0) {
            return Err(GeonError::InvalidConfig(format!(
                "subset percentage must be in (0, 100], got {}",
                subset_pct
            )));
        }
        let active_len = (dataset.len() as f64 * subset_pct / 100.0).floor() as usize;
        if sampler.len(active_len) < batch_size {
            warn!(
                "Loader over {} samples cannot fill a single batch of {}",
                active_len, batch_size
            );
        }
        debug!(
            "DataLoader: {} of {} samples, batch size {}",
            active_len,
            dataset.len(),
            batch_size
        );
        let indices = sampler.iter(active_len, 0);
        Ok(DataLoader {
            dataset,
            batch_size,
            active_len,
            sampler,
            epoch: 0,
            indices,
        })
    }

    pub fn dataset(&self) -> &D {
        &self.dataset
    }

    /// Number of complete batches in one pass.
    pub fn num_batches(&self) -> usize {
        self.sampler.len(self.active_len) / self.batch_size
    }

    fn fetch(&mut self) -> Option<Result<Vec<Example>, GeonError>> {
        let mut batch = Vec::with_capacity(self.batch_size);
        for _ in 0..self.batch_size {
            let idx = self.indices.next()?;
            match self.dataset.get(idx) {
                Ok(item) => batch.push(item),
                Err(e) => return Some(Err(e)),
            }
        }
        Some(Ok(batch))
    }
}

/// Stacks examples into `(sample..., N)` features and one-hot `(Y, N)` labels.
pub fn collate(
    examples: &[Example],
    sample_shape: &[usize],
    num_classes: usize,
) -> Result<(Array, Array), GeonError> {
    let n = examples.len();
    let sample_len: usize = sample_shape.iter().product();
    let mut features = vec![0.0; sample_len * n];
    let mut labels = vec![0.0; num_classes * n];
    for (j, example) in examples.iter().enumerate() {
        if example.features.shape() != sample_shape {
            return Err(GeonError::InvalidConfig(format!(
                "sample of shape {:?} in a batch of shape {:?}",
                example.features.shape(),
                sample_shape
            )));
        }
        if example.label >= num_classes {
            return Err(GeonError::InvalidLabel {
                label: example.label,
                num_classes,
            });
        }
        for (i, value) in example.features.data().iter().enumerate() {
            features[i * n + j] = *value;
        }
        labels[example.label * n + j] = 1.0;
    }

    let mut feature_shape = sample_shape.to_vec();
    feature_shape.push(n);
    Ok((
        Array::new(features, feature_shape)?,
        Array::new(labels, vec![num_classes, n])?,
    ))
}

impl<D: ClassificationDataset> DataSource for DataLoader<D> {
    fn batch_size(&self) -> usize {
        self.batch_size
    }

    fn sample_shape(&self) -> Vec<usize> {
        self.dataset.sample_shape().to_vec()
    }

    fn num_classes(&self) -> usize {
        self.dataset.num_classes()
    }

    fn reset(&mut self) {
        self.epoch += 1;
        self.indices = self.sampler.iter(self.active_len, self.epoch);
    }

    fn next_batch(&mut self) -> Option<Result<(Array, Array), GeonError>> {
        let batch = match self.fetch()? {
            Ok(batch) => batch,
            Err(e) => return Some(Err(e)),
        };
        Some(collate(
            &batch,
            self.dataset.sample_shape(),
            self.dataset.num_classes(),
        ))
    }
}

impl<D: ClassificationDataset> Iterator for DataLoader<D> {
    type Item = Result<(Array, Array), GeonError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_batch()
    }
}

#[cfg(test)]
#[path = "dataloader_test.rs"]
mod tests;
