//! Data loading for geon training runs.
//!
//! Datasets hand out labelled samples, samplers decide the visiting order,
//! and [`DataLoader`] collates minibatches for the training driver through
//! [`geon_core::DataSource`].

pub mod dataloader;
pub mod datasets;
pub mod samplers;

pub use dataloader::{DataLoader, LoaderConfig};
pub use datasets::{gaussian_blobs, ArrayDataset, BlobConfig, ClassificationDataset, Dataset, Example};
pub use samplers::{RandomSampler, Sampler, SequentialSampler};
