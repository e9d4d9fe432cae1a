pub mod array_dataset;
pub mod synthetic;
pub mod traits;

pub use array_dataset::ArrayDataset;
pub use synthetic::{gaussian_blobs, BlobConfig};
pub use traits::{ClassificationDataset, Dataset, Example};
