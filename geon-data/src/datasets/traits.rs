use geon_core::{Array, GeonError};

/// Represents a dataset that can be accessed by index.
pub trait Dataset {
    /// The type of a single item returned by the dataset.
    type Item: Send + 'static;

    /// Returns the item at the given index.
    ///
    /// # Errors
    ///
    /// Returns `GeonError::IndexOutOfBounds` if `index` is past the end.
    fn get(&self, index: usize) -> Result<Self::Item, GeonError>;

    /// Returns the total number of items in the dataset.
    fn len(&self) -> usize;

    /// Checks if the dataset is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One labelled sample: features shaped like the dataset's sample shape and
/// a class index.
#[derive(Debug, Clone, PartialEq)]
pub struct Example {
    pub features: Array,
    pub label: usize,
}

/// A dataset of labelled samples that all share one sample shape.
pub trait ClassificationDataset: Dataset<Item = Example> {
    fn sample_shape(&self) -> &[usize];

    fn num_classes(&self) -> usize;
}
