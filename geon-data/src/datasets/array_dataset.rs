use super::traits::{ClassificationDataset, Dataset, Example};
use geon_core::{Array, GeonError};

/// An in-memory classification dataset.
///
/// Features are stored as one row-major block whose leading dimension is the
/// sample index; every sample has the same shape.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayDataset {
    sample_shape: Vec<usize>,
    sample_len: usize,
    features: Vec<f64>,
    labels: Vec<usize>,
    num_classes: usize,
}

impl ArrayDataset {
    /// Creates a dataset from a `[count, sample...]` feature array and one
    /// label per sample.
    ///
    /// # Errors
    ///
    /// * `GeonError::InvalidConfig` if `features` has no sample dimension or
    ///   its leading length differs from the number of labels.
    /// * `GeonError::InvalidLabel` if a label is not below `num_classes`.
    pub fn new(features: Array, labels: Vec<usize>, num_classes: usize) -> Result<Self, GeonError> {
        let (count, sample_shape) = match features.shape().split_first() {
            Some((count, rest)) => (*count, rest.to_vec()),
            None => {
                return Err(GeonError::InvalidConfig(
                    "dataset features need a leading sample dimension".to_string(),
                ))
            }
        };
        if count != labels.len() {
            return Err(GeonError::InvalidConfig(format!(
                "{} feature rows but {} labels",
                count,
                labels.len()
            )));
        }
        if let Some(&label) = labels.iter().find(|&&label| label >= num_classes) {
            return Err(GeonError::InvalidLabel { label, num_classes });
        }
        let sample_len = sample_shape.iter().product();
        Ok(ArrayDataset {
            sample_shape,
            sample_len,
            features: features.into_data(),
            labels,
            num_classes,
        })
    }

    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    /// Splits into the first `at` samples and the rest.
    pub fn split_at(self, at: usize) -> Result<(ArrayDataset, ArrayDataset), GeonError> {
        if at > self.labels.len() {
            return Err(GeonError::IndexOutOfBounds {
                index: at,
                len: self.labels.len(),
            });
        }
        let ArrayDataset {
            sample_shape,
            sample_len,
            mut features,
            mut labels,
            num_classes,
        } = self;
        let tail_features = features.split_off(at * sample_len);
        let tail_labels = labels.split_off(at);
        let head = ArrayDataset {
            sample_shape: sample_shape.clone(),
            sample_len,
            features,
            labels,
            num_classes,
        };
        let tail = ArrayDataset {
            sample_shape,
            sample_len,
            features: tail_features,
            labels: tail_labels,
            num_classes,
        };
        Ok((head, tail))
    }
}

impl Dataset for ArrayDataset {
    type Item = Example;

    fn get(&self, index: usize) -> Result<Example, GeonError> {
        let label = *self.labels.get(index).ok_or(GeonError::IndexOutOfBounds {
            index,
            len: self.labels.len(),
        })?;
        let start = index * self.sample_len;
        let features = Array::new(
            self.features[start..start + self.sample_len].to_vec(),
            self.sample_shape.clone(),
        )?;
        Ok(Example { features, label })
    }

    fn len(&self) -> usize {
        self.labels.len()
    }
}

impl ClassificationDataset for ArrayDataset {
    fn sample_shape(&self) -> &[usize] {
        &self.sample_shape
    }

    fn num_classes(&self) -> usize {
        self.num_classes
    }
}

#[cfg(test)]
#[path = "array_dataset_test.rs"]
mod tests;
