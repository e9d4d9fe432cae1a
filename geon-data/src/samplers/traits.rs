use std::fmt::Debug;

/// Defines the order in which a `DataLoader` visits dataset indices.
pub trait Sampler: Debug + Send + Sync {
    /// Returns the indices to visit during pass number `epoch`.
    ///
    /// The same `(dataset_len, epoch)` always yields the same sequence, so a
    /// loader that rewinds reproduces its passes.
    fn iter(&self, dataset_len: usize, epoch: usize) -> Box<dyn Iterator<Item = usize> + Send + Sync>;

    /// Returns the number of indices a pass will yield.
    fn len(&self, dataset_len: usize) -> usize;
}
