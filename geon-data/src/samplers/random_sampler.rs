use super::traits::Sampler;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Randomly permutes (or draws with replacement) the dataset indices.
///
/// Each epoch gets its own generator seeded from `seed` and the epoch number,
/// so passes differ from one another but are reproducible.
#[derive(Debug, Clone)]
pub struct RandomSampler {
    seed: u64,
    replacement: bool,
    num_samples: Option<usize>,
}

impl RandomSampler {
    /// Creates a sampler drawing a permutation of the whole dataset.
    pub fn new(seed: u64) -> Self {
        RandomSampler {
            seed,
            replacement: false,
            num_samples: None,
        }
    }

    /// Draws `num_samples` indices with replacement instead of permuting.
    pub fn with_replacement(seed: u64, num_samples: usize) -> Self {
        RandomSampler {
            seed,
            replacement: true,
            num_samples: Some(num_samples),
        }
    }

    fn rng(&self, epoch: usize) -> StdRng {
        StdRng::seed_from_u64(self.seed ^ (epoch as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15))
    }
}

impl Sampler for RandomSampler {
    fn iter(&self, dataset_len: usize, epoch: usize) -> Box<dyn Iterator<Item = usize> + Send + Sync> {
        if dataset_len == 0 {
            return Box::new(std::iter::empty());
        }
        let mut rng = self.rng(epoch);
        let indices: Vec<usize> = if self.replacement {
            (0..self.len(dataset_len))
                .map(|_| rng.gen_range(0..dataset_len))
                .collect()
        } else {
            let mut indices: Vec<usize> = (0..dataset_len).collect();
            indices.shuffle(&mut rng);
            indices
        };
        Box::new(indices.into_iter())
    }

    fn len(&self, dataset_len: usize) -> usize {
        self.num_samples.unwrap_or(dataset_len)
    }
}

#[cfg(test)]
#[path = "random_sampler_test.rs"]
mod tests;
