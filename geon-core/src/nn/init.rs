//! Parameter initializers.
//!
//! An initializer is invoked once per parameter, the first time an
//! [`Environment`](crate::env::Environment) materializes that parameter's
//! value.

use rand::distributions::{Distribution, Uniform as UniformDist};
use rand::rngs::StdRng;
use rand_distr::Normal as NormalDist;
use std::fmt::Debug;

use crate::error::GeonError;

/// Produces the initial values of a parameter of the given shape.
pub trait Initializer: Debug + Send + Sync {
    fn initialize(&self, shape: &[usize], rng: &mut StdRng) -> Result<Vec<f64>, GeonError>;
}

/// Fills with a single value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Constant(pub f64);

impl Initializer for Constant {
    fn initialize(&self, shape: &[usize], _rng: &mut StdRng) -> Result<Vec<f64>, GeonError> {
        Ok(vec![self.0; shape.iter().product()])
    }
}

/// Samples uniformly from `[low, high)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Uniform {
    pub low: f64,
    pub high: f64,
}

impl Uniform {
    pub fn new(low: f64, high: f64) -> Self {
        Uniform { low, high }
    }
}

impl Initializer for Uniform {
    fn initialize(&self, shape: &[usize], rng: &mut StdRng) -> Result<Vec<f64>, GeonError> {
        if self.low >= self.high {
            return Err(GeonError::InvalidConfig(format!(
                "Uniform initializer requires low < high, got [{}, {})",
                self.low, self.high
            )));
        }
        let dist = UniformDist::new(self.low, self.high);
        Ok((0..shape.iter().product())
            .map(|_| dist.sample(rng))
            .collect())
    }
}

/// Samples from a normal distribution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normal {
    pub mean: f64,
    pub std: f64,
}

impl Initializer for Normal {
    fn initialize(&self, shape: &[usize], rng: &mut StdRng) -> Result<Vec<f64>, GeonError> {
        let dist = NormalDist::new(self.mean, self.std).map_err(|e| {
            GeonError::InvalidConfig(format!("Invalid normal initializer: {}", e))
        })?;
        Ok((0..shape.iter().product())
            .map(|_| dist.sample(rng))
            .collect())
    }
}

#[cfg(test)]
#[path = "init_test.rs"]
mod tests;
