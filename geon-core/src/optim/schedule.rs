use std::fmt::Debug;

/// Learning rate to use for each epoch of training.
pub trait LearningRateSchedule: Debug + Send + Sync {
    /// Rate for epoch `epoch` (counted from 0).
    fn learning_rate(&self, epoch: usize) -> f64;
}

/// The same rate every epoch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantRate(pub f64);

impl LearningRateSchedule for ConstantRate {
    fn learning_rate(&self, _epoch: usize) -> f64 {
        self.0
    }
}

/// `base / (1 + epoch) / batch_size`.
///
/// Dividing by the batch size turns a loss summed over the batch into a
/// per-sample step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InverseEpochDecay {
    pub base: f64,
    pub batch_size: usize,
}

impl InverseEpochDecay {
    pub fn new(base: f64, batch_size: usize) -> Self {
        InverseEpochDecay { base, batch_size }
    }
}

impl LearningRateSchedule for InverseEpochDecay {
    fn learning_rate(&self, epoch: usize) -> f64 {
        self.base / (1.0 + epoch as f64) / self.batch_size.max(1) as f64
    }
}

/// Multiplies the rate by `gamma` every `step_size` epochs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepDecay {
    pub base: f64,
    pub step_size: usize,
    pub gamma: f64,
}

impl LearningRateSchedule for StepDecay {
    fn learning_rate(&self, epoch: usize) -> f64 {
        let steps = epoch / self.step_size.max(1);
        self.base * self.gamma.powi(steps as i32)
    }
}

#[cfg(test)]
#[path = "schedule_test.rs"]
mod tests;
