//! Model-building helpers on top of the op library.

pub mod classifier;
pub mod init;
pub mod layers;

pub use classifier::{ClassifierGraph, ClassifierSpec};
pub use init::{Constant, Initializer, Normal, Uniform};
pub use layers::{affine, linear, mlp, Activation, HiddenLayers, LinearOptions};
