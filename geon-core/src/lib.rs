//! Named-axis symbolic tensor graphs.
//!
//! A [`Graph`] records a computation over tensors whose dimensions are named
//! axes rather than positions. Graphs can be differentiated symbolically
//! ([`Graph::deriv`]), extended with parameter updates ([`optim::decrement`])
//! and evaluated by either backend in [`eval`].

pub mod array;
pub mod autograd;
pub mod axis;
pub mod env;
pub mod error;
pub mod eval;
pub mod graph;
pub mod nn;
pub mod ops;
pub mod optim;
pub mod scope;
pub mod train;

pub use array::Array;
pub use axis::{AxisId, AxisRegistry, Axes};
pub use env::Environment;
pub use error::{ErrorKind, GeonError};
pub use eval::{Bindings, Evaluator, Interpreter, NumPyGenerator, Values};
pub use graph::{Graph, Node, NodeId, NodeKind};
pub use scope::{Scope, ScopeList};
pub use train::{DataSource, TrainConfig, TrainingReport};
