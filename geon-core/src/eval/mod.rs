//! Evaluation backends.
//!
//! An evaluator is compiled for a fixed list of result nodes and then run
//! once per round. Each round reads input values from [`Bindings`], reads
//! and updates parameters in an [`Environment`], and returns the values of
//! the requested results. Within one round every node is computed at most
//! once, and every update reads the parameter values the round started with.

pub mod codegen;
pub(crate) mod kernels;
pub mod interpreter;

pub use codegen::{NumPyGenerator, Program, Statement};
pub use interpreter::Interpreter;

use std::collections::HashMap;
use std::ops::Index;

use crate::array::Array;
use crate::env::Environment;
use crate::error::GeonError;
use crate::graph::{Graph, NodeId, NodeKind};

pub trait Evaluator {
    /// The result nodes this evaluator was compiled for.
    fn results(&self) -> &[NodeId];

    /// Runs one round. Parameter updates requested among the results are
    /// applied to `env` after every value of the round has been computed.
    fn evaluate(&mut self, env: &mut Environment, bindings: &Bindings) -> Result<Values, GeonError>;
}

/// Values supplied for input nodes during one round.
#[derive(Debug, Clone, Default)]
pub struct Bindings {
    values: HashMap<NodeId, Array>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `value` to `input`, replacing any earlier binding.
    pub fn bind(&mut self, input: NodeId, value: Array) -> &mut Self {
        self.values.insert(input, value);
        self
    }

    pub fn get(&self, input: NodeId) -> Option<&Array> {
        self.values.get(&input)
    }

    pub fn remove(&mut self, input: NodeId) -> Option<Array> {
        self.values.remove(&input)
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The value bound to input `id`, checked against the input's axis lengths.
    pub(crate) fn resolve(&self, graph: &Graph, id: NodeId) -> Result<&Array, GeonError> {
        let node = graph.node(id)?;
        let name = match node.kind() {
            NodeKind::Input { name } => name,
            _ => {
                return Err(GeonError::InternalError(format!(
                    "{} is not an input",
                    graph.label(id)
                )))
            }
        };
        let value = self
            .values
            .get(&id)
            .ok_or_else(|| GeonError::MissingBinding { input: name.clone() })?;
        let expected = graph.registry().lengths(node.axes())?;
        if value.shape() != expected.as_slice() {
            return Err(GeonError::BindingShapeMismatch {
                input: name.clone(),
                expected,
                actual: value.shape().to_vec(),
            });
        }
        Ok(value)
    }
}

/// Result values of one round, keyed by result node.
#[derive(Debug, Clone, Default)]
pub struct Values {
    values: HashMap<NodeId, Array>,
}

impl Values {
    pub fn get(&self, id: NodeId) -> Option<&Array> {
        self.values.get(&id)
    }

    /// The single number held by result `id`.
    pub fn scalar(&self, id: NodeId) -> Result<f64, GeonError> {
        self.values
            .get(&id)
            .ok_or_else(|| GeonError::InternalError(format!("No value was computed for {}", id)))?
            .item()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.values.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Array)> {
        self.values.iter().map(|(k, v)| (*k, v))
    }

    pub(crate) fn insert(&mut self, id: NodeId, value: Array) {
        self.values.insert(id, value);
    }
}

impl Index<NodeId> for Values {
    type Output = Array;

    /// Panics when `id` was not among the results.
    fn index(&self, id: NodeId) -> &Array {
        &self.values[&id]
    }
}

/// Value nodes and updates of a result list, in evaluation order.
pub(crate) struct Schedule {
    pub values: Vec<NodeId>,
    /// `(parameter, step)` pairs in result order.
    pub updates: Vec<(NodeId, NodeId)>,
}

pub(crate) fn schedule(graph: &Graph, results: &[NodeId]) -> Result<Schedule, GeonError> {
    let order = graph.topological_order(results)?;
    let mut values = Vec::with_capacity(order.len());
    let mut updates = Vec::new();
    for id in order {
        let node = graph.node(id)?;
        match node.kind() {
            NodeKind::AxisVariable(_) | NodeKind::DoAll => {}
            NodeKind::Update => {
                let (param, step) = match node.operands() {
                    [param, step] => (*param, *step),
                    _ => {
                        return Err(GeonError::InternalError(format!(
                            "{} must have exactly two operands",
                            graph.label(id)
                        )))
                    }
                };
                updates.push((param, step));
            }
            _ => values.push(id),
        }
    }
    Ok(Schedule { values, updates })
}
