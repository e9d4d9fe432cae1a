//! Parameter storage.
//!
//! An [`Environment`] owns the current value of every trainable parameter,
//! keyed by the parameter's qualified name. Values are created lazily, from
//! the parameter's initializer, the first time an evaluation reads them.
//! Callers hand the environment to evaluators explicitly, which is what ties
//! a round of evaluation to one set of parameter values.

use std::collections::HashMap;

use log::debug;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::array::Array;
use crate::error::GeonError;
use crate::graph::{Graph, NodeId, NodeKind};

#[derive(Debug)]
pub struct Environment {
    name: String,
    values: HashMap<String, Array>,
    rng: StdRng,
}

impl Environment {
    /// Creates an empty environment with a seeded initializer stream.
    pub fn new(name: &str, seed: u64) -> Self {
        Environment {
            name: name.to_string(),
            values: HashMap::new(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, qualified: &str) -> Option<&Array> {
        self.values.get(qualified)
    }

    /// Stores `value` under `qualified`, replacing any previous value.
    pub fn set(&mut self, qualified: &str, value: Array) {
        self.values.insert(qualified.to_string(), value);
    }

    pub fn contains(&self, qualified: &str) -> bool {
        self.values.contains_key(qualified)
    }

    /// Qualified names of every stored parameter, sorted.
    pub fn parameter_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.values.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Current value of parameter `param`, if one has been stored.
    pub fn value(&self, graph: &Graph, param: NodeId) -> Result<Option<&Array>, GeonError> {
        let name = graph.parameter_name(param)?;
        Ok(self.values.get(name))
    }

    /// Stores `value` for parameter `param`, checking it against the
    /// parameter's axis lengths.
    pub fn set_value(&mut self, graph: &Graph, param: NodeId, value: Array) -> Result<(), GeonError> {
        let name = graph.parameter_name(param)?;
        let expected = graph.registry().lengths(graph.axes(param)?)?;
        if value.shape() != expected.as_slice() {
            return Err(GeonError::BindingShapeMismatch {
                input: name.to_string(),
                expected,
                actual: value.shape().to_vec(),
            });
        }
        self.values.insert(name.to_string(), value);
        Ok(())
    }

    /// Value of parameter `param`, running its initializer first if the
    /// environment holds none yet.
    pub(crate) fn materialize(&mut self, graph: &Graph, param: NodeId) -> Result<&Array, GeonError> {
        let node = graph.node(param)?;
        let (name, init) = match node.kind() {
            NodeKind::Parameter { name, init } => (name, init),
            _ => {
                return Err(GeonError::NotAParameter {
                    node: graph.label(param),
                })
            }
        };
        let shape = graph.registry().lengths(node.axes())?;
        if !self.values.contains_key(name) {
            let data = init.initialize(&shape, &mut self.rng)?;
            debug!("Initialized parameter {} with shape {:?}", name, shape);
            self.values.insert(name.clone(), Array::new(data, shape)?);
        } else if let Some(existing) = self.values.get(name) {
            if existing.shape() != shape.as_slice() {
                return Err(GeonError::BindingShapeMismatch {
                    input: name.clone(),
                    expected: shape,
                    actual: existing.shape().to_vec(),
                });
            }
        }
        self.values
            .get(name)
            .ok_or_else(|| GeonError::InternalError(format!("Parameter {} vanished", name)))
    }

    /// `param <- param - step`.
    pub(crate) fn decrement(&mut self, graph: &Graph, param: NodeId, step: &Array) -> Result<(), GeonError> {
        self.materialize(graph, param)?;
        let name = graph.parameter_name(param)?;
        match self.values.get_mut(name) {
            Some(value) => value.sub_assign(step),
            None => Err(GeonError::InternalError(format!("Parameter {} vanished", name))),
        }
    }
}
