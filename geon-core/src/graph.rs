//! The computation DAG.
//!
//! Nodes live in an arena owned by [`Graph`] and are addressed by [`NodeId`].
//! A node only ever references nodes created before it, so ascending id order
//! is always a valid topological order.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use crate::autograd::deriv::GradientTable;
use crate::axis::{AxisId, AxisRegistry, Axes};
use crate::error::GeonError;
use crate::nn::init::Initializer;
use crate::ops::Op;
use crate::scope::ScopeStack;

/// Identity of a node in its graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    /// Declares an axis; carries no value.
    AxisVariable(AxisId),
    /// Value supplied by the caller for each evaluation round.
    Input { name: String },
    /// Trainable value stored in an environment, keyed by qualified name.
    Parameter {
        name: String,
        init: Arc<dyn Initializer>,
    },
    /// A value filled with one number over the node's axes.
    Constant(f64),
    Op(Op),
    /// `operands[0] <- operands[0] - operands[1]`; carries no value.
    Update,
    /// Runs every member update once; carries no value.
    DoAll,
}

impl NodeKind {
    /// Whether nodes of this kind produce a value when evaluated.
    pub fn has_value(&self) -> bool {
        matches!(
            self,
            NodeKind::Input { .. } | NodeKind::Parameter { .. } | NodeKind::Constant(_) | NodeKind::Op(_)
        )
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    kind: NodeKind,
    axes: Axes,
    operands: Vec<NodeId>,
}

impl Node {
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn axes(&self) -> &Axes {
        &self.axes
    }

    pub fn operands(&self) -> &[NodeId] {
        &self.operands
    }
}

/// Owns every node, the axis registry, the name scopes and the gradient memo.
#[derive(Debug, Default)]
pub struct Graph {
    nodes: Vec<Node>,
    registry: AxisRegistry,
    axis_nodes: HashMap<AxisId, NodeId>,
    pub(crate) scopes: ScopeStack,
    pub(crate) gradients: HashMap<NodeId, GradientTable>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    // --- Axes ---

    /// Declares a fresh axis with unbound length.
    pub fn axis_var(&mut self, name: &str) -> AxisId {
        let axis = self.registry.create(name, None);
        self.register_axis_node(axis);
        axis
    }

    pub fn axis_var_with_length(&mut self, name: &str, length: usize) -> AxisId {
        let axis = self.registry.create(name, Some(length));
        self.register_axis_node(axis);
        axis
    }

    /// Declares a new axis of the same role as `like`, optionally with its own length.
    pub fn axis_like(&mut self, like: AxisId, length: Option<usize>) -> Result<AxisId, GeonError> {
        let axis = self.registry.create_like(like, length)?;
        self.register_axis_node(axis);
        Ok(axis)
    }

    fn register_axis_node(&mut self, axis: AxisId) {
        let node = self.push(NodeKind::AxisVariable(axis), Axes::scalar(), Vec::new());
        self.axis_nodes.insert(axis, node);
    }

    /// The `AxisVariable` node declaring `axis`.
    pub fn axis_node(&self, axis: AxisId) -> Option<NodeId> {
        self.axis_nodes.get(&axis).copied()
    }

    pub fn set_axis_length(&mut self, axis: AxisId, length: usize) -> Result<(), GeonError> {
        self.registry.set_length(axis, length)
    }

    pub fn axis_length(&self, axis: AxisId) -> Option<usize> {
        self.registry.length(axis)
    }

    pub fn set_batch_axes(&mut self, axes: &[AxisId]) {
        self.registry.set_batch_axes(axes);
    }

    pub fn sample_axes(&self, axes: &Axes) -> Axes {
        self.registry.sample_axes(axes)
    }

    pub fn registry(&self) -> &AxisRegistry {
        &self.registry
    }

    /// Builds an axis tuple, naming the offending axis on repetition.
    pub fn axes_of(&self, ids: &[AxisId]) -> Result<Axes, GeonError> {
        Axes::new(ids).map_err(|dup| GeonError::DuplicateAxis {
            axis: self.registry.name(dup),
            axes: ids.iter().map(|a| self.registry.name(*a)).collect(),
        })
    }

    pub fn axis_names(&self, axes: &Axes) -> Vec<String> {
        self.registry.names(axes)
    }

    // --- Leaves ---

    pub fn input(&mut self, name: &str, axes: &[AxisId]) -> Result<NodeId, GeonError> {
        let axes = self.axes_of(axes)?;
        Ok(self.push(
            NodeKind::Input {
                name: name.to_string(),
            },
            axes,
            Vec::new(),
        ))
    }

    /// Zero-axis constant.
    pub fn constant(&mut self, value: f64) -> NodeId {
        self.push(NodeKind::Constant(value), Axes::scalar(), Vec::new())
    }

    /// Constant holding `value` at every position of `axes`.
    pub fn fill(&mut self, value: f64, axes: Axes) -> NodeId {
        self.push(NodeKind::Constant(value), axes, Vec::new())
    }

    // --- Access ---

    pub(crate) fn push(&mut self, kind: NodeKind, axes: Axes, operands: Vec<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            axes,
            operands,
        });
        id
    }

    pub fn node(&self, id: NodeId) -> Result<&Node, GeonError> {
        self.nodes.get(id.0).ok_or(GeonError::UnknownNode(id.0))
    }

    pub fn axes(&self, id: NodeId) -> Result<&Axes, GeonError> {
        Ok(self.node(id)?.axes())
    }

    /// Checks that `id` exists and produces a value usable as an operand.
    pub(crate) fn value_operand(&self, id: NodeId, operation: &str) -> Result<&Node, GeonError> {
        let node = self.node(id)?;
        if !node.kind.has_value() {
            return Err(GeonError::NoValue {
                node: self.label(id),
                operation: operation.to_string(),
            });
        }
        Ok(node)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Short human-readable description used in errors and generated code.
    pub fn label(&self, id: NodeId) -> String {
        match self.nodes.get(id.0).map(|n| &n.kind) {
            Some(NodeKind::AxisVariable(axis)) => format!("axis {}({})", self.registry.name(*axis), id),
            Some(NodeKind::Input { name }) => format!("input {}({})", name, id),
            Some(NodeKind::Parameter { name, .. }) => format!("parameter {}({})", name, id),
            Some(NodeKind::Constant(v)) => format!("constant {}({})", v, id),
            Some(NodeKind::Op(op)) => format!("{}({})", op.name(), id),
            Some(NodeKind::Update) => format!("update({})", id),
            Some(NodeKind::DoAll) => format!("doall({})", id),
            None => format!("unknown({})", id),
        }
    }

    // --- Traversal ---

    /// Every node `roots` depend on (roots included), in topological order.
    pub fn topological_order(&self, roots: &[NodeId]) -> Result<Vec<NodeId>, GeonError> {
        let mut visited: HashSet<NodeId> = HashSet::new();
        let mut stack: Vec<NodeId> = Vec::with_capacity(roots.len());
        for &root in roots {
            self.node(root)?;
            stack.push(root);
        }
        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }
            for &operand in self.nodes[id.0].operands.iter() {
                if !visited.contains(&operand) {
                    stack.push(operand);
                }
            }
        }
        let mut order: Vec<NodeId> = visited.into_iter().collect();
        order.sort_unstable();
        Ok(order)
    }

    /// Parameters `root` depends on, in creation order.
    pub fn parameters(&self, root: NodeId) -> Result<Vec<NodeId>, GeonError> {
        Ok(self
            .topological_order(&[root])?
            .into_iter()
            .filter(|id| matches!(self.nodes[id.0].kind, NodeKind::Parameter { .. }))
            .collect())
    }

    pub fn parameter_name(&self, id: NodeId) -> Result<&str, GeonError> {
        match self.node(id)?.kind() {
            NodeKind::Parameter { name, .. } => Ok(name),
            _ => Err(GeonError::NotAParameter {
                node: self.label(id),
            }),
        }
    }
}

#[cfg(test)]
#[path = "graph_test.rs"]
mod tests;
