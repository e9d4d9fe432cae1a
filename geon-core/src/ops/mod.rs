//! Op library.
//!
//! Every op is a construction-time function: it checks its operands, derives
//! the result axes from theirs and appends an [`Op`] node. The value rule of
//! each op lives in the evaluators' kernels; the local derivative rule lives
//! next to the constructor and is dispatched from [`backward`].

pub mod activation;
pub mod arithmetic;
pub mod linalg;
pub mod loss;
pub mod math_elem;
pub mod reduction;

pub use activation::softmax;
pub use arithmetic::{add, div, mul, neg, scale, sub};
pub use linalg::{dot, linear_map_axes};
pub use loss::{cross_entropy, l2};
pub use math_elem::{exp, log, tanh};
pub use reduction::{broadcast_to, reduce_to, sum};

use crate::axis::Axes;
use crate::error::GeonError;
use crate::graph::{Graph, NodeId, NodeKind};

#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Add,
    Sub,
    Mul,
    Div,
    Neg,
    Log,
    Exp,
    Tanh,
    /// Sums the products of both operands over `contracted`; axes shared but
    /// not contracted are carried through elementwise.
    Dot { contracted: Axes },
    /// Sums over every operand axis missing from the node's axes.
    ReduceTo,
    /// Repeats the operand along every node axis it lacks.
    Broadcast,
}

impl Op {
    pub fn name(&self) -> &'static str {
        match self {
            Op::Add => "add",
            Op::Sub => "sub",
            Op::Mul => "mul",
            Op::Div => "div",
            Op::Neg => "neg",
            Op::Log => "log",
            Op::Exp => "exp",
            Op::Tanh => "tanh",
            Op::Dot { .. } => "dot",
            Op::ReduceTo => "reduce_to",
            Op::Broadcast => "broadcast",
        }
    }
}

/// Result axes of an elementwise op: one operand's axis set must contain the
/// other's, and the result takes the larger operand's order.
pub(crate) fn elementwise_axes(
    graph: &Graph,
    a: NodeId,
    b: NodeId,
    operation: &str,
) -> Result<Axes, GeonError> {
    let a_axes = graph.value_operand(a, operation)?.axes();
    let b_axes = graph.value_operand(b, operation)?.axes();
    if b_axes.is_subset(a_axes) {
        Ok(a_axes.clone())
    } else if a_axes.is_subset(b_axes) {
        Ok(b_axes.clone())
    } else {
        Err(GeonError::ShapeMismatch {
            operation: operation.to_string(),
            left: graph.axis_names(a_axes),
            right: graph.axis_names(b_axes),
        })
    }
}

pub(crate) fn binary(graph: &mut Graph, op: Op, a: NodeId, b: NodeId) -> Result<NodeId, GeonError> {
    let axes = elementwise_axes(graph, a, b, op.name())?;
    Ok(graph.push(NodeKind::Op(op), axes, vec![a, b]))
}

pub(crate) fn unary(graph: &mut Graph, op: Op, x: NodeId) -> Result<NodeId, GeonError> {
    let axes = graph.value_operand(x, op.name())?.axes().clone();
    Ok(graph.push(NodeKind::Op(op), axes, vec![x]))
}

/// Local derivative rule of `node`: given the gradient flowing into it,
/// returns one gradient node per operand, each with that operand's axes.
pub(crate) fn backward(graph: &mut Graph, node: NodeId, grad: NodeId) -> Result<Vec<NodeId>, GeonError> {
    let (op, operands) = {
        let n = graph.node(node)?;
        match n.kind() {
            NodeKind::Op(op) => (op.clone(), n.operands().to_vec()),
            _ => return Ok(Vec::new()),
        }
    };
    match op {
        Op::Add => arithmetic::add_backward(graph, &operands, grad),
        Op::Sub => arithmetic::sub_backward(graph, &operands, grad),
        Op::Mul => arithmetic::mul_backward(graph, &operands, grad),
        Op::Div => arithmetic::div_backward(graph, node, &operands, grad),
        Op::Neg => arithmetic::neg_backward(graph, grad),
        Op::Log => math_elem::log_backward(graph, &operands, grad),
        Op::Exp => math_elem::exp_backward(graph, node, grad),
        Op::Tanh => math_elem::tanh_backward(graph, node, grad),
        Op::Dot { .. } => linalg::dot_backward(graph, &operands, grad),
        Op::ReduceTo => reduction::reduce_to_backward(graph, &operands, grad),
        Op::Broadcast => reduction::broadcast_backward(graph, &operands, grad),
    }
}

/// Operand `i`, or an internal error when the node has fewer operands.
pub(crate) fn operand(operands: &[NodeId], i: usize) -> Result<NodeId, GeonError> {
    operands.get(i).copied().ok_or_else(|| {
        GeonError::InternalError(format!("Missing operand {} (have {})", i, operands.len()))
    })
}

#[cfg(test)]
#[path = "ops_test.rs"]
mod tests;
