use crate::error::GeonError;
use crate::graph::{Graph, NodeId};
use crate::ops::reduction::reduce_to;
use crate::ops::{binary, operand, unary, Op};

pub fn add(graph: &mut Graph, a: NodeId, b: NodeId) -> Result<NodeId, GeonError> {
    binary(graph, Op::Add, a, b)
}

pub fn sub(graph: &mut Graph, a: NodeId, b: NodeId) -> Result<NodeId, GeonError> {
    binary(graph, Op::Sub, a, b)
}

pub fn mul(graph: &mut Graph, a: NodeId, b: NodeId) -> Result<NodeId, GeonError> {
    binary(graph, Op::Mul, a, b)
}

pub fn div(graph: &mut Graph, a: NodeId, b: NodeId) -> Result<NodeId, GeonError> {
    binary(graph, Op::Div, a, b)
}

pub fn neg(graph: &mut Graph, x: NodeId) -> Result<NodeId, GeonError> {
    unary(graph, Op::Neg, x)
}

/// `factor * x` with a zero-axis constant factor.
pub fn scale(graph: &mut Graph, factor: f64, x: NodeId) -> Result<NodeId, GeonError> {
    let c = graph.constant(factor);
    mul(graph, c, x)
}

/// Gradient of `x` summed down to the axes of `target`.
fn onto(graph: &mut Graph, x: NodeId, target: NodeId) -> Result<NodeId, GeonError> {
    let axes = graph.axes(target)?.clone();
    reduce_to(graph, x, axes)
}

pub(crate) fn add_backward(
    graph: &mut Graph,
    operands: &[NodeId],
    grad: NodeId,
) -> Result<Vec<NodeId>, GeonError> {
    let (a, b) = (operand(operands, 0)?, operand(operands, 1)?);
    Ok(vec![onto(graph, grad, a)?, onto(graph, grad, b)?])
}

pub(crate) fn sub_backward(
    graph: &mut Graph,
    operands: &[NodeId],
    grad: NodeId,
) -> Result<Vec<NodeId>, GeonError> {
    let (a, b) = (operand(operands, 0)?, operand(operands, 1)?);
    let grad_a = onto(graph, grad, a)?;
    let grad_b = onto(graph, grad, b)?;
    Ok(vec![grad_a, neg(graph, grad_b)?])
}

pub(crate) fn mul_backward(
    graph: &mut Graph,
    operands: &[NodeId],
    grad: NodeId,
) -> Result<Vec<NodeId>, GeonError> {
    let (a, b) = (operand(operands, 0)?, operand(operands, 1)?);
    let grad_b_full = mul(graph, grad, a)?;
    let grad_a_full = mul(graph, grad, b)?;
    Ok(vec![
        onto(graph, grad_a_full, a)?,
        onto(graph, grad_b_full, b)?,
    ])
}

// d(a/b)/db = -(a/b)/b, written with the node's own value.
pub(crate) fn div_backward(
    graph: &mut Graph,
    node: NodeId,
    operands: &[NodeId],
    grad: NodeId,
) -> Result<Vec<NodeId>, GeonError> {
    let (a, b) = (operand(operands, 0)?, operand(operands, 1)?);
    let grad_a_full = div(graph, grad, b)?;
    let grad_a = onto(graph, grad_a_full, a)?;

    let scaled = mul(graph, grad, node)?;
    let quotient = div(graph, scaled, b)?;
    let reduced = onto(graph, quotient, b)?;
    let grad_b = neg(graph, reduced)?;
    Ok(vec![grad_a, grad_b])
}

pub(crate) fn neg_backward(graph: &mut Graph, grad: NodeId) -> Result<Vec<NodeId>, GeonError> {
    Ok(vec![neg(graph, grad)?])
}
