use crate::error::GeonError;
use crate::graph::{Graph, NodeId};
use crate::ops::arithmetic::{div, mul, sub};
use crate::ops::{operand, unary, Op};

pub fn log(graph: &mut Graph, x: NodeId) -> Result<NodeId, GeonError> {
    unary(graph, Op::Log, x)
}

pub fn exp(graph: &mut Graph, x: NodeId) -> Result<NodeId, GeonError> {
    unary(graph, Op::Exp, x)
}

pub fn tanh(graph: &mut Graph, x: NodeId) -> Result<NodeId, GeonError> {
    unary(graph, Op::Tanh, x)
}

pub(crate) fn log_backward(
    graph: &mut Graph,
    operands: &[NodeId],
    grad: NodeId,
) -> Result<Vec<NodeId>, GeonError> {
    let x = operand(operands, 0)?;
    Ok(vec![div(graph, grad, x)?])
}

pub(crate) fn exp_backward(graph: &mut Graph, node: NodeId, grad: NodeId) -> Result<Vec<NodeId>, GeonError> {
    Ok(vec![mul(graph, grad, node)?])
}

// tanh' = 1 - tanh^2
pub(crate) fn tanh_backward(graph: &mut Graph, node: NodeId, grad: NodeId) -> Result<Vec<NodeId>, GeonError> {
    let one = graph.constant(1.0);
    let squared = mul(graph, node, node)?;
    let local = sub(graph, one, squared)?;
    Ok(vec![mul(graph, grad, local)?])
}
