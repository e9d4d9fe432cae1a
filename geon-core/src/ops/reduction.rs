use crate::axis::Axes;
use crate::error::GeonError;
use crate::graph::{Graph, NodeId, NodeKind};
use crate::ops::{operand, Op};

/// Sum of every element of `x`.
pub fn sum(graph: &mut Graph, x: NodeId) -> Result<NodeId, GeonError> {
    reduce_to(graph, x, Axes::scalar())
}

/// Sums `x` over every axis not in `target`, laying the result out in
/// `target`'s order. `target` must be a subset of `x`'s axes; when it holds
/// exactly those axes in the same order `x` itself is returned.
pub fn reduce_to(graph: &mut Graph, x: NodeId, target: Axes) -> Result<NodeId, GeonError> {
    let x_axes = graph.value_operand(x, "reduce_to")?.axes();
    if !target.is_subset(x_axes) {
        return Err(GeonError::ShapeMismatch {
            operation: "reduce_to".to_string(),
            left: graph.axis_names(x_axes),
            right: graph.axis_names(&target),
        });
    }
    if *x_axes == target {
        return Ok(x);
    }
    Ok(graph.push(NodeKind::Op(Op::ReduceTo), target, vec![x]))
}

/// Repeats `x` along every axis of `target` it lacks. `x`'s axes must be a
/// subset of `target`.
pub fn broadcast_to(graph: &mut Graph, x: NodeId, target: Axes) -> Result<NodeId, GeonError> {
    let x_axes = graph.value_operand(x, "broadcast")?.axes();
    if !x_axes.is_subset(&target) {
        return Err(GeonError::ShapeMismatch {
            operation: "broadcast".to_string(),
            left: graph.axis_names(x_axes),
            right: graph.axis_names(&target),
        });
    }
    if *x_axes == target {
        return Ok(x);
    }
    Ok(graph.push(NodeKind::Op(Op::Broadcast), target, vec![x]))
}

pub(crate) fn reduce_to_backward(
    graph: &mut Graph,
    operands: &[NodeId],
    grad: NodeId,
) -> Result<Vec<NodeId>, GeonError> {
    let x = operand(operands, 0)?;
    let axes = graph.axes(x)?.clone();
    Ok(vec![broadcast_to(graph, grad, axes)?])
}

pub(crate) fn broadcast_backward(
    graph: &mut Graph,
    operands: &[NodeId],
    grad: NodeId,
) -> Result<Vec<NodeId>, GeonError> {
    let x = operand(operands, 0)?;
    let axes = graph.axes(x)?.clone();
    Ok(vec![reduce_to(graph, grad, axes)?])
}
