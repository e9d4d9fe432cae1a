use crate::axis::Axes;
use crate::error::GeonError;
use crate::graph::{Graph, NodeId, NodeKind};
use crate::ops::reduction::reduce_to;
use crate::ops::{operand, Op};

/// Axes of a parameter mapping values over `in_axes` onto `out_axes`: the
/// output axes followed by the input axes. The two must be disjoint.
pub fn linear_map_axes(graph: &Graph, in_axes: &Axes, out_axes: &Axes) -> Result<Axes, GeonError> {
    let shared = out_axes.intersection(in_axes);
    if !shared.is_empty() {
        return Err(GeonError::ShapeMismatch {
            operation: "linear_map_axes".to_string(),
            left: graph.axis_names(in_axes),
            right: graph.axis_names(out_axes),
        });
    }
    Ok(out_axes.union(in_axes))
}

/// Generalized tensor product.
///
/// Contracts (sums over) every non-batch axis the operands share. Shared
/// batch axes are not summed: they stay in the result and pair up
/// elementwise. All remaining axes of `a` then of `b` form the result.
pub fn dot(graph: &mut Graph, a: NodeId, b: NodeId) -> Result<NodeId, GeonError> {
    let a_axes = graph.value_operand(a, "dot")?.axes().clone();
    let b_axes = graph.value_operand(b, "dot")?.axes().clone();
    let contracted = graph.sample_axes(&a_axes.intersection(&b_axes));
    if contracted.is_empty() {
        return Err(GeonError::MissingContraction {
            left: graph.axis_names(&a_axes),
            right: graph.axis_names(&b_axes),
        });
    }
    contract(graph, a, b, contracted)
}

/// Product of `a` and `b` summed over exactly `contracted`, which may be
/// empty (an outer product over the non-shared axes).
pub(crate) fn contract(
    graph: &mut Graph,
    a: NodeId,
    b: NodeId,
    contracted: Axes,
) -> Result<NodeId, GeonError> {
    let a_axes = graph.value_operand(a, "dot")?.axes().clone();
    let b_axes = graph.value_operand(b, "dot")?.axes().clone();
    if !contracted.is_subset(&a_axes.intersection(&b_axes)) {
        return Err(GeonError::ShapeMismatch {
            operation: "dot".to_string(),
            left: graph.axis_names(&a_axes),
            right: graph.axis_names(&b_axes),
        });
    }
    let axes = a_axes
        .difference(&contracted)
        .union(&b_axes.difference(&contracted));
    Ok(graph.push(NodeKind::Op(Op::Dot { contracted }), axes, vec![a, b]))
}

// For result r = sum_K a*b, the gradient of a is the incoming gradient
// multiplied by b and summed over the axes only b contributed to r.
pub(crate) fn dot_backward(
    graph: &mut Graph,
    operands: &[NodeId],
    grad: NodeId,
) -> Result<Vec<NodeId>, GeonError> {
    let (a, b) = (operand(operands, 0)?, operand(operands, 1)?);
    let a_axes = graph.axes(a)?.clone();
    let b_axes = graph.axes(b)?.clone();

    let grad_a = contract(graph, grad, b, b_axes.difference(&a_axes))?;
    let grad_a = reduce_to(graph, grad_a, a_axes.clone())?;

    let grad_b = contract(graph, grad, a, a_axes.difference(&b_axes))?;
    let grad_b = reduce_to(graph, grad_b, b_axes)?;
    Ok(vec![grad_a, grad_b])
}
