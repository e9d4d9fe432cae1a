use crate::error::GeonError;
use crate::graph::{Graph, NodeId};
use crate::ops::arithmetic::div;
use crate::ops::math_elem::exp;
use crate::ops::reduction::reduce_to;

pub use crate::ops::math_elem::tanh;

/// Normalized exponential over the sample axes of `x`, computed separately
/// for every position of its batch axes.
pub fn softmax(graph: &mut Graph, x: NodeId) -> Result<NodeId, GeonError> {
    let x_axes = graph.value_operand(x, "softmax")?.axes().clone();
    let batch = graph.registry().batch_axes_of(&x_axes);
    let e = exp(graph, x)?;
    let total = reduce_to(graph, e, batch)?;
    div(graph, e, total)
}
