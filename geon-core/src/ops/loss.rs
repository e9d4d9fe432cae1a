use crate::error::GeonError;
use crate::graph::{Graph, NodeId};
use crate::ops::arithmetic::{mul, neg};
use crate::ops::linalg::dot;
use crate::ops::math_elem::log;
use crate::ops::reduction::sum;

/// `-sum(log(y) * t)` over every axis, batch axes included.
pub fn cross_entropy(graph: &mut Graph, y: NodeId, t: NodeId) -> Result<NodeId, GeonError> {
    let log_y = log(graph, y)?;
    let weighted = mul(graph, log_y, t)?;
    let total = sum(graph, weighted)?;
    neg(graph, total)
}

/// Squared L2 norm over the sample axes of `x`.
pub fn l2(graph: &mut Graph, x: NodeId) -> Result<NodeId, GeonError> {
    dot(graph, x, x)
}
