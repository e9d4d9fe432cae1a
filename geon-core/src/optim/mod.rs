//! Parameter update nodes and learning-rate schedules.
//!
//! Updates are graph nodes like any other: they are built here, requested as
//! results, and applied by an evaluator at the end of the round that
//! computes them.

pub mod schedule;

pub use schedule::{ConstantRate, InverseEpochDecay, LearningRateSchedule, StepDecay};

use log::debug;

use crate::axis::Axes;
use crate::error::GeonError;
use crate::graph::{Graph, NodeId, NodeKind};
use crate::ops;

/// Update node performing `param <- param - step` when evaluated.
///
/// `step` must span the same axes as `param`; it is laid out in `param`'s
/// axis order if it differs.
pub fn decrement(graph: &mut Graph, param: NodeId, step: NodeId) -> Result<NodeId, GeonError> {
    let param_axes = match graph.node(param)?.kind() {
        NodeKind::Parameter { .. } => graph.axes(param)?.clone(),
        _ => {
            return Err(GeonError::NotAParameter {
                node: graph.label(param),
            })
        }
    };
    let step_axes = graph.value_operand(step, "decrement")?.axes();
    if !step_axes.same_set(&param_axes) {
        return Err(GeonError::ShapeMismatch {
            operation: "decrement".to_string(),
            left: graph.axis_names(&param_axes),
            right: graph.axis_names(step_axes),
        });
    }
    let step = ops::reduce_to(graph, step, param_axes)?;
    Ok(graph.push(NodeKind::Update, Axes::scalar(), vec![param, step]))
}

/// Groups updates (or other groups) into one node that runs them all.
pub fn doall(graph: &mut Graph, members: &[NodeId]) -> Result<NodeId, GeonError> {
    for &member in members {
        match graph.node(member)?.kind() {
            NodeKind::Update | NodeKind::DoAll => {}
            _ => {
                return Err(GeonError::NotAnUpdate {
                    node: graph.label(member),
                })
            }
        }
    }
    Ok(graph.push(NodeKind::DoAll, Axes::scalar(), members.to_vec()))
}

/// Gradient-descent updates of `params` against `loss`.
///
/// Returns the group of `param <- param - learning_rate * d loss / d param`
/// updates together with the derivative nodes, in `params` order.
pub fn sgd_updates(
    graph: &mut Graph,
    loss: NodeId,
    params: &[NodeId],
    learning_rate: NodeId,
) -> Result<(NodeId, Vec<NodeId>), GeonError> {
    let derivs = graph.derivs(loss, params)?;
    let mut updates = Vec::with_capacity(params.len());
    for (&param, &grad) in params.iter().zip(&derivs) {
        let step = ops::mul(graph, learning_rate, grad)?;
        updates.push(decrement(graph, param, step)?);
    }
    debug!("Built {} gradient-descent updates", updates.len());
    Ok((doall(graph, &updates)?, derivs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nn::init::Constant;
    use std::sync::Arc;

    #[test]
    fn test_decrement_requires_parameter() {
        let mut g = Graph::new();
        let f = g.axis_var_with_length("F", 2);
        let x = g.input("x", &[f]).unwrap();
        let err = decrement(&mut g, x, x).unwrap_err();
        assert!(matches!(err, GeonError::NotAParameter { .. }));
    }

    #[test]
    fn test_decrement_requires_matching_axes() {
        let mut g = Graph::new();
        let f = g.axis_var_with_length("F", 2);
        let o = g.axis_var_with_length("O", 2);
        let w = g
            .parameter("w", Axes::new(&[o, f]).unwrap(), Arc::new(Constant(0.0)))
            .unwrap();
        let partial = g.input("partial", &[f]).unwrap();
        assert!(decrement(&mut g, w, partial).unwrap_err().is_shape_error());

        let transposed = g.input("t", &[f, o]).unwrap();
        let update = decrement(&mut g, w, transposed).unwrap();
        let step = g.node(update).unwrap().operands()[1];
        assert_eq!(g.axes(step).unwrap().as_slice(), &[o, f]);
    }

    #[test]
    fn test_doall_only_groups_updates() {
        let mut g = Graph::new();
        let f = g.axis_var_with_length("F", 2);
        let w = g
            .parameter("w", Axes::from(f), Arc::new(Constant(0.0)))
            .unwrap();
        let update = decrement(&mut g, w, w).unwrap();
        let group = doall(&mut g, &[update]).unwrap();
        assert!(doall(&mut g, &[group, update]).is_ok());
        assert!(matches!(
            doall(&mut g, &[w]).unwrap_err(),
            GeonError::NotAnUpdate { .. }
        ));
        // Updates carry no value.
        assert!(ops::add(&mut g, w, update).is_err());
    }
}
