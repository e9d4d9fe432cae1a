use approx::relative_eq;
use thiserror::Error;

use crate::array::Array;
use crate::env::Environment;
use crate::error::GeonError;
use crate::eval::{Bindings, Evaluator, Interpreter};
use crate::graph::{Graph, NodeId, NodeKind};

/// Error type specifically for gradient checking failures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GradCheckError {
    #[error("Gradient check failed for {target} at element {element_index}: analytical {analytical_grad} != numerical {numerical_grad} (difference {difference})")]
    GradientMismatch {
        target: String,
        element_index: usize,
        analytical_grad: f64,
        numerical_grad: f64,
        difference: f64,
    },

    #[error("Numerical gradient is NaN or infinite for {target}, element {element_index} (loss+ {loss_plus}, loss- {loss_minus})")]
    NumericalGradNaNOrInfinite {
        target: String,
        element_index: usize,
        loss_plus: f64,
        loss_minus: f64,
    },

    #[error("Analytical gradient is NaN or infinite for {target}, element {element_index}: {value}")]
    AnalyticalGradNaNOrInfinite {
        target: String,
        element_index: usize,
        value: f64,
    },

    #[error("Only inputs and parameters can be perturbed, got {target}")]
    UnsupportedTarget { target: String },

    #[error("Graph error during gradient check: {0}")]
    Graph(GeonError),
}

impl From<GeonError> for GradCheckError {
    fn from(err: GeonError) -> Self {
        GradCheckError::Graph(err)
    }
}

/// Where a perturbed value lives.
enum Slot {
    Parameter,
    Input,
}

fn total(
    env: &mut Environment,
    evaluator: &mut Interpreter<'_>,
    bindings: &Bindings,
    loss: NodeId,
) -> Result<f64, GeonError> {
    let values = evaluator.evaluate(env, bindings)?;
    let value = values
        .get(loss)
        .ok_or_else(|| GeonError::InternalError(format!("Loss {} was not evaluated", loss)))?;
    Ok(value.data().iter().sum())
}

/// Totals of the loss with element `element_index` of the target moved by
/// `+epsilon` and `-epsilon`. The target holds `original` again on return,
/// including when placing or evaluating fails.
fn perturbed_totals<P, E>(
    env: &mut Environment,
    perturbed: &mut Bindings,
    original: &Array,
    element_index: usize,
    epsilon: f64,
    place: &P,
    mut evaluate: E,
) -> Result<(f64, f64), GeonError>
where
    P: Fn(&mut Environment, &mut Bindings, Array) -> Result<(), GeonError>,
    E: FnMut(&mut Environment, &Bindings) -> Result<f64, GeonError>,
{
    let mut measure = |delta: f64| -> Result<f64, GeonError> {
        let mut moved = original.clone();
        moved.data_mut()[element_index] += delta;
        place(&mut *env, &mut *perturbed, moved)?;
        evaluate(&mut *env, &*perturbed)
    };
    let measured = measure(epsilon).and_then(|plus| measure(-epsilon).map(|minus| (plus, minus)));
    place(env, perturbed, original.clone())?;
    measured
}

/// Compares the symbolic derivatives of `loss` with respect to `targets`
/// against central finite differences.
///
/// Targets may be parameters (perturbed in `env`) or inputs (perturbed in a
/// copy of `bindings`). A loss with axes is checked as the sum of its
/// elements. Parameter values are restored before returning.
pub fn check_grad(
    graph: &mut Graph,
    env: &mut Environment,
    bindings: &Bindings,
    loss: NodeId,
    targets: &[NodeId],
    epsilon: f64,
    tolerance: f64,
) -> Result<(), GradCheckError> {
    let derivs = graph.derivs(loss, targets)?;
    let graph: &Graph = graph;

    let mut analytical_results = derivs.clone();
    analytical_results.push(loss);
    let analytical = Interpreter::new(graph, &analytical_results)?.evaluate(env, bindings)?;

    let mut loss_only = Interpreter::new(graph, &[loss])?;
    let mut perturbed = bindings.clone();

    for (&target, &grad) in targets.iter().zip(&derivs) {
        let label = graph.label(target);
        let (slot, original) = match graph.node(target)?.kind() {
            NodeKind::Parameter { .. } => {
                let value = env
                    .value(graph, target)?
                    .cloned()
                    .ok_or_else(|| GeonError::InternalError(format!("{} was never materialized", label)))?;
                (Slot::Parameter, value)
            }
            NodeKind::Input { .. } => (Slot::Input, bindings.resolve(graph, target)?.clone()),
            _ => return Err(GradCheckError::UnsupportedTarget { target: label }),
        };
        let analytical_grad = analytical
            .get(grad)
            .ok_or_else(|| GeonError::InternalError(format!("No gradient value for {}", label)))?;

        let place = |env: &mut Environment, perturbed: &mut Bindings, value: Array| -> Result<(), GeonError> {
            match slot {
                Slot::Parameter => env.set_value(graph, target, value),
                Slot::Input => {
                    perturbed.bind(target, value);
                    Ok(())
                }
            }
        };

        for element_index in 0..original.numel() {
            let (loss_plus, loss_minus) = perturbed_totals(
                env,
                &mut perturbed,
                &original,
                element_index,
                epsilon,
                &place,
                |env, bindings| total(env, &mut loss_only, bindings, loss),
            )?;

            let numerical_grad = (loss_plus - loss_minus) / (2.0 * epsilon);
            let analytical_value = analytical_grad.data()[element_index];

            if !numerical_grad.is_finite() {
                return Err(GradCheckError::NumericalGradNaNOrInfinite {
                    target: label,
                    element_index,
                    loss_plus,
                    loss_minus,
                });
            }
            if !analytical_value.is_finite() {
                return Err(GradCheckError::AnalyticalGradNaNOrInfinite {
                    target: label,
                    element_index,
                    value: analytical_value,
                });
            }
            if !relative_eq!(
                analytical_value,
                numerical_grad,
                epsilon = tolerance,
                max_relative = tolerance
            ) {
                return Err(GradCheckError::GradientMismatch {
                    target: label,
                    element_index,
                    analytical_grad: analytical_value,
                    numerical_grad,
                    difference: (analytical_value - numerical_grad).abs(),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "grad_check_test.rs"]
mod tests;
