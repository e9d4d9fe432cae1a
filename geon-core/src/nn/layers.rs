//! Linear layers and multilayer perceptrons.
//!
//! Every helper creates its parameters inside its own name scope, so building
//! the same layer twice under the same scope path shares its weights.

use std::fmt;
use std::sync::Arc;

use crate::axis::{AxisId, Axes};
use crate::error::GeonError;
use crate::graph::{Graph, NodeId};
use crate::nn::init::Initializer;
use crate::ops::{add, dot, linear_map_axes};

/// A nonlinearity applied after an affine map, e.g. [`crate::ops::tanh`].
pub type Activation = fn(&mut Graph, NodeId) -> Result<NodeId, GeonError>;

/// Initializers for the weights and the optional bias of a linear layer.
#[derive(Debug, Clone)]
pub struct LinearOptions {
    pub init: Arc<dyn Initializer>,
    /// `None` builds the layer without a bias.
    pub bias: Option<Arc<dyn Initializer>>,
}

impl LinearOptions {
    pub fn new(init: Arc<dyn Initializer>) -> Self {
        LinearOptions { init, bias: None }
    }

    pub fn with_bias(mut self, bias: Arc<dyn Initializer>) -> Self {
        self.bias = Some(bias);
        self
    }
}

/// Maps the sample axes of `x` onto the sample axes of `axes` through a
/// `weights` parameter, adding a `bias` over the output axes if requested.
/// Batch axes of `x` carry through.
pub fn linear(graph: &mut Graph, x: NodeId, axes: &Axes, options: &LinearOptions) -> Result<NodeId, GeonError> {
    graph.with_name_scope("linear", |g| {
        let x_axes = g.axes(x)?.clone();
        let in_axes = g.sample_axes(&x_axes);
        let out_axes = g.sample_axes(axes);
        let weight_axes = linear_map_axes(g, &in_axes, &out_axes)?;
        let weights = g.parameter("weights", weight_axes, options.init.clone())?;
        let mut result = dot(g, weights, x)?;
        if let Some(bias_init) = &options.bias {
            let bias = g.parameter("bias", out_axes, bias_init.clone())?;
            result = add(g, result, bias)?;
        }
        Ok(result)
    })
}

/// `activation(linear(x))`.
pub fn affine(
    graph: &mut Graph,
    x: NodeId,
    activation: Activation,
    axes: &Axes,
    options: &LinearOptions,
) -> Result<NodeId, GeonError> {
    let y = linear(graph, x, axes, options)?;
    activation(graph, y)
}

/// A run of hidden layers sharing one activation.
///
/// Each entry of `shapes` is one layer; its lengths size new axes created
/// like `axes` (so `axes` and every shape have the same length).
#[derive(Clone)]
pub struct HiddenLayers {
    pub activation: Activation,
    pub axes: Vec<AxisId>,
    pub shapes: Vec<Vec<usize>>,
}

impl fmt::Debug for HiddenLayers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HiddenLayers")
            .field("axes", &self.axes)
            .field("shapes", &self.shapes)
            .finish_non_exhaustive()
    }
}

/// Multilayer perceptron: the hidden layers in order, then an output layer
/// onto `axes` with `activation`. Layers live in scopes `mlp/L0`, `mlp/L1`, ...
pub fn mlp(
    graph: &mut Graph,
    x: NodeId,
    activation: Activation,
    hidden: &[HiddenLayers],
    axes: &Axes,
    options: &LinearOptions,
) -> Result<NodeId, GeonError> {
    graph.with_name_scope("mlp", |g| {
        let mut layers = g.name_scope_list("L");
        let mut value = x;
        for run in hidden {
            for shape in &run.shapes {
                if shape.len() != run.axes.len() {
                    return Err(GeonError::ShapeMismatch {
                        operation: "mlp".to_string(),
                        left: run.axes.iter().map(|a| g.registry().name(*a)).collect(),
                        right: shape.iter().map(|l| l.to_string()).collect(),
                    });
                }
                value = g.with_next_scope(&mut layers, |g| {
                    let mut layer_axes = Vec::with_capacity(shape.len());
                    for (i, (&like, &length)) in run.axes.iter().zip(shape).enumerate() {
                        layer_axes.push(g.scoped_axis(&format!("axes{}", i), like, Some(length))?);
                    }
                    let layer_axes = g.axes_of(&layer_axes)?;
                    affine(g, value, run.activation, &layer_axes, options)
                })?;
            }
        }
        g.with_next_scope(&mut layers, |g| affine(g, value, activation, axes, options))
    })
}

#[cfg(test)]
#[path = "layers_test.rs"]
mod tests;
