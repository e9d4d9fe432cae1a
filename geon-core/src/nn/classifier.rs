//! A ready-made classification graph: an MLP with a softmax output trained
//! on cross-entropy plus an L2 penalty on its parameters.

use std::sync::Arc;

use log::debug;

use crate::axis::{AxisId, Axes};
use crate::error::GeonError;
use crate::graph::{Graph, NodeId};
use crate::nn::init::{Initializer, Uniform};
use crate::nn::layers::{mlp, HiddenLayers, LinearOptions};
use crate::ops::{add, cross_entropy, l2, scale, softmax, tanh};

/// Architecture and loss settings of a [`ClassifierGraph`].
#[derive(Debug, Clone)]
pub struct ClassifierSpec {
    /// Width of each `tanh` hidden layer, in order.
    pub hidden: Vec<usize>,
    pub init: Arc<dyn Initializer>,
    pub bias: Option<Arc<dyn Initializer>>,
    /// Weight of the summed squared norms of the parameters in the loss.
    pub regularization: f64,
}

impl Default for ClassifierSpec {
    fn default() -> Self {
        ClassifierSpec {
            hidden: vec![200],
            init: Arc::new(Uniform {
                low: -0.001,
                high: 0.001,
            }),
            bias: None,
            regularization: 0.01,
        }
    }
}

/// Graph of a batch classifier.
///
/// Features are laid out over the sample axes followed by the batch axis
/// `N`; labels are one-hot over the class axis `Y` followed by `N`.
#[derive(Debug)]
pub struct ClassifierGraph {
    pub graph: Graph,
    pub sample_axes: Vec<AxisId>,
    pub batch_axis: AxisId,
    pub class_axis: AxisId,
    /// Features input.
    pub x: NodeId,
    /// One-hot labels input.
    pub y: NodeId,
    /// Predicted class probabilities over `(Y, N)`.
    pub value: NodeId,
    /// Cross-entropy of `value` against `y`, summed over the batch.
    pub error: NodeId,
    /// `error` plus the regularization penalty.
    pub loss: NodeId,
}

fn sample_axis_names(rank: usize) -> Vec<String> {
    match rank {
        3 => vec!["C".to_string(), "H".to_string(), "W".to_string()],
        _ => (0..rank).map(|i| format!("S{}", i)).collect(),
    }
}

impl ClassifierGraph {
    /// Builds the graph for samples of rank `sample_rank`. Axis lengths are
    /// left unbound until [`ClassifierGraph::bind_lengths`].
    pub fn new(sample_rank: usize, spec: &ClassifierSpec) -> Result<Self, GeonError> {
        let mut graph = Graph::new();
        let sample_axes: Vec<AxisId> = sample_axis_names(sample_rank)
            .iter()
            .map(|name| graph.axis_var(name))
            .collect();
        let batch_axis = graph.axis_var("N");
        let class_axis = graph.axis_var("Y");
        graph.set_batch_axes(&[batch_axis]);

        let mut x_axes = sample_axes.clone();
        x_axes.push(batch_axis);
        let x = graph.input("x", &x_axes)?;
        let y = graph.input("y", &[class_axis, batch_axis])?;

        let hidden = vec![HiddenLayers {
            activation: tanh,
            axes: vec![class_axis],
            shapes: spec.hidden.iter().map(|&w| vec![w]).collect(),
        }];
        let options = LinearOptions {
            init: spec.init.clone(),
            bias: spec.bias.clone(),
        };
        let out_axes = graph.axes_of(&[class_axis, batch_axis])?;
        let value = mlp(&mut graph, x, softmax, &hidden, &out_axes, &options)?;
        let error = cross_entropy(&mut graph, value, y)?;

        let mut loss = error;
        let params = graph.parameters(value)?;
        if !params.is_empty() && spec.regularization != 0.0 {
            let mut penalty = l2(&mut graph, params[0])?;
            for &param in &params[1..] {
                let norm = l2(&mut graph, param)?;
                penalty = add(&mut graph, penalty, norm)?;
            }
            let penalty = scale(&mut graph, spec.regularization, penalty)?;
            loss = add(&mut graph, error, penalty)?;
        }
        debug!(
            "Classifier graph with {} parameters and {} nodes",
            params.len(),
            graph.len()
        );

        Ok(ClassifierGraph {
            graph,
            sample_axes,
            batch_axis,
            class_axis,
            x,
            y,
            value,
            error,
            loss,
        })
    }

    /// Binds the batch, sample and class axis lengths. Binding again with the
    /// same lengths is a no-op.
    pub fn bind_lengths(
        &mut self,
        batch_size: usize,
        sample_shape: &[usize],
        num_classes: usize,
    ) -> Result<(), GeonError> {
        if sample_shape.len() != self.sample_axes.len() {
            return Err(GeonError::ShapeMismatch {
                operation: "bind_lengths".to_string(),
                left: self.graph.axis_names(&Axes::new(&self.sample_axes).unwrap_or_default()),
                right: sample_shape.iter().map(|l| l.to_string()).collect(),
            });
        }
        for (&axis, &length) in self.sample_axes.iter().zip(sample_shape) {
            self.graph.set_axis_length(axis, length)?;
        }
        self.graph.set_axis_length(self.batch_axis, batch_size)?;
        self.graph.set_axis_length(self.class_axis, num_classes)
    }

    /// Trainable parameters, in creation order.
    pub fn parameters(&self) -> Result<Vec<NodeId>, GeonError> {
        self.graph.parameters(self.value)
    }
}
