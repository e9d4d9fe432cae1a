use std::sync::Arc;

use geon_core::autograd::check_grad;
use geon_core::nn::init::Uniform;
use geon_core::nn::{ClassifierGraph, ClassifierSpec};
use geon_core::ops;
use geon_core::{AxisId, Axes, Bindings, Environment, Graph};

mod common;
use common::{arr, init_logger};

const EPSILON: f64 = 1e-6;
const TOLERANCE: f64 = 1e-4;

struct Fixture {
    graph: Graph,
    f: AxisId,
    o: AxisId,
    n: AxisId,
}

fn fixture() -> Fixture {
    init_logger();
    let mut graph = Graph::new();
    let f = graph.axis_var_with_length("F", 3);
    let o = graph.axis_var_with_length("O", 2);
    let n = graph.axis_var_with_length("N", 2);
    graph.set_batch_axes(&[n]);
    Fixture { graph, f, o, n }
}

fn positive_features() -> geon_core::Array {
    arr(&[0.5, 1.2, 0.8, 2.0, 1.5, 0.3], &[3, 2])
}

fn uniform(low: f64, high: f64) -> Arc<Uniform> {
    Arc::new(Uniform::new(low, high))
}

#[test]
fn test_broadcast_arithmetic_gradients() {
    let Fixture { mut graph, f, n, .. } = fixture();
    let g = &mut graph;
    let a = g.input("a", &[f, n]).unwrap();
    let b = g.parameter("b", Axes::from(f), uniform(0.5, 1.5)).unwrap();
    let sum_ab = ops::add(g, a, b).unwrap();
    let diff = ops::sub(g, b, a).unwrap();
    let product = ops::mul(g, sum_ab, diff).unwrap();
    let quotient = ops::div(g, product, b).unwrap();
    let loss = ops::sum(g, quotient).unwrap();

    let mut bindings = Bindings::new();
    bindings.bind(a, positive_features());
    let mut env = Environment::new("grad", 1);
    check_grad(g, &mut env, &bindings, loss, &[a, b], EPSILON, TOLERANCE).unwrap();
}

#[test]
fn test_unary_gradients() {
    let Fixture { mut graph, f, n, .. } = fixture();
    let g = &mut graph;
    let x = g.input("x", &[f, n]).unwrap();
    let t = ops::tanh(g, x).unwrap();
    let neg = ops::neg(g, x).unwrap();
    let e = ops::exp(g, neg).unwrap();
    let l = ops::log(g, x).unwrap();
    let te = ops::mul(g, t, e).unwrap();
    let all = ops::add(g, te, l).unwrap();
    let loss = ops::sum(g, all).unwrap();

    let mut bindings = Bindings::new();
    bindings.bind(x, positive_features());
    let mut env = Environment::new("grad", 1);
    check_grad(g, &mut env, &bindings, loss, &[x], EPSILON, TOLERANCE).unwrap();
}

#[test]
fn test_dot_gradients_with_batch_axis() {
    let Fixture { mut graph, f, o, n } = fixture();
    let g = &mut graph;
    let x = g.input("x", &[f, n]).unwrap();
    let w = g
        .parameter("w", Axes::new(&[o, f]).unwrap(), uniform(-1.0, 1.0))
        .unwrap();
    let h = ops::dot(g, w, x).unwrap();
    let h = ops::tanh(g, h).unwrap();
    let per_sample = ops::dot(g, h, h).unwrap();
    let data = ops::sum(g, per_sample).unwrap();
    let penalty = ops::l2(g, w).unwrap();
    let loss = ops::add(g, data, penalty).unwrap();

    let mut bindings = Bindings::new();
    bindings.bind(x, positive_features());
    let mut env = Environment::new("grad", 7);
    check_grad(g, &mut env, &bindings, loss, &[x, w], EPSILON, TOLERANCE).unwrap();
}

#[test]
fn test_reduce_and_broadcast_gradients() {
    let Fixture { mut graph, f, o, n } = fixture();
    let g = &mut graph;
    let x = g.input("x", &[f, n]).unwrap();
    let w = g
        .parameter("w", Axes::new(&[o, f]).unwrap(), uniform(-1.0, 1.0))
        .unwrap();
    let per_feature = ops::reduce_to(g, x, Axes::from(f)).unwrap();
    let wide = ops::broadcast_to(g, per_feature, Axes::new(&[o, f]).unwrap()).unwrap();
    let weighted = ops::mul(g, wide, w).unwrap();
    let squashed = ops::tanh(g, weighted).unwrap();
    let loss = ops::sum(g, squashed).unwrap();

    let mut bindings = Bindings::new();
    bindings.bind(x, positive_features());
    let mut env = Environment::new("grad", 3);
    check_grad(g, &mut env, &bindings, loss, &[x, w], EPSILON, TOLERANCE).unwrap();
}

#[test]
fn test_softmax_cross_entropy_gradients() {
    let Fixture { mut graph, f, o, n } = fixture();
    let g = &mut graph;
    let x = g.input("x", &[f, n]).unwrap();
    let t = g.input("t", &[o, n]).unwrap();
    let w = g
        .parameter("w", Axes::new(&[o, f]).unwrap(), uniform(-1.0, 1.0))
        .unwrap();
    let logits = ops::dot(g, w, x).unwrap();
    let y = ops::softmax(g, logits).unwrap();
    let loss = ops::cross_entropy(g, y, t).unwrap();

    let mut bindings = Bindings::new();
    bindings
        .bind(x, positive_features())
        .bind(t, arr(&[1.0, 0.0, 0.0, 1.0], &[2, 2]));
    let mut env = Environment::new("grad", 11);
    check_grad(g, &mut env, &bindings, loss, &[w, x], EPSILON, TOLERANCE).unwrap();
}

#[test]
fn test_non_scalar_loss_and_shared_subexpressions() {
    let Fixture { mut graph, f, n, .. } = fixture();
    let g = &mut graph;
    let x = g.input("x", &[f, n]).unwrap();
    let square = ops::mul(g, x, x).unwrap();
    let twice = ops::add(g, square, square).unwrap();

    let mut bindings = Bindings::new();
    bindings.bind(x, positive_features());
    let mut env = Environment::new("grad", 0);
    check_grad(g, &mut env, &bindings, twice, &[x], EPSILON, TOLERANCE).unwrap();
}

#[test]
fn test_classifier_loss_gradients() {
    init_logger();
    let spec = ClassifierSpec {
        hidden: vec![4],
        init: uniform(-0.5, 0.5),
        bias: Some(uniform(-0.1, 0.1)),
        regularization: 0.01,
    };
    let mut model = ClassifierGraph::new(1, &spec).unwrap();
    model.bind_lengths(2, &[3], 2).unwrap();
    let params = model.parameters().unwrap();
    assert_eq!(params.len(), 4);

    let mut bindings = Bindings::new();
    bindings
        .bind(model.x, positive_features())
        .bind(model.y, arr(&[0.0, 1.0, 1.0, 0.0], &[2, 2]));
    let mut env = Environment::new("grad", 5);
    check_grad(
        &mut model.graph,
        &mut env,
        &bindings,
        model.loss,
        &params,
        EPSILON,
        TOLERANCE,
    )
    .unwrap();
}
