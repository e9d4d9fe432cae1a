use super::*;
use crate::axis::Axes;
use crate::nn::init::Constant;
use crate::ops;
use std::sync::Arc;

fn parameter_graph() -> (Graph, NodeId) {
    let mut g = Graph::new();
    let f = g.axis_var_with_length("F", 2);
    let w = g.parameter("w", Axes::from(f), Arc::new(Constant(0.5))).unwrap();
    (g, w)
}

#[test]
fn test_failed_evaluation_restores_parameter() {
    let (g, w) = parameter_graph();
    let mut env = Environment::new("check", 0);
    let original = Array::new(vec![1.0, 2.0], vec![2]).unwrap();
    env.set_value(&g, w, original.clone()).unwrap();
    let mut bindings = Bindings::new();
    let place = |env: &mut Environment, _: &mut Bindings, value: Array| env.set_value(&g, w, value);

    let mut calls = 0;
    let result = perturbed_totals(&mut env, &mut bindings, &original, 1, 0.25, &place, |env, _| {
        calls += 1;
        if calls == 2 {
            return Err(GeonError::InternalError("evaluation failed".to_string()));
        }
        Ok(env.value(&g, w)?.map(|v| v.data().iter().sum()).unwrap_or(0.0))
    });

    assert_eq!(
        result,
        Err(GeonError::InternalError("evaluation failed".to_string()))
    );
    assert_eq!(env.value(&g, w).unwrap(), Some(&original));
}

#[test]
fn test_totals_see_both_perturbations() {
    let (g, w) = parameter_graph();
    let mut env = Environment::new("check", 0);
    let original = Array::new(vec![1.0, 2.0], vec![2]).unwrap();
    env.set_value(&g, w, original.clone()).unwrap();
    let mut bindings = Bindings::new();
    let place = |env: &mut Environment, _: &mut Bindings, value: Array| env.set_value(&g, w, value);

    let (plus, minus) = perturbed_totals(&mut env, &mut bindings, &original, 0, 0.5, &place, |env, _| {
        Ok(env.value(&g, w)?.map(|v| v.data().iter().sum()).unwrap_or(0.0))
    })
    .unwrap();

    assert_eq!(plus, 3.5);
    assert_eq!(minus, 2.5);
    assert_eq!(env.value(&g, w).unwrap(), Some(&original));
}

#[test]
fn test_check_grad_accepts_tanh_of_sum() {
    let (mut g, w) = parameter_graph();
    let t = ops::tanh(&mut g, w).unwrap();
    let loss = ops::sum(&mut g, t).unwrap();
    let mut env = Environment::new("check", 0);
    env.set_value(&g, w, Array::new(vec![0.3, -0.7], vec![2]).unwrap())
        .unwrap();

    check_grad(&mut g, &mut env, &Bindings::new(), loss, &[w], 1e-6, 1e-4).unwrap();
    assert_eq!(
        env.value(&g, w).unwrap().map(|v| v.data().to_vec()),
        Some(vec![0.3, -0.7])
    );
}
