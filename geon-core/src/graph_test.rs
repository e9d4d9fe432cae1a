use super::*;
use crate::nn::init::Constant;
use crate::ops;

#[test]
fn test_axis_var_declares_node() {
    let mut g = Graph::new();
    let c = g.axis_var("C");
    let node = g.axis_node(c).unwrap();
    assert!(matches!(g.node(node).unwrap().kind(), NodeKind::AxisVariable(a) if *a == c));
    assert!(g.axes(node).unwrap().is_empty());
    assert_eq!(g.axis_length(c), None);
    g.set_axis_length(c, 3).unwrap();
    assert_eq!(g.axis_length(c), Some(3));
}

#[test]
fn test_axis_like_is_a_new_identity() {
    let mut g = Graph::new();
    let y = g.axis_var_with_length("Y", 10);
    let hidden = g.axis_like(y, Some(200)).unwrap();
    assert_ne!(hidden, y);
    assert_eq!(g.axis_length(hidden), Some(200));
    assert_eq!(g.axis_length(y), Some(10));
    assert!(g.axis_node(hidden).is_some());
}

#[test]
fn test_input_rejects_duplicate_axes() {
    let mut g = Graph::new();
    let c = g.axis_var("C");
    match g.input("x", &[c, c]) {
        Err(GeonError::DuplicateAxis { axis, .. }) => assert_eq!(axis, "C"),
        other => panic!("Expected DuplicateAxis, got {:?}", other),
    }
}

#[test]
fn test_leaves_carry_their_axes() {
    let mut g = Graph::new();
    let c = g.axis_var("C");
    let n = g.axis_var("N");
    let x = g.input("x", &[c, n]).unwrap();
    assert_eq!(g.axes(x).unwrap().as_slice(), &[c, n]);
    let k = g.constant(2.0);
    assert!(g.axes(k).unwrap().is_empty());
    let ones = g.fill(1.0, Axes::from(n));
    assert_eq!(g.axes(ones).unwrap().as_slice(), &[n]);
    assert!(matches!(g.node(ones).unwrap().kind(), NodeKind::Constant(v) if *v == 1.0));
}

#[test]
fn test_unknown_node() {
    let g = Graph::new();
    assert_eq!(g.node(NodeId(7)).unwrap_err(), GeonError::UnknownNode(7));
}

#[test]
fn test_topological_order_is_dependency_closure() {
    let mut g = Graph::new();
    let f = g.axis_var_with_length("F", 2);
    let a = g.input("a", &[f]).unwrap();
    let b = g.input("b", &[f]).unwrap();
    let unrelated = g.input("u", &[f]).unwrap();
    let s = ops::add(&mut g, a, b).unwrap();
    let t = ops::mul(&mut g, s, a).unwrap();

    let order = g.topological_order(&[t]).unwrap();
    assert_eq!(order, vec![a, b, s, t]);
    assert!(!order.contains(&unrelated));
    let pos = |id: NodeId| order.iter().position(|&o| o == id).unwrap();
    assert!(pos(s) < pos(t));
}

#[test]
fn test_parameters_in_creation_order() {
    let mut g = Graph::new();
    let f = g.axis_var_with_length("F", 2);
    let x = g.input("x", &[f]).unwrap();
    let w1 = g.parameter("w1", Axes::from(f), Arc::new(Constant(1.0))).unwrap();
    let w2 = g.parameter("w2", Axes::from(f), Arc::new(Constant(1.0))).unwrap();
    let a = ops::mul(&mut g, w2, x).unwrap();
    let b = ops::mul(&mut g, a, w1).unwrap();
    assert_eq!(g.parameters(b).unwrap(), vec![w1, w2]);
    assert_eq!(g.parameters(a).unwrap(), vec![w2]);
    assert_eq!(g.parameter_name(w1).unwrap(), "w1");
    assert!(g.parameter_name(x).is_err());
}

#[test]
fn test_labels() {
    let mut g = Graph::new();
    let f = g.axis_var("F");
    let x = g.input("x", &[f]).unwrap();
    let y = ops::exp(&mut g, x).unwrap();
    assert_eq!(g.label(x), format!("input x({})", x));
    assert_eq!(g.label(y), format!("exp({})", y));
}
