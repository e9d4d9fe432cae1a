use super::*;
use crate::axis::{AxisId, Axes};
use crate::error::{ErrorKind, GeonError};
use crate::graph::{Graph, NodeId, NodeKind};

fn setup() -> (Graph, AxisId, AxisId, AxisId) {
    let mut g = Graph::new();
    let f = g.axis_var_with_length("F", 3);
    let o = g.axis_var_with_length("O", 2);
    let n = g.axis_var("N");
    g.set_batch_axes(&[n]);
    (g, f, o, n)
}

fn axes(g: &Graph, id: NodeId) -> Vec<AxisId> {
    g.axes(id).unwrap().as_slice().to_vec()
}

#[test]
fn test_elementwise_takes_larger_operand_order() {
    let (mut g, f, _o, n) = setup();
    let x = g.input("x", &[f, n]).unwrap();
    let b = g.input("b", &[f]).unwrap();
    let c = g.constant(2.0);

    let left = add(&mut g, b, x).unwrap();
    assert_eq!(axes(&g, left), vec![f, n]);
    let right = mul(&mut g, x, c).unwrap();
    assert_eq!(axes(&g, right), vec![f, n]);

    let swapped = g.input("swapped", &[n, f]).unwrap();
    let same_set = sub(&mut g, swapped, x).unwrap();
    assert_eq!(axes(&g, same_set), vec![n, f]);
}

#[test]
fn test_elementwise_disjoint_axes_fail() {
    let (mut g, f, o, _n) = setup();
    let a = g.input("a", &[f]).unwrap();
    let b = g.input("b", &[o]).unwrap();
    let before = g.len();
    let err = add(&mut g, a, b).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Shape);
    assert!(matches!(err, GeonError::ShapeMismatch { ref operation, .. } if operation == "add"));
    assert_eq!(g.len(), before, "failed construction must not add nodes");
}

#[test]
fn test_dot_contracts_shared_sample_axes() {
    let (mut g, f, o, n) = setup();
    let x = g.input("x", &[f, n]).unwrap();
    let w = g.input("w", &[o, f]).unwrap();
    let y = dot(&mut g, w, x).unwrap();
    assert_eq!(axes(&g, y), vec![o, n]);
    match g.node(y).unwrap().kind() {
        NodeKind::Op(Op::Dot { contracted }) => assert_eq!(contracted.as_slice(), &[f]),
        other => panic!("unexpected node kind {:?}", other),
    }
}

#[test]
fn test_dot_keeps_shared_batch_axes() {
    let (mut g, f, _o, n) = setup();
    let x = g.input("x", &[f, n]).unwrap();
    let y = dot(&mut g, x, x).unwrap();
    assert_eq!(axes(&g, y), vec![n]);
}

#[test]
fn test_dot_without_common_axis_fails() {
    let (mut g, f, o, _n) = setup();
    let a = g.input("a", &[f]).unwrap();
    let b = g.input("b", &[o]).unwrap();
    let err = dot(&mut g, a, b).unwrap_err();
    assert!(matches!(err, GeonError::MissingContraction { .. }));
    assert!(err.is_shape_error());
}

#[test]
fn test_reduce_to_and_broadcast_to() {
    let (mut g, f, o, n) = setup();
    let x = g.input("x", &[f, n]).unwrap();

    let own = g.axes(x).unwrap().clone();
    assert_eq!(reduce_to(&mut g, x, own).unwrap(), x);
    let total = sum(&mut g, x).unwrap();
    assert!(g.axes(total).unwrap().is_empty());

    let reordered = reduce_to(&mut g, x, Axes::new(&[n, f]).unwrap()).unwrap();
    assert_ne!(reordered, x);
    assert_eq!(axes(&g, reordered), vec![n, f]);

    assert!(reduce_to(&mut g, x, Axes::from(o)).is_err());

    let wide = broadcast_to(&mut g, total, Axes::new(&[o, n]).unwrap()).unwrap();
    assert_eq!(axes(&g, wide), vec![o, n]);
    assert!(broadcast_to(&mut g, x, Axes::from(f)).is_err());
}

#[test]
fn test_softmax_normalizes_per_batch_position() {
    let (mut g, f, _o, n) = setup();
    let x = g.input("x", &[f, n]).unwrap();
    let y = softmax(&mut g, x).unwrap();
    assert_eq!(axes(&g, y), vec![f, n]);
    let denominator = g.node(y).unwrap().operands()[1];
    assert_eq!(axes(&g, denominator), vec![n]);
}

#[test]
fn test_cross_entropy_and_l2_are_scalar_per_batch() {
    let (mut g, f, _o, n) = setup();
    let y = g.input("y", &[f, n]).unwrap();
    let t = g.input("t", &[f, n]).unwrap();
    let ce = cross_entropy(&mut g, y, t).unwrap();
    assert!(g.axes(ce).unwrap().is_empty());

    let w = g.input("w", &[f]).unwrap();
    let norm = l2(&mut g, w).unwrap();
    assert!(g.axes(norm).unwrap().is_empty());
}

#[test]
fn test_linear_map_axes() {
    let (g, f, o, _n) = setup();
    let w = linear_map_axes(&g, &Axes::from(f), &Axes::from(o)).unwrap();
    assert_eq!(w.as_slice(), &[o, f]);
    assert!(linear_map_axes(&g, &Axes::from(f), &Axes::from(f)).is_err());
}

#[test]
fn test_ops_reject_valueless_operands() {
    let (mut g, f, _o, _n) = setup();
    let x = g.input("x", &[f]).unwrap();
    let group = g.push(NodeKind::DoAll, Axes::scalar(), Vec::new());
    let err = add(&mut g, x, group).unwrap_err();
    assert!(matches!(err, GeonError::NoValue { .. }));
    let axis_node = g.axis_node(f).unwrap();
    assert!(neg(&mut g, axis_node).is_err());
}
