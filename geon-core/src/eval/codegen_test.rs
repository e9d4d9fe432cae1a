use super::*;
use crate::nn::init::Constant;
use crate::ops;
use crate::optim;
use std::sync::Arc;

fn chain() -> (Graph, NodeId, NodeId) {
    let mut g = Graph::new();
    let f = g.axis_var_with_length("F", 4);
    let x = g.input("x", &[f]).unwrap();
    let mut value = x;
    for _ in 0..6 {
        value = ops::tanh(&mut g, value).unwrap();
    }
    (g, x, value)
}

#[test]
fn test_slots_are_reused_along_a_chain() {
    let (g, _x, y) = chain();
    let gen = NumPyGenerator::new(&g, &[y]).unwrap();
    let program = gen.program();
    assert_eq!(program.statements().len(), 7);
    assert!(program.slot_count() <= 2, "got {} slots", program.slot_count());
    assert!(program.result_slot(y).is_some());
}

#[test]
fn test_chain_runs_like_the_interpreter() {
    let (g, x, y) = chain();
    let mut bindings = Bindings::new();
    bindings.bind(x, Array::new(vec![-1.0, 0.0, 0.5, 2.0], vec![4]).unwrap());
    let mut env = Environment::new("test", 0);

    let mut gen = NumPyGenerator::new(&g, &[y]).unwrap();
    let generated = gen.evaluate(&mut env, &bindings).unwrap();
    let mut interp = crate::eval::Interpreter::new(&g, &[y]).unwrap();
    let interpreted = interp.evaluate(&mut env, &bindings).unwrap();
    assert_eq!(generated[y], interpreted[y]);
}

#[test]
fn test_source_uses_einsum_and_dims() {
    let mut g = Graph::new();
    let f = g.axis_var_with_length("F", 3);
    let o = g.axis_var_with_length("O", 2);
    let n = g.axis_var("N");
    g.set_batch_axes(&[n]);
    let x = g.input("x", &[f, n]).unwrap();
    let w = g
        .parameter("w", Axes::new(&[o, f]).unwrap(), Arc::new(Constant(0.0)))
        .unwrap();
    let y = ops::dot(&mut g, w, x).unwrap();
    let loss = ops::sum(&mut g, y).unwrap();
    let grad = g.deriv(loss, w).unwrap();
    let step = ops::scale(&mut g, 0.1, grad).unwrap();
    let update = optim::decrement(&mut g, w, step).unwrap();

    let gen = NumPyGenerator::new(&g, &[loss, update]).unwrap();
    let source = gen.source().unwrap();
    assert!(source.contains("def evaluate(inputs, params, dims):"));
    assert!(source.contains("np.einsum("));
    assert!(source.contains("inputs[\"x\"]"));
    assert!(source.contains("params[\"w\"] = params[\"w\"] - s"));
    assert!(source.contains("dims[\"N\"]"));

    let statements = gen.program().statements();
    assert!(matches!(statements.last(), Some(Statement::Decrement { .. })));
}

#[test]
fn test_scalar_fill_renders_empty_shape() {
    let mut g = Graph::new();
    let c = g.constant(1.5);
    let gen = NumPyGenerator::new(&g, &[c]).unwrap();
    let source = gen.source().unwrap();
    assert!(source.contains("np.full((), 1.5)"));
}

#[test]
fn test_source_statements_for_small_graph() {
    let mut g = Graph::new();
    let f = g.axis_var_with_length("F", 3);
    let o = g.axis_var_with_length("O", 2);
    let x = g.input("x", &[f]).unwrap();
    let w = g
        .parameter("w", Axes::new(&[o, f]).unwrap(), Arc::new(Constant(0.5)))
        .unwrap();
    let h = ops::dot(&mut g, w, x).unwrap();
    let shifted = ops::add(&mut g, w, x).unwrap();
    let spread = ops::broadcast_to(&mut g, h, Axes::new(&[o, f]).unwrap()).unwrap();
    let y = ops::mul(&mut g, shifted, spread).unwrap();
    let r = ops::reduce_to(&mut g, y, Axes::from(f)).unwrap();

    let mut gen = NumPyGenerator::new(&g, &[r]).unwrap();
    assert_eq!(gen.program().slot_count(), 3);
    let source = gen.source().unwrap();
    let body: Vec<&str> = source
        .lines()
        .skip_while(|line| *line != "def evaluate(inputs, params, dims):")
        .collect();
    assert_eq!(
        body,
        vec![
            "def evaluate(inputs, params, dims):",
            "    s0 = np.asarray(inputs[\"x\"], dtype=np.float64)",
            "    s1 = np.array(params[\"w\"], dtype=np.float64)",
            "    s2 = np.einsum('ba,a->b', s1, s0)",
            "    s0 = np.add(s1, align(s0, 'a', 'ba'))",
            "    s2 = np.broadcast_to(align(s2, 'b', 'ba'), (dims[\"O\"], dims[\"F\"])).copy()",
            "    s2 = np.multiply(s0, s2)",
            "    s2 = np.einsum('ba->a', s2)",
            "    return {",
            "        \"n8\": s2,",
            "    }",
        ]
    );

    let mut bindings = Bindings::new();
    bindings.bind(x, Array::new(vec![1.0, 2.0, 3.0], vec![3]).unwrap());
    let mut env = Environment::new("test", 0);
    let values = gen.evaluate(&mut env, &bindings).unwrap();
    assert_eq!(values[r].data(), &[9.0, 15.0, 21.0]);
}

#[test]
fn test_source_rejects_axes_sharing_a_name() {
    let mut g = Graph::new();
    let first = g.axis_var_with_length("N", 2);
    let second = g.axis_var_with_length("N", 3);
    let c = g.fill(1.0, Axes::new(&[first, second]).unwrap());

    let mut gen = NumPyGenerator::new(&g, &[c]).unwrap();
    let err = gen.source().unwrap_err();
    assert!(matches!(err, GeonError::CodeGen(_)), "got {:?}", err);

    // Running the program does not depend on axis names.
    let values = gen.evaluate(&mut Environment::new("test", 0), &Bindings::new()).unwrap();
    assert_eq!(values[c].shape(), &[2, 3]);
}
