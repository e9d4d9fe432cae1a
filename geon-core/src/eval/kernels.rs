//! Value rules of every op, shared by all evaluators.
//!
//! Kernels work on dense row-major arrays. Axis identities are resolved into
//! strides up front: an operand lacking one of the iterated axes gets stride
//! 0 along it, which is all broadcasting needs.

use crate::array::{calculate_strides, Array};
use crate::axis::Axes;
use crate::error::GeonError;
use crate::graph::{Graph, Node, NodeId};
use crate::ops::Op;

/// Strides of an array laid out over `src` (with lengths `src_shape`) when
/// iterated along `dst`; zero along every `dst` axis `src` lacks.
fn aligned_strides(src: &Axes, src_shape: &[usize], dst: &Axes) -> Vec<usize> {
    let strides = calculate_strides(src_shape);
    dst.iter()
        .map(|axis| src.position(axis).map(|p| strides[p]).unwrap_or(0))
        .collect()
}

/// Calls `f` with the `K` offsets of every position of `shape`, in row-major
/// order, advancing each offset by its own strides.
fn for_each_position<const K: usize>(
    shape: &[usize],
    strides: [&[usize]; K],
    mut f: impl FnMut([usize; K]),
) {
    let numel: usize = shape.iter().product();
    if numel == 0 {
        return;
    }
    let rank = shape.len();
    let mut coords = vec![0usize; rank];
    let mut offsets = [0usize; K];
    for _ in 0..numel {
        f(offsets);
        for d in (0..rank).rev() {
            coords[d] += 1;
            for k in 0..K {
                offsets[k] += strides[k][d];
            }
            if coords[d] < shape[d] {
                break;
            }
            for k in 0..K {
                offsets[k] -= strides[k][d] * shape[d];
            }
            coords[d] = 0;
        }
    }
}

fn unary(x: &Array, shape: &[usize], f: impl Fn(f64) -> f64) -> Result<Array, GeonError> {
    Array::new(x.data().iter().map(|&v| f(v)).collect(), shape.to_vec())
}

fn elementwise(
    out_axes: &Axes,
    shape: &[usize],
    (a_axes, a): (&Axes, &Array),
    (b_axes, b): (&Axes, &Array),
    f: impl Fn(f64, f64) -> f64,
) -> Result<Array, GeonError> {
    let a_strides = aligned_strides(a_axes, a.shape(), out_axes);
    let b_strides = aligned_strides(b_axes, b.shape(), out_axes);
    let (a_data, b_data) = (a.data(), b.data());
    let mut data = Vec::with_capacity(shape.iter().product());
    for_each_position(shape, [&a_strides[..], &b_strides[..]], |[i, j]| {
        data.push(f(a_data[i], b_data[j]));
    });
    Array::new(data, shape.to_vec())
}

fn contract(
    out_axes: &Axes,
    shape: &[usize],
    contracted: &Axes,
    (a_axes, a): (&Axes, &Array),
    (b_axes, b): (&Axes, &Array),
) -> Result<Array, GeonError> {
    // Iterate over the result axes followed by the contracted ones.
    let mut full_shape = shape.to_vec();
    for axis in contracted.iter() {
        let p = a_axes.position(axis).ok_or_else(|| {
            GeonError::InternalError(format!("Contracted {} missing from left operand", axis))
        })?;
        full_shape.push(a.shape()[p]);
    }
    let full_axes = out_axes.union(contracted);
    let mut out_strides = calculate_strides(shape);
    out_strides.resize(full_shape.len(), 0);
    let a_strides = aligned_strides(a_axes, a.shape(), &full_axes);
    let b_strides = aligned_strides(b_axes, b.shape(), &full_axes);

    let mut out = Array::zeros(shape);
    let out_data = out.data_mut();
    let (a_data, b_data) = (a.data(), b.data());
    for_each_position(&full_shape, [&out_strides[..], &a_strides[..], &b_strides[..]], |[o, i, j]| {
        out_data[o] += a_data[i] * b_data[j];
    });
    Ok(out)
}

fn reduce(out_axes: &Axes, shape: &[usize], (x_axes, x): (&Axes, &Array)) -> Result<Array, GeonError> {
    let out_strides = aligned_strides(out_axes, shape, x_axes);
    let x_strides = calculate_strides(x.shape());
    let mut out = Array::zeros(shape);
    let out_data = out.data_mut();
    let x_data = x.data();
    for_each_position(x.shape(), [&x_strides[..], &out_strides[..]], |[i, o]| {
        out_data[o] += x_data[i];
    });
    Ok(out)
}

fn broadcast(out_axes: &Axes, shape: &[usize], (x_axes, x): (&Axes, &Array)) -> Result<Array, GeonError> {
    let x_strides = aligned_strides(x_axes, x.shape(), out_axes);
    let x_data = x.data();
    let mut data = Vec::with_capacity(shape.iter().product());
    for_each_position(shape, [&x_strides[..]], |[i]| data.push(x_data[i]));
    Array::new(data, shape.to_vec())
}

/// Computes the value of op node `node` (id `id`) from its operand values.
pub(crate) fn apply(graph: &Graph, id: NodeId, node: &Node, op: &Op, operands: &[&Array]) -> Result<Array, GeonError> {
    let out_axes = node.axes();
    let shape = graph.registry().lengths(out_axes)?;
    let operand_axes = node
        .operands()
        .iter()
        .map(|&o| graph.axes(o))
        .collect::<Result<Vec<&Axes>, GeonError>>()?;
    if operand_axes.len() != operands.len() {
        return Err(GeonError::InternalError(format!(
            "{} expects {} operand values, got {}",
            graph.label(id),
            operand_axes.len(),
            operands.len()
        )));
    }
    let arg = |i: usize| (operand_axes[i], operands[i]);

    match op {
        Op::Add => elementwise(out_axes, &shape, arg(0), arg(1), |a, b| a + b),
        Op::Sub => elementwise(out_axes, &shape, arg(0), arg(1), |a, b| a - b),
        Op::Mul => elementwise(out_axes, &shape, arg(0), arg(1), |a, b| a * b),
        Op::Div => elementwise(out_axes, &shape, arg(0), arg(1), |a, b| a / b),
        Op::Neg => unary(operands[0], &shape, |v| -v),
        Op::Log => unary(operands[0], &shape, f64::ln),
        Op::Exp => unary(operands[0], &shape, f64::exp),
        Op::Tanh => unary(operands[0], &shape, f64::tanh),
        Op::Dot { contracted } => contract(out_axes, &shape, contracted, arg(0), arg(1)),
        Op::ReduceTo => reduce(out_axes, &shape, arg(0)),
        Op::Broadcast => broadcast(out_axes, &shape, arg(0)),
    }
}

#[cfg(test)]
#[path = "kernels_test.rs"]
mod tests;
