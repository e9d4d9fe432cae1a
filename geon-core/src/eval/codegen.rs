//! Code-generating evaluator.
//!
//! The result list is compiled once into a [`Program`]: a flat list of
//! statements writing into numbered buffer slots. A liveness pass hands a
//! slot back as soon as the last statement reading it has run, so the
//! program needs far fewer slots than the graph has nodes. The same program
//! can be rendered as NumPy source or run directly with the shared kernels,
//! which keeps it in lockstep with the [`Interpreter`](super::Interpreter).

use std::collections::HashMap;

use log::debug;

use crate::array::Array;
use crate::axis::{AxisId, Axes};
use crate::env::Environment;
use crate::error::GeonError;
use crate::eval::{kernels, schedule, Bindings, Evaluator, Values};
use crate::graph::{Graph, NodeId, NodeKind};
use crate::ops::Op;

const AXIS_LETTERS: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

const PRELUDE: &str = r#"import numpy as np


def align(x, src, dst):
    """Lays x out over the axes dst, with length-1 entries for axes x lacks."""
    kept = ''.join(a for a in dst if a in src)
    x = np.einsum(src + '->' + kept, x)
    return x.reshape(tuple(x.shape[kept.index(a)] if a in kept else 1 for a in dst))
"#;

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    LoadInput { slot: usize, node: NodeId },
    /// Copies the parameter's current value into `slot`.
    LoadParameter { slot: usize, node: NodeId },
    Fill { slot: usize, node: NodeId, value: f64 },
    Compute { slot: usize, node: NodeId, operands: Vec<usize> },
    /// Subtracts `step` from the parameter; always after every value statement.
    Decrement { param: NodeId, step: usize },
}

#[derive(Debug, Clone, Default)]
pub struct Program {
    statements: Vec<Statement>,
    slot_count: usize,
    result_slots: Vec<(NodeId, usize)>,
}

impl Program {
    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    /// Number of distinct buffer slots the program writes.
    pub fn slot_count(&self) -> usize {
        self.slot_count
    }

    pub fn result_slot(&self, id: NodeId) -> Option<usize> {
        self.result_slots.iter().find(|(r, _)| *r == id).map(|(_, s)| *s)
    }

    fn compile(graph: &Graph, results: &[NodeId]) -> Result<Program, GeonError> {
        let schedule = schedule(graph, results)?;

        // Position of the last statement reading each value.
        let mut last_use: HashMap<NodeId, usize> = HashMap::new();
        for (p, &id) in schedule.values.iter().enumerate() {
            for &operand in graph.node(id)?.operands() {
                last_use.insert(operand, p);
            }
        }
        for &id in results {
            last_use.insert(id, usize::MAX);
        }
        for &(_, step) in &schedule.updates {
            last_use.insert(step, usize::MAX);
        }

        let mut program = Program::default();
        let mut slot_of: HashMap<NodeId, usize> = HashMap::new();
        let mut free: Vec<usize> = Vec::new();

        for (p, &id) in schedule.values.iter().enumerate() {
            // Parameters only read by updates never need a slot.
            if !last_use.contains_key(&id) {
                continue;
            }
            let node = graph.node(id)?;
            let mut operand_slots = Vec::with_capacity(node.operands().len());
            let mut released: Vec<NodeId> = Vec::new();
            for &operand in node.operands() {
                let slot = *slot_of.get(&operand).ok_or_else(|| {
                    GeonError::CodeGen(format!("{} has no slot when {} reads it", operand, id))
                })?;
                operand_slots.push(slot);
                if last_use.get(&operand) == Some(&p) && !released.contains(&operand) {
                    released.push(operand);
                    free.push(slot);
                }
            }

            let slot = match free.pop() {
                Some(slot) => slot,
                None => {
                    program.slot_count += 1;
                    program.slot_count - 1
                }
            };
            slot_of.insert(id, slot);

            let statement = match node.kind() {
                NodeKind::Input { .. } => Statement::LoadInput { slot, node: id },
                NodeKind::Parameter { .. } => Statement::LoadParameter { slot, node: id },
                NodeKind::Constant(value) => Statement::Fill {
                    slot,
                    node: id,
                    value: *value,
                },
                NodeKind::Op(_) => Statement::Compute {
                    slot,
                    node: id,
                    operands: operand_slots,
                },
                _ => {
                    return Err(GeonError::CodeGen(format!(
                        "{} carries no value",
                        graph.label(id)
                    )))
                }
            };
            program.statements.push(statement);
        }

        for &(param, step) in &schedule.updates {
            let step = *slot_of
                .get(&step)
                .ok_or_else(|| GeonError::CodeGen(format!("Update step {} has no slot", step)))?;
            program.statements.push(Statement::Decrement { param, step });
        }
        for &id in results {
            if let Some(&slot) = slot_of.get(&id) {
                program.result_slots.push((id, slot));
            }
        }
        Ok(program)
    }
}

/// Compiles a result list to a [`Program`] and renders it as a NumPy
/// function `evaluate(inputs, params, dims)`.
///
/// The generated function reads input values by input name, parameters by
/// qualified name and axis lengths by axis name, so rendering fails when two
/// axes of the program share a name. It applies updates to
/// `params` in place and returns the results keyed by node id.
pub struct NumPyGenerator<'g> {
    graph: &'g Graph,
    results: Vec<NodeId>,
    program: Program,
    slots: Vec<Option<Array>>,
}

impl<'g> NumPyGenerator<'g> {
    pub fn new(graph: &'g Graph, results: &[NodeId]) -> Result<Self, GeonError> {
        let program = Program::compile(graph, results)?;
        debug!(
            "Compiled {} statements into {} slots",
            program.statements.len(),
            program.slot_count
        );
        Ok(NumPyGenerator {
            graph,
            results: results.to_vec(),
            slots: vec![None; program.slot_count],
            program,
        })
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    fn axis_letters(&self) -> Result<HashMap<AxisId, char>, GeonError> {
        let mut axes: Vec<AxisId> = Vec::new();
        for statement in &self.program.statements {
            let node = match statement {
                Statement::LoadInput { node, .. }
                | Statement::LoadParameter { node, .. }
                | Statement::Fill { node, .. }
                | Statement::Compute { node, .. } => *node,
                Statement::Decrement { param, .. } => *param,
            };
            let n = self.graph.node(node)?;
            axes.extend(n.axes().iter());
            if let NodeKind::Op(Op::Dot { contracted }) = n.kind() {
                axes.extend(contracted.iter());
            }
        }
        axes.sort_unstable();
        axes.dedup();
        // `dims` is keyed by axis name, so names must tell the axes apart.
        let mut seen: HashMap<String, AxisId> = HashMap::new();
        for &axis in &axes {
            let name = self.graph.registry().name(axis);
            if let Some(other) = seen.insert(name.clone(), axis) {
                return Err(GeonError::CodeGen(format!(
                    "{} and {} are both named '{}'",
                    other, axis, name
                )));
            }
        }
        if axes.len() > AXIS_LETTERS.len() {
            return Err(GeonError::CodeGen(format!(
                "{} distinct axes exceed the {} available subscripts",
                axes.len(),
                AXIS_LETTERS.len()
            )));
        }
        Ok(axes.into_iter().zip(AXIS_LETTERS.chars()).collect())
    }

    /// The program as Python source.
    pub fn source(&self) -> Result<String, GeonError> {
        let letters = self.axis_letters()?;
        let mut lines: Vec<String> = vec![PRELUDE.to_string(), String::new()];
        lines.push("def evaluate(inputs, params, dims):".to_string());
        for statement in &self.program.statements {
            lines.push(format!("    {}", self.render(statement, &letters)?));
        }
        lines.push("    return {".to_string());
        for &(id, slot) in &self.program.result_slots {
            lines.push(format!("        {:?}: s{},", id.to_string(), slot));
        }
        lines.push("    }".to_string());
        lines.push(String::new());
        Ok(lines.join("\n"))
    }

    fn render(&self, statement: &Statement, letters: &HashMap<AxisId, char>) -> Result<String, GeonError> {
        let graph = self.graph;
        let line = match statement {
            Statement::LoadInput { slot, node } => match graph.node(*node)?.kind() {
                NodeKind::Input { name } => {
                    format!("s{} = np.asarray(inputs[{:?}], dtype=np.float64)", slot, name)
                }
                _ => return Err(GeonError::CodeGen(format!("{} is not an input", node))),
            },
            Statement::LoadParameter { slot, node } => format!(
                "s{} = np.array(params[{:?}], dtype=np.float64)",
                slot,
                graph.parameter_name(*node)?
            ),
            Statement::Fill { slot, node, value } => format!(
                "s{} = np.full({}, {})",
                slot,
                shape_expr(graph, graph.axes(*node)?),
                format_f64(*value)
            ),
            Statement::Decrement { param, step } => {
                let name = graph.parameter_name(*param)?;
                format!("params[{:?}] = params[{:?}] - s{}", name, name, step)
            }
            Statement::Compute {
                slot,
                node,
                operands,
            } => format!("s{} = {}", slot, self.render_op(*node, operands, letters)?),
        };
        Ok(line)
    }

    fn render_op(
        &self,
        id: NodeId,
        operand_slots: &[usize],
        letters: &HashMap<AxisId, char>,
    ) -> Result<String, GeonError> {
        let graph = self.graph;
        let node = graph.node(id)?;
        let op = match node.kind() {
            NodeKind::Op(op) => op,
            _ => return Err(GeonError::CodeGen(format!("{} is not an op", graph.label(id)))),
        };
        let out = node.axes();
        let subs = |axes: &Axes| -> Result<String, GeonError> {
            axes.iter()
                .map(|a| {
                    letters
                        .get(&a)
                        .copied()
                        .ok_or_else(|| GeonError::CodeGen(format!("No subscript for {}", a)))
                })
                .collect()
        };
        let mut args = Vec::with_capacity(operand_slots.len());
        for (&operand, &slot) in node.operands().iter().zip(operand_slots) {
            args.push((graph.axes(operand)?, slot));
        }
        let arg = |i: usize| -> Result<(&Axes, usize), GeonError> {
            args.get(i)
                .copied()
                .ok_or_else(|| GeonError::CodeGen(format!("{} is missing operand {}", id, i)))
        };
        let aligned = |i: usize| -> Result<String, GeonError> {
            let (axes, slot) = arg(i)?;
            if axes == out {
                Ok(format!("s{}", slot))
            } else {
                Ok(format!("align(s{}, '{}', '{}')", slot, subs(axes)?, subs(out)?))
            }
        };

        let expr = match op {
            Op::Add => format!("np.add({}, {})", aligned(0)?, aligned(1)?),
            Op::Sub => format!("np.subtract({}, {})", aligned(0)?, aligned(1)?),
            Op::Mul => format!("np.multiply({}, {})", aligned(0)?, aligned(1)?),
            Op::Div => format!("np.divide({}, {})", aligned(0)?, aligned(1)?),
            Op::Neg => format!("np.negative(s{})", arg(0)?.1),
            Op::Log => format!("np.log(s{})", arg(0)?.1),
            Op::Exp => format!("np.exp(s{})", arg(0)?.1),
            Op::Tanh => format!("np.tanh(s{})", arg(0)?.1),
            Op::Dot { .. } => {
                let (a_axes, a) = arg(0)?;
                let (b_axes, b) = arg(1)?;
                format!(
                    "np.einsum('{},{}->{}', s{}, s{})",
                    subs(a_axes)?,
                    subs(b_axes)?,
                    subs(out)?,
                    a,
                    b
                )
            }
            Op::ReduceTo => {
                let (x_axes, x) = arg(0)?;
                format!("np.einsum('{}->{}', s{})", subs(x_axes)?, subs(out)?, x)
            }
            Op::Broadcast => format!(
                "np.broadcast_to({}, {}).copy()",
                aligned(0)?,
                shape_expr(graph, out)
            ),
        };
        Ok(expr)
    }

    fn run(&mut self, env: &mut Environment, bindings: &Bindings) -> Result<(), GeonError> {
        let graph = self.graph;
        for statement in &self.program.statements {
            match statement {
                Statement::LoadInput { slot, node } => {
                    self.slots[*slot] = Some(bindings.resolve(graph, *node)?.clone());
                }
                Statement::LoadParameter { slot, node } => {
                    self.slots[*slot] = Some(env.materialize(graph, *node)?.clone());
                }
                Statement::Fill { slot, node, value } => {
                    let shape = graph.registry().lengths(graph.axes(*node)?)?;
                    self.slots[*slot] = Some(Array::full(&shape, *value));
                }
                Statement::Compute {
                    slot,
                    node,
                    operands,
                } => {
                    let n = graph.node(*node)?;
                    let op = match n.kind() {
                        NodeKind::Op(op) => op,
                        _ => return Err(GeonError::CodeGen(format!("{} is not an op", node))),
                    };
                    let value = {
                        let inputs = operands
                            .iter()
                            .map(|&s| filled(&self.slots, s))
                            .collect::<Result<Vec<&Array>, GeonError>>()?;
                        kernels::apply(graph, *node, n, op, &inputs)?
                    };
                    self.slots[*slot] = Some(value);
                }
                Statement::Decrement { param, step } => {
                    env.decrement(graph, *param, filled(&self.slots, *step)?)?;
                }
            }
        }
        Ok(())
    }
}

fn filled(slots: &[Option<Array>], slot: usize) -> Result<&Array, GeonError> {
    slots
        .get(slot)
        .and_then(|s| s.as_ref())
        .ok_or_else(|| GeonError::CodeGen(format!("Slot s{} read before it was written", slot)))
}

fn shape_expr(graph: &Graph, axes: &Axes) -> String {
    let dims: Vec<String> = graph
        .axis_names(axes)
        .iter()
        .map(|name| format!("dims[{:?}]", name))
        .collect();
    match dims.len() {
        0 => "()".to_string(),
        1 => format!("({},)", dims[0]),
        _ => format!("({})", dims.join(", ")),
    }
}

fn format_f64(value: f64) -> String {
    if value.is_nan() {
        "float('nan')".to_string()
    } else if value.is_infinite() {
        if value.is_sign_negative() {
            "-float('inf')".to_string()
        } else {
            "float('inf')".to_string()
        }
    } else {
        format!("{:?}", value)
    }
}

impl Evaluator for NumPyGenerator<'_> {
    fn results(&self) -> &[NodeId] {
        &self.results
    }

    fn evaluate(&mut self, env: &mut Environment, bindings: &Bindings) -> Result<Values, GeonError> {
        let outcome = self.run(env, bindings);
        let mut values = Values::default();
        if outcome.is_ok() {
            for &(id, slot) in &self.program.result_slots {
                values.insert(id, filled(&self.slots, slot)?.clone());
            }
        }
        self.slots.iter_mut().for_each(|s| *s = None);
        outcome.map(|_| values)
    }
}

#[cfg(test)]
#[path = "codegen_test.rs"]
mod tests;
