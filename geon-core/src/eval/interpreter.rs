use std::collections::HashMap;

use log::debug;

use crate::array::Array;
use crate::env::Environment;
use crate::error::GeonError;
use crate::eval::{kernels, schedule, Bindings, Evaluator, Schedule, Values};
use crate::graph::{Graph, NodeId, NodeKind};

/// Eager evaluator: walks the dependency closure of the results in
/// topological order, computing each node from its operands' values.
pub struct Interpreter<'g> {
    graph: &'g Graph,
    results: Vec<NodeId>,
    schedule: Schedule,
}

impl<'g> Interpreter<'g> {
    pub fn new(graph: &'g Graph, results: &[NodeId]) -> Result<Self, GeonError> {
        let schedule = schedule(graph, results)?;
        debug!(
            "Interpreter over {} value nodes and {} updates",
            schedule.values.len(),
            schedule.updates.len()
        );
        Ok(Interpreter {
            graph,
            results: results.to_vec(),
            schedule,
        })
    }

    fn compute(
        &self,
        id: NodeId,
        computed: &HashMap<NodeId, Array>,
        env: &mut Environment,
        bindings: &Bindings,
    ) -> Result<Array, GeonError> {
        let graph = self.graph;
        let node = graph.node(id)?;
        match node.kind() {
            NodeKind::Input { .. } => Ok(bindings.resolve(graph, id)?.clone()),
            // A copy, so updates at the end of the round do not alias it.
            NodeKind::Parameter { .. } => Ok(env.materialize(graph, id)?.clone()),
            NodeKind::Constant(value) => {
                let shape = graph.registry().lengths(node.axes())?;
                Ok(Array::full(&shape, *value))
            }
            NodeKind::Op(op) => {
                let operands = node
                    .operands()
                    .iter()
                    .map(|o| {
                        computed.get(o).ok_or_else(|| {
                            GeonError::InternalError(format!("{} evaluated before its operand {}", id, o))
                        })
                    })
                    .collect::<Result<Vec<&Array>, GeonError>>()?;
                kernels::apply(graph, id, node, op, &operands)
            }
            NodeKind::AxisVariable(_) | NodeKind::Update | NodeKind::DoAll => Err(GeonError::NoValue {
                node: graph.label(id),
                operation: "evaluate".to_string(),
            }),
        }
    }
}

impl Evaluator for Interpreter<'_> {
    fn results(&self) -> &[NodeId] {
        &self.results
    }

    fn evaluate(&mut self, env: &mut Environment, bindings: &Bindings) -> Result<Values, GeonError> {
        let mut computed: HashMap<NodeId, Array> = HashMap::with_capacity(self.schedule.values.len());
        for &id in &self.schedule.values {
            let value = self.compute(id, &computed, env, bindings)?;
            computed.insert(id, value);
        }

        for &(param, step) in &self.schedule.updates {
            let step_value = computed.get(&step).ok_or_else(|| {
                GeonError::InternalError(format!("Update step {} was not computed", step))
            })?;
            env.decrement(self.graph, param, step_value)?;
        }

        let mut values = Values::default();
        for &id in &self.results {
            if let Some(value) = computed.get(&id) {
                values.insert(id, value.clone());
            }
        }
        Ok(values)
    }
}
