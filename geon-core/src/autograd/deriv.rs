use std::collections::HashMap;

use log::{debug, warn};

use crate::error::GeonError;
use crate::graph::{Graph, NodeId};
use crate::ops;

/// Gradient node of every node a loss depends on.
///
/// Built once per loss in a single reverse sweep and kept by the graph, so
/// asking for several derivatives of the same loss shares all intermediate
/// gradient nodes.
#[derive(Debug, Clone, Default)]
pub(crate) struct GradientTable {
    adjoints: HashMap<NodeId, NodeId>,
}

impl GradientTable {
    fn get(&self, node: NodeId) -> Option<NodeId> {
        self.adjoints.get(&node).copied()
    }
}

impl Graph {
    /// Node holding d`loss`/d`target`, with the axes of `target`.
    ///
    /// A target the loss does not depend on gets a zero node. A loss with
    /// axes is differentiated as the sum of its elements.
    pub fn deriv(&mut self, loss: NodeId, target: NodeId) -> Result<NodeId, GeonError> {
        self.value_operand(target, "deriv")?;
        if !self.gradients.contains_key(&loss) {
            let table = self.build_gradient_table(loss)?;
            self.gradients.insert(loss, table);
        }
        if let Some(grad) = self.gradients.get(&loss).and_then(|t| t.get(target)) {
            return Ok(grad);
        }

        warn!(
            "{} does not depend on {}; its derivative is zero",
            self.label(loss),
            self.label(target)
        );
        let axes = self.axes(target)?.clone();
        let zero = self.fill(0.0, axes);
        if let Some(table) = self.gradients.get_mut(&loss) {
            table.adjoints.insert(target, zero);
        }
        Ok(zero)
    }

    /// [`Graph::deriv`] for several targets, in order.
    pub fn derivs(&mut self, loss: NodeId, targets: &[NodeId]) -> Result<Vec<NodeId>, GeonError> {
        targets.iter().map(|&t| self.deriv(loss, t)).collect()
    }

    fn build_gradient_table(&mut self, loss: NodeId) -> Result<GradientTable, GeonError> {
        let loss_axes = self.value_operand(loss, "deriv")?.axes().clone();
        let order = self.topological_order(&[loss])?;

        let mut pending: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
        let seed = self.fill(1.0, loss_axes);
        pending.insert(loss, vec![seed]);

        let mut table = GradientTable::default();
        // Every consumer of a node has a larger id, so all its contributions
        // are in `pending` by the time the reverse sweep reaches it.
        for &id in order.iter().rev() {
            let contributions = match pending.remove(&id) {
                Some(contributions) => contributions,
                None => continue,
            };
            let grad = self.accumulate(contributions)?;
            table.adjoints.insert(id, grad);

            let operands = self.node(id)?.operands().to_vec();
            if operands.is_empty() {
                continue;
            }
            let operand_grads = ops::backward(self, id, grad)?;
            for (operand, operand_grad) in operands.into_iter().zip(operand_grads) {
                pending.entry(operand).or_default().push(operand_grad);
            }
        }
        debug!(
            "Built gradient table of {} over {} nodes",
            self.label(loss),
            table.adjoints.len()
        );
        Ok(table)
    }

    fn accumulate(&mut self, contributions: Vec<NodeId>) -> Result<NodeId, GeonError> {
        let mut iter = contributions.into_iter();
        let first = iter
            .next()
            .ok_or_else(|| GeonError::InternalError("Empty gradient contribution list".to_string()))?;
        iter.try_fold(first, |acc, grad| ops::add(self, acc, grad))
    }
}

#[cfg(test)]
#[path = "deriv_test.rs"]
mod tests;
