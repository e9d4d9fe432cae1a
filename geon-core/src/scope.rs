//! Hierarchical name scopes and the parameter namespace.
//!
//! A scope is entered for the duration of a closure and always exited when
//! the closure returns. Each scope path owns a [`Scope`], a plain mapping
//! from key to node, so helpers can store and look up what they built.
//! Parameters are named by the path of the scopes enclosing their creation;
//! asking for the same qualified name again returns the same node.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use log::debug;

use crate::axis::{AxisId, Axes};
use crate::error::GeonError;
use crate::graph::{Graph, NodeId, NodeKind};
use crate::nn::init::Initializer;

const SEPARATOR: char = '/';

/// Named nodes recorded under one scope path.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    entries: BTreeMap<String, NodeId>,
}

impl Scope {
    pub fn get(&self, key: &str) -> Option<NodeId> {
        self.entries.get(key).copied()
    }

    pub fn set(&mut self, key: &str, node: NodeId) {
        self.entries.insert(key.to_string(), node);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, NodeId)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Default)]
pub(crate) struct ScopeStack {
    path: Vec<String>,
    scopes: HashMap<String, Scope>,
    parameters: HashMap<String, NodeId>,
}

impl ScopeStack {
    fn current_path(&self) -> String {
        self.path.join("/")
    }

    fn qualify(&self, name: &str) -> String {
        if self.path.is_empty() {
            name.to_string()
        } else {
            format!("{}{}{}", self.current_path(), SEPARATOR, name)
        }
    }
}

/// Numbered sibling scopes: `L0`, `L1`, ...
#[derive(Debug, Clone)]
pub struct ScopeList {
    prefix: String,
    next: usize,
}

impl ScopeList {
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Number of scopes handed out so far.
    pub fn count(&self) -> usize {
        self.next
    }
}

fn check_segment(name: &str) -> Result<(), GeonError> {
    if name.is_empty() || name.contains(SEPARATOR) {
        return Err(GeonError::InternalError(format!(
            "Invalid scope or parameter name '{}'",
            name
        )));
    }
    Ok(())
}

impl Graph {
    /// Path of the current scope, `""` at the root.
    pub fn scope_path(&self) -> String {
        self.scopes.current_path()
    }

    /// `name` qualified by the current scope path.
    pub fn qualified_name(&self, name: &str) -> String {
        self.scopes.qualify(name)
    }

    /// Runs `body` inside the child scope `name`. The scope is exited when
    /// `body` returns, whether it succeeded or not.
    pub fn with_name_scope<R, F>(&mut self, name: &str, body: F) -> Result<R, GeonError>
    where
        F: FnOnce(&mut Graph) -> Result<R, GeonError>,
    {
        check_segment(name)?;
        self.scopes.path.push(name.to_string());
        let result = body(self);
        self.scopes.path.pop();
        result
    }

    pub fn name_scope_list(&self, prefix: &str) -> ScopeList {
        ScopeList {
            prefix: prefix.to_string(),
            next: 0,
        }
    }

    /// Runs `body` inside the next numbered scope of `list`.
    pub fn with_next_scope<R, F>(&mut self, list: &mut ScopeList, body: F) -> Result<R, GeonError>
    where
        F: FnOnce(&mut Graph) -> Result<R, GeonError>,
    {
        let name = format!("{}{}", list.prefix, list.next);
        list.next += 1;
        self.with_name_scope(&name, body)
    }

    /// The scope recorded under `path` (as returned by [`Graph::scope_path`]).
    pub fn scope(&self, path: &str) -> Option<&Scope> {
        self.scopes.scopes.get(path)
    }

    pub fn scope_get(&self, key: &str) -> Option<NodeId> {
        self.scope(&self.scope_path()).and_then(|s| s.get(key))
    }

    pub fn scope_set(&mut self, key: &str, node: NodeId) -> Result<(), GeonError> {
        check_segment(key)?;
        self.node(node)?;
        let path = self.scope_path();
        self.scopes.scopes.entry(path).or_default().set(key, node);
        Ok(())
    }

    /// Parameter `name` of the current scope.
    ///
    /// The first call creates it; later calls resolving to the same qualified
    /// name return the same node if `axes` match, and fail otherwise.
    pub fn parameter(
        &mut self,
        name: &str,
        axes: Axes,
        init: Arc<dyn Initializer>,
    ) -> Result<NodeId, GeonError> {
        check_segment(name)?;
        let qualified = self.qualified_name(name);
        if let Some(&existing) = self.scopes.parameters.get(&qualified) {
            let existing_axes = self.axes(existing)?;
            if *existing_axes != axes {
                return Err(GeonError::NameCollision {
                    name: qualified,
                    existing: self.axis_names(existing_axes),
                    requested: self.axis_names(&axes),
                });
            }
            debug!("Reusing parameter {}", qualified);
            return Ok(existing);
        }
        let id = self.push(
            NodeKind::Parameter {
                name: qualified.clone(),
                init,
            },
            axes,
            Vec::new(),
        );
        debug!("Created parameter {} as {}", qualified, id);
        self.scopes.parameters.insert(qualified, id);
        self.scope_set(name, id)?;
        Ok(id)
    }

    /// Looks up a parameter by its fully qualified name.
    pub fn parameter_by_name(&self, qualified: &str) -> Option<NodeId> {
        self.scopes.parameters.get(qualified).copied()
    }

    /// An axis stored under `key` in the current scope, created like `like`
    /// on first use. Rebuilding a layer in the same scope reuses it.
    pub fn scoped_axis(
        &mut self,
        key: &str,
        like: AxisId,
        length: Option<usize>,
    ) -> Result<AxisId, GeonError> {
        if let Some(node) = self.scope_get(key) {
            let declared = match self.node(node)?.kind() {
                NodeKind::AxisVariable(axis) => Some(*axis),
                _ => None,
            };
            if let Some(axis) = declared {
                if let Some(length) = length {
                    self.set_axis_length(axis, length)?;
                }
                return Ok(axis);
            }
            return Err(GeonError::InternalError(format!(
                "Scope entry '{}' is {}, not an axis",
                key,
                self.label(node)
            )));
        }
        let axis = self.axis_like(like, length)?;
        let node = self
            .axis_node(axis)
            .ok_or_else(|| GeonError::InternalError(format!("No node declares {}", axis)))?;
        self.scope_set(key, node)?;
        Ok(axis)
    }
}

#[cfg(test)]
#[path = "scope_test.rs"]
mod tests;
