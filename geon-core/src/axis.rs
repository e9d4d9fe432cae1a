//! Axis identities, the axis registry and the set algebra over axis tuples.
//!
//! An axis is an identity, not a size: two axes are the same axis iff they
//! share an [`AxisId`]. Lengths are tracked separately by the
//! [`AxisRegistry`] and may be bound late (e.g. once the batch size is known),
//! but only once.

use crate::error::GeonError;
use std::fmt;

/// Identity of one logical dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AxisId(usize);

impl AxisId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for AxisId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "axis#{}", self.0)
    }
}

/// Registry entry for one axis.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisInfo {
    pub name: String,
    pub length: Option<usize>,
    /// The axis this one was cloned from with [`AxisRegistry::create_like`].
    pub like: Option<AxisId>,
}

/// Ordered tuple of distinct axes describing a node's dimensionality.
///
/// The order is the memory layout of values (row-major); the set is what
/// shape inference reasons about.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Axes(Vec<AxisId>);

impl Axes {
    /// The zero-axis (scalar) shape.
    pub fn scalar() -> Self {
        Axes(Vec::new())
    }

    /// Builds an axis tuple, rejecting repeated axes.
    pub fn new(ids: &[AxisId]) -> Result<Self, AxisId> {
        let mut out = Vec::with_capacity(ids.len());
        for &id in ids {
            if out.contains(&id) {
                return Err(id);
            }
            out.push(id);
        }
        Ok(Axes(out))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = AxisId> + '_ {
        self.0.iter().copied()
    }

    pub fn as_slice(&self) -> &[AxisId] {
        &self.0
    }

    pub fn contains(&self, axis: AxisId) -> bool {
        self.0.contains(&axis)
    }

    pub fn position(&self, axis: AxisId) -> Option<usize> {
        self.0.iter().position(|&a| a == axis)
    }

    /// Axes of `self` followed by the axes of `other` not already present.
    pub fn union(&self, other: &Axes) -> Axes {
        let mut out = self.0.clone();
        out.extend(other.iter().filter(|a| !self.contains(*a)));
        Axes(out)
    }

    /// Axes of `self` also present in `other`, in `self`'s order.
    pub fn intersection(&self, other: &Axes) -> Axes {
        Axes(self.iter().filter(|a| other.contains(*a)).collect())
    }

    /// Axes of `self` not present in `other`, in `self`'s order.
    pub fn difference(&self, other: &Axes) -> Axes {
        Axes(self.iter().filter(|a| !other.contains(*a)).collect())
    }

    pub fn symmetric_difference(&self, other: &Axes) -> Axes {
        self.difference(other).union(&other.difference(self))
    }

    pub fn is_subset(&self, other: &Axes) -> bool {
        self.iter().all(|a| other.contains(a))
    }

    /// True when both tuples hold the same axes, regardless of order.
    pub fn same_set(&self, other: &Axes) -> bool {
        self.len() == other.len() && self.is_subset(other)
    }
}

impl From<AxisId> for Axes {
    fn from(axis: AxisId) -> Self {
        Axes(vec![axis])
    }
}

/// Identity and length tracking for every axis of a graph, plus the set of
/// axes designated as batch axes.
#[derive(Debug, Clone, Default)]
pub struct AxisRegistry {
    axes: Vec<AxisInfo>,
    batch: Vec<AxisId>,
}

impl AxisRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a fresh axis identity.
    pub fn create(&mut self, name: impl Into<String>, length: Option<usize>) -> AxisId {
        let id = AxisId(self.axes.len());
        self.axes.push(AxisInfo {
            name: name.into(),
            length,
            like: None,
        });
        id
    }

    /// Creates a new axis playing the same role as `like`, without aliasing it.
    pub fn create_like(&mut self, like: AxisId, length: Option<usize>) -> Result<AxisId, GeonError> {
        let base = self.info(like)?.name.clone();
        let clones = self.axes.iter().filter(|a| a.like == Some(like)).count();
        let id = AxisId(self.axes.len());
        self.axes.push(AxisInfo {
            name: format!("{}_{}", base, clones + 1),
            length,
            like: Some(like),
        });
        Ok(id)
    }

    pub fn info(&self, axis: AxisId) -> Result<&AxisInfo, GeonError> {
        self.axes
            .get(axis.0)
            .ok_or_else(|| GeonError::InternalError(format!("{} is not registered", axis)))
    }

    pub fn name(&self, axis: AxisId) -> String {
        match self.axes.get(axis.0) {
            Some(info) => info.name.clone(),
            None => axis.to_string(),
        }
    }

    pub fn names(&self, axes: &Axes) -> Vec<String> {
        axes.iter().map(|a| self.name(a)).collect()
    }

    pub fn length(&self, axis: AxisId) -> Option<usize> {
        self.axes.get(axis.0).and_then(|info| info.length)
    }

    /// Binds the length of an axis. Rebinding to the same length is a no-op;
    /// rebinding to a different length is an error.
    pub fn set_length(&mut self, axis: AxisId, length: usize) -> Result<(), GeonError> {
        let name = self.name(axis);
        let info = self
            .axes
            .get_mut(axis.0)
            .ok_or_else(|| GeonError::InternalError(format!("{} is not registered", axis)))?;
        match info.length {
            Some(bound) if bound != length => Err(GeonError::AxisLengthConflict {
                axis: name,
                bound,
                requested: length,
            }),
            _ => {
                info.length = Some(length);
                Ok(())
            }
        }
    }

    /// Resolves the lengths of an axis tuple, failing on the first unbound axis.
    pub fn lengths(&self, axes: &Axes) -> Result<Vec<usize>, GeonError> {
        axes.iter()
            .map(|a| {
                self.length(a)
                    .ok_or_else(|| GeonError::UnboundAxis { axis: self.name(a) })
            })
            .collect()
    }

    /// Replaces the batch-axis set. Already-built shapes are not revisited.
    pub fn set_batch_axes(&mut self, axes: &[AxisId]) {
        self.batch = axes.to_vec();
    }

    pub fn batch_axes(&self) -> &[AxisId] {
        &self.batch
    }

    pub fn is_batch(&self, axis: AxisId) -> bool {
        self.batch.contains(&axis)
    }

    /// `axes` without the batch axes.
    pub fn sample_axes(&self, axes: &Axes) -> Axes {
        Axes(axes.iter().filter(|a| !self.is_batch(*a)).collect())
    }

    /// Only the batch axes of `axes`.
    pub fn batch_axes_of(&self, axes: &Axes) -> Axes {
        Axes(axes.iter().filter(|a| self.is_batch(*a)).collect())
    }

    pub fn len(&self) -> usize {
        self.axes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.axes.is_empty()
    }
}

#[cfg(test)]
#[path = "axis_test.rs"]
mod tests;
