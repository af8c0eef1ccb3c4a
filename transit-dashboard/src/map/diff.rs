//! Keyed marker reconciliation.
//!
//! Compares the markers currently placed against the placements a new
//! station set asks for, producing the minimal add/remove/replace/keep sets.

use std::collections::{HashMap, HashSet};

use crate::domain::{Coordinate, StationId};

use super::backend::MarkerLabel;

/// Where a marker sits and what it says.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub position: Coordinate,
    pub label: MarkerLabel,
}

/// Result of diffing placed markers against desired placements.
///
/// Every id appears in exactly one list; lists are sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkerDiff {
    /// Desired, not yet placed.
    pub add: Vec<StationId>,
    /// Placed, no longer desired.
    pub remove: Vec<StationId>,
    /// Placed and desired, but the position or label changed.
    pub replace: Vec<StationId>,
    /// Placed and desired unchanged.
    pub keep: Vec<StationId>,
}

impl MarkerDiff {
    /// Diff `existing` placements against `desired` ones.
    pub fn compute<'a, I>(existing: I, desired: &HashMap<StationId, Placement>) -> Self
    where
        I: IntoIterator<Item = (&'a StationId, &'a Placement)>,
    {
        let mut diff = MarkerDiff::default();
        let mut seen = HashSet::new();

        for (id, placed) in existing {
            seen.insert(id);
            match desired.get(id) {
                None => diff.remove.push(id.clone()),
                Some(wanted) if wanted == placed => diff.keep.push(id.clone()),
                Some(_) => diff.replace.push(id.clone()),
            }
        }

        diff.add = desired
            .keys()
            .filter(|id| !seen.contains(id))
            .cloned()
            .collect();

        diff.add.sort();
        diff.remove.sort();
        diff.replace.sort();
        diff.keep.sort();
        diff
    }

    /// True when no marker has to be created or destroyed.
    pub fn is_noop(&self) -> bool {
        self.add.is_empty() && self.remove.is_empty() && self.replace.is_empty()
    }
}
