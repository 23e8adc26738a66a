//! Merged relationship edges
//!
//! The assembled graph keeps at most one edge per unordered person pair.
//! When both a collaboration and a co-employment relationship exist for
//! the same pair, their attributes are merged onto one edge; the two
//! strengths stay independent scalars rather than being collapsed.

use super::types::{EdgeKind, EmployerId, PairKey};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Collaboration attributes for an edge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollaborationAttrs {
    pub strength: f64,
    pub shared_repo_count: u32,
    pub shared_contribution_count: u32,
}

/// One overlapping employment at a single employer.
///
/// `overlap_months` of None means the overlap is unknown (a missing start
/// date somewhere upstream), which is distinct from a known zero overlap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoemploymentStint {
    pub employer_id: EmployerId,
    pub overlap_months: Option<u32>,
    pub overlap_start: Option<NaiveDate>,
    pub overlap_end: Option<NaiveDate>,
}

/// Co-employment attributes for an edge: one stint per shared employer.
///
/// Strength is the sum of known overlap months across employers; unknown
/// overlaps keep their stint but contribute nothing to strength.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CoemploymentAttrs {
    pub strength: f64,
    pub stints: Vec<CoemploymentStint>,
}

impl CoemploymentAttrs {
    pub fn push_stint(&mut self, stint: CoemploymentStint) {
        if let Some(months) = stint.overlap_months {
            self.strength += months as f64;
        }
        self.stints.push(stint);
    }

    /// Total known overlap months across employers.
    pub fn total_overlap_months(&self) -> u32 {
        self.stints.iter().filter_map(|s| s.overlap_months).sum()
    }
}

/// An in-memory, attribute-merged relationship between two people
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationEdge {
    pub pair: PairKey,
    pub collaboration: Option<CollaborationAttrs>,
    pub coemployment: Option<CoemploymentAttrs>,
}

impl RelationEdge {
    pub fn new(pair: PairKey) -> Self {
        RelationEdge {
            pair,
            collaboration: None,
            coemployment: None,
        }
    }

    /// Contributing edge kinds, derived from the attribute blocks present.
    pub fn kinds(&self) -> Vec<EdgeKind> {
        let mut kinds = Vec::with_capacity(2);
        if self.collaboration.is_some() {
            kinds.push(EdgeKind::Collaboration);
        }
        if self.coemployment.is_some() {
            kinds.push(EdgeKind::Coemployment);
        }
        kinds
    }

    pub fn has_kind(&self, kind: EdgeKind) -> bool {
        match kind {
            EdgeKind::Collaboration => self.collaboration.is_some(),
            EdgeKind::Coemployment => self.coemployment.is_some(),
        }
    }

    /// Single-scalar view of the edge, used only where a combined score is
    /// explicitly required (feature vectors, export convenience).
    pub fn combined_strength(&self) -> f64 {
        self.collaboration.as_ref().map_or(0.0, |c| c.strength)
            + self.coemployment.as_ref().map_or(0.0, |c| c.strength)
    }
}
