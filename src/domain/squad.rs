use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use super::candidate::{Candidate, Position};

/// Matching rule that filled a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchTier {
    /// Candidate's primary position equals the slot
    Primary,
    /// Slot is in the candidate's alternate positions
    Alternate,
    /// Same position family (e.g. any wide attacker for LW)
    CategoryFallback,
}

/// One filled slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignedSlot {
    pub slot: Position,
    pub candidate: Candidate,
    pub tier: MatchTier,
}

/// Ordered slot assignments for one segment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SquadAssignment {
    pub slots: Vec<AssignedSlot>,
}

impl SquadAssignment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, slot: Position, candidate: Candidate, tier: MatchTier) {
        self.slots.push(AssignedSlot {
            slot,
            candidate,
            tier,
        });
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn candidates(&self) -> impl Iterator<Item = &Candidate> {
        self.slots.iter().map(|s| &s.candidate)
    }

    pub fn candidate_ids(&self) -> Vec<&str> {
        self.slots.iter().map(|s| s.candidate.id.as_str()).collect()
    }

    pub fn contains(&self, candidate_id: &str) -> bool {
        self.slots.iter().any(|s| s.candidate.id == candidate_id)
    }

    pub fn total_cost(&self) -> u64 {
        self.candidates().map(Candidate::cost).sum()
    }
}

/// Aggregates computed by the validator
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SquadSummary {
    pub total_cost: u64,
    pub average_rating: f64,
    pub per_nation_count: BTreeMap<String, usize>,
    pub per_league_count: BTreeMap<String, usize>,
    pub per_club_count: BTreeMap<String, usize>,
    /// 0-100 estimate
    pub chemistry_estimate: u32,
    /// Assigned players whose price is unknown (counted as zero in `total_cost`)
    pub unpriced_slots: usize,
}

/// Constraint family, in validation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintKind {
    Nation,
    League,
    Club,
    Chemistry,
    Rating,
    Price,
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConstraintKind::Nation => "nation",
            ConstraintKind::League => "league",
            ConstraintKind::Club => "club",
            ConstraintKind::Chemistry => "chemistry",
            ConstraintKind::Rating => "rating",
            ConstraintKind::Price => "price",
        };
        write!(f, "{}", name)
    }
}

/// First failing check reported by the validator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintViolation {
    pub kind: ConstraintKind,
    pub reason: String,
}

impl fmt::Display for ConstraintViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} constraint: {}", self.kind, self.reason)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentStatus {
    Ok,
    Unsatisfiable,
    ConstraintFailed,
}

impl SegmentStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self, SegmentStatus::Ok)
    }
}

impl fmt::Display for SegmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SegmentStatus::Ok => write!(f, "ok"),
            SegmentStatus::Unsatisfiable => write!(f, "unsatisfiable"),
            SegmentStatus::ConstraintFailed => write!(f, "constraint-failed"),
        }
    }
}

/// Why a segment did not produce a squad
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SegmentFailure {
    SlotUnsatisfiable { slot: Position, slot_index: usize },
    ConstraintUnmet(ConstraintViolation),
}

impl SegmentFailure {
    pub fn status(&self) -> SegmentStatus {
        match self {
            SegmentFailure::SlotUnsatisfiable { .. } => SegmentStatus::Unsatisfiable,
            SegmentFailure::ConstraintUnmet(_) => SegmentStatus::ConstraintFailed,
        }
    }
}

impl fmt::Display for SegmentFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SegmentFailure::SlotUnsatisfiable { slot, slot_index } => {
                write!(f, "no eligible candidate for slot {} ({})", slot_index, slot)
            }
            SegmentFailure::ConstraintUnmet(violation) => write!(f, "{}", violation),
        }
    }
}

/// Outcome of solving one segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentResult {
    pub name: String,
    pub status: SegmentStatus,
    /// Full on success, partial (diagnostic) on failure
    pub assignment: SquadAssignment,
    pub summary: SquadSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<SegmentFailure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
    /// Attempts made by the retry controller
    pub attempts: u32,
}

impl SegmentResult {
    pub fn passed(
        name: impl Into<String>,
        assignment: SquadAssignment,
        summary: SquadSummary,
        attempts: u32,
    ) -> Self {
        Self {
            name: name.into(),
            status: SegmentStatus::Ok,
            assignment,
            summary,
            failure: None,
            failure_reason: None,
            attempts,
        }
    }

    pub fn failed(
        name: impl Into<String>,
        failure: SegmentFailure,
        assignment: SquadAssignment,
        summary: SquadSummary,
        attempts: u32,
    ) -> Self {
        Self {
            name: name.into(),
            status: failure.status(),
            assignment,
            summary,
            failure_reason: Some(failure.to_string()),
            failure: Some(failure),
            attempts,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status.is_ok()
    }
}

/// Outcome of a full multi-segment solve
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MultiSegmentResult {
    pub segments: Vec<SegmentResult>,
    /// Sum of `total_cost` over ok segments only
    pub cumulative_cost: u64,
    /// Ids spent by ok segments that do not allow duplicates
    pub consumed_ids: BTreeSet<String>,
}

impl MultiSegmentResult {
    pub fn solved_count(&self) -> usize {
        self.segments.iter().filter(|s| s.is_ok()).count()
    }
}
