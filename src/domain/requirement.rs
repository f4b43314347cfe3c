use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::candidate::{Candidate, Position, Rarity};

/// Named formation that expands into an ordered slot list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Formation {
    #[serde(rename = "4-3-3")]
    F433,
    #[serde(rename = "4-4-2")]
    F442,
    #[serde(rename = "4-2-3-1")]
    F4231,
    #[serde(rename = "3-5-2")]
    F352,
}

impl Formation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Formation::F433 => "4-3-3",
            Formation::F442 => "4-4-2",
            Formation::F4231 => "4-2-3-1",
            Formation::F352 => "3-5-2",
        }
    }

    /// Slots in pitch order, keeper first, left to right within each line
    pub fn slots(&self) -> Vec<Position> {
        use Position::*;

        match self {
            Formation::F433 => vec![GK, LB, CB, CB, RB, CM, CM, CM, LW, ST, RW],
            Formation::F442 => vec![GK, LB, CB, CB, RB, LM, CM, CM, RM, ST, ST],
            Formation::F4231 => vec![GK, LB, CB, CB, RB, CDM, CDM, LW, CAM, RW, ST],
            Formation::F352 => vec![GK, CB, CB, CB, LWB, CM, CM, RWB, CAM, ST, ST],
        }
    }
}

impl Default for Formation {
    fn default() -> Self {
        Formation::F433
    }
}

impl fmt::Display for Formation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Formation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().replace('-', "").as_str() {
            "433" => Ok(Formation::F433),
            "442" => Ok(Formation::F442),
            "4231" => Ok(Formation::F4231),
            "352" => Ok(Formation::F352),
            _ => Err(format!("Unknown formation: {}", s)),
        }
    }
}

/// Ordering applied to the filtered pool before slots are filled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Objective {
    #[default]
    Cheapest,
    HighestRating,
    /// Rating per coin, descending
    Balanced,
}

impl fmt::Display for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Objective::Cheapest => write!(f, "cheapest"),
            Objective::HighestRating => write!(f, "highest_rating"),
            Objective::Balanced => write!(f, "balanced"),
        }
    }
}

impl FromStr for Objective {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "cheapest" => Ok(Objective::Cheapest),
            "highest_rating" | "rating" => Ok(Objective::HighestRating),
            "balanced" => Ok(Objective::Balanced),
            _ => Err(format!("Unknown objective: {}", s)),
        }
    }
}

/// Segment priority; high priority asks for fresh prices before assignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
}

impl Priority {
    pub fn needs_fresh_prices(&self) -> bool {
        matches!(self, Priority::High)
    }
}

/// Attribute a group constraint counts over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKind {
    Nation,
    League,
    Club,
}

impl GroupKind {
    /// Validation order for group checks
    pub const ORDER: [GroupKind; 3] = [GroupKind::Nation, GroupKind::League, GroupKind::Club];

    pub fn key_of<'a>(&self, candidate: &'a Candidate) -> &'a str {
        match self {
            GroupKind::Nation => &candidate.nation,
            GroupKind::League => &candidate.league,
            GroupKind::Club => &candidate.club,
        }
    }
}

impl fmt::Display for GroupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKind::Nation => write!(f, "nation"),
            GroupKind::League => write!(f, "league"),
            GroupKind::Club => write!(f, "club"),
        }
    }
}

/// Count limits for one grouping attribute
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRule {
    /// Minimum number of players per key (e.g. at least 3 from "Premier League")
    #[serde(default)]
    pub min_count: BTreeMap<String, usize>,
    /// Minimum number of distinct keys across the squad
    #[serde(default)]
    pub min_distinct: Option<usize>,
    /// Maximum number of distinct keys across the squad
    #[serde(default)]
    pub max_distinct: Option<usize>,
    /// Maximum number of players sharing one key
    #[serde(default)]
    pub max_per_key: Option<usize>,
}

impl GroupRule {
    pub fn is_empty(&self) -> bool {
        self.min_count.is_empty()
            && self.min_distinct.is_none()
            && self.max_distinct.is_none()
            && self.max_per_key.is_none()
    }
}

/// Eligibility rules for one segment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequirementSpec {
    /// Explicit slot list; takes precedence over `formation`
    #[serde(default)]
    pub slots: Vec<Position>,
    #[serde(default)]
    pub formation: Option<Formation>,
    /// Per-player rating bounds
    #[serde(default)]
    pub min_rating: Option<u8>,
    #[serde(default)]
    pub max_rating: Option<u8>,
    /// Lower bound on the squad's average rating
    #[serde(default)]
    pub min_squad_rating: Option<f64>,
    /// Required rarity for every player, if any
    #[serde(default)]
    pub rarity: Option<Rarity>,
    #[serde(default)]
    pub nation: GroupRule,
    #[serde(default)]
    pub league: GroupRule,
    #[serde(default)]
    pub club: GroupRule,
    /// Threshold on the 0-100 chemistry estimate
    #[serde(default)]
    pub min_chemistry: Option<u32>,
    #[serde(default)]
    pub max_price_per_slot: Option<u64>,
    #[serde(default)]
    pub max_total_price: Option<u64>,
    #[serde(default)]
    pub allow_duplicates_across_segments: bool,
    #[serde(default)]
    pub priority: Priority,
    /// Overrides the request-level objective for this segment
    #[serde(default)]
    pub objective: Option<Objective>,
}

impl RequirementSpec {
    /// Slots to fill, in declared order
    pub fn resolved_slots(&self) -> Vec<Position> {
        if !self.slots.is_empty() {
            return self.slots.clone();
        }
        self.formation.map(|f| f.slots()).unwrap_or_default()
    }

    pub fn rule(&self, kind: GroupKind) -> &GroupRule {
        match kind {
            GroupKind::Nation => &self.nation,
            GroupKind::League => &self.league,
            GroupKind::Club => &self.club,
        }
    }

    /// Per-candidate bounds applied before any slot is filled
    pub fn admits(&self, candidate: &Candidate) -> bool {
        if let Some(min) = self.min_rating {
            if candidate.rating < min {
                return false;
            }
        }
        if let Some(max) = self.max_rating {
            if candidate.rating > max {
                return false;
            }
        }
        if let Some(rarity) = self.rarity {
            if candidate.rarity != rarity {
                return false;
            }
        }
        // Unknown prices pass here; the validator's price check sees them as zero
        if let (Some(cap), Some(price)) = (self.max_price_per_slot, candidate.price) {
            if price > cap {
                return false;
            }
        }
        true
    }
}

/// A named sub-challenge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub name: String,
    pub requirements: RequirementSpec,
}

impl Segment {
    pub fn new(name: impl Into<String>, requirements: RequirementSpec) -> Self {
        Self {
            name: name.into(),
            requirements,
        }
    }
}

/// Request-wide solve options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolveOptions {
    #[serde(default)]
    pub objective: Objective,
    #[serde(default = "default_allow_alt_positions")]
    pub allow_alt_positions: bool,
}

fn default_allow_alt_positions() -> bool {
    true
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            objective: Objective::Cheapest,
            allow_alt_positions: true,
        }
    }
}
