use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Lowest card rating accepted in a candidate record
pub const MIN_CARD_RATING: u8 = 1;
/// Highest card rating accepted in a candidate record
pub const MAX_CARD_RATING: u8 = 99;

/// Pitch position a slot requires or a card can play
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Position {
    GK,
    RB,
    RWB,
    CB,
    LB,
    LWB,
    CDM,
    CM,
    CAM,
    RM,
    LM,
    RW,
    LW,
    CF,
    ST,
}

impl Position {
    pub const ALL: [Position; 15] = [
        Position::GK,
        Position::RB,
        Position::RWB,
        Position::CB,
        Position::LB,
        Position::LWB,
        Position::CDM,
        Position::CM,
        Position::CAM,
        Position::RM,
        Position::LM,
        Position::RW,
        Position::LW,
        Position::CF,
        Position::ST,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Position::GK => "GK",
            Position::RB => "RB",
            Position::RWB => "RWB",
            Position::CB => "CB",
            Position::LB => "LB",
            Position::LWB => "LWB",
            Position::CDM => "CDM",
            Position::CM => "CM",
            Position::CAM => "CAM",
            Position::RM => "RM",
            Position::LM => "LM",
            Position::RW => "RW",
            Position::LW => "LW",
            Position::CF => "CF",
            Position::ST => "ST",
        }
    }

    /// Loose category used by the category-fallback tier
    pub fn family(&self) -> PositionFamily {
        match self {
            Position::GK => PositionFamily::Goalkeeper,
            Position::CB => PositionFamily::CentreBack,
            Position::RB | Position::RWB | Position::LB | Position::LWB => PositionFamily::FullBack,
            Position::CDM | Position::CM | Position::CAM => PositionFamily::CentralMidfield,
            Position::RM | Position::LM | Position::RW | Position::LW => PositionFamily::WideAttack,
            Position::CF | Position::ST => PositionFamily::Striker,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Position {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_uppercase();
        Position::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == wanted)
            .ok_or_else(|| format!("Unknown position: {}", s))
    }
}

/// Groups of positions treated as interchangeable by the loosest matching tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionFamily {
    Goalkeeper,
    CentreBack,
    FullBack,
    CentralMidfield,
    WideAttack,
    Striker,
}

impl PositionFamily {
    /// Goalkeepers never stand in for outfield players or the other way round
    pub fn allows_fallback(&self) -> bool {
        !matches!(self, PositionFamily::Goalkeeper)
    }
}

/// Card rarity tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    #[default]
    Standard,
    Special,
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rarity::Standard => write!(f, "standard"),
            Rarity::Special => write!(f, "special"),
        }
    }
}

/// A player card that may fill a slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: String,
    pub display_name: String,
    pub rating: u8,
    pub primary_position: Position,
    #[serde(default)]
    pub alternate_positions: BTreeSet<Position>,
    pub nation: String,
    pub league: String,
    pub club: String,
    #[serde(default)]
    pub rarity: Rarity,
    /// Last known price in coins, `None` when never priced
    #[serde(default)]
    pub price: Option<u64>,
    #[serde(default)]
    pub price_fetched_at: Option<DateTime<Utc>>,
}

impl Candidate {
    /// Copy of this candidate carrying a newer price
    pub fn with_price(&self, price: u64, fetched_at: DateTime<Utc>) -> Self {
        Self {
            price: Some(price),
            price_fetched_at: Some(fetched_at),
            ..self.clone()
        }
    }

    /// Price used for cost accounting (unknown counts as zero)
    pub fn cost(&self) -> u64 {
        self.price.unwrap_or(0)
    }
}
