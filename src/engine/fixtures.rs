//! Candidate builders shared by the engine unit tests

use std::collections::BTreeSet;

use crate::domain::{Candidate, Position, Rarity};

pub fn candidate(
    id: &str,
    position: Position,
    rating: u8,
    price: Option<u64>,
    (nation, league, club): (&str, &str, &str),
) -> Candidate {
    Candidate {
        id: id.to_string(),
        display_name: format!("Player {}", id),
        rating,
        primary_position: position,
        alternate_positions: BTreeSet::new(),
        nation: nation.to_string(),
        league: league.to_string(),
        club: club.to_string(),
        rarity: Rarity::Standard,
        price,
        price_fetched_at: None,
    }
}

pub fn with_alternates(mut c: Candidate, alternates: &[Position]) -> Candidate {
    c.alternate_positions = alternates.iter().copied().collect();
    c
}

/// One candidate per slot, all from the same club, priced 100 apart
pub fn matching_pool(slots: &[Position], base_rating: u8) -> Vec<Candidate> {
    slots
        .iter()
        .enumerate()
        .map(|(i, &pos)| {
            candidate(
                &format!("p{}", i),
                pos,
                base_rating + (i % 5) as u8,
                Some(1000 + 100 * i as u64),
                ("ENG", "PL", "ARS"),
            )
        })
        .collect()
}
