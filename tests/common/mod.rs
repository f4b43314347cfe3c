#![allow(dead_code)]

use sbc_solver::domain::{Candidate, Position, Rarity};
use sbc_solver::pricing::{PriceCache, StaticPriceSource};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;

pub fn card(
    id: &str,
    position: Position,
    rating: u8,
    price: Option<u64>,
    league: &str,
    club: &str,
) -> Candidate {
    Candidate {
        id: id.to_string(),
        display_name: format!("Card {}", id),
        rating,
        primary_position: position,
        alternate_positions: BTreeSet::new(),
        nation: "ENG".to_string(),
        league: league.to_string(),
        club: club.to_string(),
        rarity: Rarity::Standard,
        price,
        price_fetched_at: None,
    }
}

/// Cache backed by a source that knows no prices
pub fn offline_cache() -> PriceCache {
    PriceCache::new(
        Arc::new(StaticPriceSource::new(HashMap::new())),
        Duration::from_secs(60),
        Duration::ZERO,
    )
}

pub fn ids(prefix: &str, n: usize) -> Vec<String> {
    (0..n).map(|i| format!("{}{}", prefix, i)).collect()
}
