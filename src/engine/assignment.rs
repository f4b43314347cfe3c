//! Slot assignment engine
//!
//! Greedy, single pass: slots are filled in declared order from a filtered,
//! objective-ordered pool. Each slot tries three tiers in turn:
//!
//! 1. `Primary`: candidate's primary position equals the slot
//! 2. `Alternate`: slot appears in the candidate's alternate positions
//! 3. `CategoryFallback`: candidate's primary position is in the slot's
//!    position family (wide attackers interchangeable, ST/CF, full backs...)
//!
//! Tiers 2 and 3 only run when alternate positions are allowed. The result is
//! deterministic for a fixed pool order.

use std::cmp::Ordering;
use std::collections::HashSet;
use thiserror::Error;

use crate::domain::{
    Candidate, MatchTier, Objective, Position, RequirementSpec, SquadAssignment,
};

/// No candidate could fill a slot; carries what was built so far
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("No eligible candidate for slot {slot_index} ({slot})")]
pub struct SlotUnsatisfiable {
    pub slot: Position,
    pub slot_index: usize,
    pub partial: SquadAssignment,
}

/// Assign candidates to slots
///
/// Filters `pool` by the requirement's per-candidate bounds, drops `excluded_ids`,
/// orders by `objective`, then fills slots greedily.
pub fn assign(
    slots: &[Position],
    pool: &[Candidate],
    excluded_ids: &HashSet<String>,
    spec: &RequirementSpec,
    objective: Objective,
    allow_alt_positions: bool,
) -> Result<SquadAssignment, SlotUnsatisfiable> {
    let mut eligible = eligible_pool(pool, spec, excluded_ids);
    order_by_objective(&mut eligible, objective);
    assign_ordered(slots, &eligible, allow_alt_positions)
}

/// Candidates passing per-candidate bounds and not excluded, in input order
pub fn eligible_pool(
    pool: &[Candidate],
    spec: &RequirementSpec,
    excluded_ids: &HashSet<String>,
) -> Vec<Candidate> {
    pool.iter()
        .filter(|c| !excluded_ids.contains(&c.id))
        .filter(|c| spec.admits(c))
        .cloned()
        .collect()
}

/// Sort in place by objective; ties always end on candidate id
pub fn order_by_objective(pool: &mut [Candidate], objective: Objective) {
    pool.sort_by(|a, b| objective_cmp(objective, a, b));
}

/// Total order used by `order_by_objective`
pub fn objective_cmp(objective: Objective, a: &Candidate, b: &Candidate) -> Ordering {
    let primary = match objective {
        Objective::Cheapest => price_key(a)
            .cmp(&price_key(b))
            .then_with(|| b.rating.cmp(&a.rating)),
        Objective::HighestRating => b
            .rating
            .cmp(&a.rating)
            .then_with(|| price_key(a).cmp(&price_key(b))),
        Objective::Balanced => value_ratio(b)
            .total_cmp(&value_ratio(a))
            .then_with(|| price_key(a).cmp(&price_key(b))),
    };
    primary.then_with(|| a.id.cmp(&b.id))
}

/// Unknown prices sort after every known price
fn price_key(c: &Candidate) -> (bool, u64) {
    match c.price {
        Some(p) => (false, p),
        None => (true, u64::MAX),
    }
}

fn value_ratio(c: &Candidate) -> f64 {
    match c.price {
        Some(0) => f64::INFINITY,
        Some(p) => c.rating as f64 / p as f64,
        None => f64::NEG_INFINITY,
    }
}

/// Fill slots from an already-ordered pool
///
/// Each candidate is used at most once.
pub fn assign_ordered(
    slots: &[Position],
    ordered: &[Candidate],
    allow_alt_positions: bool,
) -> Result<SquadAssignment, SlotUnsatisfiable> {
    let mut used = vec![false; ordered.len()];
    let mut squad = SquadAssignment::new();

    for (slot_index, &slot) in slots.iter().enumerate() {
        match pick(slot, ordered, &used, allow_alt_positions) {
            Some((idx, tier)) => {
                used[idx] = true;
                squad.push(slot, ordered[idx].clone(), tier);
            }
            None => {
                return Err(SlotUnsatisfiable {
                    slot,
                    slot_index,
                    partial: squad,
                })
            }
        }
    }

    Ok(squad)
}

fn pick(
    slot: Position,
    ordered: &[Candidate],
    used: &[bool],
    allow_alt_positions: bool,
) -> Option<(usize, MatchTier)> {
    let first = |matches: &dyn Fn(&Candidate) -> bool| {
        ordered
            .iter()
            .enumerate()
            .find(|(i, c)| !used[*i] && matches(*c))
            .map(|(i, _)| i)
    };

    if let Some(i) = first(&|c| c.primary_position == slot) {
        return Some((i, MatchTier::Primary));
    }
    if !allow_alt_positions {
        return None;
    }
    if let Some(i) = first(&|c| c.alternate_positions.contains(&slot)) {
        return Some((i, MatchTier::Alternate));
    }

    let family = slot.family();
    if !family.allows_fallback() {
        return None;
    }
    first(&|c| c.primary_position.family() == family).map(|i| (i, MatchTier::CategoryFallback))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Formation;
    use crate::engine::fixtures::{candidate, matching_pool, with_alternates};

    const CLUB: (&str, &str, &str) = ("ENG", "PL", "ARS");

    #[test]
    fn test_fills_every_slot_with_primary_matches() {
        let slots = Formation::F433.slots();
        let pool = matching_pool(&slots, 83);

        let squad = assign(
            &slots,
            &pool,
            &HashSet::new(),
            &RequirementSpec::default(),
            Objective::Cheapest,
            true,
        )
        .unwrap();

        assert_eq!(squad.len(), slots.len());
        assert!(squad.slots.iter().all(|s| s.tier == MatchTier::Primary));
        let ids: HashSet<_> = squad.candidate_ids().into_iter().collect();
        assert_eq!(ids.len(), slots.len());
    }

    #[test]
    fn test_cheapest_first_picks_lowest_price() {
        let pool = vec![
            candidate("pricey", Position::ST, 90, Some(9000), CLUB),
            candidate("cheap", Position::ST, 80, Some(500), CLUB),
            candidate("unknown", Position::ST, 85, None, CLUB),
        ];
        let squad = assign_default(&[Position::ST], &pool, Objective::Cheapest);
        assert_eq!(squad.slots[0].candidate.id, "cheap");
    }

    #[test]
    fn test_highest_rating_ties_break_on_price() {
        let pool = vec![
            candidate("a", Position::CM, 88, Some(3000), CLUB),
            candidate("b", Position::CM, 88, Some(2000), CLUB),
            candidate("c", Position::CM, 85, Some(100), CLUB),
        ];
        let squad = assign_default(&[Position::CM, Position::CM], &pool, Objective::HighestRating);
        assert_eq!(squad.candidate_ids(), vec!["b", "a"]);
    }

    #[test]
    fn test_balanced_prefers_rating_per_coin() {
        let pool = vec![
            candidate("star", Position::CB, 90, Some(9000), CLUB),
            candidate("value", Position::CB, 82, Some(800), CLUB),
            candidate("unpriced", Position::CB, 88, None, CLUB),
        ];
        let squad = assign_default(&[Position::CB], &pool, Objective::Balanced);
        assert_eq!(squad.slots[0].candidate.id, "value");
        assert_eq!(
            objective_cmp(Objective::Balanced, &pool[0], &pool[2]),
            Ordering::Less
        );
    }

    #[test]
    fn test_alternate_then_category_fallback() {
        let pool = vec![
            candidate("rm", Position::RM, 80, Some(100), CLUB),
            with_alternates(candidate("cm", Position::CM, 80, Some(900), CLUB), &[Position::RW]),
        ];

        // Alternate tier beats the cheaper family match
        let squad = assign_default(&[Position::RW], &pool, Objective::Cheapest);
        assert_eq!(squad.slots[0].candidate.id, "cm");
        assert_eq!(squad.slots[0].tier, MatchTier::Alternate);

        // With the alternate used up, RM covers LW through the family fallback
        let squad = assign_default(&[Position::RW, Position::LW], &pool, Objective::Cheapest);
        assert_eq!(squad.slots[1].candidate.id, "rm");
        assert_eq!(squad.slots[1].tier, MatchTier::CategoryFallback);
    }

    #[test]
    fn test_strict_positions_disable_looser_tiers() {
        let pool = vec![with_alternates(
            candidate("cm", Position::CM, 80, Some(900), CLUB),
            &[Position::CAM],
        )];
        let err = assign(
            &[Position::CAM],
            &pool,
            &HashSet::new(),
            &RequirementSpec::default(),
            Objective::Cheapest,
            false,
        )
        .unwrap_err();
        assert_eq!(err.slot, Position::CAM);
        assert_eq!(err.slot_index, 0);
    }

    #[test]
    fn test_goalkeeper_never_falls_back() {
        let pool = vec![candidate("cb", Position::CB, 80, Some(100), CLUB)];
        let err = assign(
            &[Position::GK],
            &pool,
            &HashSet::new(),
            &RequirementSpec::default(),
            Objective::Cheapest,
            true,
        )
        .unwrap_err();
        assert_eq!(err.slot, Position::GK);
    }

    #[test]
    fn test_filters_bounds_and_exclusions() {
        let pool = vec![
            candidate("low", Position::ST, 75, Some(100), CLUB),
            candidate("taken", Position::ST, 85, Some(200), CLUB),
            candidate("pricey", Position::ST, 86, Some(60_000), CLUB),
            candidate("ok", Position::ST, 84, Some(300), CLUB),
        ];
        let spec = RequirementSpec {
            min_rating: Some(80),
            max_price_per_slot: Some(50_000),
            ..Default::default()
        };
        let excluded: HashSet<String> = ["taken".to_string()].into_iter().collect();

        let eligible = eligible_pool(&pool, &spec, &excluded);
        assert_eq!(eligible.len(), 1);

        let squad = assign(&[Position::ST], &pool, &excluded, &spec, Objective::Cheapest, true).unwrap();
        assert_eq!(squad.slots[0].candidate.id, "ok");
    }

    #[test]
    fn test_failure_carries_partial_assignment() {
        let pool = vec![
            candidate("gk", Position::GK, 80, Some(100), CLUB),
            candidate("cb", Position::CB, 80, Some(100), CLUB),
        ];
        let err = assign_ordered(&[Position::GK, Position::CB, Position::CB], &pool, true).unwrap_err();
        assert_eq!(err.slot_index, 2);
        assert_eq!(err.partial.len(), 2);
        assert!(err.partial.contains("gk"));
    }

    #[test]
    fn test_empty_pool_fails_first_slot() {
        let err = assign_ordered(&Formation::F433.slots(), &[], true).unwrap_err();
        assert_eq!(err.slot_index, 0);
        assert_eq!(err.slot, Position::GK);
        assert!(err.partial.is_empty());
    }

    fn assign_default(slots: &[Position], pool: &[Candidate], objective: Objective) -> SquadAssignment {
        assign(
            slots,
            pool,
            &HashSet::new(),
            &RequirementSpec::default(),
            objective,
            true,
        )
        .unwrap()
    }
}
