//! Requirement validator
//!
//! Pure scoring of an assembled squad against a segment's requirements.
//! Checks run in a fixed order (nation, league, club, chemistry, rating,
//! price) and the first failure is reported.

use std::collections::BTreeMap;

use crate::domain::{
    ConstraintKind, ConstraintViolation, GroupKind, GroupRule, RequirementSpec, SquadAssignment,
    SquadSummary,
};

/// Chemistry weight for each repeated club pairing
pub const CLUB_CHEMISTRY_WEIGHT: u32 = 3;
/// Chemistry weight for each repeated league pairing
pub const LEAGUE_CHEMISTRY_WEIGHT: u32 = 2;
/// Chemistry weight for each repeated nation pairing
pub const NATION_CHEMISTRY_WEIGHT: u32 = 1;

/// Validator verdict
#[derive(Debug, Clone, PartialEq)]
pub struct Validation {
    pub passed: bool,
    pub violation: Option<ConstraintViolation>,
    pub summary: SquadSummary,
}

impl Validation {
    pub fn reason(&self) -> Option<String> {
        self.violation.as_ref().map(|v| v.to_string())
    }
}

/// Validate a squad against a requirement spec
pub fn validate(squad: &SquadAssignment, spec: &RequirementSpec) -> Validation {
    let summary = summarize(squad);
    let violation = first_violation(squad, spec, &summary);

    Validation {
        passed: violation.is_none(),
        violation,
        summary,
    }
}

/// Compute aggregates without checking any constraint
pub fn summarize(squad: &SquadAssignment) -> SquadSummary {
    let per_nation_count = group_counts(squad, GroupKind::Nation);
    let per_league_count = group_counts(squad, GroupKind::League);
    let per_club_count = group_counts(squad, GroupKind::Club);

    let average_rating = if squad.is_empty() {
        0.0
    } else {
        let total: u32 = squad.candidates().map(|c| c.rating as u32).sum();
        total as f64 / squad.len() as f64
    };

    let chemistry_estimate = chemistry_estimate(
        squad.len(),
        &per_nation_count,
        &per_league_count,
        &per_club_count,
    );

    SquadSummary {
        total_cost: squad.total_cost(),
        average_rating,
        chemistry_estimate,
        unpriced_slots: squad.candidates().filter(|c| c.price.is_none()).count(),
        per_nation_count,
        per_league_count,
        per_club_count,
    }
}

fn group_counts(squad: &SquadAssignment, kind: GroupKind) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for candidate in squad.candidates() {
        *counts.entry(kind.key_of(candidate).to_string()).or_insert(0) += 1;
    }
    counts
}

/// Weighted repeated-group score scaled to 0-100
///
/// raw = Σ weight(kind) × Σ_groups (size − 1)
/// max = (club + league + nation weights) × (n − 1)
///
/// A squad of one player (or none) scores 0.
pub fn chemistry_estimate(
    squad_size: usize,
    per_nation: &BTreeMap<String, usize>,
    per_league: &BTreeMap<String, usize>,
    per_club: &BTreeMap<String, usize>,
) -> u32 {
    if squad_size <= 1 {
        return 0;
    }

    let repeats = |counts: &BTreeMap<String, usize>| -> u32 {
        counts.values().map(|&n| n.saturating_sub(1) as u32).sum()
    };

    let raw = CLUB_CHEMISTRY_WEIGHT * repeats(per_club)
        + LEAGUE_CHEMISTRY_WEIGHT * repeats(per_league)
        + NATION_CHEMISTRY_WEIGHT * repeats(per_nation);
    let max = (CLUB_CHEMISTRY_WEIGHT + LEAGUE_CHEMISTRY_WEIGHT + NATION_CHEMISTRY_WEIGHT)
        * (squad_size as u32 - 1);

    ((raw as f64 * 100.0) / max as f64).round() as u32
}

fn first_violation(
    squad: &SquadAssignment,
    spec: &RequirementSpec,
    summary: &SquadSummary,
) -> Option<ConstraintViolation> {
    for kind in GroupKind::ORDER {
        let counts = match kind {
            GroupKind::Nation => &summary.per_nation_count,
            GroupKind::League => &summary.per_league_count,
            GroupKind::Club => &summary.per_club_count,
        };
        if let Some(reason) = check_group(kind, spec.rule(kind), counts) {
            return Some(ConstraintViolation {
                kind: constraint_kind(kind),
                reason,
            });
        }
    }

    if let Some(min) = spec.min_chemistry {
        if summary.chemistry_estimate < min {
            return Some(ConstraintViolation {
                kind: ConstraintKind::Chemistry,
                reason: format!(
                    "chemistry estimate {} below minimum {}",
                    summary.chemistry_estimate, min
                ),
            });
        }
    }

    if let Some(reason) = check_rating(squad, spec, summary) {
        return Some(ConstraintViolation {
            kind: ConstraintKind::Rating,
            reason,
        });
    }

    check_price(squad, spec, summary).map(|reason| ConstraintViolation {
        kind: ConstraintKind::Price,
        reason,
    })
}

fn constraint_kind(kind: GroupKind) -> ConstraintKind {
    match kind {
        GroupKind::Nation => ConstraintKind::Nation,
        GroupKind::League => ConstraintKind::League,
        GroupKind::Club => ConstraintKind::Club,
    }
}

fn check_group(
    kind: GroupKind,
    rule: &GroupRule,
    counts: &BTreeMap<String, usize>,
) -> Option<String> {
    // BTreeMap iteration keeps the reported key deterministic
    for (key, &min) in &rule.min_count {
        let have = counts.get(key).copied().unwrap_or(0);
        if have < min {
            return Some(format!(
                "{} count for '{}' is {}, minimum {}",
                kind, key, have, min
            ));
        }
    }

    let distinct = counts.len();
    if let Some(min) = rule.min_distinct {
        if distinct < min {
            return Some(format!(
                "{} distinct {} values, minimum {}",
                distinct, kind, min
            ));
        }
    }
    if let Some(max) = rule.max_distinct {
        if distinct > max {
            return Some(format!(
                "{} distinct {} values, at most {} allowed",
                distinct, kind, max
            ));
        }
    }

    if let Some(max) = rule.max_per_key {
        if let Some((key, &n)) = counts.iter().find(|(_, &n)| n > max) {
            return Some(format!(
                "{} players share {} '{}', at most {} allowed",
                n, kind, key, max
            ));
        }
    }

    None
}

fn check_rating(
    squad: &SquadAssignment,
    spec: &RequirementSpec,
    summary: &SquadSummary,
) -> Option<String> {
    for assigned in &squad.slots {
        let c = &assigned.candidate;
        if let Some(min) = spec.min_rating {
            if c.rating < min {
                return Some(format!(
                    "{} ({}) rated {}, minimum {}",
                    c.display_name, c.id, c.rating, min
                ));
            }
        }
        if let Some(max) = spec.max_rating {
            if c.rating > max {
                return Some(format!(
                    "{} ({}) rated {}, maximum {}",
                    c.display_name, c.id, c.rating, max
                ));
            }
        }
    }

    if let Some(min) = spec.min_squad_rating {
        if summary.average_rating < min {
            return Some(format!(
                "average rating {:.2} below minimum {:.2}",
                summary.average_rating, min
            ));
        }
    }

    None
}

fn check_price(
    squad: &SquadAssignment,
    spec: &RequirementSpec,
    summary: &SquadSummary,
) -> Option<String> {
    if let Some(cap) = spec.max_price_per_slot {
        if let Some(assigned) = squad.slots.iter().find(|s| s.candidate.cost() > cap) {
            return Some(format!(
                "{} costs {} at {}, per-slot cap {}",
                assigned.candidate.display_name,
                assigned.candidate.cost(),
                assigned.slot,
                cap
            ));
        }
    }

    if let Some(cap) = spec.max_total_price {
        if summary.total_cost > cap {
            return Some(format!(
                "total cost {} exceeds cap {}",
                summary.total_cost, cap
            ));
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MatchTier, Position};
    use crate::engine::fixtures::candidate;

    fn squad_of(players: Vec<crate::domain::Candidate>) -> SquadAssignment {
        let mut squad = SquadAssignment::new();
        for p in players {
            squad.push(p.primary_position, p, MatchTier::Primary);
        }
        squad
    }

    #[test]
    fn test_summary_counts_and_cost() {
        let squad = squad_of(vec![
            candidate("a", Position::GK, 80, Some(1000), ("ENG", "PL", "ARS")),
            candidate("b", Position::CB, 84, Some(2000), ("ENG", "PL", "CHE")),
            candidate("c", Position::ST, 86, None, ("FRA", "L1", "PSG")),
        ]);

        let summary = summarize(&squad);
        assert_eq!(summary.total_cost, 3000);
        assert_eq!(summary.unpriced_slots, 1);
        assert!((summary.average_rating - 250.0 / 3.0).abs() < 1e-9);
        assert_eq!(summary.per_nation_count.get("ENG"), Some(&2));
        assert_eq!(summary.per_league_count.len(), 2);
        assert_eq!(summary.per_club_count.len(), 3);
    }

    #[test]
    fn test_chemistry_weights() {
        // All from one club: every repeat counts for every kind
        let same = squad_of(vec![
            candidate("a", Position::GK, 80, Some(1), ("ENG", "PL", "ARS")),
            candidate("b", Position::CB, 80, Some(1), ("ENG", "PL", "ARS")),
        ]);
        assert_eq!(summarize(&same).chemistry_estimate, 100);

        // Shared league only: 2 / 6
        let league = squad_of(vec![
            candidate("a", Position::GK, 80, Some(1), ("ENG", "PL", "ARS")),
            candidate("b", Position::CB, 80, Some(1), ("FRA", "PL", "CHE")),
        ]);
        assert_eq!(summarize(&league).chemistry_estimate, 33);

        // Shared nation only: 1 / 6
        let nation = squad_of(vec![
            candidate("a", Position::GK, 80, Some(1), ("ENG", "PL", "ARS")),
            candidate("b", Position::CB, 80, Some(1), ("ENG", "L1", "PSG")),
        ]);
        assert_eq!(summarize(&nation).chemistry_estimate, 17);

        assert_eq!(summarize(&SquadAssignment::new()).chemistry_estimate, 0);
    }

    #[test]
    fn test_nation_failure_reported_before_price() {
        let squad = squad_of(vec![
            candidate("a", Position::GK, 80, Some(9000), ("ENG", "PL", "ARS")),
            candidate("b", Position::CB, 80, Some(9000), ("FRA", "L1", "PSG")),
        ]);
        let mut spec = RequirementSpec {
            max_total_price: Some(100),
            ..Default::default()
        };
        spec.nation.min_count.insert("BRA".to_string(), 1);

        let result = validate(&squad, &spec);
        assert!(!result.passed);
        let violation = result.violation.unwrap();
        assert_eq!(violation.kind, ConstraintKind::Nation);
        assert!(violation.reason.contains("BRA"));
    }

    #[test]
    fn test_league_distinct_limit() {
        let squad = squad_of(vec![
            candidate("a", Position::GK, 80, Some(1), ("ENG", "PL", "ARS")),
            candidate("b", Position::CB, 80, Some(1), ("ENG", "L1", "PSG")),
        ]);
        let mut spec = RequirementSpec::default();
        spec.league.max_distinct = Some(1);

        let result = validate(&squad, &spec);
        assert_eq!(result.violation.unwrap().kind, ConstraintKind::League);
    }

    #[test]
    fn test_club_max_per_key() {
        let squad = squad_of(vec![
            candidate("a", Position::GK, 80, Some(1), ("ENG", "PL", "ARS")),
            candidate("b", Position::CB, 80, Some(1), ("ENG", "PL", "ARS")),
            candidate("c", Position::CB, 80, Some(1), ("ENG", "PL", "ARS")),
        ]);
        let mut spec = RequirementSpec::default();
        spec.club.max_per_key = Some(2);

        let violation = validate(&squad, &spec).violation.unwrap();
        assert_eq!(violation.kind, ConstraintKind::Club);
        assert!(violation.reason.contains("ARS"));
    }

    #[test]
    fn test_chemistry_before_rating() {
        let squad = squad_of(vec![
            candidate("a", Position::GK, 70, Some(1), ("ENG", "PL", "ARS")),
            candidate("b", Position::CB, 70, Some(1), ("FRA", "L1", "PSG")),
        ]);
        let spec = RequirementSpec {
            min_chemistry: Some(50),
            min_squad_rating: Some(80.0),
            ..Default::default()
        };

        let violation = validate(&squad, &spec).violation.unwrap();
        assert_eq!(violation.kind, ConstraintKind::Chemistry);
    }

    #[test]
    fn test_rating_and_price_checks() {
        let squad = squad_of(vec![
            candidate("a", Position::GK, 82, Some(4000), ("ENG", "PL", "ARS")),
            candidate("b", Position::CB, 84, Some(3000), ("ENG", "PL", "ARS")),
        ]);

        let spec = RequirementSpec {
            min_squad_rating: Some(84.0),
            ..Default::default()
        };
        assert_eq!(
            validate(&squad, &spec).violation.unwrap().kind,
            ConstraintKind::Rating
        );

        let spec = RequirementSpec {
            max_price_per_slot: Some(3500),
            ..Default::default()
        };
        let violation = validate(&squad, &spec).violation.unwrap();
        assert_eq!(violation.kind, ConstraintKind::Price);
        assert!(violation.reason.contains("per-slot"));

        let spec = RequirementSpec {
            max_total_price: Some(6999),
            ..Default::default()
        };
        let violation = validate(&squad, &spec).violation.unwrap();
        assert_eq!(violation.kind, ConstraintKind::Price);
        assert!(violation.reason.contains("total cost 7000 exceeds cap 6999"));

        // The cap is inclusive
        let spec = RequirementSpec {
            max_total_price: Some(7000),
            ..Default::default()
        };
        assert!(validate(&squad, &spec).passed);

        let spec = RequirementSpec {
            min_squad_rating: Some(83.0),
            max_total_price: Some(7000),
            ..Default::default()
        };
        let result = validate(&squad, &spec);
        assert!(result.passed);
        assert!(result.reason().is_none());
    }
}
