//! Multi-segment orchestrator
//!
//! Solves segments in order against one shared pool. Players used by a
//! successful segment are excluded from later ones unless that segment
//! allows duplicates.

use chrono::Utc;
use std::borrow::Cow;
use std::collections::{BTreeSet, HashSet};
use std::time::Duration;
use tracing::{debug, info};

use super::assignment::{eligible_pool, order_by_objective};
use super::retry::{RetryController, DEFAULT_MAX_ATTEMPTS};
use crate::config::AppConfig;
use crate::domain::{Candidate, MultiSegmentResult, Objective, RequirementSpec, Segment, SolveOptions};
use crate::error::Result;
use crate::pricing::PriceCache;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorSettings {
    pub max_attempts: u32,
    /// Base seed; segment `i` uses `seed + i`
    pub seed: Option<u64>,
    /// Cheapest eligible candidates refreshed for a high-priority segment
    pub refresh_top_k: usize,
    pub refresh_concurrency: usize,
    pub refresh_timeout: Option<Duration>,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            seed: None,
            refresh_top_k: 25,
            refresh_concurrency: 5,
            refresh_timeout: Some(Duration::from_secs(10)),
        }
    }
}

impl OrchestratorSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            max_attempts: config.solver.max_attempts,
            seed: config.solver.seed,
            refresh_top_k: config.solver.refresh_top_k,
            refresh_concurrency: config.cache.refresh_concurrency,
            refresh_timeout: match config.cache.refresh_timeout_ms {
                0 => None,
                ms => Some(Duration::from_millis(ms)),
            },
        }
    }
}

pub struct SegmentOrchestrator<'a> {
    cache: &'a PriceCache,
    settings: OrchestratorSettings,
}

impl<'a> SegmentOrchestrator<'a> {
    pub fn new(cache: &'a PriceCache, settings: OrchestratorSettings) -> Self {
        Self { cache, settings }
    }

    /// Solve every segment in order
    ///
    /// A failed segment is recorded and the rest still run.
    pub async fn solve_all(
        &self,
        segments: &[Segment],
        pool: &[Candidate],
        options: &SolveOptions,
    ) -> Result<MultiSegmentResult> {
        let mut working: Cow<'_, [Candidate]> = Cow::Borrowed(pool);
        let mut excluded: HashSet<String> = HashSet::new();
        let no_exclusions: HashSet<String> = HashSet::new();
        let mut result = MultiSegmentResult::default();

        for (index, segment) in segments.iter().enumerate() {
            let spec = &segment.requirements;
            let objective = spec.objective.unwrap_or(options.objective);
            let exclusions = if spec.allow_duplicates_across_segments {
                &no_exclusions
            } else {
                &excluded
            };

            if spec.priority.needs_fresh_prices() {
                let targets = refresh_targets(&working, spec, exclusions, self.settings.refresh_top_k);
                if !targets.is_empty() {
                    self.refresh_prices(&segment.name, &targets, working.to_mut()).await;
                }
            }

            let seed = self.settings.seed.map(|s| s.wrapping_add(index as u64));
            let segment_result = RetryController::new(self.settings.max_attempts, seed).solve(
                &segment.name,
                &spec.resolved_slots(),
                &working,
                exclusions,
                spec,
                objective,
                options.allow_alt_positions,
            )?;

            if segment_result.is_ok() {
                info!(
                    segment = %segment.name,
                    attempts = segment_result.attempts,
                    cost = segment_result.summary.total_cost,
                    rating = segment_result.summary.average_rating,
                    "Segment solved"
                );
                result.cumulative_cost += segment_result.summary.total_cost;
                if !spec.allow_duplicates_across_segments {
                    for id in segment_result.assignment.candidate_ids() {
                        excluded.insert(id.to_string());
                        result.consumed_ids.insert(id.to_string());
                    }
                }
            } else {
                info!(
                    segment = %segment.name,
                    status = ?segment_result.status,
                    attempts = segment_result.attempts,
                    reason = segment_result.failure_reason.as_deref().unwrap_or(""),
                    "Segment not solved"
                );
            }

            result.segments.push(segment_result);
        }

        Ok(result)
    }

    /// Refresh `targets` and overlay the cache's view onto the working pool
    ///
    /// A fresh value wins, then the last known cached value, then whatever
    /// price the candidate already carried.
    async fn refresh_prices(&self, segment: &str, targets: &[String], pool: &mut [Candidate]) {
        let report = self
            .cache
            .refresh_batch_until(
                targets,
                self.settings.refresh_concurrency,
                self.settings.refresh_timeout,
            )
            .await;
        debug!(
            segment,
            targets = targets.len(),
            known = report.known_count(),
            cancelled = report.cancelled,
            "Refreshed prices for high-priority segment"
        );

        let targets: BTreeSet<&str> = targets.iter().map(String::as_str).collect();
        for candidate in pool.iter_mut().filter(|c| targets.contains(c.id.as_str())) {
            let lookup = self.cache.get(&candidate.id);
            if let Some(price) = lookup.price {
                *candidate = candidate.with_price(price, lookup.fetched_at.unwrap_or_else(Utc::now));
            }
        }
    }
}

/// Ids of the `k` cheapest candidates eligible for `spec`
fn refresh_targets(
    pool: &[Candidate],
    spec: &RequirementSpec,
    excluded: &HashSet<String>,
    k: usize,
) -> Vec<String> {
    let mut eligible = eligible_pool(pool, spec, excluded);
    order_by_objective(&mut eligible, Objective::Cheapest);
    eligible.into_iter().take(k).map(|c| c.id).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Position, Priority, SegmentStatus};
    use crate::engine::fixtures::{candidate, matching_pool};
    use crate::pricing::StaticPriceSource;
    use std::collections::HashMap;
    use std::sync::Arc;

    const CLUB: (&str, &str, &str) = ("ENG", "PL", "ARS");

    fn cache(prices: &[(&str, u64)]) -> PriceCache {
        let table: HashMap<String, u64> =
            prices.iter().map(|(id, p)| (id.to_string(), *p)).collect();
        PriceCache::new(
            Arc::new(StaticPriceSource::new(table)),
            Duration::from_secs(60),
            Duration::ZERO,
        )
    }

    fn seeded() -> OrchestratorSettings {
        OrchestratorSettings {
            seed: Some(11),
            ..Default::default()
        }
    }

    fn segment(name: &str, slots: Vec<Position>) -> Segment {
        Segment::new(
            name,
            RequirementSpec {
                slots,
                ..Default::default()
            },
        )
    }

    #[tokio::test]
    async fn test_segments_consume_disjoint_players() {
        let slots = vec![Position::GK, Position::CB, Position::ST];
        let pool = matching_pool(&[slots.clone(), slots.clone()].concat(), 80);
        let cache = cache(&[]);
        let orchestrator = SegmentOrchestrator::new(&cache, seeded());

        let result = orchestrator
            .solve_all(
                &[segment("one", slots.clone()), segment("two", slots)],
                &pool,
                &SolveOptions::default(),
            )
            .await
            .unwrap();

        assert_eq!(result.solved_count(), 2);
        let first: HashSet<_> = result.segments[0].assignment.candidate_ids().into_iter().collect();
        let second: HashSet<_> = result.segments[1].assignment.candidate_ids().into_iter().collect();
        assert!(first.is_disjoint(&second));
        assert_eq!(result.consumed_ids.len(), 6);
        let total: u64 = result.segments.iter().map(|s| s.summary.total_cost).sum();
        assert_eq!(result.cumulative_cost, total);
    }

    #[tokio::test]
    async fn test_failed_segment_does_not_stop_later_ones() {
        let pool = vec![
            candidate("gk", Position::GK, 80, Some(100), CLUB),
            candidate("st", Position::ST, 80, Some(200), CLUB),
        ];
        let cache = cache(&[]);
        let orchestrator = SegmentOrchestrator::new(&cache, seeded());

        let result = orchestrator
            .solve_all(
                &[
                    segment("keeper", vec![Position::GK]),
                    segment("second keeper", vec![Position::GK]),
                    segment("striker", vec![Position::ST]),
                ],
                &pool,
                &SolveOptions::default(),
            )
            .await
            .unwrap();

        assert_eq!(result.segments.len(), 3);
        assert_eq!(result.segments[1].status, SegmentStatus::Unsatisfiable);
        assert!(result.segments[2].is_ok());
        assert_eq!(result.cumulative_cost, 300);
    }

    #[tokio::test]
    async fn test_duplicate_segments_ignore_exclusions() {
        let pool = vec![candidate("gk", Position::GK, 80, Some(100), CLUB)];
        let cache = cache(&[]);
        let orchestrator = SegmentOrchestrator::new(&cache, seeded());

        let mut shared = segment("shared", vec![Position::GK]);
        shared.requirements.allow_duplicates_across_segments = true;

        let result = orchestrator
            .solve_all(
                &[segment("first", vec![Position::GK]), shared],
                &pool,
                &SolveOptions::default(),
            )
            .await
            .unwrap();

        assert_eq!(result.solved_count(), 2);
        assert!(result.segments[1].assignment.contains("gk"));
    }

    #[tokio::test]
    async fn test_high_priority_uses_fresh_prices() {
        let pool = vec![
            candidate("listed", Position::ST, 80, Some(100), CLUB),
            candidate("dropped", Position::ST, 80, Some(5000), CLUB),
        ];
        let cache = cache(&[("dropped", 10)]);
        let orchestrator = SegmentOrchestrator::new(&cache, seeded());

        let normal = segment("normal", vec![Position::ST]);
        let mut urgent = segment("urgent", vec![Position::ST]);
        urgent.requirements.priority = Priority::High;
        urgent.requirements.allow_duplicates_across_segments = true;

        let result = orchestrator
            .solve_all(&[normal, urgent], &pool, &SolveOptions::default())
            .await
            .unwrap();

        assert!(result.segments[0].assignment.contains("listed"));
        assert!(result.segments[1].assignment.contains("dropped"));
        assert_eq!(result.segments[1].summary.total_cost, 10);
        assert_eq!(cache.get("dropped").price, Some(10));
        // Caller's pool is untouched
        assert_eq!(pool[1].price, Some(5000));
    }

    #[tokio::test]
    async fn test_segment_objective_overrides_request() {
        let pool = vec![
            candidate("cheap", Position::CM, 75, Some(100), CLUB),
            candidate("star", Position::CM, 91, Some(90_000), CLUB),
        ];
        let cache = cache(&[]);
        let orchestrator = SegmentOrchestrator::new(&cache, seeded());

        let mut best = segment("best", vec![Position::CM]);
        best.requirements.objective = Some(Objective::HighestRating);
        best.requirements.allow_duplicates_across_segments = true;

        let result = orchestrator
            .solve_all(
                &[segment("default", vec![Position::CM]), best],
                &pool,
                &SolveOptions::default(),
            )
            .await
            .unwrap();

        assert!(result.segments[0].assignment.contains("cheap"));
        assert!(result.segments[1].assignment.contains("star"));
    }
}
