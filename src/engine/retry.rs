//! Retry/reshuffle controller
//!
//! Wraps assignment and validation in a bounded loop. The first attempt uses
//! the objective order; later attempts use a seeded jittered shuffle of that
//! order so early retries stay close to the objective and the last one is
//! close to a uniform shuffle.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;
use tracing::debug;

use super::assignment::{assign_ordered, eligible_pool, order_by_objective};
use super::validator::{summarize, validate};
use crate::domain::{
    Candidate, Objective, Position, RequirementSpec, SegmentFailure, SegmentResult, SolveState,
    SquadAssignment, SquadSummary,
};
use crate::error::{Result, SolverError};

/// Default attempt budget per segment
pub const DEFAULT_MAX_ATTEMPTS: u32 = 8;

/// Single-use controller for one segment solve
pub struct RetryController {
    max_attempts: u32,
    rng: StdRng,
    state: SolveState,
    attempts: u32,
}

impl RetryController {
    /// `seed = None` draws the shuffle seed from OS entropy
    pub fn new(max_attempts: u32, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            max_attempts: max_attempts.max(1),
            rng,
            state: SolveState::NotStarted,
            attempts: 0,
        }
    }

    pub fn state(&self) -> SolveState {
        self.state
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    fn transition(&mut self, to: SolveState) -> Result<()> {
        if !self.state.can_transition_to(to) {
            return Err(SolverError::InvalidStateTransition {
                from: self.state.to_string(),
                to: to.to_string(),
            });
        }
        self.state = to;
        Ok(())
    }

    /// Solve one segment
    ///
    /// Always yields a `SegmentResult` for a fresh controller; errors only
    /// when the controller has already run.
    #[allow(clippy::too_many_arguments)]
    pub fn solve(
        &mut self,
        name: &str,
        slots: &[Position],
        pool: &[Candidate],
        excluded_ids: &HashSet<String>,
        spec: &RequirementSpec,
        objective: Objective,
        allow_alt_positions: bool,
    ) -> Result<SegmentResult> {
        self.transition(SolveState::Attempting)?;

        let mut natural = eligible_pool(pool, spec, excluded_ids);
        order_by_objective(&mut natural, objective);

        let mut last: Option<(SegmentFailure, SquadAssignment, SquadSummary)> = None;

        for attempt in 1..=self.max_attempts {
            self.attempts = attempt;

            let shuffled;
            let ordered: &[Candidate] = if attempt == 1 {
                &natural
            } else {
                shuffled = self.reshuffle(&natural, attempt);
                &shuffled
            };

            match assign_ordered(slots, ordered, allow_alt_positions) {
                Ok(squad) => {
                    let verdict = validate(&squad, spec);
                    if verdict.passed {
                        self.transition(SolveState::Passed)?;
                        debug!(segment = name, attempt, "Squad passed validation");
                        return Ok(SegmentResult::passed(name, squad, verdict.summary, attempt));
                    }
                    if let Some(violation) = verdict.violation {
                        debug!(segment = name, attempt, reason = %violation, "Constraint unmet");
                        last = Some((
                            SegmentFailure::ConstraintUnmet(violation),
                            squad,
                            verdict.summary,
                        ));
                    }
                }
                Err(err) => {
                    debug!(segment = name, attempt, slot = %err.slot, slot_index = err.slot_index, "Slot unsatisfiable");
                    let summary = summarize(&err.partial);
                    last = Some((
                        SegmentFailure::SlotUnsatisfiable {
                            slot: err.slot,
                            slot_index: err.slot_index,
                        },
                        err.partial,
                        summary,
                    ));
                }
            }

            // Fewer than two candidates: every reshuffle is the same order
            if natural.len() < 2 {
                break;
            }
        }

        self.transition(SolveState::ExhaustedRetries)?;

        let (failure, partial, summary) = last.ok_or_else(|| {
            SolverError::Internal(format!("segment '{}' ended without an attempt", name))
        })?;
        Ok(SegmentResult::failed(name, failure, partial, summary, self.attempts))
    }

    /// Jittered shuffle: key = index + U(0, spread), spread grows with the attempt
    fn reshuffle(&mut self, natural: &[Candidate], attempt: u32) -> Vec<Candidate> {
        if natural.len() < 2 {
            return natural.to_vec();
        }

        let spread = natural.len() as f64 * attempt as f64 / self.max_attempts as f64;
        let mut keyed: Vec<(f64, &Candidate)> = natural
            .iter()
            .enumerate()
            .map(|(i, c)| (i as f64 + self.rng.gen_range(0.0..spread), c))
            .collect();
        keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
        keyed.into_iter().map(|(_, c)| c.clone()).collect()
    }
}
