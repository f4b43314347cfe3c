//! Solve service
//!
//! Entry point used by the CLI: validates a request, runs the orchestrator
//! and tags the run with a solve id.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::domain::{Candidate, SegmentResult, Segment, SolveOptions};
use crate::engine::{OrchestratorSettings, SegmentOrchestrator};
use crate::error::Result;
use crate::pricing::PriceCache;
use crate::validation::validate_request;

/// Solve request body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveRequest {
    #[serde(default)]
    pub segments: Vec<Segment>,
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    /// Falls back to the `solver` config section when absent
    #[serde(default)]
    pub options: Option<SolveOptions>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveResponse {
    pub solve_id: Uuid,
    pub solutions: Vec<SegmentResult>,
    pub cumulative_cost: u64,
    pub consumed_ids: BTreeSet<String>,
}

pub struct SolverService {
    config: AppConfig,
    cache: Arc<PriceCache>,
}

impl SolverService {
    pub fn new(config: AppConfig, cache: Arc<PriceCache>) -> Self {
        Self { config, cache }
    }

    fn default_options(&self) -> SolveOptions {
        SolveOptions {
            objective: self.config.solver.objective,
            allow_alt_positions: self.config.solver.allow_alt_positions,
        }
    }

    pub async fn solve(&self, request: SolveRequest) -> Result<SolveResponse> {
        let solve_id = Uuid::new_v4();
        let span = info_span!(
            "solve",
            %solve_id,
            segments = request.segments.len(),
            candidates = request.candidates.len()
        );

        async move {
            if let Err(e) = validate_request(&request.segments, &request.candidates) {
                warn!(error = %e, "Rejected solve request");
                return Err(e);
            }

            let options = request.options.unwrap_or_else(|| self.default_options());
            let settings = OrchestratorSettings::from_config(&self.config);
            let orchestrator = SegmentOrchestrator::new(&self.cache, settings);

            let result = orchestrator
                .solve_all(&request.segments, &request.candidates, &options)
                .await?;

            info!(
                solved = result.solved_count(),
                total = result.segments.len(),
                cumulative_cost = result.cumulative_cost,
                "Solve complete"
            );

            Ok(SolveResponse {
                solve_id,
                solutions: result.segments,
                cumulative_cost: result.cumulative_cost,
                consumed_ids: result.consumed_ids,
            })
        }
        .instrument(span)
        .await
    }
}
