pub mod adapters;
pub mod cli;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod pricing;
pub mod services;
pub mod validation;

pub use adapters::HttpPriceSource;
pub use config::AppConfig;
pub use domain::{
    Candidate, Formation, MultiSegmentResult, Objective, Position, Priority, RequirementSpec,
    Segment, SegmentResult, SegmentStatus, SolveOptions, SolveState,
};
pub use engine::{OrchestratorSettings, RetryController, SegmentOrchestrator};
pub use error::{Result, SolverError};
pub use pricing::{PriceCache, PriceLookup, PriceSource, RefreshReport, StaticPriceSource};
pub use services::{SolveRequest, SolveResponse, SolverService};
