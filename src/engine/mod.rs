//! Synchronous solving core
//!
//! Assignment, validation and the retry loop never touch the network. The
//! orchestrator is the only part that talks to the price cache.

pub mod assignment;
pub mod orchestrator;
pub mod retry;
pub mod validator;

#[cfg(test)]
mod fixtures;

pub use assignment::{assign, eligible_pool, order_by_objective, SlotUnsatisfiable};
pub use orchestrator::{OrchestratorSettings, SegmentOrchestrator};
pub use retry::{RetryController, DEFAULT_MAX_ATTEMPTS};
pub use validator::{chemistry_estimate, summarize, validate, Validation};
