//! Input validation for solve requests
//!
//! Rejects malformed requests before any assignment work starts, so engine
//! code can assume well-formed candidates and segments.
use crate::domain::{Candidate, Segment, MAX_CARD_RATING, MIN_CARD_RATING};
use crate::error::{Result, SolverError};
use std::collections::HashSet;

/// Validate a whole request
///
/// # Returns
/// * `Ok(())` if every segment and candidate is well formed
/// * `Err(SolverError::InputValidation)` naming the first problem found
pub fn validate_request(segments: &[Segment], candidates: &[Candidate]) -> Result<()> {
    if segments.is_empty() {
        return Err(SolverError::InputValidation(
            "request has no segments".to_string(),
        ));
    }

    if candidates.is_empty() {
        return Err(SolverError::InputValidation(
            "request has no candidates".to_string(),
        ));
    }

    for segment in segments {
        validate_segment(segment)?;
    }

    validate_unique_ids(candidates)?;
    for candidate in candidates {
        validate_candidate(candidate)?;
    }

    Ok(())
}

/// Validate one candidate record
pub fn validate_candidate(candidate: &Candidate) -> Result<()> {
    if candidate.id.trim().is_empty() {
        return Err(SolverError::InputValidation(
            "candidate id cannot be empty".to_string(),
        ));
    }

    if !(MIN_CARD_RATING..=MAX_CARD_RATING).contains(&candidate.rating) {
        return Err(SolverError::InputValidation(format!(
            "candidate {} rating {} outside {}-{}",
            candidate.id, candidate.rating, MIN_CARD_RATING, MAX_CARD_RATING
        )));
    }

    Ok(())
}

/// Candidate ids must be unique across the pool
pub fn validate_unique_ids(candidates: &[Candidate]) -> Result<()> {
    let mut seen = HashSet::with_capacity(candidates.len());
    for candidate in candidates {
        if !seen.insert(candidate.id.as_str()) {
            return Err(SolverError::InputValidation(format!(
                "duplicate candidate id: {}",
                candidate.id
            )));
        }
    }
    Ok(())
}

/// Validate one segment's name, slots and requirement bounds
pub fn validate_segment(segment: &Segment) -> Result<()> {
    if segment.name.trim().is_empty() {
        return Err(SolverError::InputValidation(
            "segment name cannot be empty".to_string(),
        ));
    }

    let spec = &segment.requirements;
    if spec.resolved_slots().is_empty() {
        return Err(SolverError::InputValidation(format!(
            "segment '{}' has no slots or formation",
            segment.name
        )));
    }

    if let (Some(min), Some(max)) = (spec.min_rating, spec.max_rating) {
        if min > max {
            return Err(SolverError::InputValidation(format!(
                "segment '{}' min_rating {} exceeds max_rating {}",
                segment.name, min, max
            )));
        }
    }

    if let Some(chemistry) = spec.min_chemistry {
        if chemistry > 100 {
            return Err(SolverError::InputValidation(format!(
                "segment '{}' min_chemistry {} exceeds 100",
                segment.name, chemistry
            )));
        }
    }

    if let Some(avg) = spec.min_squad_rating {
        if !avg.is_finite() || avg < 0.0 {
            return Err(SolverError::InputValidation(format!(
                "segment '{}' min_squad_rating must be a non-negative number",
                segment.name
            )));
        }
    }

    Ok(())
}
