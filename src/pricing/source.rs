use async_trait::async_trait;
use std::collections::HashMap;

use crate::error::Result;

/// Where fresh prices come from
///
/// `Ok(None)` means the source has no price for the id. `Err` means the
/// source could not be reached; callers treat both as unknown.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn fetch_price(&self, candidate_id: &str) -> Result<Option<u64>>;
}

/// Fixed price table, used offline and in tests
#[derive(Debug, Clone, Default)]
pub struct StaticPriceSource {
    prices: HashMap<String, u64>,
}

impl StaticPriceSource {
    pub fn new(prices: HashMap<String, u64>) -> Self {
        Self { prices }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PriceSource for StaticPriceSource {
    async fn fetch_price(&self, candidate_id: &str) -> Result<Option<u64>> {
        Ok(self.prices.get(candidate_id).copied())
    }
}
