//! TTL price cache
//!
//! Last-known prices keyed by candidate id. Reads never touch the network;
//! `refresh_batch` pulls fresh values from the configured `PriceSource` in
//! bounded-concurrency waves.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use futures::stream::{self, Stream, StreamExt};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

use super::source::PriceSource;
use crate::config::CacheConfig;
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PriceEntry {
    price: u64,
    fetched_at: DateTime<Utc>,
}

/// Result of a cache read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PriceLookup {
    pub price: Option<u64>,
    /// True when the entry is older than the TTL or missing
    pub is_stale: bool,
    pub fetched_at: Option<DateTime<Utc>>,
}

impl PriceLookup {
    fn unknown() -> Self {
        Self {
            price: None,
            is_stale: true,
            fetched_at: None,
        }
    }
}

/// Outcome of one batch refresh
///
/// Fetches that finish before a deadline are recorded as they complete;
/// ids still in flight or never reached are absent from `prices`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshReport {
    pub prices: HashMap<String, Option<u64>>,
    pub waves: usize,
    pub failures: usize,
    pub cancelled: bool,
}

impl RefreshReport {
    fn record(&mut self, id: String, outcome: Result<Option<u64>>) {
        let price = match outcome {
            Ok(price) => price,
            Err(e) => {
                warn!(candidate_id = %id, error = %e, "Price fetch failed");
                self.failures += 1;
                None
            }
        };
        self.prices.insert(id, price);
    }

    pub fn known_count(&self) -> usize {
        self.prices.values().filter(|p| p.is_some()).count()
    }
}

/// Thread-safe price cache
pub struct PriceCache {
    entries: DashMap<String, PriceEntry>,
    source: Arc<dyn PriceSource>,
    ttl: Duration,
    wave_delay: Duration,
}

impl PriceCache {
    pub fn new(source: Arc<dyn PriceSource>, ttl: Duration, wave_delay: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            source,
            ttl,
            wave_delay,
        }
    }

    pub fn from_config(source: Arc<dyn PriceSource>, config: &CacheConfig) -> Self {
        Self::new(
            source,
            Duration::from_secs(config.ttl_secs),
            Duration::from_millis(config.wave_delay_ms),
        )
    }

    /// Last known price and whether it has outlived the TTL
    pub fn get(&self, candidate_id: &str) -> PriceLookup {
        match self.entries.get(candidate_id) {
            Some(entry) => PriceLookup {
                price: Some(entry.price),
                is_stale: self.is_stale(entry.fetched_at),
                fetched_at: Some(entry.fetched_at),
            },
            None => PriceLookup::unknown(),
        }
    }

    fn is_stale(&self, fetched_at: DateTime<Utc>) -> bool {
        // A timestamp in the future counts as fresh
        match (Utc::now() - fetched_at).to_std() {
            Ok(age) => age > self.ttl,
            Err(_) => false,
        }
    }

    /// Write a price seen outside a refresh (e.g. a market observer)
    pub fn record_observed(&self, candidate_id: &str, price: u64) {
        self.insert_at(candidate_id, price, Utc::now());
    }

    /// Write a price with an explicit fetch time
    pub fn insert_at(&self, candidate_id: &str, price: u64, fetched_at: DateTime<Utc>) {
        self.entries
            .insert(candidate_id.to_string(), PriceEntry { price, fetched_at });
    }

    pub fn invalidate_all(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Refresh prices with at most `concurrency` requests in flight
    pub async fn refresh_batch(&self, ids: &[String], concurrency: usize) -> RefreshReport {
        self.refresh_batch_until(ids, concurrency, None).await
    }

    /// Refresh prices, abandoning the in-flight wave once `deadline` elapses
    ///
    /// Ids are processed in waves of `concurrency` with the configured delay
    /// between waves. The deadline also cuts the delay short. Prices written
    /// before the deadline stay in the cache.
    pub async fn refresh_batch_until(
        &self,
        ids: &[String],
        concurrency: usize,
        deadline: Option<Duration>,
    ) -> RefreshReport {
        let concurrency = concurrency.max(1);
        let deadline = deadline.map(|d| Instant::now() + d);
        let mut report = RefreshReport::default();

        for (index, wave) in ids.chunks(concurrency).enumerate() {
            if index > 0 && !self.wave_delay.is_zero() {
                let resume = Instant::now() + self.wave_delay;
                tokio::time::sleep_until(deadline.map_or(resume, |d| d.min(resume))).await;
            }

            if deadline.is_some_and(|d| Instant::now() >= d) {
                report.cancelled = true;
                break;
            }

            report.waves += 1;
            let fetches = self.fetch_wave(wave, concurrency);
            futures::pin_mut!(fetches);
            loop {
                let next = match deadline {
                    Some(d) => match tokio::time::timeout_at(d, fetches.next()).await {
                        Ok(next) => next,
                        Err(_) => {
                            report.cancelled = true;
                            break;
                        }
                    },
                    None => fetches.next().await,
                };
                let Some((id, outcome)) = next else {
                    break;
                };
                report.record(id, outcome);
            }

            if report.cancelled {
                break;
            }
        }

        if report.cancelled {
            warn!(
                requested = ids.len(),
                refreshed = report.prices.len(),
                waves = report.waves,
                "Price refresh hit its deadline"
            );
        } else {
            debug!(
                requested = ids.len(),
                known = report.known_count(),
                failures = report.failures,
                waves = report.waves,
                "Price refresh complete"
            );
        }

        report
    }

    /// Fetch one wave, writing each price as soon as its request completes
    fn fetch_wave<'a>(
        &'a self,
        wave: &'a [String],
        concurrency: usize,
    ) -> impl Stream<Item = (String, Result<Option<u64>>)> + 'a {
        stream::iter(wave.iter().cloned())
            .map(move |id| async move {
                let outcome = self.source.fetch_price(&id).await;
                if let Ok(Some(price)) = outcome {
                    self.insert_at(&id, price, Utc::now());
                }
                (id, outcome)
            })
            .buffer_unordered(concurrency)
    }
}
