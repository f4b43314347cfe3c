//! Price lookup and freshness tracking

pub mod cache;
pub mod source;

pub use cache::{PriceCache, PriceLookup, RefreshReport};
pub use source::{PriceSource, StaticPriceSource};

#[cfg(test)]
pub use source::MockPriceSource;
