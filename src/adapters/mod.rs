pub mod http_prices;

pub use http_prices::HttpPriceSource;
