pub mod analyze;
pub mod cache;
pub mod calculator;
pub mod client;
pub mod delivery;
pub mod engine;
pub mod error;
pub mod locator;
pub mod parse;
pub(crate) mod rate_limit;

pub use analyze::{LocatorHit, PageReport};
pub use cache::PriceCache;
pub use calculator::{compute_final_price, PriceCalculator};
pub use client::PageClient;
pub use delivery::{DeliveryRow, DeliverySelector, KeywordSet};
pub use engine::{Extraction, PriceEngine};
pub use error::{EngineError, FetchError};
pub use locator::{resolve_first, CandidateLocator, Resolved};
pub use parse::{parse_amount, AmountPattern};
