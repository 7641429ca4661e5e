//! Holds the most recently computed price for on-demand reads.

use lotprice_core::PriceSnapshot;

use crate::engine::PriceEngine;

/// The latest [`PriceSnapshot`] for one page.
///
/// Owned by whoever drives recomputation; there is no shared global state.
/// Each [`recompute`](Self::recompute) replaces the held snapshot, so the
/// last write wins.
#[derive(Debug, Clone)]
pub struct PriceCache {
    engine: PriceEngine,
    current: Option<PriceSnapshot>,
}

impl PriceCache {
    #[must_use]
    pub fn new(engine: PriceEngine) -> Self {
        Self {
            engine,
            current: None,
        }
    }

    #[must_use]
    pub fn engine(&self) -> &PriceEngine {
        &self.engine
    }

    /// The held snapshot, or a "no data available" snapshot if nothing has
    /// been computed yet.
    #[must_use]
    pub fn get(&self) -> PriceSnapshot {
        self.current
            .clone()
            .unwrap_or_else(PriceSnapshot::unavailable)
    }

    /// Re-extracts and re-prices `page_html` and stores the result.
    pub fn recompute(&mut self, page_html: &str) -> &PriceSnapshot {
        let snapshot = self.engine.quote(page_html);
        match (&snapshot.final_price, &snapshot.error) {
            (Some(price), _) => tracing::info!(final_price = %price, "price recomputed"),
            (None, Some(error)) => tracing::info!(%error, "price unavailable"),
            (None, None) => {}
        }
        self.current.insert(snapshot)
    }
}
