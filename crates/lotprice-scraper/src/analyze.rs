//! Diagnostics for adapting a site profile to a new page layout.
//!
//! Reports which strategy of each locator matched, what the shipping region
//! rows parse to, and which currency literals appear anywhere on the page.

use std::collections::HashSet;

use scraper::Html;
use serde::Serialize;

use crate::delivery::{leaf_elements, DeliveryRow};
use crate::engine::PriceEngine;
use crate::locator::{element_text, CandidateLocator};

/// How many distinct currency literals a report lists.
pub const MAX_CURRENCY_SAMPLES: usize = 10;

/// The first strategy of a locator that matched, and the element's text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocatorHit {
    pub locator: String,
    pub strategy_index: usize,
    pub selector: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageReport {
    /// One entry per locator that matched; locators that matched nothing
    /// are listed in `unmatched`.
    pub hits: Vec<LocatorHit>,
    pub unmatched: Vec<String>,
    pub delivery_rows: Vec<DeliveryRow>,
    pub currency_samples: Vec<String>,
}

impl PageReport {
    #[must_use]
    pub fn build(engine: &PriceEngine, page_html: &str) -> Self {
        let document = Html::parse_document(page_html);

        let mut hits = Vec::new();
        let mut unmatched = Vec::new();
        let locators = engine
            .bid_sources()
            .iter()
            .map(|s| &s.locator)
            .chain(std::iter::once(engine.delivery().region_locator()));
        for (position, locator) in locators.enumerate() {
            match probe(locator, &document) {
                Some(mut hit) => {
                    // Bid sources are single-selector locators; report their
                    // position in the chain instead.
                    if position < engine.bid_sources().len() {
                        hit.strategy_index = position;
                    }
                    hits.push(hit);
                }
                None => unmatched.push(describe(locator)),
            }
        }

        Self {
            hits,
            unmatched,
            delivery_rows: engine.delivery().rows(&document),
            currency_samples: currency_samples(engine, &document),
        }
    }
}

fn probe(locator: &CandidateLocator, document: &Html) -> Option<LocatorHit> {
    let resolved = locator.resolve_with_index(document)?;
    let selector = locator
        .selectors()
        .nth(resolved.strategy_index)
        .unwrap_or_default()
        .to_owned();
    Some(LocatorHit {
        locator: locator.name().to_owned(),
        strategy_index: resolved.strategy_index,
        selector,
        text: element_text(&resolved.value),
    })
}

fn describe(locator: &CandidateLocator) -> String {
    format!(
        "{} ({})",
        locator.name(),
        locator.selectors().collect::<Vec<_>>().join(", ")
    )
}

/// Distinct currency literals in leaf text, in document order.
fn currency_samples(engine: &PriceEngine, document: &Html) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut samples = Vec::new();
    for element in leaf_elements(document) {
        let text = element_text(&element);
        for literal in engine.currency().find_all(&text) {
            if seen.insert(literal.to_owned()) {
                samples.push(literal.to_owned());
                if samples.len() == MAX_CURRENCY_SAMPLES {
                    return samples;
                }
            }
        }
    }
    samples
}
