//! Cheapest-delivery selection.
//!
//! The shipping table is the primary source: every row that parses to an
//! amount and is not a pickup option is a candidate, and the cheapest wins.
//! When the table is missing or yields nothing, leaf text anywhere on the
//! page is scanned for a delivery-keyword line carrying an amount.

use lotprice_core::{DeliveryOption, Money};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;

use crate::error::EngineError;
use crate::locator::{compile_selector, element_text, CandidateLocator};
use crate::parse::{parse_amount, AmountPattern};

/// Tags whose contents are never visible page text.
const NON_TEXT_TAGS: [&str; 4] = ["script", "style", "noscript", "template"];

/// A case-insensitive "contains any of" predicate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordSet {
    keywords: Vec<String>,
}

impl KeywordSet {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        Self { keywords }
    }

    #[must_use]
    pub fn matches(&self, text: &str) -> bool {
        if self.keywords.is_empty() {
            return false;
        }
        let lower = text.to_lowercase();
        self.keywords.iter().any(|k| lower.contains(k.as_str()))
    }

    #[must_use]
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }
}

/// One row of the shipping region as read from the page, before filtering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeliveryRow {
    pub description: String,
    pub price: Option<Money>,
    pub excluded: bool,
}

impl DeliveryRow {
    fn into_option(self) -> Option<DeliveryOption> {
        if self.excluded {
            return None;
        }
        self.price.map(|price| DeliveryOption {
            description: self.description,
            price,
        })
    }
}

/// Static configuration for [`DeliverySelector`].
pub struct DeliverySelectorConfig<'a, S: AsRef<str>> {
    pub region: &'a [S],
    pub row_selector: &'a str,
    pub cell_selector: &'a str,
    pub delivery_keyword_pattern: &'a str,
    pub exclusions: KeywordSet,
}

#[derive(Debug, Clone)]
pub struct DeliverySelector {
    region: CandidateLocator,
    row_selector: Selector,
    cell_selector: Selector,
    delivery_keywords: Regex,
    exclusions: KeywordSet,
    currency: AmountPattern,
}

impl DeliverySelector {
    /// # Errors
    ///
    /// Returns [`EngineError`] if any selector or the keyword pattern is invalid.
    pub fn new<S: AsRef<str>>(
        config: DeliverySelectorConfig<'_, S>,
        currency: AmountPattern,
    ) -> Result<Self, EngineError> {
        let region = CandidateLocator::new("delivery region", config.region)?;
        let row_selector = compile_selector(config.row_selector, "delivery row")?;
        let cell_selector = compile_selector(config.cell_selector, "delivery cell")?;
        let delivery_keywords = Regex::new(config.delivery_keyword_pattern).map_err(|source| {
            EngineError::InvalidPattern {
                context: "delivery keyword".to_owned(),
                pattern: config.delivery_keyword_pattern.to_owned(),
                source,
            }
        })?;

        Ok(Self {
            region,
            row_selector,
            cell_selector,
            delivery_keywords,
            exclusions: config.exclusions,
            currency,
        })
    }

    #[must_use]
    pub fn region_locator(&self) -> &CandidateLocator {
        &self.region
    }

    /// The cheapest delivery amount on the page, or `None` if there is none.
    #[must_use]
    pub fn select_cheapest(&self, document: &Html) -> Option<Money> {
        if let Some(price) = cheapest(&self.options(document)) {
            tracing::debug!(%price, "selected cheapest delivery option");
            return Some(price);
        }

        let fallback = self.scan_leaf_text(document);
        match fallback {
            Some(price) => tracing::debug!(%price, "found delivery cost in page text"),
            None => tracing::debug!("delivery cost not found"),
        }
        fallback
    }

    /// Every row in the shipping region, including excluded and unpriced rows.
    #[must_use]
    pub fn rows(&self, document: &Html) -> Vec<DeliveryRow> {
        let Some(region) = self.region.resolve(document) else {
            return Vec::new();
        };

        let mut rows: Vec<ElementRef<'_>> = region.select(&self.row_selector).collect();
        if rows.is_empty() {
            // A free-text region with no row markup is read as a single row.
            rows.push(region);
        }

        rows.iter().map(|row| self.read_row(row)).collect()
    }

    /// Priced, non-excluded shipping options in page order.
    #[must_use]
    pub fn options(&self, document: &Html) -> Vec<DeliveryOption> {
        self.rows(document)
            .into_iter()
            .filter_map(DeliveryRow::into_option)
            .collect()
    }

    fn read_row(&self, row: &ElementRef<'_>) -> DeliveryRow {
        let row_text = element_text(row);
        let mut cells: Vec<String> = row
            .select(&self.cell_selector)
            .map(|cell| element_text(&cell))
            .collect();
        if cells.is_empty() {
            cells.push(row_text.clone());
        }

        // Price comes from the right-most cell that holds an amount.
        let priced = cells
            .iter()
            .enumerate()
            .rev()
            .find_map(|(idx, text)| {
                parse_amount(Some(text.as_str()), &self.currency).map(|p| (idx, p))
            });

        let description = match priced {
            Some((price_idx, _)) if cells.len() > 1 => cells
                .iter()
                .enumerate()
                .filter(|(idx, _)| *idx != price_idx)
                .map(|(_, text)| text.as_str())
                .filter(|text| !text.is_empty())
                .collect::<Vec<_>>()
                .join(" "),
            _ => row_text.clone(),
        };

        let excluded = self.exclusions.matches(&row_text);
        if excluded {
            tracing::debug!(row = %row_text, "skipping excluded delivery row");
        }

        DeliveryRow {
            description,
            price: priced.map(|(_, p)| p),
            excluded,
        }
    }

    /// First leaf element, in document order, that mentions delivery and
    /// carries an amount.
    fn scan_leaf_text(&self, document: &Html) -> Option<Money> {
        leaf_elements(document).find_map(|el| {
            let text = element_text(&el);
            if !self.delivery_keywords.is_match(&text)
                || !self.currency.is_match(&text)
                || self.exclusions.matches(&text)
            {
                return None;
            }
            parse_amount(Some(text.as_str()), &self.currency)
        })
    }
}

/// Elements with no element children, in document order, skipping
/// non-visible containers such as `<script>`.
pub(crate) fn leaf_elements(document: &Html) -> impl Iterator<Item = ElementRef<'_>> {
    document
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|el| !NON_TEXT_TAGS.contains(&el.value().name()))
        .filter(|el| !el.children().any(|child| child.value().is_element()))
}

/// Minimum price; on a tie the first option seen is kept.
fn cheapest(options: &[DeliveryOption]) -> Option<Money> {
    options.iter().map(|o| o.price).fold(None, |best, price| match best {
        Some(b) if b <= price => Some(b),
        _ => Some(price),
    })
}

#[cfg(test)]
#[path = "delivery_test.rs"]
mod tests;
