//! Compiles a [`SiteProfile`] into a ready-to-run extraction pipeline.

use chrono::Utc;
use lotprice_core::{Money, PriceSnapshot, SiteProfile};
use scraper::Html;

use crate::calculator::PriceCalculator;
use crate::delivery::{DeliverySelector, DeliverySelectorConfig, KeywordSet};
use crate::error::EngineError;
use crate::locator::{element_text, resolve_first, CandidateLocator};
use crate::parse::{parse_amount, AmountPattern};

/// One place the minimum bid may be read from, with the pattern used to
/// pull the figure out of that element's text.
#[derive(Debug, Clone)]
pub struct BidSource {
    pub locator: CandidateLocator,
    pub pattern: AmountPattern,
}

impl BidSource {
    fn read(&self, document: &Html) -> Option<Money> {
        let element = self.locator.resolve(document)?;
        let text = element_text(&element);
        let amount = parse_amount(Some(text.as_str()), &self.pattern);
        if amount.is_none() {
            tracing::trace!(text = %text, pattern = self.pattern.as_str(), "bid source text has no amount");
        }
        amount
    }
}

/// The raw figures extracted from one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extraction {
    pub min_bid: Option<Money>,
    pub delivery: Option<Money>,
}

#[derive(Debug, Clone)]
pub struct PriceEngine {
    currency: AmountPattern,
    bid_sources: Vec<BidSource>,
    delivery: DeliverySelector,
    calculator: PriceCalculator,
}

impl PriceEngine {
    /// Compiles every pattern and selector in `profile`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] if any pattern or selector is invalid.
    pub fn from_profile(profile: &SiteProfile) -> Result<Self, EngineError> {
        let currency = AmountPattern::new(&profile.currency_pattern, "currency")?;

        let bid_sources = profile
            .min_bid
            .iter()
            .map(|source| {
                let pattern = match &source.pattern {
                    Some(p) => AmountPattern::new(p, "min_bid")?,
                    None => currency.clone(),
                };
                let locator = CandidateLocator::new("min_bid", &[source.selector.as_str()])?;
                Ok(BidSource { locator, pattern })
            })
            .collect::<Result<Vec<_>, EngineError>>()?;
        if bid_sources.is_empty() {
            return Err(EngineError::EmptyLocator {
                context: "min_bid".to_owned(),
            });
        }

        let delivery = DeliverySelector::new(
            DeliverySelectorConfig {
                region: profile.delivery.region.as_slice(),
                row_selector: &profile.delivery.row_selector,
                cell_selector: &profile.delivery.cell_selector,
                delivery_keyword_pattern: &profile.delivery_keyword_pattern,
                exclusions: KeywordSet::new(&profile.exclusion_keywords),
            },
            currency.clone(),
        )?;

        tracing::debug!(
            profile = %profile.name,
            bid_sources = bid_sources.len(),
            rounding = %profile.rounding,
            "compiled site profile"
        );

        Ok(Self {
            currency,
            bid_sources,
            delivery,
            calculator: PriceCalculator::new(profile.fees, profile.rounding),
        })
    }

    #[must_use]
    pub fn currency(&self) -> &AmountPattern {
        &self.currency
    }

    #[must_use]
    pub fn bid_sources(&self) -> &[BidSource] {
        &self.bid_sources
    }

    #[must_use]
    pub fn delivery(&self) -> &DeliverySelector {
        &self.delivery
    }

    #[must_use]
    pub fn calculator(&self) -> &PriceCalculator {
        &self.calculator
    }

    /// The minimum bid from the first bid source that yields an amount.
    #[must_use]
    pub fn extract_min_bid(&self, document: &Html) -> Option<Money> {
        match resolve_first(&self.bid_sources, |source| source.read(document)) {
            Some(hit) => {
                tracing::debug!(
                    min_bid = %hit.value,
                    source = hit.strategy_index,
                    "found minimum bid"
                );
                Some(hit.value)
            }
            None => {
                tracing::debug!("minimum bid not found");
                None
            }
        }
    }

    #[must_use]
    pub fn extract_document(&self, document: &Html) -> Extraction {
        Extraction {
            min_bid: self.extract_min_bid(document),
            delivery: self.delivery.select_cheapest(document),
        }
    }

    #[must_use]
    pub fn extract(&self, page_html: &str) -> Extraction {
        self.extract_document(&Html::parse_document(page_html))
    }

    /// Extracts and prices `page_html`. A page without a minimum bid yields
    /// an error snapshot that still carries any delivery amount found.
    #[must_use]
    pub fn quote(&self, page_html: &str) -> PriceSnapshot {
        let Extraction { min_bid, delivery } = self.extract(page_html);
        let now = Utc::now();
        match min_bid {
            Some(bid) => PriceSnapshot::priced(self.calculator.compute(bid, delivery), now),
            None => PriceSnapshot::missing_bid(delivery, now),
        }
    }
}

#[cfg(test)]
mod tests {
    use lotprice_core::{builtin_profile, BidSourceConfig, SnapshotError};
    use rust_decimal_macros::dec;

    use super::*;

    fn engine() -> PriceEngine {
        PriceEngine::from_profile(&builtin_profile().unwrap()).unwrap()
    }

    #[test]
    fn number_part_is_preferred_over_container_text() {
        let html = r#"
            <div class="detail__minbid">
                Minimum bid £99.00
                <span class="Bidding_Listing_MinPrice"><span class="NumberPart">12.50</span></span>
            </div>"#;
        assert_eq!(
            engine().extract(html).min_bid.map(Money::amount),
            Some(dec!(12.50))
        );
    }

    #[test]
    fn container_text_is_used_when_number_part_is_missing() {
        let html = r#"<div class="detail__minbid">Minimum bid: £1,250.00</div>"#;
        assert_eq!(
            engine().extract(html).min_bid.map(Money::amount),
            Some(dec!(1250.00))
        );
    }

    #[test]
    fn number_part_without_digits_falls_through() {
        let html = r#"
            <div class="detail__minbid">
                Minimum bid £8.00
                <span class="Bidding_Listing_MinPrice"><span class="NumberPart">--</span></span>
            </div>"#;
        assert_eq!(
            engine().extract(html).min_bid.map(Money::amount),
            Some(dec!(8.00))
        );
    }

    #[test]
    fn missing_bid_yields_error_snapshot_with_delivery() {
        let html = r#"<p>Delivery £4.99</p>"#;
        let snap = engine().quote(html);
        assert_eq!(snap.error, Some(SnapshotError::MinimumBidNotFound));
        assert_eq!(snap.final_price, None);
        assert_eq!(snap.delivery.map(Money::amount), Some(dec!(4.99)));
        assert!(snap.computed_at.is_some());
    }

    #[test]
    fn implausibly_large_bid_is_not_found() {
        let html = r#"<div class="detail__minbid">Minimum bid £60,000,000,000,000,000,000,000,000,000</div>"#;
        let snap = engine().quote(html);
        assert_eq!(snap.error, Some(SnapshotError::MinimumBidNotFound));
        assert_eq!(snap.final_price, None);
    }

    #[test]
    fn quote_prices_bid_and_delivery() {
        let html = r#"
            <div class="detail__minbid">Minimum bid £100.00</div>
            <table class="table shipping-table">
                <tr><td>Collection</td><td>£0.00</td></tr>
                <tr><td>Courier</td><td>£10.00</td></tr>
            </table>"#;
        let snap = engine().quote(html);
        assert_eq!(snap.error, None);
        assert_eq!(snap.final_price.map(Money::amount), Some(dec!(162)));
        assert_eq!(snap.badge_text(), "£162");
    }

    #[test]
    fn source_pattern_defaults_to_currency_pattern() {
        let mut profile = builtin_profile().unwrap();
        profile.min_bid = vec![BidSourceConfig {
            selector: ".bid".to_owned(),
            pattern: None,
        }];
        let engine = PriceEngine::from_profile(&profile).unwrap();
        // Without a currency symbol the default pattern does not match.
        assert_eq!(engine.extract(r#"<p class="bid">40.00</p>"#).min_bid, None);
        assert_eq!(
            engine
                .extract(r#"<p class="bid">£40.00</p>"#)
                .min_bid
                .map(Money::amount),
            Some(dec!(40.00))
        );
    }

    #[test]
    fn invalid_currency_pattern_is_rejected() {
        let mut profile = builtin_profile().unwrap();
        profile.currency_pattern = "£[".to_owned();
        let err = PriceEngine::from_profile(&profile).unwrap_err();
        assert!(matches!(err, EngineError::InvalidPattern { ref context, .. } if context == "currency"));
    }

    #[test]
    fn invalid_bid_selector_is_rejected() {
        let mut profile = builtin_profile().unwrap();
        profile.min_bid[0].selector = "div[".to_owned();
        let err = PriceEngine::from_profile(&profile).unwrap_err();
        assert!(matches!(err, EngineError::InvalidSelector { .. }));
    }

    #[test]
    fn empty_bid_sources_are_rejected() {
        let mut profile = builtin_profile().unwrap();
        profile.min_bid.clear();
        let err = PriceEngine::from_profile(&profile).unwrap_err();
        assert!(matches!(err, EngineError::EmptyLocator { .. }));
    }
}
