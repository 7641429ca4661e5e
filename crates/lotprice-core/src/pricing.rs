//! Fee schedule, breakdown, and published snapshot types.

use chrono::{DateTime, Utc};
use rust_decimal::RoundingStrategy;
use serde::{Deserialize, Serialize};

use crate::money::{Money, Rate};

/// How the summed final price is rounded. Breakdown components are never
/// rounded; only `final_price` is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingPolicy {
    /// Two decimal places, midpoint away from zero.
    #[default]
    Penny,
    /// Whole currency units, midpoint away from zero.
    WholePound,
}

impl RoundingPolicy {
    #[must_use]
    pub fn apply(self, amount: Money) -> Money {
        let dp = match self {
            RoundingPolicy::Penny => 2,
            RoundingPolicy::WholePound => 0,
        };
        let rounded = amount
            .amount()
            .round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
        // Rounding a non-negative amount cannot make it negative.
        Money::new(rounded).unwrap_or(Money::ZERO)
    }
}

impl std::fmt::Display for RoundingPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoundingPolicy::Penny => write!(f, "penny"),
            RoundingPolicy::WholePound => write!(f, "whole_pound"),
        }
    }
}

/// Tax and fee rates applied to a lot.
///
/// VAT is charged on the bid, again on the buyer's premium, and on delivery
/// when a delivery amount is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSchedule {
    pub vat_rate: Rate,
    pub buyer_premium_rate: Rate,
}

impl FeeSchedule {
    /// UK auction-house defaults: 20% VAT, 25% buyer's premium.
    #[must_use]
    pub fn uk_default() -> Self {
        Self {
            vat_rate: Rate::from_percent(20),
            buyer_premium_rate: Rate::from_percent(25),
        }
    }
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self::uk_default()
    }
}

/// A single non-collection shipping tier parsed from the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryOption {
    pub description: String,
    pub price: Money,
}

/// Itemised cost of winning a lot at its minimum bid.
///
/// `delivery` and `vat_on_delivery` are both `Some` or both `None`. `None`
/// means no delivery amount was found, which is different from free delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    pub min_bid: Money,
    pub vat: Money,
    pub buyer_premium: Money,
    pub vat_on_premium: Money,
    pub delivery: Option<Money>,
    pub vat_on_delivery: Option<Money>,
    pub final_price: Money,
}

impl PriceBreakdown {
    /// Sum of every component before the rounding policy is applied.
    #[must_use]
    pub fn unrounded_total(&self) -> Money {
        [
            Some(self.min_bid),
            Some(self.vat),
            Some(self.buyer_premium),
            Some(self.vat_on_premium),
            self.delivery,
            self.vat_on_delivery,
        ]
        .into_iter()
        .flatten()
        .sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotError {
    MinimumBidNotFound,
    NoDataAvailable,
}

impl std::fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SnapshotError::MinimumBidNotFound => write!(f, "Minimum bid not found"),
            SnapshotError::NoDataAvailable => write!(f, "No data available"),
        }
    }
}

/// The published result of the latest extraction run.
///
/// Exactly one of `final_price` and `error` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceSnapshot {
    pub final_price: Option<Money>,
    pub min_bid: Option<Money>,
    pub delivery: Option<Money>,
    pub error: Option<SnapshotError>,
    pub breakdown: Option<PriceBreakdown>,
    pub computed_at: Option<DateTime<Utc>>,
}

impl PriceSnapshot {
    #[must_use]
    pub fn priced(breakdown: PriceBreakdown, computed_at: DateTime<Utc>) -> Self {
        Self {
            final_price: Some(breakdown.final_price),
            min_bid: Some(breakdown.min_bid),
            delivery: breakdown.delivery,
            error: None,
            breakdown: Some(breakdown),
            computed_at: Some(computed_at),
        }
    }

    /// A snapshot for a page whose minimum bid could not be extracted.
    /// Any delivery amount found is still reported.
    #[must_use]
    pub fn missing_bid(delivery: Option<Money>, computed_at: DateTime<Utc>) -> Self {
        Self {
            final_price: None,
            min_bid: None,
            delivery,
            error: Some(SnapshotError::MinimumBidNotFound),
            breakdown: None,
            computed_at: Some(computed_at),
        }
    }

    /// Placeholder returned before anything has been computed.
    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            final_price: None,
            min_bid: None,
            delivery: None,
            error: Some(SnapshotError::NoDataAvailable),
            breakdown: None,
            computed_at: None,
        }
    }

    #[must_use]
    pub fn is_priced(&self) -> bool {
        self.final_price.is_some()
    }

    /// Short label for an icon badge: `£<whole units>` or `!` on error.
    #[must_use]
    pub fn badge_text(&self) -> String {
        match self.final_price {
            Some(price) => format!("£{}", price.to_whole_units()),
            None => "!".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use super::*;

    fn money(d: Decimal) -> Money {
        Money::new(d).unwrap()
    }

    #[test]
    fn penny_policy_rounds_half_away_from_zero() {
        assert_eq!(
            RoundingPolicy::Penny.apply(money(dec!(15.015))).amount(),
            dec!(15.02)
        );
    }

    #[test]
    fn whole_pound_policy_rounds_to_integer() {
        assert_eq!(
            RoundingPolicy::WholePound.apply(money(dec!(15.015))).amount(),
            dec!(15)
        );
    }

    #[test]
    fn rounding_policy_deserializes_snake_case() {
        let policy: RoundingPolicy = serde_yaml::from_str("whole_pound").unwrap();
        assert_eq!(policy, RoundingPolicy::WholePound);
    }

    #[test]
    fn uk_default_rates() {
        let fees = FeeSchedule::uk_default();
        assert_eq!(fees.vat_rate.fraction(), dec!(0.20));
        assert_eq!(fees.buyer_premium_rate.fraction(), dec!(0.25));
    }

    #[test]
    fn unrounded_total_ignores_absent_delivery() {
        let breakdown = PriceBreakdown {
            min_bid: money(dec!(100)),
            vat: money(dec!(20)),
            buyer_premium: money(dec!(25)),
            vat_on_premium: money(dec!(5)),
            delivery: None,
            vat_on_delivery: None,
            final_price: money(dec!(150)),
        };
        assert_eq!(breakdown.unrounded_total().amount(), dec!(150));
    }

    #[test]
    fn missing_bid_snapshot_keeps_delivery_and_sets_error() {
        let snap = PriceSnapshot::missing_bid(Some(money(dec!(4.99))), Utc::now());
        assert!(!snap.is_priced());
        assert_eq!(snap.error, Some(SnapshotError::MinimumBidNotFound));
        assert_eq!(snap.delivery, Some(money(dec!(4.99))));
        assert_eq!(snap.badge_text(), "!");
    }

    #[test]
    fn badge_text_rounds_to_whole_units() {
        let breakdown = PriceBreakdown {
            min_bid: money(dec!(10)),
            vat: money(dec!(2)),
            buyer_premium: money(dec!(2.5)),
            vat_on_premium: money(dec!(0.5)),
            delivery: None,
            vat_on_delivery: None,
            final_price: money(dec!(15.5)),
        };
        let snap = PriceSnapshot::priced(breakdown, Utc::now());
        assert_eq!(snap.badge_text(), "£16");
    }

    #[test]
    fn unavailable_snapshot_serializes_error_as_snake_case() {
        let json = serde_json::to_value(PriceSnapshot::unavailable()).unwrap();
        assert_eq!(json["error"], "no_data_available");
        assert!(json["final_price"].is_null());
    }
}
