//! The fee and VAT pipeline.
//!
//! Pure and total: given a minimum bid it always produces a breakdown. A
//! page without a minimum bid never reaches this module.

use lotprice_core::{FeeSchedule, Money, PriceBreakdown, RoundingPolicy};

/// Applies a fee schedule and rounding policy to a bid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PriceCalculator {
    pub fees: FeeSchedule,
    pub rounding: RoundingPolicy,
}

impl PriceCalculator {
    #[must_use]
    pub fn new(fees: FeeSchedule, rounding: RoundingPolicy) -> Self {
        Self { fees, rounding }
    }

    /// Computes the itemised cost of winning at `min_bid`.
    ///
    /// Order: VAT on the bid, buyer's premium on the bid, VAT on the premium,
    /// then VAT on delivery when a delivery amount is known. Components keep
    /// full precision; only `final_price` is rounded.
    #[must_use]
    pub fn compute(&self, min_bid: Money, delivery: Option<Money>) -> PriceBreakdown {
        let vat = min_bid * self.fees.vat_rate;
        let buyer_premium = min_bid * self.fees.buyer_premium_rate;
        let vat_on_premium = buyer_premium * self.fees.vat_rate;
        let vat_on_delivery = delivery.map(|d| d * self.fees.vat_rate);

        let total = min_bid
            + vat
            + buyer_premium
            + vat_on_premium
            + delivery.unwrap_or(Money::ZERO)
            + vat_on_delivery.unwrap_or(Money::ZERO);

        PriceBreakdown {
            min_bid,
            vat,
            buyer_premium,
            vat_on_premium,
            delivery,
            vat_on_delivery,
            final_price: self.rounding.apply(total),
        }
    }
}

/// [`PriceCalculator::compute`] with the UK default schedule and penny rounding.
#[must_use]
pub fn compute_final_price(min_bid: Money, delivery: Option<Money>) -> PriceBreakdown {
    PriceCalculator::default().compute(min_bid, delivery)
}
