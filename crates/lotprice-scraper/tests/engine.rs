//! End-to-end extraction and pricing against a captured lot-details page.

use lotprice_core::{builtin_profile, Money, RoundingPolicy, SnapshotError};
use lotprice_scraper::{PageReport, PriceCache, PriceEngine};
use rust_decimal_macros::dec;

const LOT_PAGE: &str = include_str!("fixtures/johnpye_lot.html");

fn engine() -> PriceEngine {
    PriceEngine::from_profile(&builtin_profile().expect("builtin profile"))
        .expect("builtin profile compiles")
}

#[test]
fn extracts_bid_and_cheapest_non_collection_delivery() {
    let extraction = engine().extract(LOT_PAGE);
    assert_eq!(extraction.min_bid.map(Money::amount), Some(dec!(1040.00)));
    assert_eq!(extraction.delivery.map(Money::amount), Some(dec!(14.99)));
}

#[test]
fn quotes_full_breakdown() {
    let snapshot = engine().quote(LOT_PAGE);
    let breakdown = snapshot.breakdown.clone().expect("priced snapshot");

    assert_eq!(breakdown.vat.amount(), dec!(208));
    assert_eq!(breakdown.buyer_premium.amount(), dec!(260));
    assert_eq!(breakdown.vat_on_premium.amount(), dec!(52));
    assert_eq!(breakdown.vat_on_delivery.map(Money::amount), Some(dec!(2.998)));
    assert_eq!(breakdown.final_price.amount(), dec!(1577.99));

    assert_eq!(snapshot.error, None);
    assert_eq!(snapshot.badge_text(), "£1578");
}

#[test]
fn whole_pound_profile_rounds_final_price() {
    let mut profile = builtin_profile().unwrap();
    profile.rounding = RoundingPolicy::WholePound;
    let engine = PriceEngine::from_profile(&profile).unwrap();
    assert_eq!(
        engine.quote(LOT_PAGE).final_price.map(Money::amount),
        Some(dec!(1578))
    );
}

#[test]
fn page_without_shipping_table_falls_back_to_delivery_text() {
    let start = LOT_PAGE.find("<table").unwrap();
    let end = LOT_PAGE.find("</table>").unwrap() + "</table>".len();
    let page = format!(
        "{}<p>Delivery to UK mainland: £19.95</p>{}",
        &LOT_PAGE[..start],
        &LOT_PAGE[end..]
    );
    let extraction = engine().extract(&page);
    assert_eq!(extraction.delivery.map(Money::amount), Some(dec!(19.95)));
}

#[test]
fn page_without_any_delivery_prices_bid_only() {
    let start = LOT_PAGE.find("<section").unwrap();
    let end = LOT_PAGE.find("</section>").unwrap() + "</section>".len();
    let page = format!("{}{}", &LOT_PAGE[..start], &LOT_PAGE[end..]);

    let breakdown = engine().quote(&page).breakdown.expect("priced snapshot");
    assert_eq!(breakdown.delivery, None);
    assert_eq!(breakdown.vat_on_delivery, None);
    assert_eq!(breakdown.final_price.amount(), dec!(1560));
}

#[test]
fn page_without_bid_reports_error_and_keeps_delivery() {
    let page = LOT_PAGE.replace("detail__minbid", "detail__closed");
    let snapshot = engine().quote(&page);
    assert_eq!(snapshot.error, Some(SnapshotError::MinimumBidNotFound));
    assert_eq!(snapshot.final_price, None);
    assert_eq!(snapshot.delivery.map(Money::amount), Some(dec!(14.99)));
    assert_eq!(snapshot.badge_text(), "!");
}

#[test]
fn cache_recompute_is_stable_across_runs() {
    let mut cache = PriceCache::new(engine());
    assert_eq!(cache.get().error, Some(SnapshotError::NoDataAvailable));

    let first = cache.recompute(LOT_PAGE).breakdown.clone();
    let second = cache.recompute(LOT_PAGE).breakdown.clone();
    assert_eq!(first, second);
    assert_eq!(cache.get().breakdown, second);
}

#[test]
fn analysis_lists_hits_rows_and_currency_literals() {
    let report = PageReport::build(&engine(), LOT_PAGE);

    let bid = report
        .hits
        .iter()
        .find(|h| h.locator == "min_bid")
        .expect("bid source hit");
    assert_eq!(bid.strategy_index, 0);
    assert_eq!(bid.text, "1,040.00");

    // Header row plus four service rows.
    assert_eq!(report.delivery_rows.len(), 5);
    assert!(report.delivery_rows[1].excluded);
    assert_eq!(report.delivery_rows[4].price, None);

    // Script contents are not page text.
    assert_eq!(
        report.currency_samples,
        vec!["£0.00", "£5.00", "£14.99", "£24.50"]
    );
}

#[test]
fn snapshot_serializes_amounts_as_strings() {
    let json = serde_json::to_value(engine().quote(LOT_PAGE)).unwrap();
    assert_eq!(json["final_price"], "1577.99");
    assert_eq!(json["breakdown"]["min_bid"], "1040");
    assert!(json["error"].is_null());
}
