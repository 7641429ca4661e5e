//! Terminal presentation of snapshots and page reports.

use std::fmt::Write as _;

use lotprice_core::{FeeSchedule, Money, PriceBreakdown, PriceSnapshot};
use lotprice_scraper::PageReport;

/// Formats `amount` as pounds with thousands separators, e.g. `£1,234.56`.
pub(crate) fn format_gbp(amount: Money) -> String {
    let fixed = format!("{:.2}", amount.to_pennies());
    let (whole, pence) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let digits: Vec<char> = whole.chars().collect();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, digit) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*digit);
    }

    format!("£{grouped}.{pence}")
}

/// Labelled breakdown lines in display order. The delivery VAT line is
/// present only when a delivery amount was found.
pub(crate) fn breakdown_lines(
    breakdown: &PriceBreakdown,
    fees: &FeeSchedule,
) -> Vec<(String, String)> {
    let vat_pct = fees.vat_rate.percent();
    let premium_pct = fees.buyer_premium_rate.percent();

    let mut lines = vec![
        ("Minimum bid".to_string(), format_gbp(breakdown.min_bid)),
        (format!("VAT ({vat_pct}%)"), format_gbp(breakdown.vat)),
        (
            format!("Buyer's premium ({premium_pct}%)"),
            format_gbp(breakdown.buyer_premium),
        ),
        (
            format!("VAT on premium ({vat_pct}%)"),
            format_gbp(breakdown.vat_on_premium),
        ),
        (
            "Delivery".to_string(),
            breakdown
                .delivery
                .map_or_else(|| "Not found".to_string(), format_gbp),
        ),
    ];
    if let Some(vat_on_delivery) = breakdown.vat_on_delivery {
        lines.push((
            format!("VAT on delivery ({vat_pct}%)"),
            format_gbp(vat_on_delivery),
        ));
    }
    lines
}

pub(crate) fn snapshot_text(snapshot: &PriceSnapshot, fees: &FeeSchedule) -> String {
    let mut out = String::new();

    match (&snapshot.breakdown, &snapshot.error) {
        (Some(breakdown), _) => {
            let _ = writeln!(out, "Final Price: {}", format_gbp(breakdown.final_price));
            for (label, value) in breakdown_lines(breakdown, fees) {
                let _ = writeln!(out, "  {label:<26}{value:>12}");
            }
        }
        (None, error) => {
            let reason = error
                .as_ref()
                .map_or_else(|| "unavailable".to_string(), ToString::to_string);
            let _ = writeln!(out, "Final Price: {reason}");
            if let Some(delivery) = snapshot.delivery {
                let _ = writeln!(
                    out,
                    "  {:<26}{:>12}",
                    "Delivery",
                    format_gbp(delivery)
                );
            }
        }
    }

    out
}

pub(crate) fn report_text(report: &PageReport) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{:<18}{:<10}{:<56}TEXT", "LOCATOR", "STRATEGY", "SELECTOR");
    for hit in &report.hits {
        let _ = writeln!(
            out,
            "{:<18}{:<10}{:<56}{}",
            hit.locator,
            hit.strategy_index,
            hit.selector,
            truncate(&hit.text, 60)
        );
    }
    for missed in &report.unmatched {
        let _ = writeln!(out, "no match: {missed}");
    }

    let _ = writeln!(out);
    if report.delivery_rows.is_empty() {
        let _ = writeln!(out, "no shipping rows found");
    } else {
        let _ = writeln!(out, "{:<12}{:<10}DESCRIPTION", "PRICE", "EXCLUDED");
        for row in &report.delivery_rows {
            let price = row.price.map_or_else(|| "\u{2014}".to_string(), format_gbp);
            let excluded = if row.excluded { "yes" } else { "no" };
            let _ = writeln!(
                out,
                "{price:<12}{excluded:<10}{}",
                truncate(&row.description, 60)
            );
        }
    }

    let _ = writeln!(out);
    if report.currency_samples.is_empty() {
        let _ = writeln!(out, "no currency amounts found");
    } else {
        let _ = writeln!(
            out,
            "currency amounts: {}",
            report.currency_samples.join(", ")
        );
    }

    out
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        format!("{}...", text.chars().take(max_chars).collect::<String>())
    } else {
        text.to_string()
    }
}

#[cfg(test)]
#[path = "render_test.rs"]
mod tests;
