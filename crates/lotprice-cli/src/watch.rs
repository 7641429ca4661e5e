//! Periodic recomputation for `lotprice watch`.

use std::future::Future;
use std::time::Duration;

use lotprice_core::{FeeSchedule, PriceSnapshot};
use lotprice_scraper::PriceCache;
use tokio::time::MissedTickBehavior;

use crate::page::PageLoader;
use crate::render;

pub(crate) struct WatchOptions {
    /// Wait before the first load so a freshly published page can settle.
    pub settle_delay: Duration,
    pub interval: Duration,
    pub json: bool,
}

/// Reloads and reprices the page every `interval` until Ctrl-C.
///
/// A snapshot is printed on the first run and whenever the price or error
/// changes. A failed load is logged and the previous snapshot is kept.
/// Ctrl-C is honoured at any point, including during the settle delay or a
/// slow page load.
pub(crate) async fn run_watch(
    loader: &PageLoader,
    mut cache: PriceCache,
    fees: &FeeSchedule,
    options: &WatchOptions,
) -> anyhow::Result<()> {
    tracing::info!(
        source = %loader.source(),
        interval_secs = options.interval.as_secs(),
        "watching lot page"
    );

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    if until_shutdown(&mut shutdown, tokio::time::sleep(options.settle_delay))
        .await
        .is_none()
    {
        tracing::info!("stopping watch");
        return Ok(());
    }

    let mut ticker = tokio::time::interval(options.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last_printed: Option<PriceSnapshot> = None;

    loop {
        let poll = async {
            ticker.tick().await;
            loader.load().await
        };
        let Some(loaded) = until_shutdown(&mut shutdown, poll).await else {
            tracing::info!("stopping watch");
            return Ok(());
        };

        let html = match loaded {
            Ok(html) => html,
            Err(e) => {
                tracing::warn!(error = %e, "page load failed, keeping previous price");
                continue;
            }
        };

        let snapshot = cache.recompute(&html);
        if !price_changed(last_printed.as_ref(), snapshot) {
            tracing::debug!("price unchanged");
            continue;
        }

        if options.json {
            println!("{}", serde_json::to_string(snapshot)?);
        } else {
            print!("{}", render::snapshot_text(snapshot, fees));
        }
        last_printed = Some(snapshot.clone());
    }
}

/// Drives `work` to completion unless `shutdown` resolves first, in which
/// case `work` is dropped and `None` is returned.
async fn until_shutdown<S, W>(shutdown: &mut S, work: W) -> Option<W::Output>
where
    S: Future + Unpin,
    W: Future,
{
    tokio::select! {
        biased;
        _ = shutdown => None,
        out = work => Some(out),
    }
}

/// Whether `next` differs from `previous` in anything a user would see.
/// The computation timestamp is ignored.
fn price_changed(previous: Option<&PriceSnapshot>, next: &PriceSnapshot) -> bool {
    previous.map_or(true, |prev| {
        prev.breakdown != next.breakdown
            || prev.error != next.error
            || prev.delivery != next.delivery
    })
}
