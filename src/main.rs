//! Main application entry point (CLI binary).
//!
//! A thin wrapper around the `throttled_fetch` library that handles:
//! - Command-line argument parsing
//! - Logger initialization
//! - Ctrl-C cancellation of in-flight requests
//! - User-facing output formatting

use std::sync::Arc;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::Parser;
use futures::stream::FuturesUnordered;
use futures::StreamExt;
use log::{debug, warn};
use tokio_util::sync::CancellationToken;

use throttled_fetch::app::{validate_url, RunSummary};
use throttled_fetch::config::Opt;
use throttled_fetch::initialization::{init_client, init_logger_with};
use throttled_fetch::{
    AdaptiveThrottler, ReqwestTransport, RequestOptions, ThrottledClient,
};

#[tokio::main]
async fn main() -> Result<()> {
    let opt = Opt::parse();

    init_logger_with(opt.log_level.clone().into(), opt.log_format.clone())
        .context("Failed to initialize logger")?;

    let urls: Vec<String> = opt.urls.iter().filter_map(|u| validate_url(u)).collect();
    if urls.is_empty() {
        bail!("No valid URLs to request");
    }

    let throttler = Arc::new(
        AdaptiveThrottler::new(opt.throttler_config()).context("Invalid throttler configuration")?,
    );
    let http = init_client(&opt).context("Failed to initialize HTTP client")?;
    let client = ThrottledClient::new(Arc::clone(&throttler), ReqwestTransport::new(http));
    let settings = opt.request_settings();
    let summary = Arc::new(RunSummary::new());

    let shutdown = CancellationToken::new();
    let interrupt = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling in-flight requests");
            interrupt.cancel();
        }
    });

    let start = Instant::now();
    let mut tasks = FuturesUnordered::new();
    for url in urls {
        let client = client.clone();
        let summary = Arc::clone(&summary);
        let shutdown = shutdown.clone();
        let repeat = opt.repeat;
        tasks.push(async move {
            let options = RequestOptions::default();
            for _ in 0..repeat {
                if shutdown.is_cancelled() {
                    break;
                }
                match client
                    .request_with_cancel(&url, &options, settings, Some(&shutdown))
                    .await
                {
                    Ok(response) => {
                        summary.record_status(response.status().as_u16(), settings.failure_threshold)
                    }
                    Err(e) => {
                        debug!("{url}: {e}");
                        summary.record_error(&e);
                    }
                }
            }
        });
    }
    while tasks.next().await.is_some() {}

    throttler.shutdown();
    let elapsed = start.elapsed().as_secs_f64();
    summary.log(elapsed);

    let totals = summary.totals();
    println!(
        "Sent {} of {} request{} in {:.1}s: {} succeeded, {} failed, {} throttled locally, {} cancelled",
        totals.total() - totals.throttled,
        totals.total(),
        if totals.total() == 1 { "" } else { "s" },
        elapsed,
        totals.succeeded,
        totals.failed_status + totals.transport_errors,
        totals.throttled,
        totals.cancelled
    );
    Ok(())
}
