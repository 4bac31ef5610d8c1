use std::path::Path;

use anyhow::{Context, Result};
use comment_warden::config::ModerationConfig;
use comment_warden::moderation::{PollSettings, Poller, Scheduler, ViolationLedger};
use comment_warden::platform::BilibiliClient;
use comment_warden::storage::LedgerStore;

/// Run the moderation daemon in the foreground.
///
/// Architecture:
///   - one thread drives the scheduler; cycles never overlap
///   - the ledger is owned here and lent to each cycle
///   - SIGINT/SIGTERM request a stop, honored between cycles
pub fn run(config_path: &Path, once: bool) -> Result<()> {
    let config = ModerationConfig::load(config_path)
        .with_context(|| format!("Failed to load config {}", config_path.display()))?;

    comment_warden::tracing_init::init_tracing(&config.log_dir, &config.console_level);
    tracing::info!(
        bvid = %config.bvid,
        patterns = config.matcher.len(),
        whitelist = config.whitelist.len(),
        interval_secs = config.interval.as_secs(),
        max_pages = config.max_pages,
        threshold = config.violation_threshold,
        scan_replies = config.scan_replies,
        "Starting comment-warden"
    );

    let client = BilibiliClient::connect(&config.bvid, config.credential.clone())
        .context("Failed to connect to the comment platform")?;

    let store = config.ledger_path.as_ref().map(LedgerStore::new);
    let mut ledger =
        ViolationLedger::new(config.violation_threshold, config.whitelist.iter().copied());
    if let Some(store) = &store {
        ledger.restore(store.load());
    }

    let poller = Poller::new(&client, &config.matcher, PollSettings::from_config(&config));
    let mut scheduler = Scheduler::new(config.interval);
    if once {
        scheduler = scheduler.with_max_cycles(1);
    }

    // Signal handlers (cross-platform)
    let stop = scheduler.stop_flag();
    if let Err(e) = signal_hook::flag::register(signal_hook::consts::SIGINT, stop.clone()) {
        tracing::warn!(error = %e, "Cannot install SIGINT handler");
    }
    #[cfg(unix)]
    if let Err(e) = signal_hook::flag::register(signal_hook::consts::SIGTERM, stop.clone()) {
        tracing::warn!(error = %e, "Cannot install SIGTERM handler");
    }

    let cycles = scheduler.run(|cycle| {
        let report = poller.run_cycle(cycle, &mut ledger);
        if let Some(store) = &store {
            if let Err(e) = store.save(&ledger) {
                tracing::error!(path = %store.path().display(), error = %e, "Failed to save ledger");
            }
        }
        report
    });

    tracing::info!(cycles, users = ledger.len(), "comment-warden shutdown complete");
    Ok(())
}
