use std::path::Path;

use anyhow::{Context, Result};
use comment_warden::config::ModerationConfig;
use comment_warden::storage::LedgerStore;

pub fn run(config_path: &Path, blocked_only: bool) -> Result<()> {
    let config = ModerationConfig::load(config_path)
        .with_context(|| format!("Invalid config {}", config_path.display()))?;
    let path = config
        .ledger_path
        .context("Ledger persistence is disabled ('ledger_path' is null)")?;

    let store = LedgerStore::new(&path);
    if !store.path().exists() {
        println!("No ledger yet at {}", path.display());
        return Ok(());
    }
    let mut records = store
        .read()
        .with_context(|| format!("Failed to read ledger {}", path.display()))?;
    records.retain(|r| !blocked_only || r.is_blocked());
    records.sort_by(|a, b| b.count().cmp(&a.count()).then(a.user_id.cmp(&b.user_id)));

    println!("Violation ledger ({})", path.display());
    println!("Threshold: {}", config.violation_threshold);
    println!();
    println!("{:>12}  {:<20}  {:>5}  {:<7}  {}", "UID", "NAME", "COUNT", "BLOCKED", "LAST SEEN");
    for r in &records {
        println!(
            "{:>12}  {:<20}  {:>5}  {:<7}  {}",
            r.user_id.0,
            truncate(&r.username, 20),
            r.count(),
            if r.is_blocked() { "yes" } else { "no" },
            r.last_seen.format("%Y-%m-%d %H:%M"),
        );
    }
    println!();
    println!("{} user(s)", records.len());
    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}
