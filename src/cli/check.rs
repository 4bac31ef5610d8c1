use std::path::Path;

use anyhow::{Context, Result};
use comment_warden::config::ModerationConfig;

pub fn run(config_path: &Path, text: Option<&str>) -> Result<()> {
    let config = ModerationConfig::load(config_path)
        .with_context(|| format!("Invalid config {}", config_path.display()))?;

    println!("Config OK: {}", config_path.display());
    println!("  Video:      {}", config.bvid);
    println!("  Patterns:   {:>5}", config.matcher.len());
    for pattern in &config.violation_words {
        println!("    - {}", pattern);
    }
    println!("  Whitelist:  {:>5}", config.whitelist.len());
    println!("  Interval:   {:>5}s", config.interval.as_secs());
    println!("  Threshold:  {:>5}", config.violation_threshold);

    let Some(text) = text else {
        return Ok(());
    };

    println!();
    match config.matcher.find(text) {
        Some(hit) => println!("MATCH: pattern '{}' matched '{}'", hit.pattern, hit.snippet),
        None => println!("No match"),
    }
    Ok(())
}
