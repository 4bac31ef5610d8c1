//! Moderation configuration: loaded once at startup from a JSON file.
//!
//! Recognized keys:
//!   - `bvid`: target video (required)
//!   - `violation_words`: regex patterns (required, compiled here)
//!   - `whitelist`: user ids exempt from all enforcement
//!   - `interval` / `max_pages` / `violation_threshold`: cycle policy
//!   - `sessdata` / `bili_jct` / `ac_time_value`: credentials, only read by the platform client
//!
//! Any problem here is fatal: the daemon does not start on a bad config.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::comment::UserId;
use crate::constants::{
    DEFAULT_INTERVAL_SECS, DEFAULT_LEDGER_FILE, DEFAULT_LOG_DIR, DEFAULT_MAX_PAGES,
    DEFAULT_REQUEST_DELAY_MS, VIOLATION_THRESHOLD,
};
use crate::error::{WardenError, WardenResult};
use crate::moderation::matcher::Matcher;

// ============================================================================
// CREDENTIAL
// ============================================================================

/// Platform login cookies. Opaque to the moderation core.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    #[serde(default)]
    pub sessdata: String,
    #[serde(default)]
    pub bili_jct: String,
    #[serde(default)]
    pub ac_time_value: String,
}

impl Credential {
    pub fn is_complete(&self) -> bool {
        !self.sessdata.is_empty() && !self.bili_jct.is_empty()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |s: &str| if s.is_empty() { "<unset>" } else { "<redacted>" };
        f.debug_struct("Credential")
            .field("sessdata", &redact(&self.sessdata))
            .field("bili_jct", &redact(&self.bili_jct))
            .field("ac_time_value", &redact(&self.ac_time_value))
            .finish()
    }
}

// ============================================================================
// FILE FORMAT
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(flatten)]
    credential: Credential,
    #[serde(default)]
    bvid: Option<String>,
    #[serde(default)]
    violation_words: Option<Vec<String>>,
    #[serde(default)]
    whitelist: Vec<UserId>,
    #[serde(default = "default_interval")]
    interval: u64,
    #[serde(default = "default_max_pages")]
    max_pages: u32,
    #[serde(default = "default_threshold")]
    violation_threshold: u32,
    #[serde(default = "default_true")]
    scan_replies: bool,
    #[serde(default = "default_request_delay_ms")]
    request_delay_ms: u64,
    #[serde(default = "default_ledger_path")]
    ledger_path: Option<String>,
    #[serde(default = "default_log_dir")]
    log_dir: String,
    #[serde(default = "default_console_level")]
    console_level: String,
}

fn default_interval() -> u64 {
    DEFAULT_INTERVAL_SECS
}

fn default_max_pages() -> u32 {
    DEFAULT_MAX_PAGES
}

fn default_threshold() -> u32 {
    VIOLATION_THRESHOLD
}

fn default_true() -> bool {
    true
}

fn default_request_delay_ms() -> u64 {
    DEFAULT_REQUEST_DELAY_MS
}

fn default_ledger_path() -> Option<String> {
    Some(DEFAULT_LEDGER_FILE.to_string())
}

fn default_log_dir() -> String {
    DEFAULT_LOG_DIR.to_string()
}

fn default_console_level() -> String {
    "info".to_string()
}

// ============================================================================
// VALIDATED CONFIG
// ============================================================================

#[derive(Debug, Clone)]
pub struct ModerationConfig {
    pub bvid: String,
    pub credential: Credential,
    pub violation_words: Vec<String>,
    /// `violation_words`, compiled once.
    pub matcher: Matcher,
    pub whitelist: HashSet<UserId>,
    pub interval: Duration,
    pub max_pages: u32,
    pub violation_threshold: u32,
    pub scan_replies: bool,
    pub request_delay: Duration,
    /// `None` keeps the ledger in memory only.
    pub ledger_path: Option<PathBuf>,
    pub log_dir: PathBuf,
    pub console_level: String,
}

impl ModerationConfig {
    /// Read and validate the config file.
    pub fn load(path: &Path) -> WardenResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            WardenError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config = Self::from_json(&content)?;
        tracing::debug!(
            path = %path.display(),
            bvid = %config.bvid,
            patterns = config.matcher.len(),
            whitelist = config.whitelist.len(),
            "Config loaded"
        );
        Ok(config)
    }

    pub fn from_json(content: &str) -> WardenResult<Self> {
        let raw: RawConfig = serde_json::from_str(content)
            .map_err(|e| WardenError::Config(format!("malformed config: {}", e)))?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawConfig) -> WardenResult<Self> {
        let bvid = raw
            .bvid
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| WardenError::Config("missing required field 'bvid'".into()))?;

        let violation_words = raw
            .violation_words
            .filter(|w| !w.is_empty())
            .ok_or_else(|| {
                WardenError::Config("missing required field 'violation_words'".into())
            })?;
        let matcher = Matcher::compile(&violation_words)?;

        if raw.interval == 0 {
            return Err(WardenError::Config("'interval' must be positive".into()));
        }
        if raw.max_pages == 0 {
            return Err(WardenError::Config("'max_pages' must be positive".into()));
        }
        if raw.violation_threshold == 0 {
            return Err(WardenError::Config("'violation_threshold' must be positive".into()));
        }

        Ok(Self {
            bvid,
            credential: raw.credential,
            violation_words,
            matcher,
            whitelist: raw.whitelist.into_iter().collect(),
            interval: Duration::from_secs(raw.interval),
            max_pages: raw.max_pages,
            violation_threshold: raw.violation_threshold,
            scan_replies: raw.scan_replies,
            request_delay: Duration::from_millis(raw.request_delay_ms),
            ledger_path: raw.ledger_path.filter(|p| !p.is_empty()).map(PathBuf::from),
            log_dir: PathBuf::from(raw.log_dir),
            console_level: raw.console_level,
        })
    }

    pub fn is_whitelisted(&self, user_id: UserId) -> bool {
        self.whitelist.contains(&user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"{"bvid": "BV1xx411c7mD", "violation_words": ["spam"]}"#;

    #[test]
    fn test_defaults_applied() {
        let cfg = ModerationConfig::from_json(MINIMAL).unwrap();
        assert_eq!(cfg.interval, Duration::from_secs(300));
        assert_eq!(cfg.max_pages, 9_999);
        assert_eq!(cfg.violation_threshold, 3);
        assert!(cfg.scan_replies);
        assert_eq!(cfg.request_delay, Duration::from_millis(500));
        assert_eq!(cfg.ledger_path, Some(PathBuf::from("violation_users.json")));
        assert!(cfg.whitelist.is_empty());
        assert!(!cfg.credential.is_complete());
    }

    #[test]
    fn test_full_config() {
        let json = r#"{
            "sessdata": "s", "bili_jct": "j", "ac_time_value": "a",
            "bvid": "BV1", "violation_words": ["spam", "加.群"],
            "whitelist": [621240130], "interval": 60, "max_pages": 5,
            "violation_threshold": 4, "scan_replies": false,
            "request_delay_ms": 0, "ledger_path": null, "console_level": "debug"
        }"#;
        let cfg = ModerationConfig::from_json(json).unwrap();
        assert!(cfg.credential.is_complete());
        assert!(cfg.is_whitelisted(UserId(621240130)));
        assert_eq!(cfg.interval, Duration::from_secs(60));
        assert_eq!(cfg.max_pages, 5);
        assert_eq!(cfg.violation_threshold, 4);
        assert!(!cfg.scan_replies);
        assert_eq!(cfg.ledger_path, None);
        assert_eq!(cfg.matcher.matches("快加个群"), Some("加个群".to_string()));
    }

    #[test]
    fn test_missing_bvid_is_config_error() {
        let err = ModerationConfig::from_json(r#"{"violation_words": ["x"]}"#).unwrap_err();
        assert!(err.to_string().contains("bvid"));
    }

    #[test]
    fn test_missing_or_empty_words_is_config_error() {
        assert!(ModerationConfig::from_json(r#"{"bvid": "BV1"}"#).is_err());
        assert!(ModerationConfig::from_json(r#"{"bvid": "BV1", "violation_words": []}"#).is_err());
    }

    #[test]
    fn test_bad_pattern_fails_at_load() {
        let err = ModerationConfig::from_json(r#"{"bvid": "BV1", "violation_words": ["[z-a]"]}"#)
            .unwrap_err();
        assert!(matches!(err, WardenError::InvalidPattern { .. }));
    }

    #[test]
    fn test_zero_values_rejected() {
        for field in ["interval", "max_pages", "violation_threshold"] {
            let json = format!(r#"{{"bvid": "BV1", "violation_words": ["x"], "{}": 0}}"#, field);
            let err = ModerationConfig::from_json(&json).unwrap_err();
            assert!(err.to_string().contains(field), "{} should be rejected", field);
        }
    }

    #[test]
    fn test_malformed_json() {
        let err = ModerationConfig::from_json("{not json").unwrap_err();
        assert!(matches!(err, WardenError::Config(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ModerationConfig::load(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, WardenError::Config(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, MINIMAL).unwrap();
        let cfg = ModerationConfig::load(&path).unwrap();
        assert_eq!(cfg.bvid, "BV1xx411c7mD");
    }

    #[test]
    fn test_credential_debug_redacts() {
        let cred = Credential {
            sessdata: "secret-cookie".into(),
            bili_jct: "csrf".into(),
            ac_time_value: String::new(),
        };
        let dbg = format!("{:?}", cred);
        assert!(!dbg.contains("secret-cookie"));
        assert!(dbg.contains("<unset>"));
    }
}
