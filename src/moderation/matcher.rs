//! Matcher -- evaluates comment text against the prohibited-word patterns.
//!
//! Patterns are compiled once when the configuration is loaded. Matching
//! returns the first hit, scanning patterns in configuration order.

use regex::Regex;

use crate::error::{WardenError, WardenResult};

#[derive(Debug, Clone)]
pub struct Matcher {
    patterns: Vec<Regex>,
}

/// A successful match: which pattern fired and the text it matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternMatch {
    pub pattern: String,
    pub snippet: String,
}

impl Matcher {
    /// Compile every pattern. An empty pattern would match every comment,
    /// so it is rejected like an invalid one.
    pub fn compile<S: AsRef<str>>(patterns: &[S]) -> WardenResult<Self> {
        let mut compiled = Vec::with_capacity(patterns.len());
        for raw in patterns {
            let raw = raw.as_ref();
            if raw.is_empty() {
                return Err(WardenError::Config(
                    "violation_words contains an empty pattern".to_string(),
                ));
            }
            let re = Regex::new(raw).map_err(|source| WardenError::InvalidPattern {
                pattern: raw.to_string(),
                source,
            })?;
            compiled.push(re);
        }
        tracing::debug!(patterns = compiled.len(), "Violation patterns compiled");
        Ok(Self { patterns: compiled })
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// First matching pattern, if any. Pure: same input, same answer.
    pub fn find(&self, text: &str) -> Option<PatternMatch> {
        self.patterns.iter().find_map(|re| {
            re.find(text).map(|m| PatternMatch {
                pattern: re.as_str().to_string(),
                snippet: m.as_str().to_string(),
            })
        })
    }

    /// Matched snippet only.
    pub fn matches(&self, text: &str) -> Option<String> {
        self.find(text).map(|m| m.snippet)
    }
}
