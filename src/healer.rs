// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Healer - suggests fixes for failed commands and keeps a bounded error log
//!
//! Error messages are matched against an ordered rule table; the first rule
//! whose pattern matches supplies the suggestion. Every reported error lands
//! in a ring buffer of [`LOG_CAPACITY`] entries that is persisted on a
//! best-effort basis.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, error};

/// Maximum number of log entries kept
pub const LOG_CAPACITY: usize = 50;

/// File name of the persisted log inside the state directory
pub const LOG_FILE: &str = "healer_log.json";

/// Errors raised by the healer
#[derive(Debug, Error)]
pub enum HealerError {
    /// A rule pattern is not a valid regular expression
    #[error("Invalid pattern {pattern:?}: {source}")]
    InvalidPattern {
        /// The offending pattern
        pattern: String,
        /// Regex compile error
        #[source]
        source: regex::Error,
    },

    /// Log file could not be written
    #[error("Failed to write {path}: {source}")]
    Write {
        /// Log path
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Log could not be serialized
    #[error("Failed to serialize error log: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// How serious a matched failure is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Cosmetic or user typo
    Low,
    /// Degraded but usable
    Medium,
    /// Feature unusable
    High,
    /// Nothing works
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        })
    }
}

/// Suggested fix attached to a matched error
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fix {
    /// What to try
    pub suggestion: String,
    /// How serious it is
    pub severity: Severity,
}

struct Rule {
    pattern: Regex,
    fix: Fix,
}

/// Built-in rules, tried in order
const BUILTIN_RULES: &[(&str, &str, Severity)] = &[
    (
        r"(?i)error sending request|connection refused|dns error|failed to fetch|network is unreachable",
        "Check the network connection and that the dataset server or tracker API is reachable",
        Severity::High,
    ),
    (
        r"(?i)timed? ?out|deadline has elapsed",
        "The remote side is slow; retry, or raise the poll interval",
        Severity::Medium,
    ),
    (
        r"(?i)HTTP 40[13]\b|permission denied|access is denied",
        "Check file permissions of the data directory, or the API credentials",
        Severity::High,
    ),
    (
        r"(?i)HTTP 404\b|no such file or directory|os error 2\b",
        "The file or endpoint does not exist; check --dataset, --data-dir and the file names",
        Severity::Medium,
    ),
    (
        r"(?i)HTTP 5\d\d\b",
        "The server failed to answer; try again later",
        Severity::Medium,
    ),
    (
        r"(?i)expected value|EOF while parsing|invalid type|missing field|trailing characters|key must be a string",
        "The JSON is malformed; validate it (for example with jq) or re-export the dataset",
        Severity::High,
    ),
    (
        r"(?i)dataset \S+ (is )?not loaded",
        "Run `repairbase status` to see which datasets loaded",
        Severity::Medium,
    ),
    (
        r"(?i)no (device|ic|error code|regional code) match|ambiguous (device|ic)",
        "Use the exact name as listed by the matching list command",
        Severity::Low,
    ),
    (
        r"(?i)unknown (region|currency)",
        "Valid regions: ua, eu. Valid currencies: uah, usd, eur",
        Severity::Low,
    ),
    (
        r"(?i)tracker api url is not configured",
        "Set it with `repairbase config set tracker.api_url <url>`",
        Severity::Low,
    ),
    (
        r"(?i)invalid (config|configuration)|failed to parse config",
        "Fix or remove the config file shown by `repairbase config path`",
        Severity::High,
    ),
];

/// Ordered pattern → fix table
pub struct ErrorMatcher {
    rules: Vec<Rule>,
}

impl Default for ErrorMatcher {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ErrorMatcher {
    /// Build a matcher from `(pattern, fix)` pairs, keeping their order
    pub fn new<'a>(rules: impl IntoIterator<Item = (&'a str, Fix)>) -> Result<Self, HealerError> {
        let rules = rules
            .into_iter()
            .map(|(pattern, fix)| {
                Regex::new(pattern)
                    .map(|pattern| Rule { pattern, fix })
                    .map_err(|source| HealerError::InvalidPattern {
                        pattern: pattern.to_string(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }

    /// The built-in rule table
    #[must_use]
    pub fn builtin() -> Self {
        let rules = BUILTIN_RULES
            .iter()
            .filter_map(|(pattern, suggestion, severity)| match Regex::new(pattern) {
                Ok(pattern) => Some(Rule {
                    pattern,
                    fix: Fix {
                        suggestion: (*suggestion).to_string(),
                        severity: *severity,
                    },
                }),
                Err(e) => {
                    error!("Skipping built-in healer rule: {}", e);
                    None
                }
            })
            .collect();
        Self { rules }
    }

    /// Fix of the first rule matching `message`
    #[must_use]
    pub fn find_fix(&self, message: &str) -> Option<&Fix> {
        self.rules
            .iter()
            .find(|r| r.pattern.is_match(message))
            .map(|r| &r.fix)
    }

    /// Number of rules
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// True when no rules are loaded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Where an error happened
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Component (command) name
    pub component: String,
    /// Action within the component
    #[serde(default)]
    pub action: Option<String>,
}

impl ErrorContext {
    /// Context for `component`, optionally narrowed to `action`
    #[must_use]
    pub fn new(component: impl Into<String>, action: Option<&str>) -> Self {
        Self {
            component: component.into(),
            action: action.map(String::from),
        }
    }
}

/// One logged failure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// Top-level error message
    pub message: String,
    /// Source chain below the message, outermost first
    #[serde(default)]
    pub stack: Vec<String>,
    /// Where it happened
    pub context: ErrorContext,
    /// When it happened
    pub timestamp: DateTime<Utc>,
    /// Matched fix, `None` when no rule matched
    pub fix: Option<Fix>,
}

/// Bounded FIFO error log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorLog {
    entries: VecDeque<LogEntry>,
    #[serde(skip, default = "default_capacity")]
    capacity: usize,
}

fn default_capacity() -> usize {
    LOG_CAPACITY
}

impl Default for ErrorLog {
    fn default() -> Self {
        Self::with_capacity(LOG_CAPACITY)
    }
}

impl ErrorLog {
    /// Empty log holding at most `capacity` entries
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append an entry, evicting the oldest when full
    pub fn push(&mut self, entry: LogEntry) {
        if self.capacity == 0 {
            return;
        }
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    /// Log a failure, attaching the fix `matcher` finds for it
    pub fn record(
        &mut self,
        matcher: &ErrorMatcher,
        message: &str,
        stack: Vec<String>,
        context: ErrorContext,
    ) -> Option<Fix> {
        // Causes often carry the telling part ("os error 2"), so match the full chain
        let haystack = std::iter::once(message)
            .chain(stack.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(": ");
        let fix = matcher.find_fix(&haystack).cloned();

        self.push(LogEntry {
            message: message.to_string(),
            stack,
            context,
            timestamp: Utc::now(),
            fix: fix.clone(),
        });
        fix
    }

    /// Entries, oldest first
    pub fn entries(&self) -> impl DoubleEndedIterator<Item = &LogEntry> + ExactSizeIterator {
        self.entries.iter()
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Read a persisted log; a missing or corrupt file yields an empty log
    #[must_use]
    pub fn load(path: &Path) -> Self {
        let Ok(content) = fs::read_to_string(path) else {
            return Self::default();
        };

        match serde_json::from_str::<Self>(&content) {
            Ok(mut log) => {
                while log.entries.len() > log.capacity {
                    log.entries.pop_front();
                }
                log
            }
            Err(e) => {
                debug!("Discarding unreadable error log {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Write the log to `path`
    pub fn save(&self, path: &Path) -> Result<(), HealerError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| HealerError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|source| HealerError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Write the log to `path`, ignoring failures
    pub fn persist(&self, path: &Path) {
        if let Err(e) = self.save(path) {
            debug!("Error log not persisted: {}", e);
        }
    }
}

/// Matcher plus persisted log, the entry point used by the CLI
pub struct Healer {
    matcher: ErrorMatcher,
    log: ErrorLog,
    path: PathBuf,
}

impl Healer {
    /// Open the log stored in `state_dir`
    #[must_use]
    pub fn open(state_dir: &Path) -> Self {
        let path = state_dir.join(LOG_FILE);
        Self {
            matcher: ErrorMatcher::builtin(),
            log: ErrorLog::load(&path),
            path,
        }
    }

    /// Record a failed command and persist the log
    pub fn report(&mut self, err: &anyhow::Error, context: ErrorContext) -> Option<Fix> {
        let stack = err.chain().skip(1).map(ToString::to_string).collect();
        let fix = self
            .log
            .record(&self.matcher, &err.to_string(), stack, context);
        self.log.persist(&self.path);
        fix
    }

    /// The matcher
    #[must_use]
    pub fn matcher(&self) -> &ErrorMatcher {
        &self.matcher
    }

    /// The log
    #[must_use]
    pub fn log(&self) -> &ErrorLog {
        &self.log
    }

    /// Clear the log and persist the empty state
    pub fn clear(&mut self) -> Result<(), HealerError> {
        self.log.clear();
        self.log.save(&self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn ctx() -> ErrorContext {
        ErrorContext::new("test", None)
    }

    #[test]
    fn test_builtin_rules_all_compile() {
        assert_eq!(ErrorMatcher::builtin().len(), BUILTIN_RULES.len());
    }

    #[test]
    fn test_known_message_gets_fix() {
        let matcher = ErrorMatcher::builtin();
        let fix = matcher
            .find_fix("Failed to read data/devices.json: No such file or directory (os error 2)")
            .unwrap();
        assert_eq!(fix.severity, Severity::Medium);
        assert!(fix.suggestion.contains("--dataset"));
    }

    #[test]
    fn test_unmatched_message_has_no_fix() {
        let matcher = ErrorMatcher::builtin();
        assert!(matcher.find_fix("the moon is made of cheese").is_none());
    }

    #[test]
    fn test_first_matching_rule_wins() {
        let matcher = ErrorMatcher::new([
            ("boom", Fix { suggestion: "first".into(), severity: Severity::Low }),
            ("bo+m", Fix { suggestion: "second".into(), severity: Severity::High }),
        ])
        .unwrap();

        assert_eq!(matcher.find_fix("big boom").unwrap().suggestion, "first");
        assert_eq!(matcher.find_fix("booooom").unwrap().suggestion, "second");
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let result = ErrorMatcher::new([("(unclosed", Fix { suggestion: String::new(), severity: Severity::Low })]);
        assert!(matches!(result, Err(HealerError::InvalidPattern { .. })));
    }

    #[test]
    fn test_log_evicts_oldest_first() {
        let matcher = ErrorMatcher::builtin();
        let mut log = ErrorLog::default();

        for i in 0..(LOG_CAPACITY + 5) {
            log.record(&matcher, &format!("error {i}"), vec![], ctx());
        }

        assert_eq!(log.len(), LOG_CAPACITY);
        assert_eq!(log.entries().next().unwrap().message, "error 5");
        assert_eq!(log.entries().last().unwrap().message, format!("error {}", LOG_CAPACITY + 4));
    }

    #[test]
    fn test_cause_chain_is_matched() {
        let matcher = ErrorMatcher::builtin();
        let mut log = ErrorLog::default();

        let fix = log.record(
            &matcher,
            "Failed to load watchlist",
            vec!["Permission denied (os error 13)".into()],
            ctx(),
        );

        assert_eq!(fix.unwrap().severity, Severity::High);
    }

    #[test]
    fn test_persist_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(LOG_FILE);
        let matcher = ErrorMatcher::builtin();
        let mut log = ErrorLog::default();
        log.record(&matcher, "HTTP 503 fetching live prices", vec![], ErrorContext::new("tracker", Some("live")));
        log.persist(&path);

        let reloaded = ErrorLog::load(&path);
        let entry = reloaded.entries().next().unwrap();

        assert_eq!(reloaded.len(), 1);
        assert_eq!(entry.context.action.as_deref(), Some("live"));
        assert!(entry.fix.is_some());
    }

    #[test]
    fn test_corrupt_log_loads_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(LOG_FILE);
        std::fs::write(&path, "[[[").unwrap();

        assert!(ErrorLog::load(&path).is_empty());
    }

    #[test]
    fn test_persist_failure_is_swallowed() {
        let dir = TempDir::new().unwrap();
        // A directory where the file should be makes the write fail
        let path = dir.path().join("taken");
        std::fs::create_dir(&path).unwrap();

        ErrorLog::default().persist(&path);
    }
}
