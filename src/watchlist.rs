// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Watch and buy lists, persisted in the state directory (last write wins)

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// File name inside the state directory
pub const WATCHLIST_FILE: &str = "watchlists.json";

/// Which list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListKind {
    /// Items to keep an eye on
    Watch,
    /// Items to order
    Buy,
}

impl fmt::Display for ListKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Watch => "watch",
            Self::Buy => "buy",
        })
    }
}

impl FromStr for ListKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "watch" => Ok(Self::Watch),
            "buy" => Ok(Self::Buy),
            other => Err(format!("Unknown list: {other}. Valid: watch, buy")),
        }
    }
}

/// One list entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListItem {
    /// Device, part article or station id
    pub item: String,
    /// Free-form note
    #[serde(default)]
    pub note: Option<String>,
    /// When it was added
    pub added_at: DateTime<Utc>,
}

/// Both lists
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Watchlists {
    /// Watch list
    #[serde(default)]
    pub watch: Vec<ListItem>,
    /// Buy list
    #[serde(default)]
    pub buy: Vec<ListItem>,
}

impl Watchlists {
    /// Load from `dir`, empty when the file does not exist yet
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(WATCHLIST_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Overwrite the stored lists
    pub fn save(&self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory {}", dir.display()))?;
        let path = dir.join(WATCHLIST_FILE);
        let json = serde_json::to_string_pretty(self).context("Failed to serialize watchlists")?;
        fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))
    }

    /// The list of `kind`
    #[must_use]
    pub fn list(&self, kind: ListKind) -> &[ListItem] {
        match kind {
            ListKind::Watch => &self.watch,
            ListKind::Buy => &self.buy,
        }
    }

    fn list_mut(&mut self, kind: ListKind) -> &mut Vec<ListItem> {
        match kind {
            ListKind::Watch => &mut self.watch,
            ListKind::Buy => &mut self.buy,
        }
    }

    /// Add `item`; returns false when it is already listed
    pub fn add(&mut self, kind: ListKind, item: &str, note: Option<String>) -> bool {
        let list = self.list_mut(kind);
        if list.iter().any(|i| i.item.eq_ignore_ascii_case(item)) {
            return false;
        }
        list.push(ListItem {
            item: item.to_string(),
            note,
            added_at: Utc::now(),
        });
        true
    }

    /// Remove `item`; returns false when it was not listed
    pub fn remove(&mut self, kind: ListKind, item: &str) -> bool {
        let list = self.list_mut(kind);
        let before = list.len();
        list.retain(|i| !i.item.eq_ignore_ascii_case(item));
        list.len() < before
    }

    /// Empty a list, returning how many items were dropped
    pub fn clear(&mut self, kind: ListKind) -> usize {
        let list = self.list_mut(kind);
        let dropped = list.len();
        list.clear();
        dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_add_is_idempotent() {
        let mut lists = Watchlists::default();
        assert!(lists.add(ListKind::Buy, "661-22308", None));
        assert!(!lists.add(ListKind::Buy, "661-22308", Some("again".into())));
        assert!(lists.add(ListKind::Watch, "661-22308", None));

        assert_eq!(lists.list(ListKind::Buy).len(), 1);
        assert_eq!(lists.list(ListKind::Watch).len(), 1);
    }

    #[test]
    fn test_remove_and_clear() {
        let mut lists = Watchlists::default();
        lists.add(ListKind::Watch, "iPhone 13", None);
        lists.add(ListKind::Watch, "iPhone 14", None);

        assert!(lists.remove(ListKind::Watch, "IPHONE 13"));
        assert!(!lists.remove(ListKind::Watch, "iPhone 13"));
        assert_eq!(lists.clear(ListKind::Watch), 1);
        assert!(lists.list(ListKind::Watch).is_empty());
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let mut lists = Watchlists::default();
        lists.add(ListKind::Buy, "ef-delta-2", Some("wait for sale".into()));
        lists.save(dir.path()).unwrap();

        let loaded = Watchlists::load(dir.path()).unwrap();

        assert_eq!(loaded, lists);
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        assert_eq!(Watchlists::load(dir.path()).unwrap(), Watchlists::default());
    }
}
