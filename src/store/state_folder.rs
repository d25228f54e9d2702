// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Abacus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Abacus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::fs;
use std::io;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Deserialize;
use tracing::warn;

use crate::model::{Category, CategoryId, Counter, ImageRef, IncomeItem, IncomeRoot, TallyRoot};

const TALLY_KEY: &str = "counters_data";
const INCOME_KEY: &str = "income_data_v1";
const THEME_KEY: &str = "app_theme";
const STATE_SUBDIR: &str = "state";

/// Name given to the synthetic category when a legacy bare-array blob is
/// migrated; its counters all point at it.
pub const DEFAULT_CATEGORY_NAME: &str = "Default";

const DEFAULT_CATEGORY_ID: i64 = 1;

#[derive(Debug)]
pub enum StoreError {
    Io {
        path: PathBuf,
        source: io::Error,
    },
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    SymlinkRefused {
        path: PathBuf,
    },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "io error at {path:?}: {source}"),
            Self::Json { path, source } => write!(f, "json error at {path:?}: {source}"),
            Self::SymlinkRefused { path } => {
                write!(f, "refusing to write through symlink at {path:?}")
            }
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
            Self::SymlinkRefused { .. } => None,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum WriteDurability {
    /// Fast, best-effort persistence.
    ///
    /// - Writes a temp file and renames atomically into place.
    /// - Does not perform per-file fsync/sync.
    #[default]
    BestEffort,

    /// Slower, best-effort durability.
    ///
    /// Attempts to flush written file contents and rename operations to stable
    /// storage where possible. Exact guarantees are platform/filesystem-dependent.
    Durable,
}

/// Folder-backed key-value store: one blob per key, last write wins.
#[derive(Debug, Clone)]
pub struct StateFolder {
    root: PathBuf,
    durability: WriteDurability,
}

impl StateFolder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into(), durability: WriteDurability::default() }
    }

    pub fn with_durability(mut self, durability: WriteDurability) -> Self {
        self.durability = durability;
        self
    }

    pub fn durability(&self) -> WriteDurability {
        self.durability
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn state_dir(&self) -> PathBuf {
        self.root.join(STATE_SUBDIR)
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.state_dir().join(format!("{key}.json"))
    }

    fn theme_path(&self) -> PathBuf {
        self.state_dir().join(THEME_KEY)
    }

    /// Load the counters/categories root. Never fails: missing or unreadable
    /// blobs produce an empty root, legacy bare arrays are migrated in memory.
    pub fn load_tally(&self) -> TallyRoot {
        match self.read_json_value(&self.key_path(TALLY_KEY)) {
            Some(value) => migrate_tally_blob(value),
            None => TallyRoot::default(),
        }
    }

    /// Persist the counters/categories root. Inline images are stripped from a
    /// separate persistable copy; the in-memory root is untouched.
    pub fn save_tally(&self, root: &TallyRoot) -> Result<(), StoreError> {
        self.write_json_key(TALLY_KEY, &root.persistable())
    }

    /// Load the income-ledger root; same never-fails contract as
    /// [`load_tally`](Self::load_tally).
    pub fn load_income(&self) -> IncomeRoot {
        match self.read_json_value(&self.key_path(INCOME_KEY)) {
            Some(value) => migrate_income_blob(value),
            None => IncomeRoot::default(),
        }
    }

    pub fn save_income(&self, root: &IncomeRoot) -> Result<(), StoreError> {
        self.write_json_key(INCOME_KEY, &root.persistable())
    }

    /// Active theme preference, stored as a bare string under its own key.
    pub fn load_theme(&self) -> Option<String> {
        let path = self.theme_path();
        match fs::read_to_string(&path) {
            Ok(raw) => {
                let theme = raw.trim_end_matches('\n').to_owned();
                if theme.is_empty() {
                    None
                } else {
                    Some(theme)
                }
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => None,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "cannot read theme preference");
                None
            }
        }
    }

    pub fn save_theme(&self, theme: &str) -> Result<(), StoreError> {
        write_atomic(&self.theme_path(), format!("{theme}\n").as_bytes(), self.durability)
    }

    fn write_json_key<T: serde::Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let path = self.key_path(key);
        let blob = serde_json::to_string(value)
            .map_err(|source| StoreError::Json { path: path.clone(), source })?;
        write_atomic(&path, format!("{blob}\n").as_bytes(), self.durability)
    }

    fn read_json_value(&self, path: &Path) -> Option<serde_json::Value> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return None,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "cannot read state blob");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "cannot parse state blob");
                None
            }
        }
    }
}

/// Old-format counter rows carried no `categoryId`; they all land in the
/// synthetic default category on load.
#[derive(Debug, Deserialize)]
struct LegacyCounter {
    id: crate::model::CounterId,
    name: String,
    #[serde(default)]
    value: u32,
    #[serde(default)]
    image: Option<ImageRef>,
    #[serde(default, rename = "maxValue")]
    max_value: Option<u32>,
}

fn migrate_tally_blob(value: serde_json::Value) -> TallyRoot {
    if value.is_array() {
        let legacy: Vec<LegacyCounter> = match serde_json::from_value(value) {
            Ok(legacy) => legacy,
            Err(err) => {
                warn!(error = %err, "cannot migrate legacy counter array");
                return TallyRoot::default();
            }
        };

        let default_category =
            Category { id: CategoryId::new(DEFAULT_CATEGORY_ID), name: DEFAULT_CATEGORY_NAME.to_owned() };
        let counters = legacy
            .into_iter()
            .map(|c| Counter {
                id: c.id,
                name: c.name,
                value: c.value,
                image: c.image,
                max_value: c.max_value,
                category_id: default_category.id,
            })
            .collect();

        return TallyRoot { categories: vec![default_category], counters };
    }

    match serde_json::from_value(value) {
        Ok(root) => root,
        Err(err) => {
            warn!(error = %err, "cannot parse counters blob");
            TallyRoot::default()
        }
    }
}

fn migrate_income_blob(value: serde_json::Value) -> IncomeRoot {
    if value.is_array() {
        let items: Vec<IncomeItem> = match serde_json::from_value(value) {
            Ok(items) => items,
            Err(err) => {
                warn!(error = %err, "cannot migrate legacy income array");
                return IncomeRoot::default();
            }
        };
        return IncomeRoot { items, daily_gold_price: 0.0 };
    }

    match serde_json::from_value(value) {
        Ok(root) => root,
        Err(err) => {
            warn!(error = %err, "cannot parse income blob");
            IncomeRoot::default()
        }
    }
}

// Extracted safe filesystem write helpers for `StateFolder`.
include!("state_folder/helpers.rs");
