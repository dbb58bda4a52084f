//! Shared test utilities for integration tests
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use qrforge::models::{ContentKind, HistoryEntry, PayloadConfig};
use serde_json::{Value, json};
use tempfile::TempDir;

/// Builder for a data directory holding a pre-seeded history record
pub struct DataDirBuilder {
    temp_dir: TempDir,
    entries: Vec<HistoryEntry>,
    raw: Option<String>,
}

impl DataDirBuilder {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        Self { temp_dir, entries: Vec::new(), raw: None }
    }

    /// Add an entry; entries keep insertion order, so add the newest first
    pub fn with_entry(mut self, entry: HistoryEntry) -> Self {
        self.entries.push(entry);
        self
    }

    /// Write `content` verbatim as the history record
    pub fn with_raw_history(mut self, content: &str) -> Self {
        self.raw = Some(content.to_string());
        self
    }

    pub fn build(self) -> TempDir {
        let path = history_path(self.temp_dir.path());
        if let Some(raw) = self.raw {
            fs::write(&path, raw).expect("Failed to write history");
        } else if !self.entries.is_empty() {
            let json = serde_json::to_string(&self.entries).expect("Failed to serialize history");
            fs::write(&path, json).expect("Failed to write history");
        }
        self.temp_dir
    }
}

impl Default for DataDirBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for a settings.json in its own temp directory
pub struct ConfigBuilder {
    temp_dir: TempDir,
    settings: Value,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        Self { temp_dir, settings: json!({}) }
    }

    pub fn with_export_format(mut self, format: &str) -> Self {
        self.settings["exportFormat"] = json!(format);
        self
    }

    pub fn with_default_kind(mut self, kind: &str) -> Self {
        self.settings["defaultKind"] = json!(kind);
        self
    }

    pub fn with_width(mut self, width: u32) -> Self {
        self.settings["render"]["width"] = json!(width);
        self
    }

    pub fn with_timeout_ms(mut self, ms: u64) -> Self {
        self.settings["generationTimeoutMs"] = json!(ms);
        self
    }

    /// Returns the directory and the settings file inside it
    pub fn build(self) -> (TempDir, PathBuf) {
        let path = self.temp_dir.path().join("settings.json");
        fs::write(&path, self.settings.to_string()).expect("Failed to write settings");
        (self.temp_dir, path)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn history_path(data_dir: &Path) -> PathBuf {
    data_dir.join("qrforge-history.json")
}

/// A text entry with a fixed timestamp
pub fn text_entry(id: &str, name: &str, text: &str) -> HistoryEntry {
    HistoryEntry::new(
        id,
        PayloadConfig::new(ContentKind::Text).with_text(text),
        1_700_000_000_000,
        name,
    )
}

/// The binary with data dir and settings pointed at test locations, logging quiet
pub fn qrforge(data_dir: &Path, config: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_qrforge"));
    cmd.env("QRFORGE_DATA_DIR", data_dir).env("QRFORGE_CONFIG", config).env_remove("QRFORGE_LOG");
    cmd
}
