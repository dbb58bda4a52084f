//! User settings file.
//!
//! JSON with camelCase keys; every field is optional:
//!
//! ```json
//! {
//!   "render": { "errorCorrectionLevel": "H", "foregroundColor": "#1a1a1a", "width": 600 },
//!   "defaultKind": "text",
//!   "exportFormat": "svg",
//!   "generationTimeoutMs": 5000
//! }
//! ```

use std::fs;
use std::io;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::export::ExportFormat;
use crate::models::{ContentKind, RenderParams};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub render: RenderParams,
    pub default_kind: ContentKind,
    pub export_format: ExportFormat,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_timeout_ms: Option<u64>,
}

impl Settings {
    /// Read settings from `path`. A missing file yields defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no settings file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read settings: {}", path.display()));
            }
        };

        if raw.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_json::from_str(&raw)
            .with_context(|| format!("Invalid settings file: {}", path.display()))
    }

    /// Settings from `$QRFORGE_CONFIG` or the platform config dir
    pub fn load_default() -> Result<Self> {
        Self::load(&crate::utils::config_path()?)
    }

    pub fn generation_timeout(&self) -> Option<Duration> {
        self.generation_timeout_ms.filter(|ms| *ms > 0).map(Duration::from_millis)
    }
}
