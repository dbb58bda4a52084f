//! Data models for payload configuration and saved history.
//!
//! - [`PayloadConfig`] - The editable configuration: content kind, raw inputs, render params
//! - [`RenderParams`] - Colors, margin, width, shape and error-correction level
//! - [`HistoryEntry`] - Immutable snapshot of a configuration saved by the user
//!
//! All models serialize to camelCase JSON, which is also the persisted history format.

pub mod config;
pub mod history;

pub use config::{
    ContentKind, ErrorCorrectionLevel, PayloadConfig, RenderParams, Shape, UnknownVariant,
    VCardConfig, WifiConfig, WifiSecurity,
};
pub use history::HistoryEntry;
