//! Typed error kinds surfaced by the library.
//!
//! An incomplete configuration is deliberately absent here: it only withholds
//! generation (see [`crate::generation::GenerationOutcome::NotReady`]).

use std::path::PathBuf;

use thiserror::Error;

/// The encoder rejected the payload or failed while rendering
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("invalid {which} color '{value}' (expected #rgb, #rrggbb or #rrggbbaa)")]
    InvalidColor { which: &'static str, value: String },

    #[error("payload too long for error correction level {level}")]
    Capacity { level: String },

    #[error("image would be {pixels} px wide (max {max})")]
    TooLarge { pixels: u64, max: u32 },

    #[error("could not build QR symbol: {0}")]
    Symbol(String),

    #[error("encoder timed out after {0} ms")]
    Timeout(u64),

    #[error("render task failed: {0}")]
    Task(String),
}

/// Producing a file artifact from a rendered image failed
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to encode {format}: {source}")]
    Png {
        format: &'static str,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to write `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("nothing to export: image is empty")]
    EmptyImage,
}

/// Durable keyed storage failures
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O error on `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("stored history is corrupt")]
    Corrupt(#[from] serde_json::Error),
}
