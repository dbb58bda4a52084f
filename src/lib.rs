//! qrforge - QR code generation for links, text, email, phone, WiFi and vCards
//!
//! The library is organised around three pieces:
//!
//! - [`payload`]: pure encoding of a [`models::PayloadConfig`] into the text a QR code carries
//! - [`generation`]: a latest-wins controller that renders the current configuration
//!   through an asynchronous [`render::QrEncoder`]
//! - [`history`]: a newest-first, deduplicated, size-capped log of saved configurations
//!
//! Rendered images can be written as PNG, SVG or PDF ([`export`]) or copied to the
//! system clipboard ([`clipboard`]).
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use qrforge::generation::{GenerationController, GenerationOutcome};
//! use qrforge::models::{ContentKind, PayloadConfig};
//! use qrforge::render::QrCodeEncoder;
//!
//! # async fn demo() {
//! let controller = GenerationController::new(Arc::new(QrCodeEncoder::new()));
//! let config = PayloadConfig::new(ContentKind::Url).with_text("example.com");
//! if let GenerationOutcome::Rendered(image) = controller.on_config_change(&config).await {
//!     println!("{}", image.to_terminal_string());
//! }
//! # }
//! ```

pub mod cli;
pub mod clipboard;
pub mod error;
pub mod export;
pub mod generation;
pub mod history;
pub mod logging;
pub mod models;
pub mod payload;
pub mod render;
pub mod settings;
pub mod tui;
pub mod utils;

// Re-export commonly used types
pub use error::{EncodeError, ExportError, StorageError};
pub use generation::{GenerationController, GenerationOutcome};
pub use history::HistoryStore;
pub use models::{ContentKind, HistoryEntry, PayloadConfig, RenderParams};
pub use payload::{encode, is_ready};
