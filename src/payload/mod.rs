//! Payload encoding: configuration in, barcode text out.
//!
//! Two pure functions make up the contract:
//!
//! - [`is_ready`] - whether the active fields hold enough to attempt generation
//! - [`encode`] - the canonical payload string for the active kind
//!
//! | kind  | payload |
//! |-------|---------|
//! | url   | text, with `https://` prepended unless it already starts with `http` |
//! | text  | text unchanged |
//! | email | `mailto:` + text |
//! | phone | `tel:` + text |
//! | wifi  | `WIFI:T:<security>;S:<ssid>;P:<password>;H:<true\|false>;;` |
//! | vcard | fixed-field vCard 3.0 block, empty fields kept |
//!
//! # Example
//!
//! ```
//! use qrforge::models::{ContentKind, PayloadConfig};
//! use qrforge::payload::{encode, is_ready};
//!
//! let config = PayloadConfig::new(ContentKind::Url).with_text("example.com");
//! assert!(is_ready(&config));
//! assert_eq!(encode(&config), "https://example.com");
//! ```

pub mod encoder;

pub use encoder::{Payload, encode, encode_if_ready, is_ready};
