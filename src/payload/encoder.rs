use crate::models::{ContentKind, PayloadConfig, VCardConfig, WifiConfig};

/// Borrowed view of the fields that `kind` selects.
///
/// [`PayloadConfig`] keeps every kind's inputs around; this enum is the narrow
/// per-kind shape the encoder actually works with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Payload<'a> {
    Url(&'a str),
    Text(&'a str),
    Email(&'a str),
    Phone(&'a str),
    Wifi(&'a WifiConfig),
    Vcard(&'a VCardConfig),
}

impl<'a> Payload<'a> {
    pub fn from_config(config: &'a PayloadConfig) -> Self {
        match config.kind {
            ContentKind::Url => Payload::Url(&config.text),
            ContentKind::Text => Payload::Text(&config.text),
            ContentKind::Email => Payload::Email(&config.text),
            ContentKind::Phone => Payload::Phone(&config.text),
            ContentKind::Wifi => Payload::Wifi(&config.wifi),
            ContentKind::Vcard => Payload::Vcard(&config.vcard),
        }
    }

    /// Whether enough has been entered to attempt generation
    pub fn is_ready(&self) -> bool {
        match self {
            Payload::Url(text)
            | Payload::Text(text)
            | Payload::Email(text)
            | Payload::Phone(text) => !text.is_empty(),
            Payload::Wifi(wifi) => !wifi.ssid.is_empty(),
            Payload::Vcard(vcard) => !vcard.first_name.is_empty() || !vcard.last_name.is_empty(),
        }
    }

    /// Build the exact string handed to the symbol encoder.
    ///
    /// Field values are inserted verbatim. Delimiters inside an SSID or vCard field
    /// (`;`, `:`, `,`) are not escaped and can break the resulting syntax.
    pub fn encode(&self) -> String {
        match self {
            Payload::Url(text) => {
                // Only the literal prefix is checked, so "httpfoo.com" passes through as-is.
                if text.starts_with("http") {
                    (*text).to_string()
                } else {
                    format!("https://{}", text)
                }
            }
            Payload::Text(text) => (*text).to_string(),
            Payload::Email(text) => format!("mailto:{}", text),
            Payload::Phone(text) => format!("tel:{}", text),
            Payload::Wifi(wifi) => format!(
                "WIFI:T:{};S:{};P:{};H:{};;",
                wifi.security.as_str(),
                wifi.ssid,
                wifi.password,
                wifi.hidden
            ),
            Payload::Vcard(vcard) => [
                "BEGIN:VCARD".to_string(),
                "VERSION:3.0".to_string(),
                format!("FN:{} {}", vcard.first_name, vcard.last_name),
                format!("ORG:{}", vcard.organization),
                format!("TEL:{}", vcard.phone),
                format!("EMAIL:{}", vcard.email),
                format!("URL:{}", vcard.url),
                "END:VCARD".to_string(),
            ]
            .join("\n"),
        }
    }
}

/// Readiness predicate for a configuration
pub fn is_ready(config: &PayloadConfig) -> bool {
    Payload::from_config(config).is_ready()
}

/// Canonical payload string for a configuration.
///
/// Only meaningful when [`is_ready`] holds; an incomplete config still encodes,
/// just to something not worth rendering (e.g. `"https://"`).
pub fn encode(config: &PayloadConfig) -> String {
    Payload::from_config(config).encode()
}

/// `Some(payload)` when the configuration is ready, `None` otherwise
pub fn encode_if_ready(config: &PayloadConfig) -> Option<String> {
    let payload = Payload::from_config(config);
    payload.is_ready().then(|| payload.encode())
}
