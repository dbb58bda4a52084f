use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Returned when a textual enum value (from flags or settings) is not recognised
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {what} '{value}' (expected one of: {expected})")]
pub struct UnknownVariant {
    pub what: &'static str,
    pub value: String,
    pub expected: &'static str,
}

/// Content kind discriminant. Selects which fields of [`PayloadConfig`] are consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    #[default]
    Url,
    Text,
    Email,
    Phone,
    Wifi,
    Vcard,
}

impl ContentKind {
    pub const ALL: [ContentKind; 6] = [
        ContentKind::Url,
        ContentKind::Text,
        ContentKind::Email,
        ContentKind::Phone,
        ContentKind::Wifi,
        ContentKind::Vcard,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Url => "url",
            ContentKind::Text => "text",
            ContentKind::Email => "email",
            ContentKind::Phone => "phone",
            ContentKind::Wifi => "wifi",
            ContentKind::Vcard => "vcard",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentKind {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContentKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownVariant {
                what: "content kind",
                value: s.to_string(),
                expected: "url, text, email, phone, wifi, vcard",
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ErrorCorrectionLevel {
    L,
    #[default]
    M,
    Q,
    H,
}

impl fmt::Display for ErrorCorrectionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCorrectionLevel::L => "L",
            ErrorCorrectionLevel::M => "M",
            ErrorCorrectionLevel::Q => "Q",
            ErrorCorrectionLevel::H => "H",
        };
        f.write_str(s)
    }
}

impl FromStr for ErrorCorrectionLevel {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "L" => Ok(ErrorCorrectionLevel::L),
            "M" => Ok(ErrorCorrectionLevel::M),
            "Q" => Ok(ErrorCorrectionLevel::Q),
            "H" => Ok(ErrorCorrectionLevel::H),
            _ => Err(UnknownVariant {
                what: "error correction level",
                value: s.to_string(),
                expected: "L, M, Q, H",
            }),
        }
    }
}

/// Outline applied to the finished image. Cosmetic only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    #[default]
    Square,
    Circle,
    Rounded,
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Shape::Square => "square",
            Shape::Circle => "circle",
            Shape::Rounded => "rounded",
        };
        f.write_str(s)
    }
}

impl FromStr for Shape {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "square" => Ok(Shape::Square),
            "circle" => Ok(Shape::Circle),
            "rounded" => Ok(Shape::Rounded),
            _ => Err(UnknownVariant {
                what: "shape",
                value: s.to_string(),
                expected: "square, circle, rounded",
            }),
        }
    }
}

/// Visual and encoding parameters handed to the encoder alongside the payload string.
///
/// Only `error_correction_level` changes the symbol itself; everything else is cosmetic.
/// Colors are kept as the user typed them (`#rrggbb` and friends) and parsed at render time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderParams {
    #[serde(default)]
    pub error_correction_level: ErrorCorrectionLevel,
    #[serde(default = "default_foreground")]
    pub foreground_color: String,
    #[serde(default = "default_background")]
    pub background_color: String,
    #[serde(default = "default_margin")]
    pub margin: u32,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default)]
    pub shape: Shape,
}

impl Default for RenderParams {
    fn default() -> Self {
        Self {
            error_correction_level: ErrorCorrectionLevel::default(),
            foreground_color: default_foreground(),
            background_color: default_background(),
            margin: default_margin(),
            width: default_width(),
            shape: Shape::default(),
        }
    }
}

fn default_foreground() -> String {
    "#000000".to_string()
}

fn default_background() -> String {
    "#ffffff".to_string()
}

fn default_margin() -> u32 {
    4
}

fn default_width() -> u32 {
    400
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum WifiSecurity {
    #[default]
    #[serde(rename = "WPA")]
    Wpa,
    #[serde(rename = "WEP")]
    Wep,
    #[serde(rename = "nopass")]
    NoPass,
}

impl WifiSecurity {
    /// Token written into the `T:` field of a WiFi payload
    pub fn as_str(&self) -> &'static str {
        match self {
            WifiSecurity::Wpa => "WPA",
            WifiSecurity::Wep => "WEP",
            WifiSecurity::NoPass => "nopass",
        }
    }
}

impl fmt::Display for WifiSecurity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WifiSecurity {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "wpa" => Ok(WifiSecurity::Wpa),
            "wep" => Ok(WifiSecurity::Wep),
            "nopass" | "none" => Ok(WifiSecurity::NoPass),
            _ => Err(UnknownVariant {
                what: "wifi security",
                value: s.to_string(),
                expected: "WPA, WEP, nopass",
            }),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WifiConfig {
    pub ssid: String,
    pub password: String,
    pub security: WifiSecurity,
    pub hidden: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VCardConfig {
    pub first_name: String,
    pub last_name: String,
    pub organization: String,
    pub phone: String,
    pub email: String,
    pub url: String,
}

/// The full editable configuration.
///
/// Stored as a product type: `text`, `wifi` and `vcard` are all kept no matter which
/// `kind` is selected, so switching kinds back and forth never loses input. Only the
/// fields selected by `kind` are consulted when encoding (see [`crate::payload`]).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayloadConfig {
    #[serde(default)]
    pub kind: ContentKind,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub render_params: RenderParams,
    #[serde(default)]
    pub wifi: WifiConfig,
    #[serde(default)]
    pub vcard: VCardConfig,
}

impl PayloadConfig {
    pub fn new(kind: ContentKind) -> Self {
        Self { kind, ..Self::default() }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_wifi(mut self, wifi: WifiConfig) -> Self {
        self.wifi = wifi;
        self
    }

    pub fn with_vcard(mut self, vcard: VCardConfig) -> Self {
        self.vcard = vcard;
        self
    }

    pub fn with_render_params(mut self, render_params: RenderParams) -> Self {
        self.render_params = render_params;
        self
    }
}
