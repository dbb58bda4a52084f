//! The symbol encoder: payload text plus render parameters in, image out.
//!
//! [`QrEncoder`] is the narrow contract the rest of the crate depends on. The
//! production implementation, [`QrCodeEncoder`], builds the symbol with the `qrcode`
//! crate (which owns capacity limits and error correction) and rasterizes it with
//! `image` on a blocking task.

pub mod color;
pub mod raster;

use std::future::Future;
use std::pin::Pin;

use image::RgbaImage;
use qrcode::types::QrError;
use qrcode::{EcLevel, QrCode};
use tracing::debug;

use crate::error::EncodeError;
use crate::models::{ErrorCorrectionLevel, RenderParams};
pub use raster::{Geometry, MAX_DIMENSION, ModuleGrid};

pub type EncodeFuture<'a> =
    Pin<Box<dyn Future<Output = Result<RenderedImage, EncodeError>> + Send + 'a>>;

/// Asynchronous payload-to-image service
pub trait QrEncoder: Send + Sync {
    fn encode<'a>(&'a self, payload: &'a str, params: &'a RenderParams) -> EncodeFuture<'a>;
}

/// A rendered symbol: the module matrix, the parsed colors and the raster built from them
#[derive(Debug, Clone)]
pub struct RenderedImage {
    pub payload: String,
    pub params: RenderParams,
    pub grid: ModuleGrid,
    pub geometry: Geometry,
    pub foreground: [u8; 4],
    pub background: [u8; 4],
    pub raster: RgbaImage,
}

impl RenderedImage {
    pub fn dimensions(&self) -> (u32, u32) {
        self.raster.dimensions()
    }

    /// Half-block preview; the quiet zone is capped so it stays readable in a terminal
    pub fn to_terminal_string(&self) -> String {
        raster::to_half_blocks(&self.grid, self.params.margin.min(2))
    }
}

/// Production encoder backed by the `qrcode` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct QrCodeEncoder;

impl QrCodeEncoder {
    pub fn new() -> Self {
        Self
    }
}

impl QrEncoder for QrCodeEncoder {
    fn encode<'a>(&'a self, payload: &'a str, params: &'a RenderParams) -> EncodeFuture<'a> {
        let payload = payload.to_string();
        let params = params.clone();
        Box::pin(async move {
            tokio::task::spawn_blocking(move || render_payload(&payload, &params))
                .await
                .map_err(|e| EncodeError::Task(e.to_string()))?
        })
    }
}

/// Synchronous render. Used by [`QrCodeEncoder`] and anywhere a runtime is not at hand.
pub fn render_payload(payload: &str, params: &RenderParams) -> Result<RenderedImage, EncodeError> {
    let foreground = color::parse_hex_color(&params.foreground_color).ok_or_else(|| {
        EncodeError::InvalidColor { which: "foreground", value: params.foreground_color.clone() }
    })?;
    let background = color::parse_hex_color(&params.background_color).ok_or_else(|| {
        EncodeError::InvalidColor { which: "background", value: params.background_color.clone() }
    })?;

    let grid = build_grid(payload, params.error_correction_level)?;
    let geometry = Geometry::new(grid.size, params.margin, params.width)?;
    let raster = raster::rasterize(&grid, &geometry, params.shape, foreground, background);

    debug!(
        modules = grid.size,
        pixels = raster.width(),
        level = %params.error_correction_level,
        "rendered QR symbol"
    );

    Ok(RenderedImage {
        payload: payload.to_string(),
        params: params.clone(),
        grid,
        geometry,
        foreground,
        background,
        raster,
    })
}

/// Build the module matrix for `payload` at the given error-correction level
pub fn build_grid(payload: &str, level: ErrorCorrectionLevel) -> Result<ModuleGrid, EncodeError> {
    let code =
        QrCode::with_error_correction_level(payload.as_bytes(), ec_level(level)).map_err(|e| {
            match e {
                QrError::DataTooLong => EncodeError::Capacity { level: level.to_string() },
                other => EncodeError::Symbol(other.to_string()),
            }
        })?;

    Ok(ModuleGrid { size: code.width(), modules: code.into_colors() })
}

fn ec_level(level: ErrorCorrectionLevel) -> EcLevel {
    match level {
        ErrorCorrectionLevel::L => EcLevel::L,
        ErrorCorrectionLevel::M => EcLevel::M,
        ErrorCorrectionLevel::Q => EcLevel::Q,
        ErrorCorrectionLevel::H => EcLevel::H,
    }
}
