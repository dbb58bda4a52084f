use image::{Rgba, RgbaImage};
use qrcode::Color;
use qrcode::render::unicode::Dense1x2;
use qrcode::render::{Pixel, Renderer};

use crate::error::EncodeError;
use crate::models::Shape;

/// Pixels per module when the requested width is too small to fit the symbol
const FALLBACK_SCALE: u32 = 4;

/// Largest image side in pixels that will be allocated
pub const MAX_DIMENSION: u32 = 16_384;

/// Module matrix of a QR symbol, row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleGrid {
    pub size: usize,
    pub modules: Vec<Color>,
}

impl ModuleGrid {
    pub fn is_dark(&self, x: usize, y: usize) -> bool {
        x < self.size && y < self.size && self.modules[y * self.size + x] == Color::Dark
    }

    /// Like [`is_dark`](Self::is_dark) but for coordinates in a quiet-zone padded frame
    pub fn is_dark_padded(&self, x: isize, y: isize, margin: usize) -> bool {
        let (x, y) = (x - margin as isize, y - margin as isize);
        x >= 0 && y >= 0 && self.is_dark(x as usize, y as usize)
    }

    /// A `qrcode` renderer over this matrix with a `quiet_zone` of that many modules
    pub fn renderer<P: Pixel>(&self, quiet_zone: u32) -> Renderer<'_, P> {
        Renderer::new(&self.modules, self.size, quiet_zone)
    }
}

/// Output geometry: square image side in pixels and pixels per module
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    pub dimension: u32,
    pub scale: f64,
    pub margin: u32,
    pub total_modules: usize,
}

impl Geometry {
    /// The symbol plus `margin` modules on each side is stretched over `width` pixels.
    /// If that leaves less than one pixel per module, fall back to a fixed scale.
    ///
    /// Fails when the resulting side would exceed [`MAX_DIMENSION`].
    pub fn new(symbol_size: usize, margin: u32, width: u32) -> Result<Self, EncodeError> {
        let total = (symbol_size as u64).saturating_add(2 * u64::from(margin));
        let (dimension, fits_width) = if total > 0 && u64::from(width) >= total {
            (u64::from(width), true)
        } else {
            (total.saturating_mul(u64::from(FALLBACK_SCALE)), false)
        };

        if dimension > u64::from(MAX_DIMENSION) {
            return Err(EncodeError::TooLarge { pixels: dimension, max: MAX_DIMENSION });
        }

        // Both fit in u32 now: total <= dimension <= MAX_DIMENSION
        let dimension = dimension as u32;
        let total_modules = total as usize;
        let scale = if fits_width {
            f64::from(dimension) / total as f64
        } else {
            f64::from(FALLBACK_SCALE)
        };
        Ok(Self { dimension, scale, margin, total_modules })
    }

    /// Corner radius in pixels of the outline for `shape`
    pub fn corner_radius(&self, shape: Shape) -> f64 {
        f64::from(self.dimension) * outline_radius_ratio(shape)
    }
}

/// Corner radius of the outline as a fraction of the image side
pub fn outline_radius_ratio(shape: Shape) -> f64 {
    match shape {
        Shape::Square => 0.0,
        Shape::Rounded => 1.0 / 16.0,
        Shape::Circle => 0.5,
    }
}

/// Rasterize the grid into an RGBA image. Pixels outside the shape outline are transparent.
pub fn rasterize(
    grid: &ModuleGrid,
    geometry: &Geometry,
    shape: Shape,
    foreground: [u8; 4],
    background: [u8; 4],
) -> RgbaImage {
    let radius = geometry.corner_radius(shape);
    let side = f64::from(geometry.dimension);
    let margin = geometry.margin as usize;

    RgbaImage::from_fn(geometry.dimension, geometry.dimension, |px, py| {
        if !inside_outline(px as f64 + 0.5, py as f64 + 0.5, side, radius) {
            return Rgba([0, 0, 0, 0]);
        }
        let mx = (px as f64 / geometry.scale).floor() as isize;
        let my = (py as f64 / geometry.scale).floor() as isize;
        if grid.is_dark_padded(mx, my, margin) {
            Rgba(foreground)
        } else {
            Rgba(background)
        }
    })
}

/// Point-in-rounded-square test with corner radius `radius`
pub fn inside_outline(x: f64, y: f64, side: f64, radius: f64) -> bool {
    if radius <= 0.0 {
        return true;
    }
    let cx = x.clamp(radius, side - radius);
    let cy = y.clamp(radius, side - radius);
    let (dx, dy) = (x - cx, y - cy);
    dx * dx + dy * dy <= radius * radius
}

/// Unicode half-block rendering for terminals.
///
/// Colors are inverted so the code scans on dark backgrounds.
pub fn to_half_blocks(grid: &ModuleGrid, quiet_zone: u32) -> String {
    grid.renderer::<Dense1x2>(quiet_zone)
        .dark_color(Dense1x2::Light)
        .light_color(Dense1x2::Dark)
        .build()
}
