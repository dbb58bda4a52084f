//! File artifacts from a rendered image: PNG, SVG or a one-page PDF.

pub mod pdf;
pub mod svg;

use std::fmt;
use std::fs;
use std::io::Cursor;
use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use image::{DynamicImage, ImageFormat};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ExportError;
use crate::models::UnknownVariant;
use crate::render::RenderedImage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Png,
    Svg,
    Pdf,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [ExportFormat::Png, ExportFormat::Svg, ExportFormat::Pdf];

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Svg => "svg",
            ExportFormat::Pdf => "pdf",
        }
    }

    /// Format implied by a file extension, if it names one
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension().and_then(|ext| ext.to_str()).and_then(|ext| ext.parse().ok())
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|f| f.extension().eq_ignore_ascii_case(s.trim())).ok_or_else(
            || UnknownVariant {
                what: "export format",
                value: s.to_string(),
                expected: "png, svg, pdf",
            },
        )
    }
}

/// Turns a rendered image into the bytes of a downloadable file
pub trait ExportGateway {
    fn export(&self, image: &RenderedImage, format: ExportFormat) -> Result<Vec<u8>, ExportError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FileExporter;

impl FileExporter {
    pub fn new() -> Self {
        Self
    }

    /// Export and write to `path`, replacing any existing file atomically
    pub fn write_to(
        &self,
        image: &RenderedImage,
        format: ExportFormat,
        path: &Path,
    ) -> Result<(), ExportError> {
        let bytes = self.export(image, format)?;

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| ExportError::Io(parent.to_path_buf(), e))?;
        }

        let tmp_path = path.with_extension(format!("{}.tmp", format.extension()));
        fs::write(&tmp_path, &bytes).map_err(|e| ExportError::Io(tmp_path.clone(), e))?;
        fs::rename(&tmp_path, path).map_err(|e| ExportError::Io(path.to_path_buf(), e))?;

        info!(path = %path.display(), %format, bytes = bytes.len(), "exported QR code");
        Ok(())
    }
}

impl ExportGateway for FileExporter {
    fn export(&self, image: &RenderedImage, format: ExportFormat) -> Result<Vec<u8>, ExportError> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(ExportError::EmptyImage);
        }

        match format {
            ExportFormat::Png => {
                let mut buf = Cursor::new(Vec::new());
                DynamicImage::ImageRgba8(image.raster.clone())
                    .write_to(&mut buf, ImageFormat::Png)
                    .map_err(|source| ExportError::Png { format: "png", source })?;
                Ok(buf.into_inner())
            }
            ExportFormat::Svg => Ok(svg::to_svg(image).into_bytes()),
            ExportFormat::Pdf => Ok(pdf::to_pdf(&image.raster)),
        }
    }
}

/// `qrcode-<unix millis>.<ext>`
pub fn default_file_name(format: ExportFormat, now: DateTime<Utc>) -> String {
    format!("qrcode-{}.{}", now.timestamp_millis(), format.extension())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use tempfile::TempDir;

    use super::*;
    use crate::models::RenderParams;
    use crate::render::render_payload;

    fn image() -> RenderedImage {
        render_payload("https://example.com", &RenderParams::default()).unwrap()
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("PNG".parse::<ExportFormat>().unwrap(), ExportFormat::Png);
        assert_eq!("svg".parse::<ExportFormat>().unwrap(), ExportFormat::Svg);
        assert_eq!(" pdf ".parse::<ExportFormat>().unwrap(), ExportFormat::Pdf);
        let err = "gif".parse::<ExportFormat>().unwrap_err();
        assert!(err.to_string().contains("gif"));
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(ExportFormat::from_path(Path::new("out/code.SVG")), Some(ExportFormat::Svg));
        assert_eq!(ExportFormat::from_path(Path::new("code.pdf")), Some(ExportFormat::Pdf));
        assert_eq!(ExportFormat::from_path(Path::new("code.jpeg")), None);
        assert_eq!(ExportFormat::from_path(Path::new("code")), None);
    }

    #[test]
    fn test_default_file_name() {
        let now = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        assert_eq!(default_file_name(ExportFormat::Png, now), "qrcode-1700000000123.png");
        assert_eq!(default_file_name(ExportFormat::Pdf, now), "qrcode-1700000000123.pdf");
    }

    #[test]
    fn test_png_bytes_decode_back() {
        let bytes = FileExporter::new().export(&image(), ExportFormat::Png).unwrap();
        assert!(bytes.starts_with(&[0x89, b'P', b'N', b'G']));

        let decoded = image::load_from_memory_with_format(&bytes, ImageFormat::Png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (400, 400));
    }

    #[test]
    fn test_write_to_creates_parent_and_leaves_no_temp() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out").join("code.svg");

        FileExporter::new().write_to(&image(), ExportFormat::Svg, &path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("<svg"));
        assert!(!dir.path().join("out").join("code.svg.tmp").exists());
    }

    #[test]
    fn test_empty_image_rejected() {
        let mut empty = image();
        empty.raster = image::RgbaImage::new(0, 0);
        let err = FileExporter::new().export(&empty, ExportFormat::Png).unwrap_err();
        assert!(matches!(err, ExportError::EmptyImage));
    }
}
