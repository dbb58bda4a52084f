use std::borrow::Cow;

use anyhow::{Context, Result};
use arboard::{Clipboard, ImageData};

use crate::render::RenderedImage;

/// Maximum clipboard payload (10MB), text or raw RGBA bytes
const MAX_CLIPBOARD_SIZE: usize = 10 * 1024 * 1024;

/// Clipboard operations, mockable in tests
trait ClipboardProvider {
    fn set_text(&mut self, text: &str) -> Result<()>;
    fn set_image(&mut self, width: usize, height: usize, rgba: &[u8]) -> Result<()>;
}

struct SystemClipboard {
    clipboard: Clipboard,
}

impl SystemClipboard {
    fn new() -> Result<Self> {
        let clipboard = Clipboard::new().context("Failed to initialize clipboard")?;
        Ok(Self { clipboard })
    }
}

impl ClipboardProvider for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<()> {
        self.clipboard.set_text(text).context("Failed to set clipboard contents")?;
        Ok(())
    }

    fn set_image(&mut self, width: usize, height: usize, rgba: &[u8]) -> Result<()> {
        let image = ImageData { width, height, bytes: Cow::Borrowed(rgba) };
        self.clipboard.set_image(image).context("Failed to copy image to clipboard")?;
        Ok(())
    }
}

fn validate_size(what: &str, len: usize) -> Result<()> {
    if len == 0 {
        anyhow::bail!("Cannot copy empty {} to clipboard", what);
    }
    if len > MAX_CLIPBOARD_SIZE {
        anyhow::bail!(
            "{} too large for clipboard ({} bytes, max {})",
            capitalize(what),
            len,
            MAX_CLIPBOARD_SIZE
        );
    }
    Ok(())
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn copy_text_with(text: &str, provider: &mut dyn ClipboardProvider) -> Result<()> {
    validate_size("text", text.len())?;
    provider.set_text(text)
}

fn copy_image_with(image: &RenderedImage, provider: &mut dyn ClipboardProvider) -> Result<()> {
    let (width, height) = image.dimensions();
    let rgba = image.raster.as_raw();
    validate_size("image", rgba.len())?;
    provider.set_image(width as usize, height as usize, rgba)
}

/// Copy text (typically the encoded payload) to the system clipboard.
///
/// Validation runs before the clipboard is opened, so empty or oversized input fails
/// the same way in headless environments.
pub fn copy_text_to_clipboard(text: &str) -> Result<()> {
    validate_size("text", text.len())?;
    let mut clipboard = SystemClipboard::new()?;
    copy_text_with(text, &mut clipboard)
}

/// Copy the rendered raster to the system clipboard as an RGBA image.
///
/// # Errors
/// - the image is empty or its pixel data exceeds 10MB
/// - the clipboard is unavailable (headless session, no display server) or locked
pub fn copy_image_to_clipboard(image: &RenderedImage) -> Result<()> {
    validate_size("image", image.raster.as_raw().len())?;
    let mut clipboard = SystemClipboard::new()?;
    copy_image_with(image, &mut clipboard)
}
