//! Single-page PDF holding the raster image.
//!
//! The page is A4 with the image centred at 150 x 150 mm. The image is stored as an
//! uncompressed DeviceRGB XObject after compositing transparency onto white.

use image::RgbaImage;

const POINTS_PER_MM: f64 = 72.0 / 25.4;
const A4_WIDTH_MM: f64 = 210.0;
const A4_HEIGHT_MM: f64 = 297.0;
const IMAGE_SIDE_MM: f64 = 150.0;

pub fn to_pdf(raster: &RgbaImage) -> Vec<u8> {
    let (width, height) = raster.dimensions();
    let rgb = flatten_onto_white(raster);

    let page_w = A4_WIDTH_MM * POINTS_PER_MM;
    let page_h = A4_HEIGHT_MM * POINTS_PER_MM;
    let side = IMAGE_SIDE_MM * POINTS_PER_MM;
    let x = (page_w - side) / 2.0;
    let y = (page_h - side) / 2.0;
    let content = format!("q {side:.2} 0 0 {side:.2} {x:.2} {y:.2} cm /Im0 Do Q");

    let mut writer = PdfWriter::default();
    writer.object(b"<< /Type /Catalog /Pages 2 0 R >>");
    writer.object(b"<< /Type /Pages /Kids [3 0 R] /Count 1 >>");
    writer.object(
        format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {page_w:.2} {page_h:.2}] \
             /Resources << /XObject << /Im0 4 0 R >> >> /Contents 5 0 R >>"
        )
        .as_bytes(),
    );
    writer.stream(
        &format!(
            "/Type /XObject /Subtype /Image /Width {width} /Height {height} \
             /ColorSpace /DeviceRGB /BitsPerComponent 8"
        ),
        &rgb,
    );
    writer.stream("", content.as_bytes());
    writer.finish()
}

fn flatten_onto_white(raster: &RgbaImage) -> Vec<u8> {
    let mut rgb = Vec::with_capacity((raster.width() * raster.height() * 3) as usize);
    for pixel in raster.pixels() {
        let [r, g, b, a] = pixel.0;
        let a = a as u32;
        for c in [r, g, b] {
            rgb.push(((c as u32 * a + 255 * (255 - a)) / 255) as u8);
        }
    }
    rgb
}

/// Appends numbered objects and tracks their offsets for the xref table
#[derive(Default)]
struct PdfWriter {
    buf: Vec<u8>,
    offsets: Vec<usize>,
}

impl PdfWriter {
    fn begin_object(&mut self) {
        if self.buf.is_empty() {
            // Binary marker comment tells transports the file is not plain text
            self.buf.extend_from_slice(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n");
        }
        self.offsets.push(self.buf.len());
        let number = self.offsets.len();
        self.buf.extend_from_slice(format!("{number} 0 obj\n").as_bytes());
    }

    fn object(&mut self, body: &[u8]) {
        self.begin_object();
        self.buf.extend_from_slice(body);
        self.buf.extend_from_slice(b"\nendobj\n");
    }

    fn stream(&mut self, dict_entries: &str, data: &[u8]) {
        self.begin_object();
        let sep = if dict_entries.is_empty() { "" } else { " " };
        self.buf.extend_from_slice(
            format!("<< {dict_entries}{sep}/Length {} >>\nstream\n", data.len()).as_bytes(),
        );
        self.buf.extend_from_slice(data);
        self.buf.extend_from_slice(b"\nendstream\nendobj\n");
    }

    fn finish(mut self) -> Vec<u8> {
        let xref_offset = self.buf.len();
        let count = self.offsets.len() + 1;
        self.buf.extend_from_slice(format!("xref\n0 {count}\n0000000000 65535 f \n").as_bytes());
        for offset in &self.offsets {
            self.buf.extend_from_slice(format!("{offset:010} 00000 n \n").as_bytes());
        }
        self.buf.extend_from_slice(
            format!("trailer\n<< /Size {count} /Root 1 0 R >>\nstartxref\n{xref_offset}\n%%EOF\n")
                .as_bytes(),
        );
        self.buf
    }
}
