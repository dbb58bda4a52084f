use qrcode::render::svg;

use crate::models::Shape;
use crate::render::RenderedImage;
use crate::render::color::to_hex;
use crate::render::raster::outline_radius_ratio;

/// Vector rendition of the symbol with the same geometry and colors as the raster.
///
/// The symbol itself comes from the `qrcode` SVG renderer, one unit per module with
/// the configured quiet zone. It is scaled to the raster's pixel size and, for rounded
/// and circle shapes, clipped to the same outline.
pub fn to_svg(image: &RenderedImage) -> String {
    let geometry = &image.geometry;
    let side = geometry.dimension;
    let units = geometry.total_modules;

    let dark = to_hex(image.foreground);
    let light = to_hex(image.background);
    let symbol = image
        .grid
        .renderer::<svg::Color>(geometry.margin)
        .module_dimensions(1, 1)
        .dark_color(svg::Color(&dark))
        .light_color(svg::Color(&light))
        .build();
    // Drop the XML prolog so the symbol can nest inside the outer document
    let symbol = symbol.find("<svg").map_or(symbol.as_str(), |start| &symbol[start..]);

    let (defs, clip) = match image.params.shape {
        Shape::Square => (String::new(), ""),
        Shape::Circle | Shape::Rounded => {
            let radius = round3(units as f64 * outline_radius_ratio(image.params.shape));
            (
                format!(
                    r#"<defs><clipPath id="outline"><rect width="{units}" height="{units}" rx="{radius}" ry="{radius}"/></clipPath></defs>"#
                ),
                r#" clip-path="url(#outline)""#,
            )
        }
    };

    format!(
        concat!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" version="1.1" width="{side}" height="{side}""#,
            r#" viewBox="0 0 {units} {units}" shape-rendering="crispEdges">"#,
            "\n{defs}<g{clip}>{symbol}</g>\n</svg>\n"
        ),
        side = side,
        units = units,
        defs = defs,
        clip = clip,
        symbol = symbol,
    )
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
