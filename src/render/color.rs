/// Parse a CSS-style hex color into RGBA.
///
/// Accepts `#rgb`, `#rgba`, `#rrggbb` and `#rrggbbaa` (leading `#` optional).
pub fn parse_hex_color(value: &str) -> Option<[u8; 4]> {
    let hex = value.trim();
    let hex = hex.strip_prefix('#').unwrap_or(hex);
    // `from_str_radix` alone would also take a sign
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    let digit = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok();
    let pair = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();

    match hex.len() {
        3 | 4 => {
            let mut rgba = [255u8; 4];
            for (slot, i) in rgba.iter_mut().zip(0..hex.len()) {
                let d = digit(i)?;
                *slot = d * 17;
            }
            Some(rgba)
        }
        6 | 8 => {
            let mut rgba = [255u8; 4];
            for (slot, i) in rgba.iter_mut().zip((0..hex.len()).step_by(2)) {
                *slot = pair(i)?;
            }
            Some(rgba)
        }
        _ => None,
    }
}

/// `#rrggbb` for an opaque color, `#rrggbbaa` otherwise
pub fn to_hex(rgba: [u8; 4]) -> String {
    if rgba[3] == 255 {
        format!("#{:02x}{:02x}{:02x}", rgba[0], rgba[1], rgba[2])
    } else {
        format!("#{:02x}{:02x}{:02x}{:02x}", rgba[0], rgba[1], rgba[2], rgba[3])
    }
}
