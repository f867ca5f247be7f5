//! Marker color handling.
//!
//! The feed supplies an icon color per train and, occasionally, a text
//! color. Both arrive as free-form strings, so they are normalized to
//! `#rrggbb` before use; when the text color is missing or unusable, a
//! contrasting glyph color is derived from the fill so the marker glyph
//! stays legible on any route color.

/// Glyph color used on light fills.
pub const GLYPH_DARK: &str = "#0f172a";

/// Glyph color used on dark fills.
pub const GLYPH_LIGHT: &str = "#ffffff";

/// Perceived-luminance threshold above which a fill counts as "light".
const LUMINANCE_THRESHOLD: f64 = 0.55;

/// Normalizes a source color to lowercase `#rrggbb`.
///
/// Accepts 3- or 6-digit hex, with or without a leading `#`, surrounded by
/// arbitrary whitespace. Anything else falls back to `fallback`.
pub fn normalize_color(raw: &str, fallback: &str) -> String {
    match parse_rgb(raw) {
        Some((r, g, b)) => format!("#{:02x}{:02x}{:02x}", r, g, b),
        None => fallback.to_string(),
    }
}

/// Picks a glyph color that contrasts with `fill`.
///
/// Light fills get [`GLYPH_DARK`], dark fills get [`GLYPH_LIGHT`]. An
/// unparseable fill counts as dark.
pub fn contrast_glyph_color(fill: &str) -> &'static str {
    match parse_rgb(fill) {
        Some(rgb) if perceived_luminance(rgb) > LUMINANCE_THRESHOLD => GLYPH_DARK,
        _ => GLYPH_LIGHT,
    }
}

/// Normalizes a source-supplied glyph color, deriving one from the fill
/// when the supplied value is unusable.
pub fn normalize_glyph_color(raw: &str, fill: &str) -> String {
    match parse_rgb(raw) {
        Some((r, g, b)) => format!("#{:02x}{:02x}{:02x}", r, g, b),
        None => contrast_glyph_color(fill).to_string(),
    }
}

/// Parses a hex color into RGB components.
fn parse_rgb(raw: &str) -> Option<(u8, u8, u8)> {
    let hex = raw.trim().trim_start_matches('#');
    match hex.len() {
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some((r, g, b))
        }
        3 => {
            // Each digit doubles: #fa0 -> #ffaa00
            let r = u8::from_str_radix(&hex[0..1], 16).ok()?;
            let g = u8::from_str_radix(&hex[1..2], 16).ok()?;
            let b = u8::from_str_radix(&hex[2..3], 16).ok()?;
            Some((r * 17, g * 17, b * 17))
        }
        _ => None,
    }
}

/// Perceived luminance in `[0.0, 1.0]` (ITU-R BT.601 weights).
fn perceived_luminance((r, g, b): (u8, u8, u8)) -> f64 {
    (0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64) / 255.0
}
