use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Rgb – renderer-neutral colour
// ---------------------------------------------------------------------------

/// An 8-bit sRGB colour shared by the egui view and the SVG exporter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Parse `#rrggbb` (the leading `#` is optional).
    pub fn from_hex(s: &str) -> Option<Self> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Rgb> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            // Start at matplotlib-ish blue rather than red.
            let hue = 210.0 + (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.65, 0.42);
            let rgb: Srgb = hsl.into_color();
            Rgb(
                (rgb.red * 255.0).round() as u8,
                (rgb.green * 255.0).round() as u8,
                (rgb.blue * 255.0).round() as u8,
            )
        })
        .collect()
}

/// Colour for panel `index`: the configured hex value when it parses,
/// otherwise the palette entry.
pub fn panel_color(configured: Option<&str>, palette: &[Rgb], index: usize) -> Rgb {
    configured
        .and_then(|hex| {
            let parsed = Rgb::from_hex(hex);
            if parsed.is_none() {
                log::warn!("Ignoring invalid colour '{hex}' for panel {}", index + 1);
            }
            parsed
        })
        .or_else(|| palette.get(index).copied())
        .unwrap_or(Rgb(31, 119, 180))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_parsing() {
        assert_eq!(Rgb::from_hex("#1f77b4"), Some(Rgb(0x1f, 0x77, 0xb4)));
        assert_eq!(Rgb::from_hex("FF0000"), Some(Rgb(255, 0, 0)));
        assert_eq!(Rgb::from_hex("#12345"), None);
        assert_eq!(Rgb::from_hex("#gg0000"), None);
    }

    #[test]
    fn palette_colours_are_distinct() {
        let p = generate_palette(4);
        assert_eq!(p.len(), 4);
        for i in 0..p.len() {
            for j in i + 1..p.len() {
                assert_ne!(p[i], p[j]);
            }
        }
        assert!(generate_palette(0).is_empty());
    }

    #[test]
    fn configured_colour_wins() {
        let p = generate_palette(2);
        assert_eq!(panel_color(Some("#000000"), &p, 0), Rgb(0, 0, 0));
        assert_eq!(panel_color(None, &p, 1), p[1]);
        assert_eq!(panel_color(Some("nope"), &p, 0), p[0]);
    }
}
