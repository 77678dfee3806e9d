use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::data::model::{canonical_rank, PITCH_TYPE_ORDER};

/// Fixed colours, index-aligned with [`PITCH_TYPE_ORDER`].
const FIXED_COLORS: [Color32; 9] = [
    Color32::from_rgb(0x4C, 0x56, 0x9B),
    Color32::from_rgb(0xB5, 0x90, 0xC3),
    Color32::from_rgb(0x45, 0xB0, 0xD8),
    Color32::from_rgb(0xB2, 0x22, 0x22), // firebrick
    Color32::from_rgb(0x00, 0xFF, 0x00),
    Color32::from_rgb(0xFB, 0xE2, 0x5E),
    Color32::from_rgb(0x3C, 0xB3, 0x71), // medium sea green
    Color32::from_rgb(0xFF, 0xA5, 0x00), // orange
    Color32::BLACK,
];

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Color mapping: pitch type → Color32
// ---------------------------------------------------------------------------

/// Maps pitch types to colours: known types keep their fixed colour, types
/// outside the palette get generated hues.
#[derive(Debug, Clone)]
pub struct PitchPalette {
    extra: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl PitchPalette {
    /// Build a palette covering every pitch type in `pitch_types`.
    pub fn new(pitch_types: &[String]) -> Self {
        let unknown: Vec<&String> = pitch_types
            .iter()
            .filter(|pt| canonical_rank(pt).is_none())
            .collect();
        let extra = unknown
            .iter()
            .zip(generate_palette(unknown.len()))
            .map(|(pt, c)| ((*pt).clone(), c))
            .collect();

        PitchPalette {
            extra,
            default_color: Color32::GRAY,
        }
    }

    /// Look up the colour for a pitch type.
    pub fn color_for(&self, pitch_type: Option<&str>) -> Color32 {
        let Some(pt) = pitch_type else {
            return self.default_color;
        };
        match canonical_rank(pt) {
            Some(rank) => FIXED_COLORS[rank],
            None => self.extra.get(pt).copied().unwrap_or(self.default_color),
        }
    }

    /// Legend entries for the types present, known types first in canonical
    /// order.
    pub fn legend_entries<'a>(&self, present: impl IntoIterator<Item = &'a str>) -> Vec<(String, Color32)> {
        let present: Vec<&str> = present.into_iter().collect();
        let mut entries: Vec<(String, Color32)> = PITCH_TYPE_ORDER
            .iter()
            .filter(|pt| present.contains(*pt))
            .map(|pt| (pt.to_string(), self.color_for(Some(*pt))))
            .collect();
        for pt in present {
            if canonical_rank(pt).is_none() && !entries.iter().any(|(name, _)| name.as_str() == pt) {
                entries.push((pt.to_string(), self.color_for(Some(pt))));
            }
        }
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_types_use_fixed_colours() {
        let palette = PitchPalette::new(&["직구".to_string(), "슬라".to_string()]);
        assert_eq!(palette.color_for(Some("직구")), Color32::from_rgb(0x4C, 0x56, 0x9B));
        assert_eq!(palette.color_for(Some("너클")), Color32::BLACK);
        assert_eq!(palette.color_for(None), Color32::GRAY);
    }

    #[test]
    fn unknown_types_get_distinct_generated_colours() {
        let palette = PitchPalette::new(&["sinker".to_string(), "직구".to_string(), "eephus".to_string()]);
        let a = palette.color_for(Some("sinker"));
        let b = palette.color_for(Some("eephus"));
        assert_ne!(a, b);
        assert_ne!(a, Color32::GRAY);
        assert_eq!(palette.color_for(Some("gyroball")), Color32::GRAY);
    }

    #[test]
    fn legend_lists_known_types_first() {
        let palette = PitchPalette::new(&["sinker".to_string()]);
        let names: Vec<String> = palette
            .legend_entries(["sinker", "커브", "직구", "커브"])
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(names, vec!["직구", "커브", "sinker"]);
    }

    #[test]
    fn palette_has_requested_size() {
        assert_eq!(generate_palette(5).len(), 5);
        assert!(generate_palette(0).is_empty());
    }
}
