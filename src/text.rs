//! Label fitting without a font backend.
//!
//! Widths are estimated, not measured: the payload is rendered by backends we
//! do not control, so the estimate only has to keep labels inside their slot.

/// Average glyph advance as a fraction of the font size.
const GLYPH_WIDTH_RATIO: f64 = 0.6;

pub fn estimate_text_width_px(text: &str, font_px: f64) -> f64 {
    text.chars().count() as f64 * font_px * GLYPH_WIDTH_RATIO
}

/// Shorten `text` so it fits into `max_px`, ending in a single `…` when cut.
/// Returns an empty string when not even one glyph fits.
pub fn fit_label(text: &str, font_px: f64, max_px: f64) -> String {
    if estimate_text_width_px(text, font_px) <= max_px {
        return text.to_string();
    }
    let glyph = font_px * GLYPH_WIDTH_RATIO;
    if glyph <= 0.0 || !max_px.is_finite() {
        return String::new();
    }
    let slots = (max_px / glyph).floor().max(0.0) as usize;
    match slots {
        0 => String::new(),
        1 => text.chars().take(1).collect(),
        n => {
            let mut out: String = text.chars().take(n - 1).collect();
            out.push('…');
            out
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_labels_are_untouched() {
        assert_eq!(fit_label("go", 10.0, 100.0), "go");
    }

    #[test]
    fn long_labels_get_an_ellipsis() {
        // 6px per glyph, 30px -> 5 slots -> 4 chars + ellipsis
        let out = fit_label("ascii-art-web", 10.0, 30.0);
        assert_eq!(out, "asci…");
        assert!(estimate_text_width_px(&out, 10.0) <= 30.0);
    }

    #[test]
    fn no_room_means_empty() {
        assert_eq!(fit_label("abc", 10.0, 2.0), "");
        assert_eq!(fit_label("abc", 10.0, 7.0), "a");
    }
}
