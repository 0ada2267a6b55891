//! Small conversions between payload geometry and plotters' pixel space.

use crate::geometry::Color;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

pub const FONT_FAMILY: &str = "sans-serif";

#[inline]
pub fn rgb(c: Color) -> RGBColor {
    RGBColor(c.0, c.1, c.2)
}

/// Round a payload coordinate onto the pixel grid.
#[inline]
pub fn px(v: f64) -> i32 {
    if v.is_finite() { v.round() as i32 } else { 0 }
}

#[inline]
pub fn px_point(p: (f64, f64)) -> (i32, i32) {
    (px(p.0), px(p.1))
}

/// Canvas dimension: at least one pixel.
pub fn canvas_dim(v: f64) -> u32 {
    if v.is_finite() && v >= 1.0 { v.round() as u32 } else { 1 }
}

/// Label style with the given anchor.
pub fn label_style(size: u32, color: Color, h: HPos, v: VPos) -> TextStyle<'static> {
    (FONT_FAMILY, size)
        .into_font()
        .color(&rgb(color))
        .pos(Pos::new(h, v))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn px_rounds_and_guards() {
        assert_eq!(px(10.4), 10);
        assert_eq!(px(10.6), 11);
        assert_eq!(px(f64::NAN), 0);
        assert_eq!(canvas_dim(0.2), 1);
        assert_eq!(canvas_dim(499.6), 500);
    }
}
