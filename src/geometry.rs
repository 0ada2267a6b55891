//! Geometry generators: path commands for lines and curves, marker thinning,
//! pie arcs, bar extents and skill gauges.
//!
//! All functions are pure; inputs are already in pixel space.

use crate::format::format_percent;
use crate::models::{ScaledPoint, SkillLevel};
use serde::{Serialize, Serializer};
use std::f64::consts::{PI, TAU};
use std::fmt;

/// Angular spans at least this close to a full turn are drawn as full circles.
const FULL_TURN_EPS: f64 = 1e-9;

/// Opaque RGB color; serialized as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color(pub u8, pub u8, pub u8);

impl Color {
    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&self.hex())
    }
}

/// One SVG path command, absolute coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveTo { x: f64, y: f64 },
    LineTo { x: f64, y: f64 },
    CubicTo { c1: (f64, f64), c2: (f64, f64), to: (f64, f64) },
    ArcTo {
        rx: f64,
        ry: f64,
        large_arc: bool,
        sweep: bool,
        to: (f64, f64),
    },
    Close,
}

impl fmt::Display for PathCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            PathCommand::MoveTo { x, y } => write!(f, "M {x:.2} {y:.2}"),
            PathCommand::LineTo { x, y } => write!(f, "L {x:.2} {y:.2}"),
            PathCommand::CubicTo { c1, c2, to } => write!(
                f,
                "C {:.2} {:.2} {:.2} {:.2} {:.2} {:.2}",
                c1.0, c1.1, c2.0, c2.1, to.0, to.1
            ),
            PathCommand::ArcTo { rx, ry, large_arc, sweep, to } => write!(
                f,
                "A {rx:.2} {ry:.2} 0 {} {} {:.2} {:.2}",
                u8::from(large_arc),
                u8::from(sweep),
                to.0,
                to.1
            ),
            PathCommand::Close => write!(f, "Z"),
        }
    }
}

/// An ordered list of path commands. Serializes as its SVG `d` string.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinePath {
    pub commands: Vec<PathCommand>,
}

impl Serialize for LinePath {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&self.to_svg())
    }
}

impl LinePath {
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// SVG `d` attribute.
    pub fn to_svg(&self) -> String {
        self.commands
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Approximate the path with straight segments. Cubic curves are sampled
    /// `samples` times; arc commands contribute their end point only (use
    /// [`arc_points`] when the arc itself must be traced).
    pub fn flatten(&self, samples: usize) -> Vec<(f64, f64)> {
        let samples = samples.max(1);
        let mut out: Vec<(f64, f64)> = Vec::new();
        let mut start = (0.0, 0.0);
        for cmd in &self.commands {
            match *cmd {
                PathCommand::MoveTo { x, y } => {
                    start = (x, y);
                    out.push((x, y));
                }
                PathCommand::LineTo { x, y } => out.push((x, y)),
                PathCommand::CubicTo { c1, c2, to } => {
                    let p0 = out.last().copied().unwrap_or(start);
                    for i in 1..=samples {
                        let t = i as f64 / samples as f64;
                        out.push(cubic_at(p0, c1, c2, to, t));
                    }
                }
                PathCommand::ArcTo { to, .. } => out.push(to),
                PathCommand::Close => out.push(start),
            }
        }
        out
    }
}

fn cubic_at(p0: (f64, f64), c1: (f64, f64), c2: (f64, f64), p1: (f64, f64), t: f64) -> (f64, f64) {
    let u = 1.0 - t;
    let a = u * u * u;
    let b = 3.0 * u * u * t;
    let c = 3.0 * u * t * t;
    let d = t * t * t;
    (
        a * p0.0 + b * c1.0 + c * c2.0 + d * p1.0,
        a * p0.1 + b * c1.1 + c * c2.1 + d * p1.1,
    )
}

/// Segment style of the progress line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum CurveStyle {
    /// Straight segments.
    Linear,
    /// Controls at the horizontal midpoint of each segment.
    #[default]
    CubicMidpoint,
    /// Controls at one and two thirds of each segment.
    CubicThirds,
}

/// Path through `points` in order. Control points stay at the height of the
/// segment end they belong to, so curves never overshoot vertically.
pub fn line_path(points: &[ScaledPoint], style: CurveStyle) -> LinePath {
    let mut commands = Vec::with_capacity(points.len());
    let Some(first) = points.first() else {
        return LinePath { commands };
    };
    commands.push(PathCommand::MoveTo {
        x: first.px,
        y: first.py,
    });
    for pair in points.windows(2) {
        let (p0, p1) = (pair[0], pair[1]);
        let dx = p1.px - p0.px;
        let cmd = match style {
            CurveStyle::Linear => PathCommand::LineTo {
                x: p1.px,
                y: p1.py,
            },
            CurveStyle::CubicMidpoint => {
                let mid = p0.px + dx / 2.0;
                PathCommand::CubicTo {
                    c1: (mid, p0.py),
                    c2: (mid, p1.py),
                    to: (p1.px, p1.py),
                }
            }
            CurveStyle::CubicThirds => PathCommand::CubicTo {
                c1: (p0.px + dx / 3.0, p0.py),
                c2: (p0.px + 2.0 * dx / 3.0, p1.py),
                to: (p1.px, p1.py),
            },
        };
        commands.push(cmd);
    }
    LinePath { commands }
}

/// Indices of the points that get a marker.
///
/// A point is kept when it sits at least `min_spacing` px to the right of the
/// last kept marker. The first and the last point are always kept.
pub fn thin_markers(points: &[ScaledPoint], min_spacing: f64) -> Vec<usize> {
    let Some(last_idx) = points.len().checked_sub(1) else {
        return Vec::new();
    };
    let mut kept = vec![0];
    let mut last_px = points[0].px;
    for (i, p) in points.iter().enumerate().skip(1) {
        if i == last_idx || (p.px - last_px).abs() >= min_spacing {
            kept.push(i);
            last_px = p.px;
        }
    }
    kept
}

/// Point on a circle; angles run clockwise from 12 o'clock.
pub fn polar(center: (f64, f64), radius: f64, angle: f64) -> (f64, f64) {
    (center.0 + radius * angle.sin(), center.1 - radius * angle.cos())
}

/// Open arc path from `start` to `end` along the circle. A full turn is split
/// into two half arcs since a single SVG arc cannot start and end at the same point.
pub fn arc_path(center: (f64, f64), radius: f64, start: f64, end: f64) -> LinePath {
    let span = end - start;
    let from = polar(center, radius, start);
    let mut commands = vec![PathCommand::MoveTo {
        x: from.0,
        y: from.1,
    }];
    if span >= TAU - FULL_TURN_EPS {
        let half = polar(center, radius, start + PI);
        for to in [half, from] {
            commands.push(PathCommand::ArcTo {
                rx: radius,
                ry: radius,
                large_arc: false,
                sweep: true,
                to,
            });
        }
    } else if span > 0.0 {
        commands.push(PathCommand::ArcTo {
            rx: radius,
            ry: radius,
            large_arc: span > PI,
            sweep: true,
            to: polar(center, radius, end),
        });
    }
    LinePath { commands }
}

/// Points along an arc, `steps` segments, both ends included.
pub fn arc_points(
    center: (f64, f64),
    radius: f64,
    start: f64,
    end: f64,
    steps: usize,
) -> Vec<(f64, f64)> {
    let steps = steps.max(1);
    (0..=steps)
        .map(|i| polar(center, radius, start + (end - start) * i as f64 / steps as f64))
        .collect()
}

/// Input of one pie slice.
#[derive(Debug, Clone, PartialEq)]
pub struct PieGroup {
    pub count: u64,
    pub label: String,
    pub color: Color,
}

/// A pie slice: both radii plus the arc between them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArcSlice {
    pub label: String,
    pub value: u64,
    pub color: Color,
    pub center: (f64, f64),
    pub radius: f64,
    /// Radians, clockwise from 12 o'clock.
    pub start_angle: f64,
    pub end_angle: f64,
    pub large_arc: bool,
    pub path: LinePath,
    pub hover: String,
}

impl ArcSlice {
    pub fn span(&self) -> f64 {
        self.end_angle - self.start_angle
    }

    /// Closed polygon (centre + arc) for backends without arc support.
    pub fn outline(&self, steps: usize) -> Vec<(f64, f64)> {
        let mut pts = vec![self.center];
        pts.extend(arc_points(self.center, self.radius, self.start_angle, self.end_angle, steps));
        pts
    }
}

fn slice_path(center: (f64, f64), radius: f64, start: f64, end: f64) -> LinePath {
    let arc = arc_path(center, radius, start, end);
    let mut commands = vec![PathCommand::MoveTo {
        x: center.0,
        y: center.1,
    }];
    for cmd in arc.commands {
        commands.push(match cmd {
            PathCommand::MoveTo { x, y } => PathCommand::LineTo { x, y },
            other => other,
        });
    }
    commands.push(PathCommand::Close);
    LinePath { commands }
}

/// Lay out pie slices as a running accumulation of `2π × count/total`.
///
/// Groups with a zero count get no slice. `None` when the total is zero:
/// the caller renders its "no data" state instead.
pub fn pie_slices(groups: &[PieGroup], center: (f64, f64), radius: f64) -> Option<Vec<ArcSlice>> {
    let total: u64 = groups.iter().map(|g| g.count).sum();
    if total == 0 {
        return None;
    }
    let mut cumulative = 0u64;
    let mut slices = Vec::with_capacity(groups.len());
    for g in groups {
        if g.count == 0 {
            continue;
        }
        let start_angle = TAU * cumulative as f64 / total as f64;
        cumulative += g.count;
        let end_angle = TAU * cumulative as f64 / total as f64;
        let share = g.count as f64 / total as f64;
        slices.push(ArcSlice {
            label: g.label.clone(),
            value: g.count,
            color: g.color,
            center,
            radius,
            start_angle,
            end_angle,
            large_arc: end_angle - start_angle > PI,
            path: slice_path(center, radius, start_angle, end_angle),
            hover: format!("{}: {} ({:.0}%)", g.label, g.count, share * 100.0),
        });
    }
    Some(slices)
}

/// `(value / max) × available`; `0` when `max` is zero or nothing is finite.
pub fn bar_length(value: f64, max: f64, available: f64) -> f64 {
    if !(max.is_finite() && max > 0.0) || !value.is_finite() || !available.is_finite() {
        return 0.0;
    }
    (value / max).max(0.0) * available
}

/// An axis-aligned bar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub color: Color,
    pub label: String,
    pub value: i64,
    pub hover: String,
}

/// Circular progress gauge for one skill.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillGauge {
    pub name: String,
    /// Clamped to `0..=1`.
    pub level: f64,
    pub percent_label: String,
    pub center: (f64, f64),
    pub radius: f64,
    pub stroke_width: f64,
    pub circumference: f64,
    /// `stroke-dashoffset` for a dash array of one circumference.
    pub dash_offset: f64,
    pub progress: LinePath,
}

impl SkillGauge {
    pub fn progress_points(&self, steps: usize) -> Vec<(f64, f64)> {
        if self.level <= 0.0 {
            return Vec::new();
        }
        arc_points(self.center, self.radius, 0.0, TAU * self.level, steps)
    }
}

/// Gauge inside a `size × size` square with a 10px ring.
pub fn skill_gauge(skill: &SkillLevel, size: f64) -> SkillGauge {
    let stroke_width = 10.0;
    let radius = (size / 2.0 - stroke_width).max(0.0);
    let level = if skill.level.is_finite() {
        skill.level.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let center = (size / 2.0, size / 2.0);
    let circumference = TAU * radius;
    SkillGauge {
        name: skill.name.clone(),
        level,
        percent_label: format_percent(level),
        center,
        radius,
        stroke_width,
        circumference,
        dash_offset: circumference * (1.0 - level),
        progress: arc_path(center, radius, 0.0, TAU * level),
    }
}

/// Any drawable primitive a chart is made of.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ChartGeometry {
    Line(LinePath),
    Arc(ArcSlice),
    Bar(BarRect),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(xs: &[(f64, f64)]) -> Vec<ScaledPoint> {
        xs.iter().map(|&(x, y)| ScaledPoint::new(x, y)).collect()
    }

    #[test]
    fn linear_path_commands() {
        let path = line_path(&pts(&[(0.0, 10.0), (5.0, 5.0), (10.0, 0.0)]), CurveStyle::Linear);
        assert_eq!(path.to_svg(), "M 0.00 10.00 L 5.00 5.00 L 10.00 0.00");
    }

    #[test]
    fn midpoint_controls_sit_at_segment_heights() {
        let path = line_path(&pts(&[(0.0, 100.0), (10.0, 50.0)]), CurveStyle::CubicMidpoint);
        assert_eq!(
            path.commands[1],
            PathCommand::CubicTo {
                c1: (5.0, 100.0),
                c2: (5.0, 50.0),
                to: (10.0, 50.0)
            }
        );
        let thirds = line_path(&pts(&[(0.0, 100.0), (9.0, 50.0)]), CurveStyle::CubicThirds);
        assert_eq!(
            thirds.commands[1],
            PathCommand::CubicTo {
                c1: (3.0, 100.0),
                c2: (6.0, 50.0),
                to: (9.0, 50.0)
            }
        );
    }

    #[test]
    fn flatten_samples_curves_and_ends_on_target() {
        let path = line_path(&pts(&[(0.0, 100.0), (10.0, 50.0)]), CurveStyle::CubicMidpoint);
        let flat = path.flatten(8);
        assert_eq!(flat.len(), 9);
        let end = flat.last().unwrap();
        assert!((end.0 - 10.0).abs() < 1e-9 && (end.1 - 50.0).abs() < 1e-9);
    }

    #[test]
    fn empty_and_single_point_paths() {
        assert!(line_path(&[], CurveStyle::Linear).is_empty());
        let one = line_path(&pts(&[(3.0, 4.0)]), CurveStyle::CubicThirds);
        assert_eq!(one.to_svg(), "M 3.00 4.00");
    }

    #[test]
    fn markers_thin_but_keep_ends() {
        let p = pts(&[(0.0, 0.0), (5.0, 0.0), (13.0, 0.0), (20.0, 0.0), (30.0, 0.0), (31.0, 0.0)]);
        assert_eq!(thin_markers(&p, 12.0), vec![0, 2, 4, 5]);
        assert_eq!(thin_markers(&p[..1], 12.0), vec![0]);
        assert!(thin_markers(&[], 12.0).is_empty());
    }

    #[test]
    fn pie_two_to_one() {
        let groups = vec![
            PieGroup {
                count: 2,
                label: "Pass".into(),
                color: Color(0, 255, 0),
            },
            PieGroup {
                count: 1,
                label: "Fail".into(),
                color: Color(255, 0, 0),
            },
        ];
        let slices = pie_slices(&groups, (100.0, 100.0), 80.0).unwrap();
        assert_eq!(slices.len(), 2);
        assert!((slices[0].span().to_degrees() - 240.0).abs() < 1e-9);
        assert!((slices[1].span().to_degrees() - 120.0).abs() < 1e-9);
        assert!(slices[0].large_arc);
        assert!(!slices[1].large_arc);
        let total: f64 = slices.iter().map(|s| s.span()).sum();
        assert!((total - TAU).abs() < 1e-9);
        assert_eq!(slices[0].hover, "Pass: 2 (67%)");
        let d = slices[0].path.to_svg();
        assert!(d.starts_with("M 100.00 100.00 L 100.00 20.00 A 80.00 80.00 0 1 1"));
    }

    #[test]
    fn pie_zero_total_is_none() {
        let groups = vec![PieGroup {
            count: 0,
            label: "Pass".into(),
            color: Color(0, 0, 0),
        }];
        assert!(pie_slices(&groups, (0.0, 0.0), 10.0).is_none());
        assert!(pie_slices(&[], (0.0, 0.0), 10.0).is_none());
    }

    #[test]
    fn single_group_pie_is_full_circle() {
        let groups = vec![PieGroup {
            count: 3,
            label: "Pass".into(),
            color: Color(0, 0, 0),
        }];
        let slices = pie_slices(&groups, (50.0, 50.0), 40.0).unwrap();
        let arcs = slices[0]
            .path
            .commands
            .iter()
            .filter(|c| matches!(c, PathCommand::ArcTo { .. }))
            .count();
        assert_eq!(arcs, 2);
    }

    #[test]
    fn bar_length_guards_zero_max() {
        assert_eq!(bar_length(5.0, 0.0, 250.0), 0.0);
        assert_eq!(bar_length(50.0, 100.0, 250.0), 125.0);
    }

    #[test]
    fn gauge_dash_offset() {
        let go = SkillLevel {
            name: "go".into(),
            level: 0.25,
        };
        let g = skill_gauge(&go, 120.0);
        assert_eq!(g.radius, 50.0);
        assert!((g.dash_offset - g.circumference * 0.75).abs() < 1e-9);
        assert_eq!(g.percent_label, "25%");
        let x = SkillLevel {
            name: "x".into(),
            level: 1.7,
        };
        let over = skill_gauge(&x, 120.0);
        assert_eq!(over.level, 1.0);
        assert_eq!(over.dash_offset, 0.0);
    }
}
