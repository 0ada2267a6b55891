//! Chart assembly: one parameterized builder per chart type, plus the
//! [`Dashboard`] that runs the whole pipeline over a fetched profile.
//!
//! Builders return target geometry only. Whether and how a backend animates
//! from the previous payload to the new one is up to the backend.

use crate::error::DashboardError;
use crate::format::{
    DateStyle, format_amount, format_date, format_magnitude, format_magnitude_f64, format_ratio,
};
use crate::geometry::{
    ArcSlice, BarRect, ChartGeometry, Color, CurveStyle, LinePath, PieGroup, SkillGauge,
    bar_length, line_path, pie_slices, skill_gauge, thin_markers,
};
use crate::models::{Record, ResultRecord, SkillLevel, TxKind, UserProfileData};
use crate::scale::{Domain, PaddingMode, Projection, Surface, grid_values, month_ticks};
use crate::series::build_cumulative_series;
use crate::stats::{
    AuditSummary, DEFAULT_SKILL_LIMIT, ProfileSummary, pass_fail_counts, profile_summary,
    top_unique_skills, xp_by_project,
};
use crate::text::fit_label;
use chrono::{DateTime, Utc};
use log::debug;
use serde::Serialize;

pub const LINE_COLOR: Color = Color(0x63, 0x66, 0xf1);
pub const BAR_COLOR: Color = Color(0x63, 0x66, 0xf1);
pub const PASS_COLOR: Color = Color(0x4a, 0xde, 0x80);
pub const FAIL_COLOR: Color = Color(0xef, 0x44, 0x44);
pub const GIVEN_COLOR: Color = Color(0x4a, 0xde, 0x80);
pub const RECEIVED_COLOR: Color = Color(0xf5, 0x9e, 0x0b);
pub const AXIS_COLOR: Color = Color(0x9c, 0xa3, 0xaf);
pub const LABEL_COLOR: Color = Color(0x37, 0x41, 0x51);
/// Room above a gauge row for the title.
pub const GAUGE_TITLE_BAND: f64 = 20.0;
/// Room below a gauge row for the skill names.
pub const GAUGE_NAME_BAND: f64 = 24.0;

pub const TRACK_COLOR: Color = Color(0xe5, 0xe7, 0xeb);

/// Axis/tick label font size used for layout estimates.
const LABEL_FONT_PX: f64 = 11.0;

/// Knobs shared by every chart builder.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartConfig {
    /// Drop XP records before this instant (inclusive bound).
    pub start_date_filter: Option<DateTime<Utc>>,
    pub padding_mode: PaddingMode,
    pub curve_style: CurveStyle,
    /// Minimum horizontal distance between two progress markers, in px.
    pub min_marker_spacing: f64,
    pub grid_line_count: usize,
    /// First month tick; defaults to the first day of the earliest month.
    pub campaign_start: Option<DateTime<Utc>>,
    pub skill_limit: usize,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            start_date_filter: None,
            padding_mode: PaddingMode::default(),
            curve_style: CurveStyle::default(),
            min_marker_spacing: 12.0,
            grid_line_count: 5,
            campaign_start: None,
            skill_limit: DEFAULT_SKILL_LIMIT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Segment {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

/// Horizontal grid line with its magnitude label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridLine {
    pub y: f64,
    pub x1: f64,
    pub x2: f64,
    pub value: f64,
    pub label: String,
}

/// Positioned text (tick or category label).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickLabel {
    pub x: f64,
    pub y: f64,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub px: f64,
    pub py: f64,
    pub hover: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineChart {
    pub title: String,
    pub surface: Surface,
    pub x_axis: Segment,
    pub y_axis: Segment,
    pub grid: Vec<GridLine>,
    pub ticks: Vec<TickLabel>,
    pub path: LinePath,
    pub color: Color,
    pub markers: Vec<Marker>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieChart {
    pub title: String,
    pub surface: Surface,
    pub center: (f64, f64),
    pub radius: f64,
    pub slices: Vec<ArcSlice>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Vertical,
    Horizontal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarChart {
    pub title: String,
    pub surface: Surface,
    pub orientation: Orientation,
    /// The line bars grow from.
    pub axis: Segment,
    pub bars: Vec<BarRect>,
    pub labels: Vec<TickLabel>,
    pub caption: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GaugeChart {
    pub title: String,
    /// Size of the square each gauge is laid out in.
    pub gauge_size: f64,
    pub gauges: Vec<SkillGauge>,
}

/// The "nothing to draw" state of any chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NoData {
    pub title: String,
    pub surface: Surface,
    pub message: String,
}

/// A renderable chart payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Chart {
    Line(LineChart),
    Pie(PieChart),
    Bar(BarChart),
    Gauges(GaugeChart),
    NoData(NoData),
}

impl Chart {
    fn no_data(title: &str, surface: Surface, message: &str) -> Self {
        Chart::NoData(NoData {
            title: title.to_string(),
            surface,
            message: message.to_string(),
        })
    }

    pub fn title(&self) -> &str {
        match self {
            Chart::Line(c) => &c.title,
            Chart::Pie(c) => &c.title,
            Chart::Bar(c) => &c.title,
            Chart::Gauges(c) => &c.title,
            Chart::NoData(c) => &c.title,
        }
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self, Chart::NoData(_))
    }

    /// Canvas size needed to draw the chart.
    pub fn surface(&self) -> Surface {
        match self {
            Chart::Line(c) => c.surface,
            Chart::Pie(c) => c.surface,
            Chart::Bar(c) => c.surface,
            Chart::Gauges(c) => {
                let n = c.gauges.len().max(1) as f64;
                Surface::new(c.gauge_size * n, c.gauge_size + GAUGE_TITLE_BAND + GAUGE_NAME_BAND)
            }
            Chart::NoData(c) => c.surface,
        }
    }

    /// The shapes of the chart, without axes and text.
    pub fn primitives(&self) -> Vec<ChartGeometry> {
        match self {
            Chart::Line(c) => vec![ChartGeometry::Line(c.path.clone())],
            Chart::Pie(c) => c.slices.iter().cloned().map(ChartGeometry::Arc).collect(),
            Chart::Bar(c) => c.bars.iter().cloned().map(ChartGeometry::Bar).collect(),
            Chart::Gauges(c) => c
                .gauges
                .iter()
                .map(|g| ChartGeometry::Line(g.progress.clone()))
                .collect(),
            Chart::NoData(_) => Vec::new(),
        }
    }
}

/// Cumulative XP over time.
pub fn xp_progress_chart(records: &[Record], surface: Surface, config: &ChartConfig) -> Chart {
    const TITLE: &str = "XP progress";
    let xp: Vec<Record> = records.iter().filter(|r| r.kind == TxKind::Xp).cloned().collect();
    let series = build_cumulative_series(&xp, config.start_date_filter);
    let Some(mut domain) = Domain::from_series(&series) else {
        return Chart::no_data(TITLE, surface, "No XP recorded yet");
    };

    let mut months = month_ticks(domain.min_date, domain.max_date, config.campaign_start);
    if domain.min_date == domain.max_date {
        // A zero-width range stays centred: only the point's own month is ticked.
        let keep_from = months.len().saturating_sub(1);
        months.drain(..keep_from);
    } else if let Some(first) = months.first() {
        // Widen the domain so the first month tick sits on the plot.
        domain.min_date = domain.min_date.min(*first);
    }

    let proj = Projection::new(domain, surface, config.padding_mode);
    let scaled: Vec<_> = series.iter().map(|p| proj.project(p)).collect();
    let path = line_path(&scaled, config.curve_style);

    let markers = thin_markers(&scaled, config.min_marker_spacing)
        .into_iter()
        .map(|i| Marker {
            px: scaled[i].px,
            py: scaled[i].py,
            hover: format!(
                "{} · {}",
                format_date(&series[i].x, DateStyle::Tooltip),
                format_magnitude(series[i].y)
            ),
        })
        .collect();

    let grid = grid_values(domain.max_magnitude, config.grid_line_count)
        .into_iter()
        .map(|v| GridLine {
            y: proj.y(v),
            x1: proj.left(),
            x2: proj.right(),
            value: v,
            label: format_magnitude_f64(v),
        })
        .collect();

    let ticks = months
        .iter()
        .map(|m| TickLabel {
            x: proj.x(*m),
            y: proj.baseline() + LABEL_FONT_PX + 4.0,
            text: format_date(m, DateStyle::Axis),
        })
        .collect();

    debug!(
        "xp progress: {} points, max {}, {} month ticks",
        series.len(),
        domain.max_magnitude,
        months.len()
    );

    Chart::Line(LineChart {
        title: TITLE.to_string(),
        surface,
        x_axis: Segment {
            x1: proj.left(),
            y1: proj.baseline(),
            x2: proj.right(),
            y2: proj.baseline(),
        },
        y_axis: Segment {
            x1: proj.left(),
            y1: proj.top(),
            x2: proj.left(),
            y2: proj.baseline(),
        },
        grid,
        ticks,
        path,
        color: LINE_COLOR,
        markers,
    })
}

/// XP per project as vertical bars, in first-seen project order.
pub fn xp_by_project_chart(records: &[Record], surface: Surface) -> Chart {
    const TITLE: &str = "XP by project";
    const SIDE: f64 = 20.0;
    const TOP: f64 = 10.0;
    const BOTTOM: f64 = 24.0;

    let groups = xp_by_project(records);
    let max = groups.iter().map(|(_, v)| *v).max().unwrap_or(0);
    if groups.is_empty() || max <= 0 {
        return Chart::no_data(TITLE, surface, "No project XP yet");
    }

    let baseline = (surface.height - BOTTOM).max(TOP);
    let available = baseline - TOP;
    let slot = (surface.width - 2.0 * SIDE).max(0.0) / groups.len() as f64;
    let bar_width = slot * 0.6;

    let mut bars = Vec::with_capacity(groups.len());
    let mut labels = Vec::with_capacity(groups.len());
    for (i, (name, value)) in groups.iter().enumerate() {
        let height = bar_length(*value as f64, max as f64, available);
        let x = SIDE + i as f64 * slot + (slot - bar_width) / 2.0;
        bars.push(BarRect {
            x,
            y: baseline - height,
            width: bar_width,
            height,
            color: BAR_COLOR,
            label: name.clone(),
            value: *value,
            hover: format!("{name}: {}", format_amount(*value)),
        });
        labels.push(TickLabel {
            x: x + bar_width / 2.0,
            y: baseline + LABEL_FONT_PX + 4.0,
            text: fit_label(name, LABEL_FONT_PX, slot),
        });
    }

    Chart::Bar(BarChart {
        title: TITLE.to_string(),
        surface,
        orientation: Orientation::Vertical,
        axis: Segment {
            x1: SIDE,
            y1: baseline,
            x2: surface.width - SIDE,
            y2: baseline,
        },
        bars,
        labels,
        caption: None,
    })
}

/// Pass/fail share of graded results.
pub fn pass_fail_chart(results: &[ResultRecord], surface: Surface) -> Chart {
    const TITLE: &str = "Pass / fail";
    let counts = pass_fail_counts(results);
    let groups = [
        PieGroup {
            count: counts.pass,
            label: "Pass".to_string(),
            color: PASS_COLOR,
        },
        PieGroup {
            count: counts.fail,
            label: "Fail".to_string(),
            color: FAIL_COLOR,
        },
    ];
    let center = (surface.width / 2.0, surface.height / 2.0);
    let radius = surface.width.min(surface.height) * 0.4;
    match pie_slices(&groups, center, radius) {
        Some(slices) => Chart::Pie(PieChart {
            title: TITLE.to_string(),
            surface,
            center,
            radius,
            slices,
        }),
        None => Chart::no_data(TITLE, surface, "No graded results yet"),
    }
}

/// Audit XP given vs received as two horizontal bars.
pub fn audit_chart(audit: &AuditSummary, surface: Surface) -> Chart {
    const TITLE: &str = "Audits";
    const LABEL_AREA: f64 = 80.0;
    const RIGHT: f64 = 90.0;
    const BAR_HEIGHT: f64 = 24.0;

    let rows = [
        ("Done", audit.given, GIVEN_COLOR),
        ("Received", audit.received, RECEIVED_COLOR),
    ];
    let max = audit.given.max(audit.received);
    if max <= 0 {
        return Chart::no_data(TITLE, surface, "No audits yet");
    }

    let available = (surface.width - LABEL_AREA - RIGHT).max(0.0);
    let row_gap = surface.height / (rows.len() as f64 + 1.0);
    let mut bars = Vec::with_capacity(rows.len());
    let mut labels = Vec::with_capacity(rows.len() * 2);
    for (i, (label, value, color)) in rows.into_iter().enumerate() {
        let center_y = row_gap * (i as f64 + 1.0);
        let width = bar_length(value as f64, max as f64, available);
        bars.push(BarRect {
            x: LABEL_AREA,
            y: center_y - BAR_HEIGHT / 2.0,
            width,
            height: BAR_HEIGHT,
            color,
            label: label.to_string(),
            value,
            hover: format!("{label}: {}", format_amount(value)),
        });
        labels.push(TickLabel {
            x: LABEL_AREA - 8.0,
            y: center_y,
            text: label.to_string(),
        });
        labels.push(TickLabel {
            x: LABEL_AREA + width + 8.0,
            y: center_y,
            text: format_magnitude(value),
        });
    }

    Chart::Bar(BarChart {
        title: TITLE.to_string(),
        surface,
        orientation: Orientation::Horizontal,
        axis: Segment {
            x1: LABEL_AREA,
            y1: 0.0,
            x2: LABEL_AREA,
            y2: surface.height,
        },
        bars,
        labels,
        caption: Some(format!("Audit ratio {}", format_ratio(audit.ratio))),
    })
}

/// One progress gauge per skill.
pub fn skills_chart(skills: &[SkillLevel], gauge_size: f64) -> Chart {
    const TITLE: &str = "Top skills";
    if skills.is_empty() {
        return Chart::no_data(TITLE, Surface::new(gauge_size, gauge_size), "No skills yet");
    }
    Chart::Gauges(GaugeChart {
        title: TITLE.to_string(),
        gauge_size,
        gauges: skills.iter().map(|s| skill_gauge(s, gauge_size)).collect(),
    })
}

/// Surfaces of every chart on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DashboardLayout {
    pub progress: Surface,
    pub projects: Surface,
    pub pass_fail: Surface,
    pub audit: Surface,
    pub gauge_size: f64,
}

impl Default for DashboardLayout {
    fn default() -> Self {
        Self::for_container(800.0)
    }
}

impl DashboardLayout {
    /// Derive all surfaces from the container width.
    pub fn for_container(width: f64) -> Self {
        let w = if width.is_finite() { width.max(240.0) } else { 800.0 };
        let pie = w.min(240.0);
        Self {
            progress: Surface::new(w, (w * 0.5).clamp(200.0, 400.0)),
            projects: Surface::new(w, 300.0),
            pass_fail: Surface::new(pie, pie),
            audit: Surface::new(w, 140.0),
            gauge_size: 120.0,
        }
    }
}

/// Every chart of the profile view, built in one synchronous pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub summary: ProfileSummary,
    pub xp_progress: Chart,
    pub xp_by_project: Chart,
    pub pass_fail: Chart,
    pub audit: Chart,
    pub skills: Chart,
}

impl Dashboard {
    /// Run the full pipeline. Pure: the same input and layout always give the
    /// same payload, so a resize simply calls this again.
    pub fn build(
        data: &UserProfileData,
        layout: &DashboardLayout,
        config: &ChartConfig,
    ) -> Result<Self, DashboardError> {
        let summary = profile_summary(data)
            .ok_or_else(|| DashboardError::DataUnavailable("response contains no user".into()))?;
        let records = data.records();
        let results = data.results();
        let skills = top_unique_skills(&data.skill_records(), config.skill_limit);

        Ok(Self {
            xp_progress: xp_progress_chart(&records, layout.progress, config),
            xp_by_project: xp_by_project_chart(&records, layout.projects),
            pass_fail: pass_fail_chart(&results, layout.pass_fail),
            audit: audit_chart(&summary.audit, layout.audit),
            skills: skills_chart(&skills, layout.gauge_size),
            summary,
        })
    }

    /// Charts with a file-friendly name each.
    pub fn charts(&self) -> [(&'static str, &Chart); 5] {
        [
            ("xp_progress", &self.xp_progress),
            ("xp_by_project", &self.xp_by_project),
            ("pass_fail", &self.pass_fail),
            ("audit", &self.audit),
            ("skills", &self.skills),
        ]
    }
}
