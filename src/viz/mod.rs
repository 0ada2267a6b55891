//! SVG rendering backend for chart payloads.
//!
//! Payloads are already in pixel space, so nothing here builds plotters
//! coordinate systems: shapes are drawn straight onto the root drawing area.
//! Curves are flattened to polylines and arcs tessellated to polygons.

pub mod util;

use crate::charts::{
    AXIS_COLOR, BarChart, Chart, Dashboard, GAUGE_TITLE_BAND, GaugeChart, LABEL_COLOR, LineChart,
    NoData, Orientation, PASS_COLOR, PieChart, TRACK_COLOR,
};
use anyhow::{Context, Result, anyhow};
use log::info;
use plotters::backend::DrawingBackend;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, VPos};
use plotters_svg::SVGBackend;
use std::path::{Path, PathBuf};

use util::{canvas_dim, label_style, px, px_point, rgb};

/// Samples per cubic segment when flattening the progress line.
const CURVE_SAMPLES: usize = 12;
/// Segments per full turn when tessellating arcs.
const ARC_STEPS_PER_TURN: f64 = 96.0;

fn draw_err<E: std::fmt::Debug>(e: E) -> anyhow::Error {
    anyhow!("{:?}", e)
}

/// Render one chart to an SVG file.
pub fn render_chart<P: AsRef<Path>>(chart: &Chart, out_path: P) -> Result<()> {
    let surface = chart.surface();
    let size = (canvas_dim(surface.width), canvas_dim(surface.height));
    let root = SVGBackend::new(out_path.as_ref(), size).into_drawing_area();
    draw_chart(&root, chart)?;
    root.present().map_err(draw_err)?;
    Ok(())
}

/// Render one chart into an in-memory SVG document.
pub fn render_chart_to_string(chart: &Chart) -> Result<String> {
    let surface = chart.surface();
    let mut buf = String::new();
    {
        let size = (canvas_dim(surface.width), canvas_dim(surface.height));
        let root = SVGBackend::with_string(&mut buf, size).into_drawing_area();
        draw_chart(&root, chart)?;
        root.present().map_err(draw_err)?;
    }
    Ok(buf)
}

/// Write one `<name>.svg` per dashboard chart into `dir`.
pub fn render_dashboard<P: AsRef<Path>>(dashboard: &Dashboard, dir: P) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    let mut written = Vec::new();
    for (name, chart) in dashboard.charts() {
        let path = dir.join(format!("{name}.svg"));
        render_chart(chart, &path).with_context(|| format!("render {}", path.display()))?;
        info!("wrote {}", path.display());
        written.push(path);
    }
    Ok(written)
}

fn draw_chart<DB: DrawingBackend>(root: &DrawingArea<DB, Shift>, chart: &Chart) -> Result<()> {
    root.fill(&WHITE).map_err(draw_err)?;
    root.draw(&Text::new(
        chart.title().to_string(),
        (6, 4),
        label_style(13, LABEL_COLOR, HPos::Left, VPos::Top),
    ))
    .map_err(draw_err)?;

    match chart {
        Chart::Line(c) => draw_line(root, c),
        Chart::Pie(c) => draw_pie(root, c),
        Chart::Bar(c) => draw_bars(root, c),
        Chart::Gauges(c) => draw_gauges(root, c),
        Chart::NoData(c) => draw_no_data(root, c),
    }
}

fn draw_line<DB: DrawingBackend>(root: &DrawingArea<DB, Shift>, c: &LineChart) -> Result<()> {
    let grid_style = rgb(AXIS_COLOR).mix(0.35).stroke_width(1);
    for g in &c.grid {
        root.draw(&PathElement::new(vec![(px(g.x1), px(g.y)), (px(g.x2), px(g.y))], grid_style))
            .map_err(draw_err)?;
        root.draw(&Text::new(
            g.label.clone(),
            (px(g.x1) - 6, px(g.y)),
            label_style(11, LABEL_COLOR, HPos::Right, VPos::Center),
        ))
        .map_err(draw_err)?;
    }

    let axis_style = rgb(AXIS_COLOR).stroke_width(1);
    for axis in [c.x_axis, c.y_axis] {
        root.draw(&PathElement::new(
            vec![(px(axis.x1), px(axis.y1)), (px(axis.x2), px(axis.y2))],
            axis_style,
        ))
        .map_err(draw_err)?;
    }

    for t in &c.ticks {
        root.draw(&Text::new(
            t.text.clone(),
            (px(t.x), px(t.y)),
            label_style(11, LABEL_COLOR, HPos::Center, VPos::Center),
        ))
        .map_err(draw_err)?;
    }

    let line: Vec<(i32, i32)> = c.path.flatten(CURVE_SAMPLES).into_iter().map(px_point).collect();
    root.draw(&PathElement::new(line, rgb(c.color).stroke_width(2)))
        .map_err(draw_err)?;

    for m in &c.markers {
        root.draw(&Circle::new((px(m.px), px(m.py)), 3, rgb(c.color).filled()))
            .map_err(draw_err)?;
    }
    Ok(())
}

fn draw_pie<DB: DrawingBackend>(root: &DrawingArea<DB, Shift>, c: &PieChart) -> Result<()> {
    for slice in &c.slices {
        let turns = slice.span() / std::f64::consts::TAU;
        let steps = (turns * ARC_STEPS_PER_TURN).ceil().max(2.0) as usize;
        let outline: Vec<(i32, i32)> = slice.outline(steps).into_iter().map(px_point).collect();
        root.draw(&Polygon::new(outline, rgb(slice.color).filled()))
            .map_err(draw_err)?;

        let mid = (slice.start_angle + slice.end_angle) / 2.0;
        let anchor = crate::geometry::polar(c.center, c.radius * 0.6, mid);
        root.draw(&Text::new(
            slice.label.clone(),
            px_point(anchor),
            label_style(12, LABEL_COLOR, HPos::Center, VPos::Center),
        ))
        .map_err(draw_err)?;
    }
    Ok(())
}

fn draw_bars<DB: DrawingBackend>(root: &DrawingArea<DB, Shift>, c: &BarChart) -> Result<()> {
    root.draw(&PathElement::new(
        vec![(px(c.axis.x1), px(c.axis.y1)), (px(c.axis.x2), px(c.axis.y2))],
        rgb(AXIS_COLOR).stroke_width(1),
    ))
    .map_err(draw_err)?;

    for b in &c.bars {
        if b.width <= 0.0 || b.height <= 0.0 {
            continue;
        }
        root.draw(&Rectangle::new(
            [(px(b.x), px(b.y)), (px(b.x + b.width), px(b.y + b.height))],
            rgb(b.color).filled(),
        ))
        .map_err(draw_err)?;
    }

    for l in &c.labels {
        let h = match c.orientation {
            Orientation::Vertical => HPos::Center,
            Orientation::Horizontal if l.x < c.axis.x1 => HPos::Right,
            Orientation::Horizontal => HPos::Left,
        };
        root.draw(&Text::new(
            l.text.clone(),
            (px(l.x), px(l.y)),
            label_style(11, LABEL_COLOR, h, VPos::Center),
        ))
        .map_err(draw_err)?;
    }

    if let Some(caption) = &c.caption {
        root.draw(&Text::new(
            caption.clone(),
            (6, px(c.surface.height) - 4),
            label_style(12, LABEL_COLOR, HPos::Left, VPos::Bottom),
        ))
        .map_err(draw_err)?;
    }
    Ok(())
}

fn draw_gauges<DB: DrawingBackend>(root: &DrawingArea<DB, Shift>, c: &GaugeChart) -> Result<()> {
    let top = GAUGE_TITLE_BAND;
    for (i, g) in c.gauges.iter().enumerate() {
        let dx = c.gauge_size * i as f64;
        let shift = |p: (f64, f64)| px_point((p.0 + dx, p.1 + top));
        let stroke = px(g.stroke_width).max(1) as u32;

        root.draw(&Circle::new(
            shift(g.center),
            px(g.radius),
            rgb(TRACK_COLOR).stroke_width(stroke),
        ))
        .map_err(draw_err)?;

        let steps = (g.level * ARC_STEPS_PER_TURN).ceil().max(2.0) as usize;
        let arc: Vec<(i32, i32)> = g.progress_points(steps).into_iter().map(shift).collect();
        if arc.len() > 1 {
            root.draw(&PathElement::new(arc, rgb(PASS_COLOR).stroke_width(stroke)))
                .map_err(draw_err)?;
        }

        root.draw(&Text::new(
            g.percent_label.clone(),
            shift(g.center),
            label_style(16, LABEL_COLOR, HPos::Center, VPos::Center),
        ))
        .map_err(draw_err)?;
        root.draw(&Text::new(
            g.name.clone(),
            shift((g.center.0, c.gauge_size + 4.0)),
            label_style(12, LABEL_COLOR, HPos::Center, VPos::Top),
        ))
        .map_err(draw_err)?;
    }
    Ok(())
}

fn draw_no_data<DB: DrawingBackend>(root: &DrawingArea<DB, Shift>, c: &NoData) -> Result<()> {
    root.draw(&Text::new(
        c.message.clone(),
        (px(c.surface.width / 2.0), px(c.surface.height / 2.0)),
        label_style(14, AXIS_COLOR, HPos::Center, VPos::Center),
    ))
    .map_err(draw_err)?;
    Ok(())
}
