//! Domain -> pixel projection for the drawing surface.
//!
//! Everything here is rebuilt from scratch whenever the surface or the data
//! changes; no projection outlives a resize.

use crate::models::{Point, ScaledPoint};
use chrono::{DateTime, Datelike, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Quiet period before a burst of resize events triggers one recompute.
pub const RESIZE_DEBOUNCE_MS: u64 = 250;

/// Safety cap for month stepping (100 years).
const MAX_MONTH_TICKS: u32 = 1200;

/// Drawing surface size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Surface {
    pub width: f64,
    pub height: f64,
}

impl Surface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width: finite_or_zero(width).max(0.0),
            height: finite_or_zero(height).max(0.0),
        }
    }
}

/// How much room to leave between the surface edge and the plot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PaddingMode {
    Fixed(f64),
    /// `fraction × width`, clamped to `[min, max]`.
    Responsive { fraction: f64, min: f64, max: f64 },
}

impl Default for PaddingMode {
    fn default() -> Self {
        PaddingMode::Fixed(40.0)
    }
}

impl PaddingMode {
    pub fn resolve(&self, width: f64) -> f64 {
        let p = match *self {
            PaddingMode::Fixed(p) => p,
            PaddingMode::Responsive { fraction, min, max } => {
                let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
                (fraction * width).clamp(lo, hi)
            }
        };
        finite_or_zero(p).max(0.0)
    }
}

/// Data extent the projection maps from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Domain {
    pub min_date: DateTime<Utc>,
    pub max_date: DateTime<Utc>,
    pub max_magnitude: f64,
}

impl Domain {
    /// Extent of a cumulative series; `None` for an empty series.
    pub fn from_series(points: &[Point]) -> Option<Self> {
        let min_date = points.iter().map(|p| p.x).min()?;
        let max_date = points.iter().map(|p| p.x).max()?;
        let max_magnitude = points.iter().map(|p| p.y).max().unwrap_or(0).max(0) as f64;
        Some(Self {
            min_date,
            max_date,
            max_magnitude,
        })
    }
}

/// Linear date/magnitude -> pixel mapping for one surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub domain: Domain,
    pub surface: Surface,
    pub padding: f64,
}

impl Projection {
    pub fn new(domain: Domain, surface: Surface, padding: PaddingMode) -> Self {
        Self {
            domain,
            surface,
            padding: padding.resolve(surface.width),
        }
    }

    pub fn left(&self) -> f64 {
        self.padding
    }

    pub fn right(&self) -> f64 {
        self.surface.width - self.padding
    }

    pub fn top(&self) -> f64 {
        self.padding
    }

    /// Pixel row of magnitude zero.
    pub fn baseline(&self) -> f64 {
        self.surface.height - self.padding
    }

    /// `[min_date, max_date] -> [left, right]`; a zero-width date range maps
    /// to the horizontal midpoint.
    pub fn x(&self, date: DateTime<Utc>) -> f64 {
        let span = (self.domain.max_date - self.domain.min_date).num_milliseconds();
        if span == 0 {
            return self.surface.width / 2.0;
        }
        let offset = (date - self.domain.min_date).num_milliseconds();
        let t = offset as f64 / span as f64;
        self.left() + t * (self.right() - self.left())
    }

    /// `[0, max_magnitude] -> [baseline, top]`; a zero (or invalid) max maps
    /// everything onto the baseline.
    pub fn y(&self, magnitude: f64) -> f64 {
        let max = self.domain.max_magnitude;
        if !(max.is_finite() && max > 0.0) || !magnitude.is_finite() {
            return self.baseline();
        }
        let t = magnitude / max;
        self.baseline() - t * (self.baseline() - self.top())
    }

    pub fn x_scale(&self) -> impl Fn(DateTime<Utc>) -> f64 + '_ {
        move |d| self.x(d)
    }

    pub fn y_scale(&self) -> impl Fn(f64) -> f64 + '_ {
        move |v| self.y(v)
    }

    pub fn project(&self, p: &Point) -> ScaledPoint {
        ScaledPoint::new(self.x(p.x), self.y(p.y as f64))
    }
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() { v } else { 0.0 }
}

fn month_start(d: DateTime<Utc>) -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(d.year(), d.month(), 1)
        .and_then(|n| n.and_hms_opt(0, 0, 0))
        .map(|n| n.and_utc())
        .unwrap_or(d)
}

/// One tick per calendar month.
///
/// Starts at the first day of `min`'s month, or at `campaign_start` when
/// given, and steps a month at a time while `<= max`. The month containing
/// `max` always gets a tick.
pub fn month_ticks(
    min: DateTime<Utc>,
    max: DateTime<Utc>,
    campaign_start: Option<DateTime<Utc>>,
) -> Vec<DateTime<Utc>> {
    let start = campaign_start.unwrap_or_else(|| month_start(min));
    let mut ticks = Vec::new();
    for i in 0..MAX_MONTH_TICKS {
        // Offsets from `start` (not from the previous tick) so a day-31 start
        // does not drift after a short month.
        let Some(t) = start.checked_add_months(Months::new(i)) else { break };
        if t > max {
            break;
        }
        ticks.push(t);
    }
    let covers_max = ticks
        .last()
        .is_some_and(|t| t.year() == max.year() && t.month() == max.month());
    if !covers_max {
        ticks.push(month_start(max));
    }
    ticks
}

/// `count + 1` evenly spaced magnitudes from `0` to `max`. A zero max only
/// has the baseline.
pub fn grid_values(max: f64, count: usize) -> Vec<f64> {
    if !(max.is_finite() && max > 0.0) || count == 0 {
        return vec![0.0];
    }
    (0..=count).map(|i| max * i as f64 / count as f64).collect()
}

/// Coalesces bursts of container-size observations into a single recompute.
///
/// The caller feeds every observed size with [`observe`](Self::observe) and
/// asks [`poll`](Self::poll) whether it is time to rebuild. A size is released
/// once no new observation arrived for `quiet`, and only if it differs from
/// the size applied last.
#[derive(Debug, Clone)]
pub struct ResizeDebouncer {
    quiet: Duration,
    pending: Option<(Surface, Instant)>,
    applied: Option<Surface>,
}

impl Default for ResizeDebouncer {
    fn default() -> Self {
        Self::new(Duration::from_millis(RESIZE_DEBOUNCE_MS))
    }
}

impl ResizeDebouncer {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: None,
            applied: None,
        }
    }

    pub fn observe(&mut self, surface: Surface, now: Instant) {
        self.pending = Some((surface, now));
    }

    pub fn poll(&mut self, now: Instant) -> Option<Surface> {
        let (surface, at) = self.pending?;
        if now.saturating_duration_since(at) < self.quiet {
            return None;
        }
        self.pending = None;
        if self.applied == Some(surface) {
            return None;
        }
        self.applied = Some(surface);
        Some(surface)
    }

    /// Size of the last released recompute.
    pub fn applied(&self) -> Option<Surface> {
        self.applied
    }
}
