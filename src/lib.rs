//! xpboard
//!
//! A Rust library for turning a learner's platform activity (XP transactions,
//! graded results, skill scores, audits) into chart geometry. Pairs with the
//! `xpboard` CLI.
//!
//! ### Features
//! - Sign in and fetch the profile dataset from the platform's GraphQL engine
//! - Derive metrics: cumulative XP, XP per project, pass/fail counts, audit ratio, top skills
//! - Build renderer-agnostic chart payloads in pixel space (paths, arcs, bars, gauges)
//! - Render payloads to SVG, or save them as JSON/CSV
//!
//! ### Example
//! ```no_run
//! use xpboard::{ChartConfig, Dashboard, DashboardLayout, UserProfileData};
//!
//! let raw = std::fs::read_to_string("profile.json")?;
//! let data = UserProfileData::from_json(&raw)?;
//! let layout = DashboardLayout::for_container(960.0);
//! let dashboard = Dashboard::build(&data, &layout, &ChartConfig::default())?;
//! xpboard::viz::render_dashboard(&dashboard, "charts")?;
//! xpboard::storage::save_json(&dashboard, "dashboard.json")?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod api;
pub mod auth;
pub mod charts;
pub mod error;
pub mod format;
pub mod geometry;
pub mod models;
pub mod scale;
pub mod series;
pub mod stats;
pub mod storage;
pub mod text;
pub mod viz;

pub use api::Client;
pub use charts::{Chart, ChartConfig, Dashboard, DashboardLayout};
pub use error::DashboardError;
pub use models::{Point, Record, UserProfileData};
