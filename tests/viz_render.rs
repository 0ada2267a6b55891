use tempfile::tempdir;
use xpboard::charts::{ChartConfig, Dashboard, DashboardLayout, pass_fail_chart};
use xpboard::models::UserProfileData;
use xpboard::scale::Surface;
use xpboard::{storage, viz};

const PROFILE: &str = include_str!("fixtures/profile.json");

fn dashboard() -> Dashboard {
    let data = UserProfileData::from_json(PROFILE).unwrap();
    Dashboard::build(&data, &DashboardLayout::default(), &ChartConfig::default()).unwrap()
}

#[test]
fn dashboard_renders_one_svg_per_chart() {
    let dir = tempdir().unwrap();
    let written = viz::render_dashboard(&dashboard(), dir.path()).unwrap();
    assert_eq!(written.len(), 5);
    for path in &written {
        assert!(path.exists(), "{} missing", path.display());
        let svg = std::fs::read_to_string(path).unwrap();
        assert!(svg.contains("<svg"), "{} is not svg", path.display());
    }
    assert!(dir.path().join("xp_progress.svg").exists());
    assert!(dir.path().join("skills.svg").exists());
}

#[test]
fn chart_renders_to_string_with_title() {
    let d = dashboard();
    let svg = viz::render_chart_to_string(&d.audit).unwrap();
    assert!(svg.starts_with("<svg") || svg.contains("<svg"));
    assert!(svg.contains("Audits"));
    assert!(svg.contains("Audit ratio 2.0"));
}

#[test]
fn no_data_chart_still_renders() {
    let chart = pass_fail_chart(&[], Surface::new(200.0, 200.0));
    assert!(chart.is_no_data());
    let svg = viz::render_chart_to_string(&chart).unwrap();
    assert!(svg.contains("No graded results yet"));
}

#[test]
fn dashboard_payload_saves_as_json() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("dashboard.json");
    storage::save_json(&dashboard(), &path).unwrap();
    let raw = std::fs::read_to_string(&path).unwrap();
    let v: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(v["xp_progress"]["kind"], "line");
    assert_eq!(v["pass_fail"]["kind"], "pie");
    assert!(v["xp_progress"]["path"].as_str().unwrap().starts_with("M "));
    assert_eq!(v["summary"]["login"], "amina");
}
