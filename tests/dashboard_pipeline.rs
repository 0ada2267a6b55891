use xpboard::charts::{Chart, ChartConfig, Dashboard, DashboardLayout};
use xpboard::models::{TxKind, UserProfileData};
use xpboard::series::build_cumulative_series;
use xpboard::stats::{AuditRatio, AuditSource, profile_summary, top_unique_skills};
use xpboard::{DashboardError, api};

const PROFILE: &str = include_str!("fixtures/profile.json");

fn fixture() -> UserProfileData {
    UserProfileData::from_json(PROFILE).expect("fixture parses")
}

#[test]
fn summary_from_saved_response() {
    let s = profile_summary(&fixture()).unwrap();
    assert_eq!(s.display_name, "Amina");
    assert_eq!(s.login, "amina");
    assert_eq!(s.total_xp, 300);
    assert_eq!(s.total_xp_label, "300 XP");
    assert_eq!(s.level_label, "12");

    // up/down rows win over the server-side auditRatio (1.2).
    assert_eq!(s.audit.given, 50);
    assert_eq!(s.audit.received, 25);
    assert_eq!(s.audit.source, AuditSource::Transactions);
    assert_eq!(s.audit.ratio, AuditRatio::Ratio(2.0));
    assert_eq!(s.audit_ratio_label, "2.0");

    // null grade is not counted
    assert_eq!((s.results.pass, s.results.fail), (2, 1));
}

#[test]
fn cumulative_series_over_fixture() {
    let xp: Vec<_> = fixture()
        .records()
        .into_iter()
        .filter(|r| r.kind == TxKind::Xp)
        .collect();
    let ys: Vec<i64> = build_cumulative_series(&xp, None).iter().map(|p| p.y).collect();
    assert_eq!(ys, vec![100, 150, 300]);
}

#[test]
fn skills_keep_best_score_per_name() {
    let skills = top_unique_skills(&fixture().skill_records(), 8);
    let names: Vec<_> = skills.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["algo", "go", "js"]);
    assert!((skills[1].level - 0.55).abs() < 1e-9);
}

#[test]
fn dashboard_build_is_deterministic() {
    let data = fixture();
    let layout = DashboardLayout::for_container(960.0);
    let config = ChartConfig::default();
    let a = Dashboard::build(&data, &layout, &config).unwrap();
    let b = Dashboard::build(&data, &layout, &config).unwrap();
    assert_eq!(a, b);
    assert_eq!(
        serde_json::to_string(&a).unwrap(),
        serde_json::to_string(&b).unwrap()
    );
    assert!(a.charts().iter().all(|(_, c)| !c.is_no_data()));
}

#[test]
fn pass_fail_pie_has_two_slices() {
    let layout = DashboardLayout::default();
    let d = Dashboard::build(&fixture(), &layout, &ChartConfig::default()).unwrap();
    let Chart::Pie(pie) = &d.pass_fail else {
        panic!("expected pie, got {:?}", d.pass_fail.title());
    };
    assert_eq!(pie.slices.len(), 2);
    assert!((pie.slices[0].span().to_degrees() - 240.0).abs() < 1e-6);
    assert!(pie.slices[0].large_arc);
    assert!(!pie.slices[1].large_arc);
    assert_eq!(pie.slices[0].hover, "Pass: 2 (67%)");
}

#[test]
fn start_date_filter_only_scopes_progress() {
    let data = fixture();
    let config = ChartConfig {
        start_date_filter: xpboard::models::parse_timestamp("2024-02-01"),
        ..ChartConfig::default()
    };
    let d = Dashboard::build(&data, &DashboardLayout::default(), &config).unwrap();
    let Chart::Line(line) = &d.xp_progress else {
        panic!("expected line chart");
    };
    assert_eq!(line.markers.len(), 2);
    assert!(line.markers.last().unwrap().hover.ends_with("200 XP"));

    let Chart::Bar(bars) = &d.xp_by_project else {
        panic!("expected bar chart");
    };
    let total: i64 = bars.bars.iter().map(|b| b.value).sum();
    assert_eq!(total, 300);
}

#[test]
fn missing_optional_fields_still_parse() {
    let raw = r#"{
        "user": [{ "id": 1, "login": "x" }],
        "transaction": [{ "amount": 10, "type": "xp", "createdAt": "2024-05-01" }]
    }"#;
    let data = UserProfileData::from_json(raw).unwrap();
    let layout = DashboardLayout::default();
    let d = Dashboard::build(&data, &layout, &ChartConfig::default()).unwrap();
    assert_eq!(d.summary.level_label, "N/A");
    assert_eq!(d.summary.audit_ratio_label, "N/A");
    assert!(d.pass_fail.is_no_data());
    assert!(d.audit.is_no_data());
    assert!(d.skills.is_no_data());
    assert!(!d.xp_progress.is_no_data());
}

#[test]
fn no_user_is_data_unavailable() {
    let data = UserProfileData::from_json(r#"{"data":{"user":[]}}"#).unwrap();
    let layout = DashboardLayout::default();
    let err = Dashboard::build(&data, &layout, &ChartConfig::default()).unwrap_err();
    assert!(matches!(err, DashboardError::DataUnavailable(_)));

    let v: serde_json::Value = serde_json::from_str(r#"{"data":{"user":[]}}"#).unwrap();
    let err = api::parse_graphql_response(v).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<DashboardError>(),
        Some(DashboardError::DataUnavailable(_))
    ));
}
