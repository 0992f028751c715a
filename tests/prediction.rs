use std::path::PathBuf;

use nba_matchup::artifacts::{load_outliers, load_predictor, schema_report};
use nba_matchup::config::AppConfig;
use nba_matchup::error::PredictError;
use nba_matchup::predictor::MatchupPredictor;

fn fixtures_dir() -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path
}

fn resources_config() -> AppConfig {
    AppConfig::with_resource_dir(&fixtures_dir().join("resources"))
}

fn predictor() -> MatchupPredictor {
    load_predictor(&resources_config()).expect("fixture artifacts should load")
}

#[test]
fn predicts_stronger_team_from_fixture_artifacts() {
    let res = predictor()
        .predict("Boston Celtics", "Miami Heat")
        .expect("prediction should succeed");
    assert_eq!(res.team_a, "Boston Celtics");
    assert_eq!(res.team_b, "Miami Heat");
    assert_eq!(res.winner, "Boston Celtics");
    assert!(res.prob_a > 0.5 && res.prob_a < 1.0);
    assert_eq!(res.prob_a + res.prob_b, 1.0);
}

#[test]
fn swapping_teams_complements_probability() {
    let p = predictor();
    let pairs = [
        ("Boston Celtics", "Los Angeles Lakers"),
        ("Miami Heat", "Chicago Stags"),
        ("Los Angeles Lakers", "Miami Heat"),
    ];
    for (a, b) in pairs {
        let ab = p.predict(a, b).expect("a vs b");
        let ba = p.predict(b, a).expect("b vs a");
        assert!((ab.prob_a - (1.0 - ba.prob_a)).abs() < 1e-12, "{a} vs {b}");
        assert_eq!(ab.prob_a + ab.prob_b, 1.0);
    }
}

#[test]
fn repeated_predictions_are_bit_identical() {
    let p = predictor();
    let first = p.predict("Los Angeles Lakers", "Chicago Stags").unwrap();
    let second = p.predict("Los Angeles Lakers", "Chicago Stags").unwrap();
    assert_eq!(first.prob_a.to_bits(), second.prob_a.to_bits());
    assert_eq!(first, second);
}

#[test]
fn team_with_unparsable_stats_still_scores() {
    let res = predictor()
        .predict("Chicago Stags", "Boston Celtics")
        .expect("coerced stats should score");
    assert!(res.prob_a.is_finite());
    assert_eq!(res.winner, "Boston Celtics");
}

#[test]
fn roster_team_without_seasons_is_no_team_data() {
    let err = predictor()
        .predict("New York Knicks", "Boston Celtics")
        .unwrap_err();
    assert_eq!(err, PredictError::NoTeamData("New York Knicks".to_string()));
}

#[test]
fn selection_errors_are_distinct() {
    let p = predictor();
    assert_eq!(
        p.predict("", "Miami Heat").unwrap_err(),
        PredictError::MissingSelection
    );
    assert_eq!(
        p.predict("Miami Heat", "Miami Heat").unwrap_err(),
        PredictError::IdenticalTeams
    );
    assert_eq!(
        p.predict("Miami Heat", "Seattle SuperSonics").unwrap_err(),
        PredictError::InvalidTeam("Seattle SuperSonics".to_string())
    );
}

#[test]
fn field_covers_every_team_with_data() {
    let rows = predictor()
        .predict_against_field("Boston Celtics")
        .expect("field should score");
    let opponents: Vec<&str> = rows.iter().map(|r| r.team_b.as_str()).collect();
    assert_eq!(opponents.len(), 3);
    assert!(!opponents.contains(&"New York Knicks"));
    assert!(!opponents.contains(&"Boston Celtics"));
    for pair in rows.windows(2) {
        assert!(pair[0].prob_a >= pair[1].prob_a);
    }
}

#[test]
fn team_summary_reports_seasons() {
    let summary = predictor().team_summary("Los Angeles Lakers").unwrap();
    assert_eq!(summary.team, "LAL");
    assert_eq!(summary.seasons, 2);
    assert_eq!((summary.first_year, summary.last_year), (2001, 2002));
}

#[test]
fn schema_report_lists_columns_and_gaps() {
    let report = schema_report(&predictor());
    assert_eq!(
        report.columns,
        vec!["diff_o_pts", "diff_d_pts", "diff_o_reb", "diff_d_reb", "diff_pace"]
    );
    assert_eq!(report.fingerprint.len(), 64);
    assert_eq!(report.season_rows, 6);
    assert_eq!(report.roster_teams, 5);
    assert_eq!(report.teams_without_data, vec!["NYK"]);
}

#[test]
fn drifted_scaler_fails_at_startup() {
    let resources = fixtures_dir().join("resources");
    let drifted = fixtures_dir().join("drifted_scaler.json");
    let cfg = AppConfig::from_lookup(|key| match key {
        "NBA_RESOURCE_DIR" => Some(resources.to_string_lossy().into_owned()),
        "NBA_SCALER_PATH" => Some(drifted.to_string_lossy().into_owned()),
        _ => None,
    });
    let err = load_predictor(&cfg).unwrap_err();
    let root = err
        .downcast_ref::<PredictError>()
        .expect("root cause should be a schema error");
    assert!(matches!(root, PredictError::SchemaMismatch { .. }));
}

#[test]
fn outlier_report_passes_rows_through() {
    let report = load_outliers(&resources_config()).expect("outliers should load");
    assert_eq!(report.top_outliers().len(), 3);
    assert_eq!(report.top_outliers()[0][3], "Jordan");
    assert!(report.outlier_visual().ends_with("Images/iso_outliers.png"));
    assert!(report.render_table().lines().next().unwrap().contains("anomaly_score"));
}
