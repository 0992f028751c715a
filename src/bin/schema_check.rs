use std::path::PathBuf;

use anyhow::Result;
use chrono::Utc;

use nba_matchup::artifacts;
use nba_matchup::config::{self, AppConfig};

fn main() -> Result<()> {
    config::load_dotenv();
    config::init_tracing();

    let cfg = parse_resources_arg()
        .map(|dir| AppConfig::with_resource_dir(&dir))
        .unwrap_or_else(AppConfig::from_env);

    // Fails with the mismatching column lists if the artifacts drifted apart.
    let predictor = artifacts::load_predictor(&cfg)?;
    let report = artifacts::schema_report(&predictor);

    println!("Schema check passed at {}", Utc::now().to_rfc3339());
    println!("Seasons: {}", cfg.seasons_path.display());
    println!("Scaler: {}", cfg.scaler_path.display());
    println!("Classifier: {}", cfg.classifier_path.display());
    println!("Schema version: {}", report.version);
    println!("Fingerprint: {}", report.fingerprint);
    println!("Season rows: {}", report.season_rows);
    println!("Roster teams: {}", report.roster_teams);
    println!("Columns ({}):", report.columns.len());
    for col in &report.columns {
        println!("  {col}");
    }
    if !report.teams_without_data.is_empty() {
        println!(
            "Roster teams without season data: {}",
            report.teams_without_data.join(", ")
        );
    }

    Ok(())
}

fn parse_resources_arg() -> Option<PathBuf> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    for (idx, arg) in args.iter().enumerate() {
        if let Some(path) = arg.strip_prefix("--resources=") {
            let trimmed = path.trim();
            if !trimmed.is_empty() {
                return Some(PathBuf::from(trimmed));
            }
        }
        if arg == "--resources"
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
        {
            return Some(PathBuf::from(next));
        }
    }
    None
}
