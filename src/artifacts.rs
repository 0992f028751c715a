use anyhow::{Context, Result};
use tracing::info;

use crate::config::AppConfig;
use crate::model::{StackingClassifierArtifact, StandardScalerArtifact};
use crate::outliers::OutlierReport;
use crate::predictor::MatchupPredictor;
use crate::roster::TeamRoster;
use crate::scorer::Scorer;
use crate::season_store::SeasonStore;

#[derive(Debug, Clone)]
pub struct SchemaReport {
    pub version: u32,
    pub fingerprint: String,
    pub columns: Vec<String>,
    pub season_rows: usize,
    pub roster_teams: usize,
    pub teams_without_data: Vec<String>,
}

pub fn load_predictor(cfg: &AppConfig) -> Result<MatchupPredictor> {
    let store = SeasonStore::load(&cfg.seasons_path)?;
    let roster = TeamRoster::load(&cfg.teams_path)?;
    let scaler = StandardScalerArtifact::load(&cfg.scaler_path)?;
    let classifier = StackingClassifierArtifact::load(&cfg.classifier_path)?;

    let schema = store.schema().clone();
    let scorer = Scorer::new(&schema, Box::new(scaler), Box::new(classifier)).with_context(|| {
        format!(
            "season table {} does not match the fitted scaler/classifier",
            cfg.seasons_path.display()
        )
    })?;
    let predictor = MatchupPredictor::new(store, roster, scorer).context("build predictor")?;
    info!(
        schema_version = schema.version(),
        fingerprint = %schema.fingerprint(),
        features = schema.len(),
        "feature schema validated"
    );
    Ok(predictor)
}

pub fn load_outliers(cfg: &AppConfig) -> Result<OutlierReport> {
    OutlierReport::load(&cfg.outliers_path, &cfg.outlier_image_path)
}

pub fn schema_report(predictor: &MatchupPredictor) -> SchemaReport {
    let store = predictor.store();
    let schema = store.schema();
    let mut teams_without_data: Vec<String> = predictor
        .roster()
        .team_ids()
        .filter(|id| !store.contains(id))
        .map(str::to_string)
        .collect();
    teams_without_data.sort();
    SchemaReport {
        version: schema.version(),
        fingerprint: schema.fingerprint(),
        columns: schema.diff_columns(),
        season_rows: store.rows(),
        roster_teams: predictor.roster().len(),
        teams_without_data,
    }
}
