use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use tracing::{debug, info};

use crate::error::{PredictError, PredictResult};
use crate::schema::FeatureSchema;

const TEAM_COL: &str = "team";
const YEAR_COL: &str = "year";
const LEAGUE_COLS: [&str; 2] = ["leag", "league"];
const WON_COL: &str = "won";
const LOST_COL: &str = "lost";
const WIN_PCT_COL: &str = "win_pct";

#[derive(Debug, Clone, PartialEq)]
pub struct SeasonRecord {
    pub team: String,
    pub year: i32,
    pub league: String,
    pub won: f64,
    pub lost: f64,
    pub stats: Vec<f64>,
}

impl SeasonRecord {
    pub fn win_pct(&self) -> f64 {
        let games = self.won + self.lost;
        if games == 0.0 { 0.0 } else { self.won / games }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TeamSummary {
    pub team: String,
    pub seasons: usize,
    pub leagues: Vec<String>,
    pub first_year: i32,
    pub last_year: i32,
    pub mean_win_pct: f64,
}

#[derive(Debug, Clone)]
pub struct SeasonStore {
    schema: FeatureSchema,
    by_team: HashMap<String, Vec<SeasonRecord>>,
    rows: usize,
}

impl SeasonStore {
    pub fn load(path: &Path) -> Result<Self> {
        let file =
            File::open(path).with_context(|| format!("open season table {}", path.display()))?;
        let store = Self::from_reader(file)
            .with_context(|| format!("parse season table {}", path.display()))?;
        info!(
            path = %path.display(),
            rows = store.rows,
            teams = store.by_team.len(),
            features = store.schema.len(),
            "season table loaded"
        );
        Ok(store)
    }

    pub fn from_reader<R: Read>(rdr: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(rdr);
        let headers = reader.headers().context("read season header")?.clone();
        let cols = SeasonColumns::from_headers(&headers)?;

        let mut records = Vec::new();
        let mut skipped = 0usize;
        for (line, row) in reader.records().enumerate() {
            let row = row.with_context(|| format!("read season row {}", line + 1))?;
            let team = row.get(cols.team).unwrap_or_default();
            if team.is_empty() {
                skipped += 1;
                continue;
            }
            let year = row
                .get(cols.year)
                .and_then(|raw| raw.parse::<i32>().ok())
                .unwrap_or(0);
            let league = cols
                .league
                .and_then(|idx| row.get(idx))
                .unwrap_or_default()
                .to_string();
            records.push(SeasonRecord {
                team: team.to_string(),
                year,
                league,
                won: coerce_numeric(row.get(cols.won)),
                lost: coerce_numeric(row.get(cols.lost)),
                stats: cols
                    .features
                    .iter()
                    .map(|idx| coerce_numeric(row.get(*idx)))
                    .collect(),
            });
        }
        if skipped > 0 {
            debug!(skipped, "season rows without a team id skipped");
        }

        Self::from_records(FeatureSchema::new(cols.feature_names), records)
    }

    pub fn from_records(schema: FeatureSchema, records: Vec<SeasonRecord>) -> Result<Self> {
        let rows = records.len();
        let mut by_team: HashMap<String, Vec<SeasonRecord>> = HashMap::new();
        for record in records {
            if record.stats.len() != schema.len() {
                return Err(anyhow!(
                    "season record {} {} has {} stats, schema has {}",
                    record.team,
                    record.year,
                    record.stats.len(),
                    schema.len()
                ));
            }
            by_team.entry(record.team.clone()).or_default().push(record);
        }
        Ok(Self {
            schema,
            by_team,
            rows,
        })
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn contains(&self, team: &str) -> bool {
        self.by_team.get(team).is_some_and(|r| !r.is_empty())
    }

    pub fn teams(&self) -> impl Iterator<Item = &str> {
        self.by_team.keys().map(String::as_str)
    }

    pub fn records_for(&self, team: &str) -> PredictResult<&[SeasonRecord]> {
        match self.by_team.get(team) {
            Some(records) if !records.is_empty() => Ok(records.as_slice()),
            _ => Err(PredictError::UnknownTeam(team.to_string())),
        }
    }

    pub fn summary(&self, team: &str) -> PredictResult<TeamSummary> {
        let records = self.records_for(team)?;
        let mut leagues: Vec<String> = records.iter().map(|r| r.league.clone()).collect();
        leagues.sort();
        leagues.dedup();
        let mut win_pcts: Vec<f64> = records.iter().map(SeasonRecord::win_pct).collect();
        win_pcts.sort_by(f64::total_cmp);
        let mean_win_pct = win_pcts.iter().sum::<f64>() / win_pcts.len() as f64;
        Ok(TeamSummary {
            team: team.to_string(),
            seasons: records.len(),
            leagues,
            first_year: records.iter().map(|r| r.year).min().unwrap_or_default(),
            last_year: records.iter().map(|r| r.year).max().unwrap_or_default(),
            mean_win_pct,
        })
    }
}

struct SeasonColumns {
    team: usize,
    year: usize,
    league: Option<usize>,
    won: usize,
    lost: usize,
    features: Vec<usize>,
    feature_names: Vec<String>,
}

impl SeasonColumns {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self> {
        let find = |name: &str| headers.iter().position(|h| h == name);
        let required = |name: &str| {
            find(name).ok_or_else(|| anyhow!("season table has no `{name}` column"))
        };
        let team = required(TEAM_COL)?;
        let year = required(YEAR_COL)?;
        let won = required(WON_COL)?;
        let lost = required(LOST_COL)?;
        let league = LEAGUE_COLS.iter().find_map(|name| find(name));

        let mut features = Vec::new();
        let mut feature_names = Vec::new();
        for (idx, name) in headers.iter().enumerate() {
            if idx == team || idx == year || Some(idx) == league {
                continue;
            }
            if matches!(name, WON_COL | LOST_COL | WIN_PCT_COL) {
                continue;
            }
            features.push(idx);
            feature_names.push(name.to_string());
        }

        Ok(Self {
            team,
            year,
            league,
            won,
            lost,
            features,
            feature_names,
        })
    }
}

/// Unparsable, missing and non-finite cells become 0.
pub fn coerce_numeric(raw: Option<&str>) -> f64 {
    raw.map(str::trim)
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}
