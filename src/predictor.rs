use std::cmp::Ordering;
use std::fmt;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, warn};

use crate::aggregate::{FeatureVector, average};
use crate::encoder::MatchupEncoder;
use crate::error::{PredictError, PredictResult};
use crate::roster::TeamRoster;
use crate::schema::ensure_columns;
use crate::scorer::Scorer;
use crate::season_store::{SeasonStore, TeamSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ValidatingInput,
    Aggregating,
    Encoding,
    Scoring,
    Done,
}

fn advance(stage: &mut Stage, next: Stage) {
    debug!(from = ?*stage, to = ?next, "prediction stage");
    *stage = next;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    pub team_a: String,
    pub team_b: String,
    pub winner: String,
    pub prob_a: f64,
    pub prob_b: f64,
}

impl fmt::Display for PredictionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} vs {}", self.team_a, self.team_b)?;
        writeln!(f, "Winner: {}", self.winner)?;
        writeln!(f, "{} Win Probability: {:.2}%", self.team_a, self.prob_a * 100.0)?;
        write!(f, "{} Win Probability: {:.2}%", self.team_b, self.prob_b * 100.0)
    }
}

#[derive(Debug)]
pub struct MatchupPredictor {
    store: SeasonStore,
    roster: TeamRoster,
    encoder: MatchupEncoder,
    scorer: Scorer,
}

impl MatchupPredictor {
    pub fn new(store: SeasonStore, roster: TeamRoster, scorer: Scorer) -> PredictResult<Self> {
        let encoder = MatchupEncoder::new(store.schema().clone());
        ensure_columns(&encoder.schema().diff_columns(), scorer.columns())?;
        Ok(Self {
            store,
            roster,
            encoder,
            scorer,
        })
    }

    pub fn roster(&self) -> &TeamRoster {
        &self.roster
    }

    pub fn store(&self) -> &SeasonStore {
        &self.store
    }

    pub fn predict(&self, team_a: &str, team_b: &str) -> PredictResult<PredictionResult> {
        let mut stage = Stage::ValidatingInput;
        let out = self.run(team_a, team_b, &mut stage);
        match &out {
            Ok(res) => debug!(
                team_a = %res.team_a,
                team_b = %res.team_b,
                prob_a = res.prob_a,
                ?stage,
                "prediction finished"
            ),
            Err(err) => warn!(team_a, team_b, ?stage, %err, "prediction failed"),
        }
        out
    }

    fn run(
        &self,
        team_a: &str,
        team_b: &str,
        stage: &mut Stage,
    ) -> PredictResult<PredictionResult> {
        let (name_a, name_b) = (team_a.trim(), team_b.trim());
        if name_a.is_empty() || name_b.is_empty() {
            return Err(PredictError::MissingSelection);
        }
        if name_a == name_b {
            return Err(PredictError::IdenticalTeams);
        }
        let id_a = self.resolve(name_a)?;
        let id_b = self.resolve(name_b)?;
        if id_a == id_b {
            return Err(PredictError::IdenticalTeams);
        }

        advance(stage, Stage::Aggregating);
        let vec_a = self.team_vector(id_a, name_a)?;
        let vec_b = self.team_vector(id_b, name_b)?;

        advance(stage, Stage::Encoding);
        let row = self.encoder.diff(&vec_a, &vec_b)?;

        advance(stage, Stage::Scoring);
        let p = self.scorer.predict(&row)?;

        advance(stage, Stage::Done);
        let display_a = self.roster.display_name(id_a).unwrap_or(name_a).to_string();
        let display_b = self.roster.display_name(id_b).unwrap_or(name_b).to_string();
        // Strict comparison: an exact 0.5 goes to the second team.
        let winner = if p > 0.5 {
            display_a.clone()
        } else {
            display_b.clone()
        };
        Ok(PredictionResult {
            team_a: display_a,
            team_b: display_b,
            winner,
            prob_a: p,
            prob_b: 1.0 - p,
        })
    }

    /// Predicts `team` against every other roster team that has season data, best
    /// matchup first.
    pub fn predict_against_field(&self, team: &str) -> PredictResult<Vec<PredictionResult>> {
        let name = team.trim();
        if name.is_empty() {
            return Err(PredictError::MissingSelection);
        }
        let own_id = self.resolve(name)?;
        if !self.store.contains(own_id) {
            return Err(PredictError::NoTeamData(name.to_string()));
        }

        let mut opponents: Vec<&str> = self
            .roster
            .team_ids()
            .filter(|id| *id != own_id && self.store.contains(id))
            .filter_map(|id| self.roster.display_name(id))
            .collect();
        opponents.sort_unstable();

        let mut rows = opponents
            .par_iter()
            .map(|opp| self.predict(name, opp))
            .collect::<PredictResult<Vec<_>>>()?;
        rows.sort_by(|a, b| {
            b.prob_a
                .partial_cmp(&a.prob_a)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.team_b.cmp(&b.team_b))
        });
        Ok(rows)
    }

    pub fn team_summary(&self, team: &str) -> PredictResult<TeamSummary> {
        let name = team.trim();
        if name.is_empty() {
            return Err(PredictError::MissingSelection);
        }
        let id = self.resolve(name)?;
        self.store
            .summary(id)
            .map_err(|_| PredictError::NoTeamData(name.to_string()))
    }

    fn resolve<'a>(&'a self, name: &str) -> PredictResult<&'a str> {
        self.roster
            .resolve(name)
            .ok_or_else(|| PredictError::InvalidTeam(name.to_string()))
    }

    fn team_vector(&self, id: &str, name: &str) -> PredictResult<FeatureVector> {
        self.store
            .records_for(id)
            .and_then(|records| average(self.store.schema(), records))
            .map_err(|err| match err {
                PredictError::UnknownTeam(_) | PredictError::EmptyInput => {
                    PredictError::NoTeamData(name.to_string())
                }
                other => other,
            })
    }
}
