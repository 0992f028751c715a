use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredictError {
    #[error("Please select both teams!")]
    MissingSelection,
    #[error("Please select different teams!")]
    IdenticalTeams,
    #[error("Invalid team selected: {0}")]
    InvalidTeam(String),
    #[error("Selected team data not available: {0}")]
    NoTeamData(String),
    #[error("feature schema mismatch: expected {expected:?}, found {found:?}")]
    SchemaMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },
    #[error("model rejected the feature row: {0}")]
    InferenceError(String),
    #[error("no season records for team {0}")]
    UnknownTeam(String),
    #[error("cannot average an empty set of season records")]
    EmptyInput,
}

pub type PredictResult<T> = std::result::Result<T, PredictError>;
