use std::env;
use std::path::{Path, PathBuf};

use tracing_subscriber::EnvFilter;

const SEASONS_REL: &str = "Data/teams_season_cleaned.txt";
const TEAMS_REL: &str = "Data/teams.txt";
const OUTLIERS_REL: &str = "Data/top20_iso_outliers.csv";
const OUTLIER_IMAGE_REL: &str = "Images/iso_outliers.png";
const SCALER_REL: &str = "Models/scaler.json";
const CLASSIFIER_REL: &str = "Models/stack_model.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub resource_dir: PathBuf,
    pub seasons_path: PathBuf,
    pub teams_path: PathBuf,
    pub outliers_path: PathBuf,
    pub outlier_image_path: PathBuf,
    pub scaler_path: PathBuf,
    pub classifier_path: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };
        let resource_dir = get("NBA_RESOURCE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        let path = |key: &str, rel: &str| {
            get(key)
                .map(PathBuf::from)
                .unwrap_or_else(|| resource_dir.join(rel))
        };

        Self {
            seasons_path: path("NBA_SEASONS_PATH", SEASONS_REL),
            teams_path: path("NBA_TEAMS_PATH", TEAMS_REL),
            outliers_path: path("NBA_OUTLIERS_PATH", OUTLIERS_REL),
            outlier_image_path: path("NBA_OUTLIER_IMAGE_PATH", OUTLIER_IMAGE_REL),
            scaler_path: path("NBA_SCALER_PATH", SCALER_REL),
            classifier_path: path("NBA_CLASSIFIER_PATH", CLASSIFIER_REL),
            resource_dir,
        }
    }

    pub fn with_resource_dir(dir: &Path) -> Self {
        let dir = dir.to_string_lossy().into_owned();
        Self::from_lookup(|key| (key == "NBA_RESOURCE_DIR").then(|| dir.clone()))
    }
}

pub fn load_dotenv() {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
}

/// Logs go to stderr, filtered by `RUST_LOG` (default `warn`).
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_resource_dir() {
        let cfg = AppConfig::from_lookup(|key| {
            (key == "NBA_RESOURCE_DIR").then(|| "/opt/nba".to_string())
        });
        assert_eq!(cfg.resource_dir, PathBuf::from("/opt/nba"));
        assert_eq!(cfg.seasons_path, PathBuf::from("/opt/nba/Data/teams_season_cleaned.txt"));
        assert_eq!(cfg.classifier_path, PathBuf::from("/opt/nba/Models/stack_model.json"));
    }

    #[test]
    fn explicit_paths_override_and_blanks_are_ignored() {
        let cfg = AppConfig::from_lookup(|key| match key {
            "NBA_SCALER_PATH" => Some(" /tmp/scaler.json ".to_string()),
            "NBA_TEAMS_PATH" => Some("   ".to_string()),
            _ => None,
        });
        assert_eq!(cfg.scaler_path, PathBuf::from("/tmp/scaler.json"));
        assert_eq!(cfg.teams_path, PathBuf::from("./Data/teams.txt"));
    }
}
