use sha2::{Digest, Sha256};

use crate::error::{PredictError, PredictResult};

pub const DIFF_PREFIX: &str = "diff_";
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureSchema {
    version: u32,
    names: Vec<String>,
}

impl FeatureSchema {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            version: SCHEMA_VERSION,
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn diff_columns(&self) -> Vec<String> {
        self.names.iter().map(|n| diff_column(n)).collect()
    }

    /// Hex SHA-256 over the version and the ordered diff column names.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.version.to_le_bytes());
        for col in self.diff_columns() {
            hasher.update(col.as_bytes());
            hasher.update([b'\n']);
        }
        format!("{:x}", hasher.finalize())
    }

    pub fn ensure_feature_names(&self, found: &[String]) -> PredictResult<()> {
        ensure_columns(&self.names, found)
    }

    pub fn ensure_diff_columns(&self, found: &[String]) -> PredictResult<()> {
        ensure_columns(&self.diff_columns(), found)
    }
}

pub fn diff_column(feature: &str) -> String {
    format!("{DIFF_PREFIX}{feature}")
}

pub fn ensure_columns(expected: &[String], found: &[String]) -> PredictResult<()> {
    if expected == found {
        return Ok(());
    }
    Err(PredictError::SchemaMismatch {
        expected: expected.to_vec(),
        found: found.to_vec(),
    })
}
