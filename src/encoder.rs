use crate::aggregate::FeatureVector;
use crate::error::PredictResult;
use crate::schema::{FeatureSchema, ensure_columns};

#[derive(Debug, Clone, PartialEq)]
pub struct DiffRow {
    columns: Vec<String>,
    values: Vec<f64>,
}

impl DiffRow {
    pub fn new(columns: Vec<String>, values: Vec<f64>) -> Self {
        Self { columns, values }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn get(&self, column: &str) -> Option<f64> {
        let idx = self.columns.iter().position(|c| c == column)?;
        self.values.get(idx).copied()
    }
}

#[derive(Debug, Clone)]
pub struct MatchupEncoder {
    schema: FeatureSchema,
}

impl MatchupEncoder {
    pub fn new(schema: FeatureSchema) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// `a[k] - b[k]` for every canonical feature `k`, so `diff(a, b) == -diff(b, a)`.
    pub fn diff(&self, a: &FeatureVector, b: &FeatureVector) -> PredictResult<DiffRow> {
        ensure_columns(a.names(), b.names())?;
        self.schema.ensure_feature_names(a.names())?;

        let values = a
            .values()
            .iter()
            .zip(b.values())
            .map(|(x, y)| x - y)
            .collect();
        Ok(DiffRow {
            columns: self.schema.diff_columns(),
            values,
        })
    }
}
