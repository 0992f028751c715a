use std::fs;
use std::path::Path;

use anyhow::{Context, Result, ensure};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::encoder::DiffRow;
use crate::error::{PredictError, PredictResult};
use crate::scorer::{Classifier, Scaler};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScalerArtifact {
    #[serde(default)]
    pub version: u32,
    pub feature_names: Vec<String>,
    pub means: Vec<f64>,
    pub scales: Vec<f64>,
}

impl StandardScalerArtifact {
    pub fn load(path: &Path) -> Result<Self> {
        let scaler: Self = load_json(path, "scaler")?;
        scaler
            .validate()
            .with_context(|| format!("validate scaler {}", path.display()))?;
        Ok(scaler)
    }

    pub fn validate(&self) -> Result<()> {
        let n = self.feature_names.len();
        ensure!(n > 0, "scaler has no features");
        ensure!(
            self.means.len() == n && self.scales.len() == n,
            "scaler has {n} names, {} means, {} scales",
            self.means.len(),
            self.scales.len()
        );
        Ok(())
    }
}

impl Scaler for StandardScalerArtifact {
    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn transform(&self, row: &DiffRow) -> PredictResult<Vec<f64>> {
        let values = row.values();
        if values.len() != self.means.len() {
            return Err(PredictError::InferenceError(format!(
                "scaler fitted on {} columns, row has {}",
                self.means.len(),
                values.len()
            )));
        }
        Ok(values
            .iter()
            .zip(self.means.iter().zip(&self.scales))
            .map(|(x, (mean, scale))| {
                // Constant columns are fitted with scale 0.
                let scale = if *scale == 0.0 { 1.0 } else { *scale };
                (x - mean) / scale
            })
            .collect())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticModel {
    pub coef: Vec<f64>,
    #[serde(default)]
    pub intercept: f64,
}

impl LogisticModel {
    fn decision(&self, x: &[f64]) -> PredictResult<f64> {
        if x.len() != self.coef.len() {
            return Err(PredictError::InferenceError(format!(
                "logistic model has {} coefficients, input has {}",
                self.coef.len(),
                x.len()
            )));
        }
        Ok(self.intercept + self.coef.iter().zip(x).map(|(c, v)| c * v).sum::<f64>())
    }

    fn probability(&self, x: &[f64]) -> PredictResult<f64> {
        self.decision(x).map(sigmoid)
    }
}

/// Regression tree in flattened node-array form. A negative `left` marks a leaf.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionTree {
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub left: Vec<i64>,
    pub right: Vec<i64>,
    pub value: Vec<f64>,
}

impl RegressionTree {
    fn nodes(&self) -> usize {
        self.value.len()
    }

    fn validate(&self, n_features: usize) -> PredictResult<()> {
        let n = self.nodes();
        check(n > 0, || "tree has no nodes".to_string())?;
        check(
            self.feature.len() == n
                && self.threshold.len() == n
                && self.left.len() == n
                && self.right.len() == n,
            || "tree node arrays differ in length".to_string(),
        )?;
        let in_range = |idx: i64| idx >= 0 && (idx as usize) < n;
        for node in 0..n {
            if self.left[node] < 0 {
                continue;
            }
            check(in_range(self.left[node]) && in_range(self.right[node]), || {
                format!("tree node {node} points outside the tree")
            })?;
            check(
                self.feature[node] >= 0 && (self.feature[node] as usize) < n_features,
                || {
                    format!(
                        "tree node {node} splits on feature {} of {n_features}",
                        self.feature[node]
                    )
                },
            )?;
        }
        Ok(())
    }

    fn predict(&self, x: &[f64]) -> PredictResult<f64> {
        let mut node = 0usize;
        for _ in 0..=self.nodes() {
            let at = node;
            let reject =
                move || PredictError::InferenceError(format!("tree node {at} is malformed"));
            let left = *self.left.get(node).ok_or_else(reject)?;
            if left < 0 {
                return self.value.get(node).copied().ok_or_else(reject);
            }
            let feature = *self.feature.get(node).ok_or_else(reject)?;
            let value = usize::try_from(feature)
                .ok()
                .and_then(|f| x.get(f))
                .ok_or_else(reject)?;
            let threshold = *self.threshold.get(node).ok_or_else(reject)?;
            let next = if *value <= threshold {
                left
            } else {
                *self.right.get(node).ok_or_else(reject)?
            };
            node = usize::try_from(next).map_err(|_| reject())?;
        }
        Err(PredictError::InferenceError(
            "tree traversal did not reach a leaf".to_string(),
        ))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradientBoostingModel {
    #[serde(default)]
    pub init_raw: f64,
    pub learning_rate: f64,
    pub trees: Vec<RegressionTree>,
}

impl GradientBoostingModel {
    fn probability(&self, x: &[f64]) -> PredictResult<f64> {
        let mut raw = self.init_raw;
        for tree in &self.trees {
            raw += self.learning_rate * tree.predict(x)?;
        }
        Ok(sigmoid(raw))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BaseEstimator {
    Logistic(LogisticModel),
    GradientBoosting(GradientBoostingModel),
}

impl BaseEstimator {
    fn probability(&self, x: &[f64]) -> PredictResult<f64> {
        match self {
            BaseEstimator::Logistic(m) => m.probability(x),
            BaseEstimator::GradientBoosting(m) => m.probability(x),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StackingClassifierArtifact {
    #[serde(default)]
    pub version: u32,
    pub n_features: usize,
    pub estimators: Vec<BaseEstimator>,
    pub final_estimator: LogisticModel,
    #[serde(default)]
    pub passthrough: bool,
}

impl StackingClassifierArtifact {
    pub fn load(path: &Path) -> Result<Self> {
        let model: Self = load_json(path, "classifier")?;
        model
            .validate()
            .with_context(|| format!("validate classifier {}", path.display()))?;
        Ok(model)
    }

    pub fn validate(&self) -> PredictResult<()> {
        check(self.n_features > 0, || "classifier has no input features".to_string())?;
        check(!self.estimators.is_empty(), || {
            "classifier has no base estimators".to_string()
        })?;
        for (idx, est) in self.estimators.iter().enumerate() {
            match est {
                BaseEstimator::Logistic(m) => check(m.coef.len() == self.n_features, || {
                    format!(
                        "estimator {idx}: {} coefficients for {} features",
                        m.coef.len(),
                        self.n_features
                    )
                })?,
                BaseEstimator::GradientBoosting(m) => {
                    for (t, tree) in m.trees.iter().enumerate() {
                        tree.validate(self.n_features).map_err(|err| {
                            PredictError::InferenceError(format!("estimator {idx} tree {t}: {err}"))
                        })?;
                    }
                }
            }
        }
        let meta_width = self.meta_width();
        check(self.final_estimator.coef.len() == meta_width, || {
            format!(
                "final estimator has {} coefficients, expected {meta_width}",
                self.final_estimator.coef.len()
            )
        })
    }

    fn meta_width(&self) -> usize {
        self.estimators.len() + if self.passthrough { self.n_features } else { 0 }
    }
}

impl Classifier for StackingClassifierArtifact {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict_probability(&self, scaled: &[f64]) -> PredictResult<f64> {
        if scaled.len() != self.n_features {
            return Err(PredictError::InferenceError(format!(
                "classifier expects {} features, got {}",
                self.n_features,
                scaled.len()
            )));
        }
        let mut meta = Vec::with_capacity(self.meta_width());
        for est in &self.estimators {
            meta.push(est.probability(scaled)?);
        }
        if self.passthrough {
            meta.extend_from_slice(scaled);
        }
        self.final_estimator.probability(&meta)
    }
}

fn load_json<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read {what} artifact {}", path.display()))?;
    serde_json::from_str::<T>(&raw)
        .with_context(|| format!("parse {what} artifact {}", path.display()))
}

fn check(ok: bool, msg: impl FnOnce() -> String) -> PredictResult<()> {
    if ok {
        Ok(())
    } else {
        Err(PredictError::InferenceError(msg()))
    }
}

fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        let z = (-x).exp();
        1.0 / (1.0 + z)
    } else {
        let z = x.exp();
        z / (1.0 + z)
    }
}
