use crate::encoder::DiffRow;
use crate::error::{PredictError, PredictResult};
use crate::schema::{FeatureSchema, ensure_columns};

pub trait Scaler: Send + Sync {
    fn feature_names(&self) -> &[String];
    fn transform(&self, row: &DiffRow) -> PredictResult<Vec<f64>>;
}

pub trait Classifier: Send + Sync {
    fn n_features(&self) -> usize;
    /// Probability mass of the positive class ("first team wins").
    fn predict_probability(&self, scaled: &[f64]) -> PredictResult<f64>;
}

pub struct Scorer {
    columns: Vec<String>,
    scaler: Box<dyn Scaler>,
    classifier: Box<dyn Classifier>,
}

impl Scorer {
    pub fn new(
        schema: &FeatureSchema,
        scaler: Box<dyn Scaler>,
        classifier: Box<dyn Classifier>,
    ) -> PredictResult<Self> {
        schema.ensure_diff_columns(scaler.feature_names())?;
        if classifier.n_features() != schema.len() {
            return Err(PredictError::InferenceError(format!(
                "classifier expects {} features, schema has {}",
                classifier.n_features(),
                schema.len()
            )));
        }
        Ok(Self {
            columns: schema.diff_columns(),
            scaler,
            classifier,
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn predict(&self, row: &DiffRow) -> PredictResult<f64> {
        ensure_columns(&self.columns, row.columns())?;
        let scaled = self.scaler.transform(row)?;
        if scaled.len() != self.classifier.n_features() {
            return Err(PredictError::InferenceError(format!(
                "scaled row has {} values, classifier expects {}",
                scaled.len(),
                self.classifier.n_features()
            )));
        }
        let p = self.classifier.predict_probability(&scaled)?;
        if !p.is_finite() || !(0.0..=1.0).contains(&p) {
            return Err(PredictError::InferenceError(format!(
                "classifier returned {p}, not a probability"
            )));
        }
        Ok(p)
    }
}

impl std::fmt::Debug for Scorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scorer")
            .field("columns", &self.columns)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Identity(Vec<String>);

    impl Scaler for Identity {
        fn feature_names(&self) -> &[String] {
            &self.0
        }

        fn transform(&self, row: &DiffRow) -> PredictResult<Vec<f64>> {
            Ok(row.values().to_vec())
        }
    }

    struct Fixed {
        n: usize,
        p: f64,
    }

    impl Classifier for Fixed {
        fn n_features(&self) -> usize {
            self.n
        }

        fn predict_probability(&self, _scaled: &[f64]) -> PredictResult<f64> {
            Ok(self.p)
        }
    }

    fn scorer(p: f64) -> Scorer {
        let schema = FeatureSchema::new(["pts", "reb"]);
        Scorer::new(
            &schema,
            Box::new(Identity(schema.diff_columns())),
            Box::new(Fixed { n: 2, p }),
        )
        .unwrap()
    }

    fn row(cols: &[&str]) -> DiffRow {
        DiffRow::new(cols.iter().map(|c| c.to_string()).collect(), vec![1.0; cols.len()])
    }

    #[test]
    fn returns_classifier_probability() {
        assert_eq!(scorer(0.7).predict(&row(&["diff_pts", "diff_reb"])), Ok(0.7));
    }

    #[test]
    fn rejects_rows_in_the_wrong_order() {
        let err = scorer(0.7).predict(&row(&["diff_reb", "diff_pts"])).unwrap_err();
        assert!(matches!(err, PredictError::SchemaMismatch { .. }));
    }

    #[test]
    fn out_of_range_probability_is_an_inference_error() {
        let err = scorer(1.5).predict(&row(&["diff_pts", "diff_reb"])).unwrap_err();
        assert!(matches!(err, PredictError::InferenceError(_)));
    }

    #[test]
    fn construction_checks_scaler_columns() {
        let schema = FeatureSchema::new(["pts", "reb"]);
        let scaler = Identity(vec!["diff_pts".to_string()]);
        let res = Scorer::new(&schema, Box::new(scaler), Box::new(Fixed { n: 2, p: 0.5 }));
        assert!(matches!(res, Err(PredictError::SchemaMismatch { .. })));
    }

    #[test]
    fn construction_checks_classifier_width() {
        let schema = FeatureSchema::new(["pts", "reb"]);
        let res = Scorer::new(
            &schema,
            Box::new(Identity(schema.diff_columns())),
            Box::new(Fixed { n: 3, p: 0.5 }),
        );
        assert!(matches!(res, Err(PredictError::InferenceError(_))));
    }
}
