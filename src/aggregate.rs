use crate::error::{PredictError, PredictResult};
use crate::schema::FeatureSchema;
use crate::season_store::SeasonRecord;

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    names: Vec<String>,
    values: Vec<f64>,
}

impl FeatureVector {
    pub fn new(names: Vec<String>, values: Vec<f64>) -> PredictResult<Self> {
        if names.len() != values.len() {
            // Values past the last name show up as positional placeholders.
            let found = (0..values.len())
                .map(|i| names.get(i).cloned().unwrap_or_else(|| format!("#{i}")))
                .collect();
            return Err(PredictError::SchemaMismatch {
                expected: names,
                found,
            });
        }
        Ok(Self { names, values })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        let idx = self.names.iter().position(|n| n == name)?;
        self.values.get(idx).copied()
    }
}

pub fn average(schema: &FeatureSchema, records: &[SeasonRecord]) -> PredictResult<FeatureVector> {
    if records.is_empty() {
        return Err(PredictError::EmptyInput);
    }

    let n = records.len() as f64;
    let mut column = Vec::with_capacity(records.len());
    let mut values = Vec::with_capacity(schema.len());
    for idx in 0..schema.len() {
        column.clear();
        for record in records {
            let Some(v) = record.stats.get(idx) else {
                return Err(PredictError::SchemaMismatch {
                    expected: schema.names().to_vec(),
                    found: schema.names()[..record.stats.len()].to_vec(),
                });
            };
            column.push(*v);
        }
        // Sorted so the sum does not depend on season order.
        column.sort_by(f64::total_cmp);
        values.push(column.iter().sum::<f64>() / n);
    }

    Ok(FeatureVector {
        names: schema.names().to_vec(),
        values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(team: &str, year: i32, stats: &[f64]) -> SeasonRecord {
        SeasonRecord {
            team: team.to_string(),
            year,
            league: "N".to_string(),
            won: 10.0,
            lost: 5.0,
            stats: stats.to_vec(),
        }
    }

    #[test]
    fn averages_each_column() {
        let schema = FeatureSchema::new(["pts", "reb"]);
        let records = vec![
            record("BOS", 2001, &[100.0, 40.0]),
            record("BOS", 2002, &[110.0, 44.0]),
        ];
        let v = average(&schema, &records).unwrap();
        assert_eq!(v.names(), ["pts", "reb"]);
        assert_eq!(v.values(), [105.0, 42.0]);
        assert_eq!(v.get("reb"), Some(42.0));
    }

    #[test]
    fn length_mismatch_names_the_gap() {
        let names = vec!["pts".to_string(), "reb".to_string()];
        let err = FeatureVector::new(names.clone(), vec![1.0, 2.0, 3.0]).unwrap_err();
        assert_eq!(
            err,
            PredictError::SchemaMismatch {
                expected: names.clone(),
                found: vec!["pts".into(), "reb".into(), "#2".into()],
            }
        );
        let err = FeatureVector::new(names.clone(), vec![1.0]).unwrap_err();
        assert_eq!(
            err,
            PredictError::SchemaMismatch {
                expected: names,
                found: vec!["pts".into()],
            }
        );
    }

    #[test]
    fn empty_records_fail() {
        let schema = FeatureSchema::new(["pts"]);
        assert_eq!(average(&schema, &[]), Err(PredictError::EmptyInput));
    }

    #[test]
    fn order_does_not_change_bits() {
        let schema = FeatureSchema::new(["x"]);
        let forward = vec![
            record("A", 1, &[0.1]),
            record("A", 2, &[1e16]),
            record("A", 3, &[-1e16]),
            record("A", 4, &[0.7]),
        ];
        let mut backward = forward.clone();
        backward.reverse();
        let a = average(&schema, &forward).unwrap();
        let b = average(&schema, &backward).unwrap();
        assert_eq!(a.values()[0].to_bits(), b.values()[0].to_bits());
    }
}
