//! Метрики качества регрессии

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionMetrics {
    pub mae: f64,
    pub rmse: f64,
    pub r2: f64,
}

impl RegressionMetrics {
    pub fn calculate(actual: &[f64], predicted: &[f64]) -> Result<Self, ModelError> {
        if actual.len() != predicted.len() {
            return Err(ModelError::DimensionMismatch {
                rows: predicted.len(),
                targets: actual.len(),
            });
        }
        if actual.is_empty() {
            return Err(ModelError::EmptyDataset);
        }

        let n = actual.len() as f64;
        let mut abs_sum = 0.0;
        let mut sq_sum = 0.0;
        for (a, p) in actual.iter().zip(predicted) {
            let error = a - p;
            abs_sum += error.abs();
            sq_sum += error * error;
        }

        let mean = actual.iter().sum::<f64>() / n;
        let total: f64 = actual.iter().map(|a| (a - mean).powi(2)).sum();

        // Постоянный y: 1 при точном совпадении, иначе 0
        let r2 = if total == 0.0 {
            if sq_sum == 0.0 {
                1.0
            } else {
                0.0
            }
        } else {
            1.0 - sq_sum / total
        };

        Ok(Self {
            mae: abs_sum / n,
            rmse: (sq_sum / n).sqrt(),
            r2,
        })
    }
}

/// Строка `evaluation_results.csv`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    pub model: String,
    #[serde(rename = "MAE")]
    pub mae: f64,
    #[serde(rename = "RMSE")]
    pub rmse: f64,
    #[serde(rename = "R2")]
    pub r2: f64,
}

impl EvaluationRecord {
    pub fn new(model: &str, metrics: RegressionMetrics) -> Self {
        Self {
            model: model.to_string(),
            mae: metrics.mae,
            rmse: metrics.rmse,
            r2: metrics.r2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_values() {
        let m = RegressionMetrics::calculate(&[1.0, 2.0, 3.0, 4.0], &[1.0, 2.0, 4.0, 2.0]).unwrap();
        assert!((m.mae - 0.75).abs() < 1e-12);
        assert!((m.rmse - (5.0f64 / 4.0).sqrt()).abs() < 1e-12);
        assert!((m.r2 - (1.0 - 5.0 / 5.0)).abs() < 1e-12);
    }

    #[test]
    fn perfect_prediction() {
        let m = RegressionMetrics::calculate(&[3.0, 5.0], &[3.0, 5.0]).unwrap();
        assert_eq!((m.mae, m.rmse, m.r2), (0.0, 0.0, 1.0));
    }

    #[test]
    fn constant_target() {
        assert_eq!(RegressionMetrics::calculate(&[2.0, 2.0], &[2.0, 2.0]).unwrap().r2, 1.0);
        assert_eq!(RegressionMetrics::calculate(&[2.0, 2.0], &[2.0, 3.0]).unwrap().r2, 0.0);
    }

    #[test]
    fn r2_can_be_negative() {
        let m = RegressionMetrics::calculate(&[1.0, 2.0, 3.0], &[3.0, 2.0, 1.0]).unwrap();
        assert!(m.r2 < 0.0);
    }

    #[test]
    fn csv_header_uses_report_names() {
        let mut writer = csv::Writer::from_writer(vec![]);
        writer
            .serialize(EvaluationRecord::new("lasso", RegressionMetrics { mae: 1.0, rmse: 2.0, r2: 0.5 }))
            .unwrap();
        let text = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        assert_eq!(text.lines().next(), Some("model,MAE,RMSE,R2"));
    }

    #[test]
    fn rejects_empty_and_mismatched() {
        assert!(matches!(RegressionMetrics::calculate(&[], &[]), Err(ModelError::EmptyDataset)));
        assert!(matches!(
            RegressionMetrics::calculate(&[1.0], &[1.0, 2.0]),
            Err(ModelError::DimensionMismatch { .. })
        ));
    }
}
