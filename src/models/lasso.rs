//! Lasso (L1) регрессия через linfa-elasticnet

#![allow(non_snake_case)]

use ndarray::{Array1, Array2};

use crate::error::ModelError;
use crate::models::linear::LinearModel;

pub const BACKEND: &str = "linfa-elasticnet";

/// Собран ли крейт с бэкендом Lasso
pub const fn is_available() -> bool {
    cfg!(feature = "elasticnet")
}

#[cfg(feature = "elasticnet")]
pub fn fit_lasso(X: &Array2<f64>, y: &Array1<f64>, alpha: f64) -> Result<LinearModel, ModelError> {
    use linfa::prelude::*;
    use linfa_elasticnet::ElasticNet;
    use ndarray::Axis;

    if X.nrows() == 0 {
        return Err(ModelError::EmptyDataset);
    }

    if y.len() != X.nrows() {
        return Err(ModelError::DimensionMismatch {
            rows: X.nrows(),
            targets: y.len(),
        });
    }

    // Центрируем сами: свободный член восстанавливается как в МНК
    let x_mean = X.mean_axis(Axis(0)).ok_or(ModelError::EmptyDataset)?;
    let y_mean = y.mean().ok_or(ModelError::EmptyDataset)?;
    let dataset = Dataset::new(X - &x_mean, y - y_mean);

    let model = ElasticNet::<f64>::lasso()
        .penalty(alpha)
        .with_intercept(false)
        .max_iterations(10_000)
        .tolerance(1e-4)
        .fit(&dataset)
        .map_err(|e| ModelError::Fit {
            candidate: "lasso",
            reason: e.to_string(),
        })?;

    let weights = model.hyperplane().to_owned();
    let intercept = y_mean - x_mean.dot(&weights);
    Ok(LinearModel::new(weights, intercept))
}

#[cfg(not(feature = "elasticnet"))]
pub fn fit_lasso(_X: &Array2<f64>, _y: &Array1<f64>, _alpha: f64) -> Result<LinearModel, ModelError> {
    Err(ModelError::BackendUnavailable {
        candidate: "lasso",
        backend: BACKEND,
    })
}

#[cfg(all(test, feature = "elasticnet"))]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn shrinks_irrelevant_feature() {
        let X = array![
            [1.0, 0.3],
            [2.0, -0.1],
            [3.0, 0.2],
            [4.0, -0.3],
            [5.0, 0.1],
            [6.0, -0.2]
        ];
        let y = X.column(0).mapv(|v| 3.0 * v + 1.0);

        let model = fit_lasso(&X, &y, 0.01).unwrap();
        assert!((model.weights()[0] - 3.0).abs() < 0.1);
        assert!(model.weights()[1].abs() < 0.1);

        let pred = model.predict(&X);
        for (p, target) in pred.iter().zip(y.iter()) {
            assert!((p - target).abs() < 0.2);
        }
    }

    #[test]
    fn intercept_is_recovered_from_centered_fit() {
        let X = array![[10.0], [12.0], [14.0], [16.0], [18.0]];
        let y = X.column(0).mapv(|v| 0.5 * v + 40.0);

        let model = fit_lasso(&X, &y, 0.01).unwrap();
        assert!((model.weights()[0] - 0.5).abs() < 0.05);
        assert!((model.predict(&array![[14.0]])[0] - 47.0).abs() < 0.1);
    }
}
