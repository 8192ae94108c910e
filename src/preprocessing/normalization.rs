//! Нормализация числовых признаков: заполнение средним + стандартизация

#![allow(non_snake_case)]

use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Обученные параметры числовой ветки. Создаётся только через [`NumericScaler::fit`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericScaler {
    /// Значение для пропусков (среднее на обучении)
    fill: Array1<f64>,
    mean: Array1<f64>,
    std: Array1<f64>,
}

impl NumericScaler {
    /// `X` — матрица с пропусками в виде NaN
    pub fn fit(X: &Array2<f64>) -> Result<Self, ModelError> {
        if X.nrows() == 0 {
            return Err(ModelError::EmptyDataset);
        }

        // Среднее по наблюдённым значениям каждого признака
        let fill: Array1<f64> = X
            .axis_iter(Axis(1))
            .map(|column| {
                let observed: Vec<f64> = column.iter().copied().filter(|v| !v.is_nan()).collect();
                if observed.is_empty() {
                    0.0
                } else {
                    observed.iter().sum::<f64>() / observed.len() as f64
                }
            })
            .collect();

        // Масштабирование учится уже на заполненных данных
        let imputed = impute(X, &fill);
        let mean = imputed.mean_axis(Axis(0)).ok_or(ModelError::EmptyDataset)?;
        let mut std = imputed.std_axis(Axis(0), 0.0);

        // Избегаем деления на ноль
        for val in std.iter_mut() {
            if *val < 1e-10 {
                *val = 1.0;
            }
        }

        Ok(Self { fill, mean, std })
    }

    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    pub fn transform(&self, X: &Array2<f64>) -> Array2<f64> {
        let mut normalized = impute(X, &self.fill);
        for mut row in normalized.rows_mut() {
            for (i, val) in row.iter_mut().enumerate() {
                *val = (*val - self.mean[i]) / self.std[i];
            }
        }
        normalized
    }
}

fn impute(X: &Array2<f64>, fill: &Array1<f64>) -> Array2<f64> {
    let mut imputed = X.clone();
    for mut row in imputed.rows_mut() {
        for (i, val) in row.iter_mut().enumerate() {
            if val.is_nan() {
                *val = fill[i];
            }
        }
    }
    imputed
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn missing_values_take_training_mean() {
        let X = array![[1.0, 10.0], [f64::NAN, 20.0], [3.0, 30.0]];
        let scaler = NumericScaler::fit(&X).unwrap();

        let out = scaler.transform(&array![[f64::NAN, 20.0]]);
        // Среднее после заполнения переходит в ноль
        assert!(out[[0, 0]].abs() < 1e-12);
        assert!(out[[0, 1]].abs() < 1e-12);
    }

    #[test]
    fn standardized_training_columns() {
        let X = array![[1.0, 5.0], [2.0, 5.0], [3.0, 5.0]];
        let scaler = NumericScaler::fit(&X).unwrap();
        let out = scaler.transform(&X);

        let std0 = (2.0f64 / 3.0).sqrt();
        assert!((out[[0, 0]] + 1.0 / std0).abs() < 1e-12);
        // Постоянный признак масштабируется на 1
        assert_eq!(out.column(1).to_vec(), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn empty_matrix_is_rejected() {
        assert!(NumericScaler::fit(&Array2::zeros((0, 3))).is_err());
    }
}
