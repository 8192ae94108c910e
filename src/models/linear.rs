//! Линейная регрессия (МНК) через нормальные уравнения

#![allow(non_snake_case)]

use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Параметры линейной модели; общие для МНК и Lasso
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    weights: Array1<f64>,
    intercept: f64,
}

impl LinearModel {
    pub fn new(weights: Array1<f64>, intercept: f64) -> Self {
        Self { weights, intercept }
    }

    pub fn weights(&self) -> &Array1<f64> {
        &self.weights
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Обычный МНК со свободным членом.
    ///
    /// One-hot блоки делают матрицу вырожденной, поэтому система решается
    /// методом Гаусса, где столбцы без ведущего элемента получают вес 0.
    pub fn fit_least_squares(X: &Array2<f64>, y: &Array1<f64>) -> Result<Self, ModelError> {
        let n_samples = X.nrows();
        if n_samples == 0 || X.ncols() == 0 {
            return Err(ModelError::EmptyDataset);
        }
        if y.len() != n_samples {
            return Err(ModelError::DimensionMismatch {
                rows: n_samples,
                targets: y.len(),
            });
        }

        // Центрирование убирает свободный член из системы
        let x_mean = X.mean_axis(Axis(0)).ok_or(ModelError::EmptyDataset)?;
        let y_mean = y.mean().ok_or(ModelError::EmptyDataset)?;
        let X_centered = X - &x_mean;
        let y_centered = y - y_mean;

        let xtx = X_centered.t().dot(&X_centered);
        let xty = X_centered.t().dot(&y_centered);
        let weights = solve_normal_equations(xtx, xty);

        let intercept = y_mean - x_mean.dot(&weights);
        Ok(Self { weights, intercept })
    }

    pub fn predict(&self, X: &Array2<f64>) -> Array1<f64> {
        X.dot(&self.weights) + self.intercept
    }
}

/// Решение совместной системы `A x = b` (A симметричная, возможно вырожденная).
/// Свободные переменные равны нулю.
fn solve_normal_equations(mut A: Array2<f64>, mut b: Array1<f64>) -> Array1<f64> {
    let n = A.nrows();
    let scale = A.diag().iter().fold(1.0f64, |acc, v| acc.max(v.abs()));
    let tolerance = scale * 1e-10;

    let mut pivots: Vec<(usize, usize)> = Vec::new();
    let mut row = 0;

    // Прямой ход метода Гаусса
    for col in 0..n {
        if row == n {
            break;
        }

        // Поиск максимального элемента в столбце
        let mut max_row = row;
        let mut max_val = A[[row, col]].abs();
        for k in (row + 1)..n {
            if A[[k, col]].abs() > max_val {
                max_val = A[[k, col]].abs();
                max_row = k;
            }
        }

        if max_val < tolerance {
            continue;
        }

        // Перестановка строк
        if max_row != row {
            for j in 0..n {
                A.swap([row, j], [max_row, j]);
            }
            b.swap(row, max_row);
        }

        // Исключение
        let pivot = A[[row, col]];
        for k in (row + 1)..n {
            let factor = A[[k, col]] / pivot;
            if factor == 0.0 {
                continue;
            }
            for j in col..n {
                A[[k, j]] -= factor * A[[row, j]];
            }
            b[k] -= factor * b[row];
        }

        pivots.push((row, col));
        row += 1;
    }

    // Обратный ход
    let mut x = Array1::zeros(n);
    for &(r, c) in pivots.iter().rev() {
        let mut sum = b[r];
        for j in (c + 1)..n {
            sum -= A[[r, j]] * x[j];
        }
        x[c] = sum / A[[r, c]];
    }

    x
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn recovers_exact_linear_relation() {
        let X = array![[1.0, 2.0], [2.0, 1.0], [3.0, 5.0], [4.0, 3.0], [5.0, 8.0]];
        let y = X.column(0).mapv(|v| 2.0 * v) + X.column(1).mapv(|v| -0.5 * v) + 7.0;

        let model = LinearModel::fit_least_squares(&X, &y).unwrap();
        assert!((model.weights()[0] - 2.0).abs() < 1e-8);
        assert!((model.weights()[1] + 0.5).abs() < 1e-8);
        assert!((model.intercept() - 7.0).abs() < 1e-8);
    }

    #[test]
    fn collinear_one_hot_columns_still_fit() {
        // Две индикаторные колонки всегда в сумме дают 1
        let X = array![[1.0, 0.0], [1.0, 0.0], [0.0, 1.0], [0.0, 1.0]];
        let y = array![10.0, 12.0, 20.0, 22.0];

        let model = LinearModel::fit_least_squares(&X, &y).unwrap();
        let pred = model.predict(&X);
        assert!((pred[0] - 11.0).abs() < 1e-8);
        assert!((pred[2] - 21.0).abs() < 1e-8);
    }

    #[test]
    fn more_features_than_rows_is_not_an_error() {
        let X = array![[1.0, 0.0, 3.0, 1.0], [0.0, 1.0, 2.0, 0.0]];
        let y = array![5.0, 3.0];
        let model = LinearModel::fit_least_squares(&X, &y).unwrap();
        let pred = model.predict(&X);
        assert!((pred[0] - 5.0).abs() < 1e-6);
        assert!((pred[1] - 3.0).abs() < 1e-6);
    }

    #[test]
    fn mismatched_targets_are_rejected() {
        let X = array![[1.0], [2.0]];
        let y = array![1.0];
        assert!(matches!(
            LinearModel::fit_least_squares(&X, &y),
            Err(ModelError::DimensionMismatch { .. })
        ));
    }
}
