//! Градиентный бустинг деревьев с квадратичной функцией потерь

#![allow(non_snake_case)]

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::models::tree::{FeatureBins, RegressionTree, TreeParams};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoostingParams {
    pub rounds: usize,
    pub learning_rate: f64,
    pub max_depth: usize,
    /// L2-регуляризация листьев
    pub leaf_l2: f64,
}

impl Default for BoostingParams {
    fn default() -> Self {
        Self {
            rounds: 100,
            learning_rate: 0.1,
            max_depth: 6,
            leaf_l2: 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradientBoosting {
    base_score: f64,
    learning_rate: f64,
    trees: Vec<RegressionTree>,
}

impl GradientBoosting {
    pub fn fit(X: &Array2<f64>, y: &Array1<f64>, params: BoostingParams) -> Result<Self, ModelError> {
        let n_samples = X.nrows();
        if y.len() != n_samples {
            return Err(ModelError::DimensionMismatch {
                rows: n_samples,
                targets: y.len(),
            });
        }
        let base_score = y.mean().ok_or(ModelError::EmptyDataset)?;

        let bins = FeatureBins::new(X);
        let tree_params = TreeParams {
            max_depth: params.max_depth,
            min_samples_split: 2,
            leaf_l2: params.leaf_l2,
        };

        let mut current = Array1::from_elem(n_samples, base_score);
        let mut trees = Vec::with_capacity(params.rounds);

        for _ in 0..params.rounds {
            let residuals = y - &current;
            let tree = RegressionTree::fit(&bins, &residuals, (0..n_samples).collect(), tree_params);
            current.scaled_add(params.learning_rate, &tree.predict(X));
            trees.push(tree);
        }

        Ok(Self {
            base_score,
            learning_rate: params.learning_rate,
            trees,
        })
    }

    pub fn predict(&self, X: &Array2<f64>) -> Array1<f64> {
        let mut out = Array1::from_elem(X.nrows(), self.base_score);
        for tree in &self.trees {
            out.scaled_add(self.learning_rate, &tree.predict(X));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn training_error_decreases_with_rounds() {
        let X = Array2::from_shape_fn((30, 1), |(i, _)| i as f64);
        let y = X.column(0).mapv(|v| (v / 5.0).sin() * 10.0 + 50.0);

        let mse = |rounds| {
            let params = BoostingParams {
                rounds,
                ..BoostingParams::default()
            };
            let model = GradientBoosting::fit(&X, &y, params).unwrap();
            (&model.predict(&X) - &y).mapv(|e| e * e).mean().unwrap()
        };

        assert!(mse(50) < mse(5));
        assert!(mse(100) < 1.0);
    }

    #[test]
    fn zero_rounds_predicts_the_mean() {
        let X = Array2::from_shape_fn((4, 1), |(i, _)| i as f64);
        let y = Array1::from(vec![1.0, 2.0, 3.0, 6.0]);
        let params = BoostingParams {
            rounds: 0,
            ..BoostingParams::default()
        };
        let model = GradientBoosting::fit(&X, &y, params).unwrap();
        assert_eq!(model.predict(&X).to_vec(), vec![3.0; 4]);
    }
}
