//! Случайный лес: бэггинг деревьев регрессии

#![allow(non_snake_case)]

use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::models::tree::{FeatureBins, RegressionTree, TreeParams};

/// Глубина деревьев не ограничена параметром, но рекурсия должна оставаться конечной
const DEPTH_CAP: usize = 40;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    trees: Vec<RegressionTree>,
}

impl RandomForest {
    /// Каждое дерево обучается на бутстрэп-выборке с генератором `seed + t`
    pub fn fit(X: &Array2<f64>, y: &Array1<f64>, n_trees: usize, seed: u64) -> Result<Self, ModelError> {
        let n_samples = X.nrows();
        if n_samples == 0 || n_trees == 0 {
            return Err(ModelError::EmptyDataset);
        }
        if y.len() != n_samples {
            return Err(ModelError::DimensionMismatch {
                rows: n_samples,
                targets: y.len(),
            });
        }

        let bins = FeatureBins::new(X);
        let params = TreeParams {
            max_depth: DEPTH_CAP,
            min_samples_split: 2,
            leaf_l2: 0.0,
        };

        let trees = (0..n_trees)
            .map(|t| {
                let mut rng = StdRng::seed_from_u64(seed.wrapping_add(t as u64));
                let indices = (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect();
                RegressionTree::fit(&bins, y, indices, params)
            })
            .collect();

        Ok(Self { trees })
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Среднее по деревьям
    pub fn predict(&self, X: &Array2<f64>) -> Array1<f64> {
        let mut sum = Array1::zeros(X.nrows());
        for tree in &self.trees {
            sum += &tree.predict(X);
        }
        sum / self.trees.len().max(1) as f64
    }
}
