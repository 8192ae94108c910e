//! Дерево регрессии для ансамблей.
//!
//! Признаки заранее разбиваются на интервалы ([`FeatureBins`]), поэтому поиск
//! разделения в узле линеен по числу строк. Порог хранится как число:
//! строка идёт влево, если `x[feature] < threshold`.

#![allow(non_snake_case)]

use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};

/// Максимум интервалов на признак
const MAX_BINS: usize = 256;

/// Интервалы признаков, посчитанные один раз на обучающей матрице
pub struct FeatureBins {
    /// Пороги по каждому признаку, по возрастанию
    cuts: Vec<Vec<f64>>,
    /// Номер интервала: `bins[feature][row]`
    bins: Vec<Vec<u16>>,
}

impl FeatureBins {
    pub fn new(X: &Array2<f64>) -> Self {
        let mut cuts = Vec::with_capacity(X.ncols());
        let mut bins = Vec::with_capacity(X.ncols());

        for column in X.columns() {
            let mut values: Vec<f64> = column.iter().copied().filter(|v| v.is_finite()).collect();
            values.sort_by(|a, b| a.total_cmp(b));

            let mut distinct = values.clone();
            distinct.dedup();

            let feature_cuts: Vec<f64> = if distinct.len() <= MAX_BINS {
                distinct.windows(2).map(|w| (w[0] + w[1]) / 2.0).collect()
            } else {
                // Квантили по всем значениям
                let mut quantiles: Vec<f64> = (1..MAX_BINS)
                    .map(|k| values[k * values.len() / MAX_BINS])
                    .collect();
                quantiles.dedup();
                quantiles
            };

            let feature_bins = column
                .iter()
                .map(|&v| feature_cuts.partition_point(|&c| c <= v) as u16)
                .collect();

            cuts.push(feature_cuts);
            bins.push(feature_bins);
        }

        Self { cuts, bins }
    }

    pub fn n_features(&self) -> usize {
        self.cuts.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TreeParams {
    pub max_depth: usize,
    pub min_samples_split: usize,
    /// L2-регуляризация значения листа (0 — обычное среднее)
    pub leaf_l2: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum TreeNode {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    root: TreeNode,
}

impl RegressionTree {
    /// Обучение на строках `indices` (повторы допустимы — бутстрэп)
    pub fn fit(bins: &FeatureBins, y: &Array1<f64>, indices: Vec<usize>, params: TreeParams) -> Self {
        let builder = TreeBuilder { bins, y, params };
        Self {
            root: builder.build(indices, 0),
        }
    }

    pub fn predict_row(&self, sample: ArrayView1<f64>) -> f64 {
        let mut node = &self.root;
        loop {
            match node {
                TreeNode::Leaf { value } => return *value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if sample[*feature] < *threshold { left } else { right };
                }
            }
        }
    }

    pub fn predict(&self, X: &Array2<f64>) -> Array1<f64> {
        X.rows().into_iter().map(|row| self.predict_row(row)).collect()
    }

    pub fn depth(&self) -> usize {
        fn depth(node: &TreeNode) -> usize {
            match node {
                TreeNode::Leaf { .. } => 0,
                TreeNode::Split { left, right, .. } => 1 + depth(left).max(depth(right)),
            }
        }
        depth(&self.root)
    }
}

struct TreeBuilder<'a> {
    bins: &'a FeatureBins,
    y: &'a Array1<f64>,
    params: TreeParams,
}

struct BestSplit {
    feature: usize,
    bin: usize,
    gain: f64,
}

impl TreeBuilder<'_> {
    fn leaf(&self, indices: &[usize]) -> TreeNode {
        let sum: f64 = indices.iter().map(|&i| self.y[i]).sum();
        TreeNode::Leaf {
            value: sum / (indices.len() as f64 + self.params.leaf_l2),
        }
    }

    fn build(&self, indices: Vec<usize>, depth: usize) -> TreeNode {
        if depth >= self.params.max_depth || indices.len() < self.params.min_samples_split {
            return self.leaf(&indices);
        }

        let Some(best) = self.find_best_split(&indices) else {
            return self.leaf(&indices);
        };

        let feature_bins = &self.bins.bins[best.feature];
        let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| (feature_bins[i] as usize) <= best.bin);

        if left_indices.is_empty() || right_indices.is_empty() {
            return self.leaf(&indices);
        }

        TreeNode::Split {
            feature: best.feature,
            threshold: self.bins.cuts[best.feature][best.bin],
            left: Box::new(self.build(left_indices, depth + 1)),
            right: Box::new(self.build(right_indices, depth + 1)),
        }
    }

    /// Разделение с наибольшим приростом `S_l²/(n_l+λ) + S_r²/(n_r+λ) - S²/(n+λ)`
    fn find_best_split(&self, indices: &[usize]) -> Option<BestSplit> {
        let lambda = self.params.leaf_l2;
        let total_sum: f64 = indices.iter().map(|&i| self.y[i]).sum();
        let total_count = indices.len() as f64;
        let parent_score = total_sum * total_sum / (total_count + lambda);

        let mut best: Option<BestSplit> = None;

        for feature in 0..self.bins.n_features() {
            let n_cuts = self.bins.cuts[feature].len();
            if n_cuts == 0 {
                continue;
            }

            // Гистограмма узла по интервалам
            let mut sums = vec![0.0; n_cuts + 1];
            let mut counts = vec![0usize; n_cuts + 1];
            for &i in indices {
                let bin = self.bins.bins[feature][i] as usize;
                sums[bin] += self.y[i];
                counts[bin] += 1;
            }

            let mut left_sum = 0.0;
            let mut left_count = 0usize;
            for bin in 0..n_cuts {
                left_sum += sums[bin];
                left_count += counts[bin];
                let right_count = indices.len() - left_count;
                if left_count == 0 || right_count == 0 {
                    continue;
                }
                let right_sum = total_sum - left_sum;

                let score = left_sum * left_sum / (left_count as f64 + lambda)
                    + right_sum * right_sum / (right_count as f64 + lambda);
                let gain = score - parent_score;

                if gain > 1e-12 && best.as_ref().map_or(true, |b| gain > b.gain) {
                    best = Some(BestSplit { feature, bin, gain });
                }
            }
        }

        best
    }
}
