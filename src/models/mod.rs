//! ML модели: кандидаты, их обучение и отбор

#![allow(non_snake_case)]

pub mod boosting;
pub mod bundle;
pub mod forest;
pub mod lasso;
pub mod linear;
pub mod metrics;
pub mod selection;
pub mod tree;

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use strum::{EnumIter, IntoStaticStr};

use crate::config::TrainingConfig;
use crate::error::ModelError;

pub use boosting::{BoostingParams, GradientBoosting};
pub use bundle::ModelBundle;
pub use forest::RandomForest;
pub use linear::LinearModel;
pub use metrics::{EvaluationRecord, RegressionMetrics};
pub use selection::{ModelSelector, SelectionOutcome};

/// Регрессор-кандидат; имя совпадает с именем файла модели
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, IntoStaticStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CandidateKind {
    LinearRegression,
    Lasso,
    RandomForest,
    GradientBoosting,
}

impl CandidateKind {
    pub const ALL: [CandidateKind; 4] = [
        CandidateKind::LinearRegression,
        CandidateKind::Lasso,
        CandidateKind::RandomForest,
        CandidateKind::GradientBoosting,
    ];

    pub fn name(self) -> &'static str {
        self.into()
    }

    /// Проверка до начала обучения: без бэкенда весь запуск прерывается
    pub fn ensure_available(self) -> Result<(), ModelError> {
        match self {
            CandidateKind::Lasso if !lasso::is_available() => Err(ModelError::BackendUnavailable {
                candidate: self.name(),
                backend: lasso::BACKEND,
            }),
            _ => Ok(()),
        }
    }

    pub fn fit(self, X: &Array2<f64>, y: &Array1<f64>, config: &TrainingConfig) -> Result<Regressor, ModelError> {
        let model = match self {
            CandidateKind::LinearRegression => Regressor::LinearRegression(LinearModel::fit_least_squares(X, y)?),
            CandidateKind::Lasso => Regressor::Lasso(lasso::fit_lasso(X, y, config.lasso_alpha)?),
            CandidateKind::RandomForest => {
                Regressor::RandomForest(RandomForest::fit(X, y, config.forest_trees, config.seed)?)
            }
            CandidateKind::GradientBoosting => {
                let params = BoostingParams {
                    rounds: config.boosting_rounds,
                    learning_rate: config.boosting_learning_rate,
                    max_depth: config.boosting_max_depth,
                    ..BoostingParams::default()
                };
                Regressor::GradientBoosting(GradientBoosting::fit(X, y, params)?)
            }
        };
        Ok(model)
    }
}

impl std::fmt::Display for CandidateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Обученная модель
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Regressor {
    LinearRegression(LinearModel),
    Lasso(LinearModel),
    RandomForest(RandomForest),
    GradientBoosting(GradientBoosting),
}

impl Regressor {
    pub fn kind(&self) -> CandidateKind {
        match self {
            Regressor::LinearRegression(_) => CandidateKind::LinearRegression,
            Regressor::Lasso(_) => CandidateKind::Lasso,
            Regressor::RandomForest(_) => CandidateKind::RandomForest,
            Regressor::GradientBoosting(_) => CandidateKind::GradientBoosting,
        }
    }

    pub fn predict(&self, X: &Array2<f64>) -> Array1<f64> {
        match self {
            Regressor::LinearRegression(model) | Regressor::Lasso(model) => model.predict(X),
            Regressor::RandomForest(model) => model.predict(X),
            Regressor::GradientBoosting(model) => model.predict(X),
        }
    }
}
