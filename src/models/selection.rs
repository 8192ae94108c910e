//! Обучение кандидатов и выбор лучшего по R² на отложенной выборке

#![allow(non_snake_case)]

use std::fs;

use ndarray::Array1;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{debug, info};

use crate::config::{PathsConfig, TrainingConfig};
use crate::error::PipelineError;
use crate::models::metrics::{EvaluationRecord, RegressionMetrics};
use crate::models::{CandidateKind, ModelBundle};
use crate::preprocessing::{FeaturePreprocessor, FeatureRow};
use crate::types::Observation;

/// Индексы обучающей и отложенной выборок.
///
/// Перемешивание с фиксированным seed; размер отложенной части `ceil(fraction·n)`,
/// обе части непустые.
pub fn train_test_split(n: usize, test_fraction: f64, seed: u64) -> Result<(Vec<usize>, Vec<usize>), PipelineError> {
    let n_test = (test_fraction * n as f64).ceil() as usize;
    if n_test == 0 || n_test >= n {
        return Err(PipelineError::NotEnoughRows { rows: n });
    }

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let train = indices.split_off(n_test);
    Ok((train, indices))
}

pub struct CandidateResult {
    pub kind: CandidateKind,
    pub metrics: RegressionMetrics,
    pub bundle: ModelBundle,
}

pub struct SelectionOutcome {
    pub candidates: Vec<CandidateResult>,
    best: usize,
}

impl SelectionOutcome {
    pub fn best(&self) -> &CandidateResult {
        &self.candidates[self.best]
    }

    pub fn records(&self) -> Vec<EvaluationRecord> {
        self.candidates
            .iter()
            .map(|c| EvaluationRecord::new(c.kind.name(), c.metrics))
            .collect()
    }

    /// `<name>.bin` для каждого кандидата, таблица метрик и `best_model.bin`
    pub fn persist(&self, paths: &PathsConfig) -> Result<(), PipelineError> {
        fs::create_dir_all(&paths.model_dir)?;

        for candidate in &self.candidates {
            let path = paths.model_dir.join(format!("{}.bin", candidate.kind.name()));
            candidate.bundle.save(&path)?;
            info!("Saved model to: {}", path.display());
        }

        let results_path = paths.results_file();
        let mut writer = csv::Writer::from_path(&results_path)?;
        for record in self.records() {
            writer.serialize(record)?;
        }
        writer.flush()?;
        info!("Evaluation results saved to: {}", results_path.display());

        let best_path = paths.best_model_file();
        self.best().bundle.save(&best_path)?;
        info!("Best model ({}) saved to: {}", self.best().kind, best_path.display());

        Ok(())
    }
}

pub struct ModelSelector {
    config: TrainingConfig,
}

impl ModelSelector {
    pub fn new(config: TrainingConfig) -> Self {
        Self { config }
    }

    pub fn run(&self, observations: &[Observation]) -> Result<SelectionOutcome, PipelineError> {
        // Недоступный бэкенд прерывает запуск до обучения
        for kind in &self.config.candidates {
            kind.ensure_available()?;
        }

        let (train_idx, test_idx) =
            train_test_split(observations.len(), self.config.test_fraction, self.config.seed)?;
        info!("Split: {} train rows, {} test rows", train_idx.len(), test_idx.len());

        let rows: Vec<FeatureRow> = observations.iter().map(FeatureRow::from).collect();
        let pick_rows = |idx: &[usize]| idx.iter().map(|&i| rows[i].clone()).collect::<Vec<_>>();
        let pick_targets = |idx: &[usize]| idx.iter().map(|&i| observations[i].price_per_area).collect::<Array1<f64>>();

        let train_rows = pick_rows(&train_idx);
        let test_rows = pick_rows(&test_idx);
        let y_train = pick_targets(&train_idx);
        let y_test = pick_targets(&test_idx);

        let mut candidates = Vec::with_capacity(self.config.candidates.len());
        let mut best: Option<(usize, f64)> = None;

        for &kind in &self.config.candidates {
            info!("Training {}", kind);

            let preprocessor = FeaturePreprocessor::fit(&train_rows)?;
            let X_train = preprocessor.transform(&train_rows);
            debug!("{}: design matrix {}x{}", kind, X_train.nrows(), X_train.ncols());

            let model = kind.fit(&X_train, &y_train, &self.config)?;
            let predictions = model.predict(&preprocessor.transform(&test_rows));
            let metrics = RegressionMetrics::calculate(
                y_test.as_slice().unwrap_or_default(),
                predictions.as_slice().unwrap_or_default(),
            )?;

            info!(
                "{}: MAE={:.4} RMSE={:.4} R2={:.4}",
                kind, metrics.mae, metrics.rmse, metrics.r2
            );

            // Строгое сравнение: при равенстве остаётся первый
            if best.map_or(metrics.r2.is_finite(), |(_, r2)| metrics.r2 > r2) {
                best = Some((candidates.len(), metrics.r2));
            }

            candidates.push(CandidateResult {
                kind,
                metrics,
                bundle: ModelBundle { preprocessor, model },
            });
        }

        let (best, best_r2) = best.ok_or(PipelineError::NoViableCandidate)?;
        info!("Best model: {} (R2={:.4})", candidates[best].kind, best_r2);

        Ok(SelectionOutcome { candidates, best })
    }
}
