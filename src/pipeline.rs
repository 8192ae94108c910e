//! Шаги конвейера: загрузка, очистка, обучение, подготовка сервиса

use tracing::{info, warn};

use crate::config::Config;
use crate::data::{read_observations, write_observations, RawTable, SourceFetcher};
use crate::error::PipelineError;
use crate::models::{ModelBundle, ModelSelector, SelectionOutcome};
use crate::preprocessing::clean;
use crate::serving::{AppState, PredictionLog, PredictionService};
use crate::types::Observation;

/// Загрузка всех источников в `paths.raw_file`
pub async fn obtain(config: &Config) -> Result<RawTable, PipelineError> {
    let fetcher = SourceFetcher::new(config.sources.clone())?;

    let table = fetcher.fetch_all().await?;
    table.write_csv(&config.paths.raw_file)?;
    info!(
        "Data saved to {} ({} rows x {} columns)",
        config.paths.raw_file.display(),
        table.len(),
        table.columns.len()
    );

    Ok(table)
}

/// Очистка сырого файла в `paths.clean_file`
pub fn scrub(config: &Config) -> Result<Vec<Observation>, PipelineError> {
    let raw = RawTable::read_csv(&config.paths.raw_file, b',')?;
    let observations = clean(raw, &config.cleaning)?;

    write_observations(&config.paths.clean_file, &observations)?;
    info!(
        "Cleaned data saved to {} ({} rows)",
        config.paths.clean_file.display(),
        observations.len()
    );

    Ok(observations)
}

/// Обучение кандидатов на `paths.clean_file` и сохранение артефактов
pub fn train(config: &Config) -> Result<SelectionOutcome, PipelineError> {
    let observations = read_observations(&config.paths.clean_file)?;
    info!("Loaded {} observations from {}", observations.len(), config.paths.clean_file.display());

    let outcome = ModelSelector::new(config.training.clone()).run(&observations)?;
    outcome.persist(&config.paths)?;

    Ok(outcome)
}

/// Состояние веб-сервиса: лучшая модель и, если нужно, σ остатков
pub fn serving_state(config: &Config) -> Result<AppState, PipelineError> {
    let bundle = ModelBundle::load(&config.paths.best_model_file())?;
    info!("Loaded {} model", bundle.model.kind());

    let residual_std = if config.server.confidence_interval {
        match read_observations(&config.paths.clean_file) {
            Ok(history) => {
                let std = PredictionService::residual_std(&bundle, &history);
                if let Some(std) = std {
                    // Оценка по всему набору, включая обучающие строки
                    warn!("Residual std {:.4} is computed in-sample; intervals are optimistic", std);
                }
                std
            }
            Err(e) => {
                warn!("Confidence interval disabled: {}", e);
                None
            }
        }
    } else {
        None
    };

    Ok(AppState::new(
        PredictionService::new(bundle, residual_std),
        PredictionLog::new(&config.paths.prediction_log),
    ))
}
