//! Ошибки конвейера, моделей и валидации запросов

use std::path::PathBuf;

use thiserror::Error;

use crate::types::Field;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("File not found: {}", .0.display())]
    MissingSourceFile(PathBuf),

    #[error("No valid data collected from any source")]
    NoSourceData,

    #[error("No data remaining after cleaning")]
    EmptyDataset,

    #[error("Not enough rows to split: {rows} rows")]
    NotEnoughRows { rows: usize },

    #[error("No candidate produced a finite R² score")]
    NoViableCandidate,

    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Bincode(#[from] bincode::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Empty dataset")]
    EmptyDataset,

    #[error("Dimension mismatch: {rows} rows, {targets} targets")]
    DimensionMismatch { rows: usize, targets: usize },

    #[error("Candidate '{candidate}' requires {backend}, which is not compiled in")]
    BackendUnavailable {
        candidate: &'static str,
        backend: &'static str,
    },

    #[error("Fitting '{candidate}' failed: {reason}")]
    Fit {
        candidate: &'static str,
        reason: String,
    },
}

/// Ошибки одного запроса предсказания; показываются в форме
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Missing field: {0}")]
    MissingField(Field),

    #[error("Invalid value for {field}: '{value}'")]
    InvalidCategory { field: Field, value: String },
}

impl ValidationError {
    pub fn field(&self) -> Field {
        match self {
            ValidationError::MissingField(field) => *field,
            ValidationError::InvalidCategory { field, .. } => *field,
        }
    }
}
