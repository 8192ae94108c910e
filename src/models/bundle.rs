//! Артефакт модели: обученный препроцессор и регрессор, сохраняются вместе

#![allow(non_snake_case)]

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;
use crate::models::Regressor;
use crate::preprocessing::{FeaturePreprocessor, FeatureRow};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelBundle {
    pub preprocessor: FeaturePreprocessor,
    pub model: Regressor,
}

impl ModelBundle {
    pub fn save(&self, path: &Path) -> Result<(), PipelineError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let writer = BufWriter::new(File::create(path)?);
        bincode::serialize_into(writer, self)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, PipelineError> {
        if !path.exists() {
            return Err(PipelineError::MissingSourceFile(path.to_path_buf()));
        }
        let reader = BufReader::new(File::open(path)?);
        Ok(bincode::deserialize_from(reader)?)
    }

    /// transform, затем predict
    pub fn predict(&self, rows: &[FeatureRow]) -> Array1<f64> {
        let X = self.preprocessor.transform(rows);
        self.model.predict(&X)
    }
}
