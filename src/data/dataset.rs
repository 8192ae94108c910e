//! Очищенный набор данных: CSV с каноническими колонками

use std::fs;
use std::path::Path;

use crate::error::PipelineError;
use crate::types::Observation;

pub fn write_observations(path: &Path, observations: &[Observation]) -> Result<(), PipelineError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_path(path)?;
    for observation in observations {
        writer.serialize(observation)?;
    }
    writer.flush()?;

    Ok(())
}

pub fn read_observations(path: &Path) -> Result<Vec<Observation>, PipelineError> {
    if !path.exists() {
        return Err(PipelineError::MissingSourceFile(path.to_path_buf()));
    }

    let mut reader = csv::Reader::from_path(path)?;
    let observations = reader.deserialize().collect::<Result<Vec<Observation>, _>>()?;

    if observations.is_empty() {
        return Err(PipelineError::EmptyDataset);
    }

    Ok(observations)
}
