//! Журнал предсказаний: CSV с заголовком, дозапись под общим мьютексом

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tokio::sync::Mutex;

use crate::error::PipelineError;
use crate::serving::service::PredictionInput;

#[derive(Debug, Serialize)]
struct LogRecord<'a> {
    surface: f64,
    nombre_pieces: f64,
    nombre_observations: f64,
    nombre_logements: f64,
    agglomeration: &'a str,
    zone_complementaire: &'a str,
    type_habitat: &'a str,
    epoque_construction_homogene: &'a str,
    prediction: f64,
}

impl<'a> LogRecord<'a> {
    fn new(input: &'a PredictionInput, prediction: f64) -> Self {
        Self {
            surface: input.surface,
            nombre_pieces: input.nombre_pieces,
            nombre_observations: input.nombre_observations,
            nombre_logements: input.nombre_logements,
            agglomeration: &input.agglomeration,
            zone_complementaire: &input.zone_complementaire,
            type_habitat: &input.type_habitat,
            epoque_construction_homogene: &input.epoque_construction_homogene,
            prediction,
        }
    }
}

pub struct PredictionLog {
    path: PathBuf,
    lock: Mutex<()>,
}

impl PredictionLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Запись идёт в blocking-пуле; мьютекс держится до её завершения
    pub async fn append(&self, input: &PredictionInput, prediction: f64) -> Result<(), PipelineError> {
        let _guard = self.lock.lock().await;

        let path = self.path.clone();
        let input = input.clone();
        tokio::task::spawn_blocking(move || write_record(&path, &input, prediction))
            .await
            .map_err(|e| PipelineError::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))?
    }
}

/// Заголовок пишется только в новый (или пустой) файл
fn write_record(path: &Path, input: &PredictionInput, prediction: f64) -> Result<(), PipelineError> {
    let needs_header = std::fs::metadata(path).map_or(true, |meta| meta.len() == 0);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut writer = csv::WriterBuilder::new().has_headers(needs_header).from_writer(file);
    writer.serialize(LogRecord::new(input, prediction))?;
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn input(surface: f64) -> PredictionInput {
        PredictionInput {
            surface,
            nombre_pieces: 3.0,
            nombre_observations: 10.0,
            nombre_logements: 1000.0,
            agglomeration: "Paris".into(),
            zone_complementaire: "1".into(),
            type_habitat: "Appartement".into(),
            epoque_construction_homogene: "4. Entre 1991-2005".into(),
        }
    }

    #[tokio::test]
    async fn header_is_written_once() {
        let dir = tempfile::tempdir().unwrap();
        let log = PredictionLog::new(dir.path().join("inference_log.csv"));

        log.append(&input(50.0), 25.5).await.unwrap();
        log.append(&input(60.0), 24.0).await.unwrap();

        let text = std::fs::read_to_string(log.path()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("surface,nombre_pieces,"));
        assert!(lines[0].ends_with(",prediction"));
        assert!(lines[1].ends_with(",25.5"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_appends_do_not_interleave() {
        let dir = tempfile::tempdir().unwrap();
        let log = Arc::new(PredictionLog::new(dir.path().join("log.csv")));

        let tasks: Vec<_> = (0..16)
            .map(|i| {
                let log = Arc::clone(&log);
                tokio::spawn(async move { log.append(&input(20.0 + i as f64), 10.0).await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let mut reader = csv::Reader::from_path(log.path()).unwrap();
        assert_eq!(reader.records().count(), 16);
    }
}
