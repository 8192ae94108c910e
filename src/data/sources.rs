//! Загрузка исходных данных: JSON-выгрузка OpenDataSoft и CSV с data.gouv.fr

use std::time::Duration;

use crate::config::SourcesConfig;
use crate::data::table::{decode_latin1, RawTable, Value};
use crate::error::PipelineError;

pub struct SourceFetcher {
    client: reqwest::Client,
    config: SourcesConfig,
}

impl SourceFetcher {
    pub fn new(config: SourcesConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_seconds))
            .build()?;
        Ok(Self { client, config })
    }

    /// Загружает все источники и объединяет их.
    ///
    /// Ошибка отдельного источника только логируется; пустой итог — ошибка.
    pub async fn fetch_all(&self) -> Result<RawTable, PipelineError> {
        let mut tables = Vec::new();

        tracing::info!("Fetching OpenDataSoft data...");
        match self.fetch_json(&self.config.json_url).await {
            Ok(table) => {
                tracing::info!("OpenDataSoft data loaded: {} rows", table.len());
                tables.push(table);
            }
            Err(e) => tracing::warn!("Failed to fetch OpenDataSoft data: {}", e),
        }

        for url in &self.config.csv_urls {
            tracing::info!("Downloading: {}", url);
            match self.fetch_csv(url).await {
                Ok(table) => tables.push(table),
                Err(e) => tracing::warn!("Error loading CSV from {}: {}", url, e),
            }
        }

        let mut combined = RawTable::concat(tables);
        for column in &mut combined.columns {
            *column = column.trim().to_string();
        }

        if combined.is_empty() {
            return Err(PipelineError::NoSourceData);
        }

        Ok(combined)
    }

    async fn fetch_json(&self, url: &str) -> Result<RawTable, SourceError> {
        let records: Vec<serde_json::Map<String, serde_json::Value>> = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(table_from_json(&records))
    }

    async fn fetch_csv(&self, url: &str) -> Result<RawTable, SourceError> {
        let bytes = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        let text = decode_latin1(&bytes);
        Ok(RawTable::from_csv_text(&text, self.config.csv_delimiter as u8)?)
    }
}

#[derive(Debug, thiserror::Error)]
enum SourceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Массив JSON-объектов → таблица; колонки в порядке первого появления ключа
pub fn table_from_json(records: &[serde_json::Map<String, serde_json::Value>]) -> RawTable {
    let per_record: Vec<RawTable> = records
        .iter()
        .map(|record| {
            let mut table = RawTable::new(record.keys().cloned().collect());
            table.push_row(record.values().map(Value::from_json).collect());
            table
        })
        .collect();

    RawTable::concat(per_record)
}
