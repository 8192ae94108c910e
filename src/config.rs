//! Конфигурация: значения по умолчанию → config/default.toml → переменные LOYERS__*

use std::net::SocketAddr;
use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::models::CandidateKind;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub paths: PathsConfig,
    pub sources: SourcesConfig,
    pub cleaning: CleaningConfig,
    pub training: TrainingConfig,
    pub server: ServerConfig,
}

impl Config {
    pub fn load() -> Result<Self, figment::Error> {
        Self::figment("config/default.toml").extract()
    }

    pub fn figment(toml_path: &str) -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(toml_path))
            .merge(Env::prefixed("LOYERS__").split("__"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    pub raw_file: PathBuf,
    pub clean_file: PathBuf,
    pub model_dir: PathBuf,
    pub prediction_log: PathBuf,
}

impl PathsConfig {
    pub fn results_file(&self) -> PathBuf {
        self.model_dir.join("evaluation_results.csv")
    }

    pub fn best_model_file(&self) -> PathBuf {
        self.model_dir.join("best_model.bin")
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            raw_file: PathBuf::from("data/loyers_raw.csv"),
            clean_file: PathBuf::from("data/loyers_clean.csv"),
            model_dir: PathBuf::from("models"),
            prediction_log: PathBuf::from("inference_log.csv"),
        }
    }
}

const ODS_EXPORT_URL: &str = "https://public.opendatasoft.com/api/explore/v2.1/catalog/datasets/resultats-nationaux-des-observatoires-locaux-des-loyers-france/exports/json";

// Данные data.gouv.fr за 2014–2024
const DATA_GOUV_CSV_URLS: [&str; 11] = [
    "https://www.data.gouv.fr/fr/datasets/r/13d660de-6108-4df6-8a54-1828a991a186",
    "https://www.data.gouv.fr/fr/datasets/r/3da6ba68-1f1e-4c49-a7e8-f521bd099599",
    "https://www.data.gouv.fr/fr/datasets/r/2ae4fb01-c69d-4a4d-bd09-f02c1b02882e",
    "https://www.data.gouv.fr/fr/datasets/r/422b3274-114d-4abe-850c-dfc0c69b981f",
    "https://www.data.gouv.fr/fr/datasets/r/f0f3abb1-2aed-4301-a44a-b14b43d73e1a",
    "https://www.data.gouv.fr/fr/datasets/r/5dcdae40-91b5-44ba-8ffc-65af94b61c6a",
    "https://www.data.gouv.fr/fr/datasets/r/4f1363af-28d9-4ec2-bdad-88f8b51fd7f2",
    "https://www.data.gouv.fr/fr/datasets/r/e30cb3ba-e1ca-4bec-b6ea-3cb751d6b862",
    "https://www.data.gouv.fr/fr/datasets/r/1fee314d-c278-424f-a029-a74d877eb185",
    "https://www.data.gouv.fr/fr/datasets/r/15d902ed-4dc3-457d-9c5d-bfe1151cb573",
    "https://www.data.gouv.fr/fr/datasets/r/42aaf838-46c9-4434-95a9-00173c6d4627",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    pub json_url: String,
    pub csv_urls: Vec<String>,
    pub csv_delimiter: char,
    pub http_timeout_seconds: u64,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            json_url: ODS_EXPORT_URL.to_string(),
            csv_urls: DATA_GOUV_CSV_URLS.iter().map(|url| url.to_string()).collect(),
            csv_delimiter: ';',
            http_timeout_seconds: 60,
        }
    }
}

/// Границы правдоподобных значений; фиксированы, не вычисляются по данным
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CleaningConfig {
    pub min_price: f64,
    pub max_price: f64,
    pub min_area: f64,
    pub max_area: f64,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            min_price: 5.0,
            max_price: 10_000.0,
            min_area: 5.0,
            max_area: 500.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    pub seed: u64,
    pub test_fraction: f64,
    /// Порядок кандидатов определяет выбор при равном R²
    pub candidates: Vec<CandidateKind>,
    pub lasso_alpha: f64,
    pub forest_trees: usize,
    pub boosting_rounds: usize,
    pub boosting_learning_rate: f64,
    pub boosting_max_depth: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            test_fraction: 0.2,
            candidates: CandidateKind::ALL.to_vec(),
            lasso_alpha: 0.01,
            forest_trees: 100,
            boosting_rounds: 100,
            boosting_learning_rate: 0.1,
            boosting_max_depth: 6,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout_seconds: u64,
    pub confidence_interval: bool,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            request_timeout_seconds: 30,
            confidence_interval: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_pipeline_constants() {
        let config: Config = Config::figment("does/not/exist.toml").extract().unwrap();
        assert_eq!(config.training.seed, 42);
        assert_eq!(config.sources.csv_urls.len(), 11);
        assert_eq!(config.cleaning.max_area, 500.0);
        assert_eq!(config.training.candidates, CandidateKind::ALL.to_vec());
        assert_eq!(config.paths.best_model_file(), PathBuf::from("models/best_model.bin"));
    }

    #[test]
    fn toml_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[server]\nport = 5000\n[training]\ncandidates = [\"random_forest\", \"linear_regression\"]\n",
        )
        .unwrap();

        let config: Config = Config::figment(path.to_str().unwrap()).extract().unwrap();
        assert_eq!(config.server.port, 5000);
        assert_eq!(
            config.training.candidates,
            vec![CandidateKind::RandomForest, CandidateKind::LinearRegression]
        );
        assert_eq!(config.server.host, "0.0.0.0");
    }
}
