#![allow(dead_code)]

use std::path::Path;

use loyers_ml::config::Config;
use loyers_ml::models::CandidateKind;
use loyers_ml::{ConstructionEra, Observation};

/// Десять синтетических наблюдений; цена за м² зависит от города и площади
pub fn synthetic_observations() -> Vec<Observation> {
    let rows: [(f64, f64, &str, &str, ConstructionEra); 10] = [
        (25.0, 1.0, "Paris", "1", ConstructionEra::Before1946),
        (48.0, 2.0, "Paris", "1", ConstructionEra::From1991To2005),
        (52.0, 3.0, "Paris", "2", ConstructionEra::From1991To2005),
        (70.0, 3.0, "Paris", "1", ConstructionEra::After2005),
        (95.0, 4.0, "Paris", "2", ConstructionEra::From1946To1970),
        (30.0, 1.0, "Lyon", "1", ConstructionEra::From1971To1990),
        (45.0, 2.0, "Lyon", "2", ConstructionEra::From1991To2005),
        (65.0, 3.0, "Lyon", "1", ConstructionEra::Before1946),
        (80.0, 4.0, "Lyon", "2", ConstructionEra::After2005),
        (110.0, 5.0, "Lyon", "1", ConstructionEra::From1946To1970),
    ];

    rows.iter()
        .enumerate()
        .map(|(i, &(area, rooms, city, zone, era))| {
            let base = if city == "Paris" { 30.0 } else { 14.0 };
            let price_per_area = base - area * 0.05 + i as f64 * 0.1;
            Observation {
                price: price_per_area * area,
                area,
                rooms,
                observation_count: Some(5.0 + i as f64),
                housing_stock: if i == 3 { None } else { Some(800.0 + 40.0 * i as f64) },
                agglomeration: Some(city.to_string()),
                zone: Some(zone.to_string()),
                housing_type: Some(if rooms >= 4.0 { "Maison" } else { "Appartement" }.to_string()),
                era: Some(era),
                price_per_area,
            }
        })
        .collect()
}

/// Конфигурация с артефактами во временном каталоге
pub fn config_in(dir: &Path) -> Config {
    let mut config = Config::default();
    config.paths.raw_file = dir.join("data/loyers_raw.csv");
    config.paths.clean_file = dir.join("data/loyers_clean.csv");
    config.paths.model_dir = dir.join("models");
    config.paths.prediction_log = dir.join("inference_log.csv");
    config.training.candidates = available_candidates();
    config.training.forest_trees = 20;
    config
}

pub fn available_candidates() -> Vec<CandidateKind> {
    CandidateKind::ALL
        .into_iter()
        .filter(|kind| kind.ensure_available().is_ok())
        .collect()
}
