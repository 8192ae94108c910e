//! Сервис предсказаний: валидация формы, transform → predict, интервал

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::models::ModelBundle;
use crate::preprocessing::FeatureRow;
use crate::types::{room_category, ConstructionEra, Field, Observation};

/// z-квантиль для симметричного 95% интервала
const Z_95: f64 = 1.96;

/// Проверенный запрос; значения уже нормализованы
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionInput {
    pub surface: f64,
    pub nombre_pieces: f64,
    pub nombre_observations: f64,
    pub nombre_logements: f64,
    pub agglomeration: String,
    pub zone_complementaire: String,
    pub type_habitat: String,
    pub epoque_construction_homogene: String,
}

impl PredictionInput {
    fn feature_row(&self) -> FeatureRow {
        FeatureRow {
            numeric: [
                Some(self.surface),
                Some(self.nombre_observations),
                Some(self.nombre_logements),
            ],
            categorical: [
                Some(room_category(self.nombre_pieces)),
                Some(self.agglomeration.clone()),
                Some(self.zone_complementaire.clone()),
                Some(self.type_habitat.clone()),
                Some(self.epoque_construction_homogene.clone()),
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub estimate: f64,
    pub interval: Option<(f64, f64)>,
}

/// Только чтение после создания; разделяется между запросами через `Arc`
pub struct PredictionService {
    bundle: ModelBundle,
    residual_std: Option<f64>,
}

impl PredictionService {
    pub fn new(bundle: ModelBundle, residual_std: Option<f64>) -> Self {
        Self { bundle, residual_std }
    }

    /// Стандартное отклонение остатков (ddof 0) на всём очищенном наборе.
    /// Строки обучающей выборки входят сюда же, поэтому оценка занижена.
    pub fn residual_std(bundle: &ModelBundle, observations: &[Observation]) -> Option<f64> {
        if observations.is_empty() {
            return None;
        }

        let rows: Vec<FeatureRow> = observations.iter().map(FeatureRow::from).collect();
        let predictions = bundle.predict(&rows);
        let residuals: Vec<f64> = observations
            .iter()
            .zip(predictions.iter())
            .map(|(obs, pred)| obs.price_per_area - pred)
            .collect();

        let n = residuals.len() as f64;
        let mean = residuals.iter().sum::<f64>() / n;
        let variance = residuals.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
        let std = variance.sqrt();

        std.is_finite().then_some(std)
    }

    pub fn bundle(&self) -> &ModelBundle {
        &self.bundle
    }

    pub fn has_interval(&self) -> bool {
        self.residual_std.is_some()
    }

    /// Известные значения категориального поля, для подсказок в форме
    pub fn vocabulary(&self, field: Field) -> &[String] {
        self.bundle
            .preprocessor
            .encoder(field)
            .map(|encoder| encoder.categories())
            .unwrap_or_default()
    }

    /// Проверка в три прохода: наличие всех полей, числа, категории
    pub fn validate(&self, form: &HashMap<String, String>) -> Result<PredictionInput, ValidationError> {
        let value = |field: Field| {
            form.get(field.column())
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
        };

        for field in Field::INPUT {
            if value(field).is_none() {
                return Err(ValidationError::MissingField(field));
            }
        }

        // Нечисловое значение считается отсутствующим
        let number = |field: Field| -> Result<f64, ValidationError> {
            value(field)
                .and_then(|v| v.replace(',', ".").parse::<f64>().ok())
                .filter(|v| v.is_finite())
                .ok_or(ValidationError::MissingField(field))
        };
        let surface = number(Field::Area)?;
        let nombre_pieces = number(Field::Rooms)?;
        let nombre_observations = number(Field::ObservationCount)?;
        let nombre_logements = number(Field::HousingStock)?;

        let category = |field: Field| self.check_category(field, value(field).unwrap_or_default());
        let agglomeration = category(Field::Agglomeration)?;
        let zone_complementaire = category(Field::Zone)?;
        let type_habitat = category(Field::HousingType)?;
        let epoque_construction_homogene = category(Field::ConstructionEra)?;

        Ok(PredictionInput {
            surface,
            nombre_pieces,
            nombre_observations,
            nombre_logements,
            agglomeration,
            zone_complementaire,
            type_habitat,
            epoque_construction_homogene,
        })
    }

    fn check_category(&self, field: Field, raw: &str) -> Result<String, ValidationError> {
        let invalid = || ValidationError::InvalidCategory {
            field,
            value: raw.to_string(),
        };

        let value = if field == Field::ConstructionEra {
            ConstructionEra::normalize(raw).ok_or_else(invalid)?.label().to_string()
        } else {
            raw.to_string()
        };

        let encoder = self.bundle.preprocessor.encoder(field).ok_or_else(invalid)?;
        if encoder.contains(&value) {
            Ok(value)
        } else {
            Err(invalid())
        }
    }

    pub fn predict(&self, input: &PredictionInput) -> Prediction {
        let estimate = self
            .bundle
            .predict(std::slice::from_ref(&input.feature_row()))
            .first()
            .copied()
            .unwrap_or(f64::NAN);

        let interval = self.residual_std.map(|std| {
            let half_width = Z_95 * std;
            (estimate - half_width, estimate + half_width)
        });

        Prediction { estimate, interval }
    }
}
