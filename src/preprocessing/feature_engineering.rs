//! Feature engineering: числовая ветка (среднее + стандартизация) и
//! категориальная ветка (самое частое значение + one-hot).
//!
//! Порядок выходных колонок фиксируется при `fit` и не меняется:
//! сначала [`NUMERIC_FEATURES`], затем блоки [`CATEGORICAL_FEATURES`]
//! в порядке объявления, внутри блока — категории по возрастанию.

use std::collections::BTreeMap;

use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::preprocessing::normalization::NumericScaler;
use crate::types::{room_category, Field, Observation};

pub const NUMERIC_FEATURES: [Field; 3] = [Field::Area, Field::ObservationCount, Field::HousingStock];

pub const CATEGORICAL_FEATURES: [Field; 5] = [
    Field::Rooms,
    Field::Agglomeration,
    Field::Zone,
    Field::HousingType,
    Field::ConstructionEra,
];

/// Входная строка препроцессора; `None` — пропуск
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureRow {
    pub numeric: [Option<f64>; 3],
    pub categorical: [Option<String>; 5],
}

impl From<&Observation> for FeatureRow {
    fn from(obs: &Observation) -> Self {
        Self {
            numeric: [Some(obs.area), obs.observation_count, obs.housing_stock],
            categorical: [
                Some(room_category(obs.rooms)),
                obs.agglomeration.clone(),
                obs.zone.clone(),
                obs.housing_type.clone(),
                obs.era.map(|era| era.label().to_string()),
            ],
        }
    }
}

/// Словарь одного категориального признака
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryEncoder {
    field: Field,
    fill: Option<String>,
    categories: Vec<String>,
}

impl CategoryEncoder {
    fn fit<'a>(field: Field, values: impl Iterator<Item = Option<&'a str>>) -> Self {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for value in values.flatten() {
            *counts.entry(value).or_insert(0) += 1;
        }

        // При равной частоте берём наименьшее значение
        let mut fill: Option<(&str, usize)> = None;
        for (&value, &count) in &counts {
            if fill.map_or(true, |(_, best)| count > best) {
                fill = Some((value, count));
            }
        }

        Self {
            field,
            fill: fill.map(|(value, _)| value.to_string()),
            categories: counts.keys().map(|value| value.to_string()).collect(),
        }
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn contains(&self, value: &str) -> bool {
        self.categories.binary_search_by(|c| c.as_str().cmp(value)).is_ok()
    }

    /// Пишет индикаторы в `out`; незнакомое значение оставляет блок нулевым
    fn encode(&self, value: Option<&str>, out: &mut [f64]) {
        out.fill(0.0);
        let value = value.or(self.fill.as_deref());
        if let Some(value) = value {
            if let Ok(idx) = self.categories.binary_search_by(|c| c.as_str().cmp(value)) {
                out[idx] = 1.0;
            }
        }
    }
}

/// Обученный препроцессор. Метода повторного обучения нет: на инференсе
/// применяется только `transform`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeaturePreprocessor {
    numeric: NumericScaler,
    categorical: Vec<CategoryEncoder>,
}

impl FeaturePreprocessor {
    pub fn fit(rows: &[FeatureRow]) -> Result<Self, ModelError> {
        if rows.is_empty() {
            return Err(ModelError::EmptyDataset);
        }

        let mut numeric = Array2::zeros((rows.len(), NUMERIC_FEATURES.len()));
        for (i, row) in rows.iter().enumerate() {
            for (j, value) in row.numeric.iter().enumerate() {
                numeric[[i, j]] = value.unwrap_or(f64::NAN);
            }
        }

        let categorical = CATEGORICAL_FEATURES
            .iter()
            .enumerate()
            .map(|(j, &field)| {
                CategoryEncoder::fit(field, rows.iter().map(|row| row.categorical[j].as_deref()))
            })
            .collect();

        Ok(Self {
            numeric: NumericScaler::fit(&numeric)?,
            categorical,
        })
    }

    pub fn n_features_out(&self) -> usize {
        self.numeric.n_features() + self.categorical.iter().map(|e| e.categories.len()).sum::<usize>()
    }

    /// Имена выходных колонок в порядке `transform`
    pub fn feature_names(&self) -> Vec<String> {
        let mut names: Vec<String> = NUMERIC_FEATURES.iter().map(|f| f.column().to_string()).collect();
        for encoder in &self.categorical {
            for category in &encoder.categories {
                names.push(format!("{}={}", encoder.field, category));
            }
        }
        names
    }

    pub fn encoder(&self, field: Field) -> Option<&CategoryEncoder> {
        self.categorical.iter().find(|encoder| encoder.field == field)
    }

    pub fn transform(&self, rows: &[FeatureRow]) -> Array2<f64> {
        let width = self.n_features_out();
        let n_numeric = self.numeric.n_features();

        let mut raw_numeric = Array2::zeros((rows.len(), n_numeric));
        for (i, row) in rows.iter().enumerate() {
            for (j, value) in row.numeric.iter().enumerate() {
                raw_numeric[[i, j]] = value.unwrap_or(f64::NAN);
            }
        }
        let scaled = self.numeric.transform(&raw_numeric);

        let mut out = Array2::zeros((rows.len(), width));
        let mut buffer = vec![0.0; width];
        for (i, row) in rows.iter().enumerate() {
            for j in 0..n_numeric {
                buffer[j] = scaled[[i, j]];
            }

            let mut offset = n_numeric;
            for (j, encoder) in self.categorical.iter().enumerate() {
                let block = &mut buffer[offset..offset + encoder.categories.len()];
                encoder.encode(row.categorical[j].as_deref(), block);
                offset += encoder.categories.len();
            }

            out.row_mut(i).assign(&ArrayView1::from(buffer.as_slice()));
        }

        out
    }

    pub fn transform_row(&self, row: &FeatureRow) -> Array1<f64> {
        self.transform(std::slice::from_ref(row)).row(0).to_owned()
    }
}
