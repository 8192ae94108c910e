//! Очистка сырых данных: нормализация колонок, извлечение числа комнат,
//! фильтрация выбросов и вычисление цены за м².
//!
//! Каждый этап — чистая функция `Frame -> Frame`; порядок задан списком [`STAGES`].

use crate::config::CleaningConfig;
use crate::data::{RawTable, Value};
use crate::error::PipelineError;
use crate::types::{ConstructionEra, Field, Observation};

/// Переименование полей источника в каноническую схему
pub const COLUMN_RENAMES: [(&str, Field); 3] = [
    ("loyer_median", Field::Price),
    ("surface_moyenne", Field::Area),
    ("nombre_pieces_homogene", Field::Rooms),
];

/// Маркер единицы в текстовом количестве комнат ("3P" — 3 pièces)
const ROOM_MARKER: char = 'P';

/// Обрезает и переводит в нижний регистр имена колонок, затем переименовывает.
/// Колонки, совпавшие после нормализации (`Zone_complementaire` и `zone_complementaire`),
/// сливаются: в строке берётся первое непустое значение.
/// Отсутствующая колонка источника не ошибка.
pub fn normalize_columns(table: RawTable) -> RawTable {
    let mut columns: Vec<String> = Vec::new();
    let mut target = Vec::with_capacity(table.columns.len());
    for column in &table.columns {
        let normalized = column.trim().to_lowercase();
        let name = COLUMN_RENAMES
            .iter()
            .find(|(source, _)| *source == normalized)
            .map(|(_, field)| field.column().to_string())
            .unwrap_or(normalized);

        let idx = match columns.iter().position(|c| *c == name) {
            Some(idx) => idx,
            None => {
                columns.push(name);
                columns.len() - 1
            }
        };
        target.push(idx);
    }

    if columns.len() == table.columns.len() {
        return RawTable { columns, rows: table.rows };
    }

    let mut merged = RawTable::new(columns);
    for row in table.rows {
        let mut cells = vec![Value::Missing; merged.columns.len()];
        for (value, &idx) in row.into_iter().zip(&target) {
            if cells[idx].is_missing() {
                cells[idx] = value;
            }
        }
        merged.push_row(cells);
    }
    merged
}

/// Количество комнат из числа или текста вида "3P"; `None`, если не разобрать
pub fn extract_room_count(value: &Value) -> Option<f64> {
    if let Value::Text(text) = value {
        let from_token = text
            .split_whitespace()
            .find_map(|token| token.replace(ROOM_MARKER, "").parse::<f64>().ok());
        if from_token.is_some() {
            return from_token;
        }
    }
    value.to_number()
}

static MISSING: Value = Value::Missing;

/// Строка в терминах канонической схемы
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub price: Value,
    pub area: Value,
    pub rooms: Value,
    pub observation_count: Value,
    pub housing_stock: Value,
    pub agglomeration: Value,
    pub zone: Value,
    pub housing_type: Value,
    pub era: Value,
}

impl RawRecord {
    pub fn get(&self, field: Field) -> &Value {
        match field {
            Field::Price => &self.price,
            Field::Area => &self.area,
            Field::Rooms => &self.rooms,
            Field::ObservationCount => &self.observation_count,
            Field::HousingStock => &self.housing_stock,
            Field::Agglomeration => &self.agglomeration,
            Field::Zone => &self.zone,
            Field::HousingType => &self.housing_type,
            Field::ConstructionEra => &self.era,
            Field::PricePerArea => &MISSING,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Есть ли колонка эпохи постройки в источнике
    pub has_era_column: bool,
    pub rows: Vec<RawRecord>,
}

impl Frame {
    /// Проекция нормализованной таблицы на каноническую схему
    pub fn from_table(table: &RawTable) -> Self {
        for field in Field::REQUIRED {
            if table.column_index(field.column()).is_none() {
                tracing::warn!("Missing required column: {}", field);
            }
        }

        let index = |field: Field| table.column_index(field.column());
        let cell = |row: &[Value], idx: Option<usize>| {
            idx.and_then(|i| row.get(i).cloned()).unwrap_or(Value::Missing)
        };

        let columns = [
            index(Field::Price),
            index(Field::Area),
            index(Field::Rooms),
            index(Field::ObservationCount),
            index(Field::HousingStock),
            index(Field::Agglomeration),
            index(Field::Zone),
            index(Field::HousingType),
            index(Field::ConstructionEra),
        ];

        let rows = table
            .rows
            .iter()
            .map(|row| RawRecord {
                price: cell(row, columns[0]),
                area: cell(row, columns[1]),
                rooms: cell(row, columns[2]),
                observation_count: cell(row, columns[3]),
                housing_stock: cell(row, columns[4]),
                agglomeration: cell(row, columns[5]),
                zone: cell(row, columns[6]),
                housing_type: cell(row, columns[7]),
                era: cell(row, columns[8]),
            })
            .collect();

        Self {
            has_era_column: columns[8].is_some(),
            rows,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

pub type Stage = fn(Frame, &CleaningConfig) -> Frame;

/// Этапы очистки в порядке применения
pub const STAGES: [(&str, Stage); 5] = [
    ("extract_room_count", extract_rooms),
    ("drop_missing_required", drop_missing_required),
    ("coerce_required", coerce_required),
    ("filter_bounds", filter_bounds),
    ("restrict_construction_era", restrict_construction_era),
];

fn extract_rooms(mut frame: Frame, _: &CleaningConfig) -> Frame {
    for row in &mut frame.rows {
        row.rooms = extract_room_count(&row.rooms).map_or(Value::Missing, Value::Number);
    }
    frame
}

fn has_required(row: &RawRecord) -> bool {
    Field::REQUIRED.iter().all(|&field| !row.get(field).is_missing())
}

fn drop_missing_required(mut frame: Frame, _: &CleaningConfig) -> Frame {
    frame.rows.retain(has_required);
    frame
}

fn coerce_required(mut frame: Frame, _: &CleaningConfig) -> Frame {
    let coerce = |value: &Value| value.to_number().map_or(Value::Missing, Value::Number);
    for row in &mut frame.rows {
        row.price = coerce(&row.price);
        row.area = coerce(&row.area);
        row.rooms = coerce(&row.rooms);
    }
    frame.rows.retain(has_required);
    frame
}

fn filter_bounds(mut frame: Frame, bounds: &CleaningConfig) -> Frame {
    frame.rows.retain(|row| {
        match (row.price.to_number(), row.area.to_number()) {
            (Some(price), Some(area)) => {
                price > bounds.min_price
                    && price < bounds.max_price
                    && area > bounds.min_area
                    && area < bounds.max_area
            }
            _ => false,
        }
    });
    frame
}

fn restrict_construction_era(mut frame: Frame, _: &CleaningConfig) -> Frame {
    if !frame.has_era_column {
        return frame;
    }

    frame.rows.retain_mut(|row| {
        let era = row.era.to_text().as_deref().and_then(ConstructionEra::normalize);
        match era {
            Some(era) => {
                row.era = Value::Text(era.label().to_string());
                true
            }
            None => false,
        }
    });
    frame
}

/// Цена за м² для каждой оставшейся строки; площадь > 0 гарантирована фильтром
pub fn derive_targets(frame: Frame) -> Vec<Observation> {
    let has_era_column = frame.has_era_column;
    frame
        .rows
        .into_iter()
        .filter_map(|row| {
            let price = row.price.to_number()?;
            let area = row.area.to_number()?;
            let rooms = row.rooms.to_number()?;
            let era = if has_era_column {
                row.era.to_text().as_deref().and_then(ConstructionEra::normalize)
            } else {
                None
            };

            Some(Observation {
                price,
                area,
                rooms,
                observation_count: row.observation_count.to_number(),
                housing_stock: row.housing_stock.to_number(),
                agglomeration: row.agglomeration.to_text(),
                zone: row.zone.to_text(),
                housing_type: row.housing_type.to_text(),
                era,
                price_per_area: price / area,
            })
        })
        .collect()
}

/// Полный конвейер очистки; пустой результат — ошибка, а не пустой файл
pub fn clean(table: RawTable, bounds: &CleaningConfig) -> Result<Vec<Observation>, PipelineError> {
    tracing::info!("Initial shape: {} rows x {} columns", table.len(), table.columns.len());

    let table = normalize_columns(table);
    let mut frame = Frame::from_table(&table);

    for (name, stage) in STAGES {
        frame = stage(frame, bounds);
        tracing::info!("After {}: {} rows", name, frame.len());
    }

    if frame.is_empty() {
        return Err(PipelineError::EmptyDataset);
    }

    Ok(derive_targets(frame))
}
