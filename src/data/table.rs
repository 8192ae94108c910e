//! Сырая таблица: произвольные колонки, значения как есть

use std::fs;
use std::path::Path;

use csv::{ReaderBuilder, WriterBuilder};

use crate::error::PipelineError;

/// Значение ячейки сырой таблицы
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Missing,
    Number(f64),
    Text(String),
}

impl Value {
    pub fn from_cell(cell: &str) -> Self {
        if cell.trim().is_empty() {
            Value::Missing
        } else {
            Value::Text(cell.to_string())
        }
    }

    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Missing,
            serde_json::Value::Number(n) => n.as_f64().map_or(Value::Missing, Value::Number),
            serde_json::Value::String(s) => Value::from_cell(s),
            serde_json::Value::Bool(b) => Value::Text(b.to_string()),
            other => Value::Text(other.to_string()),
        }
    }

    pub fn is_missing(&self) -> bool {
        match self {
            Value::Missing => true,
            Value::Number(n) => n.is_nan(),
            Value::Text(_) => false,
        }
    }

    /// Числовое приведение; неудача даёт `None`, а не ошибку
    pub fn to_number(&self) -> Option<f64> {
        let number = match self {
            Value::Missing => return None,
            Value::Number(n) => *n,
            Value::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        (!number.is_nan()).then_some(number)
    }

    pub fn to_text(&self) -> Option<String> {
        match self {
            Value::Missing => None,
            Value::Number(n) if n.is_nan() => None,
            Value::Number(n) => Some(n.to_string()),
            Value::Text(s) => Some(s.trim().to_string()),
        }
    }

    fn to_cell(&self) -> String {
        self.to_text().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl RawTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    /// Добавляет строку; недостающие ячейки становятся `Missing`
    pub fn push_row(&mut self, mut row: Vec<Value>) {
        row.resize(self.columns.len(), Value::Missing);
        self.rows.push(row);
    }

    /// Объединение таблиц без дедупликации: колонки в порядке первого появления
    pub fn concat(tables: Vec<RawTable>) -> RawTable {
        let mut combined = RawTable::default();

        for table in tables {
            let mapping: Vec<usize> = table
                .columns
                .iter()
                .map(|name| match combined.column_index(name) {
                    Some(idx) => idx,
                    None => {
                        combined.columns.push(name.clone());
                        combined.columns.len() - 1
                    }
                })
                .collect();

            for row in table.rows {
                let mut merged = vec![Value::Missing; combined.columns.len()];
                for (value, &idx) in row.into_iter().zip(mapping.iter()) {
                    merged[idx] = value;
                }
                combined.rows.push(merged);
            }
        }

        let width = combined.columns.len();
        for row in &mut combined.rows {
            row.resize(width, Value::Missing);
        }

        combined
    }

    pub fn from_csv_text(text: &str, delimiter: u8) -> Result<Self, csv::Error> {
        let mut reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .flexible(true)
            .from_reader(text.as_bytes());

        let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let mut table = RawTable::new(columns);
        for record in reader.records() {
            let record = record?;
            table.push_row(record.iter().map(Value::from_cell).collect());
        }

        Ok(table)
    }

    /// Читает CSV; файлы не в UTF-8 декодируются как ISO-8859-1
    pub fn read_csv(path: &Path, delimiter: u8) -> Result<Self, PipelineError> {
        if !path.exists() {
            return Err(PipelineError::MissingSourceFile(path.to_path_buf()));
        }

        let bytes = fs::read(path)?;
        let text = String::from_utf8(bytes).unwrap_or_else(|err| decode_latin1(err.as_bytes()));
        Ok(Self::from_csv_text(&text, delimiter)?)
    }

    pub fn write_csv(&self, path: &Path) -> Result<(), PipelineError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut writer = WriterBuilder::new().from_path(path)?;
        writer.write_record(&self.columns)?;
        for row in &self.rows {
            writer.write_record(row.iter().map(Value::to_cell))?;
        }
        writer.flush()?;

        Ok(())
    }
}

/// ISO-8859-1 совпадает с первыми 256 кодовыми точками Unicode
pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concat_aligns_columns_by_name() {
        let mut first = RawTable::new(vec!["a".into(), "b".into()]);
        first.push_row(vec![Value::Number(1.0), Value::Text("x".into())]);
        let mut second = RawTable::new(vec!["b".into(), "c".into()]);
        second.push_row(vec![Value::Text("y".into()), Value::Number(3.0)]);

        let combined = RawTable::concat(vec![first, second]);
        assert_eq!(combined.columns, vec!["a", "b", "c"]);
        assert_eq!(
            combined.rows[0],
            vec![Value::Number(1.0), Value::Text("x".into()), Value::Missing]
        );
        assert_eq!(
            combined.rows[1],
            vec![Value::Missing, Value::Text("y".into()), Value::Number(3.0)]
        );
    }

    #[test]
    fn semicolon_csv_with_blank_cells() {
        let table = RawTable::from_csv_text("loyer_median;surface_moyenne\n700;\n;35\n", b';').unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0][1], Value::Missing);
        assert_eq!(table.rows[1][1].to_number(), Some(35.0));
    }

    #[test]
    fn latin1_bytes_decode_to_accents() {
        assert_eq!(decode_latin1(b"Apr\xe8s 2005"), "Après 2005");
    }

    #[test]
    fn text_coercion_failure_is_missing() {
        assert_eq!(Value::Text("abc".into()).to_number(), None);
        assert_eq!(Value::Text(" 12.5 ".into()).to_number(), Some(12.5));
        assert_eq!(Value::Number(f64::NAN).to_number(), None);
    }

    #[test]
    fn csv_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("raw.csv");
        let mut table = RawTable::new(vec!["loyer".into(), "agglomeration".into()]);
        table.push_row(vec![Value::Number(650.5), Value::Text("Paris".into())]);
        table.push_row(vec![Value::Missing]);
        table.write_csv(&path).unwrap();

        let read = RawTable::read_csv(&path, b',').unwrap();
        assert_eq!(read.columns, table.columns);
        assert_eq!(read.rows[0][0].to_number(), Some(650.5));
        assert_eq!(read.rows[1], vec![Value::Missing, Value::Missing]);
    }

    #[test]
    fn missing_file_is_reported() {
        let err = RawTable::read_csv(Path::new("/nonexistent/raw.csv"), b',').unwrap_err();
        assert!(matches!(err, PipelineError::MissingSourceFile(_)));
    }
}
