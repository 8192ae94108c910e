//! Типы данных: каноническая схема, записи наблюдений, эпохи постройки

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{EnumIter, EnumString, IntoStaticStr};

/// Каноническая схема. Имя колонки одинаково во всех артефактах и в форме.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, EnumString,
    IntoStaticStr,
)]
pub enum Field {
    #[strum(serialize = "loyer")]
    Price,
    #[strum(serialize = "surface")]
    Area,
    #[strum(serialize = "nombre_pieces")]
    Rooms,
    #[strum(serialize = "nombre_observations")]
    ObservationCount,
    #[strum(serialize = "nombre_logements")]
    HousingStock,
    #[strum(serialize = "agglomeration")]
    Agglomeration,
    #[strum(serialize = "zone_complementaire")]
    Zone,
    #[strum(serialize = "type_habitat")]
    HousingType,
    #[strum(serialize = "epoque_construction_homogene")]
    ConstructionEra,
    #[strum(serialize = "loyer_m2")]
    PricePerArea,
}

impl Field {
    pub fn column(self) -> &'static str {
        self.into()
    }

    /// Поля, без которых строка не годится для обучения
    pub const REQUIRED: [Field; 3] = [Field::Price, Field::Area, Field::Rooms];

    /// Поля формы предсказания, в порядке проверки
    pub const INPUT: [Field; 8] = [
        Field::Area,
        Field::Rooms,
        Field::ObservationCount,
        Field::HousingStock,
        Field::Agglomeration,
        Field::Zone,
        Field::HousingType,
        Field::ConstructionEra,
    ];
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// Эпоха постройки: ровно пять канонических интервалов
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum ConstructionEra {
    Before1946,
    From1946To1970,
    From1971To1990,
    From1991To2005,
    After2005,
}

impl ConstructionEra {
    pub const ALL: [ConstructionEra; 5] = [
        ConstructionEra::Before1946,
        ConstructionEra::From1946To1970,
        ConstructionEra::From1971To1990,
        ConstructionEra::From1991To2005,
        ConstructionEra::After2005,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ConstructionEra::Before1946 => "1. Avant 1946",
            ConstructionEra::From1946To1970 => "2. Entre 1946-1970",
            ConstructionEra::From1971To1990 => "3. Entre 1971-1990",
            ConstructionEra::From1991To2005 => "4. Entre 1991-2005",
            ConstructionEra::After2005 => "5. Après 2005",
        }
    }

    /// Приводит вариант написания к каноническому интервалу по упомянутым годам.
    ///
    /// Номер в начале метки игнорируется: источники содержат `2. Entre 1991-2005`,
    /// у которого номер не совпадает с интервалом, и `5. AprÃ¨s 2005` с битой кодировкой.
    pub fn normalize(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if let Some(era) = Self::ALL.into_iter().find(|era| era.label() == raw) {
            return Some(era);
        }

        let years: Vec<u32> = raw
            .split(|c: char| !c.is_ascii_digit())
            .filter(|token| token.len() == 4)
            .filter_map(|token| token.parse().ok())
            .collect();

        // Одиночный год однозначен только вместе со словом "avant"/"après"
        let lower = raw.to_lowercase();
        match years.as_slice() {
            [1946] if lower.contains("avant") => Some(ConstructionEra::Before1946),
            [1946, 1970] => Some(ConstructionEra::From1946To1970),
            [1971, 1990] => Some(ConstructionEra::From1971To1990),
            [1991, 2005] => Some(ConstructionEra::From1991To2005),
            [2005] if lower.contains("apr") => Some(ConstructionEra::After2005),
            _ => None,
        }
    }
}

impl fmt::Display for ConstructionEra {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<ConstructionEra> for String {
    fn from(era: ConstructionEra) -> Self {
        era.label().to_string()
    }
}

impl TryFrom<String> for ConstructionEra {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        ConstructionEra::normalize(&value).ok_or_else(|| format!("unknown construction era '{value}'"))
    }
}

/// Одно наблюдение рынка аренды после очистки.
///
/// Порядок полей совпадает с порядком колонок очищенного CSV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    #[serde(rename = "loyer")]
    pub price: f64,
    #[serde(rename = "surface")]
    pub area: f64,
    #[serde(rename = "nombre_pieces")]
    pub rooms: f64,
    #[serde(rename = "nombre_observations")]
    pub observation_count: Option<f64>,
    #[serde(rename = "nombre_logements")]
    pub housing_stock: Option<f64>,
    pub agglomeration: Option<String>,
    #[serde(rename = "zone_complementaire")]
    pub zone: Option<String>,
    #[serde(rename = "type_habitat")]
    pub housing_type: Option<String>,
    #[serde(rename = "epoque_construction_homogene")]
    pub era: Option<ConstructionEra>,
    #[serde(rename = "loyer_m2")]
    pub price_per_area: f64,
}

/// Количество комнат как категория: `3.0` → `"3"`, `2.5` → `"2.5"`
pub fn room_category(rooms: f64) -> String {
    if rooms.fract() == 0.0 && rooms.abs() < 1e15 {
        format!("{}", rooms as i64)
    } else {
        format!("{rooms}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn era_variants_map_to_canonical_buckets() {
        assert_eq!(
            ConstructionEra::normalize("1991 à 2005"),
            Some(ConstructionEra::From1991To2005)
        );
        assert_eq!(
            ConstructionEra::normalize(" 2. Entre 1991-2005 "),
            Some(ConstructionEra::From1991To2005)
        );
        assert_eq!(
            ConstructionEra::normalize("5. AprÃ¨s 2005"),
            Some(ConstructionEra::After2005)
        );
        assert_eq!(ConstructionEra::normalize("Avant 1946"), Some(ConstructionEra::Before1946));
        assert_eq!(ConstructionEra::normalize("AVANT 1946"), Some(ConstructionEra::Before1946));
        assert_eq!(ConstructionEra::normalize("Après 2005"), Some(ConstructionEra::After2005));
        assert_eq!(ConstructionEra::normalize("Avant 2005"), None);
        assert_eq!(ConstructionEra::normalize("Après 1946"), None);
        assert_eq!(ConstructionEra::normalize("2005"), None);
        assert_eq!(ConstructionEra::normalize("Entre 1950-1960"), None);
        assert_eq!(ConstructionEra::normalize("inconnu"), None);
    }

    #[test]
    fn canonical_labels_are_fixed_points() {
        for era in ConstructionEra::ALL {
            assert_eq!(ConstructionEra::normalize(era.label()), Some(era));
        }
    }

    #[test]
    fn observation_header_follows_schema_order() {
        let mut writer = csv::Writer::from_writer(vec![]);
        writer
            .serialize(Observation {
                price: 700.0,
                area: 35.0,
                rooms: 2.0,
                observation_count: None,
                housing_stock: Some(120.0),
                agglomeration: Some("Lyon".into()),
                zone: Some("2".into()),
                housing_type: Some("Appartement".into()),
                era: Some(ConstructionEra::After2005),
                price_per_area: 20.0,
            })
            .unwrap();
        let bytes = writer.into_inner().unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let header = text.lines().next().unwrap();

        let expected: Vec<&str> = Field::iter().map(Field::column).collect();
        assert_eq!(header, expected.join(","));
        assert!(text.contains("5. Après 2005"));
    }

    #[test]
    fn room_categories_drop_integral_fraction() {
        assert_eq!(room_category(3.0), "3");
        assert_eq!(room_category(2.5), "2.5");
    }
}
