/// Модуль предобработки данных

pub mod cleaning;
pub mod feature_engineering;
pub mod normalization;

pub use cleaning::{clean, extract_room_count, normalize_columns};
pub use feature_engineering::{CategoryEncoder, FeaturePreprocessor, FeatureRow};
pub use normalization::NumericScaler;
