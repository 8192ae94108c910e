/// Источники данных, сырые таблицы и очищенный набор

pub mod dataset;
pub mod sources;
pub mod table;

pub use dataset::{read_observations, write_observations};
pub use sources::SourceFetcher;
pub use table::{RawTable, Value};
