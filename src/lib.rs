//! Loyers ML: оценка арендной платы за м²

pub mod config;
pub mod data;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod preprocessing;
pub mod serving;
pub mod types;

pub use config::Config;
pub use error::{ModelError, PipelineError, ValidationError};
pub use types::{ConstructionEra, Field, Observation};
