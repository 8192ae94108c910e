//! Веб-сервис предсказаний

pub mod handlers;
pub mod log;
pub mod page;
pub mod service;

pub use handlers::{router, AppState};
pub use log::PredictionLog;
pub use service::{Prediction, PredictionInput, PredictionService};
