pub mod config;
pub mod controller;
pub mod gemini;
pub mod geography;
pub mod logging;
pub mod map;
pub mod panel;
pub mod projection;
pub mod quiz;
pub mod record;
pub mod schema;
pub mod service;
pub mod territory;
pub mod web;

pub use config::AppConfig;
pub use controller::{AppState, DetailTicket};
pub use gemini::{GeminiClient, GenerateRequest, GenerationError, TextGenerator};
pub use geography::{CountryFeature, Geography, GeographyError};
pub use map::{MapError, MapModel, MapShape};
pub use panel::{DetailState, PanelView};
pub use quiz::{QuizError, QuizOutcome, QuizPhase, QuizSession};
pub use record::{ColonyDetail, HistoricalEvent, QuizQuestion};
pub use schema::{ResponseSchema, SCHEMA_VERSION, SchemaViolation};
pub use service::{HistoryService, ServiceError};
pub use territory::{Territory, TerritoryError, TerritoryTable};
