// Core modules
pub mod api;
pub mod config;
pub mod db;
pub mod engine;
pub mod features;
pub mod gate;
pub mod indicators;
pub mod models;
pub mod risk;
pub mod strategy;

// Re-export commonly used types
pub use engine::{AuditLog, Broker, Engine, MarketData, PipelineError, RunReport};
pub use models::*;

// Error handling
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;
