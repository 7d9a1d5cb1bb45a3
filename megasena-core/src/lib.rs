pub mod config;
pub mod error;
pub mod history;
pub mod models;
pub mod sampler;
pub mod simulation;
pub mod stats;

pub use chrono;
