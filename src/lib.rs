// Microblog backend - users, follows, tweets with media, and likes over axum + sqlx

// Core types and primitives
pub mod core;
pub mod models;

// Entity store, blob storage and request extractors
pub mod infrastructure;

// Business rules
pub mod services;

// HTTP surface
pub mod api;
pub mod app_state;

// Common utilities
pub mod config;
pub mod error;
pub mod data_seeder;

// Re-exports for convenience
pub use error::{AppError, AppResult};
