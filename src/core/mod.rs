// src/core/mod.rs
//! Core services: configuration and database access

pub mod config_manager;
pub mod database;

pub use config_manager::ConfigManager;
pub use database::Database;
