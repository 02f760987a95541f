pub mod admin_cli;
pub mod auth;
pub mod core;
pub mod error;
pub mod leave;
pub mod matching;
pub mod models;
pub mod repository;
pub mod utils;
pub mod web;

pub use error::{HrError, HrResult};
pub use web::{build_rocket, start_web_server};
