// src/leave/mod.rs
pub mod ledger;
pub mod service;

pub use service::{BalanceSummary, LeaveService, OpenYearSummary};
