// src/matching/mod.rs
pub mod report;
pub mod scoring;
pub mod service;
pub mod weights;

pub use scoring::{MatchOutcome, MatchingEngine, SubScores};
pub use service::{BulkMatchReport, MatchFailure, MatchingService};
pub use weights::{classify, Weights, MATCHED_THRESHOLD, MATCH_WEIGHTS, PARTIAL_MATCH_THRESHOLD};
