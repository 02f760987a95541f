// src/models/matching.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::MatchStatus;

/// Persisted snapshot of one (job definition, person) evaluation.
///
/// Missing requirements and recommendations are stored one item per line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct QualificationMatchingResult {
    pub id: i64,
    pub job_definition_id: i64,
    pub person_id: i64,
    pub overall_match_percentage: f64,
    pub required_skills_match: f64,
    pub preferred_skills_match: f64,
    pub experience_match: f64,
    pub education_match: f64,
    pub certification_match: f64,
    pub status: MatchStatus,
    pub missing_requirements: String,
    pub recommendations: String,
    pub calculated_at: DateTime<Utc>,
    pub reviewed_by: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub review_notes: Option<String>,
}

impl QualificationMatchingResult {
    pub fn missing_requirements_list(&self) -> Vec<&str> {
        split_lines(&self.missing_requirements)
    }

    pub fn recommendations_list(&self) -> Vec<&str> {
        split_lines(&self.recommendations)
    }
}

fn split_lines(text: &str) -> Vec<&str> {
    text.lines().filter(|line| !line.trim().is_empty()).collect()
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchReview {
    pub notes: Option<String>,
}
