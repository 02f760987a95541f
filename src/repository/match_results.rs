// src/repository/match_results.rs
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{HrError, HrResult};
use crate::matching::MatchOutcome;
use crate::models::{MatchStatus, QualificationMatchingResult};

const RESULT_COLUMNS: &str = "id, job_definition_id, person_id, overall_match_percentage, \
     required_skills_match, preferred_skills_match, experience_match, education_match, \
     certification_match, status, missing_requirements, recommendations, calculated_at, \
     reviewed_by, reviewed_at, review_notes";

pub struct MatchResultRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> MatchResultRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert or replace the snapshot for (job definition, person).
    ///
    /// A single statement, so concurrent writers for the same pair resolve to
    /// the last write. Review metadata on an existing row is kept.
    pub async fn upsert(
        &self,
        outcome: &MatchOutcome,
        calculated_at: DateTime<Utc>,
    ) -> HrResult<QualificationMatchingResult> {
        let scores = &outcome.scores;
        let stored = sqlx::query_as::<_, QualificationMatchingResult>(&format!(
            r#"
            INSERT INTO qualification_matching_results (job_definition_id, person_id,
                overall_match_percentage, required_skills_match, preferred_skills_match,
                experience_match, education_match, certification_match, status,
                missing_requirements, recommendations, calculated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (job_definition_id, person_id) DO UPDATE SET
                overall_match_percentage = excluded.overall_match_percentage,
                required_skills_match = excluded.required_skills_match,
                preferred_skills_match = excluded.preferred_skills_match,
                experience_match = excluded.experience_match,
                education_match = excluded.education_match,
                certification_match = excluded.certification_match,
                status = excluded.status,
                missing_requirements = excluded.missing_requirements,
                recommendations = excluded.recommendations,
                calculated_at = excluded.calculated_at
            RETURNING {}
            "#,
            RESULT_COLUMNS
        ))
        .bind(outcome.job_definition_id)
        .bind(outcome.person_id)
        .bind(scores.overall)
        .bind(scores.required_skills)
        .bind(scores.preferred_skills)
        .bind(scores.experience)
        .bind(scores.education)
        .bind(scores.certification)
        .bind(outcome.status)
        .bind(outcome.missing_requirements.join("\n"))
        .bind(outcome.recommendations.join("\n"))
        .bind(calculated_at)
        .fetch_one(self.pool)
        .await?;

        debug!(
            "Stored match result {} for job {} / person {}: {:.2}% ({})",
            stored.id,
            stored.job_definition_id,
            stored.person_id,
            stored.overall_match_percentage,
            stored.status
        );
        Ok(stored)
    }

    pub async fn find(&self, id: i64) -> HrResult<QualificationMatchingResult> {
        sqlx::query_as::<_, QualificationMatchingResult>(&format!(
            "SELECT {} FROM qualification_matching_results WHERE id = ?",
            RESULT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| HrError::not_found("match result", id))
    }

    pub async fn find_for_pair(
        &self,
        job_definition_id: i64,
        person_id: i64,
    ) -> HrResult<Option<QualificationMatchingResult>> {
        let result = sqlx::query_as::<_, QualificationMatchingResult>(&format!(
            "SELECT {} FROM qualification_matching_results \
             WHERE job_definition_id = ? AND person_id = ?",
            RESULT_COLUMNS
        ))
        .bind(job_definition_id)
        .bind(person_id)
        .fetch_optional(self.pool)
        .await?;
        Ok(result)
    }

    /// Results for a job, best first
    pub async fn list_for_job(
        &self,
        job_definition_id: i64,
        status: Option<MatchStatus>,
    ) -> HrResult<Vec<QualificationMatchingResult>> {
        let results = sqlx::query_as::<_, QualificationMatchingResult>(&format!(
            "SELECT {} FROM qualification_matching_results \
             WHERE job_definition_id = ?1 AND (?2 IS NULL OR status = ?2) \
             ORDER BY overall_match_percentage DESC, person_id ASC",
            RESULT_COLUMNS
        ))
        .bind(job_definition_id)
        .bind(status)
        .fetch_all(self.pool)
        .await?;
        Ok(results)
    }

    /// Record who reviewed a result and when
    pub async fn review(
        &self,
        id: i64,
        reviewer: &str,
        notes: Option<&str>,
    ) -> HrResult<QualificationMatchingResult> {
        let reviewed = sqlx::query_as::<_, QualificationMatchingResult>(&format!(
            r#"
            UPDATE qualification_matching_results
            SET reviewed_by = ?, reviewed_at = ?, review_notes = ?
            WHERE id = ?
            RETURNING {}
            "#,
            RESULT_COLUMNS
        ))
        .bind(reviewer)
        .bind(Utc::now())
        .bind(notes)
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| HrError::not_found("match result", id))?;

        info!("Match result {} reviewed by {}", id, reviewer);
        Ok(reviewed)
    }
}
