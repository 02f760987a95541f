// src/repository/job_definitions.rs
use chrono::Utc;
use sqlx::{SqliteExecutor, SqlitePool};
use tracing::info;

use crate::error::{HrError, HrResult};
use crate::models::job::{
    JobDefinitionQualificationInput, JobRequiredSkillInput, NewJobDefinition,
};
use crate::models::{
    JobDefinition, JobDefinitionProfile, JobDefinitionQualification, JobRequiredSkill,
};

const JOB_COLUMNS: &str = "id, title, version, department_id, description, min_experience_years, \
     preferred_experience_years, min_education_level, preferred_education_level, \
     required_certifications, preferred_certifications, is_active, created_at, updated_at";

const REQUIRED_SKILL_SELECT: &str = "SELECT r.id, r.job_definition_id, r.skill_template_id, \
     s.name AS skill_name, r.importance, r.min_level, r.preferred_level, r.min_experience_years, \
     r.weight, r.certification_required \
     FROM job_required_skills r JOIN skill_templates s ON s.id = r.skill_template_id";

pub struct JobDefinitionRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> JobDefinitionRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, active_only: bool) -> HrResult<Vec<JobDefinition>> {
        let definitions = sqlx::query_as::<_, JobDefinition>(&format!(
            "SELECT {} FROM job_definitions WHERE (?1 = FALSE OR is_active = TRUE) \
             ORDER BY title ASC, version DESC",
            JOB_COLUMNS
        ))
        .bind(active_only)
        .fetch_all(self.pool)
        .await?;
        Ok(definitions)
    }

    pub async fn find(&self, id: i64) -> HrResult<JobDefinition> {
        fetch_definition(self.pool, id).await
    }

    pub async fn create(&self, definition: &NewJobDefinition) -> HrResult<JobDefinition> {
        definition.validate()?;
        let now = Utc::now();

        let created = sqlx::query_as::<_, JobDefinition>(&format!(
            r#"
            INSERT INTO job_definitions (title, version, department_id, description,
                min_experience_years, preferred_experience_years, min_education_level,
                preferred_education_level, required_certifications, preferred_certifications,
                is_active, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, TRUE, ?, ?)
            RETURNING {}
            "#,
            JOB_COLUMNS
        ))
        .bind(definition.title.trim())
        .bind(definition.version)
        .bind(definition.department_id)
        .bind(&definition.description)
        .bind(definition.min_experience_years)
        .bind(definition.preferred_experience_years)
        .bind(definition.min_education_level)
        .bind(definition.preferred_education_level)
        .bind(&definition.required_certifications)
        .bind(&definition.preferred_certifications)
        .bind(now)
        .bind(now)
        .fetch_one(self.pool)
        .await?;

        info!(
            "Created job definition {} v{} ({})",
            created.title, created.version, created.id
        );
        Ok(created)
    }

    pub async fn deactivate(&self, id: i64) -> HrResult<()> {
        let result =
            sqlx::query("UPDATE job_definitions SET is_active = FALSE, updated_at = ? WHERE id = ?")
                .bind(Utc::now())
                .bind(id)
                .execute(self.pool)
                .await?;
        if result.rows_affected() == 0 {
            return Err(HrError::not_found("job definition", id));
        }
        Ok(())
    }

    // ===== Requirement rows =====

    pub async fn required_skills(&self, job_definition_id: i64) -> HrResult<Vec<JobRequiredSkill>> {
        fetch_required_skills(self.pool, job_definition_id).await
    }

    /// Insert or replace the requirement for one skill template
    pub async fn upsert_required_skill(
        &self,
        job_definition_id: i64,
        input: &JobRequiredSkillInput,
    ) -> HrResult<JobRequiredSkill> {
        input.validate()?;
        self.find(job_definition_id).await?;

        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO job_required_skills (job_definition_id, skill_template_id, importance,
                min_level, preferred_level, min_experience_years, weight, certification_required)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (job_definition_id, skill_template_id) DO UPDATE SET
                importance = excluded.importance,
                min_level = excluded.min_level,
                preferred_level = excluded.preferred_level,
                min_experience_years = excluded.min_experience_years,
                weight = excluded.weight,
                certification_required = excluded.certification_required
            RETURNING id
            "#,
        )
        .bind(job_definition_id)
        .bind(input.skill_template_id)
        .bind(input.importance)
        .bind(input.min_level)
        .bind(input.preferred_level)
        .bind(input.min_experience_years)
        .bind(input.weight)
        .bind(input.certification_required)
        .fetch_one(self.pool)
        .await
        .map_err(|err| match HrError::from(err) {
            HrError::Conflict(_) => HrError::not_found("skill template", input.skill_template_id),
            other => other,
        })?;

        let skill = sqlx::query_as::<_, JobRequiredSkill>(&format!(
            "{} WHERE r.id = ?",
            REQUIRED_SKILL_SELECT
        ))
        .bind(id)
        .fetch_one(self.pool)
        .await?;
        Ok(skill)
    }

    pub async fn qualifications(
        &self,
        job_definition_id: i64,
    ) -> HrResult<Vec<JobDefinitionQualification>> {
        fetch_qualifications(self.pool, job_definition_id).await
    }

    pub async fn add_qualification(
        &self,
        job_definition_id: i64,
        input: &JobDefinitionQualificationInput,
    ) -> HrResult<JobDefinitionQualification> {
        input.validate()?;
        self.find(job_definition_id).await?;

        let created = sqlx::query_as::<_, JobDefinitionQualification>(
            r#"
            INSERT INTO job_definition_qualifications (job_definition_id, name, importance, min_score, weight)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id, job_definition_id, name, importance, min_score, weight
            "#,
        )
        .bind(job_definition_id)
        .bind(input.name.trim())
        .bind(input.importance)
        .bind(input.min_score)
        .bind(input.weight)
        .fetch_one(self.pool)
        .await?;

        Ok(created)
    }

    /// Load a job definition together with all of its requirement rows,
    /// read from one transaction.
    pub async fn load_profile(&self, job_definition_id: i64) -> HrResult<JobDefinitionProfile> {
        let mut tx = self.pool.begin().await?;
        let definition = fetch_definition(&mut *tx, job_definition_id).await?;
        let required_skills = fetch_required_skills(&mut *tx, job_definition_id).await?;
        let qualifications = fetch_qualifications(&mut *tx, job_definition_id).await?;
        tx.commit().await?;

        Ok(JobDefinitionProfile {
            definition,
            required_skills,
            qualifications,
        })
    }
}

async fn fetch_definition<'e>(executor: impl SqliteExecutor<'e>, id: i64) -> HrResult<JobDefinition> {
    sqlx::query_as::<_, JobDefinition>(&format!(
        "SELECT {} FROM job_definitions WHERE id = ?",
        JOB_COLUMNS
    ))
    .bind(id)
    .fetch_optional(executor)
    .await?
    .ok_or_else(|| HrError::not_found("job definition", id))
}

async fn fetch_required_skills<'e>(
    executor: impl SqliteExecutor<'e>,
    job_definition_id: i64,
) -> HrResult<Vec<JobRequiredSkill>> {
    let skills = sqlx::query_as::<_, JobRequiredSkill>(&format!(
        "{} WHERE r.job_definition_id = ? ORDER BY r.id ASC",
        REQUIRED_SKILL_SELECT
    ))
    .bind(job_definition_id)
    .fetch_all(executor)
    .await?;
    Ok(skills)
}

async fn fetch_qualifications<'e>(
    executor: impl SqliteExecutor<'e>,
    job_definition_id: i64,
) -> HrResult<Vec<JobDefinitionQualification>> {
    let qualifications = sqlx::query_as::<_, JobDefinitionQualification>(
        r#"
        SELECT id, job_definition_id, name, importance, min_score, weight
        FROM job_definition_qualifications
        WHERE job_definition_id = ?
        ORDER BY id ASC
        "#,
    )
    .bind(job_definition_id)
    .fetch_all(executor)
    .await?;
    Ok(qualifications)
}
