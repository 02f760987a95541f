// src/repository/recruitment.rs
use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;
use tracing::info;

use crate::error::{HrError, HrResult};
use crate::models::recruitment::{NewApplication, NewJobPosting};
use crate::models::{
    Application, ApplicationStatus, JobPosting, PostingStatus, RankedApplication,
};
use crate::repository::{JobDefinitionRepository, PersonRepository};

const POSTING_COLUMNS: &str = "id, job_definition_id, position_id, title, description, status, \
     posted_on, closes_on, created_at";

const APPLICATION_COLUMNS: &str =
    "id, job_posting_id, person_id, status, cover_letter, applied_at, updated_at";

pub struct RecruitmentRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> RecruitmentRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    // ===== Postings =====

    pub async fn list_postings(&self, open_only: bool) -> HrResult<Vec<JobPosting>> {
        let postings = sqlx::query_as::<_, JobPosting>(&format!(
            "SELECT {} FROM job_postings WHERE (?1 = FALSE OR status = 'open') \
             ORDER BY posted_on DESC, id DESC",
            POSTING_COLUMNS
        ))
        .bind(open_only)
        .fetch_all(self.pool)
        .await?;
        Ok(postings)
    }

    pub async fn find_posting(&self, id: i64) -> HrResult<JobPosting> {
        sqlx::query_as::<_, JobPosting>(&format!(
            "SELECT {} FROM job_postings WHERE id = ?",
            POSTING_COLUMNS
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| HrError::not_found("job posting", id))
    }

    pub async fn create_posting(&self, posting: &NewJobPosting) -> HrResult<JobPosting> {
        posting.validate()?;
        JobDefinitionRepository::new(self.pool)
            .find(posting.job_definition_id)
            .await?;

        let created = sqlx::query_as::<_, JobPosting>(&format!(
            r#"
            INSERT INTO job_postings (job_definition_id, position_id, title, description,
                status, posted_on, closes_on, created_at)
            VALUES (?, ?, ?, ?, 'open', ?, ?, ?)
            RETURNING {}
            "#,
            POSTING_COLUMNS
        ))
        .bind(posting.job_definition_id)
        .bind(posting.position_id)
        .bind(posting.title.trim())
        .bind(&posting.description)
        .bind(posting.posted_on)
        .bind(posting.closes_on)
        .bind(Utc::now())
        .fetch_one(self.pool)
        .await?;

        info!(
            "Created job posting {} ({}) for job definition {}",
            created.title, created.id, created.job_definition_id
        );
        Ok(created)
    }

    pub async fn close_posting(&self, id: i64) -> HrResult<JobPosting> {
        let posting = self.find_posting(id).await?;
        if posting.status != PostingStatus::Open {
            return Err(HrError::InvalidTransition {
                entity: "job posting",
                action: "close",
                from: posting.status.as_str().to_string(),
            });
        }
        sqlx::query("UPDATE job_postings SET status = 'closed' WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;
        info!("Closed job posting {}", id);
        self.find_posting(id).await
    }

    // ===== Applications =====

    pub async fn find_application(&self, id: i64) -> HrResult<Application> {
        sqlx::query_as::<_, Application>(&format!(
            "SELECT {} FROM applications WHERE id = ?",
            APPLICATION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| HrError::not_found("application", id))
    }

    /// A person applies once per posting, and only while it is open.
    pub async fn apply(
        &self,
        posting_id: i64,
        application: &NewApplication,
        today: NaiveDate,
    ) -> HrResult<Application> {
        let posting = self.find_posting(posting_id).await?;
        if !posting.accepts_applications(today) {
            let from = match posting.status {
                PostingStatus::Open => "expired",
                closed => closed.as_str(),
            };
            return Err(HrError::InvalidTransition {
                entity: "job posting",
                action: "apply to",
                from: from.to_string(),
            });
        }
        PersonRepository::new(self.pool)
            .find(application.person_id)
            .await?;

        let now = Utc::now();
        let created = sqlx::query_as::<_, Application>(&format!(
            r#"
            INSERT INTO applications (job_posting_id, person_id, status, cover_letter,
                applied_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING {}
            "#,
            APPLICATION_COLUMNS
        ))
        .bind(posting_id)
        .bind(application.person_id)
        .bind(ApplicationStatus::Submitted)
        .bind(&application.cover_letter)
        .bind(now)
        .bind(now)
        .fetch_one(self.pool)
        .await?;

        info!(
            "Person {} applied to job posting {} (application {})",
            created.person_id, posting_id, created.id
        );
        Ok(created)
    }

    /// Applications for a posting, best stored match first; applicants not
    /// yet matched against the posting's job definition come last.
    pub async fn ranked_applications(&self, posting_id: i64) -> HrResult<Vec<RankedApplication>> {
        self.find_posting(posting_id).await?;
        let ranked = sqlx::query_as::<_, RankedApplication>(
            r#"
            SELECT a.id, a.job_posting_id, a.person_id, a.status, a.cover_letter,
                   a.applied_at, a.updated_at,
                   p.first_name || ' ' || p.last_name AS person_name,
                   m.overall_match_percentage, m.status AS match_status
            FROM applications a
            JOIN job_postings jp ON jp.id = a.job_posting_id
            JOIN persons p ON p.id = a.person_id
            LEFT JOIN qualification_matching_results m
                ON m.job_definition_id = jp.job_definition_id AND m.person_id = a.person_id
            WHERE a.job_posting_id = ?
            ORDER BY m.overall_match_percentage IS NULL, m.overall_match_percentage DESC,
                     a.applied_at ASC, a.id ASC
            "#,
        )
        .bind(posting_id)
        .fetch_all(self.pool)
        .await?;
        Ok(ranked)
    }

    pub async fn set_application_status(
        &self,
        id: i64,
        next: ApplicationStatus,
    ) -> HrResult<Application> {
        let application = self.find_application(id).await?;
        if !application.status.can_move_to(next) {
            return Err(HrError::InvalidTransition {
                entity: "job application",
                action: status_verb(next),
                from: application.status.as_str().to_string(),
            });
        }

        // compare-and-set against the status read above
        let result = sqlx::query(
            "UPDATE applications SET status = ?, updated_at = ? WHERE id = ? AND status = ?",
        )
        .bind(next)
        .bind(Utc::now())
        .bind(id)
        .bind(application.status)
        .execute(self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(HrError::Conflict(format!(
                "application {} changed while updating",
                id
            )));
        }

        info!(
            "Application {} moved from {} to {}",
            id, application.status, next
        );
        self.find_application(id).await
    }
}

fn status_verb(status: ApplicationStatus) -> &'static str {
    match status {
        ApplicationStatus::Submitted => "resubmit",
        ApplicationStatus::Screening => "screen",
        ApplicationStatus::Interview => "interview",
        ApplicationStatus::Offered => "offer",
        ApplicationStatus::Hired => "hire",
        ApplicationStatus::Rejected => "reject",
        ApplicationStatus::Withdrawn => "withdraw",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Database;
    use crate::models::job::NewJobDefinition;
    use crate::models::person::NewPerson;
    use crate::models::EducationLevel;

    async fn seed(db: &Database) -> (i64, i64) {
        let job = JobDefinitionRepository::new(db.pool())
            .create(&NewJobDefinition {
                title: "Platform Engineer".into(),
                version: 1,
                department_id: None,
                description: None,
                min_experience_years: 0.0,
                preferred_experience_years: None,
                min_education_level: EducationLevel::None,
                preferred_education_level: None,
                required_certifications: None,
                preferred_certifications: None,
            })
            .await
            .unwrap();
        let person = PersonRepository::new(db.pool())
            .create(&NewPerson {
                first_name: "Ada".into(),
                last_name: "Tester".into(),
                email: "ada@example.com".into(),
                department_id: None,
                position_id: None,
                experience_years: 1.0,
                education_level: EducationLevel::Bachelor,
                hire_date: None,
                is_active: true,
            })
            .await
            .unwrap();
        (job.id, person.id)
    }

    fn march(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2031, 3, day).unwrap()
    }

    fn new_posting(job_definition_id: i64) -> NewJobPosting {
        NewJobPosting {
            job_definition_id,
            position_id: None,
            title: "Platform Engineer (remote)".into(),
            description: None,
            posted_on: march(1),
            closes_on: Some(march(20)),
        }
    }

    #[tokio::test]
    async fn posting_needs_a_known_job_definition() {
        let db = Database::in_memory().await.unwrap();
        let repo = RecruitmentRepository::new(db.pool());
        let err = repo.create_posting(&new_posting(7)).await.unwrap_err();
        assert!(matches!(err, HrError::NotFound { entity: "job definition", id: 7 }));
    }

    #[tokio::test]
    async fn one_application_per_person_and_only_while_open() {
        let db = Database::in_memory().await.unwrap();
        let (job_id, person_id) = seed(&db).await;
        let repo = RecruitmentRepository::new(db.pool());
        let posting = repo.create_posting(&new_posting(job_id)).await.unwrap();
        let application = NewApplication {
            person_id,
            cover_letter: None,
        };

        let created = repo.apply(posting.id, &application, march(5)).await.unwrap();
        assert_eq!(created.status, ApplicationStatus::Submitted);

        let err = repo.apply(posting.id, &application, march(6)).await.unwrap_err();
        assert!(matches!(err, HrError::Conflict(_)));

        let err = repo.apply(posting.id, &application, march(21)).await.unwrap_err();
        assert!(matches!(err, HrError::InvalidTransition { from, .. } if from == "expired"));

        repo.close_posting(posting.id).await.unwrap();
        assert!(repo.list_postings(true).await.unwrap().is_empty());
        let err = repo.close_posting(posting.id).await.unwrap_err();
        assert!(matches!(err, HrError::InvalidTransition { action: "close", .. }));
    }

    #[tokio::test]
    async fn pipeline_refuses_skipped_stages() {
        let db = Database::in_memory().await.unwrap();
        let (job_id, person_id) = seed(&db).await;
        let repo = RecruitmentRepository::new(db.pool());
        let posting = repo.create_posting(&new_posting(job_id)).await.unwrap();
        let application = repo
            .apply(
                posting.id,
                &NewApplication {
                    person_id,
                    cover_letter: Some("Hello".into()),
                },
                march(2),
            )
            .await
            .unwrap();

        let err = repo
            .set_application_status(application.id, ApplicationStatus::Hired)
            .await
            .unwrap_err();
        assert!(matches!(err, HrError::InvalidTransition { action: "hire", .. }));

        let screened = repo
            .set_application_status(application.id, ApplicationStatus::Screening)
            .await
            .unwrap();
        assert_eq!(screened.status, ApplicationStatus::Screening);

        let ranked = repo.ranked_applications(posting.id).await.unwrap();
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].person_name, "Ada Tester");
        assert!(ranked[0].overall_match_percentage.is_none());
    }
}
