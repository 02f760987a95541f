// src/repository/staff.rs
//! Performance reviews and monthly payroll records per person

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::info;

use crate::error::HrResult;
use crate::models::staff::{NewPayrollRecord, NewPerformanceReview};
use crate::models::{PayrollRecord, PerformanceReview};
use crate::repository::PersonRepository;

const REVIEW_COLUMNS: &str =
    "id, person_id, reviewer, period_start, period_end, rating, comments, created_at";

const PAYROLL_COLUMNS: &str =
    "id, person_id, year, month, base_salary, bonus, deductions, net_pay, paid_on";

pub struct StaffRecordRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> StaffRecordRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn add_review(
        &self,
        person_id: i64,
        reviewer: &str,
        review: &NewPerformanceReview,
    ) -> HrResult<PerformanceReview> {
        review.validate()?;
        PersonRepository::new(self.pool).find(person_id).await?;

        let created = sqlx::query_as::<_, PerformanceReview>(&format!(
            r#"
            INSERT INTO performance_reviews (person_id, reviewer, period_start, period_end,
                rating, comments, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING {}
            "#,
            REVIEW_COLUMNS
        ))
        .bind(person_id)
        .bind(reviewer)
        .bind(review.period_start)
        .bind(review.period_end)
        .bind(review.rating)
        .bind(review.comments.as_deref().map(str::trim))
        .bind(Utc::now())
        .fetch_one(self.pool)
        .await?;

        info!(
            "Performance review {} recorded for person {} by {}",
            created.id, person_id, reviewer
        );
        Ok(created)
    }

    /// Most recent period first
    pub async fn reviews_for_person(&self, person_id: i64) -> HrResult<Vec<PerformanceReview>> {
        let reviews = sqlx::query_as::<_, PerformanceReview>(&format!(
            "SELECT {} FROM performance_reviews WHERE person_id = ? \
             ORDER BY period_end DESC, id DESC",
            REVIEW_COLUMNS
        ))
        .bind(person_id)
        .fetch_all(self.pool)
        .await?;
        Ok(reviews)
    }

    /// One record per person and month; a second one is a conflict.
    pub async fn add_payroll(
        &self,
        person_id: i64,
        record: &NewPayrollRecord,
    ) -> HrResult<PayrollRecord> {
        record.validate()?;
        PersonRepository::new(self.pool).find(person_id).await?;

        let created = sqlx::query_as::<_, PayrollRecord>(&format!(
            r#"
            INSERT INTO payroll_records (person_id, year, month, base_salary, bonus,
                deductions, net_pay, paid_on)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING {}
            "#,
            PAYROLL_COLUMNS
        ))
        .bind(person_id)
        .bind(record.year)
        .bind(record.month)
        .bind(record.base_salary)
        .bind(record.bonus)
        .bind(record.deductions)
        .bind(record.net_pay())
        .bind(record.paid_on)
        .fetch_one(self.pool)
        .await?;

        info!(
            "Payroll {}-{:02} recorded for person {}: net {:.2}",
            created.year, created.month, person_id, created.net_pay
        );
        Ok(created)
    }

    pub async fn payroll_for_person(
        &self,
        person_id: i64,
        year: Option<i32>,
    ) -> HrResult<Vec<PayrollRecord>> {
        let records = sqlx::query_as::<_, PayrollRecord>(&format!(
            "SELECT {} FROM payroll_records WHERE person_id = ?1 AND (?2 IS NULL OR year = ?2) \
             ORDER BY year ASC, month ASC",
            PAYROLL_COLUMNS
        ))
        .bind(person_id)
        .bind(year)
        .fetch_all(self.pool)
        .await?;
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Database;
    use crate::error::HrError;
    use crate::models::person::NewPerson;
    use crate::models::EducationLevel;
    use chrono::NaiveDate;

    async fn person(db: &Database) -> i64 {
        PersonRepository::new(db.pool())
            .create(&NewPerson {
                first_name: "Mira".into(),
                last_name: "Okafor".into(),
                email: "mira@example.com".into(),
                department_id: None,
                position_id: None,
                experience_years: 3.0,
                education_level: EducationLevel::Master,
                hire_date: None,
                is_active: true,
            })
            .await
            .unwrap()
            .id
    }

    fn month(year: i32, month: i32) -> NewPayrollRecord {
        NewPayrollRecord {
            year,
            month,
            base_salary: 5000.0,
            bonus: 0.0,
            deductions: 1200.0,
            paid_on: None,
        }
    }

    #[tokio::test]
    async fn payroll_is_unique_per_month() {
        let db = Database::in_memory().await.unwrap();
        let person_id = person(&db).await;
        let repo = StaffRecordRepository::new(db.pool());

        let first = repo.add_payroll(person_id, &month(2031, 1)).await.unwrap();
        assert_eq!(first.net_pay, 3800.0);
        repo.add_payroll(person_id, &month(2031, 2)).await.unwrap();
        repo.add_payroll(person_id, &month(2032, 1)).await.unwrap();

        let err = repo.add_payroll(person_id, &month(2031, 1)).await.unwrap_err();
        assert!(matches!(err, HrError::Conflict(_)));

        let year = repo.payroll_for_person(person_id, Some(2031)).await.unwrap();
        assert_eq!(year.iter().map(|r| r.month).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(repo.payroll_for_person(person_id, None).await.unwrap().len(), 3);

        let err = repo.add_payroll(person_id + 1, &month(2031, 3)).await.unwrap_err();
        assert!(matches!(err, HrError::NotFound { entity: "person", .. }));
    }

    #[tokio::test]
    async fn reviews_come_back_latest_first() {
        let db = Database::in_memory().await.unwrap();
        let person_id = person(&db).await;
        let repo = StaffRecordRepository::new(db.pool());
        let date = |m, d| NaiveDate::from_ymd_opt(2031, m, d).unwrap();

        for (start, end, rating) in [(date(1, 1), date(6, 30), 3), (date(7, 1), date(12, 31), 4)] {
            repo.add_review(
                person_id,
                "hr-1",
                &NewPerformanceReview {
                    period_start: start,
                    period_end: end,
                    rating,
                    comments: Some(" steady ".into()),
                },
            )
            .await
            .unwrap();
        }

        let reviews = repo.reviews_for_person(person_id).await.unwrap();
        assert_eq!(reviews.len(), 2);
        assert_eq!(reviews[0].rating, 4);
        assert_eq!(reviews[0].comments.as_deref(), Some("steady"));
        assert_eq!(reviews[1].reviewer, "hr-1");
    }
}
