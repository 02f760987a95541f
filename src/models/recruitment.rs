// src/models/recruitment.rs
//! Job postings advertise a job definition; applications tie a person to a
//! posting and, through the posting, to that definition's match results.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{HrError, HrResult};
use crate::models::{ApplicationStatus, MatchStatus, PostingStatus};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct JobPosting {
    pub id: i64,
    pub job_definition_id: i64,
    pub position_id: Option<i64>,
    pub title: String,
    pub description: Option<String>,
    pub status: PostingStatus,
    pub posted_on: NaiveDate,
    pub closes_on: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl JobPosting {
    /// Open and not past its closing date.
    pub fn accepts_applications(&self, today: NaiveDate) -> bool {
        self.status == PostingStatus::Open && self.closes_on.map_or(true, |last| today <= last)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewJobPosting {
    pub job_definition_id: i64,
    pub position_id: Option<i64>,
    pub title: String,
    pub description: Option<String>,
    pub posted_on: NaiveDate,
    pub closes_on: Option<NaiveDate>,
}

impl NewJobPosting {
    pub fn validate(&self) -> HrResult<()> {
        if self.title.trim().is_empty() {
            return Err(HrError::validation("title", "posting title is required"));
        }
        if let Some(closes_on) = self.closes_on {
            if closes_on < self.posted_on {
                return Err(HrError::validation(
                    "closes_on",
                    "closing date is before the posting date",
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Application {
    pub id: i64,
    pub job_posting_id: i64,
    pub person_id: i64,
    pub status: ApplicationStatus,
    pub cover_letter: Option<String>,
    pub applied_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewApplication {
    pub person_id: i64,
    pub cover_letter: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationStatusChange {
    pub status: ApplicationStatus,
}

/// An application with the stored match result for its posting's job
/// definition, if one has been computed.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct RankedApplication {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub application: Application,
    pub person_name: String,
    pub overall_match_percentage: Option<f64>,
    pub match_status: Option<MatchStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn posting(status: PostingStatus, closes_on: Option<NaiveDate>) -> JobPosting {
        JobPosting {
            id: 1,
            job_definition_id: 1,
            position_id: None,
            title: "SRE".into(),
            description: None,
            status,
            posted_on: NaiveDate::from_ymd_opt(2031, 3, 1).unwrap(),
            closes_on,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn closing_date_is_the_last_day_to_apply() {
        let last = NaiveDate::from_ymd_opt(2031, 3, 31).unwrap();
        let open = posting(PostingStatus::Open, Some(last));
        assert!(open.accepts_applications(last));
        assert!(!open.accepts_applications(last.succ_opt().unwrap()));
        assert!(!posting(PostingStatus::Closed, None).accepts_applications(last));
    }

    #[test]
    fn closing_before_posting_is_rejected() {
        let new = NewJobPosting {
            job_definition_id: 1,
            position_id: None,
            title: "SRE".into(),
            description: None,
            posted_on: NaiveDate::from_ymd_opt(2031, 3, 1).unwrap(),
            closes_on: NaiveDate::from_ymd_opt(2031, 2, 1),
        };
        assert!(matches!(
            new.validate(),
            Err(HrError::Validation { field: "closes_on", .. })
        ));
    }
}
