// src/models/staff.rs
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{HrError, HrResult};

pub const MIN_RATING: i64 = 1;
pub const MAX_RATING: i64 = 5;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PerformanceReview {
    pub id: i64,
    pub person_id: i64,
    pub reviewer: String,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub rating: i64,
    pub comments: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewPerformanceReview {
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub rating: i64,
    pub comments: Option<String>,
}

impl NewPerformanceReview {
    pub fn validate(&self) -> HrResult<()> {
        if self.period_end < self.period_start {
            return Err(HrError::validation(
                "period_end",
                "review period ends before it starts",
            ));
        }
        if !(MIN_RATING..=MAX_RATING).contains(&self.rating) {
            return Err(HrError::validation(
                "rating",
                format!("rating must be between {} and {}", MIN_RATING, MAX_RATING),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PayrollRecord {
    pub id: i64,
    pub person_id: i64,
    pub year: i32,
    pub month: i32,
    pub base_salary: f64,
    pub bonus: f64,
    pub deductions: f64,
    pub net_pay: f64,
    pub paid_on: Option<NaiveDate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewPayrollRecord {
    pub year: i32,
    pub month: i32,
    pub base_salary: f64,
    #[serde(default)]
    pub bonus: f64,
    #[serde(default)]
    pub deductions: f64,
    pub paid_on: Option<NaiveDate>,
}

impl NewPayrollRecord {
    pub fn net_pay(&self) -> f64 {
        self.base_salary + self.bonus - self.deductions
    }

    pub fn validate(&self) -> HrResult<()> {
        if !(2000..=2100).contains(&self.year) {
            return Err(HrError::validation("year", "year must be between 2000 and 2100"));
        }
        if !(1..=12).contains(&self.month) {
            return Err(HrError::validation("month", "month must be between 1 and 12"));
        }
        for (field, amount) in [
            ("base_salary", self.base_salary),
            ("bonus", self.bonus),
            ("deductions", self.deductions),
        ] {
            if !amount.is_finite() || amount < 0.0 {
                return Err(HrError::validation(field, "amount cannot be negative"));
            }
        }
        if self.net_pay() < 0.0 {
            return Err(HrError::validation(
                "deductions",
                "deductions exceed salary and bonus",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payroll(month: i32, deductions: f64) -> NewPayrollRecord {
        NewPayrollRecord {
            year: 2031,
            month,
            base_salary: 4000.0,
            bonus: 250.0,
            deductions,
            paid_on: None,
        }
    }

    #[test]
    fn payroll_bounds() {
        assert_eq!(payroll(6, 1000.0).net_pay(), 3250.0);
        assert!(payroll(6, 1000.0).validate().is_ok());
        assert!(matches!(
            payroll(13, 0.0).validate(),
            Err(HrError::Validation { field: "month", .. })
        ));
        assert!(matches!(
            payroll(6, 5000.0).validate(),
            Err(HrError::Validation { field: "deductions", .. })
        ));
    }

    #[test]
    fn rating_is_bounded() {
        let start = NaiveDate::from_ymd_opt(2031, 1, 1).unwrap();
        let review = |rating| NewPerformanceReview {
            period_start: start,
            period_end: NaiveDate::from_ymd_opt(2031, 6, 30).unwrap(),
            rating,
            comments: None,
        };
        assert!(review(5).validate().is_ok());
        assert!(review(0).validate().is_err());
        assert!(review(6).validate().is_err());
    }
}
