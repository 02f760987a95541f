// src/models/leave.rs
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{HrError, HrResult};
use crate::models::LeaveStatus;

pub const MIN_BALANCE_YEAR: i32 = 2000;
pub const MAX_BALANCE_YEAR: i32 = 2100;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct LeaveType {
    pub id: i64,
    pub name: String,
    pub default_days_per_year: f64,
    pub max_carry_over_days: f64,
    pub is_paid: bool,
    pub is_active: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewLeaveType {
    pub name: String,
    pub default_days_per_year: f64,
    #[serde(default)]
    pub max_carry_over_days: f64,
    #[serde(default = "paid_by_default")]
    pub is_paid: bool,
}

fn paid_by_default() -> bool {
    true
}

impl NewLeaveType {
    pub fn validate(&self) -> HrResult<()> {
        if self.name.trim().is_empty() {
            return Err(HrError::validation("name", "leave type name is required"));
        }
        if !self.default_days_per_year.is_finite() || self.default_days_per_year < 0.0 {
            return Err(HrError::validation("default_days_per_year", "must be zero or more"));
        }
        if !self.max_carry_over_days.is_finite() || self.max_carry_over_days < 0.0 {
            return Err(HrError::validation("max_carry_over_days", "must be zero or more"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Leave {
    pub id: i64,
    pub person_id: i64,
    pub leave_type_id: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_days: f64,
    pub status: LeaveStatus,
    pub reason: Option<String>,
    pub decided_by: Option<String>,
    pub decided_at: Option<DateTime<Utc>>,
    pub decision_note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Leave {
    pub fn year(&self) -> i32 {
        self.start_date.year()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeaveRequest {
    pub person_id: i64,
    pub leave_type_id: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Defaults to the weekday count of the range.
    pub total_days: Option<f64>,
    pub reason: Option<String>,
}

impl LeaveRequest {
    /// Checks the date range and resolves the number of days requested.
    pub fn resolve_total_days(&self) -> HrResult<f64> {
        if self.end_date < self.start_date {
            return Err(HrError::validation("end_date", "cannot precede start_date"));
        }
        if self.end_date.year() != self.start_date.year() {
            return Err(HrError::validation(
                "end_date",
                "a leave cannot span two calendar years; split the request",
            ));
        }
        let year = self.start_date.year();
        if !(MIN_BALANCE_YEAR..=MAX_BALANCE_YEAR).contains(&year) {
            return Err(HrError::validation(
                "start_date",
                format!("year must be between {} and {}", MIN_BALANCE_YEAR, MAX_BALANCE_YEAR),
            ));
        }

        let total = match self.total_days {
            Some(days) => days,
            None => crate::utils::weekdays_between(self.start_date, self.end_date) as f64,
        };
        if !total.is_finite() || total <= 0.0 {
            return Err(HrError::validation("total_days", "must be greater than zero"));
        }
        let calendar_days = (self.end_date - self.start_date).num_days() as f64 + 1.0;
        if total > calendar_days {
            return Err(HrError::validation(
                "total_days",
                format!("cannot exceed the {} calendar days in range", calendar_days),
            ));
        }
        Ok(total)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct LeaveBalance {
    pub id: i64,
    pub person_id: i64,
    pub leave_type_id: i64,
    pub year: i32,
    pub allocated_days: f64,
    pub used_days: f64,
    pub pending_days: f64,
    pub carried_over_days: f64,
    pub manual_adjustment: f64,
    pub adjustment_reason: Option<String>,
    pub adjustment_date: Option<DateTime<Utc>>,
}

impl LeaveBalance {
    /// Allocated + carried over + adjustment - used - pending.
    pub fn available_days(&self) -> f64 {
        self.allocated_days + self.carried_over_days + self.manual_adjustment
            - self.used_days
            - self.pending_days
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BalanceAdjustment {
    pub days: f64,
    pub reason: String,
}

impl BalanceAdjustment {
    pub fn validate(&self) -> HrResult<()> {
        if !self.days.is_finite() || self.days == 0.0 {
            return Err(HrError::validation("days", "must be a non-zero number"));
        }
        if self.reason.trim().is_empty() {
            return Err(HrError::validation("reason", "an adjustment needs a reason"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(start: (i32, u32, u32), end: (i32, u32, u32), total: Option<f64>) -> LeaveRequest {
        LeaveRequest {
            person_id: 1,
            leave_type_id: 1,
            start_date: NaiveDate::from_ymd_opt(start.0, start.1, start.2).unwrap(),
            end_date: NaiveDate::from_ymd_opt(end.0, end.1, end.2).unwrap(),
            total_days: total,
            reason: None,
        }
    }

    #[test]
    fn defaults_to_weekdays() {
        // Monday 2025-03-03 to Sunday 2025-03-09
        let days = request((2025, 3, 3), (2025, 3, 9), None)
            .resolve_total_days()
            .unwrap();
        assert_eq!(days, 5.0);
    }

    #[test]
    fn weekend_only_range_is_rejected() {
        let err = request((2025, 3, 8), (2025, 3, 9), None)
            .resolve_total_days()
            .unwrap_err();
        assert!(matches!(err, HrError::Validation { field: "total_days", .. }));
    }

    #[test]
    fn half_day_is_allowed() {
        let days = request((2025, 3, 3), (2025, 3, 3), Some(0.5))
            .resolve_total_days()
            .unwrap();
        assert_eq!(days, 0.5);
    }

    #[test]
    fn reversed_and_cross_year_ranges_are_rejected() {
        assert!(request((2025, 3, 5), (2025, 3, 3), None).resolve_total_days().is_err());
        assert!(request((2025, 12, 30), (2026, 1, 2), None).resolve_total_days().is_err());
    }

    #[test]
    fn available_days_formula() {
        let balance = LeaveBalance {
            id: 1,
            person_id: 1,
            leave_type_id: 1,
            year: 2025,
            allocated_days: 25.0,
            used_days: 6.0,
            pending_days: 2.0,
            carried_over_days: 3.0,
            manual_adjustment: -1.0,
            adjustment_reason: None,
            adjustment_date: None,
        };
        assert_eq!(balance.available_days(), 19.0);
    }
}
