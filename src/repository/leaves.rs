// src/repository/leaves.rs
//! Leave types, leave rows and balance rows. Mutating balance operations take
//! a connection so callers can group them in one transaction.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::info;

use crate::error::{HrError, HrResult};
use crate::models::leave::NewLeaveType;
use crate::models::{Leave, LeaveBalance, LeaveStatus, LeaveType};

const LEAVE_COLUMNS: &str = "id, person_id, leave_type_id, start_date, end_date, total_days, \
     status, reason, decided_by, decided_at, decision_note, created_at";

const BALANCE_COLUMNS: &str = "id, person_id, leave_type_id, year, allocated_days, used_days, \
     pending_days, carried_over_days, manual_adjustment, adjustment_reason, adjustment_date";

// ===== Leave types =====

pub struct LeaveTypeRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> LeaveTypeRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, active_only: bool) -> HrResult<Vec<LeaveType>> {
        let types = sqlx::query_as::<_, LeaveType>(
            r#"
            SELECT id, name, default_days_per_year, max_carry_over_days, is_paid, is_active
            FROM leave_types
            WHERE (?1 = FALSE OR is_active = TRUE)
            ORDER BY name ASC
            "#,
        )
        .bind(active_only)
        .fetch_all(self.pool)
        .await?;
        Ok(types)
    }

    pub async fn create(&self, leave_type: &NewLeaveType) -> HrResult<LeaveType> {
        leave_type.validate()?;
        let created = sqlx::query_as::<_, LeaveType>(
            r#"
            INSERT INTO leave_types (name, default_days_per_year, max_carry_over_days, is_paid, is_active)
            VALUES (?, ?, ?, ?, TRUE)
            RETURNING id, name, default_days_per_year, max_carry_over_days, is_paid, is_active
            "#,
        )
        .bind(leave_type.name.trim())
        .bind(leave_type.default_days_per_year)
        .bind(leave_type.max_carry_over_days)
        .bind(leave_type.is_paid)
        .fetch_one(self.pool)
        .await?;

        info!("Created leave type {} ({})", created.name, created.id);
        Ok(created)
    }
}

// ===== Leaves and balances =====

pub struct LeaveRepository;

impl LeaveRepository {
    pub async fn find_leave_type(conn: &mut SqliteConnection, id: i64) -> HrResult<LeaveType> {
        sqlx::query_as::<_, LeaveType>(
            r#"
            SELECT id, name, default_days_per_year, max_carry_over_days, is_paid, is_active
            FROM leave_types WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| HrError::not_found("leave type", id))
    }

    pub async fn active_leave_types(conn: &mut SqliteConnection) -> HrResult<Vec<LeaveType>> {
        let types = sqlx::query_as::<_, LeaveType>(
            r#"
            SELECT id, name, default_days_per_year, max_carry_over_days, is_paid, is_active
            FROM leave_types WHERE is_active = TRUE ORDER BY id ASC
            "#,
        )
        .fetch_all(&mut *conn)
        .await?;
        Ok(types)
    }

    pub async fn ensure_person(conn: &mut SqliteConnection, person_id: i64) -> HrResult<()> {
        let found: Option<(i64,)> = sqlx::query_as("SELECT id FROM persons WHERE id = ?")
            .bind(person_id)
            .fetch_optional(&mut *conn)
            .await?;
        found
            .map(|_| ())
            .ok_or_else(|| HrError::not_found("person", person_id))
    }

    pub async fn active_person_ids(conn: &mut SqliteConnection) -> HrResult<Vec<i64>> {
        let ids: Vec<(i64,)> =
            sqlx::query_as("SELECT id FROM persons WHERE is_active = TRUE ORDER BY id ASC")
                .fetch_all(&mut *conn)
                .await?;
        Ok(ids.into_iter().map(|(id,)| id).collect())
    }

    pub async fn find_leave(conn: &mut SqliteConnection, id: i64) -> HrResult<Leave> {
        sqlx::query_as::<_, Leave>(&format!("SELECT {} FROM leaves WHERE id = ?", LEAVE_COLUMNS))
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| HrError::not_found("leave", id))
    }

    pub async fn leaves_for_person(
        conn: &mut SqliteConnection,
        person_id: i64,
    ) -> HrResult<Vec<Leave>> {
        let leaves = sqlx::query_as::<_, Leave>(&format!(
            "SELECT {} FROM leaves WHERE person_id = ? ORDER BY start_date DESC",
            LEAVE_COLUMNS
        ))
        .bind(person_id)
        .fetch_all(&mut *conn)
        .await?;
        Ok(leaves)
    }

    /// Count active leaves of a person that intersect [start, end]
    pub async fn count_overlapping(
        conn: &mut SqliteConnection,
        person_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> HrResult<i64> {
        let (count,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM leaves
            WHERE person_id = ?
              AND status IN ('pending', 'approved', 'in_progress')
              AND start_date <= ? AND end_date >= ?
            "#,
        )
        .bind(person_id)
        .bind(end)
        .bind(start)
        .fetch_one(&mut *conn)
        .await?;
        Ok(count)
    }

    pub async fn insert_leave(
        conn: &mut SqliteConnection,
        person_id: i64,
        leave_type_id: i64,
        start_date: NaiveDate,
        end_date: NaiveDate,
        total_days: f64,
        reason: Option<&str>,
    ) -> HrResult<Leave> {
        let created = sqlx::query_as::<_, Leave>(&format!(
            r#"
            INSERT INTO leaves (person_id, leave_type_id, start_date, end_date, total_days,
                status, reason, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING {}
            "#,
            LEAVE_COLUMNS
        ))
        .bind(person_id)
        .bind(leave_type_id)
        .bind(start_date)
        .bind(end_date)
        .bind(total_days)
        .bind(LeaveStatus::Pending)
        .bind(reason)
        .bind(Utc::now())
        .fetch_one(&mut *conn)
        .await?;
        Ok(created)
    }

    pub async fn set_status(
        conn: &mut SqliteConnection,
        id: i64,
        status: LeaveStatus,
        decided_by: Option<&str>,
        decided_at: Option<DateTime<Utc>>,
        decision_note: Option<&str>,
    ) -> HrResult<Leave> {
        sqlx::query_as::<_, Leave>(&format!(
            r#"
            UPDATE leaves
            SET status = ?,
                decided_by = COALESCE(?, decided_by),
                decided_at = COALESCE(?, decided_at),
                decision_note = COALESCE(?, decision_note)
            WHERE id = ?
            RETURNING {}
            "#,
            LEAVE_COLUMNS
        ))
        .bind(status)
        .bind(decided_by)
        .bind(decided_at)
        .bind(decision_note)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| HrError::not_found("leave", id))
    }

    /// Approved or in-progress leaves whose stored status may lag behind `today`
    pub async fn leaves_to_refresh(
        conn: &mut SqliteConnection,
        today: NaiveDate,
    ) -> HrResult<Vec<Leave>> {
        let leaves = sqlx::query_as::<_, Leave>(&format!(
            r#"
            SELECT {} FROM leaves
            WHERE (status = 'approved' AND start_date <= ?1)
               OR (status = 'in_progress' AND end_date < ?1)
            ORDER BY id ASC
            "#,
            LEAVE_COLUMNS
        ))
        .bind(today)
        .fetch_all(&mut *conn)
        .await?;
        Ok(leaves)
    }

    // ===== Balances =====

    pub async fn find_balance(
        conn: &mut SqliteConnection,
        person_id: i64,
        leave_type_id: i64,
        year: i32,
    ) -> HrResult<Option<LeaveBalance>> {
        let balance = sqlx::query_as::<_, LeaveBalance>(&format!(
            "SELECT {} FROM leave_balances WHERE person_id = ? AND leave_type_id = ? AND year = ?",
            BALANCE_COLUMNS
        ))
        .bind(person_id)
        .bind(leave_type_id)
        .bind(year)
        .fetch_optional(&mut *conn)
        .await?;
        Ok(balance)
    }

    pub async fn find_balance_by_id(conn: &mut SqliteConnection, id: i64) -> HrResult<LeaveBalance> {
        sqlx::query_as::<_, LeaveBalance>(&format!(
            "SELECT {} FROM leave_balances WHERE id = ?",
            BALANCE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| HrError::not_found("leave balance", id))
    }

    pub async fn balances_for_person(
        conn: &mut SqliteConnection,
        person_id: i64,
        year: Option<i32>,
    ) -> HrResult<Vec<LeaveBalance>> {
        let balances = sqlx::query_as::<_, LeaveBalance>(&format!(
            "SELECT {} FROM leave_balances WHERE person_id = ?1 AND (?2 IS NULL OR year = ?2) \
             ORDER BY year DESC, leave_type_id ASC",
            BALANCE_COLUMNS
        ))
        .bind(person_id)
        .bind(year)
        .fetch_all(&mut *conn)
        .await?;
        Ok(balances)
    }

    /// Create a balance row; `None` when one already exists for the key
    pub async fn insert_balance(
        conn: &mut SqliteConnection,
        person_id: i64,
        leave_type_id: i64,
        year: i32,
        allocated_days: f64,
        carried_over_days: f64,
    ) -> HrResult<Option<LeaveBalance>> {
        let created = sqlx::query_as::<_, LeaveBalance>(&format!(
            r#"
            INSERT INTO leave_balances (person_id, leave_type_id, year, allocated_days, carried_over_days)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT (person_id, leave_type_id, year) DO NOTHING
            RETURNING {}
            "#,
            BALANCE_COLUMNS
        ))
        .bind(person_id)
        .bind(leave_type_id)
        .bind(year)
        .bind(allocated_days)
        .bind(carried_over_days)
        .fetch_optional(&mut *conn)
        .await?;
        Ok(created)
    }

    /// Write back the mutable counters of a balance row
    pub async fn save_balance(conn: &mut SqliteConnection, balance: &LeaveBalance) -> HrResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE leave_balances
            SET allocated_days = ?, used_days = ?, pending_days = ?, carried_over_days = ?,
                manual_adjustment = ?, adjustment_reason = ?, adjustment_date = ?
            WHERE id = ?
            "#,
        )
        .bind(balance.allocated_days)
        .bind(balance.used_days)
        .bind(balance.pending_days)
        .bind(balance.carried_over_days)
        .bind(balance.manual_adjustment)
        .bind(&balance.adjustment_reason)
        .bind(balance.adjustment_date)
        .bind(balance.id)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(HrError::not_found("leave balance", balance.id));
        }
        Ok(())
    }

    /// Sum of days counted as used for one balance key, straight from leave rows
    pub async fn sum_used_days(
        conn: &mut SqliteConnection,
        person_id: i64,
        leave_type_id: i64,
        year: i32,
    ) -> HrResult<f64> {
        let (total,): (Option<f64>,) = sqlx::query_as(
            r#"
            SELECT SUM(total_days) FROM leaves
            WHERE person_id = ? AND leave_type_id = ?
              AND CAST(strftime('%Y', start_date) AS INTEGER) = ?
              AND status IN ('approved', 'in_progress', 'completed')
            "#,
        )
        .bind(person_id)
        .bind(leave_type_id)
        .bind(year)
        .fetch_one(&mut *conn)
        .await?;
        Ok(total.unwrap_or(0.0))
    }
}
