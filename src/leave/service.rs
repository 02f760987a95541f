// src/leave/service.rs
//! Leave requests, decisions and balance maintenance. Every mutation runs in
//! one transaction: leave row and balance row change together or not at all.

use chrono::{Datelike, NaiveDate, Utc};
use serde::Serialize;
use sqlx::SqliteConnection;
use tracing::{info, instrument};

use crate::auth::Actor;
use crate::core::Database;
use crate::error::{HrError, HrResult};
use crate::leave::ledger::{self, LeaveAction};
use crate::models::leave::{BalanceAdjustment, LeaveRequest, MAX_BALANCE_YEAR, MIN_BALANCE_YEAR};
use crate::models::{Leave, LeaveBalance, LeaveStatus, LeaveType};
use crate::repository::LeaveRepository;

/// A balance row with its derived availability.
#[derive(Debug, Clone, Serialize)]
pub struct BalanceSummary {
    #[serde(flatten)]
    pub balance: LeaveBalance,
    pub available_days: f64,
}

impl From<LeaveBalance> for BalanceSummary {
    fn from(balance: LeaveBalance) -> Self {
        let available_days = balance.available_days();
        Self {
            balance,
            available_days,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OpenYearSummary {
    pub year: i32,
    pub created: usize,
    pub existing: usize,
}

#[derive(Clone)]
pub struct LeaveService {
    db: Database,
}

impl LeaveService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    #[instrument(skip(self, actor, request), fields(actor = %actor.user_id, person = request.person_id))]
    pub async fn request_leave(&self, actor: &Actor, request: &LeaveRequest) -> HrResult<Leave> {
        actor.require_self_or_hr(request.person_id, "request leave")?;
        let total_days = request.resolve_total_days()?;
        let year = request.start_date.year();

        let mut tx = self.db.pool().begin().await?;

        LeaveRepository::ensure_person(&mut *tx, request.person_id).await?;
        let leave_type = LeaveRepository::find_leave_type(&mut *tx, request.leave_type_id).await?;
        if !leave_type.is_active {
            return Err(HrError::validation(
                "leave_type_id",
                format!("leave type '{}' is inactive", leave_type.name),
            ));
        }

        let overlapping = LeaveRepository::count_overlapping(
            &mut *tx,
            request.person_id,
            request.start_date,
            request.end_date,
        )
        .await?;
        if overlapping > 0 {
            return Err(HrError::Conflict(format!(
                "person {} already has a leave between {} and {}",
                request.person_id, request.start_date, request.end_date
            )));
        }

        let mut balance = balance_or_default(&mut *tx, request.person_id, &leave_type, year).await?;
        ledger::reserve(&mut balance, total_days)?;
        LeaveRepository::save_balance(&mut *tx, &balance).await?;

        let leave = LeaveRepository::insert_leave(
            &mut *tx,
            request.person_id,
            request.leave_type_id,
            request.start_date,
            request.end_date,
            total_days,
            request.reason.as_deref().map(str::trim).filter(|r| !r.is_empty()),
        )
        .await?;

        tx.commit().await?;
        info!(
            "Leave {} requested: person {}, {} days of {} ({} to {})",
            leave.id, leave.person_id, total_days, leave_type.name, leave.start_date, leave.end_date
        );
        Ok(leave)
    }

    #[instrument(skip(self, actor, note), fields(actor = %actor.user_id))]
    pub async fn approve(
        &self,
        actor: &Actor,
        leave_id: i64,
        note: Option<&str>,
        today: NaiveDate,
    ) -> HrResult<Leave> {
        actor.require_hr()?;
        self.decide(actor, leave_id, LeaveAction::Approve, note, today).await
    }

    #[instrument(skip(self, actor, note), fields(actor = %actor.user_id))]
    pub async fn reject(
        &self,
        actor: &Actor,
        leave_id: i64,
        note: Option<&str>,
        today: NaiveDate,
    ) -> HrResult<Leave> {
        actor.require_hr()?;
        self.decide(actor, leave_id, LeaveAction::Reject, note, today).await
    }

    /// Owners may cancel their own leaves; HR may cancel anyone's.
    #[instrument(skip(self, actor, note), fields(actor = %actor.user_id))]
    pub async fn cancel(
        &self,
        actor: &Actor,
        leave_id: i64,
        note: Option<&str>,
        today: NaiveDate,
    ) -> HrResult<Leave> {
        self.decide(actor, leave_id, LeaveAction::Cancel, note, today).await
    }

    async fn decide(
        &self,
        actor: &Actor,
        leave_id: i64,
        action: LeaveAction,
        note: Option<&str>,
        today: NaiveDate,
    ) -> HrResult<Leave> {
        let mut tx = self.db.pool().begin().await?;

        let leave = LeaveRepository::find_leave(&mut *tx, leave_id).await?;
        if action == LeaveAction::Cancel {
            actor.require_self_or_hr(leave.person_id, "cancel leave")?;
        }
        let current = ledger::effective_status(&leave, today);
        let next = ledger::transition(&leave, action, today)?;

        let mut balance = LeaveRepository::find_balance(
            &mut *tx,
            leave.person_id,
            leave.leave_type_id,
            leave.year(),
        )
        .await?
        .ok_or_else(|| {
            HrError::Conflict(format!(
                "leave {} has no balance row for {}",
                leave.id,
                leave.year()
            ))
        })?;

        match (action, current) {
            (LeaveAction::Approve, _) => ledger::commit(&mut balance, leave.total_days)?,
            (LeaveAction::Cancel, LeaveStatus::Approved) => {
                ledger::refund(&mut balance, leave.total_days)?
            }
            _ => ledger::release(&mut balance, leave.total_days)?,
        }
        LeaveRepository::save_balance(&mut *tx, &balance).await?;

        let note = note.map(str::trim).filter(|text| !text.is_empty());
        let updated = LeaveRepository::set_status(
            &mut *tx,
            leave.id,
            next,
            Some(&actor.user_id),
            Some(Utc::now()),
            note,
        )
        .await?;

        tx.commit().await?;
        info!(
            "Leave {} {}: {} -> {} by {}",
            leave.id,
            action.verb(),
            current,
            next,
            actor.user_id
        );
        Ok(updated)
    }

    #[instrument(skip(self, actor, adjustment), fields(actor = %actor.user_id))]
    pub async fn adjust_balance(
        &self,
        actor: &Actor,
        balance_id: i64,
        adjustment: &BalanceAdjustment,
    ) -> HrResult<BalanceSummary> {
        actor.require_hr()?;
        adjustment.validate()?;

        let mut tx = self.db.pool().begin().await?;
        let mut balance = LeaveRepository::find_balance_by_id(&mut *tx, balance_id).await?;
        ledger::adjust(&mut balance, adjustment, Utc::now())?;
        LeaveRepository::save_balance(&mut *tx, &balance).await?;
        tx.commit().await?;

        info!(
            "Balance {} adjusted by {} days ({}) by {}",
            balance_id, adjustment.days, adjustment.reason, actor.user_id
        );
        Ok(balance.into())
    }

    /// Create balance rows for `year` for every active person and leave type.
    /// Existing rows are left as they are.
    #[instrument(skip(self, actor), fields(actor = %actor.user_id))]
    pub async fn open_year(&self, actor: &Actor, year: i32) -> HrResult<OpenYearSummary> {
        actor.require_hr()?;
        check_year(year)?;

        let mut tx = self.db.pool().begin().await?;
        let person_ids = LeaveRepository::active_person_ids(&mut *tx).await?;
        let leave_types = LeaveRepository::active_leave_types(&mut *tx).await?;

        let mut summary = OpenYearSummary {
            year,
            created: 0,
            existing: 0,
        };
        for person_id in &person_ids {
            for leave_type in &leave_types {
                let created = opening_balance(&mut *tx, *person_id, leave_type, year).await?;
                match created {
                    Some(_) => summary.created += 1,
                    None => summary.existing += 1,
                }
            }
        }
        tx.commit().await?;

        info!(
            "Opened leave year {}: {} balances created, {} already present",
            year, summary.created, summary.existing
        );
        Ok(summary)
    }

    /// Move approved leaves to in progress or completed according to `today`.
    #[instrument(skip(self, actor), fields(actor = %actor.user_id))]
    pub async fn refresh_statuses(&self, actor: &Actor, today: NaiveDate) -> HrResult<usize> {
        actor.require_hr()?;

        let mut tx = self.db.pool().begin().await?;
        let mut changed = 0;
        for leave in LeaveRepository::leaves_to_refresh(&mut *tx, today).await? {
            let next = ledger::effective_status(&leave, today);
            if next != leave.status {
                LeaveRepository::set_status(&mut *tx, leave.id, next, None, None, None).await?;
                changed += 1;
            }
        }
        tx.commit().await?;

        if changed > 0 {
            info!("Refreshed {} leave statuses as of {}", changed, today);
        }
        Ok(changed)
    }

    pub async fn balances_for_person(
        &self,
        actor: &Actor,
        person_id: i64,
        year: Option<i32>,
    ) -> HrResult<Vec<BalanceSummary>> {
        actor.require_self_or_hr(person_id, "view leave balances")?;
        let mut conn = self.db.pool().acquire().await?;
        LeaveRepository::ensure_person(&mut *conn, person_id).await?;
        let balances = LeaveRepository::balances_for_person(&mut *conn, person_id, year).await?;
        Ok(balances.into_iter().map(BalanceSummary::from).collect())
    }

    pub async fn leaves_for_person(&self, actor: &Actor, person_id: i64) -> HrResult<Vec<Leave>> {
        actor.require_self_or_hr(person_id, "view leaves")?;
        let mut conn = self.db.pool().acquire().await?;
        LeaveRepository::ensure_person(&mut *conn, person_id).await?;
        LeaveRepository::leaves_for_person(&mut *conn, person_id).await
    }
}

/// Opening balance for a new year: the leave type's allocation plus what
/// carries over from `year - 1`.
async fn opening_balance(
    conn: &mut SqliteConnection,
    person_id: i64,
    leave_type: &LeaveType,
    year: i32,
) -> HrResult<Option<LeaveBalance>> {
    let carried = LeaveRepository::find_balance(conn, person_id, leave_type.id, year - 1)
        .await?
        .map(|previous| ledger::carry_over(&previous, leave_type.max_carry_over_days))
        .unwrap_or(0.0);
    LeaveRepository::insert_balance(
        conn,
        person_id,
        leave_type.id,
        year,
        leave_type.default_days_per_year,
        carried,
    )
    .await
}

/// The balance row for the key, opened with carry-over when missing.
async fn balance_or_default(
    conn: &mut SqliteConnection,
    person_id: i64,
    leave_type: &LeaveType,
    year: i32,
) -> HrResult<LeaveBalance> {
    if let Some(existing) = LeaveRepository::find_balance(conn, person_id, leave_type.id, year).await? {
        return Ok(existing);
    }
    if let Some(created) = opening_balance(conn, person_id, leave_type, year).await? {
        info!(
            "Opened {} balance for person {} leave type {} ({} carried over)",
            year, person_id, leave_type.id, created.carried_over_days
        );
        return Ok(created);
    }
    LeaveRepository::find_balance(conn, person_id, leave_type.id, year)
        .await?
        .ok_or_else(|| HrError::Conflict("leave balance disappeared during request".into()))
}

fn check_year(year: i32) -> HrResult<()> {
    if !(MIN_BALANCE_YEAR..=MAX_BALANCE_YEAR).contains(&year) {
        return Err(HrError::validation(
            "year",
            format!("must be between {} and {}", MIN_BALANCE_YEAR, MAX_BALANCE_YEAR),
        ));
    }
    Ok(())
}
