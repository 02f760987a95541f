// src/leave/ledger.rs
//! Balance arithmetic and leave status rules, free of I/O. The service loads
//! rows, applies these and writes the rows back in one transaction.

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::{HrError, HrResult};
use crate::models::leave::BalanceAdjustment;
use crate::models::{Leave, LeaveBalance, LeaveStatus};

const EPSILON: f64 = 1e-9;

/// Status an approved leave should carry on `today`.
pub fn approved_status_on(start: NaiveDate, end: NaiveDate, today: NaiveDate) -> LeaveStatus {
    if today < start {
        LeaveStatus::Approved
    } else if today <= end {
        LeaveStatus::InProgress
    } else {
        LeaveStatus::Completed
    }
}

/// Date-driven status of a stored leave. Only approved leaves move on their own.
pub fn effective_status(leave: &Leave, today: NaiveDate) -> LeaveStatus {
    match leave.status {
        LeaveStatus::Approved | LeaveStatus::InProgress => {
            approved_status_on(leave.start_date, leave.end_date, today)
        }
        other => other,
    }
}

/// New request: the days go to pending. No overdraft.
pub fn reserve(balance: &mut LeaveBalance, days: f64) -> HrResult<()> {
    let available = balance.available_days();
    if days > available + EPSILON {
        return Err(HrError::InsufficientBalance {
            requested: days,
            available: snap(available),
        });
    }
    balance.pending_days = snap(balance.pending_days + days);
    Ok(())
}

/// Approval: pending days become used days.
pub fn commit(balance: &mut LeaveBalance, days: f64) -> HrResult<()> {
    balance.pending_days = decrease(balance.pending_days, days, "pending_days")?;
    balance.used_days = snap(balance.used_days + days);
    Ok(())
}

/// Rejection or cancellation of a pending request.
pub fn release(balance: &mut LeaveBalance, days: f64) -> HrResult<()> {
    balance.pending_days = decrease(balance.pending_days, days, "pending_days")?;
    Ok(())
}

/// Cancellation of an approved leave that has not started.
pub fn refund(balance: &mut LeaveBalance, days: f64) -> HrResult<()> {
    balance.used_days = decrease(balance.used_days, days, "used_days")?;
    Ok(())
}

/// Manual adjustment. Rejected when it would leave the balance negative.
pub fn adjust(
    balance: &mut LeaveBalance,
    adjustment: &BalanceAdjustment,
    at: DateTime<Utc>,
) -> HrResult<()> {
    adjustment.validate()?;
    let adjusted = snap(balance.manual_adjustment + adjustment.days);
    let available = balance.available_days() - balance.manual_adjustment + adjusted;
    if available < -EPSILON {
        return Err(HrError::InsufficientBalance {
            requested: -adjustment.days,
            available: snap(balance.available_days()),
        });
    }
    balance.manual_adjustment = adjusted;
    balance.adjustment_reason = Some(adjustment.reason.trim().to_string());
    balance.adjustment_date = Some(at);
    Ok(())
}

/// Days carried into the next year: what is left, capped by the leave type.
pub fn carry_over(previous: &LeaveBalance, max_carry_over_days: f64) -> f64 {
    snap(previous.available_days().clamp(0.0, max_carry_over_days.max(0.0)))
}

/// Status a leave moves to when `action` is applied, or an invalid transition.
pub fn transition(
    leave: &Leave,
    action: LeaveAction,
    today: NaiveDate,
) -> HrResult<LeaveStatus> {
    let current = effective_status(leave, today);
    let next = match (action, current) {
        (LeaveAction::Approve, LeaveStatus::Pending) => {
            approved_status_on(leave.start_date, leave.end_date, today)
        }
        (LeaveAction::Reject, LeaveStatus::Pending) => LeaveStatus::Rejected,
        (LeaveAction::Cancel, LeaveStatus::Pending | LeaveStatus::Approved) => LeaveStatus::Cancelled,
        (action, from) => {
            return Err(HrError::InvalidTransition {
                entity: "leave",
                action: action.verb(),
                from: from.as_str().to_string(),
            })
        }
    };
    Ok(next)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveAction {
    Approve,
    Reject,
    Cancel,
}

impl LeaveAction {
    pub fn verb(self) -> &'static str {
        match self {
            LeaveAction::Approve => "approve",
            LeaveAction::Reject => "reject",
            LeaveAction::Cancel => "cancel",
        }
    }
}

fn decrease(current: f64, days: f64, field: &'static str) -> HrResult<f64> {
    let next = current - days;
    if next < -EPSILON {
        return Err(HrError::Conflict(format!(
            "{} would become negative ({} - {})",
            field, current, days
        )));
    }
    Ok(snap(next))
}

fn snap(value: f64) -> f64 {
    if value.abs() < EPSILON {
        0.0
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn balance(allocated: f64) -> LeaveBalance {
        LeaveBalance {
            id: 1,
            person_id: 1,
            leave_type_id: 1,
            year: 2024,
            allocated_days: allocated,
            used_days: 0.0,
            pending_days: 0.0,
            carried_over_days: 0.0,
            manual_adjustment: 0.0,
            adjustment_reason: None,
            adjustment_date: None,
        }
    }

    fn date(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, month, day).unwrap()
    }

    fn leave(status: LeaveStatus, start: NaiveDate, end: NaiveDate) -> Leave {
        Leave {
            id: 1,
            person_id: 1,
            leave_type_id: 1,
            start_date: start,
            end_date: end,
            total_days: 3.0,
            status,
            reason: None,
            decided_by: None,
            decided_at: None,
            decision_note: None,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn request_approve_cycle() {
        let mut b = balance(20.0);
        reserve(&mut b, 5.0).unwrap();
        assert_eq!(b.pending_days, 5.0);
        assert_eq!(b.available_days(), 15.0);

        commit(&mut b, 5.0).unwrap();
        assert_eq!(b.pending_days, 0.0);
        assert_eq!(b.used_days, 5.0);
        assert_eq!(b.available_days(), 15.0);
    }

    #[test]
    fn overdraft_is_refused() {
        let mut b = balance(3.0);
        let err = reserve(&mut b, 3.5).unwrap_err();
        assert!(matches!(err, HrError::InsufficientBalance { available, .. } if available == 3.0));
        assert_eq!(b.pending_days, 0.0);
    }

    #[test]
    fn release_and_refund_restore_availability() {
        let mut b = balance(10.0);
        reserve(&mut b, 4.0).unwrap();
        release(&mut b, 4.0).unwrap();
        assert_eq!(b.available_days(), 10.0);

        reserve(&mut b, 2.0).unwrap();
        commit(&mut b, 2.0).unwrap();
        refund(&mut b, 2.0).unwrap();
        assert_eq!(b.used_days, 0.0);
        assert_eq!(b.available_days(), 10.0);
    }

    #[test]
    fn releasing_more_than_pending_is_a_conflict() {
        let mut b = balance(10.0);
        reserve(&mut b, 1.0).unwrap();
        assert!(matches!(release(&mut b, 2.0), Err(HrError::Conflict(_))));
    }

    #[test]
    fn adjustment_cannot_make_balance_negative() {
        let mut b = balance(5.0);
        reserve(&mut b, 4.0).unwrap();
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();

        let too_much = BalanceAdjustment {
            days: -2.0,
            reason: "correction".into(),
        };
        assert!(adjust(&mut b, &too_much, at).is_err());
        assert_eq!(b.manual_adjustment, 0.0);

        let bonus = BalanceAdjustment {
            days: 1.5,
            reason: "overtime compensation".into(),
        };
        adjust(&mut b, &bonus, at).unwrap();
        assert_eq!(b.available_days(), 2.5);
        assert_eq!(b.adjustment_reason.as_deref(), Some("overtime compensation"));
        assert_eq!(b.adjustment_date, Some(at));
    }

    #[test]
    fn carry_over_is_capped() {
        let mut previous = balance(25.0);
        previous.used_days = 10.0;
        assert_eq!(carry_over(&previous, 5.0), 5.0);
        assert_eq!(carry_over(&previous, 40.0), 15.0);
        previous.used_days = 25.0;
        assert_eq!(carry_over(&previous, 5.0), 0.0);
    }

    #[test]
    fn approved_status_follows_dates() {
        let (start, end) = (date(7, 1), date(7, 5));
        assert_eq!(approved_status_on(start, end, date(6, 30)), LeaveStatus::Approved);
        assert_eq!(approved_status_on(start, end, date(7, 1)), LeaveStatus::InProgress);
        assert_eq!(approved_status_on(start, end, date(7, 5)), LeaveStatus::InProgress);
        assert_eq!(approved_status_on(start, end, date(7, 6)), LeaveStatus::Completed);
    }

    #[test]
    fn transitions() {
        let (start, end) = (date(7, 1), date(7, 5));
        let pending = leave(LeaveStatus::Pending, start, end);
        assert_eq!(
            transition(&pending, LeaveAction::Approve, date(6, 1)).unwrap(),
            LeaveStatus::Approved
        );
        assert_eq!(
            transition(&pending, LeaveAction::Approve, date(7, 10)).unwrap(),
            LeaveStatus::Completed
        );
        assert_eq!(
            transition(&pending, LeaveAction::Reject, date(6, 1)).unwrap(),
            LeaveStatus::Rejected
        );

        let approved = leave(LeaveStatus::Approved, start, end);
        assert_eq!(
            transition(&approved, LeaveAction::Cancel, date(6, 1)).unwrap(),
            LeaveStatus::Cancelled
        );
        // started leaves can no longer be cancelled
        assert!(matches!(
            transition(&approved, LeaveAction::Cancel, date(7, 2)),
            Err(HrError::InvalidTransition { action: "cancel", .. })
        ));
        assert!(transition(&approved, LeaveAction::Reject, date(6, 1)).is_err());

        let rejected = leave(LeaveStatus::Rejected, start, end);
        assert!(transition(&rejected, LeaveAction::Approve, date(6, 1)).is_err());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]

        #[test]
        fn available_never_negative(ops in proptest::collection::vec((0u8..3, 0.5f64..6.0), 1..40)) {
            let mut b = balance(20.0);
            let mut pending: Vec<f64> = Vec::new();
            let mut used = 0.0;
            for (op, days) in ops {
                match op {
                    0 => {
                        if reserve(&mut b, days).is_ok() {
                            pending.push(days);
                        }
                    }
                    1 => {
                        if let Some(days) = pending.pop() {
                            commit(&mut b, days).unwrap();
                            used += days;
                        }
                    }
                    _ => {
                        if let Some(days) = pending.pop() {
                            release(&mut b, days).unwrap();
                        }
                    }
                }
                prop_assert!(b.available_days() >= -1e-9);
                prop_assert!((b.used_days - used).abs() < 1e-6);
                prop_assert!(b.pending_days >= 0.0);
            }
        }
    }
}
