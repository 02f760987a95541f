// src/web/handlers/leave_handlers.rs
use chrono::Utc;
use rocket::serde::json::Json;
use rocket::State;

use crate::auth::AuthenticatedUser;
use crate::core::Database;
use crate::leave::{BalanceSummary, LeaveService, OpenYearSummary};
use crate::models::leave::{BalanceAdjustment, LeaveRequest, NewLeaveType};
use crate::models::{Leave, LeaveType};
use crate::repository::LeaveTypeRepository;
use crate::web::handlers::OrApiError;
use crate::web::types::*;

pub async fn list_leave_types_handler(
    _auth: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<Vec<LeaveType>> {
    let types = LeaveTypeRepository::new(db.pool())
        .list(false)
        .await
        .or_api(&None)?;
    Ok(Json(DataResponse::success(
        format!("{} leave types", types.len()),
        types,
        None,
    )))
}

pub async fn create_leave_type_handler(
    request: Json<StandardRequest<NewLeaveType>>,
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<LeaveType> {
    let conversation_id = request.conversation_id();
    auth.actor.require_hr().or_api(&conversation_id)?;

    let leave_type = LeaveTypeRepository::new(db.pool())
        .create(&request.data)
        .await
        .or_api(&conversation_id)?;
    Ok(Json(DataResponse::success(
        format!("Leave type '{}' created", leave_type.name),
        leave_type,
        conversation_id,
    )))
}

pub async fn request_leave_handler(
    request: Json<StandardRequest<LeaveRequest>>,
    auth: AuthenticatedUser,
    leaves: &State<LeaveService>,
) -> ApiResult<Leave> {
    let conversation_id = request.conversation_id();
    let leave = leaves
        .request_leave(&auth.actor, &request.data)
        .await
        .or_api(&conversation_id)?;
    Ok(Json(DataResponse::success(
        format!(
            "Leave requested: {} days from {} to {}",
            leave.total_days, leave.start_date, leave.end_date
        ),
        leave,
        conversation_id,
    )))
}

pub async fn approve_leave_handler(
    id: i64,
    request: Json<StandardRequest<DecisionRequest>>,
    auth: AuthenticatedUser,
    leaves: &State<LeaveService>,
) -> ApiResult<Leave> {
    let conversation_id = request.conversation_id();
    let today = Utc::now().date_naive();
    let leave = leaves
        .approve(&auth.actor, id, request.data.note.as_deref(), today)
        .await
        .or_api(&conversation_id)?;
    Ok(Json(DataResponse::success(
        format!("Leave {} is now {}", leave.id, leave.status),
        leave,
        conversation_id,
    )))
}

pub async fn reject_leave_handler(
    id: i64,
    request: Json<StandardRequest<DecisionRequest>>,
    auth: AuthenticatedUser,
    leaves: &State<LeaveService>,
) -> ApiResult<Leave> {
    let conversation_id = request.conversation_id();
    let today = Utc::now().date_naive();
    let leave = leaves
        .reject(&auth.actor, id, request.data.note.as_deref(), today)
        .await
        .or_api(&conversation_id)?;
    Ok(Json(DataResponse::success(
        format!("Leave {} rejected", leave.id),
        leave,
        conversation_id,
    )))
}

pub async fn cancel_leave_handler(
    id: i64,
    request: Json<StandardRequest<DecisionRequest>>,
    auth: AuthenticatedUser,
    leaves: &State<LeaveService>,
) -> ApiResult<Leave> {
    let conversation_id = request.conversation_id();
    let today = Utc::now().date_naive();
    let leave = leaves
        .cancel(&auth.actor, id, request.data.note.as_deref(), today)
        .await
        .or_api(&conversation_id)?;
    Ok(Json(DataResponse::success(
        format!("Leave {} cancelled", leave.id),
        leave,
        conversation_id,
    )))
}

pub async fn person_leaves_handler(
    id: i64,
    auth: AuthenticatedUser,
    leaves: &State<LeaveService>,
) -> ApiResult<Vec<Leave>> {
    let list = leaves.leaves_for_person(&auth.actor, id).await.or_api(&None)?;
    Ok(Json(DataResponse::success(
        format!("{} leaves", list.len()),
        list,
        None,
    )))
}

pub async fn person_balances_handler(
    id: i64,
    year: Option<i32>,
    auth: AuthenticatedUser,
    leaves: &State<LeaveService>,
) -> ApiResult<Vec<BalanceSummary>> {
    let balances = leaves
        .balances_for_person(&auth.actor, id, year)
        .await
        .or_api(&None)?;
    Ok(Json(DataResponse::success(
        format!("{} balances", balances.len()),
        balances,
        None,
    )))
}

pub async fn adjust_balance_handler(
    id: i64,
    request: Json<StandardRequest<BalanceAdjustment>>,
    auth: AuthenticatedUser,
    leaves: &State<LeaveService>,
) -> ApiResult<BalanceSummary> {
    let conversation_id = request.conversation_id();
    let balance = leaves
        .adjust_balance(&auth.actor, id, &request.data)
        .await
        .or_api(&conversation_id)?;
    Ok(Json(DataResponse::success(
        format!("{} days now available", balance.available_days),
        balance,
        conversation_id,
    )))
}

pub async fn open_leave_year_handler(
    year: i32,
    auth: AuthenticatedUser,
    leaves: &State<LeaveService>,
) -> ApiResult<OpenYearSummary> {
    let summary = leaves.open_year(&auth.actor, year).await.or_api(&None)?;
    Ok(Json(DataResponse::success(
        format!("{} balances created for {}", summary.created, summary.year),
        summary,
        None,
    )))
}

pub async fn refresh_leave_statuses_handler(
    auth: AuthenticatedUser,
    leaves: &State<LeaveService>,
) -> ActionResult {
    let today = Utc::now().date_naive();
    let changed = leaves
        .refresh_statuses(&auth.actor, today)
        .await
        .or_api(&None)?;
    Ok(Json(ActionResponse::success(
        format!("{} leave statuses updated", changed),
        "refresh_leave_statuses".to_string(),
        None,
    )))
}
