// src/web/handlers/staff_handlers.rs
use rocket::serde::json::Json;
use rocket::State;

use crate::auth::AuthenticatedUser;
use crate::core::Database;
use crate::models::staff::{NewPayrollRecord, NewPerformanceReview};
use crate::models::{PayrollRecord, PerformanceReview};
use crate::repository::StaffRecordRepository;
use crate::web::handlers::OrApiError;
use crate::web::types::*;

pub async fn person_reviews_handler(
    id: i64,
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<Vec<PerformanceReview>> {
    auth.actor
        .require_self_or_hr(id, "view performance reviews")
        .or_api(&None)?;
    let reviews = StaffRecordRepository::new(db.pool())
        .reviews_for_person(id)
        .await
        .or_api(&None)?;
    Ok(Json(DataResponse::success(
        format!("{} performance reviews", reviews.len()),
        reviews,
        None,
    )))
}

pub async fn add_review_handler(
    id: i64,
    request: Json<StandardRequest<NewPerformanceReview>>,
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<PerformanceReview> {
    let conversation_id = request.conversation_id();
    auth.actor.require_hr().or_api(&conversation_id)?;

    let review = StaffRecordRepository::new(db.pool())
        .add_review(id, &auth.actor.user_id, &request.data)
        .await
        .or_api(&conversation_id)?;
    Ok(Json(DataResponse::success(
        format!("Review {} recorded with rating {}", review.id, review.rating),
        review,
        conversation_id,
    )))
}

pub async fn person_payroll_handler(
    id: i64,
    year: Option<i32>,
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<Vec<PayrollRecord>> {
    auth.actor.require_self_or_hr(id, "view payroll").or_api(&None)?;
    let records = StaffRecordRepository::new(db.pool())
        .payroll_for_person(id, year)
        .await
        .or_api(&None)?;
    Ok(Json(DataResponse::success(
        format!("{} payroll records", records.len()),
        records,
        None,
    )))
}

pub async fn add_payroll_handler(
    id: i64,
    request: Json<StandardRequest<NewPayrollRecord>>,
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<PayrollRecord> {
    let conversation_id = request.conversation_id();
    auth.actor.require_hr().or_api(&conversation_id)?;

    let record = StaffRecordRepository::new(db.pool())
        .add_payroll(id, &request.data)
        .await
        .or_api(&conversation_id)?;
    Ok(Json(DataResponse::success(
        format!(
            "Payroll {}-{:02} recorded, net {:.2}",
            record.year, record.month, record.net_pay
        ),
        record,
        conversation_id,
    )))
}
