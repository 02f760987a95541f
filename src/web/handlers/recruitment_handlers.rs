// src/web/handlers/recruitment_handlers.rs
use chrono::Utc;
use rocket::serde::json::Json;
use rocket::State;
use tracing::info;

use crate::auth::AuthenticatedUser;
use crate::core::Database;
use crate::models::recruitment::{ApplicationStatusChange, NewApplication, NewJobPosting};
use crate::models::{Application, ApplicationStatus, JobPosting, RankedApplication};
use crate::repository::RecruitmentRepository;
use crate::web::handlers::OrApiError;
use crate::web::types::*;

pub async fn list_job_postings_handler(
    open: Option<bool>,
    _auth: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<Vec<JobPosting>> {
    let postings = RecruitmentRepository::new(db.pool())
        .list_postings(open.unwrap_or(true))
        .await
        .or_api(&None)?;
    Ok(Json(DataResponse::success(
        format!("{} job postings", postings.len()),
        postings,
        None,
    )))
}

pub async fn get_job_posting_handler(
    id: i64,
    _auth: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<JobPosting> {
    let posting = RecruitmentRepository::new(db.pool())
        .find_posting(id)
        .await
        .or_api(&None)?;
    Ok(Json(DataResponse::success(
        format!("Job posting '{}'", posting.title),
        posting,
        None,
    )))
}

pub async fn create_job_posting_handler(
    request: Json<StandardRequest<NewJobPosting>>,
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<JobPosting> {
    let conversation_id = request.conversation_id();
    auth.actor.require_hr().or_api(&conversation_id)?;

    let posting = RecruitmentRepository::new(db.pool())
        .create_posting(&request.data)
        .await
        .or_api(&conversation_id)?;
    info!("Job posting {} created by {}", posting.id, auth.actor.user_id);
    Ok(Json(DataResponse::success(
        format!("Job posting '{}' published", posting.title),
        posting,
        conversation_id,
    )))
}

pub async fn close_job_posting_handler(
    id: i64,
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<JobPosting> {
    auth.actor.require_hr().or_api(&None)?;
    let posting = RecruitmentRepository::new(db.pool())
        .close_posting(id)
        .await
        .or_api(&None)?;
    Ok(Json(DataResponse::success(
        format!("Job posting '{}' closed", posting.title),
        posting,
        None,
    )))
}

pub async fn apply_handler(
    id: i64,
    request: Json<StandardRequest<NewApplication>>,
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<Application> {
    let conversation_id = request.conversation_id();
    auth.actor
        .require_self_or_hr(request.data.person_id, "apply")
        .or_api(&conversation_id)?;

    let today = Utc::now().date_naive();
    let application = RecruitmentRepository::new(db.pool())
        .apply(id, &request.data, today)
        .await
        .or_api(&conversation_id)?;
    Ok(Json(DataResponse::success(
        format!("Application {} submitted", application.id),
        application,
        conversation_id,
    )))
}

pub async fn list_applications_handler(
    id: i64,
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<Vec<RankedApplication>> {
    auth.actor.require_matching().or_api(&None)?;
    let applications = RecruitmentRepository::new(db.pool())
        .ranked_applications(id)
        .await
        .or_api(&None)?;
    Ok(Json(DataResponse::success(
        format!("{} applications", applications.len()),
        applications,
        None,
    )))
}

/// Recruiters drive the pipeline; applicants may only withdraw.
pub async fn change_application_status_handler(
    id: i64,
    request: Json<StandardRequest<ApplicationStatusChange>>,
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<Application> {
    let conversation_id = request.conversation_id();
    let repo = RecruitmentRepository::new(db.pool());
    let next = request.data.status;

    if next == ApplicationStatus::Withdrawn {
        let current = repo.find_application(id).await.or_api(&conversation_id)?;
        auth.actor
            .require_self_or_hr(current.person_id, "withdraw an application")
            .or_api(&conversation_id)?;
    } else {
        auth.actor.require_matching().or_api(&conversation_id)?;
    }

    let application = repo
        .set_application_status(id, next)
        .await
        .or_api(&conversation_id)?;
    info!(
        "Application {} set to {} by {}",
        id, application.status, auth.actor.user_id
    );
    Ok(Json(DataResponse::success(
        format!("Application {} is now {}", id, application.status),
        application,
        conversation_id,
    )))
}
