// src/web/handlers/organization_handlers.rs
use rocket::serde::json::Json;
use rocket::State;

use crate::auth::AuthenticatedUser;
use crate::core::Database;
use crate::models::organization::{NewDepartment, NewPosition};
use crate::models::{Department, Position};
use crate::repository::OrganizationRepository;
use crate::web::handlers::OrApiError;
use crate::web::types::*;

pub async fn list_departments_handler(
    _auth: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<Vec<Department>> {
    let departments = OrganizationRepository::new(db.pool())
        .list_departments()
        .await
        .or_api(&None)?;
    Ok(Json(DataResponse::success(
        format!("{} departments", departments.len()),
        departments,
        None,
    )))
}

pub async fn create_department_handler(
    request: Json<StandardRequest<NewDepartment>>,
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<Department> {
    let conversation_id = request.conversation_id();
    auth.actor.require_hr().or_api(&conversation_id)?;

    let department = OrganizationRepository::new(db.pool())
        .create_department(&request.data)
        .await
        .or_api(&conversation_id)?;
    Ok(Json(DataResponse::success(
        format!("Department '{}' created", department.name),
        department,
        conversation_id,
    )))
}

pub async fn list_positions_handler(
    department_id: Option<i64>,
    _auth: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<Vec<Position>> {
    let positions = OrganizationRepository::new(db.pool())
        .list_positions(department_id)
        .await
        .or_api(&None)?;
    Ok(Json(DataResponse::success(
        format!("{} positions", positions.len()),
        positions,
        None,
    )))
}

pub async fn create_position_handler(
    request: Json<StandardRequest<NewPosition>>,
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<Position> {
    let conversation_id = request.conversation_id();
    auth.actor.require_hr().or_api(&conversation_id)?;

    let position = OrganizationRepository::new(db.pool())
        .create_position(&request.data)
        .await
        .or_api(&conversation_id)?;
    Ok(Json(DataResponse::success(
        format!("Position '{}' created", position.title),
        position,
        conversation_id,
    )))
}
