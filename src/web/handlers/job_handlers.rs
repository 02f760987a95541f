// src/web/handlers/job_handlers.rs
use rocket::serde::json::Json;
use rocket::State;
use tracing::info;

use crate::auth::AuthenticatedUser;
use crate::core::Database;
use crate::models::job::{
    JobDefinitionQualificationInput, JobRequiredSkillInput, NewJobDefinition,
};
use crate::models::{JobDefinition, JobDefinitionProfile, JobDefinitionQualification, JobRequiredSkill};
use crate::repository::JobDefinitionRepository;
use crate::web::handlers::OrApiError;
use crate::web::types::*;

pub async fn list_job_definitions_handler(
    active: Option<bool>,
    _auth: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<Vec<JobDefinition>> {
    let definitions = JobDefinitionRepository::new(db.pool())
        .list(active.unwrap_or(true))
        .await
        .or_api(&None)?;
    Ok(Json(DataResponse::success(
        format!("{} job definitions", definitions.len()),
        definitions,
        None,
    )))
}

pub async fn get_job_definition_handler(
    id: i64,
    _auth: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<JobDefinitionProfile> {
    let profile = JobDefinitionRepository::new(db.pool())
        .load_profile(id)
        .await
        .or_api(&None)?;
    Ok(Json(DataResponse::success(
        format!(
            "{} v{} with {} skill requirements",
            profile.definition.title,
            profile.definition.version,
            profile.required_skills.len()
        ),
        profile,
        None,
    )))
}

pub async fn create_job_definition_handler(
    request: Json<StandardRequest<NewJobDefinition>>,
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<JobDefinition> {
    let conversation_id = request.conversation_id();
    auth.actor.require_hr().or_api(&conversation_id)?;

    let definition = JobDefinitionRepository::new(db.pool())
        .create(&request.data)
        .await
        .or_api(&conversation_id)?;
    info!(
        "Job definition {} created by {}",
        definition.id, auth.actor.user_id
    );
    Ok(Json(
        DataResponse::success(
            format!("Job definition '{}' created", definition.title),
            definition,
            conversation_id,
        ),
    ))
}

pub async fn deactivate_job_definition_handler(
    id: i64,
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> ActionResult {
    auth.actor.require_hr().or_api(&None)?;
    JobDefinitionRepository::new(db.pool())
        .deactivate(id)
        .await
        .or_api(&None)?;
    info!("Job definition {} deactivated by {}", id, auth.actor.user_id);
    Ok(Json(ActionResponse::success(
        format!("Job definition {} deactivated", id),
        "deactivate_job_definition".to_string(),
        None,
    )))
}

pub async fn upsert_job_skill_handler(
    id: i64,
    request: Json<StandardRequest<JobRequiredSkillInput>>,
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<JobRequiredSkill> {
    let conversation_id = request.conversation_id();
    auth.actor.require_hr().or_api(&conversation_id)?;

    let requirement = JobDefinitionRepository::new(db.pool())
        .upsert_required_skill(id, &request.data)
        .await
        .or_api(&conversation_id)?;
    Ok(Json(DataResponse::success(
        format!(
            "'{}' required at level {}",
            requirement.skill_name, requirement.min_level
        ),
        requirement,
        conversation_id,
    )))
}

pub async fn add_job_qualification_handler(
    id: i64,
    request: Json<StandardRequest<JobDefinitionQualificationInput>>,
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<JobDefinitionQualification> {
    let conversation_id = request.conversation_id();
    auth.actor.require_hr().or_api(&conversation_id)?;

    let qualification = JobDefinitionRepository::new(db.pool())
        .add_qualification(id, &request.data)
        .await
        .or_api(&conversation_id)?;
    Ok(Json(DataResponse::success(
        format!("Qualification '{}' added", qualification.name),
        qualification,
        conversation_id,
    )))
}
