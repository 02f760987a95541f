// src/web/handlers/person_handlers.rs
use rocket::serde::json::Json;
use rocket::State;
use tracing::info;

use crate::auth::AuthenticatedUser;
use crate::core::Database;
use crate::error::HrError;
use crate::models::person::{NewPerson, NewQualification, NewSkillTemplate, PersonSkillInput};
use crate::models::{Person, PersonProfile, PersonSkill, Qualification, Role, SkillTemplate};
use crate::repository::{PersonRepository, SkillRepository};
use crate::web::handlers::OrApiError;
use crate::web::types::*;

const PERSON_READERS: &[Role] = &[Role::Admin, Role::HrManager, Role::Recruiter];

pub async fn list_persons_handler(
    active: Option<bool>,
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<Vec<Person>> {
    auth.actor.require_any(PERSON_READERS, "list persons").or_api(&None)?;
    let persons = PersonRepository::new(db.pool())
        .list(active.unwrap_or(false))
        .await
        .or_api(&None)?;
    Ok(Json(DataResponse::success(
        format!("{} persons", persons.len()),
        persons,
        None,
    )))
}

pub async fn get_person_handler(
    id: i64,
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<PersonProfile> {
    let actor = &auth.actor;
    if !actor.can_act_for(id) && !actor.has_any(PERSON_READERS) {
        return Err(HrError::Forbidden(format!("{} may not view person {}", actor.user_id, id)).into());
    }
    let profile = PersonRepository::new(db.pool())
        .load_profile(id)
        .await
        .or_api(&None)?;
    Ok(Json(DataResponse::success(
        profile.person.full_name(),
        profile,
        None,
    )))
}

pub async fn create_person_handler(
    request: Json<StandardRequest<NewPerson>>,
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<Person> {
    let conversation_id = request.conversation_id();
    auth.actor.require_hr().or_api(&conversation_id)?;

    let person = PersonRepository::new(db.pool())
        .create(&request.data)
        .await
        .or_api(&conversation_id)?;
    info!("Person {} created by {}", person.id, auth.actor.user_id);
    Ok(Json(DataResponse::success(
        format!("Person {} created", person.full_name()),
        person,
        conversation_id,
    )))
}

pub async fn update_person_handler(
    id: i64,
    request: Json<StandardRequest<NewPerson>>,
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<Person> {
    let conversation_id = request.conversation_id();
    auth.actor.require_hr().or_api(&conversation_id)?;

    let person = PersonRepository::new(db.pool())
        .update(id, &request.data)
        .await
        .or_api(&conversation_id)?;
    Ok(Json(DataResponse::success(
        format!("Person {} updated", person.full_name()),
        person,
        conversation_id,
    )))
}

pub async fn delete_person_handler(
    id: i64,
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> ActionResult {
    auth.actor.require_hr().or_api(&None)?;
    PersonRepository::new(db.pool()).delete(id).await.or_api(&None)?;
    info!("Person {} deleted by {}", id, auth.actor.user_id);
    Ok(Json(ActionResponse::success(
        format!("Person {} deleted", id),
        "delete_person".to_string(),
        None,
    )))
}

pub async fn upsert_person_skill_handler(
    id: i64,
    request: Json<StandardRequest<PersonSkillInput>>,
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<PersonSkill> {
    let conversation_id = request.conversation_id();
    auth.actor.require_hr().or_api(&conversation_id)?;

    let skill = PersonRepository::new(db.pool())
        .upsert_skill(id, &request.data)
        .await
        .or_api(&conversation_id)?;
    Ok(Json(DataResponse::success(
        format!("Skill {} set to level {}", skill.skill_template_id, skill.level),
        skill,
        conversation_id,
    )))
}

pub async fn remove_person_skill_handler(
    id: i64,
    skill_id: i64,
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> ActionResult {
    auth.actor.require_hr().or_api(&None)?;
    PersonRepository::new(db.pool())
        .remove_skill(id, skill_id)
        .await
        .or_api(&None)?;
    Ok(Json(ActionResponse::success(
        format!("Skill {} removed from person {}", skill_id, id),
        "remove_skill".to_string(),
        None,
    )))
}

pub async fn add_qualification_handler(
    id: i64,
    request: Json<StandardRequest<NewQualification>>,
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<Qualification> {
    let conversation_id = request.conversation_id();
    auth.actor.require_hr().or_api(&conversation_id)?;

    let qualification = PersonRepository::new(db.pool())
        .add_qualification(id, &request.data)
        .await
        .or_api(&conversation_id)?;
    Ok(Json(DataResponse::success(
        format!("Qualification '{}' added", qualification.name),
        qualification,
        conversation_id,
    )))
}

// ===== Skill templates =====

pub async fn list_skills_handler(
    _auth: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<Vec<SkillTemplate>> {
    let skills = SkillRepository::new(db.pool()).list().await.or_api(&None)?;
    Ok(Json(DataResponse::success(
        format!("{} skills", skills.len()),
        skills,
        None,
    )))
}

pub async fn create_skill_handler(
    request: Json<StandardRequest<NewSkillTemplate>>,
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<SkillTemplate> {
    let conversation_id = request.conversation_id();
    auth.actor.require_hr().or_api(&conversation_id)?;

    let skill = SkillRepository::new(db.pool())
        .create(&request.data)
        .await
        .or_api(&conversation_id)?;
    Ok(Json(DataResponse::success(
        format!("Skill '{}' created", skill.name),
        skill,
        conversation_id,
    )))
}
