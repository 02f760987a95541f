// src/web/handlers/system_handlers.rs
use rocket::serde::json::Json;
use rocket::State;
use tracing::{info, warn};

use crate::auth::{AuthenticatedUser, OptionalAuth};
use crate::core::Database;
use crate::web::types::*;

pub async fn health_handler(auth: OptionalAuth, db: &State<Database>) -> Json<DataResponse<HealthInfo>> {
    match &auth.user {
        Some(user) => info!("Health check by {}", user.actor.user_id),
        None => info!("Health check by anonymous user"),
    }

    let database = match db.health_check().await {
        Ok(()) => "ok",
        Err(e) => {
            warn!("Database health check failed: {}", e);
            "unavailable"
        }
    };
    let status = if database == "ok" { "ok" } else { "degraded" };

    Json(DataResponse::success(
        format!("Service is {}", status),
        HealthInfo {
            status,
            database,
            version: env!("CARGO_PKG_VERSION"),
        },
        None,
    ))
}

pub async fn get_current_user_handler(auth: AuthenticatedUser) -> Json<DataResponse<UserInfo>> {
    let actor = auth.actor;
    Json(DataResponse::success(
        format!("Authenticated as {}", actor.user_id),
        UserInfo {
            user_id: actor.user_id,
            name: actor.name,
            person_id: actor.person_id,
            roles: actor.roles,
        },
        None,
    ))
}
