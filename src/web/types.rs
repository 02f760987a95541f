// src/web/types.rs
use rocket::http::Status;
use rocket::response::{self, Responder};
use rocket::serde::json::Json;
use rocket::serde::{Deserialize, Serialize};
use rocket::{Request, Response};
use tracing::error;

use crate::error::HrError;
use crate::models::Role;

// ===== Response envelopes =====

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct DataResponse<T> {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub message: String,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_format: Option<DisplayFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct ActionResponse {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub message: String,
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct StandardErrorResponse {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub error: String,
    pub error_code: String,
    pub suggestions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(crate = "rocket::serde", rename_all = "lowercase")]
pub enum ResponseType {
    Data,
    Action,
    Error,
}

/// Rendering hint for clients: one section per score dimension.
#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct DisplayFormat {
    #[serde(rename = "type")]
    pub format_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sections: Option<Vec<DisplaySection>>,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct DisplaySection {
    pub title: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points: Option<Vec<String>>,
}

// ===== Requests =====

#[derive(Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct StandardRequest<T> {
    #[serde(flatten)]
    pub data: T,
    pub conversation_id: Option<String>,
}

pub trait WithConversationId {
    fn conversation_id(&self) -> Option<String>;
}

impl<T> WithConversationId for StandardRequest<T> {
    fn conversation_id(&self) -> Option<String> {
        self.conversation_id.clone()
    }
}

#[derive(Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct DecisionRequest {
    pub note: Option<String>,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct UserInfo {
    pub user_id: String,
    pub name: Option<String>,
    pub person_id: Option<i64>,
    pub roles: Vec<Role>,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct HealthInfo {
    pub status: &'static str,
    pub database: &'static str,
    pub version: &'static str,
}

// ===== Constructors =====

impl<T> DataResponse<T> {
    pub fn success(message: String, data: T, conversation_id: Option<String>) -> Self {
        Self {
            response_type: ResponseType::Data,
            success: true,
            message,
            data,
            display_format: None,
            conversation_id,
        }
    }

    pub fn with_display_format(mut self, display_format: DisplayFormat) -> Self {
        self.display_format = Some(display_format);
        self
    }
}

impl ActionResponse {
    pub fn success(message: String, action: String, conversation_id: Option<String>) -> Self {
        Self {
            response_type: ResponseType::Action,
            success: true,
            message,
            action,
            conversation_id,
        }
    }
}

impl StandardErrorResponse {
    pub fn new(
        error: String,
        error_code: String,
        suggestions: Vec<String>,
        conversation_id: Option<String>,
    ) -> Self {
        Self {
            response_type: ResponseType::Error,
            success: false,
            error,
            error_code,
            suggestions,
            conversation_id,
        }
    }
}

// ===== Errors =====

/// Error response with an HTTP status and the standard error body.
#[derive(Debug)]
pub struct ApiError {
    pub status: Status,
    pub body: StandardErrorResponse,
}

impl ApiError {
    pub fn from_hr(err: HrError, conversation_id: Option<String>) -> Self {
        let status = match &err {
            HrError::Validation { .. } => Status::UnprocessableEntity,
            HrError::NotFound { .. } => Status::NotFound,
            HrError::Conflict(_)
            | HrError::InvalidTransition { .. }
            | HrError::InsufficientBalance { .. } => Status::Conflict,
            HrError::Forbidden(_) => Status::Forbidden,
            HrError::Database(_) => Status::InternalServerError,
        };

        let suggestions = match &err {
            HrError::Validation { field, .. } => vec![format!("Check the '{}' field", field)],
            HrError::NotFound { entity, .. } => vec![format!("Verify the {} id", entity)],
            HrError::InsufficientBalance { .. } => {
                vec!["Request fewer days or ask HR for a balance adjustment".to_string()]
            }
            HrError::InvalidTransition { entity, .. } => {
                vec![format!("Reload the {} to see its current status", entity)]
            }
            HrError::Forbidden(_) => vec!["Ask an administrator for the required role".to_string()],
            HrError::Conflict(_) => vec!["The record conflicts with existing data".to_string()],
            HrError::Database(_) => vec!["Try again in a few moments".to_string()],
        };

        let message = match &err {
            HrError::Database(db_err) => {
                error!("Database failure: {}", db_err);
                "Database operation failed".to_string()
            }
            other => other.to_string(),
        };

        Self {
            status,
            body: StandardErrorResponse::new(
                message,
                err.code().to_string(),
                suggestions,
                conversation_id,
            ),
        }
    }
}

impl From<HrError> for ApiError {
    fn from(err: HrError) -> Self {
        ApiError::from_hr(err, None)
    }
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, request: &'r Request<'_>) -> response::Result<'static> {
        Response::build_from(Json(self.body).respond_to(request)?)
            .status(self.status)
            .ok()
    }
}

pub type ApiResult<T> = Result<Json<DataResponse<T>>, ApiError>;
pub type ActionResult = Result<Json<ActionResponse>, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hr_errors_map_to_statuses() {
        let cases = [
            (HrError::validation("email", "bad"), Status::UnprocessableEntity, "VALIDATION_ERROR"),
            (HrError::not_found("person", 3), Status::NotFound, "NOT_FOUND"),
            (
                HrError::InsufficientBalance {
                    requested: 5.0,
                    available: 2.0,
                },
                Status::Conflict,
                "INSUFFICIENT_BALANCE",
            ),
            (HrError::Forbidden("no".into()), Status::Forbidden, "FORBIDDEN"),
        ];
        for (err, status, code) in cases {
            let api = ApiError::from(err);
            assert_eq!(api.status, status);
            assert_eq!(api.body.error_code, code);
            assert!(!api.body.success);
        }
    }
}
