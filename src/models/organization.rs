// src/models/organization.rs
use crate::error::{HrError, HrResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Department {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewDepartment {
    pub name: String,
    pub description: Option<String>,
}

impl NewDepartment {
    pub fn validate(&self) -> HrResult<()> {
        if self.name.trim().is_empty() {
            return Err(HrError::validation("name", "department name is required"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Position {
    pub id: i64,
    pub title: String,
    pub department_id: i64,
    pub job_definition_id: Option<i64>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewPosition {
    pub title: String,
    pub department_id: i64,
    pub job_definition_id: Option<i64>,
}

impl NewPosition {
    pub fn validate(&self) -> HrResult<()> {
        if self.title.trim().is_empty() {
            return Err(HrError::validation("title", "position title is required"));
        }
        Ok(())
    }
}
