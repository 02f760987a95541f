// src/repository/organization.rs
use sqlx::SqlitePool;
use tracing::info;

use crate::error::{HrError, HrResult};
use crate::models::organization::{NewDepartment, NewPosition};
use crate::models::{Department, Position};

pub struct OrganizationRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> OrganizationRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list_departments(&self) -> HrResult<Vec<Department>> {
        let departments = sqlx::query_as::<_, Department>(
            "SELECT id, name, description, is_active FROM departments ORDER BY name ASC",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(departments)
    }

    pub async fn create_department(&self, department: &NewDepartment) -> HrResult<Department> {
        department.validate()?;
        let created = sqlx::query_as::<_, Department>(
            r#"
            INSERT INTO departments (name, description, is_active)
            VALUES (?, ?, TRUE)
            RETURNING id, name, description, is_active
            "#,
        )
        .bind(department.name.trim())
        .bind(&department.description)
        .fetch_one(self.pool)
        .await?;

        info!("Created department {} ({})", created.name, created.id);
        Ok(created)
    }

    pub async fn list_positions(&self, department_id: Option<i64>) -> HrResult<Vec<Position>> {
        let positions = sqlx::query_as::<_, Position>(
            r#"
            SELECT id, title, department_id, job_definition_id, is_active
            FROM positions
            WHERE ?1 IS NULL OR department_id = ?1
            ORDER BY title ASC
            "#,
        )
        .bind(department_id)
        .fetch_all(self.pool)
        .await?;
        Ok(positions)
    }

    pub async fn create_position(&self, position: &NewPosition) -> HrResult<Position> {
        position.validate()?;
        let exists: Option<(i64,)> = sqlx::query_as("SELECT id FROM departments WHERE id = ?")
            .bind(position.department_id)
            .fetch_optional(self.pool)
            .await?;
        if exists.is_none() {
            return Err(HrError::not_found("department", position.department_id));
        }

        let created = sqlx::query_as::<_, Position>(
            r#"
            INSERT INTO positions (title, department_id, job_definition_id, is_active)
            VALUES (?, ?, ?, TRUE)
            RETURNING id, title, department_id, job_definition_id, is_active
            "#,
        )
        .bind(position.title.trim())
        .bind(position.department_id)
        .bind(position.job_definition_id)
        .fetch_one(self.pool)
        .await?;

        info!(
            "Created position {} in department {}",
            created.title, created.department_id
        );
        Ok(created)
    }
}
