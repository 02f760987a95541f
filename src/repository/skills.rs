// src/repository/skills.rs
use sqlx::SqlitePool;
use tracing::info;

use crate::error::{HrError, HrResult};
use crate::models::person::NewSkillTemplate;
use crate::models::SkillTemplate;

pub struct SkillRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> SkillRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> HrResult<Vec<SkillTemplate>> {
        let skills = sqlx::query_as::<_, SkillTemplate>(
            "SELECT id, name, category, description FROM skill_templates ORDER BY name ASC",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(skills)
    }

    pub async fn find(&self, id: i64) -> HrResult<SkillTemplate> {
        sqlx::query_as::<_, SkillTemplate>(
            "SELECT id, name, category, description FROM skill_templates WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| HrError::not_found("skill template", id))
    }

    /// Case-insensitive lookup by name
    pub async fn find_by_name(&self, name: &str) -> HrResult<Option<SkillTemplate>> {
        let skill = sqlx::query_as::<_, SkillTemplate>(
            "SELECT id, name, category, description FROM skill_templates WHERE name = ? COLLATE NOCASE",
        )
        .bind(name.trim())
        .fetch_optional(self.pool)
        .await?;
        Ok(skill)
    }

    pub async fn create(&self, skill: &NewSkillTemplate) -> HrResult<SkillTemplate> {
        skill.validate()?;
        let created = sqlx::query_as::<_, SkillTemplate>(
            r#"
            INSERT INTO skill_templates (name, category, description)
            VALUES (?, ?, ?)
            RETURNING id, name, category, description
            "#,
        )
        .bind(skill.name.trim())
        .bind(&skill.category)
        .bind(&skill.description)
        .fetch_one(self.pool)
        .await?;

        info!("Created skill template {} ({})", created.name, created.id);
        Ok(created)
    }

    /// Return the template with this name, creating it when absent
    pub async fn find_or_create(&self, name: &str) -> HrResult<SkillTemplate> {
        if let Some(existing) = self.find_by_name(name).await? {
            return Ok(existing);
        }
        self.create(&NewSkillTemplate {
            name: name.to_string(),
            category: None,
            description: None,
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Database;

    #[tokio::test]
    async fn find_or_create_is_case_insensitive() {
        let db = Database::in_memory().await.unwrap();
        let repo = SkillRepository::new(db.pool());

        let created = repo.find_or_create("Kubernetes").await.unwrap();
        let again = repo.find_or_create("kubernetes").await.unwrap();
        assert_eq!(created.id, again.id);
        assert_eq!(repo.list().await.unwrap().len(), 1);
    }
}
