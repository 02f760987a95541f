// src/repository/persons.rs
use chrono::Utc;
use sqlx::{SqliteExecutor, SqlitePool};
use tracing::info;

use crate::error::{HrError, HrResult};
use crate::models::person::{NewPerson, NewQualification, PersonSkillInput};
use crate::models::{Person, PersonProfile, PersonSkill, Qualification};

const PERSON_COLUMNS: &str = "id, first_name, last_name, email, department_id, position_id, \
     experience_years, education_level, hire_date, is_active, created_at, updated_at";

pub struct PersonRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> PersonRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, active_only: bool) -> HrResult<Vec<Person>> {
        let persons = sqlx::query_as::<_, Person>(&format!(
            "SELECT {} FROM persons WHERE (?1 = FALSE OR is_active = TRUE) \
             ORDER BY last_name ASC, first_name ASC",
            PERSON_COLUMNS
        ))
        .bind(active_only)
        .fetch_all(self.pool)
        .await?;
        Ok(persons)
    }

    pub async fn list_active_ids(&self) -> HrResult<Vec<i64>> {
        let ids: Vec<(i64,)> =
            sqlx::query_as("SELECT id FROM persons WHERE is_active = TRUE ORDER BY id ASC")
                .fetch_all(self.pool)
                .await?;
        Ok(ids.into_iter().map(|(id,)| id).collect())
    }

    pub async fn find(&self, id: i64) -> HrResult<Person> {
        fetch_person(self.pool, id).await
    }

    pub async fn create(&self, person: &NewPerson) -> HrResult<Person> {
        person.validate()?;
        let now = Utc::now();

        let created = sqlx::query_as::<_, Person>(&format!(
            r#"
            INSERT INTO persons (first_name, last_name, email, department_id, position_id,
                experience_years, education_level, hire_date, is_active, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING {}
            "#,
            PERSON_COLUMNS
        ))
        .bind(person.first_name.trim())
        .bind(person.last_name.trim())
        .bind(person.email.trim())
        .bind(person.department_id)
        .bind(person.position_id)
        .bind(person.experience_years)
        .bind(person.education_level)
        .bind(person.hire_date)
        .bind(person.is_active)
        .bind(now)
        .bind(now)
        .fetch_one(self.pool)
        .await?;

        info!("Created person {} ({})", created.full_name(), created.id);
        Ok(created)
    }

    pub async fn update(&self, id: i64, person: &NewPerson) -> HrResult<Person> {
        person.validate()?;

        sqlx::query_as::<_, Person>(&format!(
            r#"
            UPDATE persons
            SET first_name = ?, last_name = ?, email = ?, department_id = ?, position_id = ?,
                experience_years = ?, education_level = ?, hire_date = ?, is_active = ?,
                updated_at = ?
            WHERE id = ?
            RETURNING {}
            "#,
            PERSON_COLUMNS
        ))
        .bind(person.first_name.trim())
        .bind(person.last_name.trim())
        .bind(person.email.trim())
        .bind(person.department_id)
        .bind(person.position_id)
        .bind(person.experience_years)
        .bind(person.education_level)
        .bind(person.hire_date)
        .bind(person.is_active)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| HrError::not_found("person", id))
    }

    pub async fn delete(&self, id: i64) -> HrResult<()> {
        let result = sqlx::query("DELETE FROM persons WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(HrError::not_found("person", id));
        }
        info!("Deleted person {}", id);
        Ok(())
    }

    // ===== Skills =====

    pub async fn skills(&self, person_id: i64) -> HrResult<Vec<PersonSkill>> {
        fetch_skills(self.pool, person_id).await
    }

    /// Insert or replace the person's entry for one skill template
    pub async fn upsert_skill(&self, person_id: i64, input: &PersonSkillInput) -> HrResult<PersonSkill> {
        input.validate()?;
        self.find(person_id).await?;

        let skill = sqlx::query_as::<_, PersonSkill>(
            r#"
            INSERT INTO person_skills (person_id, skill_template_id, level, experience_years, is_certified)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT (person_id, skill_template_id) DO UPDATE SET
                level = excluded.level,
                experience_years = excluded.experience_years,
                is_certified = excluded.is_certified
            RETURNING id, person_id, skill_template_id, level, experience_years, is_certified
            "#,
        )
        .bind(person_id)
        .bind(input.skill_template_id)
        .bind(input.level)
        .bind(input.experience_years)
        .bind(input.is_certified)
        .fetch_one(self.pool)
        .await
        .map_err(|err| match HrError::from(err) {
            HrError::Conflict(_) => HrError::not_found("skill template", input.skill_template_id),
            other => other,
        })?;

        Ok(skill)
    }

    pub async fn remove_skill(&self, person_id: i64, skill_template_id: i64) -> HrResult<()> {
        let result =
            sqlx::query("DELETE FROM person_skills WHERE person_id = ? AND skill_template_id = ?")
                .bind(person_id)
                .bind(skill_template_id)
                .execute(self.pool)
                .await?;
        if result.rows_affected() == 0 {
            return Err(HrError::not_found("person skill", skill_template_id));
        }
        Ok(())
    }

    // ===== Qualifications =====

    pub async fn qualifications(&self, person_id: i64) -> HrResult<Vec<Qualification>> {
        fetch_qualifications(self.pool, person_id).await
    }

    pub async fn add_qualification(
        &self,
        person_id: i64,
        qualification: &NewQualification,
    ) -> HrResult<Qualification> {
        qualification.validate()?;
        self.find(person_id).await?;

        let created = sqlx::query_as::<_, Qualification>(
            r#"
            INSERT INTO qualifications (person_id, name, issuer, score, obtained_on, expires_on)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING id, person_id, name, issuer, score, obtained_on, expires_on
            "#,
        )
        .bind(person_id)
        .bind(qualification.name.trim())
        .bind(&qualification.issuer)
        .bind(qualification.score)
        .bind(qualification.obtained_on)
        .bind(qualification.expires_on)
        .fetch_one(self.pool)
        .await?;

        Ok(created)
    }

    /// Load a person together with skills and qualifications, all read
    /// from one transaction.
    pub async fn load_profile(&self, person_id: i64) -> HrResult<PersonProfile> {
        let mut tx = self.pool.begin().await?;
        let person = fetch_person(&mut *tx, person_id).await?;
        let skills = fetch_skills(&mut *tx, person_id).await?;
        let qualifications = fetch_qualifications(&mut *tx, person_id).await?;
        tx.commit().await?;

        Ok(PersonProfile {
            person,
            skills,
            qualifications,
        })
    }
}

async fn fetch_person<'e>(executor: impl SqliteExecutor<'e>, id: i64) -> HrResult<Person> {
    sqlx::query_as::<_, Person>(&format!("SELECT {} FROM persons WHERE id = ?", PERSON_COLUMNS))
        .bind(id)
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| HrError::not_found("person", id))
}

async fn fetch_skills<'e>(
    executor: impl SqliteExecutor<'e>,
    person_id: i64,
) -> HrResult<Vec<PersonSkill>> {
    let skills = sqlx::query_as::<_, PersonSkill>(
        r#"
        SELECT id, person_id, skill_template_id, level, experience_years, is_certified
        FROM person_skills
        WHERE person_id = ?
        ORDER BY skill_template_id ASC
        "#,
    )
    .bind(person_id)
    .fetch_all(executor)
    .await?;
    Ok(skills)
}

async fn fetch_qualifications<'e>(
    executor: impl SqliteExecutor<'e>,
    person_id: i64,
) -> HrResult<Vec<Qualification>> {
    let qualifications = sqlx::query_as::<_, Qualification>(
        r#"
        SELECT id, person_id, name, issuer, score, obtained_on, expires_on
        FROM qualifications
        WHERE person_id = ?
        ORDER BY name ASC
        "#,
    )
    .bind(person_id)
    .fetch_all(executor)
    .await?;
    Ok(qualifications)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Database;
    use crate::models::EducationLevel;

    fn ada() -> NewPerson {
        NewPerson {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@example.org".into(),
            department_id: None,
            position_id: None,
            experience_years: 6.0,
            education_level: EducationLevel::Master,
            hire_date: None,
            is_active: true,
        }
    }

    #[tokio::test]
    async fn create_find_update_delete() {
        let db = Database::in_memory().await.unwrap();
        let repo = PersonRepository::new(db.pool());

        let created = repo.create(&ada()).await.unwrap();
        assert_eq!(created.education_level, EducationLevel::Master);

        let mut changed = ada();
        changed.experience_years = 7.5;
        let updated = repo.update(created.id, &changed).await.unwrap();
        assert_eq!(updated.experience_years, 7.5);

        repo.delete(created.id).await.unwrap();
        let err = repo.find(created.id).await.unwrap_err();
        assert!(matches!(err, HrError::NotFound { entity: "person", .. }));
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() {
        let db = Database::in_memory().await.unwrap();
        let repo = PersonRepository::new(db.pool());
        repo.create(&ada()).await.unwrap();

        let mut twin = ada();
        twin.email = "ADA@example.org".into();
        let err = repo.create(&twin).await.unwrap_err();
        assert!(matches!(err, HrError::Conflict(_)));
    }

    #[tokio::test]
    async fn upsert_skill_replaces_existing_level() {
        let db = Database::in_memory().await.unwrap();
        let repo = PersonRepository::new(db.pool());
        let person = repo.create(&ada()).await.unwrap();
        sqlx::query("INSERT INTO skill_templates (name) VALUES ('Rust')")
            .execute(db.pool())
            .await
            .unwrap();

        let mut input = PersonSkillInput {
            skill_template_id: 1,
            level: 2,
            experience_years: 1.0,
            is_certified: false,
        };
        let first = repo.upsert_skill(person.id, &input).await.unwrap();
        input.level = 4;
        let second = repo.upsert_skill(person.id, &input).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.level, 4);
        assert_eq!(repo.skills(person.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unknown_skill_template_is_not_found() {
        let db = Database::in_memory().await.unwrap();
        let repo = PersonRepository::new(db.pool());
        let person = repo.create(&ada()).await.unwrap();

        let err = repo
            .upsert_skill(
                person.id,
                &PersonSkillInput {
                    skill_template_id: 99,
                    level: 3,
                    experience_years: 0.0,
                    is_certified: false,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, HrError::NotFound { entity: "skill template", id: 99 }));
    }

    #[tokio::test]
    async fn profile_reads_leave_the_pool_usable() {
        let db = Database::in_memory().await.unwrap();
        let repo = PersonRepository::new(db.pool());
        let person = repo.create(&ada()).await.unwrap();
        sqlx::query("INSERT INTO skill_templates (name) VALUES ('Rust')")
            .execute(db.pool())
            .await
            .unwrap();
        repo.upsert_skill(
            person.id,
            &PersonSkillInput {
                skill_template_id: 1,
                level: 3,
                experience_years: 2.0,
                is_certified: true,
            },
        )
        .await
        .unwrap();
        repo.add_qualification(
            person.id,
            &NewQualification {
                name: "CKA".into(),
                issuer: None,
                score: None,
                obtained_on: None,
                expires_on: None,
            },
        )
        .await
        .unwrap();

        let err = repo.load_profile(person.id + 1).await.unwrap_err();
        assert!(matches!(err, HrError::NotFound { entity: "person", .. }));

        let profile = repo.load_profile(person.id).await.unwrap();
        assert_eq!(profile.person.id, person.id);
        assert_eq!(profile.skills.len(), 1);
        assert_eq!(profile.qualifications[0].name, "CKA");
    }
}
