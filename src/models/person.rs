// src/models/person.rs
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{HrError, HrResult};
use crate::models::EducationLevel;

pub const MIN_SKILL_LEVEL: i64 = 1;
pub const MAX_SKILL_LEVEL: i64 = 5;

// ===== Person =====

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Person {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub department_id: Option<i64>,
    pub position_id: Option<i64>,
    pub experience_years: f64,
    pub education_level: EducationLevel,
    pub hire_date: Option<NaiveDate>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Person {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Payload for creating or replacing a person.
#[derive(Debug, Clone, Deserialize)]
pub struct NewPerson {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub department_id: Option<i64>,
    pub position_id: Option<i64>,
    #[serde(default)]
    pub experience_years: f64,
    #[serde(default)]
    pub education_level: EducationLevel,
    pub hire_date: Option<NaiveDate>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl NewPerson {
    pub fn validate(&self) -> HrResult<()> {
        if self.first_name.trim().is_empty() {
            return Err(HrError::validation("first_name", "first name is required"));
        }
        if self.last_name.trim().is_empty() {
            return Err(HrError::validation("last_name", "last name is required"));
        }
        let email = self.email.trim();
        let valid_email = email
            .split_once('@')
            .map(|(user, domain)| !user.is_empty() && domain.contains('.'))
            .unwrap_or(false);
        if !valid_email {
            return Err(HrError::validation("email", format!("'{}' is not an email address", email)));
        }
        if !self.experience_years.is_finite() || self.experience_years < 0.0 {
            return Err(HrError::validation("experience_years", "must be zero or more"));
        }
        Ok(())
    }
}

// ===== Skills =====

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SkillTemplate {
    pub id: i64,
    pub name: String,
    pub category: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewSkillTemplate {
    pub name: String,
    pub category: Option<String>,
    pub description: Option<String>,
}

impl NewSkillTemplate {
    pub fn validate(&self) -> HrResult<()> {
        if self.name.trim().is_empty() {
            return Err(HrError::validation("name", "skill name is required"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PersonSkill {
    pub id: i64,
    pub person_id: i64,
    pub skill_template_id: i64,
    pub level: i64,
    pub experience_years: f64,
    pub is_certified: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PersonSkillInput {
    pub skill_template_id: i64,
    pub level: i64,
    #[serde(default)]
    pub experience_years: f64,
    #[serde(default)]
    pub is_certified: bool,
}

impl PersonSkillInput {
    pub fn validate(&self) -> HrResult<()> {
        if !(MIN_SKILL_LEVEL..=MAX_SKILL_LEVEL).contains(&self.level) {
            return Err(HrError::validation(
                "level",
                format!("must be between {} and {}", MIN_SKILL_LEVEL, MAX_SKILL_LEVEL),
            ));
        }
        if !self.experience_years.is_finite() || self.experience_years < 0.0 {
            return Err(HrError::validation("experience_years", "must be zero or more"));
        }
        Ok(())
    }
}

// ===== Qualifications =====

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Qualification {
    pub id: i64,
    pub person_id: i64,
    pub name: String,
    pub issuer: Option<String>,
    pub score: Option<f64>,
    pub obtained_on: Option<NaiveDate>,
    pub expires_on: Option<NaiveDate>,
}

impl Qualification {
    pub fn is_valid_on(&self, date: NaiveDate) -> bool {
        self.expires_on.map_or(true, |expiry| expiry >= date)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewQualification {
    pub name: String,
    pub issuer: Option<String>,
    pub score: Option<f64>,
    pub obtained_on: Option<NaiveDate>,
    pub expires_on: Option<NaiveDate>,
}

impl NewQualification {
    pub fn validate(&self) -> HrResult<()> {
        if self.name.trim().is_empty() {
            return Err(HrError::validation("name", "qualification name is required"));
        }
        if let Some(score) = self.score {
            if !(0.0..=100.0).contains(&score) {
                return Err(HrError::validation("score", "must be between 0 and 100"));
            }
        }
        if let (Some(obtained), Some(expires)) = (self.obtained_on, self.expires_on) {
            if expires < obtained {
                return Err(HrError::validation("expires_on", "cannot precede obtained_on"));
            }
        }
        Ok(())
    }
}

// ===== Aggregate =====

/// A person with every collection the matching engine reads.
#[derive(Debug, Clone, Serialize)]
pub struct PersonProfile {
    pub person: Person,
    pub skills: Vec<PersonSkill>,
    pub qualifications: Vec<Qualification>,
}

impl PersonProfile {
    pub fn skill(&self, skill_template_id: i64) -> Option<&PersonSkill> {
        self.skills
            .iter()
            .find(|skill| skill.skill_template_id == skill_template_id)
    }
}
