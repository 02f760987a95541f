// src/models/job.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{HrError, HrResult};
use crate::models::person::{MAX_SKILL_LEVEL, MIN_SKILL_LEVEL};
use crate::models::{EducationLevel, Importance};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct JobDefinition {
    pub id: i64,
    pub title: String,
    pub version: i64,
    pub department_id: Option<i64>,
    pub description: Option<String>,
    pub min_experience_years: f64,
    pub preferred_experience_years: Option<f64>,
    pub min_education_level: EducationLevel,
    pub preferred_education_level: Option<EducationLevel>,
    pub required_certifications: Option<String>,
    pub preferred_certifications: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewJobDefinition {
    pub title: String,
    #[serde(default = "first_version")]
    pub version: i64,
    pub department_id: Option<i64>,
    pub description: Option<String>,
    #[serde(default)]
    pub min_experience_years: f64,
    pub preferred_experience_years: Option<f64>,
    #[serde(default)]
    pub min_education_level: EducationLevel,
    pub preferred_education_level: Option<EducationLevel>,
    pub required_certifications: Option<String>,
    pub preferred_certifications: Option<String>,
}

fn first_version() -> i64 {
    1
}

impl NewJobDefinition {
    pub fn validate(&self) -> HrResult<()> {
        if self.title.trim().is_empty() {
            return Err(HrError::validation("title", "job title is required"));
        }
        if self.version < 1 {
            return Err(HrError::validation("version", "must be at least 1"));
        }
        if !self.min_experience_years.is_finite() || self.min_experience_years < 0.0 {
            return Err(HrError::validation("min_experience_years", "must be zero or more"));
        }
        if let Some(preferred) = self.preferred_experience_years {
            if preferred < self.min_experience_years {
                return Err(HrError::validation(
                    "preferred_experience_years",
                    "cannot be below the minimum",
                ));
            }
        }
        if let Some(preferred) = self.preferred_education_level {
            if preferred < self.min_education_level {
                return Err(HrError::validation(
                    "preferred_education_level",
                    "cannot be below the minimum",
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct JobRequiredSkill {
    pub id: i64,
    pub job_definition_id: i64,
    pub skill_template_id: i64,
    pub skill_name: String,
    pub importance: Importance,
    pub min_level: i64,
    pub preferred_level: Option<i64>,
    pub min_experience_years: f64,
    pub weight: f64,
    pub certification_required: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobRequiredSkillInput {
    pub skill_template_id: i64,
    pub importance: Importance,
    pub min_level: i64,
    pub preferred_level: Option<i64>,
    #[serde(default)]
    pub min_experience_years: f64,
    #[serde(default = "default_weight")]
    pub weight: f64,
    #[serde(default)]
    pub certification_required: bool,
}

fn default_weight() -> f64 {
    1.0
}

impl JobRequiredSkillInput {
    pub fn validate(&self) -> HrResult<()> {
        if !(MIN_SKILL_LEVEL..=MAX_SKILL_LEVEL).contains(&self.min_level) {
            return Err(HrError::validation(
                "min_level",
                format!("must be between {} and {}", MIN_SKILL_LEVEL, MAX_SKILL_LEVEL),
            ));
        }
        if let Some(preferred) = self.preferred_level {
            if preferred < self.min_level || preferred > MAX_SKILL_LEVEL {
                return Err(HrError::validation(
                    "preferred_level",
                    format!("must be between min_level and {}", MAX_SKILL_LEVEL),
                ));
            }
        }
        if !self.weight.is_finite() || self.weight <= 0.0 {
            return Err(HrError::validation("weight", "must be greater than zero"));
        }
        if !self.min_experience_years.is_finite() || self.min_experience_years < 0.0 {
            return Err(HrError::validation("min_experience_years", "must be zero or more"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct JobDefinitionQualification {
    pub id: i64,
    pub job_definition_id: i64,
    pub name: String,
    pub importance: Importance,
    pub min_score: Option<f64>,
    pub weight: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobDefinitionQualificationInput {
    pub name: String,
    pub importance: Importance,
    pub min_score: Option<f64>,
    #[serde(default = "default_weight")]
    pub weight: f64,
}

impl JobDefinitionQualificationInput {
    pub fn validate(&self) -> HrResult<()> {
        if self.name.trim().is_empty() {
            return Err(HrError::validation("name", "qualification name is required"));
        }
        if let Some(score) = self.min_score {
            if !(0.0..=100.0).contains(&score) {
                return Err(HrError::validation("min_score", "must be between 0 and 100"));
            }
        }
        if !self.weight.is_finite() || self.weight <= 0.0 {
            return Err(HrError::validation("weight", "must be greater than zero"));
        }
        Ok(())
    }
}

/// A job definition with its requirement rows resolved.
#[derive(Debug, Clone, Serialize)]
pub struct JobDefinitionProfile {
    pub definition: JobDefinition,
    pub required_skills: Vec<JobRequiredSkill>,
    pub qualifications: Vec<JobDefinitionQualification>,
}

impl JobDefinitionProfile {
    pub fn skills_with(&self, importance: Importance) -> impl Iterator<Item = &JobRequiredSkill> {
        self.required_skills
            .iter()
            .filter(move |skill| skill.importance == importance)
    }

    pub fn qualifications_with(
        &self,
        importance: Importance,
    ) -> impl Iterator<Item = &JobDefinitionQualification> {
        self.qualifications
            .iter()
            .filter(move |qualification| qualification.importance == importance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preferred_education_cannot_undercut_minimum() {
        let definition = NewJobDefinition {
            title: "Data Engineer".into(),
            version: 1,
            department_id: None,
            description: None,
            min_experience_years: 2.0,
            preferred_experience_years: Some(5.0),
            min_education_level: EducationLevel::Master,
            preferred_education_level: Some(EducationLevel::Bachelor),
            required_certifications: None,
            preferred_certifications: None,
        };
        let err = definition.validate().unwrap_err();
        assert!(matches!(
            err,
            HrError::Validation {
                field: "preferred_education_level",
                ..
            }
        ));
    }

    #[test]
    fn skill_weight_must_be_positive() {
        let input = JobRequiredSkillInput {
            skill_template_id: 1,
            importance: Importance::Required,
            min_level: 3,
            preferred_level: Some(4),
            min_experience_years: 0.0,
            weight: 0.0,
            certification_required: false,
        };
        assert!(input.validate().is_err());
        let ok = JobRequiredSkillInput { weight: 2.5, ..input };
        assert!(ok.validate().is_ok());
    }
}
