// src/matching/report.rs
//! Human-readable lines stored alongside a match result.

use chrono::NaiveDate;

use crate::matching::scoring::{has_certification, meets_qualification};
use crate::matching::weights::next_threshold;
use crate::models::{Importance, JobDefinitionProfile, JobRequiredSkill, PersonProfile};
use crate::utils::parse_certification_list;

/// Requirements the person does not meet, in job order.
pub fn missing_requirements(
    job: &JobDefinitionProfile,
    person: &PersonProfile,
    as_of: NaiveDate,
) -> Vec<String> {
    let definition = &job.definition;
    let mut missing = Vec::new();

    for requirement in job.skills_with(Importance::Required) {
        missing.extend(skill_shortfalls(requirement, person));
    }

    for certification in parse_certification_list(definition.required_certifications.as_deref()) {
        if !has_certification(&person.qualifications, &certification, as_of) {
            missing.push(format!("Missing required certification '{}'", certification));
        }
    }

    for requirement in job.qualifications_with(Importance::Required) {
        if !meets_qualification(&person.qualifications, requirement, as_of) {
            match requirement.min_score {
                Some(min_score) => missing.push(format!(
                    "Missing required qualification '{}' with a score of at least {}",
                    requirement.name, min_score
                )),
                None => missing.push(format!(
                    "Missing required qualification '{}'",
                    requirement.name
                )),
            }
        }
    }

    let years = person.person.experience_years;
    if years < definition.min_experience_years {
        missing.push(format!(
            "Needs {} years of experience, has {}",
            definition.min_experience_years, years
        ));
    }

    let education = person.person.education_level;
    if education < definition.min_education_level {
        missing.push(format!(
            "Requires {}, has {}",
            definition.min_education_level.label(),
            education.label()
        ));
    }

    missing
}

fn skill_shortfalls(requirement: &JobRequiredSkill, person: &PersonProfile) -> Vec<String> {
    let name = &requirement.skill_name;
    let Some(skill) = person.skill(requirement.skill_template_id) else {
        return vec![format!(
            "Required skill '{}' is missing (minimum level {})",
            name, requirement.min_level
        )];
    };

    let mut lines = Vec::new();
    if skill.level < requirement.min_level {
        lines.push(format!(
            "Required skill '{}' at level {}, minimum is {}",
            name, skill.level, requirement.min_level
        ));
    }
    if requirement.certification_required && !skill.is_certified {
        lines.push(format!("Required skill '{}' must be certified", name));
    }
    if skill.experience_years < requirement.min_experience_years {
        lines.push(format!(
            "Required skill '{}' needs {} years of practice, has {}",
            name, requirement.min_experience_years, skill.experience_years
        ));
    }
    lines
}

/// Suggestions that would raise the score or bring the person closer to the
/// preferred profile.
pub fn recommendations(
    job: &JobDefinitionProfile,
    person: &PersonProfile,
    as_of: NaiveDate,
    overall: f64,
) -> Vec<String> {
    let definition = &job.definition;
    let mut lines = Vec::new();

    for requirement in &job.required_skills {
        let current = person.skill(requirement.skill_template_id).map(|skill| skill.level);
        match (requirement.importance, current) {
            (Importance::Preferred, None) => lines.push(format!(
                "Develop preferred skill '{}' to level {}",
                requirement.skill_name, requirement.min_level
            )),
            (Importance::Preferred, Some(level)) if level < requirement.min_level => {
                lines.push(format!(
                    "Raise preferred skill '{}' from level {} to {}",
                    requirement.skill_name, level, requirement.min_level
                ))
            }
            (Importance::Optional, None) => lines.push(format!(
                "Optional skill '{}' would strengthen the profile",
                requirement.skill_name
            )),
            _ => {}
        }

        if let (Some(preferred), Some(level)) = (requirement.preferred_level, current) {
            if level >= requirement.min_level && level < preferred {
                lines.push(format!(
                    "Raise '{}' to the preferred level {}",
                    requirement.skill_name, preferred
                ));
            }
        }
    }

    for certification in parse_certification_list(definition.preferred_certifications.as_deref()) {
        if !has_certification(&person.qualifications, &certification, as_of) {
            lines.push(format!("Obtain preferred certification '{}'", certification));
        }
    }

    for requirement in job
        .qualifications
        .iter()
        .filter(|row| row.importance != Importance::Required)
    {
        if !meets_qualification(&person.qualifications, requirement, as_of) {
            lines.push(format!("Consider the qualification '{}'", requirement.name));
        }
    }

    let years = person.person.experience_years;
    if let Some(preferred) = definition.preferred_experience_years {
        if years >= definition.min_experience_years && years < preferred {
            lines.push(format!(
                "Preferred experience is {} years, has {}",
                preferred, years
            ));
        }
    }

    let education = person.person.education_level;
    if let Some(preferred) = definition.preferred_education_level {
        if education >= definition.min_education_level && education < preferred {
            lines.push(format!("Preferred education is a {}", preferred.label()));
        }
    }

    if let Some((threshold, status)) = next_threshold(overall) {
        lines.push(format!(
            "Overall score is {:.2} points below the {} threshold ({})",
            threshold - overall,
            status.as_str().replace('_', " "),
            threshold
        ));
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::scoring::fixtures::*;
    use crate::models::EducationLevel;

    #[test]
    fn lists_each_kind_of_gap() {
        let mut job = job(4.0, EducationLevel::Master);
        job.definition.required_certifications = Some("CKA".into());
        let mut certified = requirement(1, "Rust", Importance::Required, 3, 1.0);
        certified.certification_required = true;
        job.required_skills = vec![certified, requirement(2, "SQL", Importance::Required, 2, 1.0)];

        let mut person = person(1.0, EducationLevel::Bachelor);
        person.skills = vec![skill(1, 2)];

        let missing = missing_requirements(&job, &person, today());
        assert_eq!(
            missing,
            vec![
                "Required skill 'Rust' at level 2, minimum is 3".to_string(),
                "Required skill 'Rust' must be certified".to_string(),
                "Required skill 'SQL' is missing (minimum level 2)".to_string(),
                "Missing required certification 'CKA'".to_string(),
                "Needs 4 years of experience, has 1".to_string(),
                "Requires master's degree, has bachelor's degree".to_string(),
            ]
        );
    }

    #[test]
    fn recommends_preferred_profile_and_threshold_distance() {
        let mut job = job(2.0, EducationLevel::Bachelor);
        job.definition.preferred_experience_years = Some(5.0);
        job.definition.preferred_education_level = Some(EducationLevel::Master);
        job.definition.preferred_certifications = Some("PMP".into());
        job.required_skills = vec![requirement(2, "SQL", Importance::Preferred, 3, 1.0)];

        let person = person(3.0, EducationLevel::Bachelor);
        let lines = recommendations(&job, &person, today(), 72.5);

        assert!(lines.contains(&"Develop preferred skill 'SQL' to level 3".to_string()));
        assert!(lines.contains(&"Obtain preferred certification 'PMP'".to_string()));
        assert!(lines.contains(&"Preferred experience is 5 years, has 3".to_string()));
        assert!(lines.contains(&"Preferred education is a master's degree".to_string()));
        assert_eq!(
            lines.last().map(String::as_str),
            Some("Overall score is 7.50 points below the matched threshold (80)")
        );
    }

    #[test]
    fn matched_result_has_no_threshold_line() {
        let job = job(0.0, EducationLevel::None);
        let person = person(0.0, EducationLevel::None);
        assert!(recommendations(&job, &person, today(), 100.0).is_empty());
    }
}
