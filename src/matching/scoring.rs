// src/matching/scoring.rs
//! Pure scoring: a job definition profile and a person profile in, five
//! dimension scores and an overall percentage out. No I/O happens here.

use chrono::NaiveDate;
use serde::Serialize;

use crate::matching::report;
use crate::matching::weights::{classify, Weights};
use crate::models::{
    Importance, JobDefinitionProfile, JobRequiredSkill, MatchStatus, PersonProfile,
};
use crate::models::{EducationLevel, JobDefinitionQualification, Qualification};
use crate::utils::{normalize_name, parse_certification_list, round_percentage};

const FULL: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SubScores {
    pub required_skills: f64,
    pub preferred_skills: f64,
    pub experience: f64,
    pub education: f64,
    pub certification: f64,
    pub overall: f64,
}

/// Everything computed for one (job definition, person) pair, ready to store.
#[derive(Debug, Clone, Serialize)]
pub struct MatchOutcome {
    pub job_definition_id: i64,
    pub person_id: i64,
    pub scores: SubScores,
    pub status: MatchStatus,
    pub missing_requirements: Vec<String>,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MatchingEngine {
    weights: Weights,
}

impl MatchingEngine {
    /// Score `person` against `job`. Qualifications are judged valid as of `as_of`.
    pub fn evaluate(
        &self,
        job: &JobDefinitionProfile,
        person: &PersonProfile,
        as_of: NaiveDate,
    ) -> MatchOutcome {
        let definition = &job.definition;

        let required_skills = skill_dimension(job.skills_with(Importance::Required), person);
        let preferred_skills = skill_dimension(job.skills_with(Importance::Preferred), person);
        let experience = experience_score(
            person.person.experience_years,
            definition.min_experience_years,
        );
        let education = education_score(
            person.person.education_level,
            definition.min_education_level,
        );
        let certification = certification_score(job, &person.qualifications, as_of);

        let overall = self.combine(
            required_skills,
            preferred_skills,
            experience,
            education,
            certification,
        );

        let scores = SubScores {
            required_skills: round_percentage(required_skills),
            preferred_skills: round_percentage(preferred_skills),
            experience: round_percentage(experience),
            education: round_percentage(education),
            certification: round_percentage(certification),
            overall: round_percentage(overall),
        };
        let status = classify(scores.overall);

        MatchOutcome {
            job_definition_id: definition.id,
            person_id: person.person.id,
            scores,
            status,
            missing_requirements: report::missing_requirements(job, person, as_of),
            recommendations: report::recommendations(job, person, as_of, scores.overall),
        }
    }

    fn combine(
        &self,
        required_skills: f64,
        preferred_skills: f64,
        experience: f64,
        education: f64,
        certification: f64,
    ) -> f64 {
        let w = &self.weights;
        let pairs = [
            (w.required_skills, required_skills),
            (w.preferred_skills, preferred_skills),
            (w.experience, experience),
            (w.education, education),
            (w.certification, certification),
        ];
        weighted_mean(pairs.into_iter()).unwrap_or(FULL)
    }
}

// ===== Dimensions =====

/// Score for one skill requirement: 0 when the person lacks the skill,
/// otherwise level / min_level capped at 100.
pub fn skill_entry_score(requirement: &JobRequiredSkill, person: &PersonProfile) -> f64 {
    match person.skill(requirement.skill_template_id) {
        None => 0.0,
        Some(_) if requirement.min_level <= 0 => FULL,
        Some(skill) if skill.level >= requirement.min_level => FULL,
        Some(skill) => (FULL * skill.level as f64 / requirement.min_level as f64).min(FULL),
    }
}

/// Weighted mean of the entry scores; 100 when there are no rows.
pub fn skill_dimension<'a>(
    rows: impl Iterator<Item = &'a JobRequiredSkill>,
    person: &PersonProfile,
) -> f64 {
    weighted_mean(rows.map(|row| (row.weight, skill_entry_score(row, person)))).unwrap_or(FULL)
}

pub fn experience_score(years: f64, min_years: f64) -> f64 {
    if min_years <= 0.0 {
        return FULL;
    }
    (FULL * years.max(0.0) / min_years).min(FULL)
}

/// Proportional by ordinal rank below the minimum; no minimum means 100.
pub fn education_score(level: EducationLevel, min_level: EducationLevel) -> f64 {
    if min_level.rank() == 0 || level >= min_level {
        return FULL;
    }
    FULL * f64::from(level.rank()) / f64::from(min_level.rank())
}

/// Required certifications from the job's free text (weight 1 each) plus
/// required qualification rows (their own weight).
pub fn certification_score(
    job: &JobDefinitionProfile,
    qualifications: &[Qualification],
    as_of: NaiveDate,
) -> f64 {
    let certifications = parse_certification_list(job.definition.required_certifications.as_deref())
        .into_iter()
        .map(|name| (1.0, hit(has_certification(qualifications, &name, as_of))));
    let rows = job
        .qualifications_with(Importance::Required)
        .map(|row| (row.weight, hit(meets_qualification(qualifications, row, as_of))));

    weighted_mean(certifications.chain(rows)).unwrap_or(FULL)
}

/// Case-insensitive substring match against qualifications valid on `as_of`.
pub fn has_certification(qualifications: &[Qualification], name: &str, as_of: NaiveDate) -> bool {
    let wanted = normalize_name(name);
    if wanted.is_empty() {
        return true;
    }
    qualifications
        .iter()
        .filter(|qualification| qualification.is_valid_on(as_of))
        .any(|qualification| normalize_name(&qualification.name).contains(&wanted))
}

pub fn meets_qualification(
    qualifications: &[Qualification],
    requirement: &JobDefinitionQualification,
    as_of: NaiveDate,
) -> bool {
    let wanted = normalize_name(&requirement.name);
    qualifications
        .iter()
        .filter(|qualification| qualification.is_valid_on(as_of))
        .filter(|qualification| normalize_name(&qualification.name).contains(&wanted))
        .any(|qualification| match requirement.min_score {
            Some(min_score) => qualification.score.map_or(false, |score| score >= min_score),
            None => true,
        })
}

fn hit(met: bool) -> f64 {
    if met {
        FULL
    } else {
        0.0
    }
}

/// `None` for an empty input. A zero total weight falls back to the plain mean.
fn weighted_mean(entries: impl Iterator<Item = (f64, f64)>) -> Option<f64> {
    let entries: Vec<(f64, f64)> = entries.collect();
    if entries.is_empty() {
        return None;
    }
    let total_weight: f64 = entries.iter().map(|(weight, _)| weight.max(0.0)).sum();
    if total_weight <= 0.0 {
        let sum: f64 = entries.iter().map(|(_, score)| score).sum();
        return Some(sum / entries.len() as f64);
    }
    let weighted: f64 = entries
        .iter()
        .map(|(weight, score)| weight.max(0.0) * score)
        .sum();
    Some(weighted / total_weight)
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use proptest::prelude::*;

    fn engine() -> MatchingEngine {
        MatchingEngine::default()
    }

    #[test]
    fn worked_example_scores_ninety() {
        let mut job = job(2.0, EducationLevel::Bachelor);
        job.required_skills = vec![
            requirement(1, "Skill A", Importance::Required, 3, 10.0),
            requirement(2, "Skill B", Importance::Preferred, 2, 5.0),
        ];
        let mut person = person(2.0, EducationLevel::Bachelor);
        person.skills = vec![skill(1, 3)];

        let outcome = engine().evaluate(&job, &person, today());
        assert_eq!(outcome.scores.required_skills, 100.0);
        assert_eq!(outcome.scores.preferred_skills, 0.0);
        assert_eq!(outcome.scores.experience, 100.0);
        assert_eq!(outcome.scores.education, 100.0);
        assert_eq!(outcome.scores.certification, 100.0);
        assert_eq!(outcome.scores.overall, 90.0);
        assert_eq!(outcome.status, MatchStatus::Matched);
    }

    #[test]
    fn no_requirements_is_a_vacuous_match() {
        let job = job(0.0, EducationLevel::None);
        let person = person(0.0, EducationLevel::None);
        let outcome = engine().evaluate(&job, &person, today());
        assert_eq!(outcome.scores.required_skills, 100.0);
        assert_eq!(outcome.scores.overall, 100.0);
        assert_eq!(outcome.status, MatchStatus::Matched);
        assert!(outcome.missing_requirements.is_empty());
    }

    #[test]
    fn person_with_nothing_scores_zero() {
        let mut job = job(5.0, EducationLevel::Master);
        job.definition.required_certifications = Some("CKA; AWS".into());
        job.required_skills = vec![
            requirement(1, "Rust", Importance::Required, 3, 1.0),
            requirement(2, "SQL", Importance::Preferred, 2, 1.0),
        ];
        let person = person(0.0, EducationLevel::None);

        let outcome = engine().evaluate(&job, &person, today());
        assert_eq!(outcome.scores.overall, 0.0);
        assert_eq!(outcome.status, MatchStatus::NoMatch);
        assert!(!outcome.missing_requirements.is_empty());
    }

    #[test]
    fn full_match_scores_hundred() {
        let mut job = job(3.0, EducationLevel::Bachelor);
        job.definition.required_certifications = Some("cka".into());
        job.required_skills = vec![
            requirement(1, "Rust", Importance::Required, 3, 2.0),
            requirement(2, "SQL", Importance::Preferred, 2, 1.0),
        ];
        let mut person = person(6.0, EducationLevel::Doctorate);
        person.skills = vec![skill(1, 5), skill(2, 2)];
        person.qualifications = vec![qualification("Certified Kubernetes Administrator (CKA)", None)];

        let outcome = engine().evaluate(&job, &person, today());
        assert_eq!(outcome.scores.overall, 100.0);
        assert_eq!(outcome.status, MatchStatus::Matched);
    }

    #[test]
    fn partial_skill_level_is_proportional() {
        let mut job = job(0.0, EducationLevel::None);
        job.required_skills = vec![
            requirement(1, "Rust", Importance::Required, 4, 3.0),
            requirement(2, "Go", Importance::Required, 2, 1.0),
        ];
        let mut person = person(0.0, EducationLevel::None);
        person.skills = vec![skill(1, 2)];

        // (3 * 50 + 1 * 0) / 4
        let score = skill_dimension(job.skills_with(Importance::Required), &person);
        assert!((score - 37.5).abs() < 1e-9);
    }

    #[test]
    fn optional_rows_do_not_score() {
        let mut job = job(0.0, EducationLevel::None);
        job.required_skills = vec![requirement(1, "Go", Importance::Optional, 3, 1.0)];
        let person = person(0.0, EducationLevel::None);
        let outcome = engine().evaluate(&job, &person, today());
        assert_eq!(outcome.scores.overall, 100.0);
        assert!(outcome.recommendations.iter().any(|line| line.contains("Go")));
    }

    #[test]
    fn education_below_minimum_is_proportional() {
        assert_eq!(education_score(EducationLevel::Master, EducationLevel::Bachelor), 100.0);
        assert_eq!(education_score(EducationLevel::None, EducationLevel::None), 100.0);
        let partial = education_score(EducationLevel::HighSchool, EducationLevel::Bachelor);
        let expected = 100.0 * f64::from(EducationLevel::HighSchool.rank())
            / f64::from(EducationLevel::Bachelor.rank());
        assert!((partial - expected).abs() < 1e-9);
        assert!(partial < 100.0);
    }

    #[test]
    fn experience_caps_at_hundred() {
        assert_eq!(experience_score(10.0, 2.0), 100.0);
        assert_eq!(experience_score(1.0, 4.0), 25.0);
        assert_eq!(experience_score(0.0, 0.0), 100.0);
    }

    #[test]
    fn expired_certification_does_not_count() {
        let mut job = job(0.0, EducationLevel::None);
        job.definition.required_certifications = Some("PMP".into());
        let expired = NaiveDate::from_ymd_opt(2024, 1, 31);
        let qualifications = vec![qualification("PMP", expired)];
        assert_eq!(certification_score(&job, &qualifications, today()), 0.0);

        let earlier = NaiveDate::from_ymd_opt(2023, 6, 1).unwrap();
        assert_eq!(certification_score(&job, &qualifications, earlier), 100.0);
    }

    #[test]
    fn required_qualification_rows_are_weighted() {
        let mut job = job(0.0, EducationLevel::None);
        job.definition.required_certifications = Some("CKA".into());
        job.qualifications = vec![JobDefinitionQualification {
            id: 1,
            job_definition_id: 7,
            name: "Security clearance".into(),
            importance: Importance::Required,
            min_score: Some(70.0),
            weight: 3.0,
        }];
        let mut clearance = qualification("Security Clearance Level 2", None);
        clearance.score = Some(75.0);

        // clearance met (3.0), CKA missing (1.0)
        let score = certification_score(&job, &[clearance.clone()], today());
        assert!((score - 75.0).abs() < 1e-9);

        clearance.score = Some(60.0);
        assert_eq!(certification_score(&job, &[clearance], today()), 0.0);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(128))]

        #[test]
        fn scores_stay_within_bounds(
            min_levels in proptest::collection::vec(1i64..=5, 0..6),
            levels in proptest::collection::vec(0i64..=5, 6),
            weights in proptest::collection::vec(0.1f64..20.0, 6),
            years in 0.0f64..40.0,
            min_years in 0.0f64..15.0,
            education in 0usize..7,
            min_education in 0usize..7,
        ) {
            let mut job = job(min_years, EducationLevel::ALL[min_education]);
            let mut person = person(years, EducationLevel::ALL[education]);
            for (index, min_level) in min_levels.iter().enumerate() {
                let id = index as i64 + 1;
                let importance = if index % 2 == 0 { Importance::Required } else { Importance::Preferred };
                job.required_skills.push(requirement(id, "skill", importance, *min_level, weights[index]));
                if levels[index] > 0 {
                    person.skills.push(skill(id, levels[index]));
                }
            }

            let scores = MatchingEngine::default().evaluate(&job, &person, today()).scores;
            for value in [
                scores.required_skills,
                scores.preferred_skills,
                scores.experience,
                scores.education,
                scores.certification,
                scores.overall,
            ] {
                prop_assert!((0.0..=100.0).contains(&value));
            }
        }
    }
}
