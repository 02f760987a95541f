// tests/matching_service.rs
use chrono::NaiveDate;

use hr_engine::auth::Actor;
use hr_engine::core::Database;
use hr_engine::matching::MatchingService;
use hr_engine::models::job::{JobRequiredSkillInput, NewJobDefinition};
use hr_engine::models::person::{NewPerson, PersonSkillInput};
use hr_engine::models::{EducationLevel, Importance, MatchStatus, Role};
use hr_engine::repository::{
    JobDefinitionRepository, MatchResultRepository, PersonRepository, SkillRepository,
};
use hr_engine::HrError;

fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2031, 1, 15).unwrap()
}

fn recruiter() -> Actor {
    Actor::new("rec-1", vec![Role::Recruiter], None)
}

fn person(first: &str, email: &str, years: f64, education: EducationLevel, active: bool) -> NewPerson {
    NewPerson {
        first_name: first.into(),
        last_name: "Tester".into(),
        email: email.into(),
        department_id: None,
        position_id: None,
        experience_years: years,
        education_level: education,
        hire_date: None,
        is_active: active,
    }
}

/// A job needing Rust at level 3, three years and a bachelor, plus three
/// persons: a strong match, a weak one and an inactive one.
async fn seed(db: &Database) -> (i64, i64, i64) {
    let rust = SkillRepository::new(db.pool()).find_or_create("Rust").await.unwrap();
    let jobs = JobDefinitionRepository::new(db.pool());
    let job = jobs
        .create(&NewJobDefinition {
            title: "Platform Engineer".into(),
            version: 1,
            department_id: None,
            description: None,
            min_experience_years: 3.0,
            preferred_experience_years: None,
            min_education_level: EducationLevel::Bachelor,
            preferred_education_level: None,
            required_certifications: None,
            preferred_certifications: None,
        })
        .await
        .unwrap();
    jobs.upsert_required_skill(
        job.id,
        &JobRequiredSkillInput {
            skill_template_id: rust.id,
            importance: Importance::Required,
            min_level: 3,
            preferred_level: None,
            min_experience_years: 0.0,
            weight: 1.0,
            certification_required: false,
        },
    )
    .await
    .unwrap();

    let persons = PersonRepository::new(db.pool());
    let strong = persons
        .create(&person("Ada", "ada@example.com", 6.0, EducationLevel::Master, true))
        .await
        .unwrap();
    persons
        .upsert_skill(
            strong.id,
            &PersonSkillInput {
                skill_template_id: rust.id,
                level: 4,
                experience_years: 4.0,
                is_certified: false,
            },
        )
        .await
        .unwrap();
    let weak = persons
        .create(&person("Ben", "ben@example.com", 0.0, EducationLevel::HighSchool, true))
        .await
        .unwrap();
    persons
        .create(&person("Cy", "cy@example.com", 10.0, EducationLevel::Doctorate, false))
        .await
        .unwrap();

    (job.id, strong.id, weak.id)
}

#[tokio::test]
async fn rematching_a_pair_updates_the_single_snapshot() {
    let db = Database::in_memory().await.unwrap();
    let (job_id, strong_id, _) = seed(&db).await;
    let service = MatchingService::new(db.clone(), 4);

    let first = service.match_pair(&recruiter(), job_id, strong_id, as_of()).await.unwrap();
    assert_eq!(first.overall_match_percentage, 100.0);
    assert_eq!(first.status, MatchStatus::Matched);

    let reviewed = service
        .review(&recruiter(), first.id, Some("  strong fit  "))
        .await
        .unwrap();
    assert_eq!(reviewed.reviewed_by.as_deref(), Some("rec-1"));
    assert_eq!(reviewed.review_notes.as_deref(), Some("strong fit"));

    let second = service.match_pair(&recruiter(), job_id, strong_id, as_of()).await.unwrap();
    assert_eq!(second.id, first.id);
    assert_eq!(second.overall_match_percentage, first.overall_match_percentage);
    assert_eq!(second.required_skills_match, first.required_skills_match);
    assert_eq!(second.review_notes.as_deref(), Some("strong fit"));

    let stored = service.results_for_job(&recruiter(), job_id, None).await.unwrap();
    assert_eq!(stored.len(), 1);
}

#[tokio::test]
async fn bulk_run_scores_active_persons_best_first() {
    let db = Database::in_memory().await.unwrap();
    let (job_id, strong_id, weak_id) = seed(&db).await;
    let service = MatchingService::new(db.clone(), 2);

    let report = service.match_all_active(&recruiter(), job_id, as_of()).await.unwrap();
    assert_eq!(report.evaluated, 2);
    assert_eq!(report.matched, 1);
    assert_eq!(report.no_match, 1);
    assert!(report.failures.is_empty());
    assert_eq!(report.results[0].person_id, strong_id);
    assert_eq!(report.results[1].person_id, weak_id);

    let weak = &report.results[1];
    assert_eq!(weak.required_skills_match, 0.0);
    assert_eq!(weak.experience_match, 0.0);
    assert!(weak
        .missing_requirements_list()
        .iter()
        .any(|line| line.contains("Rust")));

    let no_match = service
        .results_for_job(&recruiter(), job_id, Some(MatchStatus::NoMatch))
        .await
        .unwrap();
    assert_eq!(no_match.len(), 1);
    assert_eq!(no_match[0].person_id, weak_id);
}

#[tokio::test]
async fn bulk_run_reports_the_same_snapshot_as_a_single_match() {
    let db = Database::in_memory().await.unwrap();
    let (job_id, strong_id, _) = seed(&db).await;
    let service = MatchingService::new(db.clone(), 3);

    service.match_all_active(&recruiter(), job_id, as_of()).await.unwrap();
    service.match_all_active(&recruiter(), job_id, as_of()).await.unwrap();

    let snapshot = MatchResultRepository::new(db.pool())
        .find_for_pair(job_id, strong_id)
        .await
        .unwrap()
        .unwrap();
    let single = service.match_pair(&recruiter(), job_id, strong_id, as_of()).await.unwrap();
    assert_eq!(single.id, snapshot.id);
    assert_eq!(single.overall_match_percentage, snapshot.overall_match_percentage);
    assert_eq!(
        service.results_for_job(&recruiter(), job_id, None).await.unwrap().len(),
        2
    );
}

#[tokio::test]
async fn unknown_job_and_unauthorized_actor_are_refused() {
    let db = Database::in_memory().await.unwrap();
    let (job_id, strong_id, _) = seed(&db).await;
    let service = MatchingService::new(db.clone(), 1);

    let err = service
        .match_all_active(&recruiter(), job_id + 50, as_of())
        .await
        .unwrap_err();
    assert!(matches!(err, HrError::NotFound { entity: "job definition", .. }));

    let err = service
        .match_pair(&recruiter(), job_id, strong_id + 50, as_of())
        .await
        .unwrap_err();
    assert!(matches!(err, HrError::NotFound { entity: "person", .. }));

    let employee = Actor::new("emp", vec![Role::Employee], Some(strong_id));
    let err = service
        .match_pair(&employee, job_id, strong_id, as_of())
        .await
        .unwrap_err();
    assert!(matches!(err, HrError::Forbidden(_)));
}

#[tokio::test]
async fn unreadable_person_is_reported_and_the_run_continues() {
    let db = Database::in_memory().await.unwrap();
    let (job_id, strong_id, weak_id) = seed(&db).await;
    sqlx::query("UPDATE persons SET education_level = 'wizard' WHERE id = ?")
        .bind(weak_id)
        .execute(db.pool())
        .await
        .unwrap();
    let service = MatchingService::new(db.clone(), 2);

    let report = service.match_all_active(&recruiter(), job_id, as_of()).await.unwrap();
    assert_eq!(report.evaluated, 1);
    assert_eq!(report.matched, 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].person_id, weak_id);
    assert!(!report.failures[0].message.is_empty());
    assert_eq!(report.results[0].person_id, strong_id);

    let results = MatchResultRepository::new(db.pool());
    assert!(results.find_for_pair(job_id, strong_id).await.unwrap().is_some());
    assert!(results.find_for_pair(job_id, weak_id).await.unwrap().is_none());
}
