// src/web/handlers/matching_handlers.rs
use chrono::Utc;
use rocket::serde::json::Json;
use rocket::State;

use crate::auth::AuthenticatedUser;
use crate::error::HrError;
use crate::matching::{BulkMatchReport, MatchingService};
use crate::models::matching::MatchReview;
use crate::models::{MatchStatus, QualificationMatchingResult};
use crate::web::handlers::OrApiError;
use crate::web::types::*;

pub async fn match_pair_handler(
    id: i64,
    person_id: i64,
    auth: AuthenticatedUser,
    matching: &State<MatchingService>,
) -> ApiResult<QualificationMatchingResult> {
    let today = Utc::now().date_naive();
    let result = matching
        .match_pair(&auth.actor, id, person_id, today)
        .await
        .or_api(&None)?;

    let display = score_breakdown(&result);
    Ok(Json(
        DataResponse::success(
            format!(
                "Person {} scores {:.2}% ({})",
                result.person_id, result.overall_match_percentage, result.status
            ),
            result,
            None,
        )
        .with_display_format(display),
    ))
}

pub async fn match_all_handler(
    id: i64,
    auth: AuthenticatedUser,
    matching: &State<MatchingService>,
) -> ApiResult<BulkMatchReport> {
    let today = Utc::now().date_naive();
    let report = matching
        .match_all_active(&auth.actor, id, today)
        .await
        .or_api(&None)?;
    Ok(Json(DataResponse::success(
        format!(
            "{} persons evaluated: {} matched, {} partial, {} no match, {} failed",
            report.evaluated,
            report.matched,
            report.partial_match,
            report.no_match,
            report.failures.len()
        ),
        report,
        None,
    )))
}

pub async fn list_matches_handler(
    id: i64,
    status: Option<String>,
    auth: AuthenticatedUser,
    matching: &State<MatchingService>,
) -> ApiResult<Vec<QualificationMatchingResult>> {
    let status = status
        .as_deref()
        .map(str::parse::<MatchStatus>)
        .transpose()
        .map_err(|e| HrError::validation("status", e))
        .or_api(&None)?;

    let results = matching
        .results_for_job(&auth.actor, id, status)
        .await
        .or_api(&None)?;
    Ok(Json(DataResponse::success(
        format!("{} match results", results.len()),
        results,
        None,
    )))
}

pub async fn review_match_handler(
    id: i64,
    request: Json<StandardRequest<MatchReview>>,
    auth: AuthenticatedUser,
    matching: &State<MatchingService>,
) -> ApiResult<QualificationMatchingResult> {
    let conversation_id = request.conversation_id();
    let reviewed = matching
        .review(&auth.actor, id, request.data.notes.as_deref())
        .await
        .or_api(&conversation_id)?;
    Ok(Json(DataResponse::success(
        format!("Match result {} reviewed", reviewed.id),
        reviewed,
        conversation_id,
    )))
}

fn score_breakdown(result: &QualificationMatchingResult) -> DisplayFormat {
    let section = |title: &str, score: f64| DisplaySection {
        title: title.to_string(),
        content: format!("{:.2}%", score),
        score: Some(format!("{:.0}", score)),
        points: None,
    };

    let mut sections = vec![
        section("Required skills", result.required_skills_match),
        section("Preferred skills", result.preferred_skills_match),
        section("Experience", result.experience_match),
        section("Education", result.education_match),
        section("Certifications", result.certification_match),
    ];
    for (title, lines) in [
        ("Missing requirements", result.missing_requirements_list()),
        ("Recommendations", result.recommendations_list()),
    ] {
        if !lines.is_empty() {
            sections.push(DisplaySection {
                title: title.to_string(),
                content: format!("{} items", lines.len()),
                score: None,
                points: Some(lines.into_iter().map(str::to_string).collect()),
            });
        }
    }

    DisplayFormat {
        format_type: "match_breakdown".to_string(),
        sections: Some(sections),
    }
}
