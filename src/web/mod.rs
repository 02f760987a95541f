// src/web/mod.rs
pub mod handlers;
pub mod types;

pub use types::*;

use crate::auth::{AuthConfig, AuthenticatedUser, OptionalAuth};
use crate::core::{ConfigManager, Database};
use crate::leave::{BalanceSummary, LeaveService, OpenYearSummary};
use crate::matching::{BulkMatchReport, MatchingService};
use crate::models::job::{JobDefinitionQualificationInput, JobRequiredSkillInput, NewJobDefinition};
use crate::models::leave::{BalanceAdjustment, LeaveRequest, NewLeaveType};
use crate::models::matching::MatchReview;
use crate::models::organization::{NewDepartment, NewPosition};
use crate::models::person::{NewPerson, NewQualification, NewSkillTemplate, PersonSkillInput};
use crate::models::recruitment::{ApplicationStatusChange, NewApplication, NewJobPosting};
use crate::models::staff::{NewPayrollRecord, NewPerformanceReview};
use crate::models::{
    Application, Department, JobDefinition, JobDefinitionProfile, JobDefinitionQualification,
    JobPosting, JobRequiredSkill, Leave, LeaveType, PayrollRecord, PerformanceReview, Person,
    PersonProfile, PersonSkill, Position, Qualification, QualificationMatchingResult,
    RankedApplication, SkillTemplate,
};
use anyhow::{Context, Result};
use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::{Header, Status};
use rocket::serde::json::Json;
use rocket::{catchers, delete, get, options, post, put, routes, Build, Request, Response, Rocket, State};
use tracing::info;

pub struct Cors;

#[rocket::async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "Add CORS headers to responses",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, _request: &'r Request<'_>, response: &mut Response<'r>) {
        response.set_header(Header::new("Access-Control-Allow-Origin", "*"));
        response.set_header(Header::new(
            "Access-Control-Allow-Methods",
            "POST, GET, PUT, DELETE, OPTIONS",
        ));
        response.set_header(Header::new("Access-Control-Allow-Headers", "*"));
        response.set_header(Header::new("Access-Control-Allow-Credentials", "true"));
    }
}

// ===== System =====

#[get("/health")]
pub async fn health(auth: OptionalAuth, db: &State<Database>) -> Json<DataResponse<HealthInfo>> {
    handlers::health_handler(auth, db).await
}

#[get("/me")]
pub async fn get_current_user(auth: AuthenticatedUser) -> Json<DataResponse<UserInfo>> {
    handlers::get_current_user_handler(auth).await
}

// ===== Organization =====

#[get("/departments")]
pub async fn list_departments(auth: AuthenticatedUser, db: &State<Database>) -> ApiResult<Vec<Department>> {
    handlers::list_departments_handler(auth, db).await
}

#[post("/departments", data = "<request>")]
pub async fn create_department(
    request: Json<StandardRequest<NewDepartment>>,
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<Department> {
    handlers::create_department_handler(request, auth, db).await
}

#[get("/positions?<department_id>")]
pub async fn list_positions(
    department_id: Option<i64>,
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<Vec<Position>> {
    handlers::list_positions_handler(department_id, auth, db).await
}

#[post("/positions", data = "<request>")]
pub async fn create_position(
    request: Json<StandardRequest<NewPosition>>,
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<Position> {
    handlers::create_position_handler(request, auth, db).await
}

// ===== Skills and persons =====

#[get("/skills")]
pub async fn list_skills(auth: AuthenticatedUser, db: &State<Database>) -> ApiResult<Vec<SkillTemplate>> {
    handlers::list_skills_handler(auth, db).await
}

#[post("/skills", data = "<request>")]
pub async fn create_skill(
    request: Json<StandardRequest<NewSkillTemplate>>,
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<SkillTemplate> {
    handlers::create_skill_handler(request, auth, db).await
}

#[get("/persons?<active>")]
pub async fn list_persons(
    active: Option<bool>,
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<Vec<Person>> {
    handlers::list_persons_handler(active, auth, db).await
}

#[post("/persons", data = "<request>")]
pub async fn create_person(
    request: Json<StandardRequest<NewPerson>>,
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<Person> {
    handlers::create_person_handler(request, auth, db).await
}

#[get("/persons/<id>")]
pub async fn get_person(id: i64, auth: AuthenticatedUser, db: &State<Database>) -> ApiResult<PersonProfile> {
    handlers::get_person_handler(id, auth, db).await
}

#[put("/persons/<id>", data = "<request>")]
pub async fn update_person(
    id: i64,
    request: Json<StandardRequest<NewPerson>>,
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<Person> {
    handlers::update_person_handler(id, request, auth, db).await
}

#[delete("/persons/<id>")]
pub async fn delete_person(id: i64, auth: AuthenticatedUser, db: &State<Database>) -> ActionResult {
    handlers::delete_person_handler(id, auth, db).await
}

#[put("/persons/<id>/skills", data = "<request>")]
pub async fn upsert_person_skill(
    id: i64,
    request: Json<StandardRequest<PersonSkillInput>>,
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<PersonSkill> {
    handlers::upsert_person_skill_handler(id, request, auth, db).await
}

#[delete("/persons/<id>/skills/<skill_id>")]
pub async fn remove_person_skill(
    id: i64,
    skill_id: i64,
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> ActionResult {
    handlers::remove_person_skill_handler(id, skill_id, auth, db).await
}

#[post("/persons/<id>/qualifications", data = "<request>")]
pub async fn add_qualification(
    id: i64,
    request: Json<StandardRequest<NewQualification>>,
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<Qualification> {
    handlers::add_qualification_handler(id, request, auth, db).await
}

// ===== Job definitions =====

#[get("/job-definitions?<active>")]
pub async fn list_job_definitions(
    active: Option<bool>,
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<Vec<JobDefinition>> {
    handlers::list_job_definitions_handler(active, auth, db).await
}

#[post("/job-definitions", data = "<request>")]
pub async fn create_job_definition(
    request: Json<StandardRequest<NewJobDefinition>>,
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<JobDefinition> {
    handlers::create_job_definition_handler(request, auth, db).await
}

#[get("/job-definitions/<id>")]
pub async fn get_job_definition(
    id: i64,
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<JobDefinitionProfile> {
    handlers::get_job_definition_handler(id, auth, db).await
}

#[delete("/job-definitions/<id>")]
pub async fn deactivate_job_definition(
    id: i64,
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> ActionResult {
    handlers::deactivate_job_definition_handler(id, auth, db).await
}

#[put("/job-definitions/<id>/skills", data = "<request>")]
pub async fn upsert_job_skill(
    id: i64,
    request: Json<StandardRequest<JobRequiredSkillInput>>,
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<JobRequiredSkill> {
    handlers::upsert_job_skill_handler(id, request, auth, db).await
}

#[post("/job-definitions/<id>/qualifications", data = "<request>")]
pub async fn add_job_qualification(
    id: i64,
    request: Json<StandardRequest<JobDefinitionQualificationInput>>,
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<JobDefinitionQualification> {
    handlers::add_job_qualification_handler(id, request, auth, db).await
}

// ===== Matching =====

#[post("/job-definitions/<id>/match/<person_id>")]
pub async fn match_pair(
    id: i64,
    person_id: i64,
    auth: AuthenticatedUser,
    matching: &State<MatchingService>,
) -> ApiResult<QualificationMatchingResult> {
    handlers::match_pair_handler(id, person_id, auth, matching).await
}

#[post("/job-definitions/<id>/match-all")]
pub async fn match_all(
    id: i64,
    auth: AuthenticatedUser,
    matching: &State<MatchingService>,
) -> ApiResult<BulkMatchReport> {
    handlers::match_all_handler(id, auth, matching).await
}

#[get("/job-definitions/<id>/matches?<status>")]
pub async fn list_matches(
    id: i64,
    status: Option<String>,
    auth: AuthenticatedUser,
    matching: &State<MatchingService>,
) -> ApiResult<Vec<QualificationMatchingResult>> {
    handlers::list_matches_handler(id, status, auth, matching).await
}

#[post("/matches/<id>/review", data = "<request>")]
pub async fn review_match(
    id: i64,
    request: Json<StandardRequest<MatchReview>>,
    auth: AuthenticatedUser,
    matching: &State<MatchingService>,
) -> ApiResult<QualificationMatchingResult> {
    handlers::review_match_handler(id, request, auth, matching).await
}

// ===== Leave =====

#[get("/leave-types")]
pub async fn list_leave_types(auth: AuthenticatedUser, db: &State<Database>) -> ApiResult<Vec<LeaveType>> {
    handlers::list_leave_types_handler(auth, db).await
}

#[post("/leave-types", data = "<request>")]
pub async fn create_leave_type(
    request: Json<StandardRequest<NewLeaveType>>,
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<LeaveType> {
    handlers::create_leave_type_handler(request, auth, db).await
}

#[post("/leaves", data = "<request>")]
pub async fn request_leave(
    request: Json<StandardRequest<LeaveRequest>>,
    auth: AuthenticatedUser,
    leaves: &State<LeaveService>,
) -> ApiResult<Leave> {
    handlers::request_leave_handler(request, auth, leaves).await
}

#[post("/leaves/<id>/approve", data = "<request>")]
pub async fn approve_leave(
    id: i64,
    request: Json<StandardRequest<DecisionRequest>>,
    auth: AuthenticatedUser,
    leaves: &State<LeaveService>,
) -> ApiResult<Leave> {
    handlers::approve_leave_handler(id, request, auth, leaves).await
}

#[post("/leaves/<id>/reject", data = "<request>")]
pub async fn reject_leave(
    id: i64,
    request: Json<StandardRequest<DecisionRequest>>,
    auth: AuthenticatedUser,
    leaves: &State<LeaveService>,
) -> ApiResult<Leave> {
    handlers::reject_leave_handler(id, request, auth, leaves).await
}

#[post("/leaves/<id>/cancel", data = "<request>")]
pub async fn cancel_leave(
    id: i64,
    request: Json<StandardRequest<DecisionRequest>>,
    auth: AuthenticatedUser,
    leaves: &State<LeaveService>,
) -> ApiResult<Leave> {
    handlers::cancel_leave_handler(id, request, auth, leaves).await
}

#[post("/leaves/refresh-statuses")]
pub async fn refresh_leave_statuses(
    auth: AuthenticatedUser,
    leaves: &State<LeaveService>,
) -> ActionResult {
    handlers::refresh_leave_statuses_handler(auth, leaves).await
}

#[get("/persons/<id>/leaves")]
pub async fn person_leaves(
    id: i64,
    auth: AuthenticatedUser,
    leaves: &State<LeaveService>,
) -> ApiResult<Vec<Leave>> {
    handlers::person_leaves_handler(id, auth, leaves).await
}

#[get("/persons/<id>/balances?<year>")]
pub async fn person_balances(
    id: i64,
    year: Option<i32>,
    auth: AuthenticatedUser,
    leaves: &State<LeaveService>,
) -> ApiResult<Vec<BalanceSummary>> {
    handlers::person_balances_handler(id, year, auth, leaves).await
}

#[post("/balances/<id>/adjust", data = "<request>")]
pub async fn adjust_balance(
    id: i64,
    request: Json<StandardRequest<BalanceAdjustment>>,
    auth: AuthenticatedUser,
    leaves: &State<LeaveService>,
) -> ApiResult<BalanceSummary> {
    handlers::adjust_balance_handler(id, request, auth, leaves).await
}

#[post("/leave-years/<year>/open")]
pub async fn open_leave_year(
    year: i32,
    auth: AuthenticatedUser,
    leaves: &State<LeaveService>,
) -> ApiResult<OpenYearSummary> {
    handlers::open_leave_year_handler(year, auth, leaves).await
}

// ===== Recruitment =====

#[get("/job-postings?<open>")]
pub async fn list_job_postings(
    open: Option<bool>,
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<Vec<JobPosting>> {
    handlers::list_job_postings_handler(open, auth, db).await
}

#[post("/job-postings", data = "<request>")]
pub async fn create_job_posting(
    request: Json<StandardRequest<NewJobPosting>>,
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<JobPosting> {
    handlers::create_job_posting_handler(request, auth, db).await
}

#[get("/job-postings/<id>")]
pub async fn get_job_posting(id: i64, auth: AuthenticatedUser, db: &State<Database>) -> ApiResult<JobPosting> {
    handlers::get_job_posting_handler(id, auth, db).await
}

#[post("/job-postings/<id>/close")]
pub async fn close_job_posting(id: i64, auth: AuthenticatedUser, db: &State<Database>) -> ApiResult<JobPosting> {
    handlers::close_job_posting_handler(id, auth, db).await
}

#[post("/job-postings/<id>/applications", data = "<request>")]
pub async fn apply(
    id: i64,
    request: Json<StandardRequest<NewApplication>>,
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<Application> {
    handlers::apply_handler(id, request, auth, db).await
}

#[get("/job-postings/<id>/applications")]
pub async fn list_applications(
    id: i64,
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<Vec<RankedApplication>> {
    handlers::list_applications_handler(id, auth, db).await
}

#[post("/applications/<id>/status", data = "<request>")]
pub async fn change_application_status(
    id: i64,
    request: Json<StandardRequest<ApplicationStatusChange>>,
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<Application> {
    handlers::change_application_status_handler(id, request, auth, db).await
}

// ===== Staff records =====

#[get("/persons/<id>/reviews")]
pub async fn person_reviews(
    id: i64,
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<Vec<PerformanceReview>> {
    handlers::person_reviews_handler(id, auth, db).await
}

#[post("/persons/<id>/reviews", data = "<request>")]
pub async fn add_review(
    id: i64,
    request: Json<StandardRequest<NewPerformanceReview>>,
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<PerformanceReview> {
    handlers::add_review_handler(id, request, auth, db).await
}

#[get("/persons/<id>/payroll?<year>")]
pub async fn person_payroll(
    id: i64,
    year: Option<i32>,
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<Vec<PayrollRecord>> {
    handlers::person_payroll_handler(id, year, auth, db).await
}

#[post("/persons/<id>/payroll", data = "<request>")]
pub async fn add_payroll(
    id: i64,
    request: Json<StandardRequest<NewPayrollRecord>>,
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<PayrollRecord> {
    handlers::add_payroll_handler(id, request, auth, db).await
}

#[options("/<_..>")]
pub async fn options() -> Status {
    Status::Ok
}

// ===== Catchers =====

fn caught(error: &str, code: &str, suggestions: &[&str]) -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        error.to_string(),
        code.to_string(),
        suggestions.iter().map(|s| s.to_string()).collect(),
        None,
    ))
}

#[rocket::catch(400)]
pub fn bad_request() -> Json<StandardErrorResponse> {
    caught(
        "Invalid request format",
        "BAD_REQUEST",
        &["Check your request JSON format", "Verify all required fields are present"],
    )
}

#[rocket::catch(401)]
pub fn unauthorized() -> Json<StandardErrorResponse> {
    caught(
        "Authentication required",
        "AUTHENTICATION_ERROR",
        &["Send a bearer token in the Authorization header"],
    )
}

#[rocket::catch(403)]
pub fn forbidden() -> Json<StandardErrorResponse> {
    caught("Access denied", "FORBIDDEN", &["Ask an administrator for the required role"])
}

#[rocket::catch(404)]
pub fn not_found() -> Json<StandardErrorResponse> {
    caught("Resource not found", "NOT_FOUND", &["Check the request path"])
}

#[rocket::catch(422)]
pub fn unprocessable() -> Json<StandardErrorResponse> {
    caught(
        "Request body could not be read",
        "VALIDATION_ERROR",
        &["Check field names and value types"],
    )
}

#[rocket::catch(500)]
pub fn internal_error() -> Json<StandardErrorResponse> {
    caught(
        "Internal server error",
        "INTERNAL_ERROR",
        &["Try again in a few moments", "Contact support if the problem persists"],
    )
}

/// Assemble the application without launching it.
pub fn build_rocket(
    figment: rocket::figment::Figment,
    db: Database,
    auth_config: AuthConfig,
    match_concurrency: usize,
) -> Rocket<Build> {
    let matching = MatchingService::new(db.clone(), match_concurrency);
    let leaves = LeaveService::new(db.clone());

    rocket::custom(figment)
        .attach(Cors)
        .manage(db)
        .manage(auth_config)
        .manage(matching)
        .manage(leaves)
        .register(
            "/api",
            catchers![bad_request, unauthorized, forbidden, not_found, unprocessable, internal_error],
        )
        .mount(
            "/api",
            routes![
                health,
                get_current_user,
                list_departments,
                create_department,
                list_positions,
                create_position,
                list_skills,
                create_skill,
                list_persons,
                create_person,
                get_person,
                update_person,
                delete_person,
                upsert_person_skill,
                remove_person_skill,
                add_qualification,
                list_job_definitions,
                create_job_definition,
                get_job_definition,
                deactivate_job_definition,
                upsert_job_skill,
                add_job_qualification,
                match_pair,
                match_all,
                list_matches,
                review_match,
                list_leave_types,
                create_leave_type,
                request_leave,
                approve_leave,
                reject_leave,
                cancel_leave,
                refresh_leave_statuses,
                person_leaves,
                person_balances,
                adjust_balance,
                open_leave_year,
                list_job_postings,
                create_job_posting,
                get_job_posting,
                close_job_posting,
                apply,
                list_applications,
                change_application_status,
                person_reviews,
                add_review,
                person_payroll,
                add_payroll,
                options,
            ],
        )
}

pub async fn start_web_server(config: &ConfigManager) -> Result<()> {
    let db = Database::new(&config.database_path).await?;
    let figment = rocket::Config::figment()
        .merge(("port", config.port))
        .merge(("address", "0.0.0.0"));

    info!("Starting staffhub API server on port {}", config.port);
    info!("Database: {}", config.database_path.display());
    info!("Environment: {}", config.environment);

    let _rocket = build_rocket(
        figment,
        db,
        AuthConfig::new(config.jwt_secret.clone()),
        config.match_concurrency,
    )
    .launch()
    .await
    .context("Rocket server failed")?;

    Ok(())
}
