// src/admin_cli.rs
use anyhow::Result;
use chrono::{Duration, Utc};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::auth::{Actor, AuthConfig};
use crate::core::{ConfigManager, Database};
use crate::error::HrError;
use crate::leave::LeaveService;
use crate::matching::MatchingService;
use crate::models::person::{NewPerson, PersonSkillInput, MAX_SKILL_LEVEL, MIN_SKILL_LEVEL};
use crate::models::{EducationLevel, Role};
use crate::repository::{PersonRepository, SkillRepository};
use crate::utils::{read_file_safe, validate_file_extension};
use crate::web::start_web_server;

#[derive(Parser)]
#[command(name = "staffhub")]
#[command(about = "HR records, qualification matching and leave balances")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Overrides the configured database path
    #[arg(long, global = true)]
    pub database_path: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API (default)
    Serve,
    /// Create the database and its schema
    Init,
    /// Import persons from a CSV file (first_name,last_name,email,experience_years,education_level,skills)
    ImportPersons { csv_file: PathBuf },
    /// Score one person against a job definition
    Match { job_definition_id: i64, person_id: i64 },
    /// Score every active person against a job definition
    MatchAll {
        job_definition_id: i64,
        /// Print the full report as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Create leave balances for a year with carry-over from the previous one
    OpenLeaveYear { year: i32 },
    /// Move approved leaves along by today's date
    RefreshLeaveStatuses,
    /// Sign a bearer token for local testing
    IssueToken {
        subject: String,
        #[arg(long = "role", required = true)]
        roles: Vec<Role>,
        #[arg(long)]
        person_id: Option<i64>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long, default_value_t = 24)]
        hours: i64,
    },
}

#[derive(Debug, Deserialize)]
struct PersonRow {
    first_name: String,
    last_name: String,
    email: String,
    #[serde(default)]
    experience_years: Option<f64>,
    #[serde(default)]
    education_level: Option<String>,
    #[serde(default)]
    skills: Option<String>,
}

pub async fn handle_command(cli: Cli, mut config: ConfigManager) -> Result<()> {
    if let Some(path) = cli.database_path {
        config.database_path = path;
    }

    let command = cli.command.unwrap_or(Command::Serve);
    if let Command::Serve = command {
        return start_web_server(&config).await;
    }
    if let Command::IssueToken {
        subject,
        roles,
        person_id,
        name,
        hours,
    } = command
    {
        let token = AuthConfig::new(config.jwt_secret.clone()).issue_token(
            &subject,
            name.as_deref(),
            &roles,
            person_id,
            Duration::hours(hours),
        )?;
        println!("{}", token);
        return Ok(());
    }

    let db = Database::new(&config.database_path).await?;
    let actor = Actor::system();
    let today = Utc::now().date_naive();

    match command {
        Command::Init => {
            info!("Database initialized at: {}", config.database_path.display());
        }

        Command::ImportPersons { csv_file } => {
            let (imported, failed) = import_persons(&db, &csv_file).await?;
            info!("Import completed: {} imported, {} failed", imported, failed);
        }

        Command::Match {
            job_definition_id,
            person_id,
        } => {
            let result = MatchingService::new(db, config.match_concurrency)
                .match_pair(&actor, job_definition_id, person_id, today)
                .await?;
            info!(
                "Person {} vs job definition {}: {:.2}% ({})",
                person_id, job_definition_id, result.overall_match_percentage, result.status
            );
            for line in result.missing_requirements_list() {
                info!("  missing: {}", line);
            }
            for line in result.recommendations_list() {
                info!("  recommended: {}", line);
            }
        }

        Command::MatchAll {
            job_definition_id,
            json,
        } => {
            let report = MatchingService::new(db, config.match_concurrency)
                .match_all_active(&actor, job_definition_id, today)
                .await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
                return Ok(());
            }
            info!("{:<8} {:<10} {:<14}", "Person", "Score", "Status");
            for result in &report.results {
                info!(
                    "{:<8} {:<10.2} {:<14}",
                    result.person_id, result.overall_match_percentage, result.status
                );
            }
            for failure in &report.failures {
                warn!("Person {} failed: {}", failure.person_id, failure.message);
            }
        }

        Command::OpenLeaveYear { year } => {
            let summary = LeaveService::new(db).open_year(&actor, year).await?;
            info!(
                "Leave year {} opened: {} created, {} already present",
                summary.year, summary.created, summary.existing
            );
        }

        Command::RefreshLeaveStatuses => {
            let changed = LeaveService::new(db).refresh_statuses(&actor, today).await?;
            info!("{} leave statuses updated", changed);
        }

        Command::Serve | Command::IssueToken { .. } => {}
    }

    Ok(())
}

/// Rows that fail are logged and counted; the rest are imported.
async fn import_persons(db: &Database, csv_file: &Path) -> Result<(usize, usize)> {
    validate_file_extension(&csv_file.to_string_lossy(), &["csv"])?;
    let content = read_file_safe(csv_file).await?;
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let persons = PersonRepository::new(db.pool());
    let skills = SkillRepository::new(db.pool());
    let mut imported = 0;
    let mut failed = 0;

    for (index, row) in reader.deserialize::<PersonRow>().enumerate() {
        let line = index + 2;
        let row = match row {
            Ok(row) => row,
            Err(e) => {
                failed += 1;
                warn!("Line {}: CSV parsing error: {}", line, e);
                continue;
            }
        };

        match import_row(&persons, &skills, &row).await {
            Ok(person_id) => {
                imported += 1;
                info!("Line {}: added {} {} ({})", line, row.first_name, row.last_name, person_id);
            }
            Err(HrError::Conflict(_)) => {
                failed += 1;
                warn!("Line {}: skipped, {} already exists", line, row.email);
            }
            Err(e) => {
                failed += 1;
                warn!("Line {}: failed to add {}: {}", line, row.email, e);
            }
        }
    }

    Ok((imported, failed))
}

async fn import_row(
    persons: &PersonRepository<'_>,
    skills: &SkillRepository<'_>,
    row: &PersonRow,
) -> Result<i64, HrError> {
    let education_level = match row.education_level.as_deref() {
        Some(raw) => raw
            .parse::<EducationLevel>()
            .map_err(|e| HrError::validation("education_level", e))?,
        None => EducationLevel::None,
    };
    let skill_levels = parse_skill_levels(row.skills.as_deref())?;

    let person = persons
        .create(&NewPerson {
            first_name: row.first_name.clone(),
            last_name: row.last_name.clone(),
            email: row.email.clone(),
            department_id: None,
            position_id: None,
            experience_years: row.experience_years.unwrap_or(0.0),
            education_level,
            hire_date: None,
            is_active: true,
        })
        .await?;

    // a row is imported whole or not at all
    if let Err(e) = attach_skills(persons, skills, person.id, &skill_levels).await {
        persons.delete(person.id).await?;
        return Err(e);
    }

    Ok(person.id)
}

async fn attach_skills(
    persons: &PersonRepository<'_>,
    skills: &SkillRepository<'_>,
    person_id: i64,
    skill_levels: &[(String, i64)],
) -> Result<(), HrError> {
    for (name, level) in skill_levels {
        let template = skills.find_or_create(name).await?;
        persons
            .upsert_skill(
                person_id,
                &PersonSkillInput {
                    skill_template_id: template.id,
                    level: *level,
                    experience_years: 0.0,
                    is_certified: false,
                },
            )
            .await?;
    }
    Ok(())
}

/// "Rust:4; SQL:3" into name/level pairs, checked before anything is written
fn parse_skill_levels(raw: Option<&str>) -> Result<Vec<(String, i64)>, HrError> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };
    raw.split(';')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (name, level) = entry
                .rsplit_once(':')
                .ok_or_else(|| HrError::validation("skills", format!("'{}' needs name:level", entry)))?;
            let level = level
                .trim()
                .parse::<i64>()
                .map_err(|_| HrError::validation("skills", format!("'{}' has no numeric level", entry)))?;
            let name = name.trim();
            if name.is_empty() {
                return Err(HrError::validation("skills", format!("'{}' has no skill name", entry)));
            }
            if !(MIN_SKILL_LEVEL..=MAX_SKILL_LEVEL).contains(&level) {
                return Err(HrError::validation(
                    "skills",
                    format!(
                        "'{}' level must be between {} and {}",
                        entry, MIN_SKILL_LEVEL, MAX_SKILL_LEVEL
                    ),
                ));
            }
            Ok((name.to_string(), level))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_skill_levels() {
        let parsed = parse_skill_levels(Some("Rust:4; SQL : 3;")).unwrap();
        assert_eq!(parsed, vec![("Rust".to_string(), 4), ("SQL".to_string(), 3)]);
        assert!(parse_skill_levels(Some("Rust")).is_err());
        assert!(parse_skill_levels(Some("Rust:9")).is_err());
        assert!(parse_skill_levels(Some(" :3")).is_err());
        assert!(parse_skill_levels(None).unwrap().is_empty());
    }

    #[tokio::test]
    async fn imports_persons_from_csv() {
        let db = Database::in_memory().await.unwrap();
        let dir = std::env::temp_dir().join(format!("staffhub-import-{}", uuid::Uuid::new_v4()));
        tokio::fs::create_dir_all(&dir).await.unwrap();
        let csv_path = dir.join("persons.csv");
        tokio::fs::write(
            &csv_path,
            "first_name,last_name,email,experience_years,education_level,skills\n\
             Ada,Lovelace,ada@example.org,6,master,Rust:4;SQL:3\n\
             Alan,Turing,not-an-email,2,doctorate,\n\
             Ada,Again,ada@example.org,1,bachelor,\n",
        )
        .await
        .unwrap();

        let (imported, failed) = import_persons(&db, &csv_path).await.unwrap();
        assert_eq!((imported, failed), (1, 2));

        let persons = PersonRepository::new(db.pool()).list(false).await.unwrap();
        assert_eq!(persons.len(), 1);
        let profile = PersonRepository::new(db.pool())
            .load_profile(persons[0].id)
            .await
            .unwrap();
        assert_eq!(profile.skills.len(), 2);
        assert_eq!(profile.person.education_level, EducationLevel::Master);

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn rejected_row_leaves_nothing_behind() {
        let db = Database::in_memory().await.unwrap();
        let dir = std::env::temp_dir().join(format!("staffhub-import-{}", uuid::Uuid::new_v4()));
        tokio::fs::create_dir_all(&dir).await.unwrap();
        let csv_path = dir.join("persons.csv");
        let header = "first_name,last_name,email,experience_years,education_level,skills\n";

        tokio::fs::write(&csv_path, format!("{}Ada,Lovelace,ada@example.org,3,bachelor,Rust:9\n", header))
            .await
            .unwrap();
        assert_eq!(import_persons(&db, &csv_path).await.unwrap(), (0, 1));
        assert!(PersonRepository::new(db.pool()).list(false).await.unwrap().is_empty());

        tokio::fs::write(&csv_path, format!("{}Ada,Lovelace,ada@example.org,3,bachelor,Rust:4\n", header))
            .await
            .unwrap();
        assert_eq!(import_persons(&db, &csv_path).await.unwrap(), (1, 0));

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}
