// src/core/database.rs
//! Database connection management and schema migrations

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;
use tracing::info;

use crate::utils::ensure_dir_exists;

#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (or create) the database file and run migrations
    pub async fn new(database_path: &Path) -> Result<Self> {
        if let Some(parent) = database_path.parent() {
            if !parent.as_os_str().is_empty() {
                ensure_dir_exists(parent).await?;
            }
        }

        let database_url = format!("sqlite:{}", database_path.display());
        let options = SqliteConnectOptions::from_str(&database_url)
            .with_context(|| format!("Invalid database path: {}", database_path.display()))?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .connect_with(options)
            .await
            .with_context(|| {
                format!("Failed to connect to database: {}", database_path.display())
            })?;

        info!(
            "Database connection established: {}",
            database_path.display()
        );

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// Single-connection in-memory database, migrated. Every connection to
    /// `sqlite::memory:` is a separate database, hence the pool size of one.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .context("Failed to open in-memory database")?;

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Run database migrations
    pub async fn migrate(&self) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .with_context(|| format!("Migration failed: {}", first_line(statement)))?;
        }

        info!("Database migrations completed ({} statements)", SCHEMA.len());
        Ok(())
    }

    /// Check database health
    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .context("Database health check failed")?;
        Ok(())
    }
}

fn first_line(statement: &str) -> &str {
    statement
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("")
}

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS departments (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL COLLATE NOCASE UNIQUE,
        description TEXT,
        is_active BOOLEAN NOT NULL DEFAULT TRUE
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS job_definitions (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        version INTEGER NOT NULL DEFAULT 1 CHECK (version >= 1),
        department_id INTEGER REFERENCES departments(id) ON DELETE SET NULL,
        description TEXT,
        min_experience_years REAL NOT NULL DEFAULT 0 CHECK (min_experience_years >= 0),
        preferred_experience_years REAL CHECK (
            preferred_experience_years IS NULL OR preferred_experience_years >= min_experience_years
        ),
        min_education_level TEXT NOT NULL DEFAULT 'none',
        preferred_education_level TEXT,
        required_certifications TEXT,
        preferred_certifications TEXT,
        is_active BOOLEAN NOT NULL DEFAULT TRUE,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        updated_at TEXT NOT NULL DEFAULT (datetime('now')),
        UNIQUE (title, version)
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS positions (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        department_id INTEGER NOT NULL REFERENCES departments(id) ON DELETE CASCADE,
        job_definition_id INTEGER REFERENCES job_definitions(id) ON DELETE SET NULL,
        is_active BOOLEAN NOT NULL DEFAULT TRUE
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS persons (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        first_name TEXT NOT NULL,
        last_name TEXT NOT NULL,
        email TEXT NOT NULL COLLATE NOCASE UNIQUE,
        department_id INTEGER REFERENCES departments(id) ON DELETE SET NULL,
        position_id INTEGER REFERENCES positions(id) ON DELETE SET NULL,
        experience_years REAL NOT NULL DEFAULT 0 CHECK (experience_years >= 0),
        education_level TEXT NOT NULL DEFAULT 'none',
        hire_date TEXT,
        is_active BOOLEAN NOT NULL DEFAULT TRUE,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        updated_at TEXT NOT NULL DEFAULT (datetime('now'))
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS skill_templates (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL COLLATE NOCASE UNIQUE,
        category TEXT,
        description TEXT
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS person_skills (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        person_id INTEGER NOT NULL REFERENCES persons(id) ON DELETE CASCADE,
        skill_template_id INTEGER NOT NULL REFERENCES skill_templates(id) ON DELETE CASCADE,
        level INTEGER NOT NULL CHECK (level BETWEEN 1 AND 5),
        experience_years REAL NOT NULL DEFAULT 0 CHECK (experience_years >= 0),
        is_certified BOOLEAN NOT NULL DEFAULT FALSE,
        UNIQUE (person_id, skill_template_id)
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS qualifications (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        person_id INTEGER NOT NULL REFERENCES persons(id) ON DELETE CASCADE,
        name TEXT NOT NULL,
        issuer TEXT,
        score REAL CHECK (score IS NULL OR score BETWEEN 0 AND 100),
        obtained_on TEXT,
        expires_on TEXT
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS job_required_skills (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        job_definition_id INTEGER NOT NULL REFERENCES job_definitions(id) ON DELETE CASCADE,
        skill_template_id INTEGER NOT NULL REFERENCES skill_templates(id) ON DELETE CASCADE,
        importance TEXT NOT NULL CHECK (importance IN ('required', 'preferred', 'optional')),
        min_level INTEGER NOT NULL CHECK (min_level BETWEEN 1 AND 5),
        preferred_level INTEGER CHECK (preferred_level IS NULL OR preferred_level BETWEEN min_level AND 5),
        min_experience_years REAL NOT NULL DEFAULT 0 CHECK (min_experience_years >= 0),
        weight REAL NOT NULL DEFAULT 1 CHECK (weight > 0),
        certification_required BOOLEAN NOT NULL DEFAULT FALSE,
        UNIQUE (job_definition_id, skill_template_id)
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS job_definition_qualifications (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        job_definition_id INTEGER NOT NULL REFERENCES job_definitions(id) ON DELETE CASCADE,
        name TEXT NOT NULL,
        importance TEXT NOT NULL CHECK (importance IN ('required', 'preferred', 'optional')),
        min_score REAL CHECK (min_score IS NULL OR min_score BETWEEN 0 AND 100),
        weight REAL NOT NULL DEFAULT 1 CHECK (weight > 0)
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS qualification_matching_results (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        job_definition_id INTEGER NOT NULL REFERENCES job_definitions(id) ON DELETE CASCADE,
        person_id INTEGER NOT NULL REFERENCES persons(id) ON DELETE CASCADE,
        overall_match_percentage REAL NOT NULL CHECK (overall_match_percentage BETWEEN 0 AND 100),
        required_skills_match REAL NOT NULL CHECK (required_skills_match BETWEEN 0 AND 100),
        preferred_skills_match REAL NOT NULL CHECK (preferred_skills_match BETWEEN 0 AND 100),
        experience_match REAL NOT NULL CHECK (experience_match BETWEEN 0 AND 100),
        education_match REAL NOT NULL CHECK (education_match BETWEEN 0 AND 100),
        certification_match REAL NOT NULL CHECK (certification_match BETWEEN 0 AND 100),
        status TEXT NOT NULL CHECK (status IN ('matched', 'partial_match', 'no_match')),
        missing_requirements TEXT NOT NULL DEFAULT '',
        recommendations TEXT NOT NULL DEFAULT '',
        calculated_at TEXT NOT NULL DEFAULT (datetime('now')),
        reviewed_by TEXT,
        reviewed_at TEXT,
        review_notes TEXT,
        UNIQUE (job_definition_id, person_id)
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS leave_types (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL COLLATE NOCASE UNIQUE,
        default_days_per_year REAL NOT NULL DEFAULT 0 CHECK (default_days_per_year >= 0),
        max_carry_over_days REAL NOT NULL DEFAULT 0 CHECK (max_carry_over_days >= 0),
        is_paid BOOLEAN NOT NULL DEFAULT TRUE,
        is_active BOOLEAN NOT NULL DEFAULT TRUE
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS leaves (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        person_id INTEGER NOT NULL REFERENCES persons(id) ON DELETE CASCADE,
        leave_type_id INTEGER NOT NULL REFERENCES leave_types(id) ON DELETE RESTRICT,
        start_date TEXT NOT NULL,
        end_date TEXT NOT NULL,
        total_days REAL NOT NULL CHECK (total_days > 0),
        status TEXT NOT NULL CHECK (
            status IN ('pending', 'approved', 'in_progress', 'completed', 'rejected', 'cancelled')
        ),
        reason TEXT,
        decided_by TEXT,
        decided_at TEXT,
        decision_note TEXT,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        CHECK (end_date >= start_date)
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS leave_balances (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        person_id INTEGER NOT NULL REFERENCES persons(id) ON DELETE CASCADE,
        leave_type_id INTEGER NOT NULL REFERENCES leave_types(id) ON DELETE CASCADE,
        year INTEGER NOT NULL CHECK (year BETWEEN 2000 AND 2100),
        allocated_days REAL NOT NULL DEFAULT 0 CHECK (allocated_days >= 0),
        used_days REAL NOT NULL DEFAULT 0 CHECK (used_days >= 0),
        pending_days REAL NOT NULL DEFAULT 0 CHECK (pending_days >= 0),
        carried_over_days REAL NOT NULL DEFAULT 0 CHECK (carried_over_days >= 0),
        manual_adjustment REAL NOT NULL DEFAULT 0,
        adjustment_reason TEXT,
        adjustment_date TEXT,
        UNIQUE (person_id, leave_type_id, year)
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS job_postings (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        job_definition_id INTEGER NOT NULL REFERENCES job_definitions(id) ON DELETE RESTRICT,
        position_id INTEGER REFERENCES positions(id) ON DELETE SET NULL,
        title TEXT NOT NULL,
        description TEXT,
        status TEXT NOT NULL DEFAULT 'open' CHECK (status IN ('open', 'closed')),
        posted_on TEXT NOT NULL,
        closes_on TEXT,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        CHECK (closes_on IS NULL OR closes_on >= posted_on)
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS applications (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        job_posting_id INTEGER NOT NULL REFERENCES job_postings(id) ON DELETE CASCADE,
        person_id INTEGER NOT NULL REFERENCES persons(id) ON DELETE CASCADE,
        status TEXT NOT NULL CHECK (
            status IN ('submitted', 'screening', 'interview', 'offered', 'hired', 'rejected', 'withdrawn')
        ),
        cover_letter TEXT,
        applied_at TEXT NOT NULL DEFAULT (datetime('now')),
        updated_at TEXT NOT NULL DEFAULT (datetime('now')),
        UNIQUE (job_posting_id, person_id)
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS performance_reviews (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        person_id INTEGER NOT NULL REFERENCES persons(id) ON DELETE CASCADE,
        reviewer TEXT NOT NULL,
        period_start TEXT NOT NULL,
        period_end TEXT NOT NULL,
        rating INTEGER NOT NULL CHECK (rating BETWEEN 1 AND 5),
        comments TEXT,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        CHECK (period_end >= period_start)
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS payroll_records (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        person_id INTEGER NOT NULL REFERENCES persons(id) ON DELETE CASCADE,
        year INTEGER NOT NULL CHECK (year BETWEEN 2000 AND 2100),
        month INTEGER NOT NULL CHECK (month BETWEEN 1 AND 12),
        base_salary REAL NOT NULL CHECK (base_salary >= 0),
        bonus REAL NOT NULL DEFAULT 0 CHECK (bonus >= 0),
        deductions REAL NOT NULL DEFAULT 0 CHECK (deductions >= 0),
        net_pay REAL NOT NULL CHECK (net_pay >= 0),
        paid_on TEXT,
        UNIQUE (person_id, year, month)
    );
    "#,
    "CREATE INDEX IF NOT EXISTS idx_persons_department ON persons(department_id);",
    "CREATE INDEX IF NOT EXISTS idx_person_skills_person ON person_skills(person_id);",
    "CREATE INDEX IF NOT EXISTS idx_qualifications_person ON qualifications(person_id);",
    "CREATE INDEX IF NOT EXISTS idx_job_required_skills_job ON job_required_skills(job_definition_id);",
    "CREATE INDEX IF NOT EXISTS idx_match_results_job ON qualification_matching_results(job_definition_id);",
    "CREATE INDEX IF NOT EXISTS idx_leaves_person ON leaves(person_id, status);",
    "CREATE INDEX IF NOT EXISTS idx_applications_posting ON applications(job_posting_id);",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn migrations_are_repeatable() {
        let db = Database::in_memory().await.unwrap();
        db.migrate().await.unwrap();
        db.health_check().await.unwrap();

        let tables: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )
        .fetch_all(db.pool())
        .await
        .unwrap();
        let names: Vec<&str> = tables.iter().map(|(name,)| name.as_str()).collect();
        assert!(names.contains(&"qualification_matching_results"));
        assert!(names.contains(&"leave_balances"));
    }

    #[tokio::test]
    async fn balance_check_constraint_rejects_negative_days() {
        let db = Database::in_memory().await.unwrap();
        sqlx::query("INSERT INTO persons (first_name, last_name, email) VALUES ('A', 'B', 'a@b.io')")
            .execute(db.pool())
            .await
            .unwrap();
        sqlx::query("INSERT INTO leave_types (name, default_days_per_year) VALUES ('Annual', 25)")
            .execute(db.pool())
            .await
            .unwrap();
        let err = sqlx::query(
            "INSERT INTO leave_balances (person_id, leave_type_id, year, used_days) VALUES (1, 1, 2025, -1)",
        )
        .execute(db.pool())
        .await
        .unwrap_err();
        let hr_err: crate::error::HrError = err.into();
        assert!(matches!(hr_err, crate::error::HrError::Conflict(_)));
    }
}
