// src/matching/service.rs
//! Loads profiles, runs the engine and stores snapshots. Each pair is read,
//! scored and written with a single upsert, so concurrent runs for the same
//! pair settle on the last write.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tokio::sync::Semaphore;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::auth::Actor;
use crate::core::Database;
use crate::error::HrResult;
use crate::matching::scoring::MatchingEngine;
use crate::models::{JobDefinitionProfile, MatchStatus, QualificationMatchingResult};
use crate::repository::{JobDefinitionRepository, MatchResultRepository, PersonRepository};

#[derive(Debug, Clone, Serialize)]
pub struct MatchFailure {
    pub person_id: i64,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BulkMatchReport {
    pub run_id: Uuid,
    pub job_definition_id: i64,
    pub evaluated: usize,
    pub matched: usize,
    pub partial_match: usize,
    pub no_match: usize,
    pub results: Vec<QualificationMatchingResult>,
    pub failures: Vec<MatchFailure>,
}

impl BulkMatchReport {
    fn new(job_definition_id: i64) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            job_definition_id,
            evaluated: 0,
            matched: 0,
            partial_match: 0,
            no_match: 0,
            results: Vec::new(),
            failures: Vec::new(),
        }
    }

    fn record(&mut self, result: QualificationMatchingResult) {
        self.evaluated += 1;
        match result.status {
            MatchStatus::Matched => self.matched += 1,
            MatchStatus::PartialMatch => self.partial_match += 1,
            MatchStatus::NoMatch => self.no_match += 1,
        }
        self.results.push(result);
    }
}

#[derive(Clone)]
pub struct MatchingService {
    db: Database,
    engine: MatchingEngine,
    concurrency: usize,
}

impl MatchingService {
    pub fn new(db: Database, concurrency: usize) -> Self {
        Self {
            db,
            engine: MatchingEngine::default(),
            concurrency: concurrency.max(1),
        }
    }

    /// Score one person against one job definition and store the snapshot.
    #[instrument(skip(self, actor), fields(actor = %actor.user_id))]
    pub async fn match_pair(
        &self,
        actor: &Actor,
        job_definition_id: i64,
        person_id: i64,
        as_of: NaiveDate,
    ) -> HrResult<QualificationMatchingResult> {
        actor.require_matching()?;
        let job = JobDefinitionRepository::new(self.db.pool())
            .load_profile(job_definition_id)
            .await?;
        let stored = evaluate_and_store(&self.db, &self.engine, &job, person_id, as_of).await?;

        info!(
            "Matched person {} against job definition {}: {:.2}% ({})",
            person_id, job_definition_id, stored.overall_match_percentage, stored.status
        );
        Ok(stored)
    }

    /// Score every active person against a job definition. A pair that fails
    /// is recorded in the report and the run carries on.
    #[instrument(skip(self, actor), fields(actor = %actor.user_id))]
    pub async fn match_all_active(
        &self,
        actor: &Actor,
        job_definition_id: i64,
        as_of: NaiveDate,
    ) -> HrResult<BulkMatchReport> {
        actor.require_matching()?;
        let job = Arc::new(
            JobDefinitionRepository::new(self.db.pool())
                .load_profile(job_definition_id)
                .await?,
        );
        let person_ids = PersonRepository::new(self.db.pool()).list_active_ids().await?;

        let mut report = BulkMatchReport::new(job_definition_id);
        info!(
            "Bulk match {} started: job definition {}, {} persons, concurrency {}",
            report.run_id,
            job_definition_id,
            person_ids.len(),
            self.concurrency
        );

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut handles = Vec::with_capacity(person_ids.len());
        for person_id in person_ids {
            let db = self.db.clone();
            let engine = self.engine;
            let job = Arc::clone(&job);
            let semaphore = Arc::clone(&semaphore);
            let handle = tokio::spawn(async move {
                let _permit = semaphore.acquire().await;
                evaluate_and_store(&db, &engine, &job, person_id, as_of).await
            });
            handles.push((person_id, handle));
        }

        for (person_id, handle) in handles {
            match handle.await {
                Ok(Ok(result)) => report.record(result),
                Ok(Err(err)) => {
                    warn!("Bulk match {}: person {} skipped: {}", report.run_id, person_id, err);
                    report.failures.push(MatchFailure {
                        person_id,
                        message: err.to_string(),
                    });
                }
                Err(join_err) => {
                    error!("Bulk match {}: task for person {} failed: {}", report.run_id, person_id, join_err);
                    report.failures.push(MatchFailure {
                        person_id,
                        message: format!("matching task failed: {}", join_err),
                    });
                }
            }
        }

        report.results.sort_by(|a, b| {
            b.overall_match_percentage
                .total_cmp(&a.overall_match_percentage)
                .then(a.person_id.cmp(&b.person_id))
        });

        info!(
            "Bulk match {} finished: {} matched, {} partial, {} no match, {} failed",
            report.run_id,
            report.matched,
            report.partial_match,
            report.no_match,
            report.failures.len()
        );
        Ok(report)
    }

    /// Stored results for a job definition, best first.
    pub async fn results_for_job(
        &self,
        actor: &Actor,
        job_definition_id: i64,
        status: Option<MatchStatus>,
    ) -> HrResult<Vec<QualificationMatchingResult>> {
        actor.require_matching()?;
        JobDefinitionRepository::new(self.db.pool())
            .find(job_definition_id)
            .await?;
        MatchResultRepository::new(self.db.pool())
            .list_for_job(job_definition_id, status)
            .await
    }

    #[instrument(skip(self, actor, notes), fields(actor = %actor.user_id))]
    pub async fn review(
        &self,
        actor: &Actor,
        result_id: i64,
        notes: Option<&str>,
    ) -> HrResult<QualificationMatchingResult> {
        actor.require_matching()?;
        let notes = notes.map(str::trim).filter(|text| !text.is_empty());
        MatchResultRepository::new(self.db.pool())
            .review(result_id, &actor.user_id, notes)
            .await
    }
}

async fn evaluate_and_store(
    db: &Database,
    engine: &MatchingEngine,
    job: &JobDefinitionProfile,
    person_id: i64,
    as_of: NaiveDate,
) -> HrResult<QualificationMatchingResult> {
    let person = PersonRepository::new(db.pool()).load_profile(person_id).await?;
    let outcome = engine.evaluate(job, &person, as_of);
    MatchResultRepository::new(db.pool())
        .upsert(&outcome, Utc::now())
        .await
}
