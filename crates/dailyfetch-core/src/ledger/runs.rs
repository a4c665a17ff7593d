//! Run and fetch rows: begin, finish, record, list.

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::Row;

use super::db::{unix_timestamp, RunLedger};
use super::types::{FailedFetch, RunId, RunState, RunSummary};
use crate::scheduler::{BatchResult, OutcomeStatus, SourceReport, StopReason};

impl RunLedger {
    /// Insert a running row for a batch about to start.
    pub async fn begin_run(&self, cutoff: DateTime<Utc>, sources_total: usize) -> Result<RunId> {
        let row_id = sqlx::query(
            r#"
            INSERT INTO runs (state, started_at, cutoff, sources_total)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(RunState::Running.as_str())
        .bind(unix_timestamp())
        .bind(cutoff.to_rfc3339())
        .bind(sources_total as i64)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();
        Ok(row_id)
    }

    /// Store the final totals and stop reason.
    pub async fn finish_run(&self, id: RunId, result: &BatchResult) -> Result<()> {
        let state = match result.stop {
            StopReason::Completed => RunState::Completed,
            StopReason::QuotaExhausted => RunState::QuotaExhausted,
        };
        sqlx::query(
            r#"
            UPDATE runs
            SET state = ?1,
                finished_at = ?2,
                sources_processed = ?3,
                sources_failed = ?4,
                candidates_found = ?5,
                fetch_attempts = ?6,
                fetch_failures = ?7,
                skipped_archived = ?8
            WHERE id = ?9
            "#,
        )
        .bind(state.as_str())
        .bind(unix_timestamp())
        .bind(result.sources_processed as i64)
        .bind(result.sources_failed as i64)
        .bind(result.total_candidates_found as i64)
        .bind(result.total_fetch_attempts as i64)
        .bind(result.total_fetch_failures as i64)
        .bind(result.total_skipped_archived as i64)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Mark a run as aborted with the error that ended it.
    pub async fn abort_run(&self, id: RunId, error: &str) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE runs
            SET state = ?1,
                finished_at = ?2,
                error = ?3
            WHERE id = ?4
            "#,
        )
        .bind(RunState::Aborted.as_str())
        .bind(unix_timestamp())
        .bind(error)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Store every outcome of one source in a single transaction.
    pub async fn record_fetches(&self, id: RunId, report: &SourceReport) -> Result<usize> {
        let now = unix_timestamp();
        let mut tx = self.pool.begin().await?;
        for outcome in &report.dispatch.outcomes {
            sqlx::query(
                r#"
                INSERT INTO fetches (
                    run_id, source_label, container_id, video_id,
                    title, outcome, detail, recorded_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
            )
            .bind(id)
            .bind(&report.label)
            .bind(&report.container_id)
            .bind(&outcome.video_id)
            .bind(&outcome.title)
            .bind(outcome.status.as_str())
            .bind(outcome.detail.as_deref())
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(report.dispatch.outcomes.len())
    }

    /// Most recent runs first.
    pub async fn list_runs(&self, limit: u32) -> Result<Vec<RunSummary>> {
        let rows = sqlx::query(
            r#"
            SELECT id, state, started_at, finished_at, cutoff, sources_total,
                   sources_processed, sources_failed, candidates_found,
                   fetch_attempts, fetch_failures, skipped_archived, error
            FROM runs
            ORDER BY id DESC
            LIMIT ?1
            "#,
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let state: String = row.get("state");
            let cutoff: Option<String> = row.get("cutoff");
            out.push(RunSummary {
                id: row.get("id"),
                state: RunState::from_str(&state),
                started_at: row.get("started_at"),
                finished_at: row.get("finished_at"),
                cutoff: cutoff
                    .as_deref()
                    .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                    .map(|t| t.with_timezone(&Utc)),
                sources_total: row.get("sources_total"),
                sources_processed: row.get("sources_processed"),
                sources_failed: row.get("sources_failed"),
                candidates_found: row.get("candidates_found"),
                fetch_attempts: row.get("fetch_attempts"),
                fetch_failures: row.get("fetch_failures"),
                skipped_archived: row.get("skipped_archived"),
                error: row.get("error"),
            });
        }
        Ok(out)
    }

    /// Failed fetches of `run`, or of the latest run when `None`.
    pub async fn list_failures(&self, run: Option<RunId>) -> Result<Vec<FailedFetch>> {
        let run_id = match run {
            Some(id) => id,
            None => {
                let row = sqlx::query(r#"SELECT MAX(id) AS id FROM runs"#)
                    .fetch_one(&self.pool)
                    .await?;
                let latest: Option<i64> = row.get("id");
                match latest {
                    Some(id) => id,
                    None => return Ok(Vec::new()),
                }
            }
        };

        let rows = sqlx::query(
            r#"
            SELECT run_id, source_label, container_id, video_id, title, detail
            FROM fetches
            WHERE run_id = ?1 AND outcome = ?2
            ORDER BY id ASC
            "#,
        )
        .bind(run_id)
        .bind(OutcomeStatus::Failed.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| FailedFetch {
                run_id: row.get("run_id"),
                source_label: row.get("source_label"),
                container_id: row.get("container_id"),
                video_id: row.get("video_id"),
                title: row.get("title"),
                detail: row.get("detail"),
            })
            .collect())
    }
}
