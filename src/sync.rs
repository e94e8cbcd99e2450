//! The completion sync: validate the database once, then repeatedly query
//! for finished records lacking a completion date and stamp each with its
//! own last-edited time.

use anyhow::Context;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::notion::queries::{completion_filter, completion_patch, query_body};
use crate::notion::{NotionApi, NotionError, Page, QueryResponse};
use crate::retry::{retry_fixed, BackoffPolicy, RetryAction};
use crate::schema::validate_database;

/// What happened to one record during a pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchOutcome {
    Applied,
    /// Write was not sent because of `--dry-run`.
    DryRun,
    Failed(String),
}

/// A completion date written (or attempted) for one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchAction {
    pub page_id: String,
    pub completed_on: String,
    pub outcome: PatchOutcome,
}

fn classify(e: &NotionError) -> RetryAction {
    if e.is_rate_limited() {
        RetryAction::Retry
    } else {
        RetryAction::Abort
    }
}

pub struct Syncer<'a> {
    api: &'a dyn NotionApi,
    config: &'a Config,
    backoff: BackoffPolicy,
    shutdown: CancellationToken,
}

impl<'a> Syncer<'a> {
    pub fn new(api: &'a dyn NotionApi, config: &'a Config) -> Self {
        Self {
            api,
            config,
            backoff: BackoffPolicy {
                delay: config.backoff,
                max_retries: config.max_rate_limit_retries,
            },
            shutdown: CancellationToken::new(),
        }
    }

    /// Stop waiting out rate limits once `token` is cancelled.
    pub fn with_shutdown(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    /// Issue one query request, waiting out rate limits.
    async fn query_once(&self, body: &Value) -> Result<QueryResponse, NotionError> {
        retry_fixed(&self.backoff, &self.shutdown, classify, || {
            self.api.query_database(&self.config.database_id, body)
        })
        .await
    }

    /// Fetch every record matching the completion filter, following
    /// `next_cursor` until Notion reports no more pages.
    pub async fn collect_pending(&self) -> anyhow::Result<Vec<Page>> {
        let filter = completion_filter(
            &self.config.datetime_field,
            &self.config.status_column,
            &self.config.complete_selects,
        );

        let mut pending: Vec<Page> = Vec::new();
        let mut start_cursor: Option<String> = None;
        loop {
            let body = query_body(&filter, start_cursor.as_deref());
            let page = self
                .query_once(&body)
                .await
                .with_context(|| format!("Error querying database: {}", self.config.database_id))?;

            debug!(
                "Query returned {} records (has_more: {})",
                page.results.len(),
                page.has_more
            );
            pending.extend(page.results);

            match (page.has_more, page.next_cursor) {
                (true, Some(cursor)) => start_cursor = Some(cursor),
                (true, None) => {
                    warn!("Query reported more results but no next_cursor; stopping pagination");
                    break;
                }
                (false, _) => break,
            }
        }
        Ok(pending)
    }

    /// Write `page.last_edited_time` into the configured date property.
    ///
    /// Failures are logged and reported in the returned action, never retried.
    pub async fn patch_record(&self, page: &Page) -> PatchAction {
        let completed_on = page.last_edited_time.clone();
        let patch = completion_patch(&self.config.datetime_field, &completed_on);
        info!(
            page_id = %page.id,
            status = page.select_name(&self.config.status_column).unwrap_or("<unset>"),
            "Updating TODO, id: {}, patch: {}",
            page.id,
            patch
        );

        let outcome = if self.config.dry_run {
            PatchOutcome::DryRun
        } else {
            match self.api.update_page(&page.id, &patch).await {
                Ok(()) => PatchOutcome::Applied,
                Err(e) => {
                    warn!(page_id = %page.id, error = %e, "Failed to update record");
                    PatchOutcome::Failed(e.to_string())
                }
            }
        };

        PatchAction {
            page_id: page.id.clone(),
            completed_on,
            outcome,
        }
    }

    /// One polling pass: collect every pending record, then patch each in
    /// the order Notion returned them.
    pub async fn run_pass(&self) -> anyhow::Result<Vec<PatchAction>> {
        let pending = self.collect_pending().await?;
        let mut actions = Vec::with_capacity(pending.len());
        for page in &pending {
            actions.push(self.patch_record(page).await);
        }
        Ok(actions)
    }
}

/// Validate the database, then poll until shutdown, a fatal query error,
/// or (with `--once`) the end of the first pass.
pub async fn run(
    api: &dyn NotionApi,
    config: &Config,
    shutdown_token: CancellationToken,
) -> anyhow::Result<()> {
    validate_database(api, config).await?;

    let syncer = Syncer::new(api, config).with_shutdown(shutdown_token.clone());
    loop {
        if shutdown_token.is_cancelled() {
            info!("Shutdown requested, exiting...");
            break;
        }

        let actions = match syncer.run_pass().await {
            Ok(actions) => actions,
            Err(_) if shutdown_token.is_cancelled() => {
                info!("Shutdown during rate-limit backoff, exiting...");
                break;
            }
            Err(e) => return Err(e),
        };
        if !actions.is_empty() {
            let failed = actions
                .iter()
                .filter(|a| matches!(a.outcome, PatchOutcome::Failed(_)))
                .count();
            info!(updated = actions.len() - failed, failed, "Completed sync pass");
        }

        if config.once {
            break;
        }

        tokio::select! {
            _ = tokio::time::sleep(config.poll_interval) => {}
            _ = shutdown_token.cancelled() => {
                info!("Shutdown during wait, exiting...");
                break;
            }
        }
    }

    Ok(())
}
