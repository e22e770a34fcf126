//! Comparison orchestration.
//!
//! ## Pairwise pipeline
//! 1. Fetch old and new snapshots concurrently
//! 2. Diff with the configured identity mode
//! 3. Classify critical changes
//! 4. Notify when a HIGH severity change was found
//!
//! ## Matrix pipeline
//! 1. Fetch all snapshots concurrently
//! 2. Build the matrix on the blocking pool
//! 3. Cancel the matrix cooperatively if the caller's timeout elapses
//! 4. Normalize into a heatmap

use bimdiff_core::classify::{classify, CriticalChangeReport};
use bimdiff_core::diff::{compare_models_with, render_human_summary, ComparisonResult};
use bimdiff_core::errors::{BimDiffError, ExError, ExErrorKind};
use bimdiff_core::matrix::{compare_multiple_versions_with, CancellationFlag, MultiComparisonResult};
use bimdiff_core::notify::ChangeNotifier;
use bimdiff_core::{log_op_end, log_op_error, log_op_start, EngineConfig};
use bimdiff_core_types::RequestContext;
use futures::future::try_join_all;
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::Instrument;

use crate::provider::SnapshotProvider;

/// Everything produced for one snapshot pair.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonOutcome {
    pub result: ComparisonResult,
    pub critical: CriticalChangeReport,
    /// Markdown rendering of `result`
    pub human_summary: String,
    /// True when the notifier was invoked
    pub notified: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatrixOutcome {
    pub result: MultiComparisonResult,
    pub heatmap: Vec<Vec<f64>>,
}

/// Comparison entry point with injected collaborators.
pub struct ComparisonService<P, N> {
    provider: P,
    notifier: N,
    config: EngineConfig,
}

impl<P, N> ComparisonService<P, N>
where
    P: SnapshotProvider,
    N: ChangeNotifier,
{
    pub fn new(provider: P, notifier: N, config: EngineConfig) -> Self {
        Self {
            provider,
            notifier,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Compare two stored versions.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if either version is missing or has an element without identity
    /// - `AmbiguousIdentity` for duplicate keys under strict identity mode
    /// - `ExternalService` if the notifier fails
    pub async fn compare(
        &self,
        old_version_id: &str,
        new_version_id: &str,
    ) -> Result<ComparisonOutcome, ExError> {
        let ctx = RequestContext::new();
        let span = tracing::info_span!("compare_versions", request_id = %ctx.request_id);
        self.compare_in_context(&ctx, old_version_id, new_version_id)
            .instrument(span)
            .await
    }

    async fn compare_in_context(
        &self,
        ctx: &RequestContext,
        old_version_id: &str,
        new_version_id: &str,
    ) -> Result<ComparisonOutcome, ExError> {
        let started = Instant::now();
        log_op_start!(
            "compare_versions",
            old_version = old_version_id,
            new_version = new_version_id
        );

        match self.run_compare(old_version_id, new_version_id).await {
            Ok(outcome) => {
                log_op_end!(
                    "compare_versions",
                    duration_ms = started.elapsed().as_millis() as u64,
                    total_changes = outcome.result.statistics.total_changes,
                    high_severity = outcome.critical.summary.high_severity,
                    notified = outcome.notified
                );
                Ok(outcome)
            }
            Err(err) => {
                let err = err.with_request_id(ctx.request_id.clone());
                log_op_error!(
                    "compare_versions",
                    err.clone(),
                    duration_ms = started.elapsed().as_millis() as u64
                );
                Err(err)
            }
        }
    }

    async fn run_compare(
        &self,
        old_version_id: &str,
        new_version_id: &str,
    ) -> Result<ComparisonOutcome, ExError> {
        let (old, new) = futures::try_join!(
            self.provider.fetch(old_version_id),
            self.provider.fetch(new_version_id)
        )?;

        let result = compare_models_with(&old, &new, &self.config.diff_options())?;
        let critical = classify(&result, &self.config.critical);

        let notified = critical.requires_notification();
        if notified {
            self.notifier
                .notify_critical_changes(&result.identity, &critical)
                .map_err(|e| {
                    ExError::new(ExErrorKind::ExternalService)
                        .with_op("compare_versions")
                        .with_message("critical change notification failed")
                        .with_source(e)
                })?;
        }

        let human_summary = render_human_summary(&result);
        Ok(ComparisonOutcome {
            result,
            critical,
            human_summary,
            notified,
        })
    }

    /// Compare every ordered pair of stored versions.
    ///
    /// With `timeout` set, the matrix is cancelled once it elapses; snapshot
    /// fetching is not counted against it.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` for an empty id list, a missing version or an element without identity
    /// - `Timeout` if the matrix did not finish in time
    pub async fn compare_many(
        &self,
        version_ids: &[String],
        timeout: Option<Duration>,
    ) -> Result<MatrixOutcome, ExError> {
        let ctx = RequestContext::new();
        let span = tracing::info_span!("compare_many", request_id = %ctx.request_id);
        async {
            let started = Instant::now();
            log_op_start!("compare_many", version_count = version_ids.len());

            match self.run_compare_many(version_ids, timeout).await {
                Ok(outcome) => {
                    log_op_end!(
                        "compare_many",
                        duration_ms = started.elapsed().as_millis() as u64,
                        max_changes = outcome.result.summary.max_changes
                    );
                    Ok(outcome)
                }
                Err(err) => {
                    let err = err.with_request_id(ctx.request_id.clone());
                    log_op_error!(
                        "compare_many",
                        err.clone(),
                        duration_ms = started.elapsed().as_millis() as u64
                    );
                    Err(err)
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn run_compare_many(
        &self,
        version_ids: &[String],
        timeout: Option<Duration>,
    ) -> Result<MatrixOutcome, ExError> {
        if version_ids.is_empty() {
            return Err(ExError::from(BimDiffError::EmptyVersionList).with_op("compare_many"));
        }

        let snapshots = try_join_all(version_ids.iter().map(|id| self.provider.fetch(id))).await?;

        let cancel = CancellationFlag::new();
        let worker_cancel = cancel.clone();
        let options = self.config.matrix_options();
        let worker = tokio::task::spawn_blocking(move || {
            compare_multiple_versions_with(&snapshots, &options, &worker_cancel)
        });

        let joined = match timeout {
            Some(limit) => match tokio::time::timeout(limit, worker).await {
                Ok(joined) => joined,
                Err(_) => {
                    cancel.cancel();
                    return Err(ExError::new(ExErrorKind::Timeout)
                        .with_op("compare_many")
                        .with_message(format!(
                            "matrix of {} versions did not finish within {} ms",
                            version_ids.len(),
                            limit.as_millis()
                        )));
                }
            },
            None => worker.await,
        };

        let result = joined.map_err(|e| {
            ExError::new(ExErrorKind::Internal)
                .with_op("compare_many")
                .with_message(format!("matrix worker failed: {e}"))
        })??;

        let heatmap = result.heatmap();
        Ok(MatrixOutcome { result, heatmap })
    }
}
