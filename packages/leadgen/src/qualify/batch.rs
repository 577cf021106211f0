//! Batch qualification with bounded concurrency and the vision second pass.

use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use super::engine::Qualifier;
use crate::error::ScoringError;
use crate::traits::scorer::{ScoreRequest, VisionScorer};
use crate::types::business::Business;
use crate::types::qualification::{AiVerdict, QualificationResult};

/// Outcome of qualifying a batch.
#[derive(Debug, Clone, Default)]
pub struct QualifiedBatch {
    /// Completed results, in input order
    pub results: Vec<(Business, QualificationResult)>,

    /// Items whose task failed (panicked or was abandoned)
    pub failures: usize,

    /// Whether the batch was cancelled before every item finished
    pub cancelled: bool,
}

impl QualifiedBatch {
    pub fn qualified_count(&self) -> usize {
        self.results.iter().filter(|(_, r)| r.qualifies).count()
    }

    /// Keep only qualifying results.
    pub fn into_qualified(self) -> Vec<(Business, QualificationResult)> {
        self.results.into_iter().filter(|(_, r)| r.qualifies).collect()
    }
}

impl Qualifier {
    /// Qualify a batch to completion.
    pub async fn qualify_batch(&self, businesses: &[Business]) -> Vec<(Business, QualificationResult)> {
        self.qualify_batch_with_cancel(businesses, CancellationToken::new())
            .await
            .results
    }

    /// Qualify a batch, stopping early if `cancel` fires.
    ///
    /// At most `max_concurrent` businesses are fetched at once. A failing
    /// item never cancels its siblings. On cancellation, in-flight work is
    /// aborted and the results already collected are returned.
    pub async fn qualify_batch_with_cancel(
        &self,
        businesses: &[Business],
        cancel: CancellationToken,
    ) -> QualifiedBatch {
        let mut slots: Vec<Option<(Business, QualificationResult)>> =
            (0..businesses.len()).map(|_| None).collect();
        let mut batch = QualifiedBatch::default();

        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent.max(1)));
        let mut tasks = JoinSet::new();

        for (index, business) in businesses.iter().cloned().enumerate() {
            let qualifier = self.clone();
            let semaphore = semaphore.clone();
            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok()?;
                let result = qualifier.qualify(&business).await;

                let status = if result.qualifies { "QUALIFIED" } else { "SKIPPED" };
                info!(business = %business.name, status, reason = %result.describe(), "Qualification verdict");

                Some((index, business, result))
            });
        }

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    warn!(remaining = tasks.len(), "Qualification batch cancelled");
                    tasks.abort_all();
                    batch.cancelled = true;
                    break;
                }
                joined = tasks.join_next() => match joined {
                    None => break,
                    Some(Ok(Some((index, business, result)))) => {
                        slots[index] = Some((business, result));
                    }
                    Some(Ok(None)) => batch.failures += 1,
                    Some(Err(e)) => {
                        error!(error = %e, "Qualification task failed");
                        batch.failures += 1;
                    }
                },
            }
        }

        batch.results = slots.into_iter().flatten().collect();
        info!(
            qualified = batch.qualified_count(),
            total = batch.results.len(),
            failures = batch.failures,
            "Rule-based qualification complete"
        );

        if batch.cancelled {
            return batch;
        }

        if let Some(scorer) = self.scorer.clone() {
            self.vision_pass(scorer, &mut batch.results, &cancel).await;
        }

        batch
    }

    /// Second pass: ask the vision scorer about sites the rules found no fault with.
    async fn vision_pass(
        &self,
        scorer: Arc<dyn VisionScorer>,
        results: &mut [(Business, QualificationResult)],
        cancel: &CancellationToken,
    ) {
        let candidates: Vec<(usize, ScoreRequest)> = results
            .iter()
            .enumerate()
            .filter(|(_, (_, result))| result.is_good_website())
            .filter_map(|(index, (business, _))| {
                ScoreRequest::for_business(business).map(|request| (index, request))
            })
            .collect();

        if candidates.is_empty() {
            info!("No websites need AI scoring");
            return;
        }

        info!(count = candidates.len(), "Running AI vision analysis");

        let semaphore = Arc::new(Semaphore::new(self.config.ai_max_concurrent.max(1)));
        let timeout = self.config.ai_timeout;
        let mut tasks = JoinSet::new();

        for (index, request) in candidates {
            let scorer = scorer.clone();
            let semaphore = semaphore.clone();
            tasks.spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return (index, Err(ScoringError::Unavailable("scoring closed".into())));
                };
                let outcome = match tokio::time::timeout(timeout, scorer.score(&request)).await {
                    Ok(outcome) => outcome,
                    Err(_) => Err(ScoringError::Timeout {
                        secs: timeout.as_secs(),
                    }),
                };
                (index, outcome)
            });
        }

        let mut verdicts: Vec<(usize, AiVerdict)> = Vec::new();
        let mut failed = 0usize;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    warn!(remaining = tasks.len(), "AI scoring cancelled");
                    tasks.abort_all();
                    break;
                }
                joined = tasks.join_next() => match joined {
                    None => break,
                    Some(Ok((index, Ok(verdict)))) => verdicts.push((index, verdict)),
                    Some(Ok((index, Err(e)))) => {
                        warn!(business = %results[index].0.name, error = %e, "AI scoring failed");
                        failed += 1;
                    }
                    Some(Err(e)) => {
                        error!(error = %e, "AI scoring task failed");
                        failed += 1;
                    }
                },
            }
        }

        if verdicts.is_empty() && failed > 0 {
            error!(failed, "AI scoring failed for every site, falling back to rules only");
            return;
        }

        let mut caught = 0usize;
        for (index, verdict) in verdicts {
            let (business, result) = &mut results[index];
            result.apply_ai_verdict(&verdict);

            if result.qualifies {
                caught += 1;
                info!(
                    business = %business.name,
                    score = verdict.overall_score,
                    summary = %verdict.summary,
                    "AI QUALIFIED"
                );
            } else {
                info!(
                    business = %business.name,
                    score = verdict.overall_score,
                    summary = %verdict.summary,
                    "AI CONFIRMED GOOD"
                );
            }
        }

        let total = results.iter().filter(|(_, r)| r.qualifies).count();
        info!(total, caught_by_ai = caught, failed, "AI scoring complete");
    }
}
