//! Bounded-concurrency batch validation.

use crate::validator::Validator;
use nolang_feedback_types::{GenerationEntry, ValidationResult, Witness};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info};

/// Default number of validations in flight.
pub const DEFAULT_MAX_WORKERS: usize = 4;

/// One unit of batch work.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BatchItem {
    pub candidate: String,
    pub witnesses: Option<Vec<Witness>>,
}

impl BatchItem {
    pub fn new(candidate: impl Into<String>) -> Self {
        Self {
            candidate: candidate.into(),
            witnesses: None,
        }
    }

    pub fn with_witnesses(mut self, witnesses: Vec<Witness>) -> Self {
        self.witnesses = Some(witnesses);
        self
    }
}

impl From<&GenerationEntry> for BatchItem {
    fn from(entry: &GenerationEntry) -> Self {
        Self {
            candidate: entry.candidate_text.clone(),
            witnesses: entry.witness_slice().map(<[Witness]>::to_vec),
        }
    }
}

/// Validates many candidates with at most `max_workers` in flight.
///
/// Output order always equals input order. Dropping the returned future
/// aborts every task still running; no partial batch is ever observed.
#[derive(Clone)]
pub struct BatchValidator {
    validator: Arc<Validator>,
    max_workers: usize,
}

impl BatchValidator {
    pub fn new(validator: Validator) -> Self {
        Self {
            validator: Arc::new(validator),
            max_workers: DEFAULT_MAX_WORKERS,
        }
    }

    /// Worker bound; zero is treated as one.
    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers.max(1);
        self
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    pub async fn validate_batch(&self, items: Vec<BatchItem>) -> Vec<ValidationResult> {
        let total = items.len();
        if total == 0 {
            return Vec::new();
        }
        info!(total, workers = self.max_workers, "validating batch");

        let semaphore = Arc::new(Semaphore::new(self.max_workers));
        let candidates: Vec<String> = items.iter().map(|i| i.candidate.clone()).collect();
        let mut tasks = JoinSet::new();

        for (index, item) in items.into_iter().enumerate() {
            let validator = Arc::clone(&self.validator);
            let semaphore = Arc::clone(&semaphore);
            tasks.spawn(async move {
                // The semaphore is never closed, so acquisition only fails if
                // that invariant is broken; the slot then reports a failure.
                let _permit = semaphore.acquire_owned().await.ok()?;
                let result = validator
                    .validate(&item.candidate, item.witnesses.as_deref())
                    .await;
                Some((index, result))
            });
        }

        let mut slots: Vec<Option<ValidationResult>> = vec![None; total];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Some((index, result))) => slots[index] = Some(result),
                Ok(None) => error!("worker could not acquire a permit"),
                Err(e) => error!(error = %e, "validation worker failed"),
            }
        }

        let mut done = 0;
        let results: Vec<ValidationResult> = slots
            .into_iter()
            .zip(candidates)
            .map(|(slot, candidate)| match slot {
                Some(result) => {
                    done += 1;
                    result
                }
                None => ValidationResult::builder(candidate)
                    .error("validation worker failed")
                    .build(),
            })
            .collect();
        info!(total, completed = done, "batch validated");
        results
    }

    /// Validate a generation run in input order.
    pub async fn validate_entries(&self, entries: &[GenerationEntry]) -> Vec<ValidationResult> {
        self.validate_batch(entries.iter().map(BatchItem::from).collect())
            .await
    }
}
