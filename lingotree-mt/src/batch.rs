//! Bounded-concurrency batch translation
//!
//! [`BatchTranslator`] sends every selected item to a [`MachineTranslator`],
//! at most `effective_concurrency()` requests at a time. Selected items are cut
//! into batches of that size; a batch is fully in flight at once and the next
//! batch only starts after every request of the current one has settled.
//!
//! Results are reported through a callback as each request completes, so
//! completion order inside a batch follows network latency, not input order.
//! A failed request is logged and skipped. Cancellation stops scheduling new
//! batches and drops the requests still in flight.

use futures::stream::{FuturesUnordered, StreamExt};
use lingotree::{KeyPath, Translatable};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::chat_completion::ChatCompletionProvider;
use crate::config::TranslationConfig;
use crate::error::{MtError, MtResult};
use crate::translator::MachineTranslator;

/// Outcome of one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    /// Items that were selected when the run started
    pub requested: usize,
    /// Callbacks delivered
    pub translated: usize,
    /// Requests that failed and were skipped
    pub failed: usize,
    /// The run was stopped by [`BatchTranslator::cancel`]
    pub cancelled: bool,
}

impl BatchReport {
    /// Selected items that never produced a result
    pub fn untranslated(&self) -> usize {
        self.requested - self.translated
    }
}

/// Clears the running flag however the run ends
struct RunGuard<'a>(&'a AtomicBool);

impl<'a> RunGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> MtResult<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| MtError::AlreadyRunning)?;
        Ok(RunGuard(flag))
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Resolves once the cancel flag is raised
async fn cancelled(mut signal: watch::Receiver<bool>) {
    if signal.wait_for(|cancel| *cancel).await.is_err() {
        // Sender gone: nobody can cancel any more
        std::future::pending::<()>().await;
    }
}

/// Runs translation batches; one run at a time
///
/// Idle → Running on a successful [`run`](Self::run), back to Idle when all
/// batches are done or the run is cancelled.
#[derive(Debug)]
pub struct BatchTranslator {
    running: AtomicBool,
    cancel: watch::Sender<bool>,
}

impl Default for BatchTranslator {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchTranslator {
    pub fn new() -> Self {
        let (cancel, _) = watch::channel(false);
        Self {
            running: AtomicBool::new(false),
            cancel,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Stop the current run: no new batch starts and in-flight requests are dropped
    pub fn cancel(&self) {
        self.cancel.send_replace(true);
        if self.is_running() {
            info!("Cancellation requested");
        }
    }

    /// Translate the selected `items` through the endpoint in `config`
    ///
    /// `on_item_translated` receives the index of the item in `items` and the
    /// trimmed translation, once per successful request.
    ///
    /// # Errors
    ///
    /// * `MtError::Config` - endpoint, key or model missing; nothing is sent
    /// * `MtError::EmptySelection` - no item selected; nothing is sent
    /// * `MtError::AlreadyRunning` - another run is active
    ///
    /// Individual request failures are not errors of the run.
    pub async fn run<T, F>(
        &self,
        config: &TranslationConfig,
        items: &[T],
        on_item_translated: F,
    ) -> MtResult<BatchReport>
    where
        T: Translatable,
        F: FnMut(usize, String),
    {
        check_preconditions(config, items)?;
        let provider = ChatCompletionProvider::from_config(config)?;
        self.run_with(config, &provider, items, on_item_translated)
            .await
    }

    /// Same as [`run`](Self::run) with an explicit translation backend
    pub async fn run_with<T, F>(
        &self,
        config: &TranslationConfig,
        translator: &dyn MachineTranslator,
        items: &[T],
        mut on_item_translated: F,
    ) -> MtResult<BatchReport>
    where
        T: Translatable,
        F: FnMut(usize, String),
    {
        let selected = check_preconditions(config, items)?;
        let _guard = RunGuard::acquire(&self.running)?;
        self.cancel.send_replace(false);

        // Results are matched back by path, never by position inside a batch
        let positions: HashMap<&KeyPath, usize> = items
            .iter()
            .enumerate()
            .map(|(index, item)| (item.path(), index))
            .collect();

        let batch_size = config.effective_concurrency();
        let mut report = BatchReport {
            requested: selected.len(),
            ..BatchReport::default()
        };

        info!(
            provider = translator.provider_name(),
            selected = selected.len(),
            concurrency = batch_size,
            "Starting translation run"
        );

        for (batch_index, batch) in selected.chunks(batch_size).enumerate() {
            if *self.cancel.borrow() {
                report.cancelled = true;
                break;
            }
            debug!(batch = batch_index + 1, size = batch.len(), "Dispatching batch");

            let mut in_flight: FuturesUnordered<_> = batch
                .iter()
                .map(|&item| {
                    let signal = self.cancel.subscribe();
                    async move {
                        let outcome = tokio::select! {
                            biased;
                            _ = cancelled(signal) => Err(MtError::Cancelled),
                            result = translator.translate(item.source_text()) => result,
                        };
                        (item.path(), outcome)
                    }
                })
                .collect();

            while let Some((path, outcome)) = in_flight.next().await {
                match outcome {
                    Ok(text) => match positions.get(path) {
                        Some(&index) => {
                            debug!(%path, "Item translated");
                            report.translated += 1;
                            on_item_translated(index, text);
                        }
                        None => warn!(%path, "Translated item no longer in the list"),
                    },
                    Err(err) if err.is_cancelled() => {
                        report.cancelled = true;
                        debug!(%path, "Request aborted");
                    }
                    Err(err) => {
                        report.failed += 1;
                        warn!(%path, error = %err, "Translation failed, leaving item untranslated");
                    }
                }
            }
        }

        info!(
            translated = report.translated,
            failed = report.failed,
            cancelled = report.cancelled,
            "Translation run finished"
        );
        Ok(report)
    }

    /// Run over `items` and write every result straight back into them
    pub async fn translate_in_place<T>(
        &self,
        config: &TranslationConfig,
        translator: &dyn MachineTranslator,
        items: &mut [T],
    ) -> MtResult<BatchReport>
    where
        T: Translatable + Clone,
    {
        let snapshot = items.to_vec();
        let mut results = Vec::new();
        let report = self
            .run_with(config, translator, &snapshot, |index, text| {
                results.push((index, text))
            })
            .await?;

        for (index, text) in results {
            lingotree::apply_translation(items, index, text);
        }
        Ok(report)
    }
}

/// Validate before anything is sent; returns the selected items
fn check_preconditions<'a, T: Translatable>(
    config: &TranslationConfig,
    items: &'a [T],
) -> MtResult<Vec<&'a T>> {
    config.validate()?;
    let selected: Vec<&T> = items.iter().filter(|item| item.is_selected()).collect();
    if selected.is_empty() {
        return Err(MtError::EmptySelection);
    }
    Ok(selected)
}
