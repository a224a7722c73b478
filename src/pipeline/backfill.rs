//! Bulk enqueueing of feature jobs for existing rows

use crate::error::{EntityKind, RecommenderError, Result};
use crate::pipeline::queue::{Task, TaskQueue};
use crate::store::ProfileStore;
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use std::time::Duration;

/// Enqueue the lexical job for every stored entity of `kind`, pausing
/// `delay` between items to throttle the queue. Returns how many were
/// enqueued.
pub async fn backfill<S, Q>(
    kind: EntityKind,
    store: &S,
    queue: &Q,
    delay: Duration,
    show_progress: bool,
) -> Result<usize>
where
    S: ProfileStore,
    Q: TaskQueue,
{
    let ids = match kind {
        EntityKind::Candidate => store.candidate_ids().await?,
        EntityKind::Posting => store.posting_ids().await?,
        EntityKind::Employer => {
            return Err(RecommenderError::InvalidInput(
                "employers have no features to process".to_string(),
            ))
        }
    };
    info!("Backfilling {} {} record(s)", ids.len(), kind);

    let progress = if show_progress {
        let bar = ProgressBar::new(ids.len() as u64);
        bar.set_style(
            ProgressStyle::with_template("{spinner} [{bar:40}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        bar
    } else {
        ProgressBar::hidden()
    };

    for (i, id) in ids.iter().enumerate() {
        if i > 0 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        queue.enqueue(Task::process(kind, *id)?)?;
        progress.set_message(format!("{} {}", kind, id));
        progress.inc(1);
    }

    progress.finish_with_message("queued");
    Ok(ids.len())
}
