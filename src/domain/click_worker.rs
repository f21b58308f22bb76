//! Background persistence of click events.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};

use crate::domain::click_event::ClickEvent;
use crate::domain::repositories::ClickRepository;

/// Retries after the first failed write.
const MAX_RETRIES: usize = 3;

/// Consumes click events until every sender is dropped.
///
/// Each write is retried with jittered exponential backoff. A click that still
/// fails is logged and dropped; analytics loss never blocks redirects.
pub async fn run_click_worker(
    mut rx: mpsc::Receiver<ClickEvent>,
    click_repository: Arc<dyn ClickRepository>,
) {
    while let Some(event) = rx.recv().await {
        let link_id = event.link_id;
        let new_click = event.into_new_click();

        let strategy = ExponentialBackoff::from_millis(10)
            .max_delay(std::time::Duration::from_secs(1))
            .map(jitter)
            .take(MAX_RETRIES);

        let result = Retry::start(strategy, || {
            let repo = click_repository.clone();
            let click = new_click.clone();
            async move { repo.record_click(click).await }
        })
        .await;

        match result {
            Ok(()) => {
                metrics::counter!("clicks_recorded_total").increment(1);
            }
            Err(e) => {
                metrics::counter!("clicks_dropped_total").increment(1);
                tracing::warn!(link_id, error = %e, "Dropping click after retries");
            }
        }
    }

    tracing::info!("Click worker stopped");
}
