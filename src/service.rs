//! Background fetch service.
//!
//! Runs an async runtime on a dedicated thread.  Callers enqueue section
//! requests with [`SectionRequester::request_sections`]; every requested
//! section is fetched concurrently and produces exactly one
//! [`CompletionEvent`] on a shared channel that the UI thread drains on every
//! tick.  All consumers see every event and decide for themselves which ones
//! concern them.

use std::sync::{mpsc, Arc};
use std::thread;

use anyhow::{Context, Result};
use tokio::sync::mpsc as async_mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::section::SectionId;
use crate::source::{Payload, StatsSource};

/// Result of one section fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionEvent {
    pub section: SectionId,
    pub payload: Payload,
}

/// The fire-and-forget side of the fetch service.
pub trait SectionRequester {
    /// Ask for `sections`, optionally scoped to one post.  Results arrive
    /// later as [`CompletionEvent`]s.
    fn request_sections(&self, post_id: Option<u64>, sections: &[SectionId]);
}

#[derive(Debug)]
struct FetchRequest {
    post_id: Option<u64>,
    sections: Vec<SectionId>,
}

/// Handle to the running fetch worker.
#[derive(Clone)]
pub struct FetchService {
    requests: async_mpsc::UnboundedSender<FetchRequest>,
    shutdown: CancellationToken,
}

impl FetchService {
    /// Spawn the worker thread.
    ///
    /// Returns the handle and the receiver the main loop should drain on
    /// every tick.
    pub fn spawn(source: Arc<dyn StatsSource>) -> Result<(Self, mpsc::Receiver<CompletionEvent>)> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("failed to build fetch runtime")?;

        let (request_tx, mut request_rx) = async_mpsc::unbounded_channel::<FetchRequest>();
        let (event_tx, event_rx) = mpsc::channel();
        let shutdown = CancellationToken::new();
        let token = shutdown.clone();

        thread::Builder::new()
            .name("stats-fetch".into())
            .spawn(move || {
                runtime.block_on(async move {
                    info!(source = source.name(), "fetch service started");
                    loop {
                        let request = tokio::select! {
                            _ = token.cancelled() => break,
                            request = request_rx.recv() => match request {
                                Some(request) => request,
                                None => break,
                            },
                        };
                        for section in request.sections {
                            tokio::spawn(fetch_one(
                                Arc::clone(&source),
                                section,
                                request.post_id,
                                event_tx.clone(),
                            ));
                        }
                    }
                    info!("fetch service stopped");
                });
            })
            .context("failed to spawn fetch thread")?;

        Ok((
            Self {
                requests: request_tx,
                shutdown,
            },
            event_rx,
        ))
    }

    /// Stop accepting requests; in-flight fetches are abandoned.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }
}

impl SectionRequester for FetchService {
    fn request_sections(&self, post_id: Option<u64>, sections: &[SectionId]) {
        debug!(?post_id, ?sections, "requesting sections");
        let request = FetchRequest {
            post_id,
            sections: sections.to_vec(),
        };
        if self.requests.send(request).is_err() {
            warn!("fetch service is gone, request dropped");
        }
    }
}

async fn fetch_one(
    source: Arc<dyn StatsSource>,
    section: SectionId,
    post_id: Option<u64>,
    events: mpsc::Sender<CompletionEvent>,
) {
    let payload = source
        .fetch(section, post_id)
        .await
        .unwrap_or_else(Payload::Error);
    debug!(%section, "section fetch completed");
    // If the receiver is gone the main thread has exited.
    let _ = events.send(CompletionEvent { section, payload });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::error::StatsError;

    struct CannedSource;

    #[async_trait]
    impl StatsSource for CannedSource {
        fn name(&self) -> &str {
            "canned"
        }

        async fn fetch(&self, section: SectionId, post_id: Option<u64>) -> Result<Payload, StatsError> {
            match (section, post_id) {
                (SectionId::InsightsLatestPostViews, Some(id)) => Ok(Payload::Integer(id as i64 * 2)),
                (SectionId::InsightsToday, _) => Err(StatsError::Transport("offline".into())),
                _ => Ok(Payload::Null),
            }
        }
    }

    fn recv(rx: &mpsc::Receiver<CompletionEvent>) -> CompletionEvent {
        rx.recv_timeout(Duration::from_secs(5)).expect("completion event")
    }

    #[test]
    fn each_requested_section_yields_one_event() {
        let (service, rx) = FetchService::spawn(Arc::new(CannedSource)).unwrap();
        service.request_sections(
            Some(21),
            &[SectionId::InsightsLatestPostViews, SectionId::InsightsToday],
        );

        let mut events = vec![recv(&rx), recv(&rx)];
        events.sort_by_key(|e| e.section.to_string());

        assert_eq!(
            events,
            vec![
                CompletionEvent {
                    section: SectionId::InsightsLatestPostViews,
                    payload: Payload::Integer(42),
                },
                CompletionEvent {
                    section: SectionId::InsightsToday,
                    payload: Payload::Error(StatsError::Transport("offline".into())),
                },
            ]
        );
        assert!(rx.recv_timeout(Duration::from_millis(100)).is_err(), "no duplicates");
        service.shutdown();
    }

    #[test]
    fn requests_after_shutdown_are_dropped() {
        let (service, rx) = FetchService::spawn(Arc::new(CannedSource)).unwrap();
        service.shutdown();
        // Give the worker a moment to observe cancellation.
        thread::sleep(Duration::from_millis(50));

        service.request_sections(None, &[SectionId::InsightsLatestPostSummary]);
        assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
    }
}
