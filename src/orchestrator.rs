//! The latest-post card: event filtering and the data-readiness state machine.
//!
//! ```text
//! Empty ──summary, available──► AwaitingSecondary ──views──► Ready
//!   │
//!   └────summary, unavailable──► Hidden
//!
//! any phase ──failure──► Error        (until the next start_cycle)
//! ```
//!
//! A new cycle cannot start while the current one still has a request in
//! flight, so a late result can never land in the wrong cycle.
//!
//! The card only declares the summary section.  The views section is
//! requested by [`LatestPostCard::reconcile`] once a summary without views
//! has been stored, so a views result can never legitimately arrive before
//! the summary it belongs to.

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, trace, warn};

use crate::error::{ErrorDetail, ErrorKind};
use crate::section::{concerns_latest_post, SectionId, LATEST_POST_SECTIONS};
use crate::service::{CompletionEvent, SectionRequester};
use crate::source::{LatestPost, Payload};
use crate::store::ResultStore;

/// What the presentation layer should show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState {
    /// Nothing to show: the site has no published posts.
    Hidden,
    LoadingPlaceholder,
    Ready(LatestPost),
    Error(ErrorDetail),
}

/// Where the current cycle stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CyclePhase {
    /// No cycle has been started yet.
    Idle,
    Empty,
    AwaitingSecondary,
    Ready,
    Hidden,
    Error,
}

impl CyclePhase {
    /// Whether a request issued by this cycle has not completed yet.
    pub fn is_in_flight(self) -> bool {
        matches!(self, CyclePhase::Empty | CyclePhase::AwaitingSecondary)
    }
}

/// The filter's verdict for one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    Ignore,
    Primary,
    SecondarySuccess(u64),
    Error(ErrorDetail),
}

/// Decide whether `event` concerns the card and what it means.
pub fn classify(event: &CompletionEvent, store: &ResultStore) -> EventOutcome {
    if !concerns_latest_post(event.section) {
        return EventOutcome::Ignore;
    }

    match event.section {
        SectionId::InsightsLatestPostViews => {
            if store.is_data_empty(0) || store.latest_post().is_none() {
                return EventOutcome::Error(ErrorDetail::invalid_local_state());
            }
            match &event.payload {
                Payload::Error(err) => EventOutcome::Error(ErrorDetail::remote(err.clone())),
                Payload::Integer(n) => match u64::try_from(*n) {
                    Ok(views) => EventOutcome::SecondarySuccess(views),
                    Err(_) => EventOutcome::Error(ErrorDetail::malformed()),
                },
                Payload::Data(_) | Payload::Null => EventOutcome::Error(ErrorDetail::malformed()),
            }
        }
        SectionId::InsightsLatestPostSummary => EventOutcome::Primary,
        // Filtered out by the interest check above.
        SectionId::InsightsToday => EventOutcome::Ignore,
    }
}

/// Drives one card through its fetch cycles.
pub struct LatestPostCard<R> {
    requester: R,
    store: ResultStore,
    phase: CyclePhase,
    state: ViewState,
    attached: CancellationToken,
}

impl<R: SectionRequester> LatestPostCard<R> {
    pub fn new(requester: R) -> Self {
        Self {
            requester,
            store: ResultStore::with_slots(LATEST_POST_SECTIONS.len()),
            phase: CyclePhase::Idle,
            state: ViewState::LoadingPlaceholder,
            attached: CancellationToken::new(),
        }
    }

    pub fn phase(&self) -> CyclePhase {
        self.phase
    }

    pub fn view_state(&self) -> &ViewState {
        &self.state
    }

    #[cfg(test)]
    pub fn store(&self) -> &ResultStore {
        &self.store
    }

    pub fn is_attached(&self) -> bool {
        !self.attached.is_cancelled()
    }

    /// Tear the card down; every later event is a no-op.
    pub fn detach(&self) {
        self.attached.cancel();
    }

    /// Begin a fresh cycle from `Empty` and request the declared sections.
    ///
    /// Returns `false` without touching anything when the card is detached
    /// or the current cycle is still waiting on a result.
    pub fn start_cycle(&mut self) -> bool {
        if !self.is_attached() {
            return false;
        }
        if self.phase.is_in_flight() {
            debug!(phase = ?self.phase, "cycle still in flight, refresh deferred");
            return false;
        }
        debug!("starting latest post cycle");
        self.store.clear();
        self.phase = CyclePhase::Empty;
        self.state = ViewState::LoadingPlaceholder;
        self.requester.request_sections(None, LATEST_POST_SECTIONS);
        true
    }

    /// Feed one bus event to the card.
    ///
    /// Returns the new view state when the event caused a state signal.
    pub fn handle_event(&mut self, event: &CompletionEvent) -> Option<&ViewState> {
        if !self.is_attached() {
            trace!(section = %event.section, "card detached, event dropped");
            return None;
        }

        match classify(event, &self.store) {
            EventOutcome::Ignore => return None,
            _ if self.phase == CyclePhase::Error => {
                debug!(section = %event.section, "cycle already failed, event dropped");
                return None;
            }
            EventOutcome::Primary => self.accept_primary(&event.payload),
            EventOutcome::SecondarySuccess(views) => {
                if self.store.set_latest_post_views(views) {
                    self.reconcile();
                } else {
                    self.fail(ErrorDetail::invalid_local_state());
                }
            }
            EventOutcome::Error(detail) => self.fail(detail),
        }
        Some(&self.state)
    }

    /// Store or reject a summary payload.
    ///
    /// Once the cycle has settled, repeated summaries are dropped so the
    /// fetched views are kept until the next refresh.
    fn accept_primary(&mut self, payload: &Payload) {
        if matches!(self.phase, CyclePhase::Ready | CyclePhase::Hidden) {
            debug!(phase = ?self.phase, "cycle already settled, summary dropped");
            return;
        }
        match payload {
            Payload::Data(data) => {
                self.store.set(0, data.clone());
                self.reconcile();
            }
            Payload::Error(err) => self.fail(ErrorDetail::remote(err.clone())),
            Payload::Integer(_) | Payload::Null => self.fail(ErrorDetail::malformed()),
        }
    }

    /// Derive the view state from the stored model, issuing the views fetch
    /// when the count is still missing.
    pub fn reconcile(&mut self) {
        let Some(model) = self.store.latest_post() else {
            self.fail(ErrorDetail::invalid_local_state());
            return;
        };

        let Some(post) = &model.post else {
            self.phase = CyclePhase::Hidden;
            self.state = ViewState::Hidden;
            return;
        };

        match post.views {
            Some(_) => {
                self.phase = CyclePhase::Ready;
                self.state = ViewState::Ready(post.clone());
            }
            None => {
                if self.phase != CyclePhase::AwaitingSecondary {
                    self.requester.request_sections(
                        Some(post.post_id),
                        &[SectionId::InsightsLatestPostViews],
                    );
                }
                self.phase = CyclePhase::AwaitingSecondary;
                self.state = ViewState::LoadingPlaceholder;
            }
        }
    }

    fn fail(&mut self, detail: ErrorDetail) {
        match (&detail.remote, detail.kind) {
            (Some(remote), _) => warn!(error = %remote, "latest post stats failed"),
            (None, ErrorKind::InvalidLocalState) => {
                error!("latest post card has no usable summary stored")
            }
            (None, _) => warn!("latest post stats response was missing or malformed"),
        }
        self.phase = CyclePhase::Error;
        self.state = ViewState::Error(detail);
    }
}

// ---------------------------------------------------------------------------
// Test support
// ---------------------------------------------------------------------------


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
