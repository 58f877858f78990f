use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::orchestrator::{LatestPostCard, ViewState};
use crate::section::SectionId;
use crate::service::{CompletionEvent, SectionRequester};
use crate::source::{Payload, RemoteData};

pub struct App<R> {
    /// The latest-post card and its fetch cycle.
    pub card: LatestPostCard<R>,
    requester: R,
    /// Site-wide views today, once fetched.
    pub today_views: Option<u64>,
    /// Whether the user has requested to quit.
    pub quit: bool,
    /// Last status message.
    pub status: String,
    last_refresh: Option<Instant>,
}

impl<R: SectionRequester + Clone> App<R> {
    pub fn new(requester: R) -> Self {
        Self {
            card: LatestPostCard::new(requester.clone()),
            requester,
            today_views: None,
            quit: false,
            status: "Starting…".into(),
            last_refresh: None,
        }
    }

    /// Restart the card cycle and re-request the status bar totals.
    ///
    /// While the card still waits on a result nothing happens; the refresh
    /// stays due and is retried on a later tick.
    pub fn refresh(&mut self, now: Instant) {
        if self.card.phase().is_in_flight() {
            debug!(phase = ?self.card.phase(), "card busy, refresh postponed");
            return;
        }
        if !self.card.start_cycle() {
            return;
        }
        self.requester
            .request_sections(None, &[SectionId::InsightsToday]);
        self.last_refresh = Some(now);
        self.status = "Refreshing…".into();
    }

    pub fn refresh_due(&self, now: Instant, interval: Duration) -> bool {
        match self.last_refresh {
            Some(last) => now.duration_since(last) >= interval,
            None => true,
        }
    }

    /// Hand one bus event to every consumer.
    pub fn handle_event(&mut self, event: &CompletionEvent) {
        if event.section == SectionId::InsightsToday {
            self.accept_today(&event.payload);
        }
        if let Some(state) = self.card.handle_event(event) {
            self.status = status_line(state);
        }
    }

    /// Stop reacting to events; called before the UI goes away.
    pub fn shutdown(&mut self) {
        self.card.detach();
        self.quit = true;
    }

    fn accept_today(&mut self, payload: &Payload) {
        match payload {
            Payload::Data(RemoteData::Other(value)) => {
                self.today_views = value.get("views").and_then(serde_json::Value::as_u64);
                debug!(views = ?self.today_views, "today's totals updated");
            }
            Payload::Error(err) => warn!(error = %err, "today's totals unavailable"),
            other => warn!(payload = ?other, "unexpected payload for today's totals"),
        }
    }
}

fn status_line(state: &ViewState) -> String {
    match state {
        ViewState::Hidden => "No published posts".into(),
        ViewState::LoadingPlaceholder => "Loading views…".into(),
        ViewState::Ready(_) => "Up to date".into(),
        ViewState::Error(detail) => match &detail.remote {
            Some(err) => format!("Error: {err}"),
            None => "Error: unexpected response".into(),
        },
    }
}
