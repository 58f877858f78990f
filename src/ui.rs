//! Terminal UI rendering.
//!
//! All drawing logic lives here, separated from application state ([`App`])
//! and input handling ([`crate::input`]).  Rendering only reads the card's
//! [`ViewState`]; it never decides what to fetch.
//!
//! ## For contributors
//!
//! * The layout is a two-row split: the latest-post card on top and a
//!   one-line status bar at the bottom.
//! * A hidden card draws nothing at all, not even its border.
//! * [`ratatui`] is the TUI framework; see its docs for widget details.

use chrono::{DateTime, Utc};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::format::{format_count, since_label};
use crate::orchestrator::ViewState;
use crate::service::SectionRequester;
use crate::source::LatestPost;

const CARD_TITLE: &str = " Latest Post Summary ";

/// Draw the complete UI for one frame.
pub fn draw<R: SectionRequester>(app: &App<R>, frame: &mut Frame) {
    let [card_area, status_area] = Layout::vertical([
        Constraint::Min(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    draw_card(app.card.view_state(), frame, card_area, Utc::now());
    draw_status_bar(app, frame, status_area);
}

fn draw_card(state: &ViewState, frame: &mut Frame, area: Rect, now: DateTime<Utc>) {
    let block = Block::default().title(CARD_TITLE).borders(Borders::ALL);

    match state {
        ViewState::Hidden => {}
        ViewState::LoadingPlaceholder => {
            let body = Paragraph::new(Span::styled("Loading…", Style::default().fg(Color::DarkGray)))
                .block(block);
            frame.render_widget(body, area);
        }
        ViewState::Error(_) => {
            let body = Paragraph::new(Span::styled(
                "Unable to load latest post stats. Press r to retry.",
                Style::default().fg(Color::Red),
            ))
            .block(block);
            frame.render_widget(body, area);
        }
        ViewState::Ready(post) => {
            let inner = block.inner(area);
            frame.render_widget(block, area);
            draw_post(post, frame, inner, now);
        }
    }
}

/// Trend line, link, and the three counter tabs.
fn draw_post(post: &LatestPost, frame: &mut Frame, area: Rect, now: DateTime<Utc>) {
    let [trend_area, link_area, _, tabs_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Min(3),
    ])
    .areas(area);

    let since = post
        .published
        .map(|d| since_label(d, now))
        .unwrap_or_else(|| "on an unknown date".into());

    let trend = Line::from(vec![
        Span::raw("Latest post: \""),
        Span::styled(
            &post.title,
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!("\", published {since}")),
    ]);
    frame.render_widget(Paragraph::new(trend), trend_area);
    frame.render_widget(
        Paragraph::new(Span::styled(&post.url, Style::default().fg(Color::DarkGray))),
        link_area,
    );

    let tabs = [
        ("Views", post.views.unwrap_or_default()),
        ("Likes", post.likes),
        ("Comments", post.comments),
    ];
    let areas = Layout::horizontal([Constraint::Ratio(1, 3); 3]).split(tabs_area);
    for ((label, value), tab_area) in tabs.into_iter().zip(areas.iter()) {
        let tab = Paragraph::new(vec![
            Line::from(Span::styled(label, Style::default().fg(Color::Gray))),
            Line::from(Span::styled(
                format_count(value),
                Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            )),
        ])
        .block(Block::default().borders(Borders::ALL));
        frame.render_widget(tab, *tab_area);
    }
}

/// Render the bottom status bar.
fn draw_status_bar<R>(app: &App<R>, frame: &mut Frame, area: Rect) {
    let today = app
        .today_views
        .map(|v| format!("{} views today", format_count(v)))
        .unwrap_or_else(|| "today: –".into());

    let status = Paragraph::new(Line::from(vec![
        Span::styled(" ", Style::default()),
        Span::styled(&app.status, Style::default().fg(Color::Yellow)),
        Span::raw("  "),
        Span::styled(today, Style::default().fg(Color::Green)),
        Span::raw("  q: quit  r: refresh"),
    ]));
    frame.render_widget(status, area);
}
