//! Terminal dashboard over the HTTP API.

pub mod client;
mod view;

use std::time::Duration;

use chrono::Utc;
use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use ratatui::DefaultTerminal;

use client::{DashboardClient, DashboardState};
use view::Screen;

enum Input {
    Quit,
    Refresh,
    Redraw,
}

fn classify_key(key: KeyEvent) -> Input {
    if key.kind != KeyEventKind::Press {
        return Input::Redraw;
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => Input::Quit,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Input::Quit,
        KeyCode::Char('r') => Input::Refresh,
        _ => Input::Redraw,
    }
}

/// Runs the interactive dashboard until the user quits.
///
/// # Errors
///
/// Returns an error if the terminal cannot be drawn to or read from.
pub(crate) async fn run_dashboard(api_url: &str, refresh_secs: u64) -> anyhow::Result<()> {
    let client = DashboardClient::new(api_url)?;
    tracing::info!(api_url = client.base_url(), refresh_secs, "opening dashboard");

    let mut terminal = ratatui::init();
    let result = event_loop(&mut terminal, &client, refresh_secs).await;
    ratatui::restore();

    tracing::info!("dashboard closed");
    result
}

async fn event_loop(
    terminal: &mut DefaultTerminal,
    client: &DashboardClient,
    refresh_secs: u64,
) -> anyhow::Result<()> {
    let mut screen = Screen::new(client.base_url(), refresh_secs);
    let mut events = EventStream::new();
    // First tick completes immediately, so the initial fetch happens here.
    let mut ticker = tokio::time::interval(Duration::from_secs(refresh_secs.max(1)));

    loop {
        terminal.draw(|frame| view::draw(frame, &screen))?;

        tokio::select! {
            _ = ticker.tick() => refresh(&mut screen, client).await,
            event = events.next() => match event {
                Some(Ok(Event::Key(key))) => match classify_key(key) {
                    Input::Quit => return Ok(()),
                    Input::Refresh => {
                        refresh(&mut screen, client).await;
                        ticker.reset();
                    }
                    Input::Redraw => {}
                },
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e.into()),
                None => return Ok(()),
            },
        }
    }
}

async fn refresh(screen: &mut Screen, client: &DashboardClient) {
    let state = client.fetch().await;
    match &state {
        DashboardState::BackendUnreachable { reason, .. } => {
            tracing::warn!(reason = %reason, "dashboard cannot reach the API");
        }
        DashboardState::BackendError { status, code, .. } => {
            tracing::warn!(status, code = %code, "dashboard received an API error");
        }
        DashboardState::NoData | DashboardState::Ready(_) => {
            tracing::debug!("dashboard refreshed");
        }
    }
    screen.update(state, Utc::now());
}

/// Fetches once and prints a plain-text rendering to stdout.
///
/// # Errors
///
/// Returns an error when the API is unreachable or answers with an error,
/// after printing what was seen.
pub(crate) async fn print_snapshot(api_url: &str) -> anyhow::Result<()> {
    let client = DashboardClient::new(api_url)?;
    let state = client.fetch().await;
    print!("{}", view::render_text(&state));
    match state {
        DashboardState::BackendUnreachable { .. } | DashboardState::BackendError { .. } => {
            anyhow::bail!("dashboard snapshot failed against {}", client.base_url())
        }
        DashboardState::NoData | DashboardState::Ready(_) => Ok(()),
    }
}
