use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Row, Table, Wrap};
use ratatui::Frame;

use super::client::{DashboardData, DashboardState};

/// Everything the dashboard draws. `state` is `None` until the first fetch
/// completes.
#[derive(Debug)]
pub(super) struct Screen {
    api_url: String,
    refresh_secs: u64,
    state: Option<DashboardState>,
    refreshed_at: Option<DateTime<Utc>>,
}

impl Screen {
    pub(super) fn new(api_url: &str, refresh_secs: u64) -> Self {
        Self {
            api_url: api_url.to_string(),
            refresh_secs,
            state: None,
            refreshed_at: None,
        }
    }

    pub(super) fn update(&mut self, state: DashboardState, at: DateTime<Utc>) {
        self.state = Some(state);
        self.refreshed_at = Some(at);
    }
}

fn status_label(state: Option<&DashboardState>) -> (&'static str, Color) {
    match state {
        None => ("LOADING", Color::Gray),
        Some(DashboardState::BackendUnreachable { .. }) => ("UNREACHABLE", Color::Red),
        Some(DashboardState::BackendError { .. }) => ("ERROR", Color::Red),
        Some(DashboardState::NoData) => ("NO DATA", Color::Yellow),
        Some(DashboardState::Ready(_)) => ("OK", Color::Green),
    }
}

pub(super) fn draw(frame: &mut Frame<'_>, screen: &Screen) {
    let [header, body, help] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    draw_header(frame, header, screen);
    match &screen.state {
        None => draw_message(frame, body, "Loading...", Color::Gray, &[]),
        Some(DashboardState::BackendUnreachable { api_url, reason }) => draw_message(
            frame,
            body,
            &format!("Backend unreachable at {api_url}"),
            Color::Red,
            &[
                reason.clone(),
                "Start the API with `trendscope run` or check --api-url.".to_string(),
            ],
        ),
        Some(DashboardState::BackendError {
            status,
            code,
            message,
        }) => draw_message(
            frame,
            body,
            &format!("Backend error {status}: {code}"),
            Color::Red,
            &[message.clone()],
        ),
        Some(DashboardState::NoData) => draw_message(
            frame,
            body,
            "No data yet",
            Color::Yellow,
            &["Run `trendscope collect` or POST /api/v1/collect, then press r.".to_string()],
        ),
        Some(DashboardState::Ready(data)) => draw_ready(frame, body, data),
    }

    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(" q", Style::new().add_modifier(Modifier::BOLD)),
            Span::raw(" quit  "),
            Span::styled("r", Style::new().add_modifier(Modifier::BOLD)),
            Span::raw(" refresh"),
        ])),
        help,
    );
}

fn draw_header(frame: &mut Frame<'_>, area: Rect, screen: &Screen) {
    let (label, color) = status_label(screen.state.as_ref());
    let refreshed = screen.refreshed_at.map_or_else(
        || "never".to_string(),
        |t| t.format("%H:%M:%S UTC").to_string(),
    );
    let line = Line::from(vec![
        Span::styled(
            format!(" {label} "),
            Style::new().fg(Color::Black).bg(color).add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(
            "  {}  refreshed {refreshed}  every {}s",
            screen.api_url, screen.refresh_secs
        )),
    ]);
    frame.render_widget(
        Paragraph::new(line).block(Block::bordered().title(" trendscope ")),
        area,
    );
}

fn draw_message(frame: &mut Frame<'_>, area: Rect, title: &str, color: Color, details: &[String]) {
    let mut lines = vec![Line::from(Span::styled(
        title.to_string(),
        Style::new().fg(color).add_modifier(Modifier::BOLD),
    ))];
    lines.push(Line::raw(""));
    lines.extend(details.iter().map(|d| Line::raw(d.clone())));
    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(Block::bordered()),
        area,
    );
}

fn draw_ready(frame: &mut Frame<'_>, area: Rect, data: &DashboardData) {
    let [top, bottom] =
        Layout::vertical([Constraint::Length(10), Constraint::Min(0)]).areas(area);
    let [overview, topics] =
        Layout::horizontal([Constraint::Percentage(40), Constraint::Percentage(60)]).areas(top);

    let summary = &data.summary;
    let mut lines = vec![Line::raw(format!("records    {}", summary.total_records))];
    lines.extend(
        summary
            .platform_counts
            .iter()
            .map(|(platform, count)| Line::raw(format!("  {platform:<10}{count}"))),
    );
    lines.push(Line::raw(""));
    let s = &summary.sentiment;
    lines.push(Line::from(vec![
        Span::raw("sentiment  "),
        Span::styled(format!("+{}", s.positive), Style::new().fg(Color::Green)),
        Span::raw(format!(" ={} ", s.neutral)),
        Span::styled(format!("-{}", s.negative), Style::new().fg(Color::Red)),
        Span::raw(format!("  mean {:.3}", s.mean_score)),
    ]));
    lines.push(Line::raw(format!(
        "avg engagement {}",
        format_rate(summary.engagement.mean_rate)
    )));
    if let Some(as_of) = summary.as_of {
        lines.push(Line::raw(format!("as of      {}", as_of.format("%Y-%m-%d %H:%M"))));
    }
    frame.render_widget(
        Paragraph::new(lines).block(Block::bordered().title(" Overview ")),
        overview,
    );

    let header = Row::new(["HASHTAG", "RECORDS", "PLATFORMS", "SCORE"])
        .style(Style::new().add_modifier(Modifier::BOLD));
    let rows = data.topics.iter().map(|topic| {
        Row::new([
            format!("#{}", topic.hashtag),
            topic.record_count.to_string(),
            topic.platforms.join(","),
            format!("{:.3}", topic.score),
        ])
    });
    let widths = [
        Constraint::Min(16),
        Constraint::Length(8),
        Constraint::Length(20),
        Constraint::Length(6),
    ];
    frame.render_widget(
        Table::new(rows, widths)
            .header(header)
            .block(Block::bordered().title(" Trending topics ")),
        topics,
    );

    let header = Row::new(["PLATFORM", "ENGAGEMENT", "SCORE", "SENTIMENT", "TITLE"])
        .style(Style::new().add_modifier(Modifier::BOLD));
    let rows = summary.top_content.iter().map(|item| {
        Row::new([
            item.platform.clone(),
            item.total_engagement.to_string(),
            format!("{:.3}", item.trending_score),
            item.sentiment.clone(),
            format!("{} ({})", item.title, item.author),
        ])
    });
    let widths = [
        Constraint::Length(10),
        Constraint::Length(11),
        Constraint::Length(6),
        Constraint::Length(10),
        Constraint::Min(20),
    ];
    frame.render_widget(
        Table::new(rows, widths)
            .header(header)
            .block(Block::bordered().title(" Top content ")),
        bottom,
    );
}

fn format_rate(rate: Option<f64>) -> String {
    rate.map_or_else(|| "-".to_string(), |r| format!("{r:.2}%"))
}

/// Plain-text rendering of one fetch, for `dashboard --once`.
pub(super) fn render_text(state: &DashboardState) -> String {
    let mut out = String::new();
    let (label, _) = status_label(Some(state));
    let _ = writeln!(out, "status: {label}");
    match state {
        DashboardState::BackendUnreachable { api_url, reason } => {
            let _ = writeln!(out, "backend unreachable at {api_url}: {reason}");
        }
        DashboardState::BackendError {
            status,
            code,
            message,
        } => {
            let _ = writeln!(out, "backend error {status} {code}: {message}");
        }
        DashboardState::NoData => {
            let _ = writeln!(out, "no data yet; run `trendscope collect`");
        }
        DashboardState::Ready(data) => {
            let summary = &data.summary;
            let _ = writeln!(out, "records: {}", summary.total_records);
            for (platform, count) in &summary.platform_counts {
                let _ = writeln!(out, "  {platform:<10}{count}");
            }
            let s = &summary.sentiment;
            let _ = writeln!(
                out,
                "sentiment: {} positive, {} neutral, {} negative",
                s.positive, s.neutral, s.negative
            );
            let _ = writeln!(
                out,
                "avg engagement: {} over {} rated records",
                format_rate(summary.engagement.mean_rate),
                summary.engagement.rated_records
            );
            for topic in &data.topics {
                let _ = writeln!(
                    out,
                    "  #{:<20}{:>4}  score {:.3}",
                    topic.hashtag, topic.record_count, topic.score
                );
            }
            for item in &summary.top_content {
                let _ = writeln!(
                    out,
                    "  {:<10}{:>8}  {}",
                    item.platform, item.total_engagement, item.title
                );
            }
        }
    }
    out
}
