//! Terminal user interface with ratatui.

use crate::app::{App, Outcome};
use crate::export::{export_outcome, format_time_ms};
use crate::models::{EnrichedPost, UserProfile};
use anyhow::Result;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

/// Colors for the UI.
pub struct UiColors {
    pub ok: Color,
    pub error: Color,
    pub muted: Color,
    pub accent: Color,
    pub border: Color,
}

impl Default for UiColors {
    fn default() -> Self {
        Self {
            ok: Color::Green,
            error: Color::Red,
            muted: Color::DarkGray,
            accent: Color::Cyan,
            border: Color::DarkGray,
        }
    }
}

/// Render the main UI.
pub fn render(frame: &mut Frame, app: &App) {
    let colors = UiColors::default();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(5),    // Results
            Constraint::Length(1), // Footer
        ])
        .split(frame.area());

    render_header(frame, app, chunks[0], &colors);
    render_results(frame, app, chunks[1], &colors);
    render_footer(frame, chunks[2], &colors);

    if app.show_help {
        render_help_overlay(frame, &colors);
    }
}

/// Render the header with mode and timing of the last run.
fn render_header(frame: &mut Frame, app: &App, area: Rect, colors: &UiColors) {
    let status = match (&app.loading, &app.outcome) {
        (Some(mode), _) => Line::from(Span::styled(
            format!("Loading ({})...", mode),
            Style::default().fg(Color::Yellow),
        )),
        (None, Some(outcome)) => Line::from(vec![
            Span::raw("Mode: "),
            Span::styled(
                outcome.mode_label(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw(" | Time: "),
            Span::styled(
                format_time_ms(outcome.time_ms()),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ]),
        (None, None) => Line::from(Span::styled(
            "Press s, p or c to fetch",
            Style::default().fg(colors.muted),
        )),
    };

    let header_text = vec![
        Line::from(vec![
            Span::styled(
                "FANOUT ",
                Style::default()
                    .fg(colors.accent)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!("- user {}  runs: {}", app.user_id, app.runs)),
        ]),
        status,
    ];

    let header = Paragraph::new(header_text).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(colors.border)),
    );

    frame.render_widget(header, area);
}

/// Render the body for the last outcome.
fn render_results(frame: &mut Frame, app: &App, area: Rect, colors: &UiColors) {
    let lines = match &app.outcome {
        Some(outcome) => outcome_lines(outcome, colors),
        None => vec![Line::from(Span::styled(
            "No results yet.",
            Style::default().fg(colors.muted),
        ))],
    };

    let body = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(colors.border)),
        )
        .wrap(Wrap { trim: false })
        .scroll((app.scroll, 0));

    frame.render_widget(body, area);
}

/// Styled lines for an outcome.
pub fn outcome_lines(outcome: &Outcome, colors: &UiColors) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    match outcome {
        Outcome::Report(report) => {
            match &report.user {
                Some(user) => {
                    push_user(&mut lines, user, colors);
                    push_posts(&mut lines, &report.posts, colors);
                }
                None => lines.push(Line::from(Span::styled(
                    "No user data returned.",
                    Style::default().fg(colors.muted),
                ))),
            }

            if !report.errors.is_empty() {
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(
                    "Some comments failed to load. Try again.",
                    Style::default()
                        .fg(colors.error)
                        .add_modifier(Modifier::BOLD),
                )));
                lines.push(Line::from(Span::styled(
                    "Errors (handled)",
                    Style::default().add_modifier(Modifier::BOLD),
                )));
                for error in &report.errors {
                    lines.push(Line::from(Span::styled(
                        format!("  - {}", error),
                        Style::default().fg(colors.error),
                    )));
                }
            }
        }
        Outcome::Combined { content, .. } => {
            push_user(&mut lines, &content.user, colors);
            push_posts(&mut lines, &content.posts, colors);
        }
        Outcome::Failed { message, .. } => {
            lines.push(Line::from(vec![
                Span::styled(
                    "Error: ",
                    Style::default()
                        .fg(colors.error)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(message.clone(), Style::default().fg(colors.error)),
            ]));
        }
    }

    lines
}

fn push_user(lines: &mut Vec<Line<'static>>, user: &UserProfile, colors: &UiColors) {
    lines.push(Line::from(Span::styled(
        "User",
        Style::default()
            .fg(colors.accent)
            .add_modifier(Modifier::BOLD),
    )));
    for (label, value) in [
        ("Name", &user.name),
        ("Username", &user.username),
        ("Email", &user.email),
    ] {
        lines.push(Line::from(vec![
            Span::styled(
                format!("  {}: ", label),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw(value.clone()),
        ]));
    }
}

fn push_posts(lines: &mut Vec<Line<'static>>, posts: &[EnrichedPost], colors: &UiColors) {
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Posts",
        Style::default()
            .fg(colors.accent)
            .add_modifier(Modifier::BOLD),
    )));

    for post in posts {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("  {}", post.post.title),
            Style::default().add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(format!("  {}", post.post.content)));

        if let Some(error) = &post.comment_error {
            lines.push(Line::from(Span::styled(
                format!("    Comments error: {}", error),
                Style::default().fg(colors.error),
            )));
        }

        if post.comments.is_empty() {
            lines.push(Line::from(Span::styled(
                "    (No comments returned)",
                Style::default().fg(colors.muted),
            )));
        } else {
            for comment in &post.comments {
                lines.push(Line::from(vec![
                    Span::styled(
                        format!("    @{}", comment.username),
                        Style::default().fg(colors.ok),
                    ),
                    Span::raw(format!(": {}", comment.comment)),
                ]));
            }
        }
    }
}

/// Render footer with key hints.
fn render_footer(frame: &mut Frame, area: Rect, colors: &UiColors) {
    let footer = Paragraph::new(Line::from(vec![
        Span::styled("s", Style::default().fg(Color::Yellow)),
        Span::raw(":sequential "),
        Span::styled("p", Style::default().fg(Color::Yellow)),
        Span::raw(":parallel "),
        Span::styled("c", Style::default().fg(Color::Yellow)),
        Span::raw(":combined "),
        Span::styled("j/k", Style::default().fg(Color::Yellow)),
        Span::raw(":scroll "),
        Span::styled("h", Style::default().fg(Color::Yellow)),
        Span::raw(":help "),
        Span::styled("q", Style::default().fg(Color::Yellow)),
        Span::raw(":quit"),
    ]))
    .style(Style::default().fg(colors.muted));

    frame.render_widget(footer, area);
}

/// Render help overlay.
fn render_help_overlay(frame: &mut Frame, colors: &UiColors) {
    let area = centered_rect(60, 50, frame.area());

    let help_text = vec![
        Line::from(Span::styled(
            "Keyboard Shortcuts",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("  s          Fetch sequentially"),
        Line::from("  p          Fetch in parallel"),
        Line::from("  c          Combined fetch (leg failures abort)"),
        Line::from("  j/k, ↓/↑   Scroll results"),
        Line::from("  g          Back to top"),
        Line::from("  h, ?       Toggle this help"),
        Line::from("  q, Esc     Quit"),
        Line::from(""),
        Line::from(Span::styled(
            "Comment fetches fail at random; run again to retry.",
            Style::default().fg(colors.muted),
        )),
    ];

    let help = Paragraph::new(help_text)
        .block(
            Block::default()
                .title(" Help ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(colors.accent)),
        )
        .wrap(Wrap { trim: true });

    frame.render_widget(Clear, area);
    frame.render_widget(help, area);
}

/// Create a centered rectangle.
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

/// Render batch mode output (non-interactive).
pub fn render_batch(app: &App) -> Result<()> {
    use crate::cli::ExportFormat;
    use chrono::Local;

    let Some(outcome) = &app.outcome else {
        return Ok(());
    };

    let output = export_outcome(outcome, app.export)?;

    if app.export == ExportFormat::Text {
        println!(
            "\n=== FANOUT {} ===",
            Local::now().format("%Y-%m-%d %H:%M:%S")
        );
    }
    println!("{}", output);

    Ok(())
}
