pub mod format;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthChar;

use crate::{
    app::App,
    session::{CharState, Phase, Snapshot, StartTrigger},
    ui::format::{format_clock, is_low_time, tier_message},
};

const HORIZONTAL_MARGIN: u16 = 5;

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let snapshot = self.snapshot();
        let session = self.session();
        let timer = session.timer();

        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let dim_bold_style = Style::default()
            .patch(bold_style)
            .add_modifier(Modifier::DIM);
        let italic_style = Style::default().add_modifier(Modifier::ITALIC);

        let max_chars_per_line = area.width.saturating_sub(HORIZONTAL_MARGIN * 2).max(1);
        let prompt_width: usize = session
            .target()
            .iter()
            .map(|c| c.width().unwrap_or(0))
            .sum();
        let prompt_lines = if prompt_width <= max_chars_per_line as usize {
            1
        } else {
            // one extra line absorbs word-wrap slack
            ((prompt_width as f64 / max_chars_per_line as f64).ceil() + 1.0) as u16
        };
        let result_lines = if snapshot.phase == Phase::Finished { 2 } else { 0 };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .constraints([
                Constraint::Min(0),
                Constraint::Length(1), // timer
                Constraint::Length(1), // live stats
                Constraint::Length(1),
                Constraint::Length(prompt_lines),
                Constraint::Length(1),
                Constraint::Length(result_lines),
                Constraint::Min(0),
                Constraint::Length(1), // legend
            ])
            .split(area);

        let clock_style = if is_low_time(snapshot, timer) {
            Style::default().patch(bold_style).fg(Color::Red)
        } else {
            dim_bold_style
        };
        let timer_line = Line::from(vec![
            Span::styled(format!("{}  ", self.settings().timer), italic_style),
            Span::styled(format_clock(snapshot.remaining_or_elapsed_seconds), clock_style),
        ]);
        Paragraph::new(timer_line)
            .alignment(Alignment::Center)
            .render(chunks[1], buf);

        // live numbers stay hidden while the user is typing
        if snapshot.phase != Phase::Running {
            Paragraph::new(Span::styled(
                format!("{} wpm   {}% acc", snapshot.live_wpm, snapshot.live_accuracy),
                bold_style,
            ))
            .alignment(Alignment::Center)
            .render(chunks[2], buf);
        }

        Paragraph::new(Line::from(prompt_spans(session.target(), snapshot)))
            .alignment(if prompt_lines == 1 {
                Alignment::Center
            } else {
                Alignment::Left
            })
            .wrap(Wrap { trim: true })
            .render(chunks[4], buf);

        if let Some(result) = snapshot.result {
            let lines = vec![
                Line::from(Span::styled(
                    format!(
                        "{} wpm   {}% acc   {}",
                        result.wpm,
                        result.accuracy,
                        format_clock(result.time_seconds)
                    ),
                    Style::default().patch(bold_style).fg(Color::Magenta),
                )),
                Line::from(Span::styled(
                    tier_message(result.tier),
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::ITALIC),
                )),
            ];
            Paragraph::new(lines)
                .alignment(Alignment::Center)
                .render(chunks[6], buf);
        }

        Paragraph::new(Span::styled(
            legend(snapshot.phase, session.start_trigger()),
            italic_style,
        ))
        .render(chunks[8], buf);
    }
}

fn prompt_spans(target: &[char], snapshot: &Snapshot) -> Vec<Span<'static>> {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let green_bold_style = Style::default().patch(bold_style).fg(Color::Green);
    let red_bold_style = Style::default().patch(bold_style).fg(Color::Red);
    let dim_bold_style = Style::default()
        .patch(bold_style)
        .add_modifier(Modifier::DIM);
    let cursor_style = Style::default()
        .patch(dim_bold_style)
        .add_modifier(Modifier::UNDERLINED);

    let show_cursor = snapshot.phase != Phase::Finished;

    target
        .iter()
        .zip(snapshot.char_states.iter())
        .enumerate()
        .map(|(idx, (&expected, state))| match state {
            CharState::Correct => Span::styled(expected.to_string(), green_bold_style),
            CharState::Incorrect => Span::styled(
                match expected {
                    ' ' => "·".to_owned(),
                    c => c.to_string(),
                },
                red_bold_style,
            ),
            CharState::Untyped if show_cursor && idx == snapshot.cursor_index => {
                Span::styled(expected.to_string(), cursor_style)
            }
            CharState::Untyped => Span::styled(expected.to_string(), dim_bold_style),
        })
        .collect()
}

fn legend(phase: Phase, start_trigger: StartTrigger) -> &'static str {
    match (phase, start_trigger) {
        (Phase::Idle, StartTrigger::Explicit) => {
            "(enter) start / (tab) timer / (→) new / (esc)ape"
        }
        (Phase::Idle, StartTrigger::FirstKeystroke) => {
            "start typing / (tab) timer / (→) new / (esc)ape"
        }
        (Phase::Running, _) => "(tab) timer / (←) restart / (→) new / (esc)ape",
        (Phase::Finished, _) => "(r)etry / (n)ew / (tab) timer / (esc)ape",
    }
}
