use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, Gauge, GraphType, Paragraph, Widget, Wrap},
};
use wavequiz::event::Outcome;
use wavequiz::pointer::ClickTarget;
use wavequiz::session::Phase;
use wavequiz::util::mean;

use crate::ui::charting::{compute_chart_params, format_label, wave_accuracy_points};
use crate::App;

/// One game panel per phase: draws itself and reports what can be clicked.
pub trait Screen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer);
    fn targets(&self, _app: &App, _area: Rect) -> Vec<(Rect, ClickTarget)> {
        Vec::new()
    }
}

pub struct IdleScreen;
pub struct WaveScreen;
pub struct HubScreen;
pub struct GameOverScreen;

pub fn current_screen(phase: Phase) -> Box<dyn Screen> {
    match phase {
        Phase::Idle => Box::new(IdleScreen),
        Phase::WaveActive => Box::new(WaveScreen),
        Phase::Hub => Box::new(HubScreen),
        Phase::GameOver => Box::new(GameOverScreen),
    }
}

fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

fn dim() -> Style {
    Style::default().add_modifier(Modifier::DIM)
}

fn button(label: &str, highlighted: bool) -> Paragraph<'_> {
    let style = if highlighted {
        bold().fg(Color::Yellow)
    } else {
        bold()
    };
    Paragraph::new(Span::styled(label, style))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL))
}

fn hovered(app: &App, target: ClickTarget) -> bool {
    app.pointer_mode && app.hovered == Some(target)
}

/// Cells of the answer grid: two columns, as many rows as needed.
pub fn option_cells(area: Rect, count: usize) -> Vec<Rect> {
    if count == 0 {
        return Vec::new();
    }
    let rows = count.div_ceil(2) as u32;
    let row_areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints((0..rows).map(|_| Constraint::Ratio(1, rows)).collect::<Vec<_>>())
        .split(area);

    row_areas
        .iter()
        .flat_map(|row| {
            Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(*row)
                .to_vec()
        })
        .take(count)
        .collect()
}

impl IdleScreen {
    fn chunks(area: Rect) -> std::rc::Rc<[Rect]> {
        Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(3)])
            .split(area)
    }
}

impl Screen for IdleScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        let chunks = Self::chunks(area);
        let s = app.controller.session();
        let text = vec![
            Line::from(Span::styled("Welcome to the arena", bold().fg(Color::Cyan))),
            Line::from(""),
            Line::from(format!(
                "{} waves of {} questions. Answer before the clock runs out.",
                s.total_waves, s.questions_per_wave
            )),
            Line::from(format!(
                "Finish with at least {}% accuracy to keep your credits.",
                app.controller.config().economy.keep_threshold_percent
            )),
            Line::from(Span::styled(
                "Tab opens the assistant: try \"waves: 5\" or \"questions: 4\".",
                dim(),
            )),
        ];
        Paragraph::new(text)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(chunks[0], buf);

        button(
            "Start wave (s)",
            hovered(app, ClickTarget::StartWave),
        )
        .render(chunks[1], buf);
    }

    fn targets(&self, _app: &App, area: Rect) -> Vec<(Rect, ClickTarget)> {
        vec![(Self::chunks(area)[1], ClickTarget::StartWave)]
    }
}

impl WaveScreen {
    fn chunks(area: Rect) -> std::rc::Rc<[Rect]> {
        Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // prompt
                Constraint::Length(1), // timer
                Constraint::Min(6),    // options
                Constraint::Length(3), // hint / freeze buttons
                Constraint::Length(3), // feedback
            ])
            .split(area)
    }

    fn tool_cells(area: Rect) -> std::rc::Rc<[Rect]> {
        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(area)
    }

    fn option_style(app: &App, index: usize) -> Style {
        match &app.view.reveal {
            Some(r) if r.correct_index == index => bold().fg(Color::Green),
            Some(r) if r.selected == Some(index) => bold().fg(Color::Red),
            Some(_) => dim(),
            None if app.hovered == Some(ClickTarget::Option(index)) => bold().fg(Color::Yellow),
            None => Style::default(),
        }
    }

    fn feedback(app: &App) -> Vec<Line<'_>> {
        let mut lines = Vec::new();
        if let Some(r) = &app.view.reveal {
            let (text, color) = match r.outcome {
                Outcome::Correct => (format!("Correct! +{} credits", r.credits_awarded), Color::Green),
                Outcome::Incorrect => (format!("Wrong. The answer was \"{}\"", r.correct_text), Color::Red),
                Outcome::TimedOut => (format!("Time's up. The answer was \"{}\"", r.correct_text), Color::Red),
            };
            lines.push(Line::from(Span::styled(text, bold().fg(color))));
            if let Some(explanation) = &r.explanation {
                lines.push(Line::from(Span::styled(explanation.as_str(), dim())));
            }
        }
        if let Some(hint) = &app.view.hint {
            lines.push(Line::from(Span::styled(
                format!("Hint: {hint}"),
                Style::default().fg(Color::Magenta),
            )));
        }
        if app.view.scanning {
            lines.push(Line::from(Span::styled(
                "Scanning... smile (y) to reveal the hint, (c) to cancel",
                Style::default()
                    .fg(Color::Magenta)
                    .add_modifier(Modifier::ITALIC),
            )));
        }
        if let Some(notice) = &app.view.notice {
            lines.push(Line::from(Span::styled(
                notice.as_str(),
                Style::default().fg(Color::Yellow),
            )));
        }
        lines
    }
}

impl Screen for WaveScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        let chunks = Self::chunks(area);

        if let Some(q) = &app.view.question {
            let prompt = vec![
                Line::from(Span::styled(
                    format!(
                        "{}  ·  question {}/{}",
                        q.category, q.number_in_wave, q.questions_per_wave
                    ),
                    dim(),
                )),
                Line::from(Span::styled(q.prompt.as_str(), bold())),
            ];
            Paragraph::new(prompt)
                .wrap(Wrap { trim: true })
                .render(chunks[0], buf);

            for (i, cell) in option_cells(chunks[2], q.options.len()).into_iter().enumerate() {
                Paragraph::new(Span::styled(
                    format!("{}) {}", i + 1, q.options[i]),
                    Self::option_style(app, i),
                ))
                .wrap(Wrap { trim: true })
                .block(Block::default().borders(Borders::ALL))
                .render(cell, buf);
            }
        }

        let countdown = app.controller.countdown();
        let color = if app.view.critical {
            Color::Red
        } else {
            Color::Green
        };
        let mut label = format!("{:.1}s", countdown.time_left());
        if countdown.is_frozen() {
            label.push_str("  FROZEN");
        }
        Gauge::default()
            .gauge_style(Style::default().fg(color))
            .ratio((countdown.percent() / 100.0).clamp(0.0, 1.0))
            .label(label)
            .render(chunks[1], buf);

        let s = app.controller.session();
        let tools = Self::tool_cells(chunks[3]);
        button(
            &format!("Hint (h) · {} left", s.hints),
            hovered(app, ClickTarget::UseHint),
        )
        .render(tools[0], buf);
        button(
            &format!("Freeze (f) · {} left", s.freeze_charges),
            hovered(app, ClickTarget::UseFreeze),
        )
        .render(tools[1], buf);

        Paragraph::new(Self::feedback(app))
            .wrap(Wrap { trim: true })
            .render(chunks[4], buf);
    }

    fn targets(&self, app: &App, area: Rect) -> Vec<(Rect, ClickTarget)> {
        let chunks = Self::chunks(area);
        let count = app.view.question.as_ref().map_or(0, |q| q.options.len());
        let mut targets = option_cells(chunks[2], count)
            .into_iter()
            .enumerate()
            .map(|(i, cell)| (cell, ClickTarget::Option(i)))
            .collect::<Vec<_>>();
        let tools = Self::tool_cells(chunks[3]);
        targets.push((tools[0], ClickTarget::UseHint));
        targets.push((tools[1], ClickTarget::UseFreeze));
        targets
    }
}

impl HubScreen {
    fn chunks(area: Rect) -> std::rc::Rc<[Rect]> {
        Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
            ])
            .split(area)
    }
}

impl Screen for HubScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        let chunks = Self::chunks(area);
        let s = app.controller.session();
        let economy = &app.controller.config().economy;

        let mut lines = Vec::new();
        if let Some(w) = &app.view.last_wave {
            lines.push(Line::from(Span::styled(
                format!(
                    "Wave {} complete: {}/{} correct",
                    w.wave_index, w.correct_in_wave, w.questions_per_wave
                ),
                bold().fg(Color::Cyan),
            )));
        }
        lines.push(Line::from(format!(
            "Next up: wave {} of {}. You have {} credits.",
            s.wave_index, s.total_waves, s.credits
        )));
        if let Some(notice) = &app.view.notice {
            lines.push(Line::from(Span::styled(
                notice.as_str(),
                Style::default().fg(Color::Yellow),
            )));
        }
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(chunks[0], buf);

        button(
            &format!(
                "Buy hint pack +{} (H) · {} credits",
                economy.hint_pack_size, economy.hint_cost
            ),
            hovered(app, ClickTarget::BuyHint),
        )
        .render(chunks[1], buf);
        button(
            &format!("Buy freeze (F) · {} credits", economy.freeze_cost),
            hovered(app, ClickTarget::BuyFreeze),
        )
        .render(chunks[2], buf);
        button(
            "Next wave (s)",
            hovered(app, ClickTarget::StartWave),
        )
        .render(chunks[3], buf);
    }

    fn targets(&self, _app: &App, area: Rect) -> Vec<(Rect, ClickTarget)> {
        let chunks = Self::chunks(area);
        vec![
            (chunks[1], ClickTarget::BuyHint),
            (chunks[2], ClickTarget::BuyFreeze),
            (chunks[3], ClickTarget::StartWave),
        ]
    }
}

impl Screen for GameOverScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(5), Constraint::Min(4)])
            .split(area);

        let Some(summary) = &app.view.summary else {
            Paragraph::new("Game over").render(chunks[0], buf);
            return;
        };

        let verdict = if summary.kept_credits {
            Span::styled(
                format!("You keep your {} credits.", summary.credits),
                bold().fg(Color::Green),
            )
        } else {
            Span::styled(
                format!(
                    "Below {}%: {} credits lost.",
                    app.controller.config().economy.keep_threshold_percent,
                    summary.credits_lost
                ),
                bold().fg(Color::Red),
            )
        };

        let points = wave_accuracy_points(
            &summary.wave_results,
            app.controller.session().questions_per_wave,
        );
        let average = mean(&points.iter().map(|p| p.1).collect::<Vec<f64>>()).unwrap_or(0.0);

        let lines = vec![
            Line::from(Span::styled(
                format!(
                    "All waves done: {}/{} correct ({}%)",
                    summary.total_correct, summary.total_questions, summary.accuracy_percent
                ),
                bold().fg(Color::Cyan),
            )),
            Line::from(verdict),
            Line::from(format!(
                "Last wave: {} correct · items bought: {} · average wave accuracy {}%",
                summary.correct_in_last_wave,
                summary.items_purchased,
                format_label(average)
            )),
            Line::from(Span::styled(
                "(r)estart keeping credits / (R) factory reset / (esc)ape",
                Style::default().add_modifier(Modifier::ITALIC),
            )),
        ];
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(chunks[0], buf);

        let (last_wave, highest) = compute_chart_params(&points);
        let datasets = vec![Dataset::default()
            .marker(symbols::Marker::Braille)
            .style(Style::default().fg(Color::Magenta))
            .graph_type(GraphType::Line)
            .data(&points)];

        Chart::new(datasets)
            .x_axis(
                Axis::default()
                    .title("wave")
                    .bounds([1.0, last_wave])
                    .labels(vec![
                        Span::styled("1", bold()),
                        Span::styled(format_label(last_wave), bold()),
                    ]),
            )
            .y_axis(
                Axis::default()
                    .title("accuracy %")
                    .bounds([0.0, highest])
                    .labels(vec![
                        Span::styled("0", bold()),
                        Span::styled(format_label(highest), bold()),
                    ]),
            )
            .render(chunks[1], buf);
    }
}
