pub mod charting;
pub mod screen;

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;
use wavequiz::event::{AvatarState, GameEvent, GameSummary, QuestionView, Reveal, WaveSummary};
use wavequiz::pointer::{HitMap, Region};

use crate::{App, Focus};

const CHAT_HISTORY: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    Player,
    Assistant,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatLine {
    pub from: Speaker,
    pub text: String,
}

/// What the presenter remembers from the controller's event stream.
#[derive(Debug, Clone, Default)]
pub struct ArenaView {
    pub question: Option<QuestionView>,
    pub reveal: Option<Reveal>,
    pub hint: Option<String>,
    pub critical: bool,
    pub scanning: bool,
    pub avatar: AvatarState,
    pub last_wave: Option<WaveSummary>,
    pub summary: Option<GameSummary>,
    pub notice: Option<String>,
    pub chat: Vec<ChatLine>,
}

impl ArenaView {
    pub fn apply(&mut self, event: &GameEvent) {
        match event {
            GameEvent::QuestionServed(view) => {
                self.question = Some(view.clone());
                self.reveal = None;
                self.hint = None;
                self.critical = false;
                self.notice = None;
            }
            GameEvent::CountdownTick { critical, .. } => self.critical = *critical,
            GameEvent::AnswerRevealed(reveal) => {
                self.reveal = Some(reveal.clone());
                self.critical = false;
            }
            GameEvent::HintScanStarted => self.scanning = true,
            GameEvent::HintScanEnded => self.scanning = false,
            GameEvent::HintRevealed(text) => self.hint = Some(text.clone()),
            GameEvent::FreezeUsed { charges_left } => {
                self.notice = Some(format!("Time frozen. {charges_left} freezes left."))
            }
            GameEvent::Purchased(item) => self.notice = Some(format!("Bought: {item}")),
            GameEvent::WaveStarted { .. } => {
                self.last_wave = None;
                self.notice = None;
            }
            GameEvent::WaveEnded(summary) => {
                self.question = None;
                self.reveal = None;
                self.last_wave = Some(summary.clone());
            }
            GameEvent::GameOver(summary) => {
                self.question = None;
                self.reveal = None;
                self.summary = Some(summary.clone());
            }
            GameEvent::GameReset { .. } => {
                *self = ArenaView {
                    chat: std::mem::take(&mut self.chat),
                    ..ArenaView::default()
                };
            }
            GameEvent::Avatar(state) => self.avatar = *state,
            GameEvent::Notice(text) => self.notice = Some(text.clone()),
            GameEvent::Configured { .. }
            | GameEvent::BalancesChanged { .. }
            | GameEvent::TimeMultiplierChanged(_)
            | GameEvent::Cue(_) => {}
        }
    }

    pub fn say(&mut self, from: Speaker, text: impl Into<String>) {
        self.chat.push(ChatLine {
            from,
            text: text.into(),
        });
        if self.chat.len() > CHAT_HISTORY {
            let excess = self.chat.len() - CHAT_HISTORY;
            self.chat.drain(..excess);
        }
    }
}

pub struct ArenaLayout {
    pub header: Rect,
    pub game: Rect,
    pub chat_log: Rect,
    pub chat_input: Rect,
    pub legend: Rect,
}

pub fn arena_layout(area: Rect) -> ArenaLayout {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(8),
            Constraint::Length(1),
        ])
        .split(area);
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(rows[1]);
    let chat = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(3)])
        .split(cols[1]);

    ArenaLayout {
        header: rows[0],
        game: cols[0],
        chat_log: chat[0],
        chat_input: chat[1],
        legend: rows[2],
    }
}

fn game_block(app: &App) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", app.controller.session().phase))
}

/// Clickable regions of the current frame, normalized to the whole screen.
pub fn hit_map(app: &App, area: Rect) -> HitMap {
    let layout = arena_layout(area);
    let inner = game_block(app).inner(layout.game);
    let screen = screen::current_screen(app.controller.session().phase);

    let mut map = HitMap::new();
    for (rect, target) in screen.targets(app, inner) {
        map.register(
            Region::from_cells(
                rect.x - area.x,
                rect.y - area.y,
                rect.width,
                rect.height,
                area.width,
                area.height,
            ),
            target,
        );
    }
    map
}

fn avatar_span(avatar: AvatarState) -> Span<'static> {
    let (face, color) = match avatar {
        AvatarState::Neutral => ("(•_•)", Color::Gray),
        AvatarState::Correct => ("(^o^)", Color::Green),
        AvatarState::Incorrect => ("(×_×)", Color::Red),
    };
    Span::styled(
        format!("{face} {avatar}"),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let layout = arena_layout(area);
        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let dim_style = Style::default().add_modifier(Modifier::DIM);
        let s = self.controller.session();

        let multiplier_style = if s.time_multiplier < 1.0 {
            bold_style.fg(Color::Cyan)
        } else {
            dim_style
        };
        Paragraph::new(Line::from(vec![
            Span::styled(format!("Wave {}/{}  ", s.wave_index, s.total_waves), bold_style),
            Span::styled(
                format!("Credits {}  ", s.credits),
                bold_style.fg(Color::Yellow),
            ),
            Span::raw(format!("Hints {}  Freezes {}  ", s.hints, s.freeze_charges)),
            Span::styled(format!("Time x{:.1}  ", s.time_multiplier), multiplier_style),
            avatar_span(self.view.avatar),
        ]))
        .render(layout.header, buf);

        let block = game_block(self);
        let inner = block.inner(layout.game);
        block.render(layout.game, buf);
        screen::current_screen(s.phase).render(self, inner, buf);

        let chat_focused = self.focus == Focus::Chat;
        let border_style = if chat_focused {
            Style::default().fg(Color::Cyan)
        } else {
            dim_style
        };

        let log_height = layout.chat_log.height.saturating_sub(2) as usize;
        let lines = self
            .view
            .chat
            .iter()
            .map(|line| match line.from {
                Speaker::Player => Line::from(Span::styled(
                    format!("> {}", line.text),
                    bold_style,
                )),
                Speaker::Assistant => Line::from(line.text.as_str()),
            })
            .collect::<Vec<Line>>();
        let skip = lines.len().saturating_sub(log_height);
        Paragraph::new(lines.into_iter().skip(skip).collect::<Vec<Line>>())
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(border_style)
                    .title(" assistant "),
            )
            .render(layout.chat_log, buf);

        // keep the tail of long input visible
        let max_input = layout.chat_input.width.saturating_sub(4) as usize;
        let mut shown = self.input.as_str();
        while shown.width() > max_input && !shown.is_empty() {
            let mut chars = shown.chars();
            chars.next();
            shown = chars.as_str();
        }
        let cursor = if chat_focused { "_" } else { "" };
        Paragraph::new(format!("{shown}{cursor}"))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(border_style),
            )
            .render(layout.chat_input, buf);

        let legend = match self.focus {
            Focus::Chat => "(enter) send / (tab) back to game / (esc) back",
            Focus::Game => {
                "(1-4) answer (s)tart (h)int (y) smile (f)reeze (H/F) buy (v) pointer (tab) chat (esc)ape"
            }
        };
        Paragraph::new(Span::styled(
            legend,
            Style::default().add_modifier(Modifier::ITALIC),
        ))
        .render(layout.legend, buf);
    }
}
