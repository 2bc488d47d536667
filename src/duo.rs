//! DuoTrivia: a single-question chat bot with a running score.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use std::fmt;
use std::io::{self, BufRead, Write};
use tracing::{debug, warn};

use crate::bank::embedded_str;
use crate::error::BankError;
use crate::util::accuracy_percent;

pub const POINTS_PER_CORRECT: u32 = 100;

/// A card ready to be shown. Malformed source entries become placeholder cards.
#[derive(Debug, Clone, PartialEq)]
pub struct DuoCard {
    pub question: String,
    pub category: String,
    pub difficulty: String,
    pub options: Vec<String>,
    pub correct_index: usize,
    pub explanation: Option<String>,
}

impl DuoCard {
    fn placeholder() -> Self {
        Self {
            question: "This question is malformed (check the question file)".to_string(),
            category: "Error".to_string(),
            difficulty: "Error".to_string(),
            options: vec!["Error".to_string()],
            correct_index: 0,
            explanation: None,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.category == "Error"
    }

    pub fn correct_text(&self) -> &str {
        self.options
            .get(self.correct_index)
            .map(String::as_str)
            .unwrap_or("N/A")
    }
}

impl fmt::Display for DuoCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[{}] {}", self.category, self.question)?;
        for (i, option) in self.options.iter().enumerate() {
            writeln!(f, "  {}) {}", i + 1, option)?;
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct DuoFile {
    questions: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct RawCard {
    question: String,
    options: Vec<String>,
    correct_answer: i64,
    category: Option<String>,
    difficulty: Option<String>,
    explanation: Option<String>,
}

impl RawCard {
    fn into_card(self) -> Option<DuoCard> {
        let correct_index = usize::try_from(self.correct_answer).ok()?;
        if correct_index >= self.options.len() {
            return None;
        }
        Some(DuoCard {
            question: self.question,
            category: self.category.unwrap_or_else(|| "General".to_string()),
            difficulty: self.difficulty.unwrap_or_else(|| "Normal".to_string()),
            options: self.options,
            correct_index,
            explanation: self.explanation,
        })
    }
}

#[derive(Debug, Clone)]
pub struct DuoDeck {
    cards: Vec<DuoCard>,
}

impl DuoDeck {
    pub fn embedded() -> Result<Self, BankError> {
        Self::from_json_str(embedded_str("duo.json")?)
    }

    pub fn from_json_str(data: &str) -> Result<Self, BankError> {
        let file: DuoFile = serde_json::from_str(data)?;
        if file.questions.is_empty() {
            return Err(BankError::Empty);
        }
        let cards = file
            .questions
            .into_iter()
            .enumerate()
            .map(|(idx, value)| {
                serde_json::from_value::<RawCard>(value)
                    .ok()
                    .and_then(RawCard::into_card)
                    .unwrap_or_else(|| {
                        warn!(index = idx, "malformed duo question, using placeholder");
                        DuoCard::placeholder()
                    })
            })
            .collect();
        Ok(Self { cards })
    }

    pub fn cards(&self) -> &[DuoCard] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DuoReply {
    Text(String),
    Card(DuoCard),
}

impl fmt::Display for DuoReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DuoReply::Text(text) => writeln!(f, "{text}"),
            DuoReply::Card(card) => write!(f, "{card}"),
        }
    }
}

fn text(s: impl Into<String>) -> DuoReply {
    DuoReply::Text(s.into())
}

pub struct DuoBot<R: Rng = StdRng> {
    deck: DuoDeck,
    rng: R,
    pub score: u32,
    pub streak: u32,
    pub total: u32,
    pub correct_total: u32,
    current: Option<DuoCard>,
    accuracy_series: Vec<u32>,
}

impl DuoBot<StdRng> {
    pub fn new(deck: DuoDeck) -> Self {
        Self::with_rng(deck, StdRng::from_entropy())
    }

    pub fn seeded(deck: DuoDeck, seed: u64) -> Self {
        Self::with_rng(deck, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> DuoBot<R> {
    pub fn with_rng(deck: DuoDeck, rng: R) -> Self {
        Self {
            deck,
            rng,
            score: 0,
            streak: 0,
            total: 0,
            correct_total: 0,
            current: None,
            accuracy_series: Vec::new(),
        }
    }

    pub fn is_waiting_for_answer(&self) -> bool {
        self.current.is_some()
    }

    pub fn current(&self) -> Option<&DuoCard> {
        self.current.as_ref()
    }

    /// Running accuracy after each answered question.
    pub fn accuracy_series(&self) -> &[u32] {
        &self.accuracy_series
    }

    pub fn accuracy(&self) -> u32 {
        accuracy_percent(self.correct_total, self.total)
    }

    pub fn stats_line(&self) -> String {
        format!(
            "Score: {} | Streak: {} | Questions: {} | Accuracy: {}%",
            self.score,
            self.streak,
            self.total,
            self.accuracy()
        )
    }

    pub fn process_message(&mut self, message: &str) -> DuoReply {
        let t = message.trim().to_lowercase();
        if t.is_empty() {
            return text("Could you type something?");
        }

        if self.is_waiting_for_answer() {
            if t == "cancel" {
                self.current = None;
                return text("Question cancelled. Type \"play\" for another one.");
            }
            return text("Pick one of the card's options or type \"cancel\" to abort.");
        }

        match t.as_str() {
            "help" | "ayuda" => text(
                "Commands: \"play\" for a new question, \"score\" for your stats. Answer with the option number.",
            ),
            "score" | "puntaje" => text(self.stats_line()),
            "play" | "jugar" | "question" | "pregunta" => self.deal(),
            "cancel" => text("There is no active question to cancel."),
            _ => text("I don't recognize that command. Type \"help\" to see the options."),
        }
    }

    fn deal(&mut self) -> DuoReply {
        let Some(card) = self.deck.cards().choose(&mut self.rng).cloned() else {
            return text("I couldn't get a question right now. Try again.");
        };
        debug!(question = %card.question, "dealt duo card");
        self.current = Some(card.clone());
        DuoReply::Card(card)
    }

    pub fn handle_answer(&mut self, index: usize) -> DuoReply {
        let Some(card) = self.current.take() else {
            return text("No active question. Type \"play\" to start.");
        };

        let correct = index == card.correct_index;
        self.total += 1;
        if correct {
            self.score += POINTS_PER_CORRECT;
            self.streak += 1;
            self.correct_total += 1;
        } else {
            self.streak = 0;
        }
        self.accuracy_series.push(self.accuracy());

        let stats = self.stats_line();
        if correct {
            text(format!("Correct: +{POINTS_PER_CORRECT} points. {stats}"))
        } else {
            let extra = card
                .explanation
                .as_deref()
                .map(|e| format!(" ({e})"))
                .unwrap_or_default();
            text(format!(
                "Incorrect. It was \"{}\"{extra}. {stats}",
                card.correct_text()
            ))
        }
    }
}

/// Line-oriented chat loop. A number answers the open card; `quit` ends the session.
pub fn run_repl<R: Rng, I: BufRead, W: Write>(
    bot: &mut DuoBot<R>,
    input: I,
    mut output: W,
) -> io::Result<()> {
    writeln!(
        output,
        "DuoTrivia ready. Type \"play\" for a question, \"help\" for commands, \"quit\" to leave."
    )?;

    for line in input.lines() {
        let line = line?;
        let trimmed = line.trim();
        if matches!(trimmed, "quit" | "exit" | "salir") {
            break;
        }

        let reply = match (bot.is_waiting_for_answer(), trimmed.parse::<usize>()) {
            (true, Ok(n)) if n >= 1 => bot.handle_answer(n - 1),
            _ => bot.process_message(trimmed),
        };
        write!(output, "{reply}")?;
        output.flush()?;
    }

    writeln!(output, "Final stats: {}", bot.stats_line())?;
    if !bot.accuracy_series().is_empty() {
        let trend = bot
            .accuracy_series()
            .iter()
            .map(|p| format!("{p}%"))
            .collect::<Vec<String>>()
            .join(" ");
        writeln!(output, "Accuracy trend: {trend}")?;
    }
    Ok(())
}
