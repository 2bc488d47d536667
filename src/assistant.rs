//! Free-text chat commands for the arena.

use rand::Rng;
use tracing::{debug, warn};

use crate::command::{Command, CommandResult, HELP_TEXT};
use crate::controller::GameController;
use crate::error::{AssistantError, GameError};
use crate::session::{ItemKind, Phase};

/// Maps a chat message onto one command.
pub trait IntentResolver {
    fn resolve(&self, text: &str) -> Result<Command, AssistantError>;
}

/// Keyword matcher. Understands English and Spanish command words.
#[derive(Debug, Default, Clone, Copy)]
pub struct RuleBasedResolver;

const WAVE_WORDS: &[&str] = &["waves", "oleadas"];
const QUESTION_WORDS: &[&str] = &["questions", "preguntas"];

impl RuleBasedResolver {
    /// `waves: 5`, `waves 5` and `waves:5` all yield `Some(Ok(5))`.
    fn count_after(text: &str, words: &[&str]) -> Option<Result<u32, AssistantError>> {
        let rest = words.iter().find_map(|w| text.strip_prefix(w))?;
        let digits = rest.trim_start_matches(|c: char| c == ':' || c.is_whitespace());
        if digits.len() == rest.len() && !rest.is_empty() {
            // "wavesx" is not a configuration command
            return None;
        }
        Some(
            digits
                .parse::<u32>()
                .map_err(|_| AssistantError::Unrecognized(text.to_string())),
        )
    }
}

impl IntentResolver for RuleBasedResolver {
    fn resolve(&self, text: &str) -> Result<Command, AssistantError> {
        let text = text.trim().to_lowercase();
        if text.is_empty() {
            return Err(AssistantError::EmptyMessage);
        }

        if let Some(n) = Self::count_after(&text, WAVE_WORDS) {
            return n.map(Command::ConfigureWaves);
        }
        if let Some(n) = Self::count_after(&text, QUESTION_WORDS) {
            return n.map(Command::ConfigureQuestions);
        }

        let command = match text.as_str() {
            "start" | "iniciar" => Command::StartWave,
            "buy hint" | "comprar pista" => Command::BuyHint,
            "buy freeze" | "comprar congelar" => Command::BuyFreeze,
            "hint" | "pista" => Command::UseHint,
            "freeze" | "congelar" => Command::UseFreeze,
            "cancel" | "cancelar" => Command::CancelHint,
            "reset" | "restart" | "reiniciar" => Command::Reset,
            "status" | "score" => Command::Status,
            "help" | "ayuda" => Command::Help,
            _ => return Err(AssistantError::Unrecognized(text)),
        };
        Ok(command)
    }
}

/// Tries `primary` and quietly falls back when it is unavailable.
pub struct FallbackResolver<P, F> {
    primary: P,
    fallback: F,
}

impl<P: IntentResolver, F: IntentResolver> FallbackResolver<P, F> {
    pub fn new(primary: P, fallback: F) -> Self {
        Self { primary, fallback }
    }
}

impl<P: IntentResolver, F: IntentResolver> IntentResolver for FallbackResolver<P, F> {
    fn resolve(&self, text: &str) -> Result<Command, AssistantError> {
        match self.primary.resolve(text) {
            Err(AssistantError::Unavailable(reason)) => {
                warn!(%reason, "primary resolver unavailable, using fallback");
                self.fallback.resolve(text)
            }
            other => other,
        }
    }
}

/// First line the assistant says in a new session.
pub fn greeting() -> &'static str {
    "Configure with \"waves: <n>\" and \"questions: <n>\". Type \"start\" when you are ready; defaults are used otherwise."
}

/// Resolves chat text and phrases the controller's answer.
pub struct Assistant<I: IntentResolver = RuleBasedResolver> {
    resolver: I,
}

impl Default for Assistant<RuleBasedResolver> {
    fn default() -> Self {
        Self::new(RuleBasedResolver)
    }
}

impl<I: IntentResolver> Assistant<I> {
    pub fn new(resolver: I) -> Self {
        Self { resolver }
    }

    pub fn handle<R: Rng>(&self, text: &str, controller: &mut GameController<R>) -> String {
        let command = match self.resolver.resolve(text) {
            Ok(command) => command,
            Err(AssistantError::EmptyMessage) => {
                return "Type a command, or \"help\" to see them all.".to_string()
            }
            Err(AssistantError::Unrecognized(text)) => {
                debug!(%text, "unrecognized chat command");
                return format!(
                    "Unrecognized command. {HELP_TEXT} Example: \"waves: 3\", then \"questions: 5\", then \"start\"."
                );
            }
            Err(err @ AssistantError::Unavailable(_)) => return err.to_string(),
        };

        match controller.execute(command) {
            Ok(result) => describe(&result),
            Err(err) => explain(command, &err),
        }
    }
}

fn describe(result: &CommandResult) -> String {
    match result {
        CommandResult::WaveStarted {
            wave_index,
            total_waves,
        } => format!("Wave {wave_index} of {total_waves} started. Good luck!"),
        CommandResult::Bought { item, credits_left } => match item {
            ItemKind::Hint => format!("Bought a hint pack. {credits_left} credits left."),
            ItemKind::Freeze => format!("Bought a freeze charge. {credits_left} credits left."),
        },
        CommandResult::HintScanStarted => "Hint scan started: smile to reveal the hint.".to_string(),
        CommandResult::HintScanCancelled => "Hint scan cancelled.".to_string(),
        CommandResult::Frozen { charges_left } => {
            format!("Time frozen for this question. {charges_left} freeze charges left.")
        }
        CommandResult::Configured {
            total_waves,
            questions_per_wave,
        } => format!(
            "Configuration set: {questions_per_wave} questions per wave, {total_waves} waves."
        ),
        CommandResult::Reset { credits } => {
            format!("Game reset. You keep your {credits} credits. Type \"start\" to play again.")
        }
        CommandResult::Status(s) => format!(
            "Wave {}/{} | credits {} | hints {} | freezes {} | correct {}",
            s.wave_index,
            s.total_waves,
            s.credits,
            s.hints,
            s.freeze_charges,
            s.total_correct_in_session
        ),
        CommandResult::Help => HELP_TEXT.to_string(),
    }
}

fn explain(command: Command, err: &GameError) -> String {
    match (command, err) {
        (cmd, GameError::InvalidTransition { phase, .. })
            if cmd.changes_configuration() && *phase == Phase::WaveActive =>
        {
            "You can't change waves or questions while a wave is running. Wait for it to finish or reset the game.".to_string()
        }
        (Command::StartWave, GameError::InvalidTransition {
            phase: Phase::WaveActive,
            ..
        }) => "A wave is already running. Finish it before starting another.".to_string(),
        (_, GameError::InvalidTransition {
            phase: Phase::GameOver,
            ..
        }) => "The game is over. Type \"reset\" to play again.".to_string(),
        (_, err) => format!("Can't do that: {err}."),
    }
}
