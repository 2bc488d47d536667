//! Notifications published by the controller for presenters and the audio notifier.

use crate::session::ItemKind;

/// Short sound cues tied to state transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "snake_case")]
pub enum Cue {
    Click,
    Correct,
    Incorrect,
    Points,
    TimeTick,
    TimeLast,
    TimeWarning,
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum AvatarState {
    #[default]
    Neutral,
    Correct,
    Incorrect,
}

/// Everything a presenter needs to draw a freshly served question.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionView {
    pub prompt: String,
    pub category: String,
    pub options: Vec<String>,
    pub number_in_wave: u32,
    pub questions_per_wave: u32,
    pub wave_index: u32,
    pub total_waves: u32,
    pub has_hint: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Correct,
    Incorrect,
    TimedOut,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reveal {
    pub outcome: Outcome,
    pub selected: Option<usize>,
    pub correct_index: usize,
    pub correct_text: String,
    pub explanation: Option<String>,
    pub credits_awarded: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WaveSummary {
    pub wave_index: u32,
    pub correct_in_wave: u32,
    pub questions_per_wave: u32,
    pub credits: u32,
    pub items_purchased: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GameSummary {
    pub correct_in_last_wave: u32,
    pub total_correct: u32,
    pub total_questions: u32,
    pub accuracy_percent: u32,
    pub credits: u32,
    pub items_purchased: u32,
    /// Whether the keep rule let the player hold on to their credits.
    pub kept_credits: bool,
    pub credits_lost: u32,
    pub wave_results: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    Configured {
        total_waves: u32,
        questions_per_wave: u32,
    },
    WaveStarted {
        wave_index: u32,
        total_waves: u32,
    },
    QuestionServed(QuestionView),
    CountdownTick {
        time_left: f64,
        percent: f64,
        critical: bool,
    },
    AnswerRevealed(Reveal),
    HintScanStarted,
    HintScanEnded,
    HintRevealed(String),
    FreezeUsed {
        charges_left: u32,
    },
    Purchased(ItemKind),
    BalancesChanged {
        credits: u32,
        hints: u32,
        freeze_charges: u32,
    },
    TimeMultiplierChanged(f64),
    WaveEnded(WaveSummary),
    GameOver(GameSummary),
    GameReset {
        credits: u32,
    },
    Avatar(AvatarState),
    Cue(Cue),
    Notice(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_avatar_names() {
        assert_eq!(AvatarState::default(), AvatarState::Neutral);
        assert_eq!(AvatarState::Neutral.to_string(), "neutral");
        assert_eq!(AvatarState::Correct.to_string(), "correct");
        assert_eq!(AvatarState::Incorrect.to_string(), "incorrect");
    }

    #[test]
    fn test_cue_names() {
        assert_eq!(Cue::TimeWarning.to_string(), "time_warning");
        assert_eq!(Cue::Points.to_string(), "points");
    }
}
