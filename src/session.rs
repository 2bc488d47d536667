use serde::Serialize;

use crate::config::Config;

pub const MAX_WAVES: u32 = 50;
pub const MAX_QUESTIONS_PER_WAVE: u32 = 100;
pub const MIN_TIME_MULTIPLIER: f64 = 0.2;
pub const MAX_TIME_MULTIPLIER: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum_macros::Display)]
pub enum Phase {
    #[strum(serialize = "waiting to start")]
    Idle,
    #[strum(serialize = "a wave is active")]
    WaveActive,
    #[strum(serialize = "in the hub")]
    Hub,
    #[strum(serialize = "the game is over")]
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum ItemKind {
    Hint,
    Freeze,
}

/// Live game state. Only the controller mutates it.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub credits: u32,
    pub hints: u32,
    pub freeze_charges: u32,
    pub items_purchased: u32,
    pub wave_index: u32,
    pub total_waves: u32,
    pub questions_per_wave: u32,
    pub question_index_in_wave: u32,
    pub correct_in_wave: u32,
    pub total_correct_in_session: u32,
    pub phase: Phase,
    pub time_multiplier: f64,
    /// Correct answers of each finished wave, in order.
    pub wave_results: Vec<u32>,
}

impl Session {
    pub fn new(config: &Config) -> Self {
        Self {
            credits: 0,
            hints: config.starting_hints,
            freeze_charges: 0,
            items_purchased: 0,
            wave_index: 1,
            total_waves: clamp_waves(config.total_waves),
            questions_per_wave: clamp_questions(config.questions_per_wave),
            question_index_in_wave: 0,
            correct_in_wave: 0,
            total_correct_in_session: 0,
            phase: Phase::Idle,
            time_multiplier: 1.0,
            wave_results: Vec::new(),
        }
    }

    pub fn is_wave_active(&self) -> bool {
        self.phase == Phase::WaveActive
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == Phase::GameOver
    }

    pub fn total_questions(&self) -> u32 {
        self.total_waves * self.questions_per_wave
    }

    /// Back to the first wave, keeping credits, inventory and configuration.
    pub fn rewind(&mut self) {
        self.wave_index = 1;
        self.question_index_in_wave = 0;
        self.correct_in_wave = 0;
        self.total_correct_in_session = 0;
        self.phase = Phase::Idle;
        self.time_multiplier = 1.0;
        self.wave_results.clear();
    }
}

pub fn clamp_waves(n: u32) -> u32 {
    n.clamp(1, MAX_WAVES)
}

pub fn clamp_questions(n: u32) -> u32 {
    n.clamp(1, MAX_QUESTIONS_PER_WAVE)
}

pub fn clamp_multiplier(factor: f64) -> f64 {
    if factor.is_nan() {
        return 1.0;
    }
    factor.clamp(MIN_TIME_MULTIPLIER, MAX_TIME_MULTIPLIER)
}

/// Read-only copy of the session handed to presenters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub credits: u32,
    pub hints: u32,
    pub freeze_charges: u32,
    pub items_purchased: u32,
    pub wave_index: u32,
    pub total_waves: u32,
    pub questions_per_wave: u32,
    pub question_index_in_wave: u32,
    pub correct_in_wave: u32,
    pub total_correct_in_session: u32,
    pub phase: Phase,
    pub time_multiplier: f64,
    pub wave_results: Vec<u32>,
}

impl From<&Session> for SessionSnapshot {
    fn from(s: &Session) -> Self {
        Self {
            credits: s.credits,
            hints: s.hints,
            freeze_charges: s.freeze_charges,
            items_purchased: s.items_purchased,
            wave_index: s.wave_index,
            total_waves: s.total_waves,
            questions_per_wave: s.questions_per_wave,
            question_index_in_wave: s.question_index_in_wave,
            correct_in_wave: s.correct_in_wave,
            total_correct_in_session: s.total_correct_in_session,
            phase: s.phase,
            time_multiplier: s.time_multiplier,
            wave_results: s.wave_results.clone(),
        }
    }
}
