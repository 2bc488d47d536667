//! The game session controller: wave progression, countdown, scoring and the shop.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::bank::QuestionBank;
use crate::command::{Command, CommandResult};
use crate::config::Config;
use crate::countdown::{Cadence, Countdown, TickOutcome};
use crate::error::GameError;
use crate::event::{
    AvatarState, Cue, GameEvent, GameSummary, Outcome, QuestionView, Reveal, WaveSummary,
};
use crate::question::{shuffled, Question, Round};
use crate::session::{
    clamp_multiplier, clamp_questions, clamp_waves, ItemKind, Phase, Session, SessionSnapshot,
};
use crate::util::accuracy_percent;

/// Seconds left at which the countdown is shown as critical.
const CRITICAL_TIME: f64 = 5.0;
const LAST_SECONDS: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    Option(usize),
    Timeout,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Stage {
    NoQuestion,
    Asking,
    Revealing { remaining: Duration },
}

pub struct GameController<R: Rng = StdRng> {
    config: Config,
    session: Session,
    bank: QuestionBank,
    pool: Vec<Question>,
    rng: R,
    round: Option<Round>,
    stage: Stage,
    countdown: Countdown,
    cadence: Cadence,
    hint_scan_pending: bool,
    avatar: AvatarState,
    questions_served: u32,
    events: VecDeque<GameEvent>,
}

impl GameController<StdRng> {
    pub fn new(config: Config, bank: QuestionBank) -> Self {
        Self::with_rng(config, bank, StdRng::from_entropy())
    }

    pub fn seeded(config: Config, bank: QuestionBank, seed: u64) -> Self {
        Self::with_rng(config, bank, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> GameController<R> {
    pub fn with_rng(config: Config, bank: QuestionBank, mut rng: R) -> Self {
        let pool = shuffled(bank.questions(), &mut rng);
        let session = Session::new(&config);
        let countdown = Countdown::new(config.timing.question_time);
        let cadence = Cadence::new(config.timing.tick_interval());
        Self {
            config,
            session,
            bank,
            pool,
            rng,
            round: None,
            stage: Stage::NoQuestion,
            countdown,
            cadence,
            hint_scan_pending: false,
            avatar: AvatarState::Neutral,
            questions_served: 0,
            events: VecDeque::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::from(&self.session)
    }

    pub fn current_round(&self) -> Option<&Round> {
        self.round.as_ref()
    }

    pub fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    pub fn avatar(&self) -> AvatarState {
        self.avatar
    }

    pub fn is_accepting_answers(&self) -> bool {
        self.stage == Stage::Asking
    }

    pub fn is_revealing(&self) -> bool {
        matches!(self.stage, Stage::Revealing { .. })
    }

    pub fn hint_scan_pending(&self) -> bool {
        self.hint_scan_pending
    }

    pub fn questions_served(&self) -> u32 {
        self.questions_served
    }

    pub fn pool_len(&self) -> usize {
        self.pool.len()
    }

    /// Hand queued notifications to the collaborators.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.events.drain(..).collect()
    }

    fn emit(&mut self, event: GameEvent) {
        self.events.push_back(event);
    }

    fn reject(&mut self, err: GameError) -> GameError {
        warn!(error = %err, phase = ?self.session.phase, "operation rejected");
        self.emit(GameEvent::Notice(err.to_string()));
        err
    }

    fn invalid(&mut self, action: &'static str) -> GameError {
        let phase = self.session.phase;
        self.reject(GameError::InvalidTransition { action, phase })
    }

    fn emit_balances(&mut self) {
        self.emit(GameEvent::BalancesChanged {
            credits: self.session.credits,
            hints: self.session.hints,
            freeze_charges: self.session.freeze_charges,
        });
    }

    fn set_avatar(&mut self, state: AvatarState) {
        self.avatar = state;
        self.emit(GameEvent::Avatar(state));
    }

    fn reshuffle_pool(&mut self) {
        self.pool = shuffled(self.bank.questions(), &mut self.rng);
    }

    pub fn configure(
        &mut self,
        total_waves: u32,
        questions_per_wave: u32,
    ) -> Result<(u32, u32), GameError> {
        if matches!(self.session.phase, Phase::WaveActive | Phase::GameOver) {
            return Err(self.invalid("configure"));
        }

        let mut waves = clamp_waves(total_waves);
        if self.session.phase == Phase::Hub {
            waves = waves.max(self.session.wave_index);
        }
        let per_wave = clamp_questions(questions_per_wave);

        self.session.total_waves = waves;
        self.session.questions_per_wave = per_wave;
        self.session.total_correct_in_session = 0;
        self.reshuffle_pool();

        info!(total_waves = waves, questions_per_wave = per_wave, "game configured");
        self.emit(GameEvent::Configured {
            total_waves: waves,
            questions_per_wave: per_wave,
        });
        Ok((waves, per_wave))
    }

    pub fn configure_waves(&mut self, total_waves: u32) -> Result<(u32, u32), GameError> {
        let per_wave = self.session.questions_per_wave;
        self.configure(total_waves, per_wave)
    }

    pub fn configure_questions(&mut self, questions_per_wave: u32) -> Result<(u32, u32), GameError> {
        let waves = self.session.total_waves;
        self.configure(waves, questions_per_wave)
    }

    pub fn start_wave(&mut self) -> Result<(), GameError> {
        if matches!(self.session.phase, Phase::WaveActive | Phase::GameOver) {
            return Err(self.invalid("start a wave"));
        }

        self.session.correct_in_wave = 0;
        self.session.question_index_in_wave = 0;
        self.session.phase = Phase::WaveActive;

        info!(
            wave = self.session.wave_index,
            total = self.session.total_waves,
            "wave started"
        );
        self.emit(GameEvent::WaveStarted {
            wave_index: self.session.wave_index,
            total_waves: self.session.total_waves,
        });
        self.set_avatar(AvatarState::Neutral);
        self.serve_next_question()
    }

    pub fn serve_next_question(&mut self) -> Result<(), GameError> {
        if !self.session.is_wave_active() {
            return Err(self.invalid("serve a question"));
        }
        if self.stage == Stage::Asking {
            return Err(self.invalid("skip the open question"));
        }

        if self.session.question_index_in_wave >= self.session.questions_per_wave {
            self.end_wave();
            return Ok(());
        }

        let global = (self.session.wave_index - 1) as usize
            * self.session.questions_per_wave as usize
            + self.session.question_index_in_wave as usize;
        let question = &self.pool[global % self.pool.len()];
        let round = Round::shuffled(question, &mut self.rng);

        let view = QuestionView {
            prompt: round.question.prompt.clone(),
            category: round.question.category.clone(),
            options: round.options.clone(),
            number_in_wave: self.session.question_index_in_wave + 1,
            questions_per_wave: self.session.questions_per_wave,
            wave_index: self.session.wave_index,
            total_waves: self.session.total_waves,
            has_hint: round.question.hint.is_some(),
        };
        debug!(
            pool_index = global % self.pool.len(),
            correct_index = round.correct_index,
            "serving question"
        );

        self.round = Some(round);
        self.stage = Stage::Asking;
        self.countdown.start();
        self.cadence.reset();
        self.questions_served += 1;
        self.emit(GameEvent::QuestionServed(view));
        Ok(())
    }

    pub fn answer(&mut self, answer: Answer) -> Result<Reveal, GameError> {
        if self.stage != Stage::Asking {
            return Err(self.reject(GameError::NoActiveQuestion));
        }
        let Some(round) = self.round.take() else {
            return Err(self.reject(GameError::NoActiveQuestion));
        };
        if let Answer::Option(index) = answer {
            if index >= round.options.len() {
                let count = round.options.len();
                self.round = Some(round);
                return Err(self.reject(GameError::OptionOutOfRange { index, count }));
            }
        }

        self.countdown.stop();
        if self.hint_scan_pending {
            self.end_hint_scan();
        }

        let (outcome, selected) = match answer {
            Answer::Timeout => (Outcome::TimedOut, None),
            Answer::Option(i) if round.is_correct(i) => (Outcome::Correct, Some(i)),
            Answer::Option(i) => (Outcome::Incorrect, Some(i)),
        };

        let mut credits_awarded = 0;
        if outcome == Outcome::Correct {
            credits_awarded = self.config.economy.reward_per_correct;
            self.session.credits += credits_awarded;
            self.session.correct_in_wave += 1;
            self.session.total_correct_in_session += 1;
            self.emit(GameEvent::Cue(Cue::Correct));
            self.emit(GameEvent::Cue(Cue::Points));
            self.set_avatar(AvatarState::Correct);
            self.emit_balances();
        } else {
            self.emit(GameEvent::Cue(Cue::Incorrect));
            self.set_avatar(AvatarState::Incorrect);
        }

        let reveal = Reveal {
            outcome,
            selected,
            correct_index: round.correct_index,
            correct_text: round.correct_text().to_string(),
            explanation: round.question.explanation.clone(),
            credits_awarded,
        };
        debug!(?outcome, ?selected, "answer scored");
        self.emit(GameEvent::AnswerRevealed(reveal.clone()));

        self.session.question_index_in_wave += 1;
        let delay = self.config.timing.reveal_delay();
        if delay.is_zero() {
            self.stage = Stage::NoQuestion;
            self.serve_next_question()?;
        } else {
            self.stage = Stage::Revealing { remaining: delay };
        }
        Ok(reveal)
    }

    /// Skip whatever is left of the reveal delay.
    pub fn continue_after_reveal(&mut self) -> Result<(), GameError> {
        if !self.is_revealing() {
            return Err(GameError::NoActiveQuestion);
        }
        self.stage = Stage::NoQuestion;
        self.serve_next_question()
    }

    fn end_wave(&mut self) {
        self.countdown.stop();
        self.round = None;
        self.stage = Stage::NoQuestion;
        if self.hint_scan_pending {
            self.end_hint_scan();
        }
        self.restore_time();
        self.session.wave_results.push(self.session.correct_in_wave);

        if self.session.wave_index >= self.session.total_waves {
            self.finish_game();
            return;
        }

        let summary = WaveSummary {
            wave_index: self.session.wave_index,
            correct_in_wave: self.session.correct_in_wave,
            questions_per_wave: self.session.questions_per_wave,
            credits: self.session.credits,
            items_purchased: self.session.items_purchased,
        };
        self.session.wave_index += 1;
        self.session.phase = Phase::Hub;
        info!(
            wave = summary.wave_index,
            correct = summary.correct_in_wave,
            credits = summary.credits,
            "wave finished"
        );
        self.emit(GameEvent::WaveEnded(summary));
    }

    fn finish_game(&mut self) {
        self.session.phase = Phase::GameOver;

        let total_questions = self.session.total_questions();
        let accuracy = accuracy_percent(self.session.total_correct_in_session, total_questions);
        let kept_credits = accuracy >= self.config.economy.keep_threshold_percent;
        let credits_lost = if kept_credits {
            0
        } else {
            std::mem::take(&mut self.session.credits)
        };

        let summary = GameSummary {
            correct_in_last_wave: self.session.correct_in_wave,
            total_correct: self.session.total_correct_in_session,
            total_questions,
            accuracy_percent: accuracy,
            credits: self.session.credits,
            items_purchased: self.session.items_purchased,
            kept_credits,
            credits_lost,
            wave_results: self.session.wave_results.clone(),
        };
        self.session.question_index_in_wave = 0;

        info!(
            correct = summary.total_correct,
            total = total_questions,
            accuracy,
            kept_credits,
            credits_lost,
            "game over"
        );
        if credits_lost > 0 {
            self.emit_balances();
        }
        self.emit(GameEvent::GameOver(summary));
    }

    pub fn buy_item(&mut self, kind: ItemKind) -> Result<u32, GameError> {
        let cost = match kind {
            ItemKind::Hint => self.config.economy.hint_cost,
            ItemKind::Freeze => self.config.economy.freeze_cost,
        };
        self.buy_item_at(kind, cost)
    }

    /// Buy `kind` for an explicit price. Returns the remaining credits.
    pub fn buy_item_at(&mut self, kind: ItemKind, cost: u32) -> Result<u32, GameError> {
        if self.session.credits < cost {
            let available = self.session.credits;
            return Err(self.reject(GameError::InsufficientCredits {
                needed: cost,
                available,
            }));
        }

        self.session.credits -= cost;
        match kind {
            ItemKind::Hint => self.session.hints += self.config.economy.hint_pack_size,
            ItemKind::Freeze => {
                self.session.freeze_charges += 1;
                self.session.items_purchased += 1;
            }
        }

        info!(item = %kind, cost, credits = self.session.credits, "item purchased");
        self.emit(GameEvent::Purchased(kind));
        self.emit_balances();
        Ok(self.session.credits)
    }

    pub fn use_freeze(&mut self) -> Result<u32, GameError> {
        if self.session.freeze_charges == 0 {
            return Err(self.reject(GameError::NoCharges(ItemKind::Freeze)));
        }
        if self.stage != Stage::Asking {
            return Err(self.reject(GameError::NoActiveQuestion));
        }
        if !self.countdown.freeze() {
            return Err(self.reject(GameError::AlreadyFrozen));
        }

        self.session.freeze_charges -= 1;
        let charges_left = self.session.freeze_charges;
        debug!(charges_left, "countdown frozen");
        self.emit(GameEvent::FreezeUsed { charges_left });
        self.emit_balances();
        Ok(charges_left)
    }

    pub fn set_time_multiplier(&mut self, factor: f64) -> f64 {
        let clamped = clamp_multiplier(factor);
        if clamped != self.session.time_multiplier {
            self.session.time_multiplier = clamped;
            debug!(multiplier = clamped, "time multiplier changed");
            self.emit(GameEvent::TimeMultiplierChanged(clamped));
        }
        clamped
    }

    pub fn reset_time_multiplier(&mut self) {
        self.set_time_multiplier(1.0);
    }

    fn restore_time(&mut self) {
        self.reset_time_multiplier();
    }

    fn slow_time(&mut self) {
        if self.session.is_wave_active() {
            let factor = self.config.timing.gesture_slow_factor;
            self.set_time_multiplier(factor);
        }
    }

    /// Gesture tracking came online.
    pub fn on_gesture_session_start(&mut self) {
        self.slow_time();
    }

    /// Gesture tracking stopped: drop any pending scan and restore normal time.
    pub fn on_gesture_session_end(&mut self) {
        if self.hint_scan_pending {
            self.end_hint_scan();
        }
        self.restore_time();
    }

    pub fn activate_hint_scan(&mut self) -> Result<(), GameError> {
        if self.stage != Stage::Asking {
            return Err(self.reject(GameError::NoActiveQuestion));
        }
        if self.hint_scan_pending {
            return Err(self.reject(GameError::HintScanPending));
        }
        if self.session.hints == 0 {
            return Err(self.reject(GameError::NoCharges(ItemKind::Hint)));
        }

        self.hint_scan_pending = true;
        self.slow_time();
        debug!("hint scan started");
        self.emit(GameEvent::HintScanStarted);
        Ok(())
    }

    /// A smile while a scan is pending spends a hint and reveals it.
    /// Anything else is dropped without a notice.
    pub fn unlock_hint_gesture(&mut self) -> Result<String, GameError> {
        if !self.hint_scan_pending {
            debug!("smile ignored, no hint scan pending");
            return Err(GameError::NoHintScan);
        }

        self.session.hints = self.session.hints.saturating_sub(1);
        let text = self
            .round
            .as_ref()
            .and_then(|r| r.question.hint.clone())
            .unwrap_or_else(|| "No hint for this question.".to_string());

        self.end_hint_scan();
        self.restore_time();
        self.emit(GameEvent::HintRevealed(text.clone()));
        self.emit_balances();
        Ok(text)
    }

    pub fn cancel_hint_scan(&mut self) -> Result<(), GameError> {
        if !self.hint_scan_pending {
            return Err(self.reject(GameError::NoHintScan));
        }
        self.end_hint_scan();
        self.emit(GameEvent::Cue(Cue::Cancel));
        self.restore_time();
        Ok(())
    }

    fn end_hint_scan(&mut self) {
        self.hint_scan_pending = false;
        self.emit(GameEvent::HintScanEnded);
    }

    /// Back to the first wave. Credits and inventory survive.
    pub fn reset_game(&mut self) -> Result<(), GameError> {
        if self.session.is_wave_active() {
            return Err(self.invalid("reset the game"));
        }
        self.session.rewind();
        self.clear_question_state();
        self.reshuffle_pool();

        info!(credits = self.session.credits, "game reset");
        self.emit(GameEvent::GameReset {
            credits: self.session.credits,
        });
        self.emit(GameEvent::TimeMultiplierChanged(1.0));
        self.set_avatar(AvatarState::Neutral);
        self.emit_balances();
        Ok(())
    }

    /// Factory reset: configuration from the config file, zero credits.
    pub fn full_reset(&mut self) -> Result<(), GameError> {
        if self.session.is_wave_active() {
            return Err(self.invalid("reset the game"));
        }
        self.session = Session::new(&self.config);
        self.clear_question_state();
        self.reshuffle_pool();

        info!("game fully reset");
        self.emit(GameEvent::GameReset { credits: 0 });
        self.set_avatar(AvatarState::Neutral);
        self.emit_balances();
        Ok(())
    }

    fn clear_question_state(&mut self) {
        self.round = None;
        self.stage = Stage::NoQuestion;
        self.countdown.stop();
        self.cadence.reset();
        self.hint_scan_pending = false;
    }

    /// Feed elapsed wall time. Drives the countdown and the reveal delay.
    pub fn on_tick(&mut self, elapsed: Duration) {
        match self.stage {
            Stage::Asking => {
                let due = self.cadence.advance(elapsed);
                for _ in 0..due {
                    self.tick_countdown();
                    if self.stage != Stage::Asking {
                        break;
                    }
                }
            }
            Stage::Revealing { remaining } => {
                if elapsed >= remaining {
                    self.stage = Stage::NoQuestion;
                    if let Err(e) = self.serve_next_question() {
                        warn!(error = %e, "could not serve next question");
                    }
                } else {
                    self.stage = Stage::Revealing {
                        remaining: remaining - elapsed,
                    };
                }
            }
            Stage::NoQuestion => {}
        }
    }

    /// One countdown step.
    pub fn tick_countdown(&mut self) {
        let multiplier = self.session.time_multiplier;
        match self.countdown.tick(multiplier) {
            TickOutcome::Stopped => {}
            TickOutcome::Frozen => debug!("tick suppressed by freeze"),
            TickOutcome::Ticked {
                time_left,
                percent,
                expired,
            } => {
                let critical = time_left > 0.0 && time_left <= CRITICAL_TIME;
                self.emit(GameEvent::CountdownTick {
                    time_left,
                    percent,
                    critical,
                });
                if critical {
                    self.emit(GameEvent::Cue(Cue::TimeTick));
                }
                if time_left > 0.0 && time_left <= LAST_SECONDS {
                    self.emit(GameEvent::Cue(Cue::TimeLast));
                }
                if expired {
                    self.emit(GameEvent::Cue(Cue::TimeWarning));
                    if let Err(e) = self.answer(Answer::Timeout) {
                        warn!(error = %e, "timeout could not be scored");
                    }
                }
            }
        }
    }

    /// Run one command from the closed intent set.
    pub fn execute(&mut self, command: Command) -> Result<CommandResult, GameError> {
        debug!(?command, "executing command");
        match command {
            Command::StartWave => {
                self.start_wave()?;
                Ok(CommandResult::WaveStarted {
                    wave_index: self.session.wave_index,
                    total_waves: self.session.total_waves,
                })
            }
            Command::BuyHint => self.buy_item(ItemKind::Hint).map(|credits_left| {
                CommandResult::Bought {
                    item: ItemKind::Hint,
                    credits_left,
                }
            }),
            Command::BuyFreeze => self.buy_item(ItemKind::Freeze).map(|credits_left| {
                CommandResult::Bought {
                    item: ItemKind::Freeze,
                    credits_left,
                }
            }),
            Command::UseHint => self
                .activate_hint_scan()
                .map(|_| CommandResult::HintScanStarted),
            Command::UseFreeze => self
                .use_freeze()
                .map(|charges_left| CommandResult::Frozen { charges_left }),
            Command::CancelHint => self
                .cancel_hint_scan()
                .map(|_| CommandResult::HintScanCancelled),
            Command::ConfigureWaves(n) => {
                self.configure_waves(n)
                    .map(|(total_waves, questions_per_wave)| CommandResult::Configured {
                        total_waves,
                        questions_per_wave,
                    })
            }
            Command::ConfigureQuestions(n) => {
                self.configure_questions(n)
                    .map(|(total_waves, questions_per_wave)| CommandResult::Configured {
                        total_waves,
                        questions_per_wave,
                    })
            }
            Command::Reset => {
                self.reset_game()?;
                Ok(CommandResult::Reset {
                    credits: self.session.credits,
                })
            }
            Command::Status => Ok(CommandResult::Status(self.snapshot())),
            Command::Help => Ok(CommandResult::Help),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Timing;
    use assert_matches::assert_matches;

    fn bank() -> QuestionBank {
        QuestionBank::embedded().unwrap()
    }

    fn config(waves: u32, per_wave: u32) -> Config {
        Config {
            total_waves: waves,
            questions_per_wave: per_wave,
            ..Config::default()
        }
    }

    fn controller(waves: u32, per_wave: u32) -> GameController {
        GameController::seeded(config(waves, per_wave), bank(), 7)
    }

    fn correct_index(c: &GameController) -> usize {
        c.current_round().unwrap().correct_index
    }

    fn wrong_index(c: &GameController) -> usize {
        let round = c.current_round().unwrap();
        (round.correct_index + 1) % round.options.len()
    }

    fn answer_and_advance(c: &mut GameController, correct: bool) {
        let idx = if correct {
            correct_index(c)
        } else {
            wrong_index(c)
        };
        c.answer(Answer::Option(idx)).unwrap();
        c.on_tick(c.config().timing.reveal_delay());
    }

    /// Plays a whole game answering the first `correct` questions right.
    fn play_game(c: &mut GameController, correct: u32) {
        let mut answered = 0;
        while !c.session().is_game_over() {
            c.start_wave().unwrap();
            while c.session().is_wave_active() {
                answer_and_advance(c, answered < correct);
                answered += 1;
            }
        }
    }

    #[test]
    fn test_start_wave_serves_first_question() {
        let mut c = controller(2, 3);
        c.start_wave().unwrap();

        assert_eq!(c.session().phase, Phase::WaveActive);
        assert!(c.is_accepting_answers());
        assert_eq!(c.questions_served(), 1);
        assert_eq!(c.countdown().time_left(), 10.0);

        let events = c.drain_events();
        assert!(events
            .iter()
            .any(|e| matches!(e, GameEvent::WaveStarted { wave_index: 1, total_waves: 2 })));
        assert!(events.iter().any(|e| matches!(
            e,
            GameEvent::QuestionServed(QuestionView {
                number_in_wave: 1,
                questions_per_wave: 3,
                ..
            })
        )));
    }

    #[test]
    fn test_correct_answer_awards_credits() {
        let mut c = controller(1, 2);
        c.start_wave().unwrap();
        c.drain_events();

        let reveal = c.answer(Answer::Option(correct_index(&c))).unwrap();
        assert_eq!(reveal.outcome, Outcome::Correct);
        assert_eq!(reveal.credits_awarded, 100);
        assert_eq!(c.session().credits, 100);
        assert_eq!(c.session().correct_in_wave, 1);
        assert_eq!(c.session().total_correct_in_session, 1);
        assert_eq!(c.session().question_index_in_wave, 1);
        assert_eq!(c.avatar(), AvatarState::Correct);

        let events = c.drain_events();
        assert!(events.contains(&GameEvent::Cue(Cue::Correct)));
        assert!(events.contains(&GameEvent::Avatar(AvatarState::Correct)));
    }

    #[test]
    fn test_incorrect_answer_reveals_correct_text() {
        let mut c = controller(1, 2);
        c.start_wave().unwrap();
        let expected = c.current_round().unwrap().correct_text().to_string();
        c.drain_events();

        let reveal = c.answer(Answer::Option(wrong_index(&c))).unwrap();
        assert_eq!(reveal.outcome, Outcome::Incorrect);
        assert_eq!(reveal.correct_text, expected);
        assert_eq!(c.session().credits, 0);
        assert_eq!(c.avatar(), AvatarState::Incorrect);
        assert!(c.drain_events().contains(&GameEvent::Cue(Cue::Incorrect)));
    }

    #[test]
    fn test_answers_rejected_while_revealing() {
        let mut c = controller(1, 2);
        c.start_wave().unwrap();
        c.answer(Answer::Option(0)).unwrap();
        assert!(c.is_revealing());
        assert_matches!(c.answer(Answer::Option(0)), Err(GameError::NoActiveQuestion));
        assert_eq!(c.session().question_index_in_wave, 1);
    }

    #[test]
    fn test_out_of_range_option_is_rejected_without_scoring() {
        let mut c = controller(1, 2);
        c.start_wave().unwrap();
        assert_matches!(
            c.answer(Answer::Option(9)),
            Err(GameError::OptionOutOfRange { index: 9, count: 4 })
        );
        assert!(c.is_accepting_answers());
        assert_eq!(c.session().question_index_in_wave, 0);
    }

    #[test]
    fn test_reveal_delay_then_next_question() {
        let mut c = controller(1, 2);
        c.start_wave().unwrap();
        c.answer(Answer::Option(0)).unwrap();

        c.on_tick(Duration::from_millis(1000));
        assert!(c.is_revealing());
        assert_eq!(c.questions_served(), 1);

        c.on_tick(Duration::from_millis(500));
        assert!(c.is_accepting_answers());
        assert_eq!(c.questions_served(), 2);
    }

    #[test]
    fn test_zero_reveal_delay_serves_immediately() {
        let cfg = Config {
            timing: Timing {
                reveal_delay_ms: 0,
                ..Timing::default()
            },
            ..config(1, 2)
        };
        let mut c = GameController::seeded(cfg, bank(), 1);
        c.start_wave().unwrap();
        c.answer(Answer::Option(0)).unwrap();
        assert!(c.is_accepting_answers());
        assert_eq!(c.questions_served(), 2);
    }

    #[test]
    fn test_wave_end_goes_to_hub() {
        let mut c = controller(2, 2);
        c.start_wave().unwrap();
        answer_and_advance(&mut c, true);
        answer_and_advance(&mut c, false);

        assert_eq!(c.session().phase, Phase::Hub);
        assert_eq!(c.session().wave_index, 2);
        assert!(!c.session().is_wave_active());
        assert!(!c.session().is_game_over());
        assert_eq!(c.session().wave_results, vec![1]);

        let events = c.drain_events();
        assert!(events.iter().any(|e| matches!(
            e,
            GameEvent::WaveEnded(WaveSummary {
                wave_index: 1,
                correct_in_wave: 1,
                ..
            })
        )));
    }

    #[test]
    fn test_full_game_serves_waves_times_questions() {
        for (waves, per_wave) in [(1, 1), (2, 3), (3, 2), (4, 5)] {
            let mut c = controller(waves, per_wave);
            play_game(&mut c, 0);
            assert_eq!(c.questions_served(), waves * per_wave);
            assert!(c.session().is_game_over());
        }
    }

    #[test]
    fn test_low_accuracy_forfeits_credits() {
        let mut c = controller(2, 3);
        play_game(&mut c, 4);

        let summary = c
            .drain_events()
            .into_iter()
            .find_map(|e| match e {
                GameEvent::GameOver(s) => Some(s),
                _ => None,
            })
            .unwrap();
        assert_eq!(summary.accuracy_percent, 67);
        assert!(!summary.kept_credits);
        assert_eq!(summary.credits_lost, 400);
        assert_eq!(c.session().credits, 0);
    }

    #[test]
    fn test_high_accuracy_keeps_credits() {
        let mut c = controller(3, 2);
        play_game(&mut c, 5);

        assert_eq!(c.session().credits, 500);
        let summary = c
            .drain_events()
            .into_iter()
            .find_map(|e| match e {
                GameEvent::GameOver(s) => Some(s),
                _ => None,
            })
            .unwrap();
        assert_eq!(summary.accuracy_percent, 83);
        assert!(summary.kept_credits);
        assert_eq!(summary.credits_lost, 0);
        assert_eq!(summary.wave_results, vec![2, 2, 1]);
    }

    #[test]
    fn test_exactly_seventy_percent_keeps_credits() {
        let mut c = controller(1, 10);
        play_game(&mut c, 7);
        assert_eq!(c.session().credits, 700);
    }

    #[test]
    fn test_game_over_blocks_new_waves() {
        let mut c = controller(1, 1);
        play_game(&mut c, 1);
        assert_matches!(
            c.start_wave(),
            Err(GameError::InvalidTransition {
                phase: Phase::GameOver,
                ..
            })
        );
        assert_matches!(c.serve_next_question(), Err(GameError::InvalidTransition { .. }));
        assert_eq!(c.questions_served(), 1);
    }

    #[test]
    fn test_start_wave_twice_is_rejected() {
        let mut c = controller(2, 2);
        c.start_wave().unwrap();
        assert_matches!(c.start_wave(), Err(GameError::InvalidTransition { .. }));
        assert_eq!(c.questions_served(), 1);
    }

    #[test]
    fn test_configure_clamps() {
        let mut c = controller(3, 3);
        assert_eq!(c.configure(0, 0).unwrap(), (1, 1));
        assert_eq!(c.configure(80, 500).unwrap(), (50, 100));
        assert_eq!(c.configure_waves(4).unwrap(), (4, 100));
        assert_eq!(c.configure_questions(6).unwrap(), (4, 6));
    }

    #[test]
    fn test_configure_during_wave_is_noop() {
        let mut c = controller(3, 3);
        c.start_wave().unwrap();
        c.drain_events();

        assert_matches!(c.configure(5, 5), Err(GameError::InvalidTransition { .. }));
        assert_eq!(c.session().total_waves, 3);
        assert_eq!(c.session().questions_per_wave, 3);
        let events = c.drain_events();
        assert!(matches!(events.as_slice(), [GameEvent::Notice(_)]));
    }

    #[test]
    fn test_configure_in_hub_cannot_drop_below_current_wave() {
        let mut c = controller(3, 1);
        c.start_wave().unwrap();
        answer_and_advance(&mut c, true);
        assert_eq!(c.session().phase, Phase::Hub);
        assert_eq!(c.session().wave_index, 2);

        assert_eq!(c.configure_waves(1).unwrap(), (2, 1));
        assert_eq!(c.session().total_correct_in_session, 0);
    }

    #[test]
    fn test_buy_hint_without_funds() {
        let mut c = controller(1, 1);
        c.session.credits = 250;
        assert_matches!(
            c.buy_item_at(ItemKind::Hint, 300),
            Err(GameError::InsufficientCredits {
                needed: 300,
                available: 250
            })
        );
        assert_eq!(c.session().credits, 250);
        assert_eq!(c.session().hints, 3);
    }

    #[test]
    fn test_buy_hint_with_exact_funds() {
        let mut c = controller(1, 1);
        c.session.credits = 300;
        assert_eq!(c.buy_item_at(ItemKind::Hint, 300).unwrap(), 0);
        assert_eq!(c.session().credits, 0);
        assert_eq!(c.session().hints, 6);
        assert_eq!(c.session().items_purchased, 0);
    }

    #[test]
    fn test_buy_freeze_uses_configured_price() {
        let mut c = controller(1, 1);
        c.session.credits = 700;
        assert_eq!(c.buy_item(ItemKind::Freeze).unwrap(), 200);
        assert_eq!(c.session().freeze_charges, 1);
        assert_eq!(c.session().items_purchased, 1);
        assert_matches!(
            c.buy_item(ItemKind::Freeze),
            Err(GameError::InsufficientCredits { .. })
        );
    }

    #[test]
    fn test_countdown_timeout_answers_exactly_once() {
        let mut c = controller(1, 2);
        c.start_wave().unwrap();
        c.drain_events();

        for _ in 0..10 {
            c.on_tick(Duration::from_secs(1));
        }
        assert!(c.is_revealing());
        assert_eq!(c.session().credits, 0);
        assert_eq!(c.session().question_index_in_wave, 1);

        let events = c.drain_events();
        let reveals = events
            .iter()
            .filter(|e| matches!(e, GameEvent::AnswerRevealed(_)))
            .count();
        assert_eq!(reveals, 1);
        assert!(events.contains(&GameEvent::Cue(Cue::TimeWarning)));
        assert!(events.iter().any(|e| matches!(
            e,
            GameEvent::AnswerRevealed(Reveal {
                outcome: Outcome::TimedOut,
                selected: None,
                ..
            })
        )));

        // Extra ticks while revealing do not score anything further.
        c.tick_countdown();
        c.tick_countdown();
        assert_eq!(c.session().question_index_in_wave, 1);
    }

    #[test]
    fn test_countdown_critical_cues() {
        let mut c = controller(1, 1);
        c.start_wave().unwrap();
        for _ in 0..4 {
            c.tick_countdown();
        }
        assert!(!c.drain_events().contains(&GameEvent::Cue(Cue::TimeTick)));

        c.tick_countdown();
        let events = c.drain_events();
        assert!(events.contains(&GameEvent::Cue(Cue::TimeTick)));
        assert!(events.iter().any(|e| matches!(
            e,
            GameEvent::CountdownTick {
                critical: true,
                ..
            }
        )));
        assert!(!events.contains(&GameEvent::Cue(Cue::TimeLast)));

        c.tick_countdown();
        c.tick_countdown();
        assert!(c.drain_events().contains(&GameEvent::Cue(Cue::TimeLast)));
    }

    #[test]
    fn test_use_freeze_without_charges_is_noop() {
        let mut c = controller(1, 1);
        c.start_wave().unwrap();
        c.tick_countdown();
        assert_matches!(c.use_freeze(), Err(GameError::NoCharges(ItemKind::Freeze)));
        c.tick_countdown();
        assert_eq!(c.countdown().time_left(), 8.0);
    }

    #[test]
    fn test_use_freeze_suppresses_ticks() {
        let mut c = controller(1, 2);
        c.session.freeze_charges = 1;
        c.start_wave().unwrap();
        c.tick_countdown();

        assert_eq!(c.use_freeze().unwrap(), 0);
        assert_eq!(c.session().freeze_charges, 0);
        let before = c.countdown().time_left();
        c.tick_countdown();
        assert_eq!(c.countdown().time_left(), before);

        // Next question starts unfrozen.
        answer_and_advance(&mut c, true);
        c.tick_countdown();
        assert_eq!(c.countdown().time_left(), 9.0);
    }

    #[test]
    fn test_use_freeze_twice_on_one_question() {
        let mut c = controller(1, 1);
        c.session.freeze_charges = 2;
        c.start_wave().unwrap();
        c.use_freeze().unwrap();
        assert_matches!(c.use_freeze(), Err(GameError::AlreadyFrozen));
        assert_eq!(c.session().freeze_charges, 1);
    }

    #[test]
    fn test_use_freeze_outside_question() {
        let mut c = controller(1, 1);
        c.session.freeze_charges = 1;
        assert_matches!(c.use_freeze(), Err(GameError::NoActiveQuestion));
        assert_eq!(c.session().freeze_charges, 1);
    }

    #[test]
    fn test_time_multiplier_clamps_and_slows_countdown() {
        let mut c = controller(1, 1);
        assert_eq!(c.set_time_multiplier(0.05), 0.2);
        assert_eq!(c.set_time_multiplier(9.0), 2.0);
        c.reset_time_multiplier();
        assert_eq!(c.session().time_multiplier, 1.0);

        c.start_wave().unwrap();
        c.set_time_multiplier(0.5);
        c.tick_countdown();
        assert_eq!(c.countdown().time_left(), 9.5);
    }

    #[test]
    fn test_gesture_session_slows_only_during_wave() {
        let mut c = controller(1, 2);
        c.on_gesture_session_start();
        assert_eq!(c.session().time_multiplier, 1.0);

        c.start_wave().unwrap();
        c.on_gesture_session_start();
        assert_eq!(c.session().time_multiplier, 0.6);

        c.on_gesture_session_end();
        assert_eq!(c.session().time_multiplier, 1.0);
    }

    #[test]
    fn test_hint_scan_unlock_spends_a_hint() {
        let mut c = controller(1, 1);
        c.start_wave().unwrap();
        let hint = c.current_round().unwrap().question.hint.clone().unwrap();

        c.activate_hint_scan().unwrap();
        assert!(c.hint_scan_pending());
        assert_eq!(c.session().hints, 3);
        assert_eq!(c.session().time_multiplier, 0.6);

        assert_eq!(c.unlock_hint_gesture().unwrap(), hint);
        assert!(!c.hint_scan_pending());
        assert_eq!(c.session().hints, 2);
        assert_eq!(c.session().time_multiplier, 1.0);
        assert!(c.drain_events().contains(&GameEvent::HintRevealed(hint)));
    }

    #[test]
    fn test_smile_without_scan_is_ignored_quietly() {
        let mut c = controller(1, 1);
        c.start_wave().unwrap();
        c.drain_events();
        assert_matches!(c.unlock_hint_gesture(), Err(GameError::NoHintScan));
        assert_eq!(c.session().hints, 3);
        assert!(c.drain_events().is_empty());
    }

    #[test]
    fn test_hint_scan_requires_hints_and_question() {
        let mut c = controller(1, 1);
        assert_matches!(c.activate_hint_scan(), Err(GameError::NoActiveQuestion));

        c.session.hints = 0;
        c.start_wave().unwrap();
        assert_matches!(
            c.activate_hint_scan(),
            Err(GameError::NoCharges(ItemKind::Hint))
        );
        assert!(!c.hint_scan_pending());
    }

    #[test]
    fn test_cancel_hint_scan_restores_time() {
        let mut c = controller(1, 1);
        c.start_wave().unwrap();
        c.activate_hint_scan().unwrap();
        assert_matches!(c.activate_hint_scan(), Err(GameError::HintScanPending));

        c.cancel_hint_scan().unwrap();
        assert!(!c.hint_scan_pending());
        assert_eq!(c.session().hints, 3);
        assert_eq!(c.session().time_multiplier, 1.0);
        assert!(c.drain_events().contains(&GameEvent::Cue(Cue::Cancel)));
        assert_matches!(c.cancel_hint_scan(), Err(GameError::NoHintScan));
    }

    #[test]
    fn test_answering_cancels_pending_scan() {
        let mut c = controller(1, 2);
        c.start_wave().unwrap();
        c.activate_hint_scan().unwrap();
        c.answer(Answer::Option(0)).unwrap();
        assert!(!c.hint_scan_pending());
        assert_matches!(c.unlock_hint_gesture(), Err(GameError::NoHintScan));
        assert_eq!(c.session().hints, 3);
    }

    #[test]
    fn test_reset_game_keeps_credits() {
        let mut c = controller(1, 1);
        c.session.freeze_charges = 1;
        play_game(&mut c, 1);
        assert_eq!(c.session().credits, 100);

        c.reset_game().unwrap();
        let s = c.session();
        assert_eq!(s.phase, Phase::Idle);
        assert_eq!(s.credits, 100);
        assert_eq!(s.freeze_charges, 1);
        assert_eq!(s.wave_index, 1);
        assert_eq!(s.total_correct_in_session, 0);

        c.start_wave().unwrap();
        assert!(c.session().is_wave_active());
    }

    #[test]
    fn test_full_reset_zeroes_credits() {
        let mut c = controller(1, 1);
        play_game(&mut c, 1);
        c.configure(9, 9).unwrap_err();

        c.full_reset().unwrap();
        assert_eq!(c.session().credits, 0);
        assert_eq!(c.session().hints, 3);
        assert_eq!(c.session().phase, Phase::Idle);
        assert_eq!(c.configure(9, 9).unwrap(), (9, 9));
    }

    #[test]
    fn test_reset_rejected_during_wave() {
        let mut c = controller(1, 2);
        c.start_wave().unwrap();
        assert_matches!(c.reset_game(), Err(GameError::InvalidTransition { .. }));
        assert_matches!(c.full_reset(), Err(GameError::InvalidTransition { .. }));
        assert!(c.session().is_wave_active());
    }

    #[test]
    fn test_question_order_follows_global_index() {
        let mut c = controller(2, 2);
        let pool: Vec<String> = c.pool.iter().map(|q| q.prompt.clone()).collect();

        let mut seen = Vec::new();
        while !c.session().is_game_over() {
            c.start_wave().unwrap();
            while c.session().is_wave_active() {
                seen.push(c.current_round().unwrap().question.prompt.clone());
                answer_and_advance(&mut c, true);
            }
        }
        assert_eq!(seen, pool[..4].to_vec());
    }

    #[test]
    fn test_pool_wraps_around() {
        let small = QuestionBank::from_json_str(
            r#"[
                { "prompt": "a", "category": "c", "options": ["1", "2"], "answer": 0 },
                { "prompt": "b", "category": "c", "options": ["1", "2"], "answer": 1 }
            ]"#,
        )
        .unwrap();
        let mut c = GameController::seeded(config(1, 5), small, 3);
        play_game(&mut c, 5);
        assert_eq!(c.questions_served(), 5);
        assert_eq!(c.session().credits, 500);
    }

    #[test]
    fn test_execute_commands() {
        let mut c = controller(2, 2);
        assert_eq!(
            c.execute(Command::ConfigureWaves(4)).unwrap(),
            CommandResult::Configured {
                total_waves: 4,
                questions_per_wave: 2
            }
        );
        assert_matches!(
            c.execute(Command::BuyHint),
            Err(GameError::InsufficientCredits { .. })
        );
        assert_eq!(
            c.execute(Command::StartWave).unwrap(),
            CommandResult::WaveStarted {
                wave_index: 1,
                total_waves: 4
            }
        );
        assert_matches!(
            c.execute(Command::ConfigureQuestions(9)),
            Err(GameError::InvalidTransition { .. })
        );
        assert_eq!(c.execute(Command::UseHint).unwrap(), CommandResult::HintScanStarted);
        assert_eq!(
            c.execute(Command::CancelHint).unwrap(),
            CommandResult::HintScanCancelled
        );
        assert_matches!(
            c.execute(Command::Status).unwrap(),
            CommandResult::Status(SessionSnapshot { total_waves: 4, .. })
        );
    }
}
