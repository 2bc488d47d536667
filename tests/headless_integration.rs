use std::sync::mpsc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use wavequiz::bank::QuestionBank;
use wavequiz::config::Config;
use wavequiz::event::{Cue, GameEvent, Outcome};
use wavequiz::runtime::{ArenaEvent, FixedTicker, Runner, TestEventSource};
use wavequiz::session::Phase;
use wavequiz::{Answer, GameController};

fn controller(waves: u32, per_wave: u32, seed: u64) -> GameController {
    let config = Config {
        total_waves: waves,
        questions_per_wave: per_wave,
        ..Config::default()
    };
    GameController::seeded(config, QuestionBank::embedded().unwrap(), seed)
}

fn key(c: char) -> ArenaEvent {
    ArenaEvent::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
}

// Headless game driven through Runner + TestEventSource, no TTY needed.
// Keys start the wave; every question is left to time out on ticks.
#[test]
fn headless_wave_times_out_through_runner() {
    let mut game = controller(1, 2, 7);

    let (tx, rx) = mpsc::channel();
    let es = TestEventSource::new(rx);
    let runner = Runner::new(es, FixedTicker::new(Duration::from_millis(1)));

    tx.send(key('s')).unwrap();

    let mut timeouts = 0;
    for _ in 0..200u32 {
        match runner.step() {
            ArenaEvent::Key(k) if k.code == KeyCode::Char('s') => game.start_wave().unwrap(),
            ArenaEvent::Key(_) | ArenaEvent::Mouse(_) | ArenaEvent::Resize => {}
            // one runner tick stands for one second of game time
            ArenaEvent::Tick => game.on_tick(Duration::from_secs(1)),
        }
        timeouts += game
            .drain_events()
            .iter()
            .filter(|e| matches!(e, GameEvent::Cue(Cue::TimeWarning)))
            .count();
        if game.session().is_game_over() {
            break;
        }
    }

    assert_eq!(game.session().phase, Phase::GameOver);
    assert_eq!(timeouts, 2);
    assert_eq!(game.session().credits, 0);
}

#[test]
fn headless_perfect_game_keeps_credits() {
    let mut game = controller(2, 3, 11);

    for wave in 1..=2 {
        game.start_wave().unwrap();
        for _ in 0..3 {
            let correct = game.current_round().unwrap().correct_index;
            let reveal = game.answer(Answer::Option(correct)).unwrap();
            assert_eq!(reveal.outcome, Outcome::Correct);
            game.continue_after_reveal().unwrap();
        }
        if wave == 1 {
            assert_eq!(game.session().phase, Phase::Hub);
            assert_eq!(game.session().wave_index, 2);
        }
    }

    let events = game.drain_events();
    let summary = events
        .iter()
        .find_map(|e| match e {
            GameEvent::GameOver(s) => Some(s.clone()),
            _ => None,
        })
        .expect("game over summary");
    assert!(summary.kept_credits);
    assert_eq!(summary.accuracy_percent, 100);
    assert_eq!(summary.credits, 600);
    assert_eq!(summary.wave_results, vec![3, 3]);
    assert_eq!(game.session().credits, 600);
}

#[test]
fn headless_reveal_delay_advances_on_ticks() {
    let mut game = controller(1, 2, 3);
    game.start_wave().unwrap();
    game.answer(Answer::Option(0)).unwrap();
    assert!(game.is_revealing());

    game.on_tick(Duration::from_millis(1000));
    assert!(game.is_revealing());
    game.on_tick(Duration::from_millis(500));
    assert!(game.is_accepting_answers());
    assert_eq!(game.questions_served(), 2);
}

#[test]
fn headless_shop_between_waves() {
    let mut game = controller(2, 3, 5);
    game.start_wave().unwrap();
    for _ in 0..3 {
        let correct = game.current_round().unwrap().correct_index;
        game.answer(Answer::Option(correct)).unwrap();
        game.continue_after_reveal().unwrap();
    }
    assert_eq!(game.session().phase, Phase::Hub);

    let left = game
        .buy_item(wavequiz::session::ItemKind::Hint)
        .unwrap();
    assert_eq!(left, 0);
    assert_eq!(game.session().hints, 6);

    game.start_wave().unwrap();
    game.use_freeze().unwrap_err();
    assert!(game.session().is_wave_active());
}
