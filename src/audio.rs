use std::io::{self, Write};

use tracing::trace;

use crate::event::Cue;

/// Plays sound cues. Implementations must never block the game loop.
pub trait AudioNotifier {
    fn play(&mut self, cue: Cue);
}

/// Rings the terminal bell for the cues that signal a miss.
pub struct TerminalBell<W: Write = io::Stdout> {
    out: W,
}

impl TerminalBell<io::Stdout> {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> TerminalBell<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn rings_for(cue: Cue) -> bool {
        matches!(cue, Cue::Incorrect | Cue::TimeWarning)
    }
}

impl<W: Write> AudioNotifier for TerminalBell<W> {
    fn play(&mut self, cue: Cue) {
        trace!(%cue, "cue");
        if !Self::rings_for(cue) {
            return;
        }
        // A failed bell is not worth interrupting the game for.
        let _ = self.out.write_all(b"\x07").and_then(|_| self.out.flush());
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl AudioNotifier for Silent {
    fn play(&mut self, cue: Cue) {
        trace!(%cue, "cue (silent)");
    }
}
