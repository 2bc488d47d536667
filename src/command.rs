//! The closed set of intents the controller accepts from outside collaborators.

use crate::session::{ItemKind, SessionSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    StartWave,
    BuyHint,
    BuyFreeze,
    UseHint,
    UseFreeze,
    CancelHint,
    ConfigureWaves(u32),
    ConfigureQuestions(u32),
    Reset,
    Status,
    Help,
}

impl Command {
    pub fn changes_configuration(&self) -> bool {
        matches!(
            self,
            Command::ConfigureWaves(_) | Command::ConfigureQuestions(_)
        )
    }
}

/// What an executed command did, for the assistant to phrase.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandResult {
    WaveStarted { wave_index: u32, total_waves: u32 },
    Bought { item: ItemKind, credits_left: u32 },
    HintScanStarted,
    HintScanCancelled,
    Frozen { charges_left: u32 },
    Configured { total_waves: u32, questions_per_wave: u32 },
    Reset { credits: u32 },
    Status(SessionSnapshot),
    Help,
}

pub const HELP_TEXT: &str = "Commands: \"waves: <n>\", \"questions: <n>\", \"start\", \"buy hint\", \"buy freeze\", \"hint\", \"freeze\", \"cancel\", \"status\", \"reset\".";
