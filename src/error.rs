//! Error types for the game core, question banks and the assistant.

use crate::session::{ItemKind, Phase};

/// Rejections from the game session controller. None of them are fatal:
/// the controller leaves its state untouched and reports the error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GameError {
    #[error("cannot {action} while {phase}")]
    InvalidTransition { action: &'static str, phase: Phase },
    #[error("not enough credits: need {needed}, have {available}")]
    InsufficientCredits { needed: u32, available: u32 },
    #[error("no {0} charges left")]
    NoCharges(ItemKind),
    #[error("no question is waiting for an answer")]
    NoActiveQuestion,
    #[error("the countdown is already frozen")]
    AlreadyFrozen,
    #[error("a hint scan is already in progress")]
    HintScanPending,
    #[error("no hint scan is in progress")]
    NoHintScan,
    #[error("option {index} is out of range ({count} options)")]
    OptionOutOfRange { index: usize, count: usize },
}

/// Errors from loading a question bank.
#[derive(Debug, thiserror::Error)]
pub enum BankError {
    #[error("question bank not found: {0}")]
    NotFound(String),
    #[error("failed to read question bank: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid question bank json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("question bank has no usable questions")]
    Empty,
}

/// Errors from resolving free text into a command.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AssistantError {
    #[error("message cannot be empty")]
    EmptyMessage,
    #[error("unrecognized command: {0}")]
    Unrecognized(String),
    #[error("assistant unavailable: {0}")]
    Unavailable(String),
}
