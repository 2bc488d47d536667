// Library surface for the arena binary, the duo REPL and headless tests.
// Terminal rendering lives in the binary.
pub mod app_dirs;
pub mod assistant;
pub mod audio;
pub mod bank;
pub mod command;
pub mod config;
pub mod controller;
pub mod countdown;
pub mod duo;
pub mod error;
pub mod event;
pub mod gesture;
pub mod logging;
pub mod pointer;
pub mod question;
pub mod runtime;
pub mod session;
pub mod util;

pub use controller::{Answer, GameController};
pub use error::GameError;
pub use event::GameEvent;
