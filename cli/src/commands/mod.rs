//! CLI Commands

pub mod config;
pub mod platform;
pub mod submit;

use std::fmt;

/// Command failure and the exit code it maps to
#[derive(Debug)]
pub enum CommandError {
    /// Form did not pass validation
    Invalid(String),
    /// Anything else
    Failed(String),
}

impl CommandError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CommandError::Invalid(_) => 2,
            CommandError::Failed(_) => 1,
        }
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::Invalid(msg) | CommandError::Failed(msg) => f.write_str(msg),
        }
    }
}

impl From<String> for CommandError {
    fn from(msg: String) -> Self {
        CommandError::Failed(msg)
    }
}

pub type CommandResult = Result<(), CommandError>;
