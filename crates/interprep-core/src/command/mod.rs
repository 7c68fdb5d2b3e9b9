//! Slash-command parsing.
//!
//! Commands are alternate entry points that set a flow's initial state
//! directly, bypassing the intent router. Malformed arguments produce
//! a user-facing usage message and no state change.

use crate::error::{PrepError, Result};
use crate::user::{Level, Track};
use strum::IntoEnumIterator;

/// Usage text for `/begin`.
pub const BEGIN_USAGE: &str =
    "Usage: /begin <level> <track>\nLevels: junior, middle, senior\nTracks: backend, frontend, python, java, data\nExample: /begin junior backend";

/// A parsed slash command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `/start` — welcome message
    Start,
    /// `/help` — command overview
    Help,
    /// `/assess` — start the skills-assessment flow
    Assess,
    /// `/plan` — start the planning flow
    Plan,
    /// `/interview` — start the interview flow
    Interview,
    /// `/review` — start the code-review flow
    Review,
    /// `/progress` — report persisted history and stats
    Progress,
    /// `/cancel` — abandon the current flow
    Cancel,
    /// `/begin <level> <track>` — set profile level and track, then assess
    Begin { level: Level, track: Track },
}

impl Command {
    /// Parses `text` as a slash command.
    ///
    /// Returns `None` when the text is not a command at all (does not
    /// start with `/`). Returns `Err(PrepError::InvalidCommand)` with
    /// user-facing usage text for unknown commands or bad arguments.
    pub fn parse(text: &str) -> Option<Result<Command>> {
        let trimmed = text.trim();
        if !trimmed.starts_with('/') {
            return None;
        }

        let mut parts = trimmed.split_whitespace();
        let head = parts.next().unwrap_or_default().to_lowercase();
        let args: Vec<&str> = parts.collect();

        let parsed = match head.as_str() {
            "/start" => Ok(Command::Start),
            "/help" => Ok(Command::Help),
            "/assess" => Ok(Command::Assess),
            "/plan" => Ok(Command::Plan),
            "/interview" => Ok(Command::Interview),
            "/review" => Ok(Command::Review),
            "/progress" => Ok(Command::Progress),
            "/cancel" => Ok(Command::Cancel),
            "/begin" => parse_begin(&args),
            _ => Err(PrepError::invalid_command(format!(
                "Unknown command '{head}'. Available: /assess, /plan, /interview, /review, /progress, /begin, /cancel, /help"
            ))),
        };

        Some(parsed)
    }
}

fn parse_begin(args: &[&str]) -> Result<Command> {
    let [level_arg, track_arg] = args else {
        return Err(PrepError::invalid_command(BEGIN_USAGE));
    };

    let level: Level = level_arg.parse().map_err(|_| {
        PrepError::invalid_command(format!(
            "Level '{level_arg}' is not supported. Levels: {}",
            joined_variants::<Level>()
        ))
    })?;
    let track: Track = track_arg.parse().map_err(|_| {
        PrepError::invalid_command(format!(
            "Track '{track_arg}' is not supported. Tracks: {}",
            joined_variants::<Track>()
        ))
    })?;

    Ok(Command::Begin { level, track })
}

fn joined_variants<T: IntoEnumIterator + std::fmt::Display>() -> String {
    T::iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
