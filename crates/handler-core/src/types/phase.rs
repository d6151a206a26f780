//! Lifecycle phases at which the host agent invokes registered handlers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// A named point in the host agent's run lifecycle.
///
/// The three built-in phases cover the agent run itself; any other name is
/// carried as [`Phase::Custom`] so hosts can define their own.
///
/// The string form is canonical: `Custom("report")` names the same phase as
/// `Report`. Parsing always yields the canonical variant, and
/// [`Phase::canonical`] normalizes a directly constructed value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Phase {
    /// Fired when the agent run starts.
    Start,
    /// Fired when the agent run completes successfully.
    Report,
    /// Fired when the agent run fails.
    Exception,
    /// Host-defined phase. Prefer parsing over constructing this directly.
    Custom(String),
}

impl Phase {
    /// All built-in phases, in lifecycle order.
    pub const BUILTIN: [Phase; 3] = [Phase::Start, Phase::Report, Phase::Exception];

    /// Returns the string name of this phase.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Start => "start",
            Self::Report => "report",
            Self::Exception => "exception",
            Self::Custom(name) => name,
        }
    }

    /// Returns the canonical form of this phase.
    ///
    /// A custom name matching a built-in phase becomes that built-in; other
    /// custom names are trimmed.
    pub fn canonical(self) -> Self {
        match self {
            Self::Custom(name) => {
                let trimmed = name.trim();
                match builtin(trimmed) {
                    Some(phase) => phase,
                    None if trimmed.len() == name.len() => Self::Custom(name),
                    None => Self::Custom(trimmed.to_string()),
                }
            }
            other => other,
        }
    }

    /// Returns whether this is one of the built-in phases.
    pub fn is_builtin(&self) -> bool {
        !matches!(self, Self::Custom(_))
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Phase {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        if name.is_empty() {
            return Err(AppError::validation("Phase name must not be empty"));
        }
        Ok(builtin(name).unwrap_or_else(|| Self::Custom(name.to_string())))
    }
}

fn builtin(name: &str) -> Option<Phase> {
    match name {
        "start" => Some(Phase::Start),
        "report" => Some(Phase::Report),
        "exception" => Some(Phase::Exception),
        _ => None,
    }
}

impl TryFrom<String> for Phase {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Phase> for String {
    fn from(phase: Phase) -> String {
        match phase {
            Phase::Custom(name) => name,
            builtin => builtin.as_str().to_string(),
        }
    }
}
