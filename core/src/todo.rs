//! The `Todo` record and the rules every write must satisfy.
//!
//! A todo is a piece of text with a completion flag and two timestamps. The
//! store assigns the identifier and both timestamps; callers only ever supply
//! text (validated through [`TodoText`]) and the completion flag.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Maximum number of characters a todo's text may hold after trimming.
pub const MAX_TEXT_CHARS: usize = 255;

/// Store-assigned identifier of a todo.
///
/// Opaque to clients: it is only ever compared, displayed and sent back to the
/// API. The store never hands out the same value twice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(i64);

impl TodoId {
    /// Wraps a raw store identifier.
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Returns the raw store identifier.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TodoId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

/// A persisted todo, exactly as the API returns it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    /// Store-assigned identifier
    pub id: TodoId,
    /// Trimmed, non-empty text
    pub text: String,
    /// Whether the todo is done
    pub completed: bool,
    /// Set once when the record is created
    pub created_at: DateTime<Utc>,
    /// Refreshed on every mutation
    pub updated_at: DateTime<Utc>,
}

impl Todo {
    /// Which of the two lists this todo belongs to.
    #[must_use]
    pub const fn partition(&self) -> Partition {
        Partition::of(self.completed)
    }
}

/// The two mutually exclusive groupings of todos.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Partition {
    /// `completed == false`
    Pending,
    /// `completed == true`
    Completed,
}

impl Partition {
    /// Partition named by a completion flag.
    #[must_use]
    pub const fn of(completed: bool) -> Self {
        if completed { Self::Completed } else { Self::Pending }
    }

    /// The other partition.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Pending => Self::Completed,
            Self::Completed => Self::Pending,
        }
    }

    /// Completion flag a todo in this partition carries.
    #[must_use]
    pub const fn is_completed(self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// Input rejected before it reaches the store.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Text missing, empty, or whitespace only.
    #[error("Todo text is required and must be a non-empty string")]
    MissingText,

    /// Text longer than [`MAX_TEXT_CHARS`] after trimming.
    #[error("Todo text must be at most {max} characters")]
    TextTooLong {
        /// Allowed maximum
        max: usize,
        /// Length of the rejected text
        length: usize,
    },

    /// Partial update without a completion flag.
    #[error("Completed status is required")]
    MissingCompleted,
}

/// Todo text that passed validation: trimmed, non-empty, at most
/// [`MAX_TEXT_CHARS`] characters.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TodoText(String);

impl TodoText {
    /// Trims and validates raw input.
    ///
    /// Length is counted in characters, not bytes.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::MissingText`] if nothing is left after trimming
    /// - [`ValidationError::TextTooLong`] if more than [`MAX_TEXT_CHARS`] remain
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::MissingText);
        }

        let length = trimmed.chars().count();
        if length > MAX_TEXT_CHARS {
            return Err(ValidationError::TextTooLong {
                max: MAX_TEXT_CHARS,
                length,
            });
        }

        Ok(Self(trimmed.to_string()))
    }

    /// Like [`TodoText::parse`], treating an absent value as empty text.
    ///
    /// # Errors
    ///
    /// Same as [`TodoText::parse`].
    pub fn parse_optional(raw: Option<&str>) -> Result<Self, ValidationError> {
        raw.map_or(Err(ValidationError::MissingText), Self::parse)
    }

    /// Borrow the validated text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Take the validated text.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl AsRef<str> for TodoText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TodoText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Full replacement of a todo's mutable fields (HTTP `PUT`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TodoUpdate {
    /// New text
    pub text: TodoText,
    /// New completion flag
    pub completed: bool,
}
