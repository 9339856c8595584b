//! Append-only conversation transcript.
//!
//! A [`Transcript`] owns the ordered list of [`Turn`]s for one session. Turns
//! can only be appended: there is no API to edit, reorder or remove them.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// Author of a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Author {
    /// The person asking questions.
    User,
    /// The answering service (or the session itself for seeded/fallback turns).
    Assistant,
}

impl std::fmt::Display for Author {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
        }
    }
}

/// A single entry in the transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    /// Session-unique id, strictly increasing in append order.
    pub id: u64,
    /// Who wrote the turn.
    pub author: Author,
    /// Text content.
    pub body: String,
    /// When the turn was appended.
    pub created_at: DateTime<Utc>,
}

impl Turn {
    /// Whether the turn was written by the user.
    pub fn is_user(&self) -> bool {
        self.author == Author::User
    }
}

/// Ordered, append-only list of turns.
#[derive(Debug, Clone)]
pub struct Transcript {
    turns: Vec<Turn>,
    next_id: u64,
}

impl Transcript {
    /// Create an empty transcript. The first appended turn gets id 1.
    pub fn new() -> Self {
        Self {
            turns: Vec::new(),
            next_id: 1,
        }
    }

    /// Append a turn stamped with the next id and the current time.
    ///
    /// If the clock has not advanced past the previous turn (coarse clocks,
    /// back-to-back appends) the timestamp is nudged one microsecond past it,
    /// so timestamps are strictly increasing like ids.
    pub fn append(&mut self, author: Author, body: impl Into<String>) -> &Turn {
        let mut created_at = Utc::now();
        if let Some(last) = self.turns.last() {
            if created_at <= last.created_at {
                created_at = last.created_at + TimeDelta::microseconds(1);
            }
        }

        let id = self.next_id;
        self.next_id += 1;
        self.turns.push(Turn {
            id,
            author,
            body: body.into(),
            created_at,
        });

        &self.turns[self.turns.len() - 1]
    }

    /// All turns in append order.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// The most recent turn.
    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// Look up a turn by id.
    pub fn get(&self, id: u64) -> Option<&Turn> {
        // Ids are dense and start at 1.
        let index = usize::try_from(id.checked_sub(1)?).ok()?;
        self.turns.get(index)
    }

    /// Number of turns.
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Whether no turn has been appended yet.
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new()
    }
}
