//! Habit domain types.
//!
//! A [`Habit`] is the tracked entity that extensions observe. The snapshot
//! carried in lifecycle events includes the `integrations` map: per-extension
//! persisted state, keyed by extension name and opaque to the core.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{EntryId, HabitId, UserId};

/// The kind of a tracked habit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HabitKind {
    /// A plain done/not-done habit.
    Simple,
    /// A habit tracking a measured weight value per completion.
    Weight,
    /// A habit tracking time spent per completion.
    Timed,
}

impl HabitKind {
    /// Returns the string tag of this kind, used for extension scoping.
    pub fn as_tag(&self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Weight => "weight",
            Self::Timed => "timed",
        }
    }
}

impl std::fmt::Display for HabitKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_tag())
    }
}

/// Snapshot of a tracked habit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Habit {
    /// Unique habit ID.
    pub id: HabitId,
    /// The user owning this habit.
    pub owner_id: UserId,
    /// Display name.
    pub name: String,
    /// Habit kind.
    pub kind: HabitKind,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Whether the habit is archived.
    pub archived: bool,
    /// Per-extension persisted state, keyed by extension name.
    ///
    /// Values are extension-defined and opaque to the core. Only the owning
    /// extension may write into its own key.
    #[serde(default)]
    pub integrations: HashMap<String, serde_json::Value>,
}

impl Habit {
    /// Create a new habit snapshot.
    pub fn new(owner_id: UserId, name: impl Into<String>, kind: HabitKind) -> Self {
        Self {
            id: HabitId::new(),
            owner_id,
            name: name.into(),
            kind,
            created_at: Utc::now(),
            archived: false,
            integrations: HashMap::new(),
        }
    }
}

/// A single completion of a habit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionEntry {
    /// Unique entry ID.
    pub id: EntryId,
    /// The habit this entry belongs to.
    pub habit_id: HabitId,
    /// When the completion happened.
    pub completed_at: DateTime<Utc>,
    /// Measured value (e.g. weight in kilograms), when the kind carries one.
    pub value: Option<f64>,
    /// Free-form note.
    pub note: Option<String>,
}

impl CompletionEntry {
    /// Create a new completion entry for a habit.
    pub fn new(habit_id: HabitId) -> Self {
        Self {
            id: EntryId::new(),
            habit_id,
            completed_at: Utc::now(),
            value: None,
            note: None,
        }
    }

    /// Attach a measured value.
    pub fn with_value(mut self, value: f64) -> Self {
        self.value = Some(value);
        self
    }

    /// Attach a note.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}
