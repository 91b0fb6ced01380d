//! Lifecycle events emitted by habit mutations.
//!
//! The owning CRUD service emits one event after its own mutation commits.
//! Events are consumed by the extension dispatcher; nothing here is durable
//! or replayed — delivery is best-effort, synchronous with the emitting
//! operation.

use serde::{Deserialize, Serialize};

use crate::types::{CompletionEntry, Habit, UserId};

/// Enumeration of lifecycle event kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A habit was created.
    Created,
    /// A habit was completed (one entry recorded).
    Completed,
    /// A habit was updated.
    Updated,
    /// A habit was deleted.
    Deleted,
}

impl EventKind {
    /// Returns the string name of this event kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Completed => "completed",
            Self::Updated => "updated",
            Self::Deleted => "deleted",
        }
    }

    /// All event kinds, in lifecycle order.
    pub fn all() -> [EventKind; 4] {
        [Self::Created, Self::Completed, Self::Updated, Self::Deleted]
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A lifecycle event with its kind-specific payload.
///
/// Every variant carries a committed snapshot of the habit; `Completed`
/// additionally carries the recorded entry, `Updated` the prior snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LifecycleEvent {
    /// A habit was created.
    Created {
        /// The created habit.
        habit: Habit,
        /// The acting user.
        user: UserId,
    },
    /// A habit was completed.
    Completed {
        /// The completed habit.
        habit: Habit,
        /// The recorded completion entry.
        entry: CompletionEntry,
        /// The acting user.
        user: UserId,
    },
    /// A habit was updated.
    Updated {
        /// The habit after the update.
        habit: Habit,
        /// The habit before the update.
        previous: Box<Habit>,
    },
    /// A habit was deleted.
    Deleted {
        /// The deleted habit's last snapshot.
        habit: Habit,
    },
}

impl LifecycleEvent {
    /// The kind of this event.
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Created { .. } => EventKind::Created,
            Self::Completed { .. } => EventKind::Completed,
            Self::Updated { .. } => EventKind::Updated,
            Self::Deleted { .. } => EventKind::Deleted,
        }
    }

    /// The habit snapshot carried by this event.
    pub fn habit(&self) -> &Habit {
        match self {
            Self::Created { habit, .. }
            | Self::Completed { habit, .. }
            | Self::Updated { habit, .. }
            | Self::Deleted { habit } => habit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::HabitKind;

    #[test]
    fn test_event_kind_names() {
        assert_eq!(EventKind::Created.as_str(), "created");
        assert_eq!(EventKind::Deleted.to_string(), "deleted");
    }

    #[test]
    fn test_event_accessors() {
        let habit = Habit::new(UserId::new(), "Stretch", HabitKind::Simple);
        let event = LifecycleEvent::Deleted {
            habit: habit.clone(),
        };
        assert_eq!(event.kind(), EventKind::Deleted);
        assert_eq!(event.habit().id, habit.id);
    }
}
