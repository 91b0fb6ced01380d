//! Core type definitions used across the HabitLoop workspace.

pub mod habit;
pub mod id;

pub use habit::{CompletionEntry, Habit, HabitKind};
pub use id::*;
