//! # habitloop-core
//!
//! Core crate for HabitLoop. Contains configuration schemas, typed
//! identifiers, habit domain types, lifecycle events, and the unified
//! error system.
//!
//! This crate has **no** internal dependencies on other HabitLoop crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
