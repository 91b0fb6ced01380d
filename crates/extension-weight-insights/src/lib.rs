//! Weight insights extension for HabitLoop.
//!
//! Tracks rolling measurement statistics for weight habits: latest value,
//! measurement count, and a bounded trend window. Scoped to the `"weight"`
//! habit kind only.

pub mod extension;
pub mod hooks;

pub use extension::WeightInsightsExtension;
