//! Streaks extension descriptor assembly.

use std::sync::Arc;

use serde_json::json;

use habitloop_core::error::AppError;
use habitloop_core::events::EventKind;
use habitloop_core::result::AppResult;
use habitloop_extension::{
    ClosureEndpoint, ClosureProbe, ExtensionBuilder, ExtensionDescriptor, HealthStatus,
};

use crate::hooks::{RecordCompletionHook, SeedStreakHook};

/// The extension's registered name and integration namespace.
pub const EXTENSION_NAME: &str = "streaks";

/// Streak tracking extension.
#[derive(Debug)]
pub struct StreaksExtension;

impl StreaksExtension {
    /// Builds the extension descriptor for registration at boot.
    pub fn descriptor() -> AppResult<ExtensionDescriptor> {
        ExtensionBuilder::new(EXTENSION_NAME)
            .metadata(
                "1.0.0",
                "Consecutive-day completion streaks",
                "HabitLoop Team",
            )
            .on(EventKind::Created, Arc::new(SeedStreakHook))
            .on(EventKind::Completed, Arc::new(RecordCompletionHook))
            .endpoint(
                "summary",
                ClosureEndpoint::wrap(|data, args| async move {
                    let habit_id = args
                        .get("habit_id")
                        .and_then(|v| v.as_str())
                        .and_then(|s| s.parse().ok())
                        .ok_or_else(|| {
                            AppError::validation("summary endpoint requires a 'habit_id' argument")
                        })?;

                    let streak = data.read(habit_id).await?.unwrap_or(json!(null));
                    Ok(json!({ "habit_id": habit_id, "streak": streak }))
                }),
            )
            .health_check(ClosureProbe::wrap(|| async { Ok(HealthStatus::Healthy) }))
            .build()
    }
}
