//! Lifecycle hooks for the streaks extension.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::json;

use habitloop_core::events::LifecycleEvent;
use habitloop_core::result::AppResult;
use habitloop_extension::{HookContext, HookUpdate, LifecycleHook};

/// Seeds the streak state when a habit is created.
#[derive(Debug)]
pub struct SeedStreakHook;

#[async_trait]
impl LifecycleHook for SeedStreakHook {
    async fn handle(&self, ctx: HookContext) -> AppResult<HookUpdate> {
        Ok(ctx.data.seed(json!({
            "current": 0,
            "longest": 0,
            "last_completed": null,
        })))
    }
}

/// Recomputes the streak when a habit is completed.
///
/// Patches are replace-at-path, so the hook reads its own prior state and
/// returns the recomputed values rather than increments.
#[derive(Debug)]
pub struct RecordCompletionHook;

#[async_trait]
impl LifecycleHook for RecordCompletionHook {
    async fn handle(&self, ctx: HookContext) -> AppResult<HookUpdate> {
        let LifecycleEvent::Completed { habit, entry, .. } = ctx.event.as_ref() else {
            return Ok(HookUpdate::None);
        };

        let today = entry.completed_at.date_naive();
        let prior = ctx.data.read(habit.id).await?.unwrap_or(json!({}));

        let current = prior.get("current").and_then(|v| v.as_i64()).unwrap_or(0);
        let longest = prior.get("longest").and_then(|v| v.as_i64()).unwrap_or(0);
        let last_completed: Option<NaiveDate> = prior
            .get("last_completed")
            .and_then(|v| v.as_str())
            .and_then(|s| s.parse().ok());

        let current = match last_completed {
            // Second completion on the same day leaves the streak as is.
            Some(last) if last == today => return Ok(HookUpdate::None),
            Some(last) if last.succ_opt() == Some(today) => current + 1,
            _ => 1,
        };

        tracing::debug!(
            habit = %habit.id,
            current = current,
            "Streak recomputed"
        );

        Ok(ctx
            .data
            .patch()
            .set("current", json!(current))
            .set("longest", json!(longest.max(current)))
            .set("last_completed", json!(today.to_string()))
            .build())
    }
}
