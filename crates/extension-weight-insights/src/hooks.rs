//! Lifecycle hooks for the weight insights extension.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;

use habitloop_core::events::LifecycleEvent;
use habitloop_core::result::AppResult;
use habitloop_extension::{HookContext, HookUpdate, LifecycleHook};

/// Seeds the insights state when a weight habit is created.
#[derive(Debug)]
pub struct SeedInsightsHook;

#[async_trait]
impl LifecycleHook for SeedInsightsHook {
    async fn handle(&self, ctx: HookContext) -> AppResult<HookUpdate> {
        Ok(ctx.data.seed(json!({
            "count": 0,
            "latest": null,
            "trend": [],
        })))
    }
}

/// Folds a recorded measurement into the rolling statistics.
#[derive(Debug)]
pub struct RecordMeasurementHook {
    /// Bound on the trend window; older points fall off the front.
    pub max_trend_points: usize,
}

#[async_trait]
impl LifecycleHook for RecordMeasurementHook {
    async fn handle(&self, ctx: HookContext) -> AppResult<HookUpdate> {
        let LifecycleEvent::Completed { habit, entry, .. } = ctx.event.as_ref() else {
            return Ok(HookUpdate::None);
        };

        // Completions without a measured value carry no insight.
        let Some(value) = entry.value else {
            return Ok(HookUpdate::None);
        };

        let prior = ctx.data.read(habit.id).await?.unwrap_or(json!({}));

        let count = prior.get("count").and_then(|v| v.as_i64()).unwrap_or(0);
        let mut trend: Vec<serde_json::Value> = prior
            .get("trend")
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default();

        trend.push(json!(value));
        if trend.len() > self.max_trend_points {
            trend.drain(..trend.len() - self.max_trend_points);
        }

        tracing::debug!(
            habit = %habit.id,
            value = value,
            measurements = count + 1,
            "Measurement recorded"
        );

        Ok(ctx
            .data
            .patch()
            .set("count", json!(count + 1))
            .set("latest", json!(value))
            .set("trend", json!(trend))
            .build())
    }
}

/// Records when a tracked habit was last renamed.
#[derive(Debug)]
pub struct RenameAuditHook;

#[async_trait]
impl LifecycleHook for RenameAuditHook {
    async fn handle(&self, ctx: HookContext) -> AppResult<HookUpdate> {
        let LifecycleEvent::Updated { habit, previous } = ctx.event.as_ref() else {
            return Ok(HookUpdate::None);
        };

        if habit.name == previous.name {
            return Ok(HookUpdate::None);
        }

        Ok(ctx
            .data
            .patch()
            .set("last_renamed_at", json!(Utc::now().to_rfc3339()))
            .build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use habitloop_core::types::{CompletionEntry, Habit, HabitKind, UserId};
    use habitloop_extension::{DataManager, MemoryIntegrationStore};

    fn context(event: LifecycleEvent) -> HookContext {
        HookContext {
            event: Arc::new(event),
            data: DataManager::new(
                "weight-insights",
                Arc::new(MemoryIntegrationStore::new()),
            ),
        }
    }

    #[tokio::test]
    async fn test_measurement_recorded() {
        let habit = Habit::new(UserId::new(), "Weigh in", HabitKind::Weight);
        let entry = CompletionEntry::new(habit.id).with_value(81.4);

        let update = RecordMeasurementHook {
            max_trend_points: 30,
        }
        .handle(context(LifecycleEvent::Completed {
            habit: habit.clone(),
            entry,
            user: habit.owner_id,
        }))
        .await
        .unwrap();

        let HookUpdate::Patch(fields) = update else {
            panic!("expected patch");
        };
        assert_eq!(fields["integrations.weight-insights.count"], json!(1));
        assert_eq!(fields["integrations.weight-insights.latest"], json!(81.4));
        assert_eq!(fields["integrations.weight-insights.trend"], json!([81.4]));
    }

    #[tokio::test]
    async fn test_valueless_completion_ignored() {
        let habit = Habit::new(UserId::new(), "Weigh in", HabitKind::Weight);
        let entry = CompletionEntry::new(habit.id);

        let update = RecordMeasurementHook {
            max_trend_points: 30,
        }
        .handle(context(LifecycleEvent::Completed {
            habit: habit.clone(),
            entry,
            user: habit.owner_id,
        }))
        .await
        .unwrap();

        assert!(update.is_none());
    }

    #[tokio::test]
    async fn test_rename_audited_only_on_name_change() {
        let previous = Habit::new(UserId::new(), "Weigh in", HabitKind::Weight);
        let mut renamed = previous.clone();
        renamed.name = "Morning weigh in".to_string();

        let update = RenameAuditHook
            .handle(context(LifecycleEvent::Updated {
                habit: renamed.clone(),
                previous: Box::new(previous.clone()),
            }))
            .await
            .unwrap();
        assert!(!update.is_none());

        let update = RenameAuditHook
            .handle(context(LifecycleEvent::Updated {
                habit: previous.clone(),
                previous: Box::new(previous),
            }))
            .await
            .unwrap();
        assert!(update.is_none());
    }
}
