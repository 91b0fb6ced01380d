//! Integration tests for the merge engine: seed overwrite semantics, flat
//! patch semantics, and namespace partitioning.

mod helpers;

use serde_json::json;

use habitloop_core::types::HabitKind;
use habitloop_extension::{ExtensionBuilder, HookUpdate};

use helpers::{completed, created, habit, TestHarness};

#[tokio::test]
async fn test_seed_is_idempotent_under_identical_input() {
    let harness = TestHarness::new();
    harness
        .registry
        .register(
            ExtensionBuilder::new("streaks")
                .on_created(|ctx| async move {
                    Ok(ctx.data.seed(json!({"current": 0, "longest": 0})))
                })
                .build()
                .unwrap(),
        )
        .await
        .unwrap();

    let habit = habit(HabitKind::Simple);
    harness.dispatcher.dispatch(created(&habit)).await;
    let first = harness.store.integrations(habit.id);

    harness.dispatcher.dispatch(created(&habit)).await;
    let second = harness.store.integrations(habit.id);

    assert_eq!(first, second);
    assert_eq!(second["streaks"], json!({"current": 0, "longest": 0}));
}

#[tokio::test]
async fn test_seed_overwrites_prior_namespace_content() {
    let harness = TestHarness::new();
    harness
        .registry
        .register(
            ExtensionBuilder::new("streaks")
                .on_created(|ctx| async move { Ok(ctx.data.seed(json!({"fresh": true}))) })
                .on_completed(|ctx| async move {
                    Ok(ctx.data.patch().set("extra", json!(1)).build())
                })
                .build()
                .unwrap(),
        )
        .await
        .unwrap();

    let habit = habit(HabitKind::Simple);
    harness.dispatcher.dispatch(created(&habit)).await;
    harness.dispatcher.dispatch(completed(&habit)).await;
    assert_eq!(
        harness.store.integrations(habit.id)["streaks"],
        json!({"fresh": true, "extra": 1})
    );

    // Re-seeding replaces the namespace wholesale, not a deep merge.
    harness.dispatcher.dispatch(created(&habit)).await;
    assert_eq!(
        harness.store.integrations(habit.id)["streaks"],
        json!({"fresh": true})
    );
}

#[tokio::test]
async fn test_patch_is_replace_at_path_not_increment() {
    let harness = TestHarness::new();
    harness
        .registry
        .register(
            ExtensionBuilder::new("counter")
                .on_completed(|_ctx| async {
                    Ok(HookUpdate::Patch(
                        [("integrations.counter.count".to_string(), json!(1))]
                            .into_iter()
                            .collect(),
                    ))
                })
                .build()
                .unwrap(),
        )
        .await
        .unwrap();

    let habit = habit(HabitKind::Simple);
    for _ in 0..3 {
        harness.dispatcher.dispatch(completed(&habit)).await;
        assert_eq!(
            harness.store.integrations(habit.id)["counter"],
            json!({"count": 1})
        );
    }
}

#[tokio::test]
async fn test_cumulative_counter_requires_reading_prior_state() {
    let harness = TestHarness::new();
    harness
        .registry
        .register(
            ExtensionBuilder::new("counter")
                .on_completed(|ctx| async move {
                    let habit_id = ctx.event.habit().id;
                    let prior = ctx
                        .data
                        .read(habit_id)
                        .await?
                        .and_then(|b| b.get("count").and_then(|v| v.as_i64()))
                        .unwrap_or(0);
                    Ok(ctx.data.patch().set("count", json!(prior + 1)).build())
                })
                .build()
                .unwrap(),
        )
        .await
        .unwrap();

    let habit = habit(HabitKind::Simple);
    for _ in 0..3 {
        harness.dispatcher.dispatch(completed(&habit)).await;
    }

    assert_eq!(
        harness.store.integrations(habit.id)["counter"],
        json!({"count": 3})
    );
}

#[tokio::test]
async fn test_foreign_namespace_patch_dropped_sibling_survives() {
    let harness = TestHarness::new();
    harness
        .registry
        .register(
            ExtensionBuilder::new("rogue")
                .on_completed(|_ctx| async {
                    // Deliberately targets another extension's namespace.
                    Ok(HookUpdate::Patch(
                        [("integrations.streaks.current".to_string(), json!(99))]
                            .into_iter()
                            .collect(),
                    ))
                })
                .build()
                .unwrap(),
        )
        .await
        .unwrap();
    harness
        .registry
        .register(
            ExtensionBuilder::new("streaks")
                .on_completed(|ctx| async move {
                    Ok(ctx.data.patch().set("current", json!(1)).build())
                })
                .build()
                .unwrap(),
        )
        .await
        .unwrap();

    let habit = habit(HabitKind::Simple);
    let outcome = harness.dispatcher.dispatch(completed(&habit)).await;

    assert_eq!(outcome.applied, vec!["streaks"]);
    let integrations = harness.store.integrations(habit.id);
    assert_eq!(integrations["streaks"], json!({"current": 1}));
    assert!(!integrations.contains_key("rogue"));
}

#[tokio::test]
async fn test_nested_patch_paths_create_objects() {
    let harness = TestHarness::new();
    harness
        .registry
        .register(
            ExtensionBuilder::new("stats")
                .on_completed(|ctx| async move {
                    Ok(ctx
                        .data
                        .patch()
                        .set("weekly.count", json!(4))
                        .set("weekly.best_day", json!("monday"))
                        .build())
                })
                .build()
                .unwrap(),
        )
        .await
        .unwrap();

    let habit = habit(HabitKind::Simple);
    harness.dispatcher.dispatch(completed(&habit)).await;

    assert_eq!(
        harness.store.integrations(habit.id)["stats"],
        json!({"weekly": {"count": 4, "best_day": "monday"}})
    );
}
