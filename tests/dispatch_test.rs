//! Integration tests for lifecycle dispatch: failure isolation, deadlines,
//! kind scoping, and per-habit serialization.

mod helpers;

use std::time::Duration;

use serde_json::json;

use habitloop_core::config::extensions::ExtensionsConfig;
use habitloop_core::error::AppError;
use habitloop_core::types::HabitKind;
use habitloop_extension::{ExtensionBuilder, ExtensionDescriptor};

use helpers::{completed, created, deleted, habit, TestHarness};

fn failing_extension(name: &str) -> ExtensionDescriptor {
    ExtensionBuilder::new(name)
        .on_completed(|_ctx| async { Err(AppError::hook("synthetic hook failure")) })
        .build()
        .unwrap()
}

fn marker_extension(name: &str) -> ExtensionDescriptor {
    ExtensionBuilder::new(name)
        .on_completed(|ctx| async move { Ok(ctx.data.patch().set("seen", json!(true)).build()) })
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_sibling_failure_does_not_affect_later_extension() {
    let harness = TestHarness::new();
    harness
        .registry
        .register(failing_extension("broken"))
        .await
        .unwrap();
    harness
        .registry
        .register(marker_extension("working"))
        .await
        .unwrap();

    let habit = habit(HabitKind::Simple);
    let outcome = harness.dispatcher.dispatch(completed(&habit)).await;

    assert_eq!(outcome.invoked, 2);
    assert_eq!(outcome.failed, vec!["broken"]);
    assert_eq!(outcome.applied, vec!["working"]);

    let integrations = harness.store.integrations(habit.id);
    assert_eq!(integrations["working"], json!({"seen": true}));
    assert!(!integrations.contains_key("broken"));
}

#[tokio::test]
async fn test_panicking_hook_is_isolated() {
    let harness = TestHarness::new();
    harness
        .registry
        .register(
            ExtensionBuilder::new("panicky")
                .on_completed(|_ctx| async {
                    panic!("synthetic panic");
                    #[allow(unreachable_code)]
                    Ok(habitloop_extension::HookUpdate::None)
                })
                .build()
                .unwrap(),
        )
        .await
        .unwrap();
    harness
        .registry
        .register(marker_extension("working"))
        .await
        .unwrap();

    let habit = habit(HabitKind::Simple);
    let outcome = harness.dispatcher.dispatch(completed(&habit)).await;

    assert_eq!(outcome.failed, vec!["panicky"]);
    assert_eq!(outcome.applied, vec!["working"]);
}

#[tokio::test]
async fn test_slow_hook_times_out_without_stalling_dispatch() {
    let harness = TestHarness::with_config(ExtensionsConfig {
        hook_timeout_seconds: 1,
        ..ExtensionsConfig::default()
    });

    harness
        .registry
        .register(
            ExtensionBuilder::new("stuck")
                .on_completed(|ctx| async move {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    Ok(ctx.data.patch().set("late", json!(true)).build())
                })
                .build()
                .unwrap(),
        )
        .await
        .unwrap();
    harness
        .registry
        .register(marker_extension("working"))
        .await
        .unwrap();

    let habit = habit(HabitKind::Simple);
    let outcome = harness.dispatcher.dispatch(completed(&habit)).await;

    assert_eq!(outcome.failed, vec!["stuck"]);
    assert_eq!(outcome.applied, vec!["working"]);
    assert!(!harness.store.integrations(habit.id).contains_key("stuck"));
}

#[tokio::test]
async fn test_kind_scoped_extension_only_sees_its_kind() {
    let harness = TestHarness::new();
    harness
        .registry
        .register(
            ExtensionBuilder::new("weight-only")
                .for_kinds(["weight"])
                .on_completed(|ctx| async move {
                    Ok(ctx.data.patch().set("seen", json!(true)).build())
                })
                .build()
                .unwrap(),
        )
        .await
        .unwrap();

    let simple_habit = habit(HabitKind::Simple);
    let outcome = harness.dispatcher.dispatch(completed(&simple_habit)).await;
    assert_eq!(outcome.invoked, 0);
    assert!(harness.store.integrations(simple_habit.id).is_empty());

    let weight_habit = habit(HabitKind::Weight);
    let outcome = harness.dispatcher.dispatch(completed(&weight_habit)).await;
    assert_eq!(outcome.invoked, 1);
    assert_eq!(
        harness.store.integrations(weight_habit.id)["weight-only"],
        json!({"seen": true})
    );
}

#[tokio::test]
async fn test_results_merge_in_registration_order() {
    let harness = TestHarness::new();
    for name in ["first", "second", "third"] {
        harness
            .registry
            .register(marker_extension(name))
            .await
            .unwrap();
    }

    let habit = habit(HabitKind::Simple);
    let outcome = harness.dispatcher.dispatch(completed(&habit)).await;

    assert_eq!(outcome.applied, vec!["first", "second", "third"]);
}

#[tokio::test]
async fn test_same_habit_dispatches_are_serialized() {
    let harness = TestHarness::new();

    // Read-then-recompute with a deliberate pause: interleaved dispatches
    // would both read the same prior count and lose one increment.
    harness
        .registry
        .register(
            ExtensionBuilder::new("tally")
                .on_completed(|ctx| async move {
                    let habit_id = ctx.event.habit().id;
                    let prior = ctx
                        .data
                        .read(habit_id)
                        .await?
                        .and_then(|b| b.get("count").and_then(|v| v.as_i64()))
                        .unwrap_or(0);
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    Ok(ctx.data.patch().set("count", json!(prior + 1)).build())
                })
                .build()
                .unwrap(),
        )
        .await
        .unwrap();

    let habit = habit(HabitKind::Simple);
    let (a, b) = tokio::join!(
        harness.dispatcher.dispatch(completed(&habit)),
        harness.dispatcher.dispatch(completed(&habit)),
    );

    assert!(a.failed.is_empty() && b.failed.is_empty());
    assert_eq!(
        harness.store.integrations(habit.id)["tally"],
        json!({"count": 2})
    );
}

#[tokio::test]
async fn test_deleted_habit_loses_integration_records() {
    let harness = TestHarness::new();
    harness
        .registry
        .register(
            ExtensionBuilder::new("streaks")
                .on_created(|ctx| async move { Ok(ctx.data.seed(json!({"current": 0}))) })
                .build()
                .unwrap(),
        )
        .await
        .unwrap();

    let habit = habit(HabitKind::Simple);
    harness.dispatcher.dispatch(created(&habit)).await;
    assert!(!harness.store.integrations(habit.id).is_empty());

    harness.dispatcher.dispatch(deleted(&habit)).await;
    assert!(harness.store.integrations(habit.id).is_empty());
}
