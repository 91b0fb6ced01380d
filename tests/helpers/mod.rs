//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use habitloop_core::config::extensions::ExtensionsConfig;
use habitloop_core::events::LifecycleEvent;
use habitloop_core::types::{CompletionEntry, Habit, HabitKind, UserId};
use habitloop_extension::{
    EventDispatcher, ExtensionRegistry, HealthAggregator, IntegrationStore, MemoryIntegrationStore,
};

/// Test harness wiring a registry, store, and dispatcher together the way
/// the host process does.
pub struct TestHarness {
    /// Extension registry.
    pub registry: Arc<ExtensionRegistry>,
    /// In-memory integration store.
    pub store: Arc<MemoryIntegrationStore>,
    /// Event dispatcher.
    pub dispatcher: EventDispatcher,
    /// Runtime configuration used for dispatcher and health aggregator.
    pub config: ExtensionsConfig,
}

impl TestHarness {
    /// Creates a harness with default timeouts.
    pub fn new() -> Self {
        Self::with_config(ExtensionsConfig::default())
    }

    /// Creates a harness with custom timeouts.
    pub fn with_config(config: ExtensionsConfig) -> Self {
        let registry = Arc::new(ExtensionRegistry::new());
        let store = Arc::new(MemoryIntegrationStore::new());
        let store_handle: Arc<dyn IntegrationStore> = store.clone();
        let dispatcher = EventDispatcher::new(Arc::clone(&registry), store_handle, &config);

        Self {
            registry,
            store,
            dispatcher,
            config,
        }
    }

    /// Creates a health aggregator over the harness registry.
    pub fn health(&self) -> HealthAggregator {
        HealthAggregator::new(Arc::clone(&self.registry), &self.config)
    }
}

/// Creates a habit snapshot of the given kind.
pub fn habit(kind: HabitKind) -> Habit {
    Habit::new(UserId::new(), "Test habit", kind)
}

/// Builds a `Created` event for a habit.
pub fn created(habit: &Habit) -> LifecycleEvent {
    LifecycleEvent::Created {
        habit: habit.clone(),
        user: habit.owner_id,
    }
}

/// Builds a `Completed` event for a habit.
pub fn completed(habit: &Habit) -> LifecycleEvent {
    LifecycleEvent::Completed {
        habit: habit.clone(),
        entry: CompletionEntry::new(habit.id),
        user: habit.owner_id,
    }
}

/// Builds a `Completed` event carrying a measured value.
pub fn completed_with_value(habit: &Habit, value: f64) -> LifecycleEvent {
    LifecycleEvent::Completed {
        habit: habit.clone(),
        entry: CompletionEntry::new(habit.id).with_value(value),
        user: habit.owner_id,
    }
}

/// Builds an `Updated` event for a habit.
pub fn updated(habit: &Habit, previous: &Habit) -> LifecycleEvent {
    LifecycleEvent::Updated {
        habit: habit.clone(),
        previous: Box::new(previous.clone()),
    }
}

/// Builds a `Deleted` event for a habit.
pub fn deleted(habit: &Habit) -> LifecycleEvent {
    LifecycleEvent::Deleted {
        habit: habit.clone(),
    }
}
