//! Lifecycle event dispatcher — fans an event out to all applicable
//! extensions and fans results back in for merging.
//!
//! Dispatch is synchronous relative to the caller: the owning mutation
//! needs the merged result before it can respond. Within one dispatch,
//! hook invocations run concurrently; overall latency is bounded by the
//! slowest hook, which is itself bounded by the configured deadline.
//!
//! Every hook call sits behind an isolation boundary: an error, timeout,
//! or panic is logged and converted to "no update". The operation that
//! emitted the event never fails because of an extension.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use futures::future::join_all;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, error, warn};

use habitloop_core::config::extensions::ExtensionsConfig;
use habitloop_core::error::AppError;
use habitloop_core::events::{EventKind, LifecycleEvent};
use habitloop_core::result::AppResult;
use habitloop_core::types::HabitId;

use crate::data::DataManager;
use crate::hook::HookContext;
use crate::merger::IntegrationMerger;
use crate::registry::ExtensionRegistry;
use crate::store::IntegrationStore;

/// Outcome of one dispatch.
#[derive(Debug, Clone)]
pub struct DispatchOutcome {
    /// The habit the event concerned.
    pub habit_id: HabitId,
    /// The dispatched event kind.
    pub event: EventKind,
    /// Number of hooks invoked.
    pub invoked: usize,
    /// Extensions whose hook errored, timed out, or panicked.
    pub failed: Vec<String>,
    /// Extensions whose writes were applied.
    pub applied: Vec<String>,
    /// Error applying the merged write set, if any.
    pub merge_error: Option<String>,
}

/// Dispatches lifecycle events to registered extensions.
pub struct EventDispatcher {
    /// Extension registry.
    registry: Arc<ExtensionRegistry>,
    /// Integration state store.
    store: Arc<dyn IntegrationStore>,
    /// Merge engine.
    merger: IntegrationMerger,
    /// Per-hook deadline.
    hook_timeout: Duration,
    /// Habit ID → dispatch serialization lock.
    ///
    /// Dispatches for different habits run fully concurrently; dispatches
    /// for the same habit are serialized so the persisted state always
    /// reflects one dispatch's results fully, never an interleaving.
    entity_locks: DashMap<HabitId, Arc<Mutex<()>>>,
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("hook_timeout", &self.hook_timeout)
            .finish()
    }
}

impl EventDispatcher {
    /// Creates a new dispatcher.
    pub fn new(
        registry: Arc<ExtensionRegistry>,
        store: Arc<dyn IntegrationStore>,
        config: &ExtensionsConfig,
    ) -> Self {
        Self {
            registry,
            store,
            merger: IntegrationMerger::new(),
            hook_timeout: config.hook_timeout(),
            entity_locks: DashMap::new(),
        }
    }

    /// Dispatches a lifecycle event to all applicable extensions.
    ///
    /// Never fails on behalf of an extension: hook faults are absorbed at
    /// the isolation boundary and reported in the outcome and logs only.
    pub async fn dispatch(&self, event: LifecycleEvent) -> DispatchOutcome {
        let event = Arc::new(event);
        let habit = event.habit();
        let habit_id = habit.id;
        let kind = event.kind();
        let kind_tag = habit.kind.as_tag();

        let lock = self
            .entity_locks
            .entry(habit_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _guard = lock.lock().await;

        let candidates = self.registry.resolve(kind_tag).await;

        let mut invocations = Vec::new();
        for descriptor in &candidates {
            let Some(hook) = descriptor.hook(kind) else {
                continue;
            };

            let ctx = HookContext {
                event: Arc::clone(&event),
                data: DataManager::new(&descriptor.name, Arc::clone(&self.store)),
            };
            let deadline = self.hook_timeout;

            // One task per hook; the join below preserves registration
            // order for the merge step.
            let handle =
                tokio::spawn(async move { tokio::time::timeout(deadline, hook.handle(ctx)).await });
            invocations.push((descriptor.name.clone(), handle));
        }

        let invoked = invocations.len();
        debug!(
            habit = %habit_id,
            event = %kind,
            hooks = invoked,
            "Dispatching lifecycle event"
        );

        let mut failed = Vec::new();
        let mut results = Vec::new();

        let (names, handles): (Vec<_>, Vec<_>) = invocations.into_iter().unzip();
        for (name, joined) in names.into_iter().zip(join_all(handles).await) {
            match joined {
                Err(join_error) => {
                    error!(
                        extension = %name,
                        event = %kind,
                        error = %join_error,
                        "Hook task panicked"
                    );
                    failed.push(name);
                }
                Ok(Err(_)) => {
                    error!(
                        extension = %name,
                        event = %kind,
                        timeout_seconds = self.hook_timeout.as_secs(),
                        "Hook timed out"
                    );
                    failed.push(name);
                }
                Ok(Ok(Err(e))) => {
                    error!(
                        extension = %name,
                        event = %kind,
                        error = %e,
                        "Hook failed"
                    );
                    failed.push(name);
                }
                Ok(Ok(Ok(update))) => {
                    if !update.is_none() {
                        results.push((name, update));
                    }
                }
            }
        }

        let write_set = self.merger.merge(habit_id, results);

        let mut applied = Vec::new();
        let mut merge_error = None;

        if !write_set.is_empty() {
            match self.store.apply(&write_set).await {
                Ok(()) => {
                    applied = write_set
                        .writes
                        .iter()
                        .map(|w| w.extension.clone())
                        .collect();
                }
                Err(e) => {
                    error!(
                        habit = %habit_id,
                        event = %kind,
                        error = %e,
                        "Applying integration writes failed"
                    );
                    merge_error = Some(e.to_string());
                }
            }
        }

        if kind == EventKind::Deleted {
            if let Err(e) = self.store.remove_entity(habit_id).await {
                warn!(
                    habit = %habit_id,
                    error = %e,
                    "Removing integration records for deleted habit failed"
                );
            }
        }

        DispatchOutcome {
            habit_id,
            event: kind,
            invoked,
            failed,
            applied,
            merge_error,
        }
    }

    /// Invokes a named endpoint of a registered extension.
    ///
    /// Unlike lifecycle dispatch, endpoint calls are explicit invocations:
    /// errors propagate to the caller.
    pub async fn call_endpoint(
        &self,
        extension: &str,
        endpoint: &str,
        args: Value,
    ) -> AppResult<Value> {
        let descriptor = self
            .registry
            .get(extension)
            .await
            .ok_or_else(|| AppError::not_found(format!("Extension '{extension}' not found")))?;

        let callable = descriptor.endpoints.get(endpoint).cloned().ok_or_else(|| {
            AppError::not_found(format!(
                "Extension '{extension}' has no endpoint '{endpoint}'"
            ))
        })?;

        let data = DataManager::new(&descriptor.name, Arc::clone(&self.store));
        callable.call(data, args).await
    }

    /// Returns a reference to the extension registry.
    pub fn registry(&self) -> &Arc<ExtensionRegistry> {
        &self.registry
    }

    /// Returns a reference to the integration store.
    pub fn store(&self) -> &Arc<dyn IntegrationStore> {
        &self.store
    }
}
