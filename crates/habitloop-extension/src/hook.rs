//! Lifecycle hook contract and the updates hooks may return.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use habitloop_core::events::LifecycleEvent;
use habitloop_core::result::AppResult;

use crate::data::DataManager;

/// Update returned by a lifecycle hook.
///
/// The two update kinds are an explicit tagged type rather than being
/// inferred from the shape of the returned value. `Seed` replaces the
/// extension's whole namespace; `Patch` sets individual fields at fully
/// qualified dotted paths under it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "update", content = "data", rename_all = "snake_case")]
pub enum HookUpdate {
    /// No state change requested.
    None,
    /// Replace the extension's namespace content with this blob.
    ///
    /// Overwrite semantics: any prior namespace content is discarded.
    Seed(serde_json::Value),
    /// Set individual fields, keyed by fully qualified dotted path
    /// (`integrations.<extension>.<field...>`).
    ///
    /// Each entry is an independent last-write-wins overwrite at its path,
    /// never an increment. A hook wanting a cumulative counter must read
    /// prior state and return the recomputed value.
    Patch(HashMap<String, serde_json::Value>),
}

impl HookUpdate {
    /// Whether this update carries no state change.
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

/// Context passed to every hook invocation.
///
/// Carries the lifecycle event and a [`DataManager`] bound to the invoked
/// extension's own namespace, so hook bodies never hardcode storage paths.
#[derive(Clone)]
pub struct HookContext {
    /// The dispatched lifecycle event.
    pub event: Arc<LifecycleEvent>,
    /// Namespace-scoped data access for the invoked extension.
    pub data: DataManager,
}

impl std::fmt::Debug for HookContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookContext")
            .field("event", &self.event.kind())
            .field("namespace", &self.data.namespace())
            .finish()
    }
}

/// Trait for lifecycle hook implementations.
///
/// A hook observes one event kind for one extension. Errors returned here
/// are caught at the dispatch boundary, logged, and converted to
/// [`HookUpdate::None`] — they never affect sibling extensions or the
/// operation that emitted the event.
#[async_trait]
pub trait LifecycleHook: Send + Sync {
    /// Handles one dispatched event.
    async fn handle(&self, ctx: HookContext) -> AppResult<HookUpdate>;
}

/// A closure-based lifecycle hook for quick hook creation.
pub struct ClosureHook {
    /// Hook function.
    handler: Arc<
        dyn Fn(
                HookContext,
            )
                -> std::pin::Pin<Box<dyn std::future::Future<Output = AppResult<HookUpdate>> + Send>>
            + Send
            + Sync,
    >,
}

impl std::fmt::Debug for ClosureHook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClosureHook")
            .field("handler", &"<closure>")
            .finish()
    }
}

impl ClosureHook {
    /// Creates a new closure-based hook.
    pub fn new<F, Fut>(handler: F) -> Self
    where
        F: Fn(HookContext) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = AppResult<HookUpdate>> + Send + 'static,
    {
        Self {
            handler: Arc::new(move |ctx| Box::pin(handler(ctx))),
        }
    }

    /// Wraps a closure into an `Arc<dyn LifecycleHook>`.
    pub fn wrap<F, Fut>(handler: F) -> Arc<dyn LifecycleHook>
    where
        F: Fn(HookContext) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = AppResult<HookUpdate>> + Send + 'static,
    {
        Arc::new(Self::new(handler))
    }
}

#[async_trait]
impl LifecycleHook for ClosureHook {
    async fn handle(&self, ctx: HookContext) -> AppResult<HookUpdate> {
        (self.handler)(ctx).await
    }
}
