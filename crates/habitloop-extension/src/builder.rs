//! Fluent construction of extension descriptors.

use std::sync::Arc;

use serde_json::Value;

use habitloop_core::error::AppError;
use habitloop_core::events::EventKind;
use habitloop_core::result::AppResult;

use crate::descriptor::{ExtensionDescriptor, ExtensionEndpoint, HealthProbe, ALL_KINDS};
use crate::hook::{ClosureHook, HookContext, HookUpdate, LifecycleHook};

/// Fluent builder for [`ExtensionDescriptor`].
///
/// A pure convenience layer: descriptors built by hand and via the builder
/// are behaviorally identical. The builder only assembles the same plain
/// data contract with less ceremony.
#[derive(Debug)]
pub struct ExtensionBuilder {
    /// The descriptor under construction.
    descriptor: ExtensionDescriptor,
}

impl ExtensionBuilder {
    /// Starts building an extension with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            descriptor: ExtensionDescriptor::new(name),
        }
    }

    /// Sets version, description, and author.
    pub fn metadata(
        mut self,
        version: impl Into<String>,
        description: impl Into<String>,
        author: impl Into<String>,
    ) -> Self {
        self.descriptor.version = version.into();
        self.descriptor.description = description.into();
        self.descriptor.author = author.into();
        self
    }

    /// Scopes the extension to specific habit-kind tags.
    ///
    /// Without this call the extension observes every kind.
    pub fn for_kinds<I, S>(mut self, kinds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.descriptor.supported_kinds = kinds.into_iter().map(Into::into).collect();
        self
    }

    /// Sets one configuration value.
    pub fn config(mut self, key: impl Into<String>, value: Value) -> Self {
        self.descriptor.config.insert(key.into(), value);
        self
    }

    /// Registers a hook for an event kind.
    ///
    /// A later call for the same kind replaces the earlier hook.
    pub fn on(mut self, kind: EventKind, hook: Arc<dyn LifecycleHook>) -> Self {
        self.descriptor.hooks.insert(kind, hook);
        self
    }

    /// Registers a closure hook for `Created` events.
    pub fn on_created<F, Fut>(self, handler: F) -> Self
    where
        F: Fn(HookContext) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = AppResult<HookUpdate>> + Send + 'static,
    {
        self.on(EventKind::Created, ClosureHook::wrap(handler))
    }

    /// Registers a closure hook for `Completed` events.
    pub fn on_completed<F, Fut>(self, handler: F) -> Self
    where
        F: Fn(HookContext) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = AppResult<HookUpdate>> + Send + 'static,
    {
        self.on(EventKind::Completed, ClosureHook::wrap(handler))
    }

    /// Registers a closure hook for `Updated` events.
    pub fn on_updated<F, Fut>(self, handler: F) -> Self
    where
        F: Fn(HookContext) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = AppResult<HookUpdate>> + Send + 'static,
    {
        self.on(EventKind::Updated, ClosureHook::wrap(handler))
    }

    /// Registers a closure hook for `Deleted` events.
    pub fn on_deleted<F, Fut>(self, handler: F) -> Self
    where
        F: Fn(HookContext) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = AppResult<HookUpdate>> + Send + 'static,
    {
        self.on(EventKind::Deleted, ClosureHook::wrap(handler))
    }

    /// Registers a named endpoint.
    pub fn endpoint(mut self, name: impl Into<String>, endpoint: Arc<dyn ExtensionEndpoint>) -> Self {
        self.descriptor.endpoints.insert(name.into(), endpoint);
        self
    }

    /// Registers a health probe.
    pub fn health_check(mut self, probe: Arc<dyn HealthProbe>) -> Self {
        self.descriptor.health_check = Some(probe);
        self
    }

    /// Finishes the descriptor.
    ///
    /// Fails when the name is empty; defaults the kind scope to `{"all"}`
    /// when none was set.
    pub fn build(mut self) -> AppResult<ExtensionDescriptor> {
        if self.descriptor.name.trim().is_empty() {
            return Err(AppError::registration(
                "Extension descriptor requires a non-empty name",
            ));
        }

        if self.descriptor.supported_kinds.is_empty() {
            self.descriptor
                .supported_kinds
                .insert(ALL_KINDS.to_string());
        }

        Ok(self.descriptor)
    }
}
