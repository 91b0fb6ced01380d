//! Extension descriptors — the plain data contract every extension fulfils.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use habitloop_core::events::EventKind;
use habitloop_core::result::AppResult;

use crate::data::DataManager;
use crate::health::HealthStatus;
use crate::hook::LifecycleHook;

/// Wildcard kind tag: the extension observes habits of every kind.
pub const ALL_KINDS: &str = "all";

/// Descriptor of one registered extension.
///
/// Built once at process start (by hand or via
/// [`ExtensionBuilder`](crate::builder::ExtensionBuilder) — the two are
/// behaviorally identical), registered, and immutable thereafter.
#[derive(Clone)]
pub struct ExtensionDescriptor {
    /// Unique extension name; also the namespace key under `integrations`.
    pub name: String,
    /// Extension version string.
    pub version: String,
    /// Human-readable description.
    pub description: String,
    /// Author or maintainer.
    pub author: String,
    /// Habit-kind tags this extension observes; `{"all"}` observes every
    /// kind. Defaults to `{"all"}` when left empty.
    pub supported_kinds: HashSet<String>,
    /// Opaque extension configuration.
    pub config: HashMap<String, Value>,
    /// Lifecycle hooks, keyed by event kind.
    pub hooks: HashMap<EventKind, Arc<dyn LifecycleHook>>,
    /// Named callable extras exposed by this extension.
    pub endpoints: HashMap<String, Arc<dyn ExtensionEndpoint>>,
    /// Optional health probe.
    pub health_check: Option<Arc<dyn HealthProbe>>,
}

impl std::fmt::Debug for ExtensionDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtensionDescriptor")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("supported_kinds", &self.supported_kinds)
            .field("hooks", &self.hook_kinds())
            .field("endpoints", &self.endpoints.keys().collect::<Vec<_>>())
            .field("health_check", &self.health_check.is_some())
            .finish()
    }
}

impl ExtensionDescriptor {
    /// Creates a minimal descriptor with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: "0.0.0".to_string(),
            description: String::new(),
            author: String::new(),
            supported_kinds: HashSet::new(),
            config: HashMap::new(),
            hooks: HashMap::new(),
            endpoints: HashMap::new(),
            health_check: None,
        }
    }

    /// Whether this extension observes habits with the given kind tag.
    pub fn supports(&self, kind_tag: &str) -> bool {
        self.supported_kinds.contains(ALL_KINDS) || self.supported_kinds.contains(kind_tag)
    }

    /// The hook registered for an event kind, if any.
    pub fn hook(&self, kind: EventKind) -> Option<Arc<dyn LifecycleHook>> {
        self.hooks.get(&kind).cloned()
    }

    /// The event kinds this extension hooks, in lifecycle order.
    pub fn hook_kinds(&self) -> Vec<EventKind> {
        EventKind::all()
            .into_iter()
            .filter(|kind| self.hooks.contains_key(kind))
            .collect()
    }

    /// A configuration value by key.
    pub fn config_value(&self, key: &str) -> Option<&Value> {
        self.config.get(key)
    }
}

/// Trait for extension endpoint implementations.
///
/// Endpoints are named callables an extension exposes beyond its lifecycle
/// hooks (e.g. a summary read). The surrounding application decides how to
/// surface them; the core only stores and invokes them.
#[async_trait]
pub trait ExtensionEndpoint: Send + Sync {
    /// Invokes the endpoint with namespace-scoped data access.
    async fn call(&self, data: DataManager, args: Value) -> AppResult<Value>;
}

/// A closure-based endpoint.
pub struct ClosureEndpoint {
    /// Endpoint function.
    handler: Arc<
        dyn Fn(
                DataManager,
                Value,
            )
                -> std::pin::Pin<Box<dyn std::future::Future<Output = AppResult<Value>> + Send>>
            + Send
            + Sync,
    >,
}

impl std::fmt::Debug for ClosureEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClosureEndpoint")
            .field("handler", &"<closure>")
            .finish()
    }
}

impl ClosureEndpoint {
    /// Creates a new closure-based endpoint.
    pub fn new<F, Fut>(handler: F) -> Self
    where
        F: Fn(DataManager, Value) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = AppResult<Value>> + Send + 'static,
    {
        Self {
            handler: Arc::new(move |data, args| Box::pin(handler(data, args))),
        }
    }

    /// Wraps a closure into an `Arc<dyn ExtensionEndpoint>`.
    pub fn wrap<F, Fut>(handler: F) -> Arc<dyn ExtensionEndpoint>
    where
        F: Fn(DataManager, Value) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = AppResult<Value>> + Send + 'static,
    {
        Arc::new(Self::new(handler))
    }
}

#[async_trait]
impl ExtensionEndpoint for ClosureEndpoint {
    async fn call(&self, data: DataManager, args: Value) -> AppResult<Value> {
        (self.handler)(data, args).await
    }
}

/// Trait for extension health probes.
#[async_trait]
pub trait HealthProbe: Send + Sync {
    /// Probes the extension's health.
    ///
    /// Returning an error reports the extension as unhealthy; the error is
    /// surfaced in the health report, never propagated further.
    async fn check(&self) -> AppResult<HealthStatus>;
}

/// A closure-based health probe.
pub struct ClosureProbe {
    /// Probe function.
    handler: Arc<
        dyn Fn() -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<HealthStatus>> + Send>,
            > + Send
            + Sync,
    >,
}

impl std::fmt::Debug for ClosureProbe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClosureProbe")
            .field("handler", &"<closure>")
            .finish()
    }
}

impl ClosureProbe {
    /// Creates a new closure-based probe.
    pub fn new<F, Fut>(handler: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = AppResult<HealthStatus>> + Send + 'static,
    {
        Self {
            handler: Arc::new(move || Box::pin(handler())),
        }
    }

    /// Wraps a closure into an `Arc<dyn HealthProbe>`.
    pub fn wrap<F, Fut>(handler: F) -> Arc<dyn HealthProbe>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = AppResult<HealthStatus>> + Send + 'static,
    {
        Arc::new(Self::new(handler))
    }
}

#[async_trait]
impl HealthProbe for ClosureProbe {
    async fn check(&self) -> AppResult<HealthStatus> {
        (self.handler)().await
    }
}
