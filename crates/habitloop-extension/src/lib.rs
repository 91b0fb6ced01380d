//! # habitloop-extension
//!
//! Extension framework for HabitLoop. Provides:
//!
//! - Extension descriptors with named lifecycle hooks, endpoints, and
//!   health probes
//! - A fluent builder plus a namespace-scoped data manager
//! - An append-only extension registry with kind-based resolution
//! - A lifecycle event dispatcher with per-hook failure isolation,
//!   deadlines, and per-habit serialization
//! - An integration merge engine producing one atomic write set per
//!   dispatch
//! - A health aggregator for operational monitoring

pub mod builder;
pub mod data;
pub mod descriptor;
pub mod dispatcher;
pub mod health;
pub mod hook;
pub mod merger;
pub mod registry;
pub mod store;

pub use builder::ExtensionBuilder;
pub use data::DataManager;
pub use descriptor::{
    ClosureEndpoint, ClosureProbe, ExtensionDescriptor, ExtensionEndpoint, HealthProbe, ALL_KINDS,
};
pub use dispatcher::{DispatchOutcome, EventDispatcher};
pub use health::{ExtensionHealth, HealthAggregator, HealthReport, HealthStatus};
pub use hook::{ClosureHook, HookContext, HookUpdate, LifecycleHook};
pub use merger::IntegrationMerger;
pub use registry::ExtensionRegistry;
pub use store::{IntegrationStore, IntegrationWrite, MemoryIntegrationStore, WriteOp, WriteSet};
