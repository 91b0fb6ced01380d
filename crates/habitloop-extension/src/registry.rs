//! Extension registry — append-only store of registered descriptors.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;

use habitloop_core::error::AppError;
use habitloop_core::result::AppResult;

use crate::descriptor::{ExtensionDescriptor, ALL_KINDS};

/// Registry of all registered extensions.
///
/// Built once at boot and injected wherever extensions are resolved; there
/// is no runtime removal and no global singleton. Registration order is
/// preserved — hooks run and merge in the order their extensions were
/// registered.
#[derive(Debug, Default)]
pub struct ExtensionRegistry {
    /// Descriptors in registration order, plus a name index.
    inner: RwLock<RegistryInner>,
}

#[derive(Debug, Default)]
struct RegistryInner {
    /// Descriptors in registration order.
    order: Vec<Arc<ExtensionDescriptor>>,
    /// Extension name → position in `order`.
    index: HashMap<String, usize>,
}

impl ExtensionRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an extension descriptor.
    ///
    /// Fails when the name is empty or already registered. Registration
    /// failures are fatal at boot: the process must not start with a
    /// half-registered extension set. An empty kind scope defaults to
    /// `{"all"}`.
    pub async fn register(&self, mut descriptor: ExtensionDescriptor) -> AppResult<()> {
        if descriptor.name.trim().is_empty() {
            return Err(AppError::registration(
                "Extension descriptor requires a non-empty name",
            ));
        }

        if descriptor.supported_kinds.is_empty() {
            descriptor.supported_kinds.insert(ALL_KINDS.to_string());
        }

        let mut inner = self.inner.write().await;

        if inner.index.contains_key(&descriptor.name) {
            return Err(AppError::registration(format!(
                "Extension '{}' is already registered",
                descriptor.name
            )));
        }

        info!(
            extension = %descriptor.name,
            version = %descriptor.version,
            hooks = descriptor.hooks.len(),
            "Extension registered"
        );

        let position = inner.order.len();
        inner.index.insert(descriptor.name.clone(), position);
        inner.order.push(Arc::new(descriptor));

        Ok(())
    }

    /// Returns all extensions observing the given habit-kind tag, in
    /// registration order.
    pub async fn resolve(&self, kind_tag: &str) -> Vec<Arc<ExtensionDescriptor>> {
        let inner = self.inner.read().await;
        inner
            .order
            .iter()
            .filter(|d| d.supports(kind_tag))
            .cloned()
            .collect()
    }

    /// Returns all registered extensions in registration order.
    pub async fn all(&self) -> Vec<Arc<ExtensionDescriptor>> {
        let inner = self.inner.read().await;
        inner.order.clone()
    }

    /// Gets an extension by name.
    pub async fn get(&self, name: &str) -> Option<Arc<ExtensionDescriptor>> {
        let inner = self.inner.read().await;
        inner.index.get(name).map(|&i| inner.order[i].clone())
    }

    /// Returns the number of registered extensions.
    pub async fn count(&self) -> usize {
        let inner = self.inner.read().await;
        inner.order.len()
    }

    /// Returns registered extension names in registration order.
    pub async fn names(&self) -> Vec<String> {
        let inner = self.inner.read().await;
        inner.order.iter().map(|d| d.name.clone()).collect()
    }
}
