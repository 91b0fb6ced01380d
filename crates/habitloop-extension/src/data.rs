//! Namespace-scoped data access for extensions.
//!
//! Every hook receives a [`DataManager`] bound to its own extension's
//! namespace. Reads only see the extension's own blob; writes are expressed
//! as [`HookUpdate`] values with fully qualified paths built here, so hook
//! bodies never hardcode the `integrations.` prefix or another extension's
//! key.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use habitloop_core::result::AppResult;
use habitloop_core::types::HabitId;

use crate::hook::HookUpdate;
use crate::store::IntegrationStore;

/// Root key of the per-habit extension state object.
pub const INTEGRATIONS_KEY: &str = "integrations";

/// Data access scoped to one extension's namespace.
#[derive(Clone)]
pub struct DataManager {
    /// The owning extension's name.
    namespace: String,
    /// Shared integration store handle.
    store: Arc<dyn IntegrationStore>,
}

impl std::fmt::Debug for DataManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataManager")
            .field("namespace", &self.namespace)
            .finish()
    }
}

impl DataManager {
    /// Creates a data manager bound to an extension namespace.
    pub fn new(namespace: impl Into<String>, store: Arc<dyn IntegrationStore>) -> Self {
        Self {
            namespace: namespace.into(),
            store,
        }
    }

    /// The extension name this manager is scoped to.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Builds the fully qualified path for a field in this namespace.
    pub fn path(&self, field: &str) -> String {
        format!("{INTEGRATIONS_KEY}.{}.{field}", self.namespace)
    }

    /// Reads this extension's namespace content for a habit.
    pub async fn read(&self, habit_id: HabitId) -> AppResult<Option<Value>> {
        self.store.load(habit_id, &self.namespace).await
    }

    /// Builds a [`HookUpdate::Seed`] replacing the namespace content.
    pub fn seed(&self, blob: Value) -> HookUpdate {
        HookUpdate::Seed(blob)
    }

    /// Starts a patch of individual fields in this namespace.
    pub fn patch(&self) -> PatchBuilder<'_> {
        PatchBuilder {
            manager: self,
            fields: HashMap::new(),
        }
    }
}

/// Accumulates field-sets for one [`HookUpdate::Patch`].
#[derive(Debug)]
pub struct PatchBuilder<'a> {
    /// The owning data manager (for path qualification).
    manager: &'a DataManager,
    /// Fully qualified path → value.
    fields: HashMap<String, Value>,
}

impl PatchBuilder<'_> {
    /// Sets a field at a namespace-relative dotted path.
    pub fn set(mut self, field: &str, value: Value) -> Self {
        self.fields.insert(self.manager.path(field), value);
        self
    }

    /// Finishes the patch.
    ///
    /// An empty patch collapses to [`HookUpdate::None`].
    pub fn build(self) -> HookUpdate {
        if self.fields.is_empty() {
            HookUpdate::None
        } else {
            HookUpdate::Patch(self.fields)
        }
    }
}
