//! Integration state persistence contract and the in-memory implementation.
//!
//! Each habit record carries an `integrations` object keyed by extension
//! name. The store applies one [`WriteSet`] per dispatch as a single
//! transaction: either every write from the dispatch lands, or none does.

use std::collections::HashMap;

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::{Map, Value};

use habitloop_core::error::AppError;
use habitloop_core::result::AppResult;
use habitloop_core::types::HabitId;

/// A single extension's write within a dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct IntegrationWrite {
    /// The extension owning the namespace being written.
    pub extension: String,
    /// The operation to apply under `integrations.<extension>`.
    pub op: WriteOp,
}

/// Operation applied to one extension namespace.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    /// Replace the namespace content with this blob.
    Replace(Value),
    /// Set fields at namespace-relative dotted paths.
    SetFields(Vec<(String, Value)>),
}

/// All writes produced by one dispatch against one habit.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteSet {
    /// The habit whose integration state is written.
    pub habit_id: HabitId,
    /// Per-extension writes, in registration order.
    pub writes: Vec<IntegrationWrite>,
}

impl WriteSet {
    /// Whether this write set carries no writes.
    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }
}

/// Persistence seam for per-habit integration state.
///
/// The surrounding application implements this against its own database;
/// [`MemoryIntegrationStore`] ships for tests and the host binary.
#[async_trait]
pub trait IntegrationStore: Send + Sync {
    /// Loads one extension's namespace content for a habit.
    async fn load(&self, habit_id: HabitId, namespace: &str) -> AppResult<Option<Value>>;

    /// Applies a write set atomically: all writes or none.
    async fn apply(&self, write_set: &WriteSet) -> AppResult<()>;

    /// Removes all integration records of a habit (habit deletion).
    async fn remove_entity(&self, habit_id: HabitId) -> AppResult<()>;
}

/// Sets `value` at a dotted `path` inside a namespace object, creating
/// missing intermediate objects.
///
/// Fails when an existing intermediate is not an object — overwriting a
/// scalar with an object implicitly would corrupt sibling state.
fn set_field(root: &mut Map<String, Value>, path: &str, value: Value) -> AppResult<()> {
    let mut segments = path.split('.').peekable();
    let mut current = root;

    while let Some(segment) = segments.next() {
        if segment.is_empty() {
            return Err(AppError::merge(format!("Empty segment in path '{path}'")));
        }

        if segments.peek().is_none() {
            current.insert(segment.to_string(), value);
            return Ok(());
        }

        let next = current
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));

        current = next.as_object_mut().ok_or_else(|| {
            AppError::merge(format!(
                "Path '{path}' traverses non-object field '{segment}'"
            ))
        })?;
    }

    Err(AppError::merge(format!("Empty path '{path}'")))
}

/// In-memory integration store backed by a [`DashMap`].
#[derive(Debug, Default)]
pub struct MemoryIntegrationStore {
    /// Habit ID → extension name → namespace content.
    entities: DashMap<HabitId, HashMap<String, Value>>,
}

impl MemoryIntegrationStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self {
            entities: DashMap::new(),
        }
    }

    /// Returns a snapshot of a habit's full `integrations` object.
    pub fn integrations(&self, habit_id: HabitId) -> HashMap<String, Value> {
        self.entities
            .get(&habit_id)
            .map(|e| e.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl IntegrationStore for MemoryIntegrationStore {
    async fn load(&self, habit_id: HabitId, namespace: &str) -> AppResult<Option<Value>> {
        Ok(self
            .entities
            .get(&habit_id)
            .and_then(|e| e.get(namespace).cloned()))
    }

    async fn apply(&self, write_set: &WriteSet) -> AppResult<()> {
        let mut entry = self.entities.entry(write_set.habit_id).or_default();

        // Stage against a copy so a failing write leaves the committed
        // state untouched.
        let mut staged = entry.clone();

        for write in &write_set.writes {
            match &write.op {
                WriteOp::Replace(blob) => {
                    staged.insert(write.extension.clone(), blob.clone());
                }
                WriteOp::SetFields(fields) => {
                    let namespace = staged
                        .entry(write.extension.clone())
                        .or_insert_with(|| Value::Object(Map::new()));

                    let object = namespace.as_object_mut().ok_or_else(|| {
                        AppError::merge(format!(
                            "Namespace '{}' holds a non-object value",
                            write.extension
                        ))
                    })?;

                    for (path, value) in fields {
                        set_field(object, path, value.clone())?;
                    }
                }
            }
        }

        *entry = staged;
        Ok(())
    }

    async fn remove_entity(&self, habit_id: HabitId) -> AppResult<()> {
        self.entities.remove(&habit_id);
        Ok(())
    }
}
