//! Integration merge engine — turns collected hook updates into one
//! atomic write set.

use tracing::warn;

use habitloop_core::types::HabitId;

use crate::data::INTEGRATIONS_KEY;
use crate::hook::HookUpdate;
use crate::store::{IntegrationWrite, WriteOp, WriteSet};

/// Merges per-extension hook updates into a [`WriteSet`].
///
/// `Seed` replaces the extension's namespace wholesale; `Patch` entries are
/// independent field-sets anchored under `integrations.<extension>.`. A
/// patch path outside the owning namespace violates the partitioning
/// contract: the offending extension's write is dropped (logged), sibling
/// writes survive. The resulting write set is applied as one transaction by
/// the store.
#[derive(Debug, Default)]
pub struct IntegrationMerger;

impl IntegrationMerger {
    /// Creates a new merger.
    pub fn new() -> Self {
        Self
    }

    /// Merges `(extension name, update)` pairs, in registration order, into
    /// one write set for the habit.
    pub fn merge(&self, habit_id: HabitId, results: Vec<(String, HookUpdate)>) -> WriteSet {
        let mut writes = Vec::new();

        for (extension, update) in results {
            match update {
                HookUpdate::None => {}
                HookUpdate::Seed(blob) => {
                    writes.push(IntegrationWrite {
                        extension,
                        op: WriteOp::Replace(blob),
                    });
                }
                HookUpdate::Patch(fields) => {
                    match Self::scope_fields(&extension, fields) {
                        Ok(fields) if fields.is_empty() => {}
                        Ok(fields) => writes.push(IntegrationWrite {
                            extension,
                            op: WriteOp::SetFields(fields),
                        }),
                        Err(path) => {
                            warn!(
                                extension = %extension,
                                path = %path,
                                "Patch path escapes the extension namespace, dropping write"
                            );
                        }
                    }
                }
            }
        }

        WriteSet { habit_id, writes }
    }

    /// Validates that every patch path stays inside the extension's own
    /// namespace and strips the `integrations.<extension>.` anchor.
    ///
    /// Returns the offending path on violation.
    fn scope_fields(
        extension: &str,
        fields: std::collections::HashMap<String, serde_json::Value>,
    ) -> Result<Vec<(String, serde_json::Value)>, String> {
        let anchor = format!("{INTEGRATIONS_KEY}.{extension}.");
        let mut scoped = Vec::with_capacity(fields.len());

        for (path, value) in fields {
            match path.strip_prefix(&anchor) {
                Some(relative) if !relative.is_empty() => {
                    scoped.push((relative.to_string(), value));
                }
                _ => return Err(path),
            }
        }

        // Field order within one patch is irrelevant (paths are
        // independent), but a stable order keeps logs and tests readable.
        scoped.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(scoped)
    }
}
