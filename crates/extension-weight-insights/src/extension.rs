//! Weight insights extension descriptor assembly.

use std::sync::Arc;

use serde_json::json;

use habitloop_core::events::EventKind;
use habitloop_core::result::AppResult;
use habitloop_extension::{ClosureProbe, ExtensionBuilder, ExtensionDescriptor, HealthStatus};

use crate::hooks::{RecordMeasurementHook, RenameAuditHook, SeedInsightsHook};

/// The extension's registered name and integration namespace.
pub const EXTENSION_NAME: &str = "weight-insights";

/// Default bound on the trend window.
pub const DEFAULT_MAX_TREND_POINTS: usize = 30;

/// Measurement statistics extension for weight habits.
#[derive(Debug)]
pub struct WeightInsightsExtension;

impl WeightInsightsExtension {
    /// Builds the extension descriptor with the default trend window.
    pub fn descriptor() -> AppResult<ExtensionDescriptor> {
        Self::descriptor_with(DEFAULT_MAX_TREND_POINTS)
    }

    /// Builds the extension descriptor with a custom trend window bound.
    pub fn descriptor_with(max_trend_points: usize) -> AppResult<ExtensionDescriptor> {
        ExtensionBuilder::new(EXTENSION_NAME)
            .metadata(
                "1.0.0",
                "Rolling measurement statistics for weight habits",
                "HabitLoop Team",
            )
            .for_kinds(["weight"])
            .config("max_trend_points", json!(max_trend_points))
            .on(EventKind::Created, Arc::new(SeedInsightsHook))
            .on(
                EventKind::Completed,
                Arc::new(RecordMeasurementHook { max_trend_points }),
            )
            .on(EventKind::Updated, Arc::new(RenameAuditHook))
            .health_check(ClosureProbe::wrap(move || async move {
                // A zero-sized window silently drops every measurement.
                if max_trend_points == 0 {
                    Ok(HealthStatus::Degraded)
                } else {
                    Ok(HealthStatus::Healthy)
                }
            }))
            .build()
    }
}
