//! HabitLoop extension host.
//!
//! Boots the extension runtime the way the surrounding application does:
//! loads configuration, registers the shipped extensions (fatal on
//! registration failure), runs a health sweep, and exercises one habit
//! lifecycle as a wiring self-check before exiting.

use std::sync::Arc;

use tracing;
use tracing_subscriber::{fmt, EnvFilter};

use extension_streaks::StreaksExtension;
use extension_weight_insights::WeightInsightsExtension;
use habitloop_core::config::AppConfig;
use habitloop_core::error::AppError;
use habitloop_core::events::LifecycleEvent;
use habitloop_core::types::{CompletionEntry, Habit, HabitKind, UserId};
use habitloop_extension::{
    EventDispatcher, ExtensionRegistry, HealthAggregator, IntegrationStore, MemoryIntegrationStore,
};

#[tokio::main]
async fn main() {
    let env = std::env::var("HABITLOOP_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Extension host error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main host run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!(
        "Starting HabitLoop extension host v{}",
        env!("CARGO_PKG_VERSION")
    );

    // ── Step 1: Integration store ────────────────────────────────
    let store = Arc::new(MemoryIntegrationStore::new());
    let store_handle: Arc<dyn IntegrationStore> = store.clone();

    // ── Step 2: Registry + shipped extensions ────────────────────
    // Registration failures are fatal: the process must not come up
    // with a half-registered extension set.
    let registry = Arc::new(ExtensionRegistry::new());
    registry.register(StreaksExtension::descriptor()?).await?;
    registry
        .register(WeightInsightsExtension::descriptor()?)
        .await?;
    tracing::info!(
        extensions = ?registry.names().await,
        "Extensions registered"
    );

    // ── Step 3: Dispatcher + health aggregator ───────────────────
    let dispatcher = EventDispatcher::new(
        Arc::clone(&registry),
        Arc::clone(&store_handle),
        &config.extensions,
    );
    let health = HealthAggregator::new(Arc::clone(&registry), &config.extensions);

    // ── Step 4: Health sweep ─────────────────────────────────────
    let report = health.check_all().await;
    tracing::info!(
        overall = %report.overall,
        report = %serde_json::to_string(&report).unwrap_or_default(),
        "Extension health"
    );

    // ── Step 5: Lifecycle self-check ─────────────────────────────
    let user = UserId::new();
    let habit = Habit::new(user, "Morning weigh in", HabitKind::Weight);

    let outcome = dispatcher
        .dispatch(LifecycleEvent::Created {
            habit: habit.clone(),
            user,
        })
        .await;
    tracing::info!(applied = ?outcome.applied, "Created dispatch complete");

    let entry = CompletionEntry::new(habit.id).with_value(81.4);
    let outcome = dispatcher
        .dispatch(LifecycleEvent::Completed {
            habit: habit.clone(),
            entry,
            user,
        })
        .await;
    tracing::info!(applied = ?outcome.applied, "Completed dispatch complete");

    let integrations = store.integrations(habit.id);
    tracing::info!(
        habit = %habit.id,
        integrations = %serde_json::to_string(&integrations).unwrap_or_default(),
        "Integration state after self-check"
    );

    tracing::info!("HabitLoop extension host finished");
    Ok(())
}
