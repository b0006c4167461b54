mod console;
mod errors;
mod models;
mod notify;
mod panel;
mod prefs;
mod projection;
mod remote;
mod seed;
mod store;
mod validation;

pub use console::ConsoleCore;
pub use errors::{AppError, AppResult};
pub use models::{
    EditForm, Lead, LeadPatch, LeadStatus, Notification, Opportunity, OpportunityStage, SortKey,
    StatusFilter, UiPreferences,
};
pub use notify::Notifier;
pub use panel::DetailPanel;
pub use prefs::PreferenceStore;
pub use projection::project;
pub use remote::{
    RemoteFuture, RemoteService, SimulatedRemote, DEFAULT_FAILURE_RATE, NETWORK_ERROR_MESSAGE,
};
pub use seed::seed_leads;
pub use store::{LeadStore, OpportunityStore};
pub use validation::{is_valid_email, validate_email};

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;

static LOG_GUARD: std::sync::OnceLock<WorkerGuard> = std::sync::OnceLock::new();

/// Structured JSON logging into a daily-rolling file under the console data
/// directory. Safe to call once per process; the embedding shell decides when.
pub fn init_tracing(data_dir: &Path) -> AppResult<()> {
    let log_dir = data_dir.join("logs");
    std::fs::create_dir_all(&log_dir)?;
    let file_appender = tracing_appender::rolling::daily(log_dir, "console.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let _ = LOG_GUARD.set(guard);

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .json()
        .with_writer(non_blocking)
        .try_init()
        .map_err(|error| AppError::Internal(error.to_string()))
}
