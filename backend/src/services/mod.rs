//! Business logic services
//!
//! Services apply the planner's rules on top of the repositories and map
//! failures to API errors.

pub mod catalog;
pub mod export;
pub mod history;
pub mod schedule;
pub mod share;

pub use catalog::CatalogService;
pub use export::{ExportService, MarkdownExport};
pub use history::HistoryService;
pub use schedule::{Caller, ScheduleService};
pub use share::ShareService;

use crate::error::ApiError;
use crate::repositories::AccountRepository;
use crate::telemetry;
use sqlx::PgPool;
use tracing::error;
use uuid::Uuid;

/// Error mapper for a write that did not land
///
/// Logs and counts the failure under `action`, then classifies it with
/// [`ApiError::from_write`].
pub(crate) fn write_failed(
    action: &'static str,
    retry_message: &'static str,
) -> impl FnOnce(anyhow::Error) -> ApiError {
    move |e| {
        error!(action, error = ?e, "Write failed");
        telemetry::record_persist_failure(action);
        ApiError::from_write(&e, retry_message)
    }
}

/// Mirror the caller's account so shares can find it by email
pub(crate) async fn mirror_account(
    pool: &PgPool,
    account_id: Uuid,
    email: Option<&str>,
) -> Result<(), ApiError> {
    AccountRepository::upsert(pool, account_id, email)
        .await
        .map_err(write_failed("upsert_account", "Failed to save your account; please retry"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_failed_names_retry() {
        let mapped = write_failed("share", "Failed to share schedule; please retry")(anyhow::anyhow!(
            "connection reset"
        ));
        match mapped {
            ApiError::PersistFailed(message) => assert_eq!(message, "Failed to share schedule; please retry"),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
