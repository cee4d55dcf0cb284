//! Detached execution for async-accepted mutations.

use std::future::Future;

use serde_json::Value;
use uuid::Uuid;

use crate::backend::BackendError;

/// Run `work` past the lifetime of the triggering request.
///
/// Returns the task id handed to the caller. The outcome is only logged.
pub fn spawn_detached<F>(label: &'static str, work: F) -> String
where
    F: Future<Output = Result<Value, BackendError>> + Send + 'static,
{
    let task_id = Uuid::new_v4().to_string();
    let id = task_id.clone();
    tokio::spawn(async move {
        match work.await {
            Ok(_) => tracing::info!("[TASK] {} {} completed", label, id),
            Err(e) => tracing::error!("[TASK] {} {} failed: {}", label, id, e),
        }
    });
    task_id
}
