use crate::portal::RuntimeApi;
use dockrun_shared::errors::{DockrunError, DockrunResult};

/// Fetch the running containers and log each id.
///
/// Any runtime failure surfaces as [`DockrunError::List`].
pub(crate) async fn report_running(runtime: &dyn RuntimeApi) -> DockrunResult<Vec<String>> {
    let ids = runtime.list_containers().await.map_err(|e| match e {
        DockrunError::List(_) => e,
        other => DockrunError::List(other.to_string()),
    })?;

    if ids.is_empty() {
        tracing::info!("There are no containers running");
    } else {
        for id in &ids {
            tracing::info!(container_id = %id, "{}", id);
        }
    }

    Ok(ids)
}
