use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Ping the installed quiz store and report whether the server is degraded.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    match state.require_quiz_store().await {
        Ok(store) => {
            if let Err(err) = store.health_check().await {
                warn!(error = %err, "quiz store health check failed");
                state.update_degraded(true);
            }
        }
        Err(_) => warn!("quiz store unavailable (degraded mode)"),
    }

    if state.is_degraded() {
        HealthResponse::degraded()
    } else {
        HealthResponse::ok()
    }
}
