use super::handlers::{self, ApiState};
use axum::routing::{get, post};
use axum::Router;

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/requests/pending", get(handlers::get_pending_requests))
        .route("/requests/incoming", get(handlers::get_incoming_requests))
        .route("/requests/tagging", post(handlers::post_tagging_request))
        .route(
            "/requests/{request_id}/{decision}",
            post(handlers::post_request_decision),
        )
        .route(
            "/events/{event_id}/team-requests",
            post(handlers::post_team_request),
        )
        .route(
            "/events/{event_id}/ownership-claims",
            post(handlers::post_ownership_claim),
        )
        .route(
            "/team-members",
            post(handlers::post_team_member).delete(handlers::delete_team_member),
        )
        .route("/tags", axum::routing::delete(handlers::delete_tag))
        .route("/notifications", get(handlers::get_notifications))
        .route(
            "/notifications/dismiss-all",
            post(handlers::post_dismiss_all_notifications),
        )
        .route(
            "/notifications/{notification_id}/url",
            get(handlers::get_notification_url),
        )
        .route(
            "/notifications/{notification_id}/dismiss",
            post(handlers::post_dismiss_notification),
        )
        .route("/jobs/bulk-tag", post(handlers::post_bulk_tag_job))
        .route("/jobs/{job_id}", get(handlers::get_job))
        .fallback(handlers::fallback)
        .with_state(state)
}

/// Serves the API until the listener fails.
pub async fn serve(state: ApiState, addr: &str) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "api listening");
    axum::serve(listener, router(state)).await
}
