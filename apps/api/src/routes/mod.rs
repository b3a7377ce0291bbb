pub mod health;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::state::AppState;
use crate::{admin, applications, auth, jobs, matching, resumes, subscriptions};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Identity
        .route("/api/v1/auth/signup", post(auth::handlers::handle_sign_up))
        .route("/api/v1/auth/signin", post(auth::handlers::handle_sign_in))
        .route("/api/v1/auth/signout", post(auth::handlers::handle_sign_out))
        .route("/api/v1/auth/session", get(auth::handlers::handle_session))
        .route("/api/v1/profiles/:id", get(auth::handlers::handle_get_profile))
        // Job board
        .route(
            "/api/v1/jobs",
            get(jobs::handlers::handle_list_jobs).post(jobs::handlers::handle_create_job),
        )
        .route(
            "/api/v1/jobs/describe",
            post(jobs::handlers::handle_describe_job),
        )
        .route("/api/v1/jobs/:id", get(jobs::handlers::handle_get_job))
        .route(
            "/api/v1/jobs/:id/apply",
            post(applications::handlers::handle_apply),
        )
        // Candidate matching
        .route(
            "/api/v1/jobs/:id/candidates",
            get(matching::handlers::handle_list_candidates),
        )
        .route(
            "/api/v1/jobs/:id/rank",
            post(matching::handlers::handle_rank_candidates),
        )
        .route("/api/v1/match/analyze", post(matching::handlers::handle_analyze))
        // Applications
        .route(
            "/api/v1/applications",
            get(applications::handlers::handle_history),
        )
        .route(
            "/api/v1/applications/:id/status",
            patch(applications::handlers::handle_update_status),
        )
        // Resume builder
        .route(
            "/api/v1/resumes",
            get(resumes::handlers::handle_list_resumes).post(resumes::handlers::handle_save_resume),
        )
        .route("/api/v1/resumes/summary", post(resumes::handlers::handle_summary))
        .route(
            "/api/v1/resumes/optimize",
            post(resumes::handlers::handle_optimize),
        )
        // Subscriptions
        .route("/api/v1/plans", get(subscriptions::handlers::handle_list_plans))
        .route(
            "/api/v1/subscriptions",
            post(subscriptions::handlers::handle_upgrade),
        )
        .route(
            "/api/v1/subscriptions/current",
            get(subscriptions::handlers::handle_current),
        )
        .route(
            "/api/v1/subscriptions/cancel",
            post(subscriptions::handlers::handle_cancel),
        )
        // Admin
        .route("/api/v1/admin/import", post(admin::handlers::handle_import))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    use crate::test_support::{test_config, test_state, RejectingAuth};

    fn test_router() -> Router {
        let db = PgPoolOptions::new()
            .connect_lazy(&test_config().database_url)
            .unwrap();
        build_router(test_state(db, Arc::new(RejectingAuth)))
    }

    async fn send(request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = test_router().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(get_request("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["service"], "hiregen-api");
        assert_eq!(body["ai_enabled"], false);
        assert_eq!(body["scorer"], "simulated");
    }

    #[tokio::test]
    async fn test_plans_are_public() {
        let (status, body) = send(get_request("/api/v1/plans?target=SEEKER")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().map(Vec::len), Some(3));
        assert_eq!(body[1]["id"], "resume-pro");
    }

    #[tokio::test]
    async fn test_protected_route_requires_bearer() {
        let (status, body) = send(get_request("/api/v1/applications")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn test_rejected_token_is_unauthorized() {
        let request = Request::builder()
            .uri("/api/v1/subscriptions/current")
            .header("Authorization", "Bearer expired-token")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let (status, _) = send(get_request("/api/v1/nope")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
