//! The in-guest HTTP agent server (C1): a single-tenant axum service
//! exposing execution, observation, file, UI-tree, and evaluator-probe
//! endpoints to the episode engine's guest client (§4.1).

pub mod a11y;
pub mod error;
pub mod platform;
pub mod routes;
pub mod state;

pub use routes::router;
pub use state::AppState;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn probe_reports_ready() {
        let state = AppState::new(std::env::temp_dir().join("deskarena-guest-test"), (1920, 1080));
        let app = router(state);
        let response = app.oneshot(Request::builder().uri("/probe").body(Body::empty()).unwrap()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn unknown_setup_primitive_is_not_found() {
        let state = AppState::new(std::env::temp_dir().join("deskarena-guest-test-2"), (1920, 1080));
        let app = router(state);
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/setup/not_a_real_primitive")
                    .header("content-type", "application/json")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn file_exists_reflects_the_filesystem() {
        let state = AppState::new(std::env::temp_dir().join("deskarena-guest-test-3"), (1920, 1080));
        let app = router(state);
        let body = serde_json::json!({ "file_path": "/definitely/not/a/real/path" }).to_string();
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/file_exists")
                    .header("content-type", "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
