use std::sync::Arc;

use axum::{Router, routing::get};
use tokio::net::TcpListener;

use crate::{AppConfig, AuthError, TikTokClient, routes};

/// Shared state for the route handlers: configuration plus one reqwest
/// client reused across requests.
#[derive(Clone)]
pub struct AppState {
    config: Arc<AppConfig>,
    client: TikTokClient,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self, AuthError> {
        let client = TikTokClient::new(config.endpoints.clone())?;
        Ok(Self {
            config: Arc::new(config),
            client,
        })
    }

    pub fn with_client(config: AppConfig, client: TikTokClient) -> Self {
        Self {
            config: Arc::new(config),
            client,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn client(&self) -> &TikTokClient {
        &self.client
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/auth/tiktok/login", get(routes::login))
        .route("/api/auth/callback/tiktok", get(routes::callback))
        .route("/api/tiktok/user", get(routes::get_user))
        .route("/api/tiktok/videos", get(routes::list_videos))
        .with_state(state)
}

pub async fn serve(listener: TcpListener, state: AppState) -> Result<(), AuthError> {
    axum::serve(listener, router(state))
        .await
        .map_err(AuthError::from)
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use super::*;

    #[tokio::test]
    async fn login_with_no_configuration_fails_the_request_only() {
        let router = router(AppState::new(AppConfig::default()).unwrap());
        let response = router
            .oneshot(
                Request::get("/auth/tiktok/login")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn callback_without_base_url_cannot_redirect() {
        let router = router(AppState::new(AppConfig::default()).unwrap());
        let response = router
            .oneshot(
                Request::get("/api/auth/callback/tiktok?code=x&state=y")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn user_endpoint_requires_a_session_key() {
        let router = router(AppState::new(AppConfig::default()).unwrap());
        let response = router
            .oneshot(Request::get("/api/tiktok/user").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
