use axum::Json;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::SignedCookieJar;
use serde::Deserialize;
use serde_json::json;
use url::Url;

use crate::session::{self, CSRF_COOKIE, SessionContext, SessionWriter};
use crate::{AppState, AuthError, ErrorCode, StateToken, UserProfile};

const LANDING_PATH: &str = "/tiktok";
const ERROR_PATH: &str = "/auth/error";

/// Start a login attempt: mint an anti-forgery token, bind it to the browser
/// via the `csrfState` cookie, and redirect to TikTok's authorization page.
pub(crate) async fn login(State(app): State<AppState>, headers: HeaderMap) -> Response {
    let config = app.config();
    let key = match config.session_key() {
        Ok(key) => key,
        Err(err) => return config_error(err),
    };
    let (client_key, redirect_uri) = match config.login_credentials() {
        Ok(credentials) => credentials,
        Err(err) => return config_error(err),
    };

    let token = match StateToken::generate() {
        Ok(token) => token,
        Err(err) => {
            tracing::error!(error = %err, "failed to mint anti-forgery token");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to start login." })),
            )
                .into_response();
        }
    };

    let authorize_url =
        app.client()
            .authorization_url(client_key, redirect_uri, &config.scope, token.as_str());

    let jar = SignedCookieJar::from_headers(&headers, key);
    let mut writer = SessionWriter::new(config.secure_cookies());
    writer.set_csrf_state(token.as_str());

    (writer.commit(jar), Redirect::to(&authorize_url)).into_response()
}

#[derive(Debug, Deserialize)]
pub(crate) struct CallbackParams {
    code: Option<String>,
    state: Option<String>,
}

/// OAuth callback: validate the anti-forgery token, exchange the code for a
/// token grant, fetch the profile, and commit the session cookies.
///
/// The anti-forgery cookie is single-use and removed on every outcome. All
/// session-cookie writes are buffered and committed only on full success.
pub(crate) async fn callback(
    State(app): State<AppState>,
    Query(params): Query<CallbackParams>,
    headers: HeaderMap,
) -> Response {
    let config = app.config();
    let base_url = match config.base_url() {
        Ok(base_url) => base_url,
        Err(err) => return config_error(err),
    };
    // Without the signing key no cookie can be read, so a CSRF verdict would
    // be meaningless; report the configuration problem instead.
    let key = match config.session_key() {
        Ok(key) => key,
        Err(err) => {
            tracing::error!(error = %err, "callback rejected");
            return error_redirect(&base_url, ErrorCode::AuthConfigError, None).into_response();
        }
    };

    let jar = SignedCookieJar::from_headers(&headers, key);
    let context = SessionContext::from_jar(&jar);
    let jar = jar.remove(session::removal_cookie(CSRF_COOKIE));

    let state_matches = match (params.state.as_deref(), context.csrf_state.as_deref()) {
        (Some(received), Some(stored)) => received == stored,
        _ => false,
    };
    if !state_matches {
        tracing::warn!("csrf state mismatch or missing state");
        return (
            jar,
            error_redirect(&base_url, ErrorCode::CsrfTokenMismatch, None),
        )
            .into_response();
    }

    let code = match params.code.as_deref().filter(|code| !code.is_empty()) {
        Some(code) => code,
        None => {
            tracing::warn!("provider did not return an authorization code");
            return (jar, error_redirect(&base_url, ErrorCode::CodeMissing, None)).into_response();
        }
    };

    let credentials = match config.exchange_credentials() {
        Ok(credentials) => credentials,
        Err(err) => {
            tracing::error!(error = %err, "token exchange rejected");
            return (
                jar,
                error_redirect(&base_url, ErrorCode::AuthConfigError, None),
            )
                .into_response();
        }
    };

    let grant = match app.client().exchange_code(credentials, code).await {
        Ok(grant) => grant,
        Err(AuthError::UpstreamStatus { status, body }) => {
            tracing::error!(status, body = %body, "token exchange failed");
            return (
                jar,
                error_redirect(&base_url, ErrorCode::TokenExchangeFailed, Some(&body)),
            )
                .into_response();
        }
        Err(err) => {
            tracing::error!(error = %err, "token exchange failed");
            return (jar, error_redirect(&base_url, ErrorCode::OAuthFailed, None)).into_response();
        }
    };

    // Degrade, don't abort: a login without profile data still succeeds.
    let profile = match app.client().fetch_user_info(&grant.access_token).await {
        Ok(profile) => Some(profile),
        Err(err) => {
            tracing::warn!(error = %err, "user-info fetch failed, continuing without profile");
            None
        }
    };

    let mut writer = SessionWriter::new(config.secure_cookies());
    if let Some(profile) = &profile {
        match serde_json::to_string(profile) {
            Ok(profile_json) => writer.set_profile(profile_json, grant.expires_in),
            Err(err) => {
                tracing::warn!(error = %err, "profile serialization failed, continuing without profile");
            }
        }
    }
    writer.set_access_token(&grant.access_token, grant.expires_in);

    tracing::info!(open_id = %grant.open_id, "tiktok login complete");
    (writer.commit(jar), redirect_to(&base_url, LANDING_PATH)).into_response()
}

/// Return the cached profile cookie, or 404 if no login has stored one.
/// Never talks to the network; the stored bytes are returned untouched so
/// repeated reads are byte-identical.
pub(crate) async fn get_user(State(app): State<AppState>, headers: HeaderMap) -> Response {
    let config = app.config();
    let key = match config.session_key() {
        Ok(key) => key,
        Err(err) => return config_error(err),
    };

    let jar = SignedCookieJar::from_headers(&headers, key);
    let context = SessionContext::from_jar(&jar);

    let Some(raw) = context.user_data else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "TikTok user data not found" })),
        )
            .into_response();
    };

    if let Err(err) = serde_json::from_str::<UserProfile>(&raw) {
        tracing::error!(error = %err, "stored profile cookie does not parse");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to fetch TikTok user data" })),
        )
            .into_response();
    }

    ([(header::CONTENT_TYPE, "application/json")], raw).into_response()
}

/// Fetch one page of the user's videos with the access-token cookie.
pub(crate) async fn list_videos(State(app): State<AppState>, headers: HeaderMap) -> Response {
    let config = app.config();
    let key = match config.session_key() {
        Ok(key) => key,
        Err(err) => return config_error(err),
    };

    let jar = SignedCookieJar::from_headers(&headers, key);
    let context = SessionContext::from_jar(&jar);

    let Some(access_token) = context.access_token else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "error": "Unauthorized: No TikTok session found. Please log in again."
            })),
        )
            .into_response();
    };

    match app.client().list_videos(&access_token).await {
        Ok(items) => Json(json!({ "success": true, "items": items })).into_response(),
        Err(AuthError::TokenInvalid { detail }) => {
            tracing::warn!(detail = %detail, "provider rejected access token");
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "error": "TikTok access token invalid or expired. Please re-authenticate."
                })),
            )
                .into_response()
        }
        Err(AuthError::UpstreamStatus { status, body }) => {
            tracing::error!(status, body = %body, "video list fetch failed");
            let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
            let details = serde_json::from_str::<serde_json::Value>(&body)
                .unwrap_or(serde_json::Value::String(body));
            (
                status,
                Json(json!({ "error": "Failed to retrieve TikTok videos.", "details": details })),
            )
                .into_response()
        }
        Err(err) => {
            tracing::error!(error = %err, "video list fetch failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Internal server error." })),
            )
                .into_response()
        }
    }
}

/// Missing or malformed configuration fails the affected request with a
/// generic 500; the variable name only goes to the log.
fn config_error(err: AuthError) -> Response {
    tracing::error!(error = %err, "request rejected by configuration check");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "Server configuration error." })),
    )
        .into_response()
}

fn redirect_to(base_url: &Url, path: &str) -> Redirect {
    let mut url = base_url.clone();
    url.set_path(path);
    Redirect::to(url.as_str())
}

fn error_redirect(base_url: &Url, code: ErrorCode, details: Option<&str>) -> Redirect {
    let mut url = base_url.clone();
    url.set_path(ERROR_PATH);
    {
        let mut pairs = url.query_pairs_mut();
        pairs.append_pair("error", code.as_str());
        if let Some(details) = details {
            pairs.append_pair("details", details);
        }
    }
    Redirect::to(url.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_redirect_carries_code_and_details() {
        let base_url: Url = "https://app.example".parse().unwrap();

        let redirect = error_redirect(&base_url, ErrorCode::CsrfTokenMismatch, None);
        let response = redirect.into_response();
        let location = response.headers()["location"].to_str().unwrap();
        assert_eq!(
            location,
            "https://app.example/auth/error?error=CsrfTokenMismatch"
        );

        let redirect = error_redirect(
            &base_url,
            ErrorCode::TokenExchangeFailed,
            Some(r#"{"error":"invalid_grant"}"#),
        );
        let response = redirect.into_response();
        let location = response.headers()["location"].to_str().unwrap();
        let url = Url::parse(location).unwrap();
        let pairs: Vec<_> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs[0],
            ("error".to_string(), "TokenExchangeFailed".to_string())
        );
        assert_eq!(
            pairs[1],
            (
                "details".to_string(),
                r#"{"error":"invalid_grant"}"#.to_string()
            )
        );
    }

    #[test]
    fn landing_redirect_targets_the_base_url() {
        let base_url: Url = "https://app.example".parse().unwrap();
        let response = redirect_to(&base_url, LANDING_PATH).into_response();
        let location = response.headers()["location"].to_str().unwrap();
        assert_eq!(location, "https://app.example/tiktok");
    }
}
