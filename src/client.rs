use std::time::Duration;

use reqwest::{Client, header::CACHE_CONTROL};

use crate::types::{UserInfoEnvelope, VideoListEnvelope};
use crate::{
    AuthError, ExchangeCredentials, MediaItem, ProviderEndpoints, TokenGrant, UserProfile,
};

/// Deadline applied to every provider round trip.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Single page, no cursor traversal. TikTok caps the page at 20.
pub const VIDEO_PAGE_SIZE: u32 = 20;

const USER_INFO_FIELDS: &str = "open_id,union_id,display_name,avatar_url";
const VIDEO_FIELDS: &str =
    "id,title,video_description,duration,cover_image_url,embed_link,create_time";

const TOKEN_INVALID_CODE: &str = "access_token_invalid";

/// HTTP client for the TikTok OAuth and Display APIs.
#[derive(Debug, Clone)]
pub struct TikTokClient {
    endpoints: ProviderEndpoints,
    http: Client,
}

impl TikTokClient {
    pub fn new(endpoints: ProviderEndpoints) -> Result<Self, AuthError> {
        let http = Client::builder().timeout(DEFAULT_TIMEOUT).build()?;
        Ok(Self { endpoints, http })
    }

    pub fn with_http_client(endpoints: ProviderEndpoints, http: Client) -> Self {
        Self { endpoints, http }
    }

    pub fn endpoints(&self) -> &ProviderEndpoints {
        &self.endpoints
    }

    /// Build the authorization redirect URL the browser is sent to.
    pub fn authorization_url(
        &self,
        client_key: &str,
        redirect_uri: &str,
        scope: &str,
        state: &str,
    ) -> String {
        let mut url = self.endpoints.authorize_url.clone();
        url.query_pairs_mut()
            .append_pair("client_key", client_key)
            .append_pair("scope", scope)
            .append_pair("response_type", "code")
            .append_pair("redirect_uri", redirect_uri)
            .append_pair("state", state);
        url.into()
    }

    /// Exchange an authorization code for a token grant.
    ///
    /// One form-encoded POST, no retries. A non-2xx status surfaces as
    /// [`AuthError::UpstreamStatus`] with the provider body attached.
    pub async fn exchange_code(
        &self,
        credentials: ExchangeCredentials<'_>,
        code: &str,
    ) -> Result<TokenGrant, AuthError> {
        let params = [
            ("client_key", credentials.client_key),
            ("client_secret", credentials.client_secret),
            ("code", code),
            ("grant_type", "authorization_code"),
            ("redirect_uri", credentials.redirect_uri),
        ];

        let response = self
            .http
            .post(self.endpoints.token_url.clone())
            .header(CACHE_CONTROL, "no-cache")
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(AuthError::UpstreamStatus {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|err| AuthError::InvalidResponse {
            message: err.to_string(),
            body,
        })
    }

    /// Fetch the authenticated user's profile with a fresh access token.
    pub async fn fetch_user_info(&self, access_token: &str) -> Result<UserProfile, AuthError> {
        let mut url = self.endpoints.user_info_url.clone();
        url.query_pairs_mut().append_pair("fields", USER_INFO_FIELDS);

        let response = self.http.get(url).bearer_auth(access_token).send().await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(AuthError::UpstreamStatus {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: UserInfoEnvelope =
            serde_json::from_str(&body).map_err(|err| AuthError::InvalidResponse {
                message: err.to_string(),
                body: body.clone(),
            })?;

        envelope
            .data
            .map(|data| data.user)
            .ok_or(AuthError::InvalidResponse {
                message: "user object missing from user-info response".to_string(),
                body,
            })
    }

    /// Fetch one page of the user's videos.
    ///
    /// An `access_token_invalid` error code from the provider maps to
    /// [`AuthError::TokenInvalid`] so callers can ask the user to
    /// re-authenticate; any other non-2xx is a generic upstream failure.
    pub async fn list_videos(&self, access_token: &str) -> Result<Vec<MediaItem>, AuthError> {
        let mut url = self.endpoints.video_list_url.clone();
        url.query_pairs_mut().append_pair("fields", VIDEO_FIELDS);

        let response = self
            .http
            .post(url)
            .bearer_auth(access_token)
            .header(CACHE_CONTROL, "no-cache")
            .json(&serde_json::json!({ "max_count": VIDEO_PAGE_SIZE }))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            if VideoListEnvelope::error_code(&body).as_deref() == Some(TOKEN_INVALID_CODE) {
                return Err(AuthError::TokenInvalid { detail: body });
            }
            return Err(AuthError::UpstreamStatus {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: VideoListEnvelope =
            serde_json::from_str(&body).map_err(|err| AuthError::InvalidResponse {
                message: err.to_string(),
                body: body.clone(),
            })?;

        envelope
            .data
            .map(|data| data.videos)
            .ok_or(AuthError::InvalidResponse {
                message: "video list missing from response".to_string(),
                body,
            })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use url::Url;

    use super::*;

    #[test]
    fn authorization_url_includes_required_params() {
        let client = TikTokClient::new(ProviderEndpoints::default()).unwrap();
        let url = client.authorization_url(
            "client-key",
            "https://app.example/api/auth/callback/tiktok",
            "user.info.basic,video.list",
            "abc123",
        );

        let url = Url::parse(&url).unwrap();
        let pairs: HashMap<_, _> = url.query_pairs().into_owned().collect();

        assert_eq!(pairs.get("client_key"), Some(&"client-key".to_string()));
        assert_eq!(pairs.get("response_type"), Some(&"code".to_string()));
        assert_eq!(
            pairs.get("redirect_uri"),
            Some(&"https://app.example/api/auth/callback/tiktok".to_string())
        );
        assert_eq!(
            pairs.get("scope"),
            Some(&"user.info.basic,video.list".to_string())
        );
        assert_eq!(pairs.get("state"), Some(&"abc123".to_string()));
    }
}
