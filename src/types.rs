use serde::{Deserialize, Serialize};

/// Result of exchanging an authorization code at the token endpoint.
///
/// TikTok returns this as a flat JSON object. `access_token` and `expires_in`
/// drive the session cookies; the rest is kept for diagnostics.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    pub expires_in: u64,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub open_id: String,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// The authenticated user's profile as returned by the user-info endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub open_id: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub union_id: Option<String>,
}

/// One entry from the video-list endpoint. Everything but the id is optional
/// on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaItem {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embed_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<i64>,
}

/// Error object TikTok attaches to API responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderApiError {
    pub code: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub log_id: Option<String>,
}

/// Envelope around `/v2/user/info/` responses: `{data: {user: {...}}}` on
/// success, `{error: {...}}` on failure.
#[derive(Debug, Clone, Deserialize)]
pub struct UserInfoEnvelope {
    #[serde(default)]
    pub data: Option<UserInfoData>,
    #[serde(default)]
    pub error: Option<ProviderApiError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserInfoData {
    pub user: UserProfile,
}

/// Envelope around `/v2/video/list/` responses.
#[derive(Debug, Clone, Deserialize)]
pub struct VideoListEnvelope {
    #[serde(default)]
    pub data: Option<VideoListData>,
    #[serde(default)]
    pub error: Option<ProviderApiError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VideoListData {
    #[serde(default)]
    pub videos: Vec<MediaItem>,
    #[serde(default)]
    pub cursor: Option<i64>,
    #[serde(default)]
    pub has_more: Option<bool>,
}

impl VideoListEnvelope {
    /// Pull the error code out of a raw response body, if there is one.
    pub fn error_code(body: &str) -> Option<String> {
        serde_json::from_str::<VideoListEnvelope>(body)
            .ok()
            .and_then(|envelope| envelope.error)
            .map(|error| error.code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_grant_parses_tiktok_response() {
        let body = r#"{
            "access_token": "act.example",
            "expires_in": 86400,
            "open_id": "open-id-1",
            "refresh_token": "rft.example",
            "refresh_expires_in": 31536000,
            "scope": "user.info.basic,video.list",
            "token_type": "Bearer"
        }"#;
        let grant: TokenGrant = serde_json::from_str(body).unwrap();
        assert_eq!(grant.access_token, "act.example");
        assert_eq!(grant.expires_in, 86400);
        assert_eq!(grant.open_id, "open-id-1");
        assert_eq!(grant.refresh_token.as_deref(), Some("rft.example"));
    }

    #[test]
    fn token_grant_requires_access_token() {
        let body = r#"{"expires_in": 86400, "open_id": "open-id-1"}"#;
        assert!(serde_json::from_str::<TokenGrant>(body).is_err());
    }

    #[test]
    fn user_info_envelope_success() {
        let body = r#"{
            "data": {
                "user": {
                    "open_id": "U1",
                    "union_id": "union-1",
                    "display_name": "Ann",
                    "avatar_url": "https://p16.example/avatar.jpeg"
                }
            },
            "error": {"code": "ok", "message": "", "log_id": "202501"}
        }"#;
        let envelope: UserInfoEnvelope = serde_json::from_str(body).unwrap();
        let user = envelope.data.unwrap().user;
        assert_eq!(user.open_id, "U1");
        assert_eq!(user.display_name, "Ann");
    }

    #[test]
    fn user_info_envelope_fails_closed_without_user() {
        // A data object without a user field must not parse into a profile.
        let body = r#"{"data": {}}"#;
        assert!(serde_json::from_str::<UserInfoEnvelope>(body).is_err());
    }

    #[test]
    fn video_list_envelope_error_code() {
        let body = r#"{"error": {"code": "access_token_invalid", "message": "bad token", "log_id": "x"}}"#;
        assert_eq!(
            VideoListEnvelope::error_code(body).as_deref(),
            Some("access_token_invalid")
        );
        assert_eq!(VideoListEnvelope::error_code("not json"), None);
    }

    #[test]
    fn media_items_round_trip_optional_fields() {
        let body = r#"{
            "data": {
                "videos": [
                    {"id": "v1", "title": "first", "duration": 12.5},
                    {"id": "v2"}
                ],
                "cursor": 1700000000000,
                "has_more": false
            }
        }"#;
        let envelope: VideoListEnvelope = serde_json::from_str(body).unwrap();
        let data = envelope.data.unwrap();
        assert_eq!(data.videos.len(), 2);
        assert_eq!(data.videos[0].title.as_deref(), Some("first"));
        assert!(data.videos[1].title.is_none());

        let out = serde_json::to_value(&data.videos[1]).unwrap();
        assert_eq!(out, serde_json::json!({"id": "v2"}));
    }
}
