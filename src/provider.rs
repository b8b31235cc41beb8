use url::Url;

const AUTHORIZE_URL: &str = "https://www.tiktok.com/v2/auth/authorize/";
const TOKEN_URL: &str = "https://open.tiktokapis.com/v2/oauth/token/";
const USER_INFO_URL: &str = "https://open.tiktokapis.com/v2/user/info/";
const VIDEO_LIST_URL: &str = "https://open.tiktokapis.com/v2/video/list/";

/// The TikTok endpoints the flow talks to.
///
/// Defaults to the production hosts; each endpoint can be overridden so tests
/// can point the client at a mock server.
#[derive(Debug, Clone)]
pub struct ProviderEndpoints {
    pub authorize_url: Url,
    pub token_url: Url,
    pub user_info_url: Url,
    pub video_list_url: Url,
}

impl Default for ProviderEndpoints {
    fn default() -> Self {
        Self {
            authorize_url: AUTHORIZE_URL.parse().expect("valid default URL"),
            token_url: TOKEN_URL.parse().expect("valid default URL"),
            user_info_url: USER_INFO_URL.parse().expect("valid default URL"),
            video_list_url: VIDEO_LIST_URL.parse().expect("valid default URL"),
        }
    }
}

impl ProviderEndpoints {
    pub fn with_authorize_url(mut self, url: Url) -> Self {
        self.authorize_url = url;
        self
    }

    pub fn with_token_url(mut self, url: Url) -> Self {
        self.token_url = url;
        self
    }

    pub fn with_user_info_url(mut self, url: Url) -> Self {
        self.user_info_url = url;
        self
    }

    pub fn with_video_list_url(mut self, url: Url) -> Self {
        self.video_list_url = url;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::ProviderEndpoints;

    #[test]
    fn defaults_point_at_tiktok() {
        let endpoints = ProviderEndpoints::default();
        assert_eq!(
            endpoints.authorize_url.host_str(),
            Some("www.tiktok.com")
        );
        assert_eq!(
            endpoints.token_url.host_str(),
            Some("open.tiktokapis.com")
        );
    }

    #[test]
    fn endpoints_are_overridable() {
        let endpoints = ProviderEndpoints::default()
            .with_token_url("http://127.0.0.1:9/token".parse().unwrap());
        assert_eq!(endpoints.token_url.as_str(), "http://127.0.0.1:9/token");
        assert_eq!(
            endpoints.user_info_url.host_str(),
            Some("open.tiktokapis.com")
        );
    }
}
