use axum_extra::extract::cookie::Key;
use url::Url;

use crate::AuthError;

pub const ENV_CLIENT_KEY: &str = "TIKTOK_CLIENT_KEY";
pub const ENV_CLIENT_SECRET: &str = "TIKTOK_CLIENT_SECRET";
pub const ENV_REDIRECT_URI: &str = "TIKTOK_REDIRECT_URI";
pub const ENV_BASE_URL: &str = "PUBLIC_BASE_URL";
pub const ENV_SESSION_SECRET: &str = "SESSION_SECRET";

/// Signing keys shorter than this have too little entropy to be useful.
const MIN_SESSION_SECRET_BYTES: usize = 32;

const DEFAULT_SCOPE: &str = "user.info.basic,video.list";

/// Environment-supplied application configuration.
///
/// Every field is optional at load time: a missing variable fails the request
/// that needs it (via the `require` accessors below), never the process.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub client_key: Option<String>,
    pub client_secret: Option<String>,
    pub redirect_uri: Option<String>,
    pub base_url: Option<String>,
    pub session_secret: Option<String>,
    pub scope: String,
    pub endpoints: crate::ProviderEndpoints,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            client_key: None,
            client_secret: None,
            redirect_uri: None,
            base_url: None,
            session_secret: None,
            scope: DEFAULT_SCOPE.to_string(),
            endpoints: crate::ProviderEndpoints::default(),
        }
    }
}

/// Everything the token exchange needs, borrowed from the config.
#[derive(Debug, Clone, Copy)]
pub struct ExchangeCredentials<'a> {
    pub client_key: &'a str,
    pub client_secret: &'a str,
    pub redirect_uri: &'a str,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            client_key: env_var(ENV_CLIENT_KEY),
            client_secret: env_var(ENV_CLIENT_SECRET),
            redirect_uri: env_var(ENV_REDIRECT_URI),
            base_url: env_var(ENV_BASE_URL),
            session_secret: env_var(ENV_SESSION_SECRET),
            ..Self::default()
        }
    }

    pub fn with_client_key(mut self, client_key: impl Into<String>) -> Self {
        self.client_key = Some(client_key.into());
        self
    }

    pub fn with_client_secret(mut self, client_secret: impl Into<String>) -> Self {
        self.client_secret = Some(client_secret.into());
        self
    }

    pub fn with_redirect_uri(mut self, redirect_uri: impl Into<String>) -> Self {
        self.redirect_uri = Some(redirect_uri.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_session_secret(mut self, session_secret: impl Into<String>) -> Self {
        self.session_secret = Some(session_secret.into());
        self
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    pub fn with_endpoints(mut self, endpoints: crate::ProviderEndpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Client key + redirect URI, required before redirecting to TikTok.
    pub fn login_credentials(&self) -> Result<(&str, &str), AuthError> {
        let client_key = self
            .client_key
            .as_deref()
            .ok_or(AuthError::MissingConfig(ENV_CLIENT_KEY))?;
        let redirect_uri = self
            .redirect_uri
            .as_deref()
            .ok_or(AuthError::MissingConfig(ENV_REDIRECT_URI))?;
        Ok((client_key, redirect_uri))
    }

    /// Full credential set required by the token exchange.
    pub fn exchange_credentials(&self) -> Result<ExchangeCredentials<'_>, AuthError> {
        let client_key = self
            .client_key
            .as_deref()
            .ok_or(AuthError::MissingConfig(ENV_CLIENT_KEY))?;
        let client_secret = self
            .client_secret
            .as_deref()
            .ok_or(AuthError::MissingConfig(ENV_CLIENT_SECRET))?;
        let redirect_uri = self
            .redirect_uri
            .as_deref()
            .ok_or(AuthError::MissingConfig(ENV_REDIRECT_URI))?;
        Ok(ExchangeCredentials {
            client_key,
            client_secret,
            redirect_uri,
        })
    }

    /// Externally-reachable base URL used to build redirect targets.
    pub fn base_url(&self) -> Result<Url, AuthError> {
        let raw = self
            .base_url
            .as_deref()
            .ok_or(AuthError::MissingConfig(ENV_BASE_URL))?;
        raw.parse()
            .map_err(|_| AuthError::InvalidConfig(ENV_BASE_URL))
    }

    /// Cookie-signing key derived from the session secret.
    pub fn session_key(&self) -> Result<Key, AuthError> {
        let secret = self
            .session_secret
            .as_deref()
            .ok_or(AuthError::MissingConfig(ENV_SESSION_SECRET))?;
        if secret.len() < MIN_SESSION_SECRET_BYTES {
            return Err(AuthError::InvalidConfig(ENV_SESSION_SECRET));
        }
        Ok(Key::derive_from(secret.as_bytes()))
    }

    /// Cookies are marked `secure` when the site is served over https.
    pub fn secure_cookies(&self) -> bool {
        is_https(self.base_url.as_deref()) || is_https(self.redirect_uri.as_deref())
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}

fn is_https(url: Option<&str>) -> bool {
    url.is_some_and(|url| url.starts_with("https"))
}
