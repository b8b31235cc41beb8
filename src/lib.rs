//! "Sign in with TikTok" backend.
//!
//! A login-initiation route, the OAuth callback that exchanges an
//! authorization code for an access token, and two read-only endpoints that
//! project the resulting session (cached profile, video list) to the browser.
//! All session state lives in signed, HTTP-only cookies; there is no
//! database.

mod client;
mod config;
mod error;
mod provider;
mod routes;
mod server;
mod session;
mod state_token;
mod types;

pub use client::{DEFAULT_TIMEOUT, TikTokClient, VIDEO_PAGE_SIZE};
pub use config::{AppConfig, ExchangeCredentials};
pub use error::{AuthError, ErrorCode};
pub use provider::ProviderEndpoints;
pub use server::{AppState, router, serve};
pub use session::{
    ACCESS_TOKEN_COOKIE, CSRF_COOKIE, SessionContext, SessionWriter, USER_DATA_COOKIE,
};
pub use state_token::StateToken;
pub use types::{MediaItem, TokenGrant, UserProfile};
