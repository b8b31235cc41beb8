use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("os rng error: {message}")]
    OsRng { message: String },

    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("missing configuration: {0}")]
    MissingConfig(&'static str),

    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),

    #[error("provider returned http status {status}: {body}")]
    UpstreamStatus { status: u16, body: String },

    #[error("provider rejected the access token: {detail}")]
    TokenInvalid { detail: String },

    #[error("invalid provider response: {message}")]
    InvalidResponse { message: String, body: String },
}

/// Machine-readable codes carried on `/auth/error?error=...` redirects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    CsrfTokenMismatch,
    CodeMissing,
    AuthConfigError,
    TokenExchangeFailed,
    OAuthFailed,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::CsrfTokenMismatch => "CsrfTokenMismatch",
            ErrorCode::CodeMissing => "CodeMissing",
            ErrorCode::AuthConfigError => "AuthConfigError",
            ErrorCode::TokenExchangeFailed => "TokenExchangeFailed",
            ErrorCode::OAuthFailed => "OAuthFailed",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
