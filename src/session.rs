use axum_extra::extract::cookie::{Cookie, SameSite, SignedCookieJar};
use time::Duration;

pub const CSRF_COOKIE: &str = "csrfState";
pub const USER_DATA_COOKIE: &str = "tiktok_user_data";
pub const ACCESS_TOKEN_COOKIE: &str = "tiktok_access_token";

const CSRF_MAX_AGE: Duration = Duration::hours(24);

/// The profile cookie tracks the token grant's lifetime but never outlives
/// this ceiling.
const PROFILE_MAX_AGE_CAP: Duration = Duration::days(7);

/// Everything a handler needs from the request's cookies, read once at the
/// boundary. Handlers never reach back into the jar mid-flow.
#[derive(Debug, Default)]
pub struct SessionContext {
    pub csrf_state: Option<String>,
    pub access_token: Option<String>,
    pub user_data: Option<String>,
}

impl SessionContext {
    pub fn from_jar(jar: &SignedCookieJar) -> Self {
        Self {
            csrf_state: cookie_value(jar, CSRF_COOKIE),
            access_token: cookie_value(jar, ACCESS_TOKEN_COOKIE),
            user_data: cookie_value(jar, USER_DATA_COOKIE),
        }
    }
}

fn cookie_value(jar: &SignedCookieJar, name: &str) -> Option<String> {
    jar.get(name).map(|cookie| cookie.value().to_string())
}

/// Buffered cookie writes.
///
/// Nothing reaches the jar until [`SessionWriter::commit`], so a failure
/// partway through a handler writes no cookies at all.
#[derive(Debug)]
pub struct SessionWriter {
    secure: bool,
    pending: Vec<Cookie<'static>>,
}

impl SessionWriter {
    pub fn new(secure: bool) -> Self {
        Self {
            secure,
            pending: Vec::new(),
        }
    }

    /// Stage the anti-forgery cookie for a new login attempt.
    pub fn set_csrf_state(&mut self, token: &str) {
        self.pending.push(session_cookie(
            CSRF_COOKIE,
            token.to_string(),
            CSRF_MAX_AGE,
            self.secure,
        ));
    }

    /// Stage the serialized profile. Its lifetime is bound to the token
    /// grant, capped at seven days.
    pub fn set_profile(&mut self, profile_json: String, token_ttl_seconds: u64) {
        let max_age = seconds(token_ttl_seconds).min(PROFILE_MAX_AGE_CAP);
        self.pending.push(session_cookie(
            USER_DATA_COOKIE,
            profile_json,
            max_age,
            self.secure,
        ));
    }

    /// Stage the raw access token with the provider-reported lifetime.
    pub fn set_access_token(&mut self, access_token: &str, expires_in_seconds: u64) {
        self.pending.push(session_cookie(
            ACCESS_TOKEN_COOKIE,
            access_token.to_string(),
            seconds(expires_in_seconds),
            self.secure,
        ));
    }

    pub fn pending(&self) -> &[Cookie<'static>] {
        &self.pending
    }

    /// Apply every staged write to the jar in one step.
    pub fn commit(self, jar: SignedCookieJar) -> SignedCookieJar {
        self.pending
            .into_iter()
            .fold(jar, |jar, cookie| jar.add(cookie))
    }
}

/// Removal cookie for [`SignedCookieJar::remove`]; the path must match the
/// original write or browsers keep the old cookie.
pub fn removal_cookie(name: &'static str) -> Cookie<'static> {
    Cookie::build((name, ""))
        .path("/")
        .max_age(Duration::ZERO)
        .build()
}

fn session_cookie(
    name: &'static str,
    value: String,
    max_age: Duration,
    secure: bool,
) -> Cookie<'static> {
    Cookie::build((name, value))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(max_age)
        .build()
}

fn seconds(value: u64) -> Duration {
    Duration::seconds(i64::try_from(value).unwrap_or(i64::MAX))
}
