use axum::http::{HeaderName, HeaderValue};

use crate::services::auth::TOKEN_COOKIE_NAME;

/// Convenience cookie set at the end of the OAuth callback so browser-based clients
/// don't have to pull the token out of a redirect URL. The scheduler surface itself
/// only ever reads `Authorization: Bearer` (§4.H); this cookie exists purely as a
/// delivery vehicle.
pub fn create_token_cookie(token: &str, secure: bool) -> (HeaderName, HeaderValue) {
    let secure_flag = if secure { "; Secure" } else { "" };
    let cookie_value =
        format!("{TOKEN_COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=Lax{secure_flag}");

    (
        HeaderName::from_static("set-cookie"),
        HeaderValue::from_str(&cookie_value).expect("cookie value is always valid ASCII"),
    )
}
