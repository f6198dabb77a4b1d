//! Defines functions for keeping the session token in an encrypted cookie.

use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, SameSite},
};
use time::{Duration, OffsetDateTime};

pub(crate) const COOKIE_SESSION: &str = "session";

/// Add the session cookie holding `token` to the cookie jar.
///
/// The cookie has no expiry of its own, it lasts until the browser closes or
/// the server-side session expires, whichever comes first.
pub fn set_session_cookie(jar: PrivateCookieJar, token: &str) -> PrivateCookieJar {
    jar.add(
        Cookie::build((COOKIE_SESSION, token.to_owned()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(true),
    )
}

/// Set the session cookie to an invalid value and set its max age to zero, which should delete
/// the cookie on the client side.
pub fn invalidate_session_cookie(jar: PrivateCookieJar) -> PrivateCookieJar {
    jar.add(
        Cookie::build((COOKIE_SESSION, "deleted"))
            .path("/")
            .expires(OffsetDateTime::UNIX_EPOCH)
            .max_age(Duration::ZERO)
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(true),
    )
}

/// Get the session token from `jar`, if the client sent one.
pub fn get_session_token(jar: &PrivateCookieJar) -> Option<String> {
    jar.get(COOKIE_SESSION)
        .map(|cookie| cookie.value_trimmed().to_owned())
        .filter(|token| !token.is_empty() && token != "deleted")
}
