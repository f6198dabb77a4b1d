//! One-shot notices that survive a redirect.
//!
//! A handler that redirects stores a [Flash] in a private cookie, and the next
//! page that is rendered takes it out of the cookie jar and shows it once.

use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, SameSite},
};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

pub(crate) const COOKIE_FLASH: &str = "flash";

/// How the notice should be styled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Info,
    Warning,
    Danger,
}

/// A message to show the user on the next page they see.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

impl Flash {
    pub fn new(level: FlashLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }
}

/// Store `flash` in `jar`, replacing any notice that has not been shown yet.
pub fn set_flash(jar: PrivateCookieJar, flash: Flash) -> PrivateCookieJar {
    let value = match serde_json::to_string(&flash) {
        Ok(value) => value,
        Err(error) => {
            tracing::error!("Could not serialize flash message {flash:?}: {error}");
            return jar;
        }
    };

    jar.add(
        Cookie::build((COOKIE_FLASH, value))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax),
    )
}

/// Take the pending notice out of `jar`, if there is one.
///
/// The returned jar expires the flash cookie so the notice is only shown once.
pub fn take_flash(jar: PrivateCookieJar) -> (PrivateCookieJar, Option<Flash>) {
    let Some(cookie) = jar.get(COOKIE_FLASH) else {
        return (jar, None);
    };

    let flash = serde_json::from_str(cookie.value_trimmed())
        .inspect_err(|error| tracing::warn!("Discarding malformed flash cookie: {error}"))
        .ok();

    let jar = jar.add(
        Cookie::build((COOKIE_FLASH, "deleted"))
            .path("/")
            .expires(OffsetDateTime::UNIX_EPOCH)
            .max_age(Duration::ZERO)
            .http_only(true)
            .same_site(SameSite::Lax),
    );

    (jar, flash)
}
