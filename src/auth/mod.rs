//! Accounts, sessions and the guard that protects every page and API route
//! that needs a logged in user.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use rusqlite::Connection;
use time::Duration;

use crate::{AppState, Error, db};

mod cookie;
mod log_in;
mod log_out;
mod middleware;
mod redirect;
mod register;
mod session;

pub use cookie::{get_session_token, invalidate_session_cookie, set_session_cookie};
pub use log_in::{get_log_in_page, post_log_in};
pub use log_out::get_log_out;
pub use middleware::{api_auth_guard, auth_guard};
pub use register::{get_register_page, post_register};
pub use session::{
    DEFAULT_SESSION_DURATION, SessionContext, create_session, create_session_table,
    delete_session, get_session, refresh_session,
};

#[cfg(test)]
pub(crate) use cookie::COOKIE_SESSION;

/// The state needed to register, log in, log out and check sessions.
#[derive(Debug, Clone)]
pub struct AuthState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// How long a session stays valid after the last request that used it.
    pub session_duration: Duration,
    /// The bcrypt cost used when hashing new passwords.
    pub password_hash_cost: u32,
    /// The database connection holding accounts and sessions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            session_duration: state.session_duration,
            password_hash_cost: state.password_hash_cost,
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<AuthState> for Key {
    fn from_ref(state: &AuthState) -> Self {
        state.cookie_key.clone()
    }
}

impl AuthState {
    /// Run `f` with the database connection locked.
    pub(crate) fn with_connection<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, Error>,
    ) -> Result<T, Error> {
        db::with_connection(&self.db_connection, f)
    }
}
