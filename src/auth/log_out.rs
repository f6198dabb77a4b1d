//! The log-out endpoint.

use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::PrivateCookieJar;

use crate::{
    auth::{AuthState, delete_session, get_session_token, invalidate_session_cookie},
    endpoints,
    flash::{Flash, FlashLevel, set_flash},
};

/// Invalidate the session and redirect the client to the log-in page.
///
/// Logging out always succeeds, even without a session, so the route does not sit
/// behind the auth guard.
pub async fn get_log_out(State(state): State<AuthState>, jar: PrivateCookieJar) -> Response {
    if let Some(token) = get_session_token(&jar)
        && let Err(error) =
            state.with_connection(|connection| delete_session(&token, connection))
    {
        tracing::error!("Could not delete session while logging out: {error}");
    }

    let jar = invalidate_session_cookie(jar);
    let jar = set_flash(jar, Flash::new(FlashLevel::Info, "You have been logged out."));

    (jar, Redirect::to(endpoints::LOG_IN)).into_response()
}
