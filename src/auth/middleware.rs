//! Middleware that resolves the session cookie to a [SessionContext] before a
//! protected handler runs, and turns the request away otherwise.

use axum::{
    Json,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::PrivateCookieJar;
use serde_json::json;

use crate::{
    Error,
    auth::{
        AuthState, SessionContext, get_session, get_session_token, invalidate_session_cookie,
        redirect::build_log_in_redirect_url, refresh_session,
    },
    flash::{Flash, FlashLevel, set_flash},
};

const LOG_IN_FIRST_MESSAGE: &str = "Please log in first.";

/// Look up the session named by the cookie in `jar` and slide its expiry forward.
///
/// Returns `None` if there is no cookie, the session does not exist or has expired,
/// or the database could not be read.
fn resolve_session(state: &AuthState, jar: &PrivateCookieJar) -> Option<SessionContext> {
    let token = get_session_token(jar)?;

    let result = state.with_connection(|connection| {
        let session = get_session(&token, connection)?;
        refresh_session(&token, state.session_duration, connection)?;

        Ok(session)
    });

    match result {
        Ok(session) => Some(session),
        Err(Error::NotFound) => None,
        Err(error) => {
            tracing::error!("Could not resolve session: {error}");
            None
        }
    }
}

/// Middleware function that checks for a valid session cookie.
///
/// The [SessionContext] is placed into the request and the request executed normally if the
/// session is valid, otherwise the user is told to log in and redirected to the log-in page,
/// which will send them back to the page they asked for.
///
/// **Note**: Route handlers can use the function argument
/// `Extension(session): Extension<SessionContext>` to receive the session.
pub async fn auth_guard(
    State(state): State<AuthState>,
    jar: PrivateCookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    match resolve_session(&state, &jar) {
        Some(session) => {
            request.extensions_mut().insert(session);
            next.run(request).await
        }
        None => {
            let redirect_url = build_log_in_redirect_url(&request);
            let jar = invalidate_session_cookie(jar);
            let jar = set_flash(jar, Flash::new(FlashLevel::Warning, LOG_IN_FIRST_MESSAGE));

            (jar, Redirect::to(&redirect_url)).into_response()
        }
    }
}

/// Middleware function that checks for a valid session cookie on JSON API routes.
///
/// Behaves like [auth_guard] except that a missing session is answered with
/// `401 Unauthorized` and a JSON error body instead of a redirect.
pub async fn api_auth_guard(
    State(state): State<AuthState>,
    jar: PrivateCookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    match resolve_session(&state, &jar) {
        Some(session) => {
            request.extensions_mut().insert(session);
            next.run(request).await
        }
        None => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": LOG_IN_FIRST_MESSAGE })),
        )
            .into_response(),
    }
}
