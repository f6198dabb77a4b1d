//! This file defines the routes for displaying the log-in page and handling log-in requests.
//! The session and cookie modules handle the lower level session logic.

use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::PrivateCookieJar;
use maud::{Markup, html};
use serde::Deserialize;

use crate::{
    Account, Error,
    account::get_account_by_handle,
    auth::{AuthState, create_session, redirect::normalize_redirect_url, set_session_cookie},
    endpoints,
    flash::{Flash, FlashLevel, set_flash, take_flash},
    html::{
        BUTTON_PRIMARY_STYLE, LINK_STYLE, base, form_error, log_in_register, password_input,
        text_input,
    },
};

pub(crate) const INVALID_CREDENTIALS_ERROR_MSG: &str = "Incorrect account or password.";

fn log_in_form(handle: &str, error_message: Option<&str>, redirect_url: Option<&str>) -> Markup {
    html! {
        form
            method="post"
            action=(endpoints::LOG_IN)
            class="space-y-4 md:space-y-6"
        {
            @if let Some(redirect_url) = redirect_url {
                input type="hidden" name="redirect_url" value=(redirect_url);
            }

            (text_input("Account", "account", "text", handle))
            (password_input())
            (form_error(error_message))

            button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
            {
                "Log in"
            }

            p class="text-sm font-light text-gray-500 dark:text-gray-400" {
                "Don't have an account? "
                a href=(endpoints::REGISTER) tabindex="0" class=(LINK_STYLE)
                {
                  "Register here"
                }
            }
        }
    }
}

fn log_in_page(form: &Markup, flash: Option<&Flash>) -> Markup {
    let content = log_in_register("Log in to your account", form);
    base("Log In", flash, &content)
}

fn parse_redirect_url(raw_url: Option<&str>, source: &str) -> Option<String> {
    match raw_url.and_then(normalize_redirect_url) {
        Some(redirect_url) => Some(redirect_url),
        None => {
            if let Some(redirect_url) = raw_url {
                tracing::warn!("Invalid redirect URL from {source}: {redirect_url}");
            }
            None
        }
    }
}

#[derive(Deserialize)]
pub struct RedirectQuery {
    pub redirect_url: Option<String>,
}

/// Display the log-in page.
pub async fn get_log_in_page(jar: PrivateCookieJar, Query(query): Query<RedirectQuery>) -> Response {
    let (jar, flash) = take_flash(jar);
    let redirect_url = parse_redirect_url(query.redirect_url.as_deref(), "log-in query");
    let form = log_in_form("", None, redirect_url.as_deref());

    (jar, log_in_page(&form, flash.as_ref())).into_response()
}

/// The raw data entered by the user in the log-in form.
#[derive(Clone, Deserialize)]
pub struct LogInForm {
    /// The login handle.
    #[serde(default)]
    pub account: String,

    /// Password entered during log-in.
    #[serde(default)]
    pub password: String,

    /// Optional URL to redirect to after logging in.
    pub redirect_url: Option<String>,
}

/// Find the account for `handle` and check `password` against its hash.
///
/// The database lock is only held for the lookup, the hash comparison runs after it is
/// released.
///
/// # Errors
///
/// Returns [Error::InvalidCredentials] if there is no such account or the password
/// does not match, so that callers cannot tell the two cases apart.
pub(crate) fn authenticate(
    handle: &str,
    password: &str,
    state: &AuthState,
) -> Result<Account, Error> {
    let lookup = state.with_connection(|connection| get_account_by_handle(handle, connection));

    let account = match lookup {
        Ok(account) => account,
        Err(Error::NotFound) => return Err(Error::InvalidCredentials),
        Err(error) => return Err(error),
    };

    match account.password_hash.verify(password) {
        Ok(true) => Ok(account),
        Ok(false) => Err(Error::InvalidCredentials),
        Err(error) => Err(Error::HashingError(error.to_string())),
    }
}

/// Handler for log-in requests via the POST method.
///
/// On a successful log-in request, a session is started, its token is stored in the session
/// cookie and the client is redirected to the page they originally asked for, or the expense
/// list. Otherwise, the form is returned with an error message explaining the problem.
///
/// Surrounding whitespace in the handle is ignored, the same as when registering.
pub async fn post_log_in(
    State(state): State<AuthState>,
    jar: PrivateCookieJar,
    Form(form): Form<LogInForm>,
) -> Response {
    let redirect_url = parse_redirect_url(form.redirect_url.as_deref(), "log-in form");
    let redirect_url = redirect_url.as_deref();
    let handle = form.account.trim();

    let result = authenticate(handle, &form.password, &state).and_then(|account| {
        let token = state.with_connection(|connection| {
            create_session(&account, state.session_duration, connection)
        })?;

        Ok((account, token))
    });

    let (account, token) = match result {
        Ok(result) => result,
        Err(Error::InvalidCredentials) => {
            tracing::info!("Failed log-in attempt for account \"{handle}\"");
            let form = log_in_form(
                handle,
                Some(INVALID_CREDENTIALS_ERROR_MSG),
                redirect_url,
            );
            return (StatusCode::UNAUTHORIZED, log_in_page(&form, None)).into_response();
        }
        Err(error) => {
            tracing::error!("Unhandled error while verifying credentials: {error}");
            let form = log_in_form(
                handle,
                Some("An internal error occurred. Please try again later."),
                redirect_url,
            );
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                log_in_page(&form, None),
            )
                .into_response();
        }
    };

    let jar = set_session_cookie(jar, &token);
    let jar = set_flash(
        jar,
        Flash::new(
            FlashLevel::Success,
            format!("Welcome back, {}!", account.display_name),
        ),
    );

    (jar, Redirect::to(redirect_url.unwrap_or(endpoints::ROOT))).into_response()
}
