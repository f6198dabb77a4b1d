//! The registration page and the endpoint that creates new accounts.

use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::PrivateCookieJar;
use maud::{Markup, html};
use serde::Deserialize;

use crate::{
    Error, PasswordHash,
    account::create_account,
    auth::AuthState,
    endpoints,
    flash::{Flash, FlashLevel, set_flash, take_flash},
    html::{
        BUTTON_PRIMARY_STYLE, LINK_STYLE, base, form_error, log_in_register, password_input,
        text_input,
    },
};

pub(crate) const MISSING_FIELDS_ERROR_MSG: &str = "All fields are required.";
pub(crate) const DUPLICATE_ACCOUNT_ERROR_MSG: &str = "That account already exists.";

/// The raw data entered by the user in the registration form.
#[derive(Clone, Deserialize)]
pub struct RegisterForm {
    /// The name shown once logged in.
    #[serde(default)]
    pub username: String,
    /// The handle used to log in.
    #[serde(default)]
    pub account: String,
    #[serde(default)]
    pub password: String,
}

fn register_form(username: &str, account: &str, error_message: Option<&str>) -> Markup {
    html! {
        form
            method="post"
            action=(endpoints::REGISTER)
            class="space-y-4 md:space-y-6"
        {
            (text_input("Name", "username", "text", username))
            (text_input("Account", "account", "text", account))
            (password_input())
            (form_error(error_message))

            button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
            {
                "Register"
            }

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Already have an account? "
                a href=(endpoints::LOG_IN) tabindex="0" class=(LINK_STYLE)
                {
                    "Log in here"
                }
            }
        }
    }
}

fn register_page(form: &Markup, flash: Option<&Flash>) -> Markup {
    let content = log_in_register("Create an account", form);
    base("Register", flash, &content)
}

/// Display the registration page.
pub async fn get_register_page(jar: PrivateCookieJar) -> Response {
    let (jar, flash) = take_flash(jar);
    let form = register_form("", "", None);

    (jar, register_page(&form, flash.as_ref())).into_response()
}

/// Handler for registration requests via the POST method.
///
/// On success the account is created and the client is redirected to the log-in page.
/// Otherwise, the form is returned with an error message explaining the problem.
pub async fn post_register(
    State(state): State<AuthState>,
    jar: PrivateCookieJar,
    Form(form): Form<RegisterForm>,
) -> Response {
    let username = form.username.trim();
    let account = form.account.trim();

    let render_error = |status: StatusCode, message: &str| {
        let form = register_form(username, account, Some(message));
        (status, register_page(&form, None)).into_response()
    };

    if username.is_empty() || account.is_empty() || form.password.is_empty() {
        return render_error(StatusCode::BAD_REQUEST, MISSING_FIELDS_ERROR_MSG);
    }

    let password_hash = match PasswordHash::new(&form.password, state.password_hash_cost) {
        Ok(password_hash) => password_hash,
        Err(Error::Validation(message)) => {
            return render_error(StatusCode::BAD_REQUEST, &message);
        }
        Err(error) => {
            tracing::error!("Could not hash password: {error}");
            return render_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "An internal error occurred. Please try again later.",
            );
        }
    };

    let result = state.with_connection(|connection| {
        create_account(username, account, password_hash, connection)
    });

    match result {
        Ok(created) => {
            tracing::info!("Registered account {} (\"{}\")", created.id, created.handle);
            let jar = set_flash(
                jar,
                Flash::new(FlashLevel::Success, "Registration successful! Please log in."),
            );
            (jar, Redirect::to(endpoints::LOG_IN)).into_response()
        }
        Err(Error::DuplicateHandle(_)) => {
            render_error(StatusCode::CONFLICT, DUPLICATE_ACCOUNT_ERROR_MSG)
        }
        Err(error) => {
            tracing::error!("Could not create account: {error}");
            render_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "An internal error occurred. Please try again later.",
            )
        }
    }
}
