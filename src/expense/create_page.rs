//! The page and endpoint for recording a new expense.

use axum::{
    Extension, Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::PrivateCookieJar;
use maud::{Markup, html};
use time::OffsetDateTime;

use crate::{
    Error,
    auth::SessionContext,
    endpoints,
    expense::{
        ExpenseForm, ExpenseState, NewExpense, create_expense, form::expense_form, format_date,
    },
    flash::{Flash, FlashLevel, set_flash, take_flash},
    html::{FORM_CONTAINER_STYLE, base},
    navigation::NavBar,
};

fn create_expense_view(
    display_name: &str,
    values: &ExpenseForm,
    error_message: Option<&str>,
    flash: Option<&Flash>,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::NEW_EXPENSE, display_name).into_html();
    let form = expense_form(endpoints::NEW_EXPENSE, values, "Add expense", error_message);

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="text-2xl font-bold my-4" { "New Expense" }
            (form)
        }
    };

    base("New Expense", flash, &content)
}

/// Renders the page for recording an expense, with the date set to today.
pub async fn get_create_expense_page(
    Extension(session): Extension<SessionContext>,
    jar: PrivateCookieJar,
) -> Response {
    let (jar, flash) = take_flash(jar);
    let values = ExpenseForm {
        date: format_date(OffsetDateTime::now_utc().date()),
        ..Default::default()
    };

    (
        jar,
        create_expense_view(&session.display_name, &values, None, flash.as_ref()),
    )
        .into_response()
}

/// A route handler for recording a new expense.
///
/// Redirects to the expense list on success, otherwise re-renders the form with the
/// entered values and an error message.
pub async fn create_expense_endpoint(
    State(state): State<ExpenseState>,
    Extension(session): Extension<SessionContext>,
    jar: PrivateCookieJar,
    Form(form): Form<ExpenseForm>,
) -> Response {
    let result = NewExpense::try_from(&form).and_then(|expense| {
        state.with_connection(|connection| create_expense(session.account_id, expense, connection))
    });

    match result {
        Ok(expense) => {
            tracing::info!(
                "Account {} created expense {}",
                session.account_id,
                expense.id
            );
            let jar = set_flash(jar, Flash::new(FlashLevel::Success, "Expense added!"));
            (jar, Redirect::to(endpoints::ROOT)).into_response()
        }
        Err(Error::Validation(message)) => (
            StatusCode::BAD_REQUEST,
            create_expense_view(&session.display_name, &form, Some(&message), None),
        )
            .into_response(),
        Err(error) => error.into_response(),
    }
}
