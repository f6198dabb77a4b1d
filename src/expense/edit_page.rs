//! The page and endpoint for changing an existing expense.

use axum::{
    Extension, Form,
    extract::{Path, State, rejection::PathRejection},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::PrivateCookieJar;
use maud::{Markup, html};

use crate::{
    Error,
    auth::SessionContext,
    endpoints::{self, format_endpoint},
    expense::{
        ExpenseChanges, ExpenseForm, ExpenseId, ExpenseState, NewExpense, form::expense_form,
        get_owned_expense, page_error_response, parse_expense_id, update_owned_expense,
    },
    flash::{Flash, FlashLevel, set_flash, take_flash},
    html::{FORM_CONTAINER_STYLE, base},
    navigation::NavBar,
};

fn edit_expense_view(
    display_name: &str,
    expense_id: ExpenseId,
    values: &ExpenseForm,
    error_message: Option<&str>,
    flash: Option<&Flash>,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::EDIT_EXPENSE, display_name).into_html();
    let edit_url = format_endpoint(endpoints::EDIT_EXPENSE, expense_id);
    let form = expense_form(&edit_url, values, "Save changes", error_message);

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="text-2xl font-bold my-4" { "Edit Expense" }
            (form)
        }
    };

    base("Edit Expense", flash, &content)
}

/// Renders the form for editing an expense, filled in with its current values.
pub async fn get_edit_expense_page(
    State(state): State<ExpenseState>,
    Extension(session): Extension<SessionContext>,
    expense_id: Result<Path<ExpenseId>, PathRejection>,
    jar: PrivateCookieJar,
) -> Response {
    let expense_id = match parse_expense_id(expense_id) {
        Ok(expense_id) => expense_id,
        Err(error) => return page_error_response(error, jar),
    };

    let expense = match state
        .with_connection(|connection| get_owned_expense(expense_id, session.account_id, connection))
    {
        Ok(expense) => expense,
        Err(error) => return page_error_response(error, jar),
    };

    let (jar, flash) = take_flash(jar);
    let values = ExpenseForm::from(&expense);

    (
        jar,
        edit_expense_view(
            &session.display_name,
            expense_id,
            &values,
            None,
            flash.as_ref(),
        ),
    )
        .into_response()
}

/// A route handler for saving changes to an expense.
///
/// Redirects to the expense's page on success, otherwise re-renders the form with the
/// entered values and an error message.
pub async fn edit_expense_endpoint(
    State(state): State<ExpenseState>,
    Extension(session): Extension<SessionContext>,
    expense_id: Result<Path<ExpenseId>, PathRejection>,
    jar: PrivateCookieJar,
    Form(form): Form<ExpenseForm>,
) -> Response {
    let expense_id = match parse_expense_id(expense_id) {
        Ok(expense_id) => expense_id,
        Err(error) => return page_error_response(error, jar),
    };

    // Ownership errors take precedence over validation errors.
    if let Err(error) = state
        .with_connection(|connection| get_owned_expense(expense_id, session.account_id, connection))
    {
        return page_error_response(error, jar);
    }

    let result = NewExpense::try_from(&form).and_then(|expense| {
        state.with_connection(|connection| {
            update_owned_expense(
                expense_id,
                session.account_id,
                ExpenseChanges::from(expense),
                connection,
            )
        })
    });

    match result {
        Ok(_) => {
            tracing::info!(
                "Account {} updated expense {expense_id}",
                session.account_id
            );
            let jar = set_flash(jar, Flash::new(FlashLevel::Success, "Expense updated!"));
            let view_url = format_endpoint(endpoints::EXPENSE_VIEW, expense_id);
            (jar, Redirect::to(&view_url)).into_response()
        }
        Err(Error::Validation(message)) => (
            StatusCode::BAD_REQUEST,
            edit_expense_view(
                &session.display_name,
                expense_id,
                &form,
                Some(&message),
                None,
            ),
        )
            .into_response(),
        Err(error) => page_error_response(error, jar),
    }
}

#[cfg(test)]
mod edit_expense_tests {
    use axum::{
        Extension, Form,
        extract::{FromRef, Path, State},
        http::StatusCode,
    };
    use axum_extra::extract::PrivateCookieJar;
    use time::macros::date;

    use crate::{
        AppState,
        auth::SessionContext,
        endpoints::{self, format_endpoint},
        expense::{Expense, ExpenseForm, ExpenseState, NewExpense, create_expense, get_expense},
        test_utils::{
            assert_form_action, assert_form_error_message, assert_form_input_with_value,
            assert_valid_html, get_header, get_test_app_state, get_test_session, must_get_form,
            parse_html_document,
        },
    };

    use super::{edit_expense_endpoint, get_edit_expense_page};

    fn set_up() -> (AppState, ExpenseState, SessionContext, Expense) {
        let app_state = get_test_app_state();
        let (alice, session) = get_test_session(&app_state, "Alice");
        let state = ExpenseState::from_ref(&app_state);
        let expense = state
            .with_connection(|connection| {
                create_expense(
                    alice.id,
                    NewExpense {
                        date: date!(2024 - 01 - 15),
                        category: "Food".to_owned(),
                        item: "Lunch".to_owned(),
                        price: 12.5,
                    },
                    connection,
                )
            })
            .unwrap();

        (app_state, state, session, expense)
    }

    fn edit_form() -> ExpenseForm {
        ExpenseForm {
            date: "2024-01-16".to_owned(),
            category: "Transport".to_owned(),
            custom_category: String::new(),
            item: "Taxi".to_owned(),
            price: "30".to_owned(),
        }
    }

    #[tokio::test]
    async fn page_shows_current_values() {
        let (_, state, session, expense) = set_up();

        let response = get_edit_expense_page(
            State(state.clone()),
            Extension(session),
            Ok(Path(expense.id)),
            PrivateCookieJar::new(state.cookie_key.clone()),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let document = parse_html_document(response).await;
        assert_valid_html(&document);
        let form = must_get_form(&document);
        assert_form_action(&form, &format_endpoint(endpoints::EDIT_EXPENSE, expense.id));
        assert_form_input_with_value(&form, "date", "date", "2024-01-15");
        assert_form_input_with_value(&form, "item", "text", "Lunch");
    }

    #[tokio::test]
    async fn edit_saves_and_redirects_to_expense() {
        let (_, state, session, expense) = set_up();

        let response = edit_expense_endpoint(
            State(state.clone()),
            Extension(session),
            Ok(Path(expense.id)),
            PrivateCookieJar::new(state.cookie_key.clone()),
            Form(edit_form()),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            get_header(&response, "location"),
            format_endpoint(endpoints::EXPENSE_VIEW, expense.id)
        );

        let got = state
            .with_connection(|connection| get_expense(expense.id, connection))
            .unwrap();
        assert_eq!(got.date, date!(2024 - 01 - 16));
        assert_eq!(got.category, "Transport");
        assert_eq!(got.item, "Taxi");
        assert_eq!(got.price, 30.0);
        assert_eq!(got.account_id, expense.account_id);
        assert_eq!(got.created_at, expense.created_at);
    }

    #[tokio::test]
    async fn invalid_price_leaves_expense_unchanged() {
        let (_, state, session, expense) = set_up();

        let response = edit_expense_endpoint(
            State(state.clone()),
            Extension(session),
            Ok(Path(expense.id)),
            PrivateCookieJar::new(state.cookie_key.clone()),
            Form(ExpenseForm {
                price: "-5".to_owned(),
                ..edit_form()
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let document = parse_html_document(response).await;
        assert_form_error_message(&must_get_form(&document), "Price cannot be negative.");

        let got = state
            .with_connection(|connection| get_expense(expense.id, connection))
            .unwrap();
        assert_eq!(got, expense);
    }

    #[tokio::test]
    async fn other_account_cannot_edit() {
        let (app_state, state, _, expense) = set_up();
        let (_, bob_session) = get_test_session(&app_state, "Bob");

        let response = edit_expense_endpoint(
            State(state.clone()),
            Extension(bob_session),
            Ok(Path(expense.id)),
            PrivateCookieJar::new(state.cookie_key.clone()),
            Form(edit_form()),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(get_header(&response, "location"), endpoints::ROOT);
        let got = state
            .with_connection(|connection| get_expense(expense.id, connection))
            .unwrap();
        assert_eq!(got, expense);
    }
}
