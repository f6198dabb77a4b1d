//! Defines the endpoint for deleting an expense from the HTML pages.

use axum::{
    Extension,
    extract::{Path, State, rejection::PathRejection},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::PrivateCookieJar;

use crate::{
    auth::SessionContext,
    endpoints,
    expense::{
        ExpenseId, ExpenseState, delete_owned_expense, page_error_response, parse_expense_id,
    },
    flash::{Flash, FlashLevel, set_flash},
};

/// A route handler for deleting an expense, redirects to the expense list.
pub async fn delete_expense_endpoint(
    State(state): State<ExpenseState>,
    Extension(session): Extension<SessionContext>,
    expense_id: Result<Path<ExpenseId>, PathRejection>,
    jar: PrivateCookieJar,
) -> Response {
    let expense_id = match parse_expense_id(expense_id) {
        Ok(expense_id) => expense_id,
        Err(error) => return page_error_response(error, jar),
    };

    match state.with_connection(|connection| {
        delete_owned_expense(expense_id, session.account_id, connection)
    }) {
        Ok(()) => {
            tracing::info!(
                "Account {} deleted expense {expense_id}",
                session.account_id
            );
            let jar = set_flash(jar, Flash::new(FlashLevel::Success, "Expense deleted."));
            (jar, Redirect::to(endpoints::ROOT)).into_response()
        }
        Err(error) => page_error_response(error, jar),
    }
}
