//! Expense entries: storage, validation, and the HTML pages and JSON API over them.
//!
//! Every operation is scoped to the account in the request's [SessionContext](crate::auth::SessionContext).

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, rejection::PathRejection},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use rusqlite::Connection;

use crate::{
    AppState, Error, db, endpoints,
    flash::{Flash, FlashLevel, set_flash},
};

mod api;
mod core;
mod create_page;
mod delete_endpoint;
mod edit_page;
mod form;
mod list_page;
mod validation;
mod view_page;

pub use api::{
    create_expense_api, delete_expense_api, get_expense_api, list_expenses_api,
    update_expense_api,
};
pub use core::{
    Expense, ExpenseChanges, ExpenseId, NewExpense, create_expense, create_expense_table,
    delete_owned_expense, get_expense, get_owned_expense, list_expenses, total_price,
    update_owned_expense,
};
pub use create_page::{create_expense_endpoint, get_create_expense_page};
pub use delete_endpoint::delete_expense_endpoint;
pub use edit_page::{edit_expense_endpoint, get_edit_expense_page};
pub use list_page::get_expenses_page;
pub use validation::{ExpenseForm, ExpensePatch, NewExpenseRequest, PriceInput, format_date};
pub use view_page::get_expense_page;

/// The state needed by the expense pages and API.
#[derive(Debug, Clone)]
pub struct ExpenseState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The database connection for managing expenses.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ExpenseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<ExpenseState> for Key {
    fn from_ref(state: &ExpenseState) -> Self {
        state.cookie_key.clone()
    }
}

impl ExpenseState {
    pub(crate) fn with_connection<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, Error>,
    ) -> Result<T, Error> {
        db::with_connection(&self.db_connection, f)
    }
}

/// Read the expense ID from the URL.
///
/// An ID that is not a valid integer cannot name an expense, so it is reported as
/// [Error::NotFound] instead of axum's plain text rejection.
fn parse_expense_id(path: Result<Path<ExpenseId>, PathRejection>) -> Result<ExpenseId, Error> {
    path.map(|Path(expense_id)| expense_id).map_err(|rejection| {
        tracing::debug!("Rejected expense ID: {rejection}");
        Error::NotFound
    })
}

pub(crate) const FORBIDDEN_MESSAGE: &str = "You do not have permission to access this expense.";

/// Turn an error from one of the expense pages into a response.
///
/// Trying to touch someone else's expense sends the user back to their expense list with a
/// notice, everything else is rendered as an error page.
fn page_error_response(error: Error, jar: PrivateCookieJar) -> Response {
    match error {
        Error::Forbidden => {
            let jar = set_flash(jar, Flash::new(FlashLevel::Danger, FORBIDDEN_MESSAGE));
            (jar, Redirect::to(endpoints::ROOT)).into_response()
        }
        error => error.into_response(),
    }
}
