//! The JSON API over the same expense operations as the HTML pages.
//!
//! Errors are returned as `{"error": "..."}` with a matching status code.

use axum::{
    Extension, Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;
use time::{OffsetDateTime, format_description::BorrowedFormatItem, macros::format_description};

use crate::{
    AccountId, Error,
    auth::SessionContext,
    expense::{
        Expense, ExpenseChanges, ExpenseId, ExpensePatch, ExpenseState, NewExpense,
        NewExpenseRequest, create_expense, delete_owned_expense, format_date, get_owned_expense,
        list_expenses, parse_expense_id, update_owned_expense,
    },
};

/// An expense as it is sent to API clients.
#[derive(Debug, Serialize, PartialEq)]
pub struct ExpenseResponse {
    pub id: ExpenseId,
    #[serde(rename = "user_id")]
    pub account_id: AccountId,
    /// Formatted as `YYYY-MM-DD`.
    pub date: String,
    pub category: String,
    pub item: String,
    pub price: f64,
    /// Formatted as `YYYY-MM-DD HH:MM:SS` in UTC.
    pub created_at: String,
}

const TIMESTAMP_FORMAT: &[BorrowedFormatItem] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

fn format_timestamp(timestamp: OffsetDateTime) -> String {
    timestamp.format(TIMESTAMP_FORMAT).unwrap_or_else(|error| {
        tracing::error!("Could not format timestamp {timestamp}: {error}");
        timestamp.to_string()
    })
}

impl From<Expense> for ExpenseResponse {
    fn from(expense: Expense) -> Self {
        Self {
            id: expense.id,
            account_id: expense.account_id,
            date: format_date(expense.date),
            category: expense.category,
            item: expense.item,
            price: expense.price,
            created_at: format_timestamp(expense.created_at),
        }
    }
}

fn json_rejection_error(rejection: JsonRejection) -> Error {
    tracing::debug!("Rejected JSON body: {rejection}");
    Error::Validation(rejection.body_text())
}

fn json_response<T: Serialize>(result: Result<T, Error>, status: StatusCode) -> Response {
    match result {
        Ok(body) => (status, Json(body)).into_response(),
        Err(error) => error.into_json_response(),
    }
}

/// `GET /api/expenses`: every expense the user owns, newest date first.
pub async fn list_expenses_api(
    State(state): State<ExpenseState>,
    Extension(session): Extension<SessionContext>,
) -> Response {
    let result = state
        .with_connection(|connection| list_expenses(session.account_id, connection))
        .map(|expenses| {
            expenses
                .into_iter()
                .map(ExpenseResponse::from)
                .collect::<Vec<_>>()
        });

    json_response(result, StatusCode::OK)
}

/// `POST /api/expenses`: record a new expense, responds with `201 Created`.
pub async fn create_expense_api(
    State(state): State<ExpenseState>,
    Extension(session): Extension<SessionContext>,
    payload: Result<Json<NewExpenseRequest>, JsonRejection>,
) -> Response {
    let result = payload
        .map_err(json_rejection_error)
        .and_then(|Json(request)| NewExpense::try_from(request))
        .and_then(|expense| {
            state.with_connection(|connection| {
                create_expense(session.account_id, expense, connection)
            })
        })
        .map(ExpenseResponse::from);

    json_response(result, StatusCode::CREATED)
}

/// `GET /api/expenses/{expense_id}`
pub async fn get_expense_api(
    State(state): State<ExpenseState>,
    Extension(session): Extension<SessionContext>,
    expense_id: Result<Path<ExpenseId>, PathRejection>,
) -> Response {
    let expense_id = match parse_expense_id(expense_id) {
        Ok(expense_id) => expense_id,
        Err(error) => return error.into_json_response(),
    };

    let result = state
        .with_connection(|connection| get_owned_expense(expense_id, session.account_id, connection))
        .map(ExpenseResponse::from);

    json_response(result, StatusCode::OK)
}

/// `PUT /api/expenses/{expense_id}`: change only the fields present in the body.
pub async fn update_expense_api(
    State(state): State<ExpenseState>,
    Extension(session): Extension<SessionContext>,
    expense_id: Result<Path<ExpenseId>, PathRejection>,
    payload: Result<Json<ExpensePatch>, JsonRejection>,
) -> Response {
    let expense_id = match parse_expense_id(expense_id) {
        Ok(expense_id) => expense_id,
        Err(error) => return error.into_json_response(),
    };

    // Ownership errors take precedence over validation errors.
    let result = state
        .with_connection(|connection| get_owned_expense(expense_id, session.account_id, connection))
        .and_then(|_| payload.map_err(json_rejection_error))
        .and_then(|Json(patch)| ExpenseChanges::try_from(patch))
        .and_then(|changes| {
            state.with_connection(|connection| {
                update_owned_expense(expense_id, session.account_id, changes, connection)
            })
        })
        .map(ExpenseResponse::from);

    json_response(result, StatusCode::OK)
}

/// `DELETE /api/expenses/{expense_id}`
pub async fn delete_expense_api(
    State(state): State<ExpenseState>,
    Extension(session): Extension<SessionContext>,
    expense_id: Result<Path<ExpenseId>, PathRejection>,
) -> Response {
    let expense_id = match parse_expense_id(expense_id) {
        Ok(expense_id) => expense_id,
        Err(error) => return error.into_json_response(),
    };

    let result = state
        .with_connection(|connection| {
            delete_owned_expense(expense_id, session.account_id, connection)
        })
        .map(|()| json!({ "message": "Expense deleted successfully" }));

    json_response(result, StatusCode::OK)
}
