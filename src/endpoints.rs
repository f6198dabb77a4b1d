//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/expense/{expense_id}', use [format_endpoint].

/// The landing page for logged in users, lists their expenses.
pub const ROOT: &str = "/";
/// The route for the registration page and form.
pub const REGISTER: &str = "/register";
/// The route for the log-in page and form.
pub const LOG_IN: &str = "/login";
/// The route for the client to log out the current user.
pub const LOG_OUT: &str = "/logout";
/// The page and form for creating a new expense.
pub const NEW_EXPENSE: &str = "/expense/new";
/// The page for displaying a single expense.
pub const EXPENSE_VIEW: &str = "/expense/{expense_id}";
/// The page and form for editing an existing expense.
pub const EDIT_EXPENSE: &str = "/expense/{expense_id}/edit";
/// The form target for deleting an expense.
pub const DELETE_EXPENSE: &str = "/expense/{expense_id}/delete";

/// The route to list and create expenses via JSON.
pub const EXPENSES_API: &str = "/api/expenses";
/// The route to read, update and delete a single expense via JSON.
pub const EXPENSE_API: &str = "/api/expenses/{expense_id}";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/expense/{expense_id}', '{expense_id}' is the parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_owned();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|offset| param_start + offset + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
