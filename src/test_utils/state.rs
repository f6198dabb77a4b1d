use rusqlite::Connection;

use crate::{
    Account, AppState, PasswordHash, account::create_account, auth::SessionContext,
};

/// An [AppState] over a fresh in-memory database, with a bcrypt cost low enough for tests.
pub(crate) fn get_test_app_state() -> AppState {
    let connection = Connection::open_in_memory().unwrap();
    let mut state = AppState::new(connection, "42").unwrap();
    state.password_hash_cost = 4;

    state
}

/// Create an account called `display_name` and the session context a logged in request
/// for it would carry.
pub(crate) fn get_test_session(state: &AppState, display_name: &str) -> (Account, SessionContext) {
    let connection = state.db_connection.lock().unwrap();
    let account = create_account(
        display_name,
        &display_name.to_lowercase(),
        PasswordHash::new_unchecked("hunter2"),
        &connection,
    )
    .unwrap();
    let session = SessionContext {
        account_id: account.id,
        display_name: account.display_name.clone(),
    };

    (account, session)
}
