//! Opening the application database and creating its tables.

use std::sync::Mutex;

use rusqlite::{Connection, Transaction, TransactionBehavior};

use crate::{
    Error, account::create_account_table, auth::create_session_table,
    expense::create_expense_table,
};

/// The SQLite file used when no database URL is configured.
pub const DEFAULT_DATABASE_PATH: &str = "expense_tracker.db";

/// Where the database lives, as parsed from a database URL.
#[derive(Debug, PartialEq)]
enum DatabaseTarget<'a> {
    File(&'a str),
    Memory,
}

fn parse_database_url(database_url: Option<&str>) -> Result<DatabaseTarget<'_>, Error> {
    let url = match database_url.map(str::trim) {
        None | Some("") => return Ok(DatabaseTarget::File(DEFAULT_DATABASE_PATH)),
        Some(url) => url,
    };

    let path = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))
        .unwrap_or(url);

    if path.contains("://") {
        return Err(Error::UnsupportedDatabaseUrl(url.to_owned()));
    }

    match path {
        "" => Ok(DatabaseTarget::File(DEFAULT_DATABASE_PATH)),
        ":memory:" => Ok(DatabaseTarget::Memory),
        path => Ok(DatabaseTarget::File(path)),
    }
}

/// Open a connection to the database named by `database_url`.
///
/// Accepts `sqlite://PATH`, `sqlite:PATH`, a bare file path or `:memory:`.
/// When `database_url` is `None` or empty, [DEFAULT_DATABASE_PATH] is used.
///
/// # Errors
///
/// Returns an [Error::UnsupportedDatabaseUrl] if the URL names a non-SQLite
/// backend, or an [Error::SqlError] if the database could not be opened.
pub fn open_connection(database_url: Option<&str>) -> Result<Connection, Error> {
    let connection = match parse_database_url(database_url)? {
        DatabaseTarget::File(path) => {
            tracing::info!("Opening SQLite database at {path}");
            Connection::open(path)?
        }
        DatabaseTarget::Memory => {
            tracing::info!("Opening in-memory SQLite database");
            Connection::open_in_memory()?
        }
    };

    Ok(connection)
}

/// Run `f` with the shared database connection locked.
///
/// The lock is released before this function returns, so it is safe to call from async
/// handlers as long as the result does not borrow from the connection.
///
/// # Errors
/// Returns an [Error::DatabaseLockError] if the lock is poisoned, otherwise whatever `f` returns.
pub(crate) fn with_connection<T>(
    db_connection: &Mutex<Connection>,
    f: impl FnOnce(&Connection) -> Result<T, Error>,
) -> Result<T, Error> {
    let connection = db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    f(&connection)
}

/// Create all of the database tables for the application.
///
/// Foreign key enforcement is switched on for `connection` so that deleting an
/// account deletes its expenses and sessions.
///
/// # Errors
/// This function may return a [rusqlite::Error] if something went wrong creating the tables.
pub fn initialize(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.pragma_update(None, "foreign_keys", true)?;

    let transaction = Transaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_account_table(&transaction)?;
    create_expense_table(&transaction)?;
    create_session_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
