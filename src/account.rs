//! Code for creating the account table and fetching accounts from the database.

use std::fmt::Display;

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{Error, PasswordHash};

/// A newtype wrapper for integer account IDs.
///
/// This helps disambiguate account IDs from expense IDs, leading to better compile time
/// errors when the two are mixed up in ownership checks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct AccountId(i64);

impl AccountId {
    /// Create a new account ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the account ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A registered user of the application.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    /// The account's ID in the application database.
    pub id: AccountId,
    /// The name shown to the user once logged in.
    pub display_name: String,
    /// The unique name the user logs in with.
    pub handle: String,
    /// The account's password hash.
    pub password_hash: PasswordHash,
}

/// Create the account table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_account_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS account (
                id INTEGER PRIMARY KEY,
                display_name TEXT NOT NULL,
                handle TEXT NOT NULL UNIQUE,
                password TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

/// Create and insert a new account into the database.
///
/// # Errors
///
/// Returns a:
/// - [Error::DuplicateHandle] if `handle` is already registered,
/// - or [Error::SqlError] if some other SQL related error occurred.
pub fn create_account(
    display_name: &str,
    handle: &str,
    password_hash: PasswordHash,
    connection: &Connection,
) -> Result<Account, Error> {
    connection
        .execute(
            "INSERT INTO account (display_name, handle, password) VALUES (?1, ?2, ?3)",
            (display_name, handle, password_hash.as_ref()),
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
                },
                _,
            ) => Error::DuplicateHandle(handle.to_owned()),
            error => error.into(),
        })?;

    let id = AccountId::new(connection.last_insert_rowid());

    Ok(Account {
        id,
        display_name: display_name.to_owned(),
        handle: handle.to_owned(),
        password_hash,
    })
}

/// Get the account registered with the login handle `handle`.
///
/// # Errors
///
/// This function will return an [Error::NotFound] if no account uses `handle`,
/// or an [Error::SqlError] if there was an error trying to access the store.
pub fn get_account_by_handle(handle: &str, connection: &Connection) -> Result<Account, Error> {
    connection
        .prepare("SELECT id, display_name, handle, password FROM account WHERE handle = :handle")?
        .query_row(&[(":handle", &handle)], map_account_row)
        .map_err(|error| error.into())
}

fn map_account_row(row: &Row) -> Result<Account, rusqlite::Error> {
    let raw_password_hash: String = row.get(3)?;

    Ok(Account {
        id: AccountId::new(row.get(0)?),
        display_name: row.get(1)?,
        handle: row.get(2)?,
        password_hash: PasswordHash::new_unchecked(&raw_password_hash),
    })
}
