//! Server-side sessions keyed by a random token that the client holds in a cookie.

use rusqlite::{Connection, named_params};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::{Account, AccountId, Error};

/// How long a session stays valid after the last request that used it.
pub const DEFAULT_SESSION_DURATION: Duration = Duration::days(1);

/// The authenticated user a request is being made for.
///
/// The auth guard inserts this into the request extensions, protected route
/// handlers receive it with `Extension(session): Extension<SessionContext>`.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionContext {
    /// The account that owns the session.
    pub account_id: AccountId,
    /// The name shown in the navigation bar.
    pub display_name: String,
}

/// Create the session table.
///
/// Sessions are deleted along with the account they belong to.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_session_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS session (
                token TEXT PRIMARY KEY,
                account_id INTEGER NOT NULL,
                display_name TEXT NOT NULL,
                expires_at INTEGER NOT NULL,
                FOREIGN KEY(account_id) REFERENCES account(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    Ok(())
}

/// Start a new session for `account` that expires after `duration`, and
/// return its token.
///
/// Expired sessions of any account are purged at the same time.
///
/// # Errors
///
/// Returns an [Error::SqlError] if the session could not be stored.
pub fn create_session(
    account: &Account,
    duration: Duration,
    connection: &Connection,
) -> Result<String, Error> {
    let now = OffsetDateTime::now_utc();
    let token = Uuid::new_v4().simple().to_string();

    connection.execute(
        "DELETE FROM session WHERE expires_at <= ?1",
        (now.unix_timestamp(),),
    )?;

    connection.execute(
        "INSERT INTO session (token, account_id, display_name, expires_at) VALUES (?1, ?2, ?3, ?4)",
        (
            &token,
            account.id.as_i64(),
            &account.display_name,
            (now + duration).unix_timestamp(),
        ),
    )?;

    Ok(token)
}

/// Look up the unexpired session identified by `token`.
///
/// # Errors
///
/// Returns an [Error::NotFound] if there is no such session or it has expired,
/// or an [Error::SqlError] if the query failed.
pub fn get_session(token: &str, connection: &Connection) -> Result<SessionContext, Error> {
    connection
        .prepare(
            "SELECT account_id, display_name FROM session
            WHERE token = :token AND expires_at > :now",
        )?
        .query_row(
            named_params! {
                ":token": token,
                ":now": OffsetDateTime::now_utc().unix_timestamp(),
            },
            |row| {
                Ok(SessionContext {
                    account_id: AccountId::new(row.get(0)?),
                    display_name: row.get(1)?,
                })
            },
        )
        .map_err(|error| error.into())
}

/// Push the expiry of the session identified by `token` out to `duration`
/// from now.
///
/// # Errors
///
/// Returns an [Error::SqlError] if the update failed.
pub fn refresh_session(token: &str, duration: Duration, connection: &Connection) -> Result<(), Error> {
    let expires_at = (OffsetDateTime::now_utc() + duration).unix_timestamp();

    connection.execute(
        "UPDATE session SET expires_at = ?1 WHERE token = ?2 AND expires_at < ?1",
        (expires_at, token),
    )?;

    Ok(())
}

/// End the session identified by `token`. Ending a session that does not exist is not an error.
///
/// # Errors
///
/// Returns an [Error::SqlError] if the delete failed.
pub fn delete_session(token: &str, connection: &Connection) -> Result<(), Error> {
    connection.execute("DELETE FROM session WHERE token = ?1", (token,))?;

    Ok(())
}

#[cfg(test)]
mod session_tests {
    use rusqlite::Connection;
    use time::Duration;

    use crate::{
        Account, Error, PasswordHash, account::create_account, db::open_connection,
        initialize_db,
    };

    use super::{SessionContext, create_session, delete_session, get_session, refresh_session};

    fn get_test_connection() -> (Connection, Account) {
        let connection = open_connection(Some(":memory:")).unwrap();
        initialize_db(&connection).unwrap();
        let account = create_account(
            "Alice",
            "alice",
            PasswordHash::new_unchecked("hunter2"),
            &connection,
        )
        .unwrap();

        (connection, account)
    }

    #[test]
    fn created_session_can_be_retrieved() {
        let (connection, account) = get_test_connection();

        let token = create_session(&account, Duration::minutes(5), &connection).unwrap();
        let session = get_session(&token, &connection).unwrap();

        assert_eq!(
            session,
            SessionContext {
                account_id: account.id,
                display_name: "Alice".to_owned(),
            }
        );
    }

    #[test]
    fn tokens_are_unique() {
        let (connection, account) = get_test_connection();

        let first = create_session(&account, Duration::minutes(5), &connection).unwrap();
        let second = create_session(&account, Duration::minutes(5), &connection).unwrap();

        assert_ne!(first, second);
    }

    #[test]
    fn expired_session_is_not_found() {
        let (connection, account) = get_test_connection();

        let token = create_session(&account, Duration::seconds(-1), &connection).unwrap();

        assert_eq!(get_session(&token, &connection), Err(Error::NotFound));
    }

    #[test]
    fn refresh_revives_session_close_to_expiry() {
        let (connection, account) = get_test_connection();
        let token = create_session(&account, Duration::seconds(30), &connection).unwrap();

        refresh_session(&token, Duration::days(1), &connection).unwrap();

        let expires_at: i64 = connection
            .query_row("SELECT expires_at FROM session WHERE token = ?1", (&token,), |row| {
                row.get(0)
            })
            .unwrap();
        let remaining = expires_at - time::OffsetDateTime::now_utc().unix_timestamp();
        assert!(remaining > Duration::hours(23).whole_seconds());
    }

    #[test]
    fn deleted_session_is_not_found() {
        let (connection, account) = get_test_connection();
        let token = create_session(&account, Duration::minutes(5), &connection).unwrap();

        delete_session(&token, &connection).unwrap();

        assert_eq!(get_session(&token, &connection), Err(Error::NotFound));
    }

    #[test]
    fn unknown_token_is_not_found() {
        let (connection, _) = get_test_connection();

        assert_eq!(get_session("not-a-token", &connection), Err(Error::NotFound));
    }
}
