use rusqlite::{Connection, Row, named_params};
use time::{Date, Duration, OffsetDateTime};

use crate::{AccountId, Error};

pub type ExpenseId = i64;

/// A single dated spending record owned by one account.
#[derive(Debug, Clone, PartialEq)]
pub struct Expense {
    /// The id for the expense.
    pub id: ExpenseId,
    /// The account that created the expense. Never changes.
    pub account_id: AccountId,
    /// The day the money was spent.
    pub date: Date,
    pub category: String,
    /// What the money was spent on.
    pub item: String,
    pub price: f64,
    /// When the expense was recorded, in UTC.
    pub created_at: OffsetDateTime,
}

/// The validated fields for an expense that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    pub date: Date,
    pub category: String,
    pub item: String,
    pub price: f64,
}

/// The fields to change on an existing expense. `None` leaves a field as it is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpenseChanges {
    pub date: Option<Date>,
    pub category: Option<String>,
    pub item: Option<String>,
    pub price: Option<f64>,
}

impl ExpenseChanges {
    fn apply_to(self, expense: &mut Expense) {
        if let Some(date) = self.date {
            expense.date = date;
        }
        if let Some(category) = self.category {
            expense.category = category;
        }
        if let Some(item) = self.item {
            expense.item = item;
        }
        if let Some(price) = self.price {
            expense.price = price;
        }
    }
}

impl From<NewExpense> for ExpenseChanges {
    fn from(expense: NewExpense) -> Self {
        Self {
            date: Some(expense.date),
            category: Some(expense.category),
            item: Some(expense.item),
            price: Some(expense.price),
        }
    }
}

pub fn create_expense_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS expense (
            id INTEGER PRIMARY KEY,
            account_id INTEGER NOT NULL,
            date TEXT NOT NULL,
            category TEXT NOT NULL,
            item TEXT NOT NULL,
            price REAL NOT NULL,
            created_at TEXT NOT NULL,
            FOREIGN KEY(account_id) REFERENCES account(id) ON UPDATE CASCADE ON DELETE CASCADE
        )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_expense_account_date ON expense(account_id, date)",
        (),
    )?;

    Ok(())
}

fn map_row_to_expense(row: &Row) -> Result<Expense, rusqlite::Error> {
    Ok(Expense {
        id: row.get(0)?,
        account_id: AccountId::new(row.get(1)?),
        date: row.get(2)?,
        category: row.get(3)?,
        item: row.get(4)?,
        price: row.get(5)?,
        created_at: row.get(6)?,
    })
}

/// Store `expense` as owned by `account_id` and stamp it with the current time.
///
/// # Errors
/// Returns an [Error::SqlError] if the insert failed, e.g. `account_id` does not exist.
pub fn create_expense(
    account_id: AccountId,
    expense: NewExpense,
    connection: &Connection,
) -> Result<Expense, Error> {
    let now = OffsetDateTime::now_utc();
    // Creation times are kept to whole seconds.
    let created_at = now - Duration::nanoseconds(i64::from(now.nanosecond()));

    connection.execute(
        "INSERT INTO expense (account_id, date, category, item, price, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        (
            account_id.as_i64(),
            expense.date,
            &expense.category,
            &expense.item,
            expense.price,
            created_at,
        ),
    )?;

    Ok(Expense {
        id: connection.last_insert_rowid(),
        account_id,
        date: expense.date,
        category: expense.category,
        item: expense.item,
        price: expense.price,
        created_at,
    })
}

/// Get the expense with `id`, whoever owns it.
///
/// # Errors
/// Returns an [Error::NotFound] if there is no expense with `id`.
pub fn get_expense(id: ExpenseId, connection: &Connection) -> Result<Expense, Error> {
    connection
        .prepare(
            "SELECT id, account_id, date, category, item, price, created_at
            FROM expense WHERE id = :id",
        )?
        .query_row(named_params! {":id": id}, map_row_to_expense)
        .map_err(Error::from)
}

/// All expenses owned by `account_id`, newest date first.
///
/// Expenses on the same date are listed in the order they were created.
pub fn list_expenses(account_id: AccountId, connection: &Connection) -> Result<Vec<Expense>, Error> {
    connection
        .prepare(
            "SELECT id, account_id, date, category, item, price, created_at
            FROM expense WHERE account_id = :account_id
            ORDER BY date DESC, id ASC",
        )?
        .query_map(
            named_params! {":account_id": account_id.as_i64()},
            map_row_to_expense,
        )?
        .map(|maybe_expense| maybe_expense.map_err(Error::from))
        .collect()
}

/// The sum of the prices of `expenses`.
pub fn total_price(expenses: &[Expense]) -> f64 {
    expenses.iter().map(|expense| expense.price).sum()
}

/// Write the date, category, item and price of `expense` back to the database.
///
/// The owner and creation time are never updated.
pub fn update_expense(expense: &Expense, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE expense SET date = ?1, category = ?2, item = ?3, price = ?4 WHERE id = ?5",
        (
            expense.date,
            &expense.category,
            &expense.item,
            expense.price,
            expense.id,
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Delete the expense with `id`.
///
/// # Errors
/// Returns an [Error::NotFound] if there is no expense with `id`.
pub fn delete_expense(id: ExpenseId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM expense WHERE id = ?1", (id,))?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Get the expense with `id` if it belongs to `account_id`.
///
/// # Errors
/// Returns an [Error::NotFound] if there is no expense with `id`, or an
/// [Error::Forbidden] if another account owns it.
pub fn get_owned_expense(
    id: ExpenseId,
    account_id: AccountId,
    connection: &Connection,
) -> Result<Expense, Error> {
    let expense = get_expense(id, connection)?;

    if expense.account_id != account_id {
        tracing::warn!(
            "Account {account_id} tried to access expense {id} owned by account {}",
            expense.account_id
        );
        return Err(Error::Forbidden);
    }

    Ok(expense)
}

/// Apply `changes` to the expense with `id` if it belongs to `account_id`, and
/// return the updated expense.
///
/// The ownership check and the update happen in one transaction.
///
/// # Errors
/// Same as [get_owned_expense], plus [Error::SqlError] if the update failed.
pub fn update_owned_expense(
    id: ExpenseId,
    account_id: AccountId,
    changes: ExpenseChanges,
    connection: &Connection,
) -> Result<Expense, Error> {
    let transaction = connection.unchecked_transaction()?;

    let mut expense = get_owned_expense(id, account_id, &transaction)?;
    changes.apply_to(&mut expense);
    update_expense(&expense, &transaction)?;

    transaction.commit()?;

    Ok(expense)
}

/// Delete the expense with `id` if it belongs to `account_id`.
///
/// # Errors
/// Same as [get_owned_expense].
pub fn delete_owned_expense(
    id: ExpenseId,
    account_id: AccountId,
    connection: &Connection,
) -> Result<(), Error> {
    let transaction = connection.unchecked_transaction()?;

    get_owned_expense(id, account_id, &transaction)?;
    delete_expense(id, &transaction)?;

    transaction.commit()?;

    Ok(())
}

#[cfg(test)]
mod create_table_tests {
    use rusqlite::Connection;

    use crate::account::create_account_table;

    use super::create_expense_table;

    #[test]
    fn sql_is_valid() {
        let connection =
            Connection::open_in_memory().expect("Could not initialise in-memory SQLite database");
        create_account_table(&connection).unwrap();

        assert_eq!(Ok(()), create_expense_table(&connection));
    }
}
