//! An embedded document store backed by SQLite.
//!
//! Each collection is a table with one column per transaction field. The
//! store generates ObjectIds itself so IDs look the same as with MongoDB.

use std::sync::{Arc, Mutex, MutexGuard};

use mongodb::bson::oid::ObjectId;
use rusqlite::{Connection, OptionalExtension, Row, types::Type};
use time::OffsetDateTime;

use crate::{
    Error,
    database_id::TransactionId,
    store::StoreError,
    transaction::{Transaction, TransactionFields, TransactionType},
};

/// A verified connection to a SQLite database.
#[derive(Debug, Clone)]
pub struct SqliteDatabase {
    connection: Arc<Mutex<Connection>>,
}

impl SqliteDatabase {
    pub(super) fn open_in_memory() -> Result<Self, Error> {
        let connection = Connection::open_in_memory().map_err(connection_error)?;

        Self::verify(connection)
    }

    pub(super) fn open(path: &str) -> Result<Self, Error> {
        let connection = Connection::open(path).map_err(connection_error)?;

        Self::verify(connection)
    }

    fn verify(connection: Connection) -> Result<Self, Error> {
        connection
            .query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
            .map_err(connection_error)?;

        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    /// Get the collection `name`, creating its table if it does not exist yet.
    pub(super) fn collection(&self, name: &str) -> Result<SqliteCollection, Error> {
        if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(Error::Connection(format!(
                "\"{name}\" is not a valid collection name"
            )));
        }

        let connection = self
            .connection
            .lock()
            .map_err(|_| Error::Connection("could not acquire the database lock".to_owned()))?;
        create_collection_table(&connection, name).map_err(connection_error)?;

        Ok(SqliteCollection {
            connection: self.connection.clone(),
            table: name.to_owned(),
        })
    }
}

fn connection_error(error: rusqlite::Error) -> Error {
    Error::Connection(format!("SQLite error: {error}"))
}

/// Create the table for a collection of transactions.
fn create_collection_table(connection: &Connection, table: &str) -> Result<(), rusqlite::Error> {
    connection.execute(
        &format!(
            "CREATE TABLE IF NOT EXISTS \"{table}\" (
                id TEXT PRIMARY KEY,
                amount REAL NOT NULL,
                description TEXT NOT NULL,
                category TEXT NOT NULL,
                type TEXT NOT NULL,
                date TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )"
        ),
        (),
    )?;

    connection.execute(
        &format!("CREATE INDEX IF NOT EXISTS \"idx_{table}_date\" ON \"{table}\"(date);"),
        (),
    )?;

    Ok(())
}

/// A collection of transactions stored in one SQLite table.
#[derive(Debug, Clone)]
pub struct SqliteCollection {
    connection: Arc<Mutex<Connection>>,
    table: String,
}

impl SqliteCollection {
    #[cfg(test)]
    pub(super) fn connection(&self) -> Arc<Mutex<Connection>> {
        self.connection.clone()
    }

    /// Run `operation` on a blocking thread with the connection locked.
    ///
    /// The lock is only waited for on the blocking thread, so a caller's
    /// deadline still fires while another operation holds it.
    async fn run<T, F>(&self, operation: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection, &str) -> Result<T, StoreError> + Send + 'static,
    {
        let connection = self.connection.clone();
        let table = self.table.clone();

        tokio::task::spawn_blocking(move || {
            let connection = lock(&connection)?;
            operation(&connection, &table)
        })
        .await?
    }

    pub(super) async fn find_all_by_date_desc(&self) -> Result<Vec<Transaction>, StoreError> {
        self.run(|connection, table| {
            let transactions = connection
                .prepare(&format!(
                    "SELECT id, amount, description, category, type, date, created_at, updated_at
                     FROM \"{table}\" ORDER BY date DESC"
                ))?
                .query_map([], map_transaction_row)?
                .collect::<Result<Vec<_>, _>>()?;

            Ok(transactions)
        })
        .await
    }

    pub(super) async fn find_one(
        &self,
        id: TransactionId,
    ) -> Result<Option<Transaction>, StoreError> {
        self.run(move |connection, table| {
            let transaction = connection
                .prepare(&format!(
                    "SELECT id, amount, description, category, type, date, created_at, updated_at
                     FROM \"{table}\" WHERE id = :id"
                ))?
                .query_row(&[(":id", &id.to_hex())], map_transaction_row)
                .optional()?;

            Ok(transaction)
        })
        .await
    }

    pub(super) async fn insert_one(
        &self,
        fields: &TransactionFields,
        now: OffsetDateTime,
    ) -> Result<TransactionId, StoreError> {
        let fields = fields.clone();

        self.run(move |connection, table| {
            let id = ObjectId::new();

            connection.execute(
                &format!(
                    "INSERT INTO \"{table}\"
                     (id, amount, description, category, type, date, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)"
                ),
                (
                    id.to_hex(),
                    fields.amount,
                    &fields.description,
                    &fields.category,
                    fields.kind.as_str(),
                    fields.date,
                    now,
                ),
            )?;

            Ok(id)
        })
        .await
    }

    pub(super) async fn update_one(
        &self,
        id: TransactionId,
        fields: &TransactionFields,
        now: OffsetDateTime,
    ) -> Result<bool, StoreError> {
        let fields = fields.clone();

        self.run(move |connection, table| {
            let rows_affected = connection.execute(
                &format!(
                    "UPDATE \"{table}\"
                     SET amount = ?2, description = ?3, category = ?4, type = ?5, date = ?6,
                         updated_at = ?7
                     WHERE id = ?1"
                ),
                (
                    id.to_hex(),
                    fields.amount,
                    &fields.description,
                    &fields.category,
                    fields.kind.as_str(),
                    fields.date,
                    now,
                ),
            )?;

            Ok(rows_affected > 0)
        })
        .await
    }

    pub(super) async fn delete_one(&self, id: TransactionId) -> Result<bool, StoreError> {
        self.run(move |connection, table| {
            let rows_affected = connection.execute(
                &format!("DELETE FROM \"{table}\" WHERE id = :id"),
                &[(":id", &id.to_hex())],
            )?;

            Ok(rows_affected > 0)
        })
        .await
    }
}

fn lock(connection: &Mutex<Connection>) -> Result<MutexGuard<'_, Connection>, StoreError> {
    connection.lock().map_err(|error| {
        tracing::error!("Could not acquire database lock: {error}");
        StoreError::DatabaseLock
    })
}

/// Map a database row to a Transaction.
fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id: String = row.get(0)?;
    let id = ObjectId::parse_str(&id).map_err(|error| conversion_failure(0, error))?;
    let kind: String = row.get(4)?;
    let kind = kind
        .parse::<TransactionType>()
        .map_err(|error| conversion_failure(4, error))?;

    Ok(Transaction {
        id,
        amount: row.get(1)?,
        description: row.get(2)?,
        category: row.get(3)?,
        kind,
        date: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

fn conversion_failure(
    column: usize,
    error: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(column, Type::Text, Box::new(error))
}
