//! The document store adapter.
//!
//! [connect] opens a [Database] from a connection string and
//! [Database::collection] hands out a [TransactionCollection]. The rest of the
//! application only talks to the store through these types, so it does not
//! depend on which backend is behind them.
//!
//! Two backends are supported:
//! - MongoDB, for `mongodb://` and `mongodb+srv://` URIs,
//! - an embedded SQLite database, for `sqlite::memory:` and `sqlite://<path>` URIs.

mod mongo;
mod sqlite;

use std::{future::Future, time::Duration};

use time::OffsetDateTime;

use crate::{
    Error,
    database_id::TransactionId,
    transaction::{Transaction, TransactionFields},
};

pub use mongo::TransactionDocument;

/// How long a single store operation may take before it is abandoned.
pub const OPERATION_TIMEOUT: Duration = Duration::from_secs(10);

/// How long [connect] may spend establishing and verifying a connection.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// The name of the collection that holds transactions.
pub const TRANSACTION_COLLECTION: &str = "transactions";

/// The database name used when none is configured.
pub const DEFAULT_DATABASE_NAME: &str = "fintech_app";

const SQLITE_MEMORY_URI: &str = "sqlite::memory:";
const SQLITE_URI_PREFIX: &str = "sqlite://";

/// Failures of the underlying document store.
///
/// These never reach the client directly. Services log them and convert them
/// into an [Error::Storage] with a message describing the failed operation,
/// see [StoreError::into_storage_error].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// An error reported by the MongoDB driver.
    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    /// An unhandled SQL error from the embedded store.
    #[error("an unexpected SQL error occurred: {0}")]
    Sql(rusqlite::Error),

    /// A stored document could not be converted into a [Transaction].
    #[error("could not decode document: {0}")]
    Decode(String),

    /// The operation did not finish within [OPERATION_TIMEOUT].
    #[error("the operation timed out")]
    Timeout,

    /// Could not acquire the lock on the embedded database connection.
    #[error("could not acquire the database lock")]
    DatabaseLock,

    /// The blocking task running an embedded store operation panicked or was cancelled.
    #[error("the store task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::FromSqlConversionFailure(_, _, error) => {
                StoreError::Decode(error.to_string())
            }
            error => StoreError::Sql(error),
        }
    }
}

impl StoreError {
    /// Log the error and replace it with an [Error::Storage] carrying `message`.
    pub(crate) fn into_storage_error(self, message: &'static str) -> Error {
        tracing::error!("{message}: {self}");
        Error::Storage(message)
    }
}

/// Run `operation`, giving up with [StoreError::Timeout] once `deadline` passes.
pub async fn run_with_deadline<T>(
    deadline: Duration,
    operation: impl Future<Output = Result<T, StoreError>>,
) -> Result<T, StoreError> {
    match tokio::time::timeout(deadline, operation).await {
        Ok(result) => result,
        Err(_) => Err(StoreError::Timeout),
    }
}

/// A live connection to a document database.
///
/// The only way to get one is [connect], so a collection can never be
/// requested from a store that has not been verified.
#[derive(Debug, Clone)]
pub enum Database {
    /// A MongoDB database.
    Mongo(mongo::MongoDatabase),
    /// An embedded SQLite database.
    Sqlite(sqlite::SqliteDatabase),
}

/// Establish a connection to the document store at `uri` and verify it is alive.
///
/// `database_name` selects the MongoDB database. The embedded SQLite store
/// ignores it.
///
/// # Errors
/// Returns [Error::Connection] if `uri` is empty, has an unsupported scheme,
/// cannot be parsed, or the liveness check fails or does not finish within
/// [CONNECT_TIMEOUT].
pub async fn connect(uri: &str, database_name: &str) -> Result<Database, Error> {
    let uri = uri.trim();

    if uri.is_empty() {
        return Err(Error::Connection("the store URI is empty".to_owned()));
    }

    let database = if uri.starts_with("mongodb://") || uri.starts_with("mongodb+srv://") {
        Database::Mongo(mongo::MongoDatabase::connect(uri, database_name).await?)
    } else if uri == SQLITE_MEMORY_URI {
        Database::Sqlite(sqlite::SqliteDatabase::open_in_memory()?)
    } else if let Some(path) = uri.strip_prefix(SQLITE_URI_PREFIX) {
        Database::Sqlite(sqlite::SqliteDatabase::open(path)?)
    } else {
        return Err(Error::Connection(format!(
            "unsupported store URI scheme in \"{}\"",
            redact_credentials(uri)
        )));
    };

    tracing::info!("Connected to the document store at {}", redact_credentials(uri));

    Ok(database)
}

impl Database {
    /// Get a handle to the collection called `name`.
    ///
    /// # Errors
    /// Returns [Error::Connection] if the embedded store cannot prepare the
    /// collection, e.g. because `name` is not a valid table name.
    pub fn collection(&self, name: &str) -> Result<TransactionCollection, Error> {
        let backend = match self {
            Database::Mongo(database) => CollectionBackend::Mongo(database.collection(name)),
            Database::Sqlite(database) => CollectionBackend::Sqlite(database.collection(name)?),
        };

        Ok(TransactionCollection::new(backend))
    }

    /// Release the connection. Called once the server has stopped.
    pub async fn close(self) {
        match self {
            Database::Mongo(database) => database.close().await,
            Database::Sqlite(_) => {}
        }
    }
}

/// A handle to a named collection of transaction documents.
///
/// Cloning is cheap, every clone refers to the same collection. Every
/// operation is abandoned with [StoreError::Timeout] once it runs longer than
/// [OPERATION_TIMEOUT].
#[derive(Debug, Clone)]
pub struct TransactionCollection {
    backend: CollectionBackend,
    timeout: Duration,
}

#[derive(Debug, Clone)]
enum CollectionBackend {
    Mongo(mongodb::Collection<TransactionDocument>),
    Sqlite(sqlite::SqliteCollection),
}

impl TransactionCollection {
    fn new(backend: CollectionBackend) -> Self {
        Self {
            backend,
            timeout: OPERATION_TIMEOUT,
        }
    }

    /// Use `timeout` instead of [OPERATION_TIMEOUT] for every operation.
    #[cfg(test)]
    pub(crate) fn with_timeout(self, timeout: Duration) -> Self {
        Self { timeout, ..self }
    }

    /// The embedded store's connection, so tests can hold its lock.
    #[cfg(test)]
    pub(crate) fn sqlite_connection(
        &self,
    ) -> Option<std::sync::Arc<std::sync::Mutex<rusqlite::Connection>>> {
        match &self.backend {
            CollectionBackend::Sqlite(collection) => Some(collection.connection()),
            CollectionBackend::Mongo(_) => None,
        }
    }

    /// Fetch every transaction, newest `date` first.
    pub async fn find_all_by_date_desc(&self) -> Result<Vec<Transaction>, StoreError> {
        run_with_deadline(self.timeout, async {
            match &self.backend {
                CollectionBackend::Mongo(collection) => {
                    mongo::find_all_by_date_desc(collection).await
                }
                CollectionBackend::Sqlite(collection) => collection.find_all_by_date_desc().await,
            }
        })
        .await
    }

    /// Fetch the transaction with `id`, if there is one.
    pub async fn find_one(&self, id: TransactionId) -> Result<Option<Transaction>, StoreError> {
        run_with_deadline(self.timeout, async {
            match &self.backend {
                CollectionBackend::Mongo(collection) => mongo::find_one(collection, id).await,
                CollectionBackend::Sqlite(collection) => collection.find_one(id).await,
            }
        })
        .await
    }

    /// Insert a new transaction stamped with `now` and return the ID the store assigned.
    pub async fn insert_one(
        &self,
        fields: &TransactionFields,
        now: OffsetDateTime,
    ) -> Result<TransactionId, StoreError> {
        run_with_deadline(self.timeout, async {
            match &self.backend {
                CollectionBackend::Mongo(collection) => {
                    mongo::insert_one(collection, fields, now).await
                }
                CollectionBackend::Sqlite(collection) => collection.insert_one(fields, now).await,
            }
        })
        .await
    }

    /// Overwrite the mutable fields of transaction `id` and set its update time to `now`.
    ///
    /// Returns `false` if no transaction has the ID.
    pub async fn update_one(
        &self,
        id: TransactionId,
        fields: &TransactionFields,
        now: OffsetDateTime,
    ) -> Result<bool, StoreError> {
        run_with_deadline(self.timeout, async {
            match &self.backend {
                CollectionBackend::Mongo(collection) => {
                    mongo::update_one(collection, id, fields, now).await
                }
                CollectionBackend::Sqlite(collection) => {
                    collection.update_one(id, fields, now).await
                }
            }
        })
        .await
    }

    /// Remove transaction `id`.
    ///
    /// Returns `false` if no transaction has the ID.
    pub async fn delete_one(&self, id: TransactionId) -> Result<bool, StoreError> {
        run_with_deadline(self.timeout, async {
            match &self.backend {
                CollectionBackend::Mongo(collection) => mongo::delete_one(collection, id).await,
                CollectionBackend::Sqlite(collection) => collection.delete_one(id).await,
            }
        })
        .await
    }
}

/// Hide the password in `uri` so it can be logged.
fn redact_credentials(uri: &str) -> String {
    let Some((scheme, rest)) = uri.split_once("://") else {
        return uri.to_owned();
    };

    match rest.split_once('@') {
        Some((credentials, host)) => match credentials.split_once(':') {
            Some((user, _)) => format!("{scheme}://{user}:********@{host}"),
            None => uri.to_owned(),
        },
        None => uri.to_owned(),
    }
}
