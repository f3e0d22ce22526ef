//! Implements a struct that holds the state of the REST server.

use crate::{
    Error,
    store::{Database, TRANSACTION_COLLECTION, TransactionCollection},
};

/// The state of the REST server.
///
/// Built once at start-up and cloned into every request handler. Nothing in
/// it is mutated after construction; all mutable state lives in the store.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The collection that holds transactions.
    pub transactions: TransactionCollection,
}

impl AppState {
    /// Create a new [AppState] using the transaction collection of `database`.
    ///
    /// # Errors
    /// Returns an error if the collection cannot be opened.
    pub fn new(database: &Database) -> Result<Self, Error> {
        Ok(Self {
            transactions: database.collection(TRANSACTION_COLLECTION)?,
        })
    }
}
