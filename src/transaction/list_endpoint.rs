use axum::{Json, extract::State};

use crate::{
    Error,
    store::{StoreError, TransactionCollection},
    transaction::{Transaction, TransactionState},
};

/// A route handler that responds with every transaction as a JSON array, newest first.
pub async fn list_transactions_endpoint(
    State(state): State<TransactionState>,
) -> Result<Json<Vec<Transaction>>, Error> {
    list_transactions(&state.collection).await.map(Json)
}

/// Fetch every transaction ordered by date, newest first.
///
/// An empty collection gives an empty vector.
///
/// # Errors
/// Returns [Error::Storage] if the query fails, times out, or a document
/// cannot be decoded. Nothing is returned from a partially decoded result.
pub async fn list_transactions(
    collection: &TransactionCollection,
) -> Result<Vec<Transaction>, Error> {
    collection
        .find_all_by_date_desc()
        .await
        .map_err(|error| match error {
            error @ StoreError::Decode(_) => error.into_storage_error("Error parsing transactions"),
            error => error.into_storage_error("Error retrieving transactions"),
        })
}
