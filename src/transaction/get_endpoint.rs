use axum::{
    Json,
    extract::{Path, State},
};

use crate::{
    Error,
    database_id::{TransactionId, parse_transaction_id},
    store::TransactionCollection,
    transaction::{Transaction, TransactionState},
};

/// A route handler that responds with a single transaction as JSON.
pub async fn get_transaction_endpoint(
    State(state): State<TransactionState>,
    Path(transaction_id): Path<String>,
) -> Result<Json<Transaction>, Error> {
    let id = parse_transaction_id(&transaction_id)?;

    get_transaction(id, &state.collection).await.map(Json)
}

/// Retrieve a transaction by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a stored transaction,
/// - or [Error::Storage] if the store fails or times out.
pub async fn get_transaction(
    id: TransactionId,
    collection: &TransactionCollection,
) -> Result<Transaction, Error> {
    collection
        .find_one(id)
        .await
        .map_err(|error| error.into_storage_error("Error retrieving transaction"))?
        .ok_or(Error::NotFound)
}
