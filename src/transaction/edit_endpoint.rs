use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};

use crate::{
    Error,
    database_id::{TransactionId, parse_transaction_id},
    store::TransactionCollection,
    transaction::{
        Transaction, TransactionInput, TransactionState, core::now_utc,
        create_endpoint::extract_input,
    },
};

/// A route handler for replacing the fields of an existing transaction.
///
/// Responds with the transaction as it is stored after the update.
pub async fn edit_transaction_endpoint(
    State(state): State<TransactionState>,
    Path(transaction_id): Path<String>,
    payload: Result<Json<TransactionInput>, JsonRejection>,
) -> Result<Json<Transaction>, Error> {
    let id = parse_transaction_id(&transaction_id)?;
    let input = extract_input(payload)?;

    update_transaction(id, input, &state.collection).await.map(Json)
}

/// Overwrite every mutable field of transaction `id` with `input`.
///
/// `updated_at` is set to the current time and `created_at` is left alone.
/// Updating never creates a transaction. Concurrent writes to the same
/// transaction are resolved by the store, the last write wins.
///
/// # Errors
/// This function will return a:
/// - [Error::Validation] if a field is missing or malformed,
/// - [Error::NotFound] if `id` does not refer to a stored transaction,
/// - or [Error::Storage] if the store fails or times out.
pub async fn update_transaction(
    id: TransactionId,
    input: TransactionInput,
    collection: &TransactionCollection,
) -> Result<Transaction, Error> {
    let fields = input.validate()?;

    let matched = collection
        .update_one(id, &fields, now_utc())
        .await
        .map_err(|error| error.into_storage_error("Error updating transaction"))?;

    if !matched {
        return Err(Error::NotFound);
    }

    // Read the document back so the response reflects what the store holds.
    collection
        .find_one(id)
        .await
        .map_err(|error| error.into_storage_error("Error retrieving updated transaction"))?
        .ok_or(Error::NotFound)
}
