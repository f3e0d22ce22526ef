use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    database_id::{TransactionId, parse_transaction_id},
    store::TransactionCollection,
    transaction::TransactionState,
};

/// The body sent back after a transaction is deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteConfirmation {
    /// A human-readable confirmation.
    pub message: String,
}

/// A route handler for deleting a transaction, responds with a confirmation message.
pub async fn delete_transaction_endpoint(
    State(state): State<TransactionState>,
    Path(transaction_id): Path<String>,
) -> Result<Json<DeleteConfirmation>, Error> {
    let id = parse_transaction_id(&transaction_id)?;

    delete_transaction(id, &state.collection).await?;

    Ok(Json(DeleteConfirmation {
        message: "Transaction deleted successfully".to_owned(),
    }))
}

/// Remove transaction `id` from the store. Nothing else is affected.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a stored transaction,
/// - or [Error::Storage] if the store fails or times out.
pub async fn delete_transaction(
    id: TransactionId,
    collection: &TransactionCollection,
) -> Result<(), Error> {
    let deleted = collection
        .delete_one(id)
        .await
        .map_err(|error| error.into_storage_error("Error deleting transaction"))?;

    if deleted { Ok(()) } else { Err(Error::NotFound) }
}
