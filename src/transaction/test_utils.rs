use time::Date;

use crate::{
    store::{TRANSACTION_COLLECTION, connect},
    transaction::{
        DATE_FORMAT, Transaction, TransactionInput, TransactionState, create_transaction,
    },
};

/// A transaction state backed by a fresh in-memory store.
pub(crate) async fn get_test_state() -> TransactionState {
    let database = connect("sqlite::memory:", "test")
        .await
        .expect("Could not open in-memory store");

    TransactionState {
        collection: database
            .collection(TRANSACTION_COLLECTION)
            .expect("Could not open transaction collection"),
    }
}

/// A valid expense dated `date`.
pub(crate) fn test_input(date: &str) -> TransactionInput {
    TransactionInput {
        amount: Some(42.5),
        description: Some("Groceries".to_owned()),
        category: Some("Food".to_owned()),
        kind: Some("expense".to_owned()),
        date: Some(date.to_owned()),
    }
}

/// Store a valid expense dated `date`.
pub(crate) async fn insert_test_transaction(state: &TransactionState, date: Date) -> Transaction {
    let date = date.format(DATE_FORMAT).expect("Could not format date");

    create_transaction(test_input(&date), &state.collection)
        .await
        .expect("Could not create transaction")
}
