//! Transaction management for the application.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and the validation of client input
//! - The list, get, create, update and delete operations and their JSON route handlers
//! - The transactions page and the pages for adding, editing and deleting a transaction

mod core;
mod create_endpoint;
mod create_page;
mod delete_endpoint;
mod delete_page;
mod edit_endpoint;
mod edit_page;
mod form;
mod get_endpoint;
mod list_endpoint;
mod transactions_page;

#[cfg(test)]
pub(crate) mod test_utils;

use axum::extract::FromRef;

use crate::{AppState, store::TransactionCollection};

pub use self::core::{
    DATE_FORMAT, Transaction, TransactionFields, TransactionInput, TransactionType, parse_date,
};
pub use create_endpoint::{create_transaction, create_transaction_endpoint};
pub use create_page::{create_transaction_form_endpoint, get_new_transaction_page};
pub use delete_endpoint::{DeleteConfirmation, delete_transaction, delete_transaction_endpoint};
pub use delete_page::{delete_transaction_form_endpoint, get_delete_transaction_page};
pub use edit_endpoint::{edit_transaction_endpoint, update_transaction};
pub use edit_page::{edit_transaction_form_endpoint, get_edit_transaction_page};
pub use form::TransactionForm;
pub use get_endpoint::{get_transaction, get_transaction_endpoint};
pub use list_endpoint::{list_transactions, list_transactions_endpoint};
pub use transactions_page::get_transactions_page;

pub(crate) use transactions_page::transaction_table;

/// The state needed by the transaction route handlers.
#[derive(Debug, Clone)]
pub struct TransactionState {
    /// The collection transactions are stored in.
    pub collection: TransactionCollection,
}

impl FromRef<AppState> for TransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            collection: state.transactions.clone(),
        }
    }
}
