//! The page asking the user to confirm the deletion of a transaction.

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use maud::{Markup, html};

use crate::{
    database_id::parse_transaction_id,
    endpoints::{self, format_endpoint},
    html::{BUTTON_DELETE_STYLE, BUTTON_SECONDARY_STYLE, FORM_CONTAINER_STYLE, base},
    navigation::NavBar,
    transaction::{
        DATE_FORMAT, Transaction, TransactionState, delete_transaction, get_transaction,
        transactions_page::{amount_style, signed_amount},
    },
};

fn delete_transaction_view(transaction: &Transaction) -> Markup {
    let nav_bar = NavBar::new(endpoints::DELETE_TRANSACTION_VIEW).into_html();
    let delete_transaction_route =
        format_endpoint(endpoints::DELETE_TRANSACTION_VIEW, &transaction.id.to_hex());
    let date = transaction
        .date
        .format(DATE_FORMAT)
        .unwrap_or_else(|_| transaction.date.to_string());

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            form
                method="post"
                action=(delete_transaction_route)
                class="w-full space-y-4 md:space-y-6"
            {
                h2 class="text-xl font-bold" { "Delete Transaction" }

                p { "Are you sure you want to delete this transaction? This cannot be undone." }

                dl id="transaction-details"
                {
                    dt class="font-semibold" { "Date" }
                    dd { (date) }
                    dt class="font-semibold" { "Description" }
                    dd { (transaction.description) }
                    dt class="font-semibold" { "Category" }
                    dd { (transaction.category) }
                    dt class="font-semibold" { "Amount" }
                    dd class=(amount_style(transaction.kind)) { (signed_amount(transaction)) }
                }

                button type="submit" id="delete-button" class=(BUTTON_DELETE_STYLE)
                {
                    "Delete"
                }

                a href=(endpoints::TRANSACTIONS_VIEW) class=(BUTTON_SECONDARY_STYLE) { "Cancel" }
            }
        }
    };

    base("Delete Transaction", &content)
}

/// Renders the page asking to confirm the deletion of a transaction.
///
/// Responds with the 404 page if the ID is malformed or unknown.
pub async fn get_delete_transaction_page(
    State(state): State<TransactionState>,
    Path(transaction_id): Path<String>,
) -> Response {
    let transaction = match parse_transaction_id(&transaction_id) {
        Ok(id) => get_transaction(id, &state.collection).await,
        Err(error) => Err(error),
    };

    match transaction {
        Ok(transaction) => delete_transaction_view(&transaction).into_response(),
        Err(error) => error.into_page_response(),
    }
}

/// A route handler for the confirmed deletion, redirects to the transactions page on success.
pub async fn delete_transaction_form_endpoint(
    State(state): State<TransactionState>,
    Path(transaction_id): Path<String>,
) -> Response {
    let result = match parse_transaction_id(&transaction_id) {
        Ok(id) => delete_transaction(id, &state.collection).await,
        Err(error) => Err(error),
    };

    match result {
        Ok(()) => Redirect::to(endpoints::TRANSACTIONS_VIEW).into_response(),
        Err(error) => error.into_page_response(),
    }
}
