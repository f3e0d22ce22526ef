//! The page that lists every transaction.

use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

use crate::{
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_DELETE_STYLE, CATEGORY_BADGE_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE,
        TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, format_currency,
    },
    navigation::NavBar,
    transaction::{DATE_FORMAT, Transaction, TransactionState, TransactionType, list_transactions},
};

/// Render the transactions page, newest transactions first.
pub async fn get_transactions_page(State(state): State<TransactionState>) -> Response {
    match list_transactions(&state.collection).await {
        Ok(transactions) => transactions_view(&transactions).into_response(),
        Err(error) => error.into_page_response(),
    }
}

/// The amount with a sign that follows the transaction type, e.g. "-$4.50".
pub(crate) fn signed_amount(transaction: &Transaction) -> String {
    let sign = match transaction.kind {
        TransactionType::Income => "+",
        TransactionType::Expense => "-",
    };

    format!("{sign}{}", format_currency(transaction.amount.abs()))
}

pub(crate) fn amount_style(kind: TransactionType) -> &'static str {
    match kind {
        TransactionType::Income => "text-green-600 dark:text-green-400 font-semibold",
        TransactionType::Expense => "text-red-600 dark:text-red-400 font-semibold",
    }
}

/// A table of `transactions` with links to edit or delete each one.
pub(crate) fn transaction_table(transactions: &[Transaction]) -> Markup {
    let table_row = |transaction: &Transaction| {
        let date = transaction
            .date
            .format(DATE_FORMAT)
            .unwrap_or_else(|_| transaction.date.to_string());
        let id = transaction.id.to_hex();
        let edit_url = format_endpoint(endpoints::EDIT_TRANSACTION_VIEW, &id);
        let delete_url = format_endpoint(endpoints::DELETE_TRANSACTION_VIEW, &id);

        html!(
            tr class=(TABLE_ROW_STYLE) data-transaction-id=(id)
            {
                td class=(TABLE_CELL_STYLE) { (date) }
                td class=(TABLE_CELL_STYLE) { (transaction.description) }
                td class=(TABLE_CELL_STYLE)
                {
                    span class=(CATEGORY_BADGE_STYLE) { (transaction.category) }
                }
                td class={(TABLE_CELL_STYLE) " text-right " (amount_style(transaction.kind))}
                {
                    (signed_amount(transaction))
                }
                td class=(TABLE_CELL_STYLE)
                {
                    div class="flex gap-4"
                    {
                        a href=(edit_url) class=(LINK_STYLE) { "Edit" }
                        a href=(delete_url) class=(BUTTON_DELETE_STYLE) { "Delete" }
                    }
                }
            }
        )
    };

    html!(
        table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
        {
            thead class=(TABLE_HEADER_STYLE)
            {
                tr
                {
                    th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                    th scope="col" class={(TABLE_CELL_STYLE) " text-right"} { "Amount" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                }
            }

            tbody
            {
                @for transaction in transactions
                {
                    (table_row(transaction))
                }
            }
        }
    )
}

fn transactions_view(transactions: &[Transaction]) -> Markup {
    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW).into_html();

    let content = html!(
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-screen-lg"
            {
                div class="flex justify-between flex-wrap items-end mb-4"
                {
                    h1 class="text-xl font-bold" { "Transactions" }

                    a href=(endpoints::NEW_TRANSACTION_VIEW) class=(LINK_STYLE)
                    {
                        "Add Transaction"
                    }
                }

                @if transactions.is_empty()
                {
                    p class="text-gray-500" { "No transactions yet." }
                }
                @else
                {
                    div class="dark:bg-gray-800 overflow-x-auto"
                    {
                        (transaction_table(transactions))
                    }
                }
            }
        }
    );

    base("Transactions", &content)
}
