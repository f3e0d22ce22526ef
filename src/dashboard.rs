//! The home page: totals for income and expenses and the most recent transactions.

use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

use crate::{
    endpoints,
    html::{CARD_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, base, format_currency},
    navigation::NavBar,
    transaction::{
        Transaction, TransactionState, TransactionType, list_transactions, transaction_table,
    },
};

/// How many transactions the home page shows.
const RECENT_TRANSACTION_COUNT: usize = 5;

/// Totals over a set of transactions.
#[derive(Debug, Default, PartialEq)]
pub struct Summary {
    /// The sum of all income amounts.
    pub total_income: f64,
    /// The sum of all expense amounts.
    pub total_expenses: f64,
    /// Income minus expenses.
    pub balance: f64,
}

/// Add up income and expenses.
pub fn summarize(transactions: &[Transaction]) -> Summary {
    let (total_income, total_expenses) =
        transactions
            .iter()
            .fold((0.0, 0.0), |(income, expenses), transaction| match transaction.kind {
                TransactionType::Income => (income + transaction.amount, expenses),
                TransactionType::Expense => (income, expenses + transaction.amount),
            });

    Summary {
        total_income,
        total_expenses,
        balance: total_income - total_expenses,
    }
}

/// Render the home page.
pub async fn get_dashboard_page(State(state): State<TransactionState>) -> Response {
    match list_transactions(&state.collection).await {
        Ok(transactions) => dashboard_view(&transactions).into_response(),
        Err(error) => error.into_page_response(),
    }
}

fn summary_card(id: &str, title: &str, amount: f64) -> Markup {
    html!(
        div class=(CARD_STYLE)
        {
            h2 class="text-sm font-medium text-gray-500 dark:text-gray-400" { (title) }
            p id=(id) class="text-2xl font-bold" { (format_currency(amount)) }
        }
    )
}

fn dashboard_view(transactions: &[Transaction]) -> Markup {
    let nav_bar = NavBar::new(endpoints::ROOT).into_html();
    let summary = summarize(transactions);
    // Transactions arrive newest first.
    let recent = &transactions[..transactions.len().min(RECENT_TRANSACTION_COUNT)];

    let content = html!(
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-screen-lg"
            {
                h1 class="text-xl font-bold mb-4" { "Dashboard" }

                div class="flex flex-wrap gap-4 mb-8"
                {
                    (summary_card("total-income", "Total Income", summary.total_income))
                    (summary_card("total-expense", "Total Expenses", summary.total_expenses))
                    (summary_card("balance", "Balance", summary.balance))
                }

                div class="flex justify-between flex-wrap items-end mb-2"
                {
                    h2 class="text-lg font-semibold" { "Recent Transactions" }

                    a href=(endpoints::TRANSACTIONS_VIEW) class=(LINK_STYLE) { "View all" }
                }

                @if recent.is_empty()
                {
                    div id="recent-transactions" class="text-center text-gray-500 py-8"
                    {
                        p { "No transactions yet" }
                    }
                }
                @else
                {
                    div id="recent-transactions" class="dark:bg-gray-800 overflow-x-auto"
                    {
                        (transaction_table(recent))
                    }
                }
            }
        }
    );

    base("Dashboard", &content)
}

#[cfg(test)]
mod tests {
    use axum::{Router, http::StatusCode, routing::get};
    use axum_test::TestServer;
    use scraper::{Html, Selector};
    use time::macros::date;

    use crate::{
        dashboard::{Summary, get_dashboard_page, summarize},
        endpoints::{self, format_endpoint},
        transaction::{
            TransactionInput, TransactionState, create_transaction,
            test_utils::{get_test_state, insert_test_transaction, test_input},
        },
    };

    fn get_test_server(state: TransactionState) -> TestServer {
        let app = Router::new()
            .route(endpoints::ROOT, get(get_dashboard_page))
            .with_state(state);

        TestServer::new(app).expect("Could not create test server.")
    }

    fn text_of(document: &Html, selector: &str) -> String {
        document
            .select(&Selector::parse(selector).unwrap())
            .next()
            .unwrap_or_else(|| panic!("no element matches {selector}"))
            .text()
            .collect::<String>()
            .trim()
            .to_owned()
    }

    #[test]
    fn summary_of_nothing_is_zero() {
        assert_eq!(summarize(&[]), Summary::default());
    }

    #[tokio::test]
    async fn shows_totals_and_balance() {
        let state = get_test_state().await;
        insert_test_transaction(&state, date!(2024 - 01 - 02)).await;
        create_transaction(
            TransactionInput {
                kind: Some("income".to_owned()),
                amount: Some(100.0),
                ..test_input("2024-01-03")
            },
            &state.collection,
        )
        .await
        .unwrap();
        let server = get_test_server(state);

        let response = server.get(endpoints::ROOT).await;

        response.assert_status(StatusCode::OK);
        let document = Html::parse_document(&response.text());
        assert_eq!(text_of(&document, "#total-income"), "$100.00");
        assert_eq!(text_of(&document, "#total-expense"), "$42.50");
        assert_eq!(text_of(&document, "#balance"), "$57.50");
    }

    #[tokio::test]
    async fn shows_only_five_most_recent_transactions() {
        let state = get_test_state().await;
        for day in 1..=7 {
            let date = time::Date::from_calendar_date(2024, time::Month::March, day).unwrap();
            insert_test_transaction(&state, date).await;
        }
        let server = get_test_server(state);

        let response = server.get(endpoints::ROOT).await;

        let document = Html::parse_document(&response.text());
        let dates = document
            .select(&Selector::parse("#recent-transactions tbody tr td:first-child").unwrap())
            .map(|cell| cell.text().collect::<String>())
            .collect::<Vec<_>>();
        assert_eq!(
            dates,
            ["2024-03-07", "2024-03-06", "2024-03-05", "2024-03-04", "2024-03-03"]
        );
    }

    #[tokio::test]
    async fn recent_transactions_link_to_edit_and_delete_pages() {
        let state = get_test_state().await;
        let transaction = insert_test_transaction(&state, date!(2024 - 01 - 02)).await;
        let server = get_test_server(state);

        let response = server.get(endpoints::ROOT).await;

        let document = Html::parse_document(&response.text());
        let hrefs = document
            .select(&Selector::parse("#recent-transactions tbody a").unwrap())
            .filter_map(|link| link.value().attr("href"))
            .map(str::to_owned)
            .collect::<Vec<_>>();
        let id = transaction.id.to_hex();
        assert_eq!(
            hrefs,
            [
                format_endpoint(endpoints::EDIT_TRANSACTION_VIEW, &id),
                format_endpoint(endpoints::DELETE_TRANSACTION_VIEW, &id),
            ]
        );
    }

    #[tokio::test]
    async fn shows_empty_state_without_transactions() {
        let server = get_test_server(get_test_state().await);

        let response = server.get(endpoints::ROOT).await;

        response.assert_status(StatusCode::OK);
        let document = Html::parse_document(&response.text());
        assert_eq!(text_of(&document, "#recent-transactions p"), "No transactions yet");
        assert_eq!(text_of(&document, "#balance"), "$0.00");
    }
}
