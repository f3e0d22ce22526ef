//! The page for editing a transaction and the handler for its form.

use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use maud::{Markup, html};

use crate::{
    database_id::parse_transaction_id,
    endpoints::{self, format_endpoint},
    html::{BUTTON_PRIMARY_STYLE, BUTTON_SECONDARY_STYLE, FORM_CONTAINER_STYLE, base},
    navigation::NavBar,
    transaction::{
        TransactionState,
        form::{TransactionForm, form_error_alert, form_error_response, transaction_form_fields},
        get_transaction, update_transaction,
    },
};

fn edit_transaction_view(
    transaction_id: &str,
    form: &TransactionForm,
    error_message: Option<&str>,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::EDIT_TRANSACTION_VIEW).into_html();
    let edit_transaction_route = format_endpoint(endpoints::EDIT_TRANSACTION_VIEW, transaction_id);

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            form
                method="post"
                action=(edit_transaction_route)
                class="w-full space-y-4 md:space-y-6"
            {
                h2 class="text-xl font-bold" { "Edit Transaction" }

                (form_error_alert(error_message))

                (transaction_form_fields(form))

                button type="submit" id="submit-button" class=(BUTTON_PRIMARY_STYLE)
                {
                    "Save Changes"
                }

                a href=(endpoints::TRANSACTIONS_VIEW) class=(BUTTON_SECONDARY_STYLE) { "Cancel" }
            }
        }
    };

    base("Edit Transaction", &content)
}

/// Renders the page for editing a transaction, prefilled with its current values.
///
/// Responds with the 404 page if the ID is malformed or unknown.
pub async fn get_edit_transaction_page(
    State(state): State<TransactionState>,
    Path(transaction_id): Path<String>,
) -> Response {
    let transaction = match parse_transaction_id(&transaction_id) {
        Ok(id) => get_transaction(id, &state.collection).await,
        Err(error) => Err(error),
    };

    match transaction {
        Ok(transaction) => edit_transaction_view(
            &transaction_id,
            &TransactionForm::from_transaction(&transaction),
            None,
        )
        .into_response(),
        Err(error) => error.into_page_response(),
    }
}

/// A route handler for the edit transaction form, redirects to the transactions page on success.
pub async fn edit_transaction_form_endpoint(
    State(state): State<TransactionState>,
    Path(transaction_id): Path<String>,
    Form(form): Form<TransactionForm>,
) -> Response {
    let id = match parse_transaction_id(&transaction_id) {
        Ok(id) => id,
        Err(error) => return error.into_page_response(),
    };

    let result = match form.clone().into_input() {
        Ok(input) => update_transaction(id, input, &state.collection).await,
        Err(error) => Err(error),
    };

    match result {
        Ok(_) => Redirect::to(endpoints::TRANSACTIONS_VIEW).into_response(),
        Err(error) => form_error_response(error, |message| {
            edit_transaction_view(&transaction_id, &form, Some(message))
        }),
    }
}

#[cfg(test)]
mod tests {
    use axum::{Router, http::StatusCode, routing::get};
    use axum_test::TestServer;
    use scraper::{Html, Selector};
    use time::macros::date;

    use crate::{
        endpoints::{self, format_endpoint},
        transaction::{
            TransactionState, TransactionType,
            edit_page::{edit_transaction_form_endpoint, get_edit_transaction_page},
            get_transaction,
            test_utils::{get_test_state, insert_test_transaction},
        },
    };

    fn get_test_server(state: TransactionState) -> TestServer {
        let app = Router::new()
            .route(
                endpoints::EDIT_TRANSACTION_VIEW,
                get(get_edit_transaction_page).post(edit_transaction_form_endpoint),
            )
            .with_state(state);

        TestServer::new(app).expect("Could not create test server.")
    }

    fn input_value(document: &Html, name: &str) -> Option<String> {
        document
            .select(&Selector::parse(&format!("input[name={name}]")).unwrap())
            .next()
            .and_then(|input| input.value().attr("value"))
            .map(str::to_owned)
    }

    #[tokio::test]
    async fn edit_page_is_prefilled_and_posts_back_to_itself() {
        let state = get_test_state().await;
        let transaction = insert_test_transaction(&state, date!(2024 - 01 - 15)).await;
        let server = get_test_server(state);
        let path = format_endpoint(endpoints::EDIT_TRANSACTION_VIEW, &transaction.id.to_hex());

        let response = server.get(&path).await;

        response.assert_status_ok();
        let document = Html::parse_document(&response.text());
        let form = document
            .select(&Selector::parse("form").unwrap())
            .next()
            .expect("want a form");
        assert_eq!(form.value().attr("method"), Some("post"));
        assert_eq!(form.value().attr("action"), Some(path.as_str()));
        assert_eq!(input_value(&document, "amount").as_deref(), Some("42.5"));
        assert_eq!(input_value(&document, "description").as_deref(), Some("Groceries"));
        assert_eq!(input_value(&document, "category").as_deref(), Some("Food"));
        assert_eq!(input_value(&document, "date").as_deref(), Some("2024-01-15"));
        let checked = document
            .select(&Selector::parse("input[name=type][checked]").unwrap())
            .filter_map(|input| input.value().attr("value"))
            .collect::<Vec<_>>();
        assert_eq!(checked, ["expense"]);
    }

    #[tokio::test]
    async fn edit_page_for_unknown_id_is_not_found() {
        let server = get_test_server(get_test_state().await);

        let response = server
            .get(&format_endpoint(
                endpoints::EDIT_TRANSACTION_VIEW,
                "65a4f0c2e4b0a1b2c3d4e5f6",
            ))
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
        assert!(response.text().contains("404"));
    }

    #[tokio::test]
    async fn edit_page_for_malformed_id_is_not_found() {
        let server = get_test_server(get_test_state().await);

        let response = server
            .get(&format_endpoint(endpoints::EDIT_TRANSACTION_VIEW, "not-an-id"))
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn submitting_form_updates_transaction_and_redirects() {
        let state = get_test_state().await;
        let transaction = insert_test_transaction(&state, date!(2024 - 01 - 15)).await;
        let server = get_test_server(state.clone());

        let response = server
            .post(&format_endpoint(
                endpoints::EDIT_TRANSACTION_VIEW,
                &transaction.id.to_hex(),
            ))
            .form(&[
                ("type", "income"),
                ("amount", "50"),
                ("description", "Refund"),
                ("category", "Food"),
                ("date", "2024-01-20"),
            ])
            .await;

        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(response.header("location"), endpoints::TRANSACTIONS_VIEW);
        let updated = get_transaction(transaction.id, &state.collection)
            .await
            .unwrap();
        assert_eq!(updated.amount, 50.0);
        assert_eq!(updated.description, "Refund");
        assert_eq!(updated.kind, TransactionType::Income);
        assert_eq!(updated.date, date!(2024 - 01 - 20));
        assert_eq!(updated.created_at, transaction.created_at);
    }

    #[tokio::test]
    async fn invalid_form_is_shown_again_and_nothing_changes() {
        let state = get_test_state().await;
        let transaction = insert_test_transaction(&state, date!(2024 - 01 - 15)).await;
        let server = get_test_server(state.clone());

        let response = server
            .post(&format_endpoint(
                endpoints::EDIT_TRANSACTION_VIEW,
                &transaction.id.to_hex(),
            ))
            .form(&[
                ("type", "expense"),
                ("amount", "42.5"),
                ("description", "Groceries"),
                ("category", "Food"),
                ("date", "15/01/2024"),
            ])
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let document = Html::parse_document(&response.text());
        let error = document
            .select(&Selector::parse("#form-error").unwrap())
            .next()
            .expect("want an error message")
            .text()
            .collect::<String>();
        assert_eq!(error, "Invalid date format. Use YYYY-MM-DD");
        assert_eq!(input_value(&document, "date").as_deref(), Some("15/01/2024"));
        assert_eq!(
            get_transaction(transaction.id, &state.collection).await,
            Ok(transaction)
        );
    }

    #[tokio::test]
    async fn submitting_form_for_unknown_id_is_not_found() {
        let server = get_test_server(get_test_state().await);

        let response = server
            .post(&format_endpoint(
                endpoints::EDIT_TRANSACTION_VIEW,
                "65a4f0c2e4b0a1b2c3d4e5f6",
            ))
            .form(&[
                ("type", "expense"),
                ("amount", "1"),
                ("description", "Coffee"),
                ("category", "Food"),
                ("date", "2024-01-15"),
            ])
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
    }
}
