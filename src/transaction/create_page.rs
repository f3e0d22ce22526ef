//! The page for adding a transaction and the handler for its form.

use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use maud::{Markup, html};

use crate::{
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, BUTTON_SECONDARY_STYLE, FORM_CONTAINER_STYLE, base},
    navigation::NavBar,
    transaction::{
        DATE_FORMAT, TransactionState, TransactionType, core::now_utc, create_transaction,
        form::{TransactionForm, form_error_alert, form_error_response, transaction_form_fields},
    },
};

fn new_transaction_view(form: &TransactionForm, error_message: Option<&str>) -> Markup {
    let nav_bar = NavBar::new(endpoints::NEW_TRANSACTION_VIEW).into_html();

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            form
                method="post"
                action=(endpoints::NEW_TRANSACTION_VIEW)
                class="w-full space-y-4 md:space-y-6"
            {
                h2 class="text-xl font-bold" { "New Transaction" }

                (form_error_alert(error_message))

                (transaction_form_fields(form))

                button type="submit" id="submit-button" class=(BUTTON_PRIMARY_STYLE)
                {
                    "Create Transaction"
                }

                a href=(endpoints::TRANSACTIONS_VIEW) class=(BUTTON_SECONDARY_STYLE) { "Cancel" }
            }
        }
    };

    base("Create Transaction", &content)
}

/// Renders the page for adding a transaction, with the date set to today.
pub async fn get_new_transaction_page() -> Response {
    let today = now_utc().date();
    let form = TransactionForm {
        kind: TransactionType::Expense.to_string(),
        date: today
            .format(DATE_FORMAT)
            .unwrap_or_else(|_| today.to_string()),
        ..Default::default()
    };

    new_transaction_view(&form, None).into_response()
}

/// A route handler for the new transaction form, redirects to the transactions page on success.
///
/// A form that fails validation is shown again with the error and the values
/// that were submitted.
pub async fn create_transaction_form_endpoint(
    State(state): State<TransactionState>,
    Form(form): Form<TransactionForm>,
) -> Response {
    let result = match form.clone().into_input() {
        Ok(input) => create_transaction(input, &state.collection).await,
        Err(error) => Err(error),
    };

    match result {
        Ok(_) => Redirect::to(endpoints::TRANSACTIONS_VIEW).into_response(),
        Err(error) => form_error_response(error, |message| {
            new_transaction_view(&form, Some(message))
        }),
    }
}
