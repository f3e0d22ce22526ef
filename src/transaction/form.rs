//! The HTML form shared by the new and edit transaction pages.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use serde::Deserialize;

use crate::{
    Error,
    html::{
        FORM_ERROR_STYLE, FORM_LABEL_STYLE, FORM_RADIO_GROUP_STYLE, FORM_RADIO_INPUT_STYLE,
        FORM_RADIO_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
    },
    transaction::{DATE_FORMAT, Transaction, TransactionInput, TransactionType},
};

/// The fields of the transaction form as the browser submits them.
///
/// Every field is text so that a half-filled form can be shown again with the
/// values the user typed. Missing fields are read as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TransactionForm {
    /// Either "income" or "expense".
    #[serde(rename = "type")]
    pub kind: String,
    /// The amount as typed, e.g. "12.50".
    pub amount: String,
    /// Text detailing the transaction.
    pub description: String,
    /// A free-text category.
    pub category: String,
    /// A date in the form `YYYY-MM-DD`.
    pub date: String,
}

impl TransactionForm {
    /// The form prefilled with the values of `transaction`.
    pub fn from_transaction(transaction: &Transaction) -> Self {
        Self {
            kind: transaction.kind.to_string(),
            amount: transaction.amount.to_string(),
            description: transaction.description.clone(),
            category: transaction.category.clone(),
            date: transaction
                .date
                .format(DATE_FORMAT)
                .unwrap_or_else(|_| transaction.date.to_string()),
        }
    }

    /// Convert the submitted text into input for the transaction service.
    ///
    /// Empty fields become missing fields so the service names them.
    ///
    /// # Errors
    /// Returns [Error::Validation] if the amount is not a number.
    pub fn into_input(self) -> Result<TransactionInput, Error> {
        let amount = match self.amount.trim() {
            "" => None,
            amount => Some(
                amount
                    .parse::<f64>()
                    .map_err(|_| Error::Validation("amount must be a number".to_owned()))?,
            ),
        };

        Ok(TransactionInput {
            amount,
            description: Some(self.description),
            category: Some(self.category),
            kind: non_empty(self.kind),
            date: non_empty(self.date),
        })
    }
}

fn non_empty(text: String) -> Option<String> {
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Respond to a rejected form submission.
///
/// Validation errors show the form again via `view` with the message and a
/// `400 Bad Request` status. Any other error renders an error page.
pub(super) fn form_error_response(error: Error, view: impl FnOnce(&str) -> Markup) -> Response {
    match error {
        Error::Validation(message) => (StatusCode::BAD_REQUEST, view(&message)).into_response(),
        error => error.into_page_response(),
    }
}

pub(super) fn form_error_alert(error_message: Option<&str>) -> Markup {
    html! {
        @if let Some(message) = error_message {
            p id="form-error" role="alert" class=(FORM_ERROR_STYLE) { (message) }
        }
    }
}

pub(super) fn transaction_form_fields(form: &TransactionForm) -> Markup {
    let is_income = form.kind == TransactionType::Income.as_str();

    html! {
        fieldset class="space-y-2"
        {
            legend class=(FORM_LABEL_STYLE) { "Transaction type" }

            div class=(FORM_RADIO_GROUP_STYLE)
            {
                div class="flex items-center gap-3"
                {
                    input
                        name="type"
                        id="transaction-type-expense"
                        type="radio"
                        value="expense"
                        checked[!is_income]
                        required
                        class=(FORM_RADIO_INPUT_STYLE);

                    label
                        for="transaction-type-expense"
                        class=(FORM_RADIO_LABEL_STYLE)
                    {
                        "Expense"
                    }
                }

                div class="flex items-center gap-3"
                {
                    input
                        name="type"
                        id="transaction-type-income"
                        type="radio"
                        value="income"
                        checked[is_income]
                        required
                        class=(FORM_RADIO_INPUT_STYLE);

                    label
                        for="transaction-type-income"
                        class=(FORM_RADIO_LABEL_STYLE)
                    {
                        "Income"
                    }
                }
            }
        }

        div
        {
            label
                for="amount"
                class=(FORM_LABEL_STYLE)
            {
                "Amount"
            }

            input
                name="amount"
                id="amount"
                type="number"
                step="any"
                placeholder="0.00"
                required
                autofocus
                value=(form.amount)
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label
                for="description"
                class=(FORM_LABEL_STYLE)
            {
                "Description"
            }

            input
                name="description"
                id="description"
                type="text"
                placeholder="Description"
                required
                value=(form.description)
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label
                for="category"
                class=(FORM_LABEL_STYLE)
            {
                "Category"
            }

            input
                name="category"
                id="category"
                type="text"
                placeholder="Category"
                required
                value=(form.category)
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label
                for="date"
                class=(FORM_LABEL_STYLE)
            {
                "Date"
            }

            input
                name="date"
                id="date"
                type="date"
                required
                value=(form.date)
                class=(FORM_TEXT_INPUT_STYLE);
        }
    }
}

#[cfg(test)]
mod tests {
    use mongodb::bson::oid::ObjectId;
    use scraper::{Html, Selector};
    use time::macros::{date, datetime};

    use crate::{
        Error,
        transaction::{
            Transaction, TransactionInput, TransactionType,
            form::{TransactionForm, transaction_form_fields},
        },
    };

    fn render_fields(form: &TransactionForm) -> Html {
        let markup = maud::html! { form { (transaction_form_fields(form)) } };
        Html::parse_document(&markup.into_string())
    }

    fn checked_type(document: &Html) -> Option<String> {
        let selector = Selector::parse("input[type=radio][name=type]").unwrap();
        let inputs = document.select(&selector).collect::<Vec<_>>();
        assert_eq!(
            inputs.len(),
            2,
            "want 2 transaction type inputs, got {}",
            inputs.len()
        );

        inputs
            .iter()
            .find(|input| input.value().attr("checked").is_some())
            .and_then(|input| input.value().attr("value"))
            .map(str::to_owned)
    }

    #[test]
    fn checks_selected_type() {
        let cases = [("expense", "expense"), ("income", "income"), ("", "expense")];

        for (kind, want) in cases {
            let document = render_fields(&TransactionForm {
                kind: kind.to_owned(),
                ..Default::default()
            });

            assert_eq!(
                checked_type(&document).as_deref(),
                Some(want),
                "form kind {kind:?}"
            );
        }
    }

    #[test]
    fn prefills_values_from_transaction() {
        let transaction = Transaction {
            id: ObjectId::new(),
            amount: 1500.25,
            description: "Salary".to_owned(),
            category: "Work".to_owned(),
            kind: TransactionType::Income,
            date: date!(2024 - 03 - 01),
            created_at: datetime!(2024-03-01 9:00 UTC),
            updated_at: datetime!(2024-03-01 9:00 UTC),
        };

        let document = render_fields(&TransactionForm::from_transaction(&transaction));

        let value_of = |name: &str| {
            let selector = Selector::parse(&format!("input[name={name}]")).unwrap();
            document
                .select(&selector)
                .next()
                .and_then(|input| input.value().attr("value"))
                .map(str::to_owned)
        };
        assert_eq!(value_of("amount").as_deref(), Some("1500.25"));
        assert_eq!(value_of("description").as_deref(), Some("Salary"));
        assert_eq!(value_of("category").as_deref(), Some("Work"));
        assert_eq!(value_of("date").as_deref(), Some("2024-03-01"));
        assert_eq!(checked_type(&document).as_deref(), Some("income"));
    }

    #[test]
    fn converts_filled_form_to_input() {
        let form = TransactionForm {
            kind: "expense".to_owned(),
            amount: " 12.5 ".to_owned(),
            description: "Coffee".to_owned(),
            category: "Food".to_owned(),
            date: "2024-01-15".to_owned(),
        };

        assert_eq!(
            form.into_input(),
            Ok(TransactionInput {
                amount: Some(12.5),
                description: Some("Coffee".to_owned()),
                category: Some("Food".to_owned()),
                kind: Some("expense".to_owned()),
                date: Some("2024-01-15".to_owned()),
            })
        );
    }

    #[test]
    fn empty_fields_are_reported_as_missing() {
        let input = TransactionForm::default().into_input().unwrap();

        assert_eq!(
            input.validate(),
            Err(Error::Validation("amount is required".to_owned()))
        );
    }

    #[test]
    fn rejects_non_numeric_amount() {
        let form = TransactionForm {
            amount: "a lot".to_owned(),
            ..Default::default()
        };

        assert_eq!(
            form.into_input(),
            Err(Error::Validation("amount must be a number".to_owned()))
        );
    }
}
