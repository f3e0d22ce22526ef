use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};

use crate::{
    Error,
    store::TransactionCollection,
    transaction::{Transaction, TransactionInput, TransactionState, core::now_utc},
};

/// A route handler for creating a new transaction.
///
/// Responds with `201 Created` and the stored transaction, including the ID
/// the store assigned to it.
pub async fn create_transaction_endpoint(
    State(state): State<TransactionState>,
    payload: Result<Json<TransactionInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Transaction>), Error> {
    let input = extract_input(payload)?;
    let transaction = create_transaction(input, &state.collection).await?;

    Ok((StatusCode::CREATED, Json(transaction)))
}

/// Turn a rejected JSON body into a validation error the client can read.
pub(super) fn extract_input(
    payload: Result<Json<TransactionInput>, JsonRejection>,
) -> Result<TransactionInput, Error> {
    match payload {
        Ok(Json(input)) => Ok(input),
        Err(rejection) => {
            tracing::debug!("Rejected transaction body: {rejection}");
            Err(Error::Validation(rejection.body_text()))
        }
    }
}

/// Validate `input` and store it as a new transaction.
///
/// Both timestamps are set to the current time.
///
/// # Errors
/// This function will return a:
/// - [Error::Validation] if a field is missing or malformed, in which case the store is not
///   touched,
/// - or [Error::Storage] if the insert fails or times out.
pub async fn create_transaction(
    input: TransactionInput,
    collection: &TransactionCollection,
) -> Result<Transaction, Error> {
    let fields = input.validate()?;
    let now = now_utc();

    let id = collection
        .insert_one(&fields, now)
        .await
        .map_err(|error| error.into_storage_error("Error creating transaction"))?;

    Ok(fields.into_transaction(id, now, now))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::{Router, http::StatusCode, routing::post};
    use axum_test::TestServer;
    use serde_json::{Value, json};

    use crate::{
        Error, endpoints,
        transaction::{
            TransactionInput, TransactionState,
            create_endpoint::{create_transaction, create_transaction_endpoint},
            get_transaction, list_transactions,
            test_utils::{get_test_state, test_input},
        },
    };

    fn get_test_server(state: TransactionState) -> TestServer {
        let app = Router::new()
            .route(endpoints::TRANSACTIONS_API, post(create_transaction_endpoint))
            .with_state(state);

        TestServer::new(app).expect("Could not create test server.")
    }

    #[tokio::test]
    async fn created_transaction_can_be_fetched() {
        let state = get_test_state().await;

        let created = create_transaction(test_input("2024-01-15"), &state.collection)
            .await
            .unwrap();
        let fetched = get_transaction(created.id, &state.collection).await;

        assert_eq!(fetched, Ok(created.clone()));
        assert_eq!(created.created_at, created.updated_at);
    }

    #[tokio::test]
    async fn invalid_type_never_reaches_the_store() {
        let state = get_test_state().await;
        let input = TransactionInput {
            kind: Some("gift".to_owned()),
            ..test_input("2024-01-15")
        };

        let result = create_transaction(input, &state.collection).await;

        assert!(matches!(result, Err(Error::Validation(_))));
        assert_eq!(list_transactions(&state.collection).await, Ok(vec![]));
    }

    #[tokio::test]
    async fn endpoint_creates_transaction() {
        let server = get_test_server(get_test_state().await);

        let response = server
            .post(endpoints::TRANSACTIONS_API)
            .json(&json!({
                "amount": 42.5,
                "description": "Groceries",
                "category": "Food",
                "type": "expense",
                "date": "2024-01-15"
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let body = response.json::<Value>();
        let id = body["id"].as_str().expect("id should be a string");
        assert_eq!(id.len(), 24);
        assert_eq!(body["amount"], 42.5);
        assert_eq!(body["description"], "Groceries");
        assert_eq!(body["category"], "Food");
        assert_eq!(body["type"], "expense");
        assert_eq!(body["date"], "2024-01-15");
        assert_eq!(body["createdAt"], body["updatedAt"]);
    }

    #[tokio::test]
    async fn endpoint_rejects_invalid_date() {
        let server = get_test_server(get_test_state().await);

        let response = server
            .post(endpoints::TRANSACTIONS_API)
            .json(&json!({
                "amount": 1,
                "description": "Coffee",
                "category": "Food",
                "type": "expense",
                "date": "15-01-2024"
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({ "error": "Invalid date format. Use YYYY-MM-DD" }));
    }

    #[tokio::test]
    async fn endpoint_names_missing_field() {
        let server = get_test_server(get_test_state().await);

        let response = server
            .post(endpoints::TRANSACTIONS_API)
            .json(&json!({
                "amount": 1,
                "category": "Food",
                "type": "income",
                "date": "2024-01-15"
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({ "error": "description is required" }));
    }

    #[tokio::test]
    async fn endpoint_rejects_malformed_json_with_json_error() {
        let server = get_test_server(get_test_state().await);

        let response = server
            .post(endpoints::TRANSACTIONS_API)
            .json(&json!({ "amount": "a lot" }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body = response.json::<Value>();
        assert!(body["error"].is_string(), "want an error message, got {body}");
    }

    #[tokio::test]
    async fn timed_out_insert_is_storage_error() {
        let state = get_test_state().await;
        let collection = state.collection.with_timeout(Duration::from_millis(50));
        let connection = collection
            .sqlite_connection()
            .expect("test store should be SQLite");
        let _guard = connection.lock().unwrap();

        let result = create_transaction(test_input("2024-01-15"), &collection).await;

        assert_eq!(result, Err(Error::Storage("Error creating transaction")));
    }
}
