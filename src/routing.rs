//! Application router configuration.

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    cors::cors_middleware,
    dashboard::get_dashboard_page,
    endpoints,
    not_found::get_404_not_found,
    transaction::{
        create_transaction_endpoint, create_transaction_form_endpoint,
        delete_transaction_endpoint, delete_transaction_form_endpoint, edit_transaction_endpoint,
        edit_transaction_form_endpoint, get_delete_transaction_page, get_edit_transaction_page,
        get_new_transaction_page, get_transaction_endpoint, get_transactions_page,
        list_transactions_endpoint,
    },
};

/// Return a router with all the app's routes.
///
/// Every response, including the 404 fallback, carries the CORS headers and
/// preflight requests are answered before routing.
pub fn build_router(state: AppState) -> Router {
    let page_routes = Router::new()
        .route(endpoints::ROOT, get(get_dashboard_page))
        .route(endpoints::TRANSACTIONS_VIEW, get(get_transactions_page))
        .route(
            endpoints::NEW_TRANSACTION_VIEW,
            get(get_new_transaction_page).post(create_transaction_form_endpoint),
        )
        .route(
            endpoints::EDIT_TRANSACTION_VIEW,
            get(get_edit_transaction_page).post(edit_transaction_form_endpoint),
        )
        .route(
            endpoints::DELETE_TRANSACTION_VIEW,
            get(get_delete_transaction_page).post(delete_transaction_form_endpoint),
        );

    let api_routes = Router::new()
        .route(
            endpoints::TRANSACTIONS_API,
            post(create_transaction_endpoint).get(list_transactions_endpoint),
        )
        .route(
            endpoints::TRANSACTION,
            get(get_transaction_endpoint)
                .put(edit_transaction_endpoint)
                .delete(delete_transaction_endpoint),
        );

    page_routes
        .merge(api_routes)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .layer(middleware::from_fn(cors_middleware))
        .with_state(state)
}
