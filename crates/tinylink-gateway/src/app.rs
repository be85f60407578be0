use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handlers::{
    delete_url_handler, health_handler, list_urls_handler, ping_handler, redirect_handler,
    shorten_handler,
};
use crate::state::AppState;

pub struct App;

impl App {
    pub fn router(state: AppState) -> Router {
        let api = Router::new()
            .route("/shorten", post(shorten_handler))
            .route("/all", get(list_urls_handler))
            .route("/health", get(health_handler))
            .route("/ping", get(ping_handler))
            .route(
                "/{code}",
                get(redirect_handler).delete(delete_url_handler),
            );

        Router::new()
            .route("/{code}", get(redirect_handler))
            .nest("/api", api)
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }
}
