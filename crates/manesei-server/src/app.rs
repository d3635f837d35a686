//! Application state and routes

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use manesei_core::{Config, NoteStore};

use crate::handlers;

/// Shared by every request
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn NoteStore>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(store: Arc<dyn NoteStore>, config: Config) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }
}

/// Build the router with all routes and middleware
pub fn router(state: AppState) -> Router {
    let fonts = ServeDir::new(state.config.fonts_dir());

    Router::new()
        .route("/", get(handlers::index))
        .route("/n/", get(handlers::view_root))
        .route("/n/*slug", get(handlers::view_note))
        .route("/nid/:id", get(handlers::view_by_id))
        .route("/edit/:id", get(handlers::edit_form).post(handlers::save))
        .route("/new/", get(handlers::new_form_root).post(handlers::save))
        .route("/new/*host", get(handlers::new_form).post(handlers::save))
        .route("/history/:id", get(handlers::history))
        .route("/history/:id/:rev", get(handlers::revision))
        .nest_service("/fonts", fonts)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
