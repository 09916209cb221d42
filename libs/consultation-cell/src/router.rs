// libs/consultation-cell/src/router.rs
use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers::*;

pub fn consultation_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(list_consultations))
        .route("/{consultation_id}", get(get_consultation))
        .route("/{consultation_id}/status", patch(update_consultation_status))
        .route("/{consultation_id}/prescription", post(attach_prescription))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
