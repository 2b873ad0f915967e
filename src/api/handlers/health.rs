use axum::extract::State;
use axum::response::{IntoResponse, Json};
use axum::http::StatusCode;
use std::sync::Arc;
use time::OffsetDateTime;
use crate::{AppState, HealthResponse};

pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let store_connected = state.store.is_connected().await;
    let response = HealthResponse {
        status: if store_connected { "OK" } else { "DEGRADED" },
        version: env!("CARGO_PKG_VERSION"),
        timestamp: OffsetDateTime::now_utc().to_string(),
        store_connected,
    };

    (StatusCode::OK, Json(response))
}
