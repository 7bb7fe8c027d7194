//! # ヘルスチェックハンドラ
//!
//! - `/health`: Liveness Check（常に `"healthy"` を返す）
//! - `/health/ready`: Readiness Check（配信に使えるトランスポートが 1 つ以上あるか）
//!
//! レスポンス型は [`mailswitch_shared::HealthResponse`] / [`mailswitch_shared::ReadinessResponse`] を参照。

use std::{collections::HashMap, sync::Arc};

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use mailswitch_shared::{CheckStatus, HealthResponse, ReadinessResponse, ReadinessStatus};

use crate::app_builder::AppState;

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status:  "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// トランスポートが 1 つもなければ 503
pub async fn readiness_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let transports = if state.switch.is_empty() {
        tracing::warn!("readiness check: 有効なトランスポートがありません");
        CheckStatus::Error
    } else {
        CheckStatus::Ok
    };

    let response =
        ReadinessResponse::from_checks(HashMap::from([("transports".to_string(), transports)]));
    let http_status = match response.status {
        ReadinessStatus::Ready => StatusCode::OK,
        ReadinessStatus::NotReady => StatusCode::SERVICE_UNAVAILABLE,
    };

    (http_status, Json(response))
}
