//! # ヘルスチェックハンドラ
//!
//! - `/health` — Liveness Check（常に `"healthy"` を返す）
//! - `/health/ready` — Readiness Check（キューへの到達性を確認）
//!
//! レスポンス型は [`notify_relay_shared::HealthResponse`] / [`notify_relay_shared::ReadinessResponse`] を参照。

use std::{sync::Arc, time::Duration};

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use notify_relay_infra::QueueClient;
use notify_relay_shared::{CheckStatus, HealthResponse, ReadinessResponse};

const READINESS_TIMEOUT: Duration = Duration::from_secs(5);

/// ヘルスチェックエンドポイント
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::healthy(env!("CARGO_PKG_VERSION")))
}

/// Readiness Check 用の State
pub struct ReadinessState {
    pub queue: Arc<dyn QueueClient>,
}

/// Readiness Check エンドポイント
///
/// キューに到達できれば 200、できなければ 503。
#[tracing::instrument(skip_all)]
pub async fn readiness_check(State(state): State<Arc<ReadinessState>>) -> impl IntoResponse {
    let queue_status = check_queue(state.queue.as_ref()).await;

    let response = ReadinessResponse::from_checks([("queue".to_string(), queue_status)]);
    let http_status = if response.is_ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (http_status, Json(response))
}

/// キューの属性取得で到達性を確認する（タイムアウト: 5 秒）
async fn check_queue(queue: &dyn QueueClient) -> CheckStatus {
    match tokio::time::timeout(READINESS_TIMEOUT, queue.check_connection()).await {
        Ok(Ok(())) => CheckStatus::Ok,
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "readiness check: queue check failed");
            CheckStatus::Error
        }
        Err(_) => {
            tracing::warn!("readiness check: queue check timed out");
            CheckStatus::Error
        }
    }
}
