//! # ルーター構築
//!
//! main とテストで同じルーティングを使うため、Router の組み立てをここに集約する。
//!
//! | メソッド | パス | ハンドラ |
//! |---------|------|---------|
//! | GET | `/health` | [`health_check`] |
//! | GET | `/health/ready` | [`readiness_check`] |
//! | POST | `/internal/relay/cycles` | [`run_relay_cycle`] |

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use notify_relay_infra::QueueClient;
use tower_http::trace::TraceLayer;

use crate::{
    handler::{
        ReadinessState,
        RelayState,
        health_check,
        readiness_check,
        run_relay_cycle,
    },
    usecase::QueueRelay,
};

/// アプリケーションのルーターを構築する
///
/// Readiness Check はリレーと同じキュークライアントで到達性を確認する。
pub fn build_router(relay: Arc<QueueRelay>, queue: Arc<dyn QueueClient>) -> Router {
    let relay_state = Arc::new(RelayState { relay });
    let readiness_state = Arc::new(ReadinessState { queue });

    Router::new()
        .route("/health", get(health_check))
        .merge(
            Router::new()
                .route("/health/ready", get(readiness_check))
                .with_state(readiness_state),
        )
        .merge(
            Router::new()
                .route("/internal/relay/cycles", post(run_relay_cycle))
                .with_state(relay_state),
        )
        .layer(TraceLayer::new_for_http())
}
