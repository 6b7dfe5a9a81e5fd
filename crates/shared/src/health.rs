//! # ヘルスチェック型
//!
//! `/health`（Liveness）と `/health/ready`（Readiness）のレスポンス型。
//!
//! Readiness はチェック名ごとの結果を持ち、1 つでも `error` があれば
//! 全体を `not_ready` にする。Relay Service のチェックはキューへの到達性のみ。
//!
//! ```json
//! { "status": "not_ready", "checks": { "queue": "error" } }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Liveness レスポンス
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status:  String,
    /// `CARGO_PKG_VERSION`
    pub version: String,
}

impl HealthResponse {
    pub fn healthy(version: impl Into<String>) -> Self {
        Self {
            status:  "healthy".to_string(),
            version: version.into(),
        }
    }
}

/// 個別チェックの結果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Ok,
    Error,
}

/// Readiness 全体の状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadinessStatus {
    Ready,
    NotReady,
}

/// Readiness レスポンス
///
/// `checks` はチェック名の順に並ぶ。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub status: ReadinessStatus,
    pub checks: BTreeMap<String, CheckStatus>,
}

impl ReadinessResponse {
    pub fn from_checks(checks: impl IntoIterator<Item = (String, CheckStatus)>) -> Self {
        let checks: BTreeMap<_, _> = checks.into_iter().collect();
        let status = if checks.values().all(|s| *s == CheckStatus::Ok) {
            ReadinessStatus::Ready
        } else {
            ReadinessStatus::NotReady
        };
        Self { status, checks }
    }

    pub fn is_ready(&self) -> bool {
        self.status == ReadinessStatus::Ready
    }
}
