//! # notify-relay 共有ユーティリティ
//!
//! ドメイン・インフラ・サービスの各クレートから使う共通ユーティリティ。
//!
//! ## 設計方針
//!
//! - ビジネスロジックを含まない純粋なユーティリティのみを配置
//! - トレーシング初期化は `observability` feature の背後に置き、
//!   ライブラリクレートが subscriber 実装に依存しないようにする

pub mod event_log;
pub mod health;
pub mod observability;

pub use health::{CheckStatus, HealthResponse, ReadinessResponse, ReadinessStatus};
