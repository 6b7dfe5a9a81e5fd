//! # AWS SDK 共通設定
//!
//! SQS / SNS / SES クライアントで共有する `SdkConfig` を読み込む。
//!
//! 認証情報は SDK のデフォルト認証チェーンで解決する:
//! - ローカル: 環境変数 `AWS_ACCESS_KEY_ID` / `AWS_SECRET_ACCESS_KEY`（`.env` で設定）
//! - 本番: IAM ロール
//!
//! ## 使用例
//!
//! ```rust,ignore
//! use notify_relay_infra::{aws, queue::SqsQueueClient};
//!
//! async fn setup() {
//!     // LocalStack
//!     let config = aws::load_config(Some("us-east-1"), Some("http://localhost:4566")).await;
//!     let queue = SqsQueueClient::new(
//!         aws_sdk_sqs::Client::new(&config),
//!         "http://localhost:4566/000000000000/notifications".to_string(),
//!     );
//! }
//! ```

use aws_config::{BehaviorVersion, Region, SdkConfig};

/// SDK 設定を読み込む
///
/// # 引数
///
/// * `region` - リージョン。`None` の場合は SDK のデフォルト解決（`AWS_REGION` 等）に任せる
/// * `endpoint` - カスタムエンドポイント URL（例: LocalStack の `http://localhost:4566`）
pub async fn load_config(region: Option<&str>, endpoint: Option<&str>) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());

    if let Some(region) = region {
        loader = loader.region(Region::new(region.to_owned()));
    }
    if let Some(endpoint_url) = endpoint {
        loader = loader.endpoint_url(endpoint_url);
    }

    loader.load().await
}
