//! # キュークライアント
//!
//! 通知レコードを保持するキュー（Amazon SQS）への受信・削除を担当する。
//!
//! ## 設計方針
//!
//! - **1 件ずつ受信**: `MaxNumberOfMessages = 1` でロングポーリングする
//! - **受信だけでは削除しない**: 受信したレコードは可視性タイムアウトの間だけ
//!   他のコンシューマから隠れる。配送確認後に [`QueueClient::delete`] で明示的に削除する
//! - **テスト時はモックに差し替え**: `test-utils` feature の `MockQueueClient` を使う

use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_sqs::{Client, error::DisplayErrorContext};
use chrono::Utc;
use notify_relay_domain::queue::{QueueRecord, ReceiptHandle};

use crate::error::{InfraError, QueueOperation};

/// キュークライアントのインターフェース
#[async_trait]
pub trait QueueClient: Send + Sync {
    /// レコードを最大 1 件受信する
    ///
    /// `wait` の間ロングポーリングし、レコードが無ければ `None` を返す。
    async fn receive_one(&self, wait: Duration) -> Result<Option<QueueRecord>, InfraError>;

    /// 受信ハンドルでレコードを削除する
    async fn delete(&self, receipt: &ReceiptHandle) -> Result<(), InfraError>;

    /// キューに到達できるか確認する（Readiness Check 用）
    async fn check_connection(&self) -> Result<(), InfraError>;
}

/// Amazon SQS クライアント
pub struct SqsQueueClient {
    client:    Client,
    queue_url: String,
}

impl SqsQueueClient {
    pub fn new(client: Client, queue_url: String) -> Self {
        Self { client, queue_url }
    }
}

#[async_trait]
impl QueueClient for SqsQueueClient {
    async fn receive_one(&self, wait: Duration) -> Result<Option<QueueRecord>, InfraError> {
        let wait_seconds = i32::try_from(wait.as_secs())
            .map_err(|_| InfraError::unexpected(format!("待機時間が大きすぎる: {wait:?}")))?;

        let output = self
            .client
            .receive_message()
            .queue_url(&self.queue_url)
            .max_number_of_messages(1)
            .wait_time_seconds(wait_seconds)
            .send()
            .await
            .map_err(|e| {
                InfraError::queue(QueueOperation::Receive, DisplayErrorContext(&e).to_string())
            })?;

        let Some(message) = output.messages().first() else {
            return Ok(None);
        };

        let receipt = message.receipt_handle().ok_or_else(|| {
            InfraError::queue(
                QueueOperation::Receive,
                "受信したメッセージに receipt handle がない",
            )
        })?;

        Ok(Some(QueueRecord {
            receipt:     ReceiptHandle::new(receipt),
            message_id:  message.message_id().map(str::to_owned),
            raw_body:    message.body().unwrap_or_default().to_owned(),
            received_at: Utc::now(),
        }))
    }

    async fn delete(&self, receipt: &ReceiptHandle) -> Result<(), InfraError> {
        self.client
            .delete_message()
            .queue_url(&self.queue_url)
            .receipt_handle(receipt.as_str())
            .send()
            .await
            .map_err(|e| {
                InfraError::queue(QueueOperation::Delete, DisplayErrorContext(&e).to_string())
            })?;

        Ok(())
    }

    async fn check_connection(&self) -> Result<(), InfraError> {
        self.client
            .get_queue_attributes()
            .queue_url(&self.queue_url)
            .send()
            .await
            .map_err(|e| {
                InfraError::queue(QueueOperation::Connectivity, DisplayErrorContext(&e).to_string())
            })?;

        Ok(())
    }
}
