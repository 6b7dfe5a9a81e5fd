//! # テスト用モック
//!
//! リレーサイクルのテストで使用するインメモリのキューと配信チャネル。
//! `test-utils` feature を有効にすることで、他クレートからも利用可能。
//!
//! ```toml
//! [dev-dependencies]
//! notify-relay-infra = { workspace = true, features = ["test-utils"] }
//! ```
//!
//! 各モックは `Clone` で内部状態を共有する。テストではクローンを
//! `Arc<dyn Trait>` として渡し、手元に残したほうで呼び出しを検証する。

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use chrono::Utc;
use notify_relay_domain::{
    notification::{EmailMessage, NotificationError, ProviderAck, SmsMessage},
    queue::{QueueRecord, ReceiptHandle},
};

use crate::{
    error::{InfraError, QueueOperation},
    notification::{EmailChannel, SmsChannel},
    queue::QueueClient,
};

// ===== MockQueueClient =====

#[derive(Clone, Default)]
pub struct MockQueueClient {
    records:       Arc<Mutex<VecDeque<QueueRecord>>>,
    deleted:       Arc<Mutex<Vec<ReceiptHandle>>>,
    receive_calls: Arc<Mutex<Vec<Duration>>>,
    receive_error: Arc<Mutex<Option<String>>>,
    delete_error:  Arc<Mutex<Option<String>>>,
    delete_delay:  Arc<Mutex<Option<Duration>>>,
}

impl MockQueueClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// 本文を指定してレコードを積む。受信ハンドルは `receipt-<連番>`
    pub fn push_body(&self, raw_body: impl Into<String>) -> ReceiptHandle {
        let mut records = self.records.lock().unwrap();
        let seq = records.len() + self.deleted.lock().unwrap().len() + 1;
        let receipt = ReceiptHandle::new(format!("receipt-{seq}"));
        records.push_back(QueueRecord {
            receipt:     receipt.clone(),
            message_id:  Some(format!("msg-{seq}")),
            raw_body:    raw_body.into(),
            received_at: Utc::now(),
        });
        receipt
    }

    /// 受信時に返すエラーを設定する
    pub fn fail_receive(&self, message: impl Into<String>) {
        *self.receive_error.lock().unwrap() = Some(message.into());
    }

    /// 削除時に返すエラーを設定する
    pub fn fail_delete(&self, message: impl Into<String>) {
        *self.delete_error.lock().unwrap() = Some(message.into());
    }

    /// 削除前に待機する時間を設定する（タイムアウトの検証用）
    pub fn delay_delete(&self, duration: Duration) {
        *self.delete_delay.lock().unwrap() = Some(duration);
    }

    /// 削除されたレコードの受信ハンドル
    pub fn deleted(&self) -> Vec<ReceiptHandle> {
        self.deleted.lock().unwrap().clone()
    }

    /// `receive_one` に渡された待機時間
    pub fn receive_calls(&self) -> Vec<Duration> {
        self.receive_calls.lock().unwrap().clone()
    }

    /// キューに残っているレコード数
    pub fn pending(&self) -> usize {
        self.records.lock().unwrap().len()
    }
}

#[async_trait]
impl QueueClient for MockQueueClient {
    async fn receive_one(&self, wait: Duration) -> Result<Option<QueueRecord>, InfraError> {
        self.receive_calls.lock().unwrap().push(wait);
        if let Some(message) = self.receive_error.lock().unwrap().clone() {
            return Err(InfraError::queue(QueueOperation::Receive, message));
        }
        // 受信しただけでは取り除かない（可視性タイムアウトの再現は不要なので先頭を返すだけ）
        Ok(self.records.lock().unwrap().front().cloned())
    }

    async fn delete(&self, receipt: &ReceiptHandle) -> Result<(), InfraError> {
        let delay = *self.delete_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(message) = self.delete_error.lock().unwrap().clone() {
            return Err(InfraError::queue(QueueOperation::Delete, message));
        }
        self.records
            .lock()
            .unwrap()
            .retain(|record| &record.receipt != receipt);
        self.deleted.lock().unwrap().push(receipt.clone());
        Ok(())
    }

    async fn check_connection(&self) -> Result<(), InfraError> {
        match self.receive_error.lock().unwrap().clone() {
            Some(message) => Err(InfraError::queue(QueueOperation::Connectivity, message)),
            None => Ok(()),
        }
    }
}

// ===== MockSmsChannel =====

#[derive(Clone, Default)]
pub struct MockSmsChannel {
    sent:        Arc<Mutex<Vec<SmsMessage>>>,
    published:   Arc<Mutex<Vec<(String, String)>>>,
    send_error:  Arc<Mutex<Option<String>>>,
    topic_error: Arc<Mutex<Option<String>>>,
    delay:       Arc<Mutex<Option<Duration>>>,
    topic_delay: Arc<Mutex<Option<Duration>>>,
}

impl MockSmsChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_send(&self, message: impl Into<String>) {
        *self.send_error.lock().unwrap() = Some(message.into());
    }

    pub fn fail_topic(&self, message: impl Into<String>) {
        *self.topic_error.lock().unwrap() = Some(message.into());
    }

    /// 送信前に待機する時間を設定する（タイムアウトの検証用）
    pub fn delay(&self, duration: Duration) {
        *self.delay.lock().unwrap() = Some(duration);
    }

    /// トピック公開前に待機する時間を設定する（タイムアウトの検証用）
    pub fn delay_topic(&self, duration: Duration) {
        *self.topic_delay.lock().unwrap() = Some(duration);
    }

    /// 送信された SMS
    pub fn sent(&self) -> Vec<SmsMessage> {
        self.sent.lock().unwrap().clone()
    }

    /// トピックに公開された `(topic_arn, message)`
    pub fn published(&self) -> Vec<(String, String)> {
        self.published.lock().unwrap().clone()
    }
}

#[async_trait]
impl SmsChannel for MockSmsChannel {
    async fn send_sms(&self, sms: &SmsMessage) -> Result<ProviderAck, NotificationError> {
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(message) = self.send_error.lock().unwrap().clone() {
            return Err(NotificationError::SendFailed(message));
        }
        let mut sent = self.sent.lock().unwrap();
        sent.push(sms.clone());
        Ok(ProviderAck::new(format!("sms-{}", sent.len())))
    }

    async fn publish_to_topic(
        &self,
        topic_arn: &str,
        message: &str,
    ) -> Result<ProviderAck, NotificationError> {
        let delay = *self.topic_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(error) = self.topic_error.lock().unwrap().clone() {
            return Err(NotificationError::SendFailed(error));
        }
        let mut published = self.published.lock().unwrap();
        published.push((topic_arn.to_owned(), message.to_owned()));
        Ok(ProviderAck::new(format!("topic-{}", published.len())))
    }
}

// ===== MockEmailChannel =====

#[derive(Clone, Default)]
pub struct MockEmailChannel {
    sent:       Arc<Mutex<Vec<EmailMessage>>>,
    send_error: Arc<Mutex<Option<String>>>,
}

impl MockEmailChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_send(&self, message: impl Into<String>) {
        *self.send_error.lock().unwrap() = Some(message.into());
    }

    /// 送信されたメール
    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmailChannel for MockEmailChannel {
    async fn send_email(&self, email: &EmailMessage) -> Result<ProviderAck, NotificationError> {
        if let Some(message) = self.send_error.lock().unwrap().clone() {
            return Err(NotificationError::SendFailed(message));
        }
        let mut sent = self.sent.lock().unwrap();
        sent.push(email.clone());
        Ok(ProviderAck::new(format!("email-{}", sent.len())))
    }
}
