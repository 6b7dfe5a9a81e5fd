//! # キューリレー
//!
//! 1 回の起動で、キューから 1 件受信 → デコード → 宛先解決 → 分類 → レンダリング →
//! 配送 → 削除 までを実行する。
//!
//! ## 状態遷移
//!
//! | 段階 | 失敗時の結果 | レコード |
//! |------|-------------|---------|
//! | 受信 | `NoWorkFound`（空）/ `ReceiveFailed` | なし |
//! | デコード | `DecodeFailed` | 保持 |
//! | 宛先解決 | `MissingRecipient` | 保持 |
//! | 分類 | `InvalidRecipient` | 保持 |
//! | レンダリング | `DecodeFailed` | 保持 |
//! | 配送 | `DeliveryFailed` | 保持 |
//! | 削除 | `Delivered { record_deleted: false }` | 保持 |
//!
//! 削除まで成功すると `Delivered { record_deleted: true }`。
//!
//! ## 設計方針
//!
//! - **配送確認後にのみ削除**: 配送に失敗したレコードは残し、可視性タイムアウト後に再配送させる
//! - **削除失敗は配送成功のまま**: `record_deleted: false` で返し、重複配送は許容する（at-least-once）
//! - **サイクル全体のタイムアウト**: 期限は `tokio::time::timeout_at` で各プロバイダ呼び出しに適用する
//! - **プロバイダのエラー型を外に出さない**: 失敗はすべてここで [`DeliveryResult`] に変換する

use std::{sync::Arc, time::Duration};

use notify_relay_domain::{
    DeliveryResult,
    delivery::SecondaryOutcome,
    notification::NotificationPayload,
    queue::{CycleId, QueueRecord},
    recipient::classify,
};
use notify_relay_infra::QueueClient;
use notify_relay_shared::{
    event_log::{error as log_error, event},
    log_business_event,
};
use tokio::time::{Instant, timeout_at};
use tracing::Instrument as _;

use super::{DeliveryRouter, TemplateRenderer};

/// リレーサイクルの設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelaySettings {
    /// ロングポーリング待機時間
    pub queue_wait:        Duration,
    /// サイクル全体のタイムアウト
    pub cycle_timeout:     Duration,
    /// 既定の宛先
    pub default_recipient: Option<String>,
}

/// キューリレー
///
/// 可変状態を持たないため、`Arc` で共有して並行に `run_cycle` を呼び出してよい。
pub struct QueueRelay {
    queue:    Arc<dyn QueueClient>,
    router:   DeliveryRouter,
    renderer: Arc<TemplateRenderer>,
    settings: RelaySettings,
}

impl QueueRelay {
    pub fn new(
        queue: Arc<dyn QueueClient>,
        router: DeliveryRouter,
        renderer: Arc<TemplateRenderer>,
        settings: RelaySettings,
    ) -> Self {
        Self {
            queue,
            router,
            renderer,
            settings,
        }
    }

    /// リレーサイクルを 1 回実行する
    ///
    /// # 引数
    ///
    /// * `explicit_recipient` - 呼び出し元が指定した宛先。ペイロードの `recipient` より優先する
    pub async fn run_cycle(&self, explicit_recipient: Option<&str>) -> DeliveryResult {
        let cycle_id = CycleId::new();
        let span = tracing::info_span!("relay_cycle", cycle_id = %cycle_id);
        let deadline = Instant::now() + self.settings.cycle_timeout;

        async {
            let (result, record) = self.execute(explicit_recipient, deadline).await;
            log_outcome(&result, record.as_ref());
            result
        }
        .instrument(span)
        .await
    }

    async fn execute(
        &self,
        explicit_recipient: Option<&str>,
        deadline: Instant,
    ) -> (DeliveryResult, Option<QueueRecord>) {
        // Receiving
        let record = match timeout_at(deadline, self.queue.receive_one(self.settings.queue_wait))
            .await
        {
            Ok(Ok(Some(record))) => record,
            Ok(Ok(None)) => return (DeliveryResult::NoWorkFound, None),
            Ok(Err(e)) => {
                tracing::error!(
                    error.category = log_error::category::INFRASTRUCTURE,
                    error.kind = log_error::kind::QUEUE,
                    error = %e,
                    span_trace = %e.span_trace(),
                    "キューからの受信に失敗"
                );
                return (
                    DeliveryResult::ReceiveFailed {
                        reason: e.detail(),
                    },
                    None,
                );
            }
            Err(_) => return (self.timed_out(), None),
        };

        tracing::debug!(
            message_id = record.message_id.as_deref().unwrap_or_default(),
            received_at = %record.received_at,
            "レコードを受信"
        );

        let result = self
            .process_record(&record, explicit_recipient, deadline)
            .await;
        (result, Some(record))
    }

    async fn process_record(
        &self,
        record: &QueueRecord,
        explicit_recipient: Option<&str>,
        deadline: Instant,
    ) -> DeliveryResult {
        // Decoding
        let payload = match NotificationPayload::decode(&record.raw_body) {
            Ok(payload) => payload,
            Err(e) => {
                return DeliveryResult::DecodeFailed {
                    reason: e.detail().to_string(),
                };
            }
        };

        // ResolvingRecipient
        let Some(recipient) = self.resolve_recipient(explicit_recipient, &payload) else {
            return DeliveryResult::MissingRecipient;
        };

        // Classifying
        let Some(kind) = classify(recipient).kind() else {
            return DeliveryResult::InvalidRecipient {
                recipient: recipient.to_string(),
            };
        };

        // Rendering
        let rendered = match self.renderer.render(&payload, kind) {
            Ok(rendered) => rendered,
            Err(e) => {
                return DeliveryResult::DecodeFailed {
                    reason: e.detail().to_string(),
                };
            }
        };

        // Delivering
        let delivery = match timeout_at(
            deadline,
            self.router.deliver(kind, &rendered, recipient),
        )
        .await
        {
            Ok(Ok(delivery)) => delivery,
            Ok(Err(e)) => {
                tracing::error!(
                    error.category = log_error::category::EXTERNAL_SERVICE,
                    error.kind = log_error::kind::DELIVERY,
                    error = %e,
                    recipient.kind = %kind,
                    "配送に失敗"
                );
                return DeliveryResult::DeliveryFailed {
                    reason: e.detail().to_string(),
                };
            }
            Err(_) => return self.timed_out(),
        };

        let secondary = timeout_at(deadline, self.router.broadcast(kind, &rendered))
            .await
            .unwrap_or_else(|_| {
                Some(SecondaryOutcome::Failed(
                    "cycle deadline reached before topic publish completed".to_string(),
                ))
            });

        // Deleting
        let record_deleted = self.delete_record(record, deadline).await;

        DeliveryResult::Delivered {
            channel: delivery.channel,
            ack: delivery.ack,
            record_deleted,
            secondary,
        }
    }

    /// 宛先を解決する（呼び出し元の指定 → ペイロード → 既定値）
    fn resolve_recipient<'a>(
        &'a self,
        explicit_recipient: Option<&'a str>,
        payload: &'a NotificationPayload,
    ) -> Option<&'a str> {
        explicit_recipient
            .filter(|r| !r.trim().is_empty())
            .or_else(|| payload.recipient())
            .or(self.settings.default_recipient.as_deref())
    }

    async fn delete_record(&self, record: &QueueRecord, deadline: Instant) -> bool {
        let failure = match timeout_at(deadline, self.queue.delete(&record.receipt)).await {
            Ok(Ok(())) => return true,
            Ok(Err(e)) => e.to_string(),
            Err(_) => "cycle deadline reached before deletion completed".to_string(),
        };

        log_business_event!(
            event.category = event::category::NOTIFICATION,
            event.action = event::action::RELAY_DELETION_FAILED,
            event.entity_type = event::entity_type::QUEUE_RECORD,
            event.entity_id = record.message_id.as_deref().unwrap_or_default(),
            event.result = event::result::FAILURE,
            error = %failure,
            "配送済みレコードの削除に失敗（リース満了後に再配送される）"
        );
        false
    }

    fn timed_out(&self) -> DeliveryResult {
        tracing::error!(
            error.category = log_error::category::EXTERNAL_SERVICE,
            error.kind = log_error::kind::TIMEOUT,
            timeout = ?self.settings.cycle_timeout,
            "サイクルがタイムアウト"
        );
        DeliveryResult::DeliveryFailed {
            reason: format!(
                "relay cycle timed out after {}ms",
                self.settings.cycle_timeout.as_millis()
            ),
        }
    }
}

/// サイクル結果をビジネスイベントとして出力する
fn log_outcome(result: &DeliveryResult, record: Option<&QueueRecord>) {
    let entity_id = record
        .and_then(|r| r.message_id.as_deref())
        .unwrap_or_default();
    let status_code = result.status_code();

    match result {
        DeliveryResult::Delivered {
            channel,
            ack,
            record_deleted,
            secondary,
        } => {
            log_business_event!(
                event.category = event::category::NOTIFICATION,
                event.action = event::action::RELAY_DELIVERED,
                event.entity_type = event::entity_type::QUEUE_RECORD,
                event.entity_id = entity_id,
                event.result = event::result::SUCCESS,
                relay.channel = %channel,
                relay.provider_message_id = %ack,
                relay.record_deleted = record_deleted,
                relay.secondary = ?secondary,
                relay.status_code = status_code,
                "通知を配送"
            );
            if let Some(SecondaryOutcome::Failed(reason)) = secondary {
                log_business_event!(
                    event.category = event::category::NOTIFICATION,
                    event.action = event::action::TOPIC_PUBLISH_FAILED,
                    event.entity_type = event::entity_type::QUEUE_RECORD,
                    event.entity_id = entity_id,
                    event.result = event::result::FAILURE,
                    error = %reason,
                    "トピックへの公開に失敗"
                );
            }
        }
        DeliveryResult::NoWorkFound => {
            log_business_event!(
                event.category = event::category::NOTIFICATION,
                event.action = event::action::RELAY_NO_WORK,
                event.result = event::result::SKIPPED,
                relay.status_code = status_code,
                "キューは空"
            );
        }
        DeliveryResult::MissingRecipient => {
            log_business_event!(
                event.category = event::category::NOTIFICATION,
                event.action = event::action::RELAY_MISSING_RECIPIENT,
                event.entity_type = event::entity_type::QUEUE_RECORD,
                event.entity_id = entity_id,
                event.result = event::result::FAILURE,
                relay.status_code = status_code,
                "宛先が指定されていない"
            );
        }
        DeliveryResult::InvalidRecipient { recipient } => {
            log_business_event!(
                event.category = event::category::NOTIFICATION,
                event.action = event::action::RELAY_INVALID_RECIPIENT,
                event.entity_type = event::entity_type::QUEUE_RECORD,
                event.entity_id = entity_id,
                event.result = event::result::FAILURE,
                relay.recipient_length = recipient.chars().count(),
                relay.status_code = status_code,
                "宛先がメールアドレスにも電話番号にも一致しない"
            );
        }
        DeliveryResult::DecodeFailed { reason } => {
            log_business_event!(
                event.category = event::category::NOTIFICATION,
                event.action = event::action::RELAY_DECODE_FAILED,
                event.entity_type = event::entity_type::QUEUE_RECORD,
                event.entity_id = entity_id,
                event.result = event::result::FAILURE,
                error.category = log_error::category::INFRASTRUCTURE,
                error.kind = log_error::kind::PAYLOAD,
                error = %reason,
                relay.status_code = status_code,
                "ペイロードのデコードに失敗"
            );
        }
        DeliveryResult::DeliveryFailed { reason } => {
            log_business_event!(
                event.category = event::category::NOTIFICATION,
                event.action = event::action::RELAY_DELIVERY_FAILED,
                event.entity_type = event::entity_type::QUEUE_RECORD,
                event.entity_id = entity_id,
                event.result = event::result::FAILURE,
                error = %reason,
                relay.status_code = status_code,
                "配送に失敗（レコードは保持）"
            );
        }
        DeliveryResult::ReceiveFailed { reason } => {
            log_business_event!(
                event.category = event::category::NOTIFICATION,
                event.action = event::action::RELAY_RECEIVE_FAILED,
                event.result = event::result::FAILURE,
                error = %reason,
                relay.status_code = status_code,
                "キューからの受信に失敗"
            );
        }
    }
}
