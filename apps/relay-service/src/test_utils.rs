//! テスト用のリレー組み立てヘルパー
//!
//! インメモリのキューと配信チャネルで [`QueueRelay`] を組み立てる。
//! モックはクローンを保持しているので、サイクル実行後に呼び出しを検証できる。

use std::{sync::Arc, time::Duration};

use notify_relay_infra::mock::{MockEmailChannel, MockQueueClient, MockSmsChannel};

use crate::usecase::{DeliveryRouter, QueueRelay, RelaySettings, TemplateRenderer};

/// テストで使う送信元アドレス
pub const FROM_ADDRESS: &str = "noreply@example.com";

#[derive(Clone, Default)]
pub struct RelayFixture {
    pub queue: MockQueueClient,
    pub sms:   MockSmsChannel,
    pub email: MockEmailChannel,
}

impl RelayFixture {
    pub fn new() -> Self {
        Self::default()
    }

    /// 既定の設定（待機 20 秒、タイムアウト 60 秒、既定の宛先なし）
    pub fn settings() -> RelaySettings {
        RelaySettings {
            queue_wait:        Duration::from_secs(20),
            cycle_timeout:     Duration::from_secs(60),
            default_recipient: None,
        }
    }

    /// 既定の設定でリレーを組み立てる
    pub fn relay(&self) -> QueueRelay {
        self.relay_with(Self::settings(), None)
    }

    /// 設定とトピックを指定してリレーを組み立てる
    pub fn relay_with(&self, settings: RelaySettings, topic_arn: Option<&str>) -> QueueRelay {
        let renderer = Arc::new(TemplateRenderer::new().expect("テンプレートは埋め込み済み"));
        let router = DeliveryRouter::new(
            Arc::new(self.sms.clone()),
            Arc::new(self.email.clone()),
            renderer.clone(),
            FROM_ADDRESS.to_string(),
            topic_arn.map(str::to_string),
        );
        QueueRelay::new(Arc::new(self.queue.clone()), router, renderer, settings)
    }
}
