//! # Relay Service サーバー
//!
//! キューに積まれた通知を 1 件ずつ取り出し、SMS またはメールで配信する内部サービス。
//!
//! ## 役割
//!
//! - **リレーサイクル**: `POST /internal/relay/cycles` 1 回につき最大 1 件を配信
//! - **配送確認後の削除**: 配送に成功したレコードだけをキューから削除
//! - **ヘルスチェック**: `/health`（Liveness）、`/health/ready`（キューへの到達性）
//!
//! サイクルの起動はスケジューラやキューのトリガー側の責務で、
//! このサービス自身はポーリングループを持たない。
//!
//! ## 環境変数
//!
//! | 変数名 | 必須 | 説明 |
//! |--------|------|------|
//! | `RELAY_HOST` | No | バインドアドレス（デフォルト: `0.0.0.0`） |
//! | `RELAY_PORT` | **Yes** | ポート番号 |
//! | `RELAY_QUEUE_URL` | **Yes** | 受信元キューの URL |
//! | `RELAY_QUEUE_WAIT_SECONDS` | No | ロングポーリング待機秒数（0〜20、デフォルト: 20） |
//! | `RELAY_CYCLE_TIMEOUT_SECONDS` | No | サイクル全体のタイムアウト秒数（デフォルト: 60） |
//! | `RELAY_DEFAULT_RECIPIENT` | No | 宛先が得られない場合の既定の宛先 |
//! | `RELAY_SMS_BACKEND` | No | `sns` / `noop`（デフォルト: `sns`） |
//! | `RELAY_SMS_TOPIC_ARN` | No | SMS 配送後にブロードキャストするトピック |
//! | `NOTIFICATION_BACKEND` | No | `ses` / `smtp` / `noop`（デフォルト: `ses`） |
//! | `NOTIFICATION_FROM_ADDRESS` | **Yes** | メールの送信元アドレス |
//! | `SMTP_HOST` / `SMTP_PORT` | No | backend=smtp の接続先（デフォルト: `localhost:1025`） |
//! | `AWS_REGION` / `AWS_ENDPOINT_URL` | No | SDK のリージョンとエンドポイント（LocalStack 用） |
//! | `LOG_FORMAT` | No | `json` / `pretty`（デフォルト: `pretty`） |
//!
//! ## 起動方法
//!
//! ```bash
//! # 開発環境（LocalStack + Mailpit）
//! NOTIFICATION_BACKEND=smtp cargo run -p notify-relay-service
//!
//! # 本番環境
//! RELAY_PORT=3100 RELAY_QUEUE_URL=https://sqs... cargo run -p notify-relay-service --release
//! ```

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context as _;
use notify_relay_infra::{
    EmailChannel,
    QueueClient,
    SmsChannel,
    aws,
    notification::{
        NoopEmailChannel,
        NoopSmsChannel,
        SesEmailChannel,
        SmtpEmailChannel,
        SnsSmsChannel,
    },
    queue::SqsQueueClient,
};
use notify_relay_service::{
    app_builder::build_router,
    config::{EmailBackend, RelayConfig, SmsBackend},
    usecase::{DeliveryRouter, QueueRelay, RelaySettings, TemplateRenderer},
};
use notify_relay_shared::observability::{TracingConfig, init_tracing};
use tokio::net::TcpListener;

/// Relay Service サーバーのエントリーポイント
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env ファイルを読み込む（存在する場合）
    dotenvy::dotenv().ok();

    // トレーシング初期化
    let tracing_config = TracingConfig::from_env("relay-service");
    init_tracing(tracing_config).context("トレーシングの初期化に失敗しました")?;
    let _tracing_guard = tracing::info_span!("app", service = "relay-service").entered();

    // 設定読み込み
    let config = RelayConfig::from_env().context("設定の読み込みに失敗しました")?;

    tracing::info!(
        "Relay Service サーバーを起動します: {}:{}",
        config.host,
        config.port
    );

    let sdk_config = aws::load_config(
        config.aws.region.as_deref(),
        config.aws.endpoint_url.as_deref(),
    )
    .await;

    // キュー
    let queue: Arc<dyn QueueClient> = Arc::new(SqsQueueClient::new(
        aws_sdk_sqs::Client::new(&sdk_config),
        config.queue.url.clone(),
    ));

    // 配信チャネル
    let sms: Arc<dyn SmsChannel> = match config.sms.backend {
        SmsBackend::Sns => Arc::new(SnsSmsChannel::new(aws_sdk_sns::Client::new(&sdk_config))),
        SmsBackend::Noop => Arc::new(NoopSmsChannel),
    };
    let email: Arc<dyn EmailChannel> = match config.notification.backend {
        EmailBackend::Ses => Arc::new(SesEmailChannel::new(aws_sdk_sesv2::Client::new(
            &sdk_config,
        ))),
        EmailBackend::Smtp => Arc::new(SmtpEmailChannel::new(
            &config.notification.smtp_host,
            config.notification.smtp_port,
        )),
        EmailBackend::Noop => Arc::new(NoopEmailChannel),
    };
    tracing::info!(
        sms_backend = %config.sms.backend,
        email_backend = %config.notification.backend,
        topic_arn = config.sms.topic_arn.as_deref().unwrap_or_default(),
        "配信チャネルを初期化しました"
    );

    // リレー
    let renderer =
        Arc::new(TemplateRenderer::new().context("テンプレートの読み込みに失敗しました")?);
    let router = DeliveryRouter::new(
        sms,
        email,
        renderer.clone(),
        config.notification.from_address.clone(),
        config.sms.topic_arn.clone(),
    );
    let relay = Arc::new(QueueRelay::new(
        queue.clone(),
        router,
        renderer,
        RelaySettings {
            queue_wait:        config.queue.wait,
            cycle_timeout:     config.queue.cycle_timeout,
            default_recipient: config.default_recipient.clone(),
        },
    ));

    let app = build_router(relay, queue);

    // サーバー起動
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("アドレスのパースに失敗しました")?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Relay Service サーバーが起動しました: {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
