//! リレーサイクルの統合テスト
//!
//! インメモリのキューと配信チャネルで `QueueRelay` を組み立て、
//! 受信から削除までの結果とレコードの扱いを検証する。

use std::{sync::Arc, time::Duration};

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
};
use notify_relay_domain::{
    DeliveryResult,
    RelayResponse,
    delivery::SecondaryOutcome,
    notification::{DeliveryChannel, ProviderAck, SmsMessage},
};
use notify_relay_service::{
    app_builder::build_router,
    test_utils::{FROM_ADDRESS, RelayFixture},
    usecase::RelaySettings,
};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::json;
use tower::ServiceExt;

const TOPIC_ARN: &str = "arn:aws:sns:us-east-1:000000000000:alerts";

fn sms_payload() -> String {
    json!({ "recipient": "+234805939022", "messageContent": "Notification Message" }).to_string()
}

fn email_payload() -> String {
    json!({
        "recipient": "olawale@gmail.com",
        "messageContent": "Notification Message",
        "emailSubject": "email subject",
    })
    .to_string()
}

// ===== 受信 =====

#[tokio::test]
async fn test_キューが空ならチャネルを呼ばずに404を返す() {
    // Arrange
    let fixture = RelayFixture::new();
    let sut = fixture.relay();

    // Act
    let result = sut.run_cycle(None).await;

    // Assert
    assert_eq!(result, DeliveryResult::NoWorkFound);
    assert_eq!(
        result.to_response(),
        RelayResponse {
            status_code: 404,
            body:        "No messages found in SQS queue.".to_string(),
        }
    );
    assert!(fixture.sms.sent().is_empty());
    assert!(fixture.email.sent().is_empty());
    assert!(fixture.queue.deleted().is_empty());
}

#[tokio::test]
async fn test_受信は1件ずつ設定された待機時間で行う() {
    // Arrange
    let fixture = RelayFixture::new();
    fixture.queue.push_body(sms_payload());
    fixture.queue.push_body(sms_payload());
    let sut = fixture.relay();

    // Act
    sut.run_cycle(None).await;

    // Assert
    assert_eq!(fixture.queue.receive_calls(), vec![Duration::from_secs(20)]);
    assert_eq!(fixture.sms.sent().len(), 1);
    assert_eq!(fixture.queue.pending(), 1);
}

#[tokio::test]
async fn test_受信エラーは500でエラー内容を返す() {
    // Arrange
    let fixture = RelayFixture::new();
    fixture.queue.fail_receive("Mocked error");
    let sut = fixture.relay();

    // Act
    let result = sut.run_cycle(None).await;

    // Assert
    assert_eq!(
        result.to_response(),
        RelayResponse {
            status_code: 500,
            body:        r#"{"error":"Mocked error"}"#.to_string(),
        }
    );
    assert!(fixture.sms.sent().is_empty());
}

// ===== 配送成功 =====

#[tokio::test]
async fn test_電話番号宛てはsmsで配送してレコードを削除する() {
    // Arrange
    let fixture = RelayFixture::new();
    let receipt = fixture.queue.push_body(sms_payload());
    let sut = fixture.relay();

    // Act
    let result = sut.run_cycle(None).await;

    // Assert
    assert_eq!(
        result,
        DeliveryResult::Delivered {
            channel:        DeliveryChannel::Sms,
            ack:            ProviderAck::new("sms-1"),
            record_deleted: true,
            secondary:      None,
        }
    );
    assert_eq!(result.status_code(), 200);
    assert_eq!(result.body(), "Message processed and sent via SMS.");
    assert_eq!(
        fixture.sms.sent(),
        vec![SmsMessage {
            destination: "+234805939022".to_string(),
            message:     "Message: Notification Message".to_string(),
        }]
    );
    assert!(fixture.email.sent().is_empty());
    assert_eq!(fixture.queue.deleted(), vec![receipt]);
    assert_eq!(fixture.queue.pending(), 0);
}

#[tokio::test]
async fn test_メール宛ては件名と送信元を付けて配送する() {
    // Arrange
    let fixture = RelayFixture::new();
    let receipt = fixture.queue.push_body(email_payload());
    let sut = fixture.relay();

    // Act
    let result = sut.run_cycle(None).await;

    // Assert
    assert_eq!(result.status_code(), 200);
    assert_eq!(result.body(), "Message processed and sent via email.");
    assert!(result.record_deleted());

    let sent = fixture.email.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].from, FROM_ADDRESS);
    assert_eq!(sent[0].to, "olawale@gmail.com");
    assert_eq!(sent[0].subject, "email subject");
    assert_eq!(sent[0].text_body, "Message: Notification Message");
    assert!(fixture.sms.sent().is_empty());
    assert_eq!(fixture.queue.deleted(), vec![receipt]);
}

#[tokio::test]
async fn test_件名が無いメールは既定の件名を使う() {
    // Arrange
    let fixture = RelayFixture::new();
    fixture.queue.push_body(
        json!({ "recipient": "olawale@gmail.com", "messageContent": "Notification Message" })
            .to_string(),
    );
    let sut = fixture.relay();

    // Act
    sut.run_cycle(None).await;

    // Assert
    assert_eq!(fixture.email.sent()[0].subject, "Notification from SQS");
}

// ===== 宛先解決 =====

#[tokio::test]
async fn test_呼び出し元の宛先がペイロードの宛先より優先される() {
    // Arrange
    let fixture = RelayFixture::new();
    fixture.queue.push_body(sms_payload());
    let sut = fixture.relay();

    // Act
    let result = sut.run_cycle(Some("olawale@gmail.com")).await;

    // Assert
    assert_eq!(result.status_code(), 200);
    assert!(fixture.sms.sent().is_empty());
    assert_eq!(fixture.email.sent()[0].to, "olawale@gmail.com");
}

#[tokio::test]
async fn test_空白だけの呼び出し元の宛先は無視される() {
    // Arrange
    let fixture = RelayFixture::new();
    fixture.queue.push_body(sms_payload());
    let sut = fixture.relay();

    // Act
    let result = sut.run_cycle(Some("   ")).await;

    // Assert
    assert_eq!(result.status_code(), 200);
    assert_eq!(fixture.sms.sent()[0].destination, "+234805939022");
}

#[tokio::test]
async fn test_宛先がどこにも無ければ404でレコードを残す() {
    // Arrange
    let fixture = RelayFixture::new();
    fixture
        .queue
        .push_body(json!({ "messageContent": "Notification Message" }).to_string());
    let sut = fixture.relay();

    // Act
    let result = sut.run_cycle(None).await;

    // Assert
    assert_eq!(result, DeliveryResult::MissingRecipient);
    assert_eq!(
        result.to_response(),
        RelayResponse {
            status_code: 404,
            body:        "No recipient identifier provided.".to_string(),
        }
    );
    assert!(fixture.queue.deleted().is_empty());
    assert_eq!(fixture.queue.pending(), 1);
}

#[tokio::test]
async fn test_宛先が無ければ既定の宛先に配送する() {
    // Arrange
    let fixture = RelayFixture::new();
    fixture
        .queue
        .push_body(json!({ "messageContent": "Notification Message" }).to_string());
    let settings = RelaySettings {
        default_recipient: Some("+2348012345678".to_string()),
        ..RelayFixture::settings()
    };
    let sut = fixture.relay_with(settings, None);

    // Act
    let result = sut.run_cycle(None).await;

    // Assert
    assert_eq!(result.status_code(), 200);
    assert_eq!(fixture.sms.sent()[0].destination, "+2348012345678");
}

#[rstest]
#[case("09085675575")]
#[case("olawale")]
#[case("olawale@gmail")]
#[tokio::test]
async fn test_不正な宛先は400でどのチャネルも呼ばない(#[case] recipient: &str) {
    // Arrange
    let fixture = RelayFixture::new();
    fixture.queue.push_body(
        json!({ "recipient": recipient, "messageContent": "Notification Message" }).to_string(),
    );
    let sut = fixture.relay();

    // Act
    let result = sut.run_cycle(None).await;

    // Assert
    assert_eq!(
        result.to_response(),
        RelayResponse {
            status_code: 400,
            body:        "Invalid email or phone number.".to_string(),
        }
    );
    assert!(fixture.sms.sent().is_empty());
    assert!(fixture.email.sent().is_empty());
    assert!(fixture.queue.deleted().is_empty());
}

// ===== デコード =====

#[rstest]
#[case("not json")]
#[case("[1, 2, 3]")]
#[case(r#"{"recipient": "+234805939022"}"#)]
#[case(r#"{"recipient": "+234805939022", "messageContent": "   "}"#)]
#[tokio::test]
async fn test_不正なペイロードは500でレコードを残す(#[case] raw_body: &str) {
    // Arrange
    let fixture = RelayFixture::new();
    fixture.queue.push_body(raw_body);
    let sut = fixture.relay();

    // Act
    let result = sut.run_cycle(None).await;

    // Assert
    assert!(matches!(result, DeliveryResult::DecodeFailed { .. }));
    assert_eq!(result.status_code(), 500);
    let body: serde_json::Value = serde_json::from_str(&result.body()).unwrap();
    assert!(body["error"].is_string());
    assert!(fixture.sms.sent().is_empty());
    assert_eq!(fixture.queue.pending(), 1);
}

// ===== 配送失敗・削除失敗 =====

#[tokio::test]
async fn test_配送に失敗したレコードは削除しない() {
    // Arrange
    let fixture = RelayFixture::new();
    fixture.queue.push_body(sms_payload());
    fixture.sms.fail_send("Throttling");
    let sut = fixture.relay();

    // Act
    let result = sut.run_cycle(None).await;

    // Assert
    assert_eq!(
        result,
        DeliveryResult::DeliveryFailed {
            reason: "Throttling".to_string(),
        }
    );
    assert_eq!(result.body(), r#"{"error":"Throttling"}"#);
    assert!(fixture.queue.deleted().is_empty());
    assert_eq!(fixture.queue.pending(), 1);
}

#[tokio::test]
async fn test_メール送信の失敗も500でレコードを残す() {
    // Arrange
    let fixture = RelayFixture::new();
    fixture.queue.push_body(email_payload());
    fixture.email.fail_send("MessageRejected");
    let sut = fixture.relay();

    // Act
    let result = sut.run_cycle(None).await;

    // Assert
    assert_eq!(result.status_code(), 500);
    assert_eq!(fixture.queue.pending(), 1);
}

#[tokio::test]
async fn test_削除に失敗しても配送成功として返す() {
    // Arrange
    let fixture = RelayFixture::new();
    fixture.queue.push_body(sms_payload());
    fixture.queue.fail_delete("ReceiptHandleIsInvalid");
    let sut = fixture.relay();

    // Act
    let result = sut.run_cycle(None).await;

    // Assert
    assert_eq!(result.status_code(), 200);
    assert!(!result.record_deleted());
    assert_eq!(fixture.sms.sent().len(), 1);
    assert_eq!(fixture.queue.pending(), 1);
}

#[tokio::test]
async fn test_サイクルがタイムアウトしたらレコードを残す() {
    // Arrange
    let fixture = RelayFixture::new();
    fixture.queue.push_body(sms_payload());
    fixture.sms.delay(Duration::from_secs(10));
    let settings = RelaySettings {
        queue_wait: Duration::from_secs(0),
        cycle_timeout: Duration::from_millis(100),
        ..RelayFixture::settings()
    };
    let sut = fixture.relay_with(settings, None);

    // Act
    let result = sut.run_cycle(None).await;

    // Assert
    assert_eq!(
        result,
        DeliveryResult::DeliveryFailed {
            reason: "relay cycle timed out after 100ms".to_string(),
        }
    );
    assert!(fixture.sms.sent().is_empty());
    assert!(fixture.queue.deleted().is_empty());
    assert_eq!(fixture.queue.pending(), 1);
}

#[tokio::test]
async fn test_削除中に期限を過ぎても配送成功のままレコードを残す() {
    // Arrange
    let fixture = RelayFixture::new();
    fixture.queue.push_body(sms_payload());
    fixture.queue.delay_delete(Duration::from_secs(10));
    let settings = RelaySettings {
        queue_wait: Duration::from_secs(0),
        cycle_timeout: Duration::from_millis(200),
        ..RelayFixture::settings()
    };
    let sut = fixture.relay_with(settings, None);

    // Act
    let result = sut.run_cycle(None).await;

    // Assert
    assert_eq!(
        result,
        DeliveryResult::Delivered {
            channel:        DeliveryChannel::Sms,
            ack:            ProviderAck::new("sms-1"),
            record_deleted: false,
            secondary:      None,
        }
    );
    assert_eq!(result.status_code(), 200);
    assert!(fixture.queue.deleted().is_empty());
    assert_eq!(fixture.queue.pending(), 1);
}

#[tokio::test]
async fn test_トピック公開中に期限を過ぎたら二次配信の失敗として返す() {
    // Arrange
    let fixture = RelayFixture::new();
    fixture.queue.push_body(sms_payload());
    fixture.sms.delay_topic(Duration::from_secs(10));
    let settings = RelaySettings {
        queue_wait: Duration::from_secs(0),
        cycle_timeout: Duration::from_millis(200),
        ..RelayFixture::settings()
    };
    let sut = fixture.relay_with(settings, Some(TOPIC_ARN));

    // Act
    let result = sut.run_cycle(None).await;

    // Assert
    assert_eq!(result.status_code(), 200);
    assert!(matches!(
        result,
        DeliveryResult::Delivered {
            channel: DeliveryChannel::Sms,
            secondary: Some(SecondaryOutcome::Failed(ref reason)),
            ..
        } if reason == "cycle deadline reached before topic publish completed"
    ));
    assert_eq!(fixture.sms.sent().len(), 1);
    assert!(fixture.sms.published().is_empty());
}

// ===== トピック =====

#[tokio::test]
async fn test_トピック設定時はsms配送後にトピックへ公開する() {
    // Arrange
    let fixture = RelayFixture::new();
    fixture.queue.push_body(sms_payload());
    let sut = fixture.relay_with(RelayFixture::settings(), Some(TOPIC_ARN));

    // Act
    let result = sut.run_cycle(None).await;

    // Assert
    assert_eq!(
        result,
        DeliveryResult::Delivered {
            channel:        DeliveryChannel::Sms,
            ack:            ProviderAck::new("sms-1"),
            record_deleted: true,
            secondary:      Some(SecondaryOutcome::Published(ProviderAck::new("topic-1"))),
        }
    );
    assert_eq!(
        fixture.sms.published(),
        vec![(
            TOPIC_ARN.to_string(),
            "Message: Notification Message".to_string()
        )]
    );
}

#[tokio::test]
async fn test_トピック公開に失敗しても配送成功のまま削除する() {
    // Arrange
    let fixture = RelayFixture::new();
    fixture.queue.push_body(sms_payload());
    fixture.sms.fail_topic("AuthorizationError");
    let sut = fixture.relay_with(RelayFixture::settings(), Some(TOPIC_ARN));

    // Act
    let result = sut.run_cycle(None).await;

    // Assert
    assert_eq!(result.status_code(), 200);
    assert!(result.record_deleted());
    assert!(matches!(
        result,
        DeliveryResult::Delivered {
            secondary: Some(SecondaryOutcome::Failed(_)),
            ..
        }
    ));
}

#[tokio::test]
async fn test_メール宛てはトピックに公開しない() {
    // Arrange
    let fixture = RelayFixture::new();
    fixture.queue.push_body(email_payload());
    let sut = fixture.relay_with(RelayFixture::settings(), Some(TOPIC_ARN));

    // Act
    sut.run_cycle(None).await;

    // Assert
    assert!(fixture.sms.published().is_empty());
}

// ===== ルーター経由 =====

#[tokio::test]
async fn test_ルーター経由でサイクルを実行できる() {
    // Arrange
    let fixture = RelayFixture::new();
    fixture.queue.push_body(sms_payload());
    let app = build_router(Arc::new(fixture.relay()), Arc::new(fixture.queue.clone()));
    let request = Request::builder()
        .method(Method::POST)
        .uri("/internal/relay/cycles")
        .header("content-type", "application/json")
        .body(Body::from("{}"))
        .unwrap();

    // Act
    let response = app.oneshot(request).await.unwrap();

    // Assert
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: RelayResponse = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(
        body,
        RelayResponse {
            status_code: 200,
            body:        "Message processed and sent via SMS.".to_string(),
        }
    );
}

#[tokio::test]
async fn test_ルーター経由でreadinessを確認できる() {
    // Arrange
    let fixture = RelayFixture::new();
    let app = build_router(Arc::new(fixture.relay()), Arc::new(fixture.queue.clone()));
    let request = Request::builder()
        .uri("/health/ready")
        .body(Body::empty())
        .unwrap();

    // Act
    let response = app.oneshot(request).await.unwrap();

    // Assert
    assert_eq!(response.status(), StatusCode::OK);
}
