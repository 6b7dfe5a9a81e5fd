//! # リレーサイクルハンドラ
//!
//! 1 回の呼び出しでリレーサイクルを 1 回実行する内部エンドポイント。
//! スケジューラやキューのトリガーから呼び出される想定。
//!
//! ## エンドポイント
//!
//! ```text
//! POST /internal/relay/cycles
//! ```
//!
//! ## リクエスト例
//!
//! ```json
//! { "recipient": "+234805939022" }
//! ```
//!
//! `recipient` は省略可能。省略時はペイロードの `recipient`、次に既定の宛先を使う。
//! ボディ自体も省略でき、空ボディは `{}` と同じ扱いになる（`Content-Type` も不要）。
//! JSON として読めないボディはサイクルを実行せず 400 を返す。
//!
//! ## レスポンス例
//!
//! HTTP ステータスは `statusCode` と同じ値になる。
//!
//! ```json
//! { "statusCode": 404, "body": "No messages found in SQS queue." }
//! ```

use std::sync::Arc;

use axum::{Json, body::Bytes, extract::State, http::StatusCode, response::IntoResponse};
use notify_relay_domain::RelayResponse;
use serde::Deserialize;
use serde_json::json;

use crate::usecase::QueueRelay;

/// リレーハンドラの State
pub struct RelayState {
    pub relay: Arc<QueueRelay>,
}

/// リレーサイクル起動リクエスト
#[derive(Debug, Default, Deserialize)]
pub struct RunCycleRequest {
    /// 宛先（ペイロードの `recipient` より優先）
    #[serde(default)]
    pub recipient: Option<String>,
}

/// POST /internal/relay/cycles
///
/// リレーサイクルを 1 回実行し、`{ statusCode, body }` を返す。
#[tracing::instrument(skip_all)]
pub async fn run_relay_cycle(
    State(state): State<Arc<RelayState>>,
    body: Bytes,
) -> impl IntoResponse {
    let req = match parse_request(&body) {
        Ok(req) => req,
        Err(e) => {
            tracing::warn!(error = %e, "リレーサイクルのリクエストボディを解釈できない");
            let response = RelayResponse {
                status_code: StatusCode::BAD_REQUEST.as_u16(),
                body:        json!({ "error": format!("invalid request body: {e}") }).to_string(),
            };
            return (StatusCode::BAD_REQUEST, Json(response));
        }
    };

    let result = state.relay.run_cycle(req.recipient.as_deref()).await;
    let response: RelayResponse = result.to_response();

    let status =
        StatusCode::from_u16(response.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(response))
}

/// 空（空白のみを含む）ボディは既定のリクエストとして扱う
fn parse_request(body: &[u8]) -> Result<RunCycleRequest, serde_json::Error> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(RunCycleRequest::default());
    }
    serde_json::from_slice(body)
}

#[cfg(test)]
mod tests {
    use axum::{
        Router,
        body::Body,
        http::{Method, Request},
        routing::post,
    };
    use pretty_assertions::assert_eq;
    use tower::ServiceExt;

    use super::*;
    use crate::test_utils::RelayFixture;

    fn create_test_app(fixture: &RelayFixture) -> Router {
        let state = Arc::new(RelayState {
            relay: Arc::new(fixture.relay()),
        });

        Router::new()
            .route("/internal/relay/cycles", post(run_relay_cycle))
            .with_state(state)
    }

    fn cycle_request(body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/internal/relay/cycles")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn response_body<T: serde::de::DeserializeOwned>(
        response: axum::http::Response<Body>,
    ) -> T {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_キューが空の場合は404とメッセージを返す() {
        // Given
        let fixture = RelayFixture::new();
        let sut = create_test_app(&fixture);

        // When
        let response = sut.oneshot(cycle_request(json!({}))).await.unwrap();

        // Then
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body: RelayResponse = response_body(response).await;
        assert_eq!(
            body,
            RelayResponse {
                status_code: 404,
                body:        "No messages found in SQS queue.".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_配送成功時は200を返す() {
        // Given
        let fixture = RelayFixture::new();
        fixture.queue.push_body(
            json!({ "recipient": "+234805939022", "messageContent": "Notification Message" })
                .to_string(),
        );
        let sut = create_test_app(&fixture);

        // When
        let response = sut.oneshot(cycle_request(json!({}))).await.unwrap();

        // Then
        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = response_body(response).await;
        assert_eq!(body["statusCode"], 200);
        assert_eq!(fixture.sms.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_リクエストの宛先がペイロードより優先される() {
        // Given
        let fixture = RelayFixture::new();
        fixture.queue.push_body(
            json!({ "recipient": "+234805939022", "messageContent": "Notification Message" })
                .to_string(),
        );
        let sut = create_test_app(&fixture);

        // When
        let response = sut
            .oneshot(cycle_request(json!({ "recipient": "olawale@gmail.com" })))
            .await
            .unwrap();

        // Then
        assert_eq!(response.status(), StatusCode::OK);
        assert!(fixture.sms.sent().is_empty());
        assert_eq!(fixture.email.sent()[0].to, "olawale@gmail.com");
    }

    #[tokio::test]
    async fn test_受信エラー時は500とエラー本文を返す() {
        // Given
        let fixture = RelayFixture::new();
        fixture.queue.fail_receive("Mocked error");
        let sut = create_test_app(&fixture);

        // When
        let response = sut.oneshot(cycle_request(json!({}))).await.unwrap();

        // Then
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: RelayResponse = response_body(response).await;
        assert_eq!(body.status_code, 500);
        assert_eq!(body.body, r#"{"error":"Mocked error"}"#);
    }

    fn raw_cycle_request(content_type: Option<&str>, body: Body) -> Request<Body> {
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri("/internal/relay/cycles");
        if let Some(content_type) = content_type {
            builder = builder.header("content-type", content_type);
        }
        builder.body(body).unwrap()
    }

    fn push_sms_payload(fixture: &RelayFixture) {
        fixture.queue.push_body(
            json!({ "recipient": "+234805939022", "messageContent": "Notification Message" })
                .to_string(),
        );
    }

    #[tokio::test]
    async fn test_ボディもcontent_typeも無い呼び出しでサイクルを実行する() {
        // Given
        let fixture = RelayFixture::new();
        push_sms_payload(&fixture);
        let sut = create_test_app(&fixture);

        // When
        let response = sut
            .oneshot(raw_cycle_request(None, Body::empty()))
            .await
            .unwrap();

        // Then
        assert_eq!(response.status(), StatusCode::OK);
        let body: RelayResponse = response_body(response).await;
        assert_eq!(
            body,
            RelayResponse {
                status_code: 200,
                body:        "Message processed and sent via SMS.".to_string(),
            }
        );
        assert_eq!(fixture.sms.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_content_typeだけで空ボディの呼び出しも既定のリクエストとして扱う() {
        // Given
        let fixture = RelayFixture::new();
        push_sms_payload(&fixture);
        let sut = create_test_app(&fixture);

        // When
        let response = sut
            .oneshot(raw_cycle_request(
                Some("application/json"),
                Body::from("  \n"),
            ))
            .await
            .unwrap();

        // Then
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(fixture.sms.sent()[0].destination, "+234805939022");
    }

    #[tokio::test]
    async fn test_jsonとして読めないボディは400でサイクルを実行しない() {
        // Given
        let fixture = RelayFixture::new();
        push_sms_payload(&fixture);
        let sut = create_test_app(&fixture);

        // When
        let response = sut
            .oneshot(raw_cycle_request(
                Some("application/json"),
                Body::from("not json"),
            ))
            .await
            .unwrap();

        // Then
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: RelayResponse = response_body(response).await;
        assert_eq!(body.status_code, 400);
        assert!(body.body.contains("invalid request body"), "body: {}", body.body);
        assert!(fixture.sms.sent().is_empty());
        assert_eq!(fixture.queue.pending(), 1);
    }
}
