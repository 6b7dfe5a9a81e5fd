//! # テンプレートレンダラー
//!
//! 通知ペイロードから宛先種別ごとのメッセージを生成する。
//!
//! ## 設計方針
//!
//! - **本文は共通テンプレート**: SMS もメールも `Message: {messageContent}`
//! - **件名はメールのみ**: `emailSubject` が無ければ `Notification from SQS`
//! - **HTML はメールチャネル用の整形**: tera テンプレートを `include_str!` で埋め込み、
//!   自動エスケープした上で本文を差し込む

use notify_relay_domain::{
    RecipientKind,
    notification::{
        DEFAULT_EMAIL_SUBJECT,
        MESSAGE_PREFIX,
        NotificationError,
        NotificationPayload,
        RenderedMessage,
    },
};
use tera::{Context, Tera};

const EMAIL_HTML_TEMPLATE: &str = "email.html";

/// テンプレートレンダラー
pub struct TemplateRenderer {
    engine: Tera,
}

impl TemplateRenderer {
    /// 新しいレンダラーインスタンスを作成
    ///
    /// `include_str!` で埋め込んだテンプレートを tera に登録する。
    pub fn new() -> Result<Self, NotificationError> {
        let mut engine = Tera::default();

        engine
            .add_raw_template(
                EMAIL_HTML_TEMPLATE,
                include_str!("../../../templates/notifications/email.html"),
            )
            .map_err(|e| NotificationError::TemplateFailed(e.to_string()))?;

        Ok(Self { engine })
    }

    /// ペイロードを宛先種別に応じたメッセージにレンダリングする
    ///
    /// `messageContent` が無い（または空白のみの）場合は `DecodeFailed`。
    /// 同じ入力に対して常に同じ出力を返す。
    pub fn render(
        &self,
        payload: &NotificationPayload,
        kind: RecipientKind,
    ) -> Result<RenderedMessage, NotificationError> {
        let content = payload.message_content().ok_or_else(|| {
            NotificationError::DecodeFailed("messageContent is required".to_string())
        })?;

        let body = format!("{MESSAGE_PREFIX}{content}");

        let subject = match kind {
            RecipientKind::Phone => None,
            RecipientKind::Email => Some(
                payload
                    .email_subject()
                    .unwrap_or(DEFAULT_EMAIL_SUBJECT)
                    .to_string(),
            ),
        };

        Ok(RenderedMessage { body, subject })
    }

    /// レンダリング済みメッセージからメール用の HTML 本文を生成する
    pub fn email_html(&self, rendered: &RenderedMessage) -> Result<String, NotificationError> {
        let mut context = Context::new();
        context.insert(
            "subject",
            rendered.subject.as_deref().unwrap_or(DEFAULT_EMAIL_SUBJECT),
        );
        context.insert("body", &rendered.body);

        self.engine
            .render(EMAIL_HTML_TEMPLATE, &context)
            .map_err(|e| NotificationError::TemplateFailed(e.to_string()))
    }
}
