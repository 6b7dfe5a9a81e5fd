//! # Relay Service 設定
//!
//! 環境変数から Relay Service の設定を読み込む。
//!
//! 読み込みは [`RelayConfig::from_lookup`] に集約しており、
//! テストではプロセスの環境変数に触れずに任意の値を与えられる。

use std::{env, time::Duration};

use strum::EnumString;
use thiserror::Error;

/// SQS のロングポーリング待機時間の上限（秒）
const MAX_QUEUE_WAIT_SECONDS: u64 = 20;

/// 設定読み込みエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// 必須の環境変数が未設定
    #[error("{0} が設定されていません")]
    Missing(&'static str),

    /// 値が不正
    #[error("{name} の値が不正です: {value:?}（{reason}）")]
    Invalid {
        name:   &'static str,
        value:  String,
        reason: String,
    },
}

/// Relay Service の設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    /// バインドアドレス
    pub host:              String,
    /// ポート番号
    pub port:              u16,
    /// AWS SDK 設定
    pub aws:               AwsConfig,
    /// キュー設定
    pub queue:             QueueConfig,
    /// SMS 配信設定
    pub sms:               SmsConfig,
    /// メール通知設定
    pub notification:      NotificationConfig,
    /// 宛先がどこからも得られない場合の既定の宛先
    pub default_recipient: Option<String>,
}

/// AWS SDK 設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwsConfig {
    /// リージョン（未設定なら SDK のデフォルト解決）
    pub region:       Option<String>,
    /// カスタムエンドポイント（LocalStack 使用時に設定）
    pub endpoint_url: Option<String>,
}

/// キュー設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueConfig {
    /// キュー URL
    pub url:           String,
    /// ロングポーリング待機時間
    pub wait:          Duration,
    /// 1 サイクル全体のタイムアウト
    pub cycle_timeout: Duration,
}

/// SMS 配信バックエンド
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum SmsBackend {
    Sns,
    Noop,
}

/// SMS 配信設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmsConfig {
    pub backend:   SmsBackend,
    /// 一次配送の後にブロードキャストするトピック
    pub topic_arn: Option<String>,
}

/// メール送信バックエンド
///
/// - `ses`: Amazon SES v2 経由で送信（本番）
/// - `smtp`: Mailpit（開発）/ SMTP サーバー経由で送信
/// - `noop`: 送信しない（ログ出力のみ）
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum EmailBackend {
    Ses,
    Smtp,
    Noop,
}

/// メール通知設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationConfig {
    pub backend:      EmailBackend,
    /// SMTP ホスト（backend=smtp の場合に使用）
    pub smtp_host:    String,
    /// SMTP ポート（backend=smtp の場合に使用）
    pub smtp_port:    u16,
    /// 送信元メールアドレス
    pub from_address: String,
}

impl RelayConfig {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// 任意の参照関数から設定を読み込む
    ///
    /// 空文字列は未設定として扱う。
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars(lookup);

        let wait_seconds: u64 = vars.parse_or("RELAY_QUEUE_WAIT_SECONDS", 20)?;
        if wait_seconds > MAX_QUEUE_WAIT_SECONDS {
            return Err(ConfigError::Invalid {
                name:   "RELAY_QUEUE_WAIT_SECONDS",
                value:  wait_seconds.to_string(),
                reason: format!("0〜{MAX_QUEUE_WAIT_SECONDS} の範囲で指定してください"),
            });
        }

        let cycle_timeout_seconds: u64 = vars.parse_or("RELAY_CYCLE_TIMEOUT_SECONDS", 60)?;
        if cycle_timeout_seconds <= wait_seconds {
            return Err(ConfigError::Invalid {
                name:   "RELAY_CYCLE_TIMEOUT_SECONDS",
                value:  cycle_timeout_seconds.to_string(),
                reason: "RELAY_QUEUE_WAIT_SECONDS より大きくしてください".to_string(),
            });
        }

        Ok(Self {
            host:              vars
                .get("RELAY_HOST")
                .unwrap_or_else(|| "0.0.0.0".to_string()),
            port:              vars.parse_required("RELAY_PORT")?,
            aws:               AwsConfig {
                region:       vars.get("AWS_REGION"),
                endpoint_url: vars.get("AWS_ENDPOINT_URL"),
            },
            queue:             QueueConfig {
                url:           vars.required("RELAY_QUEUE_URL")?,
                wait:          Duration::from_secs(wait_seconds),
                cycle_timeout: Duration::from_secs(cycle_timeout_seconds),
            },
            sms:               SmsConfig {
                backend:   vars.parse_or("RELAY_SMS_BACKEND", SmsBackend::Sns)?,
                topic_arn: vars.get("RELAY_SMS_TOPIC_ARN"),
            },
            notification:      NotificationConfig {
                backend:      vars.parse_or("NOTIFICATION_BACKEND", EmailBackend::Ses)?,
                smtp_host:    vars
                    .get("SMTP_HOST")
                    .unwrap_or_else(|| "localhost".to_string()),
                smtp_port:    vars.parse_or("SMTP_PORT", 1025)?,
                from_address: vars.required("NOTIFICATION_FROM_ADDRESS")?,
            },
            default_recipient: vars.get("RELAY_DEFAULT_RECIPIENT"),
        })
    }
}

struct Vars<F>(F);

impl<F> Vars<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, name: &str) -> Option<String> {
        (self.0)(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn required(&self, name: &'static str) -> Result<String, ConfigError> {
        self.get(name).ok_or(ConfigError::Missing(name))
    }

    fn parse_required<T>(&self, name: &'static str) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        let value = self.required(name)?;
        parse(name, value)
    }

    fn parse_or<T>(&self, name: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get(name) {
            Some(value) => parse(name, value),
            None => Ok(default),
        }
    }
}

fn parse<T>(name: &'static str, value: String) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|e: T::Err| ConfigError::Invalid {
        name,
        reason: e.to_string(),
        value,
    })
}
