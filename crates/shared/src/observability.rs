//! # トレーシング初期化
//!
//! Relay Service の subscriber を組み立てる。
//!
//! | 環境変数 | 既定値 | 用途 |
//! |---------|-------|------|
//! | `LOG_FORMAT` | `pretty` | `json`（本番、1 行 1 イベント）/ `pretty`（開発） |
//! | `RUST_LOG` | [`DEFAULT_ENV_FILTER`] | `EnvFilter` の指定 |
//!
//! JSON 出力ではイベントのフィールドをトップレベルに展開し、現在のスパン
//! （`relay_cycle{cycle_id=..}`）を `span` に含める。

use std::env;

/// `RUST_LOG` 未設定時のフィルタ
pub const DEFAULT_ENV_FILTER: &str = "info,notify_relay=debug";

/// ログ出力形式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

impl LogFormat {
    /// `json` / `pretty` を受け付ける（大文字小文字は区別する）
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "json" => Some(Self::Json),
            "pretty" => Some(Self::Pretty),
            _ => None,
        }
    }
}

/// トレーシング初期化設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingConfig {
    pub service_name: String,
    pub log_format:   LogFormat,
}

impl TracingConfig {
    pub fn new(service_name: impl Into<String>, log_format: LogFormat) -> Self {
        Self {
            service_name: service_name.into(),
            log_format,
        }
    }

    /// `LOG_FORMAT` から設定を読み取る
    pub fn from_env(service_name: impl Into<String>) -> Self {
        Self::from_lookup(service_name, |name| env::var(name).ok())
    }

    /// 任意の参照関数から設定を読み取る
    ///
    /// 不正な `LOG_FORMAT` は起動を止めず `pretty` にする。
    /// subscriber 初期化前なので警告は stderr に直接書く。
    pub fn from_lookup<F>(service_name: impl Into<String>, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let log_format = match lookup("LOG_FORMAT") {
            None => LogFormat::default(),
            Some(value) => LogFormat::parse(value.trim()).unwrap_or_else(|| {
                eprintln!("WARNING: unknown LOG_FORMAT={value:?}, falling back to pretty");
                LogFormat::Pretty
            }),
        };
        Self::new(service_name, log_format)
    }
}

/// グローバル subscriber を登録する
///
/// `tracing_error::ErrorLayer` を含めるので、`InfraError` の `SpanTrace`
/// には受信・配送中のスパンが記録される。
/// サービス名は呼び出し元の `info_span!("app", service = ..)` で付与する。
///
/// 既に subscriber が登録済みの場合はエラーを返す。
#[cfg(feature = "observability")]
pub fn init_tracing(
    config: TracingConfig,
) -> Result<(), tracing_subscriber::util::TryInitError> {
    use tracing_subscriber::{
        EnvFilter,
        Layer as _,
        fmt,
        layer::SubscriberExt,
        util::SubscriberInitExt,
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_ENV_FILTER));

    let output = match config.log_format {
        LogFormat::Json => fmt::layer()
            .json()
            .flatten_event(true)
            .with_current_span(true)
            .with_span_list(false)
            .boxed(),
        LogFormat::Pretty => fmt::layer().with_target(false).boxed(),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(output)
        .with(tracing_error::ErrorLayer::default())
        .try_init()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_parseはjsonとprettyだけを受け付ける() {
        assert_eq!(LogFormat::parse("json"), Some(LogFormat::Json));
        assert_eq!(LogFormat::parse("pretty"), Some(LogFormat::Pretty));
        assert_eq!(LogFormat::parse("JSON"), None);
        assert_eq!(LogFormat::parse(""), None);
    }

    #[test]
    fn test_log_format未設定ならprettyになる() {
        let config = TracingConfig::from_lookup("relay-service", |_| None);

        assert_eq!(config, TracingConfig::new("relay-service", LogFormat::Pretty));
    }

    #[test]
    fn test_log_formatがjsonならjsonになる() {
        let config = TracingConfig::from_lookup("relay-service", |name| {
            (name == "LOG_FORMAT").then(|| " json ".to_string())
        });

        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_不正なlog_formatはprettyにフォールバックする() {
        let config =
            TracingConfig::from_lookup("relay-service", |_| Some("structured".to_string()));

        assert_eq!(config.log_format, LogFormat::Pretty);
    }
}
