//! # ユースケース層
//!
//! ハンドラから呼び出されるアプリケーションロジックを配置する。
//!
//! - [`relay`] - キューから 1 件取り出して配信するリレーサイクル

pub mod relay;

pub use relay::{DeliveryRouter, QueueRelay, RelaySettings, TemplateRenderer};
