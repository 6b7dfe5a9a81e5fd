//! # リレーユースケース
//!
//! キューに積まれた通知を 1 件ずつ SMS またはメールで配信する。
//!
//! ## モジュール構成
//!
//! - [`template_renderer`] - 宛先種別ごとの本文・件名の生成と、メール用 HTML の生成
//! - [`router`] - 宛先種別に応じた配信チャネルの選択
//! - [`service`] - 受信から削除までを統合するリレーサイクル

pub mod router;
pub mod service;
pub mod template_renderer;

pub use router::{Delivery, DeliveryRouter};
pub use service::{QueueRelay, RelaySettings};
pub use template_renderer::TemplateRenderer;
