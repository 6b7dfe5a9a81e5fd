//! # Relay Service ライブラリ
//!
//! リレーサイクルのユースケースとハンドラを公開する。
//! 統合テストから Router を組み立てられるよう、main.rs とは分けている。

pub mod app_builder;
pub mod config;
pub mod handler;
pub mod usecase;

// テストユーティリティ（内部実装、ドキュメントからは隠す）
#[doc(hidden)]
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
