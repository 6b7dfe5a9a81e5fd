//! # 宛先分類
//!
//! 宛先識別子の文字列がメールアドレスか電話番号か、どちらでもないかを判定する。
//!
//! ## 判定パターン
//!
//! | 分類 | パターン |
//! |------|---------|
//! | [`Classification::Email`] | `local@domain.ext`（local: 英数字と `. _ % + -`、domain: 英数字と `. -`、ext: 2 文字以上の英字） |
//! | [`Classification::Phone`] | `+` + 国番号 1〜4 桁 + 任意の半角スペース 1 つ + 1 桁以上の数字 |
//! | [`Classification::Invalid`] | 上記以外（空文字列を含む） |
//!
//! 電話番号の先頭 `+` は必須。`09085675575` のような国番号なしの番号は `Invalid` になる。

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$")
        .expect("メールアドレスの正規表現は静的に正しい")
});

static PHONE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\+[0-9]{1,4} ?[0-9]+$").expect("電話番号の正規表現は静的に正しい")
});

/// 配送可能な宛先の種別
///
/// 分類に成功した宛先だけがこの型を持つ。
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, IntoStaticStr, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RecipientKind {
    Email,
    Phone,
}

/// 宛先分類の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Email,
    Phone,
    Invalid,
}

impl Classification {
    /// 配送可能な種別に変換する（`Invalid` は `None`）
    pub fn kind(self) -> Option<RecipientKind> {
        match self {
            Self::Email => Some(RecipientKind::Email),
            Self::Phone => Some(RecipientKind::Phone),
            Self::Invalid => None,
        }
    }
}

/// 宛先識別子を分類する
///
/// 全域関数であり、どの入力に対しても 3 つのいずれかを返す。
pub fn classify(identifier: &str) -> Classification {
    if identifier.is_empty() {
        return Classification::Invalid;
    }

    if EMAIL_PATTERN.is_match(identifier) {
        Classification::Email
    } else if PHONE_PATTERN.is_match(identifier) {
        Classification::Phone
    } else {
        Classification::Invalid
    }
}
