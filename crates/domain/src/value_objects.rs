//! # 共通値オブジェクト
//!
//! 複数のレコードで共有される値オブジェクトを定義する。
//!
//! ## 設計方針
//!
//! - **Newtype パターン**: プリミティブ型をラップし、型安全性を確保
//! - **必須チェック**: 生成時（デシリアライズ時を含む）に空文字を排除する
//! - **不変性**: 一度作成したら変更不可
//!
//! ## 含まれる型
//!
//! | 型 | ラップ対象 | 用途 |
//! |---|-----------|------|
//! | [`RecordId`] | `String` | 取得済みリスト内で一意なレコード識別子 |
//! | [`Money`] | `i64`（セント） | 金額 |
//! | [`PersonName`] | `String` | 顧客名 |
//! | [`ContactEmail`] | `String` | 顧客・宛先メールアドレス（PII） |
//! | [`ClientLabel`] | `String` | 取引先の自由記述ラベル（外部キーではない） |
//! | [`InvoiceNumber`] | `String` | 請求書番号（`INV-001` 形式） |
//! | [`ProjectName`] | `String` | プロジェクト名 |
//! | [`EmailSubject`] | `String` | メール件名 |
//! | [`SurveyTitle`] | `String` | アンケートタイトル |

use std::{
    fmt,
    iter::Sum,
    ops::{Add, Sub},
};

use serde::{Deserialize, Serialize};

// =========================================================================
// RecordId（レコード識別子）
// =========================================================================

define_validated_string! {
    /// レコード識別子
    ///
    /// モックデータでは `"{page}-{index}"`、新規作成時は UUID v7 文字列。
    /// 形式は問わず、取得済みリスト内で一意であることだけを前提にする。
    pub struct RecordId {
        label: "ID",
        max_length: 64,
    }
}

impl RecordId {
    /// 新規作成用の ID を生成する（UUID v7）
    pub fn generate() -> Self {
        Self(uuid::Uuid::now_v7().to_string())
    }
}

// =========================================================================
// 文字列値オブジェクト
// =========================================================================

define_validated_string! {
    /// 顧客名
    pub struct PersonName {
        label: "名前",
        max_length: 100,
    }
}

define_validated_string! {
    /// メールアドレス（PII）
    ///
    /// 形式の検証は行わない（必須チェックのみ）。
    pub struct ContactEmail {
        label: "メールアドレス",
        max_length: 254,
        pii: true,
    }
}

define_validated_string! {
    /// 取引先ラベル
    ///
    /// 請求書の宛先やプロジェクトのクライアント。他レコードへの参照ではない。
    pub struct ClientLabel {
        label: "取引先",
        max_length: 100,
    }
}

define_validated_string! {
    /// 請求書番号
    pub struct InvoiceNumber {
        label: "請求書番号",
        max_length: 32,
    }
}

define_validated_string! {
    /// プロジェクト名
    pub struct ProjectName {
        label: "プロジェクト名",
        max_length: 100,
    }
}

define_validated_string! {
    /// メール件名
    pub struct EmailSubject {
        label: "件名",
        max_length: 200,
    }
}

define_validated_string! {
    /// アンケートタイトル
    pub struct SurveyTitle {
        label: "タイトル",
        max_length: 200,
    }
}

// =========================================================================
// Money（金額）
// =========================================================================

/// 金額（値オブジェクト）
///
/// 浮動小数点の丸め誤差を避けるため、セント単位の整数で保持する。
/// 表示は `$12,450.00` 形式。
///
/// # 使用例
///
/// ```rust
/// use crmdash_domain::value_objects::Money;
///
/// let total = Money::from_dollars(12_450);
/// assert_eq!(total.to_string(), "$12,450.00");
/// assert_eq!(Money::from_cents(1999).percentage(1000).cents(), 200);
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub fn from_dollars(dollars: i64) -> Self {
        Self(dollars.saturating_mul(100))
    }

    pub fn cents(&self) -> i64 {
        self.0
    }

    /// 数量倍する（明細の小計用）
    pub fn times(&self, quantity: u32) -> Self {
        Self(self.0.saturating_mul(i64::from(quantity)))
    }

    /// ベーシスポイント（1/100 %）で割合を計算する
    ///
    /// 端数はセント単位で四捨五入（0.5 は絶対値が大きい方へ）する。
    /// `1000` は 10%、`825` は 8.25%。
    pub fn percentage(&self, basis_points: u32) -> Self {
        let scaled = i128::from(self.0) * i128::from(basis_points);
        let half = if scaled >= 0 { 5_000 } else { -5_000 };
        let rounded = (scaled + half) / 10_000;
        Self(i64::try_from(rounded).unwrap_or(if rounded > 0 { i64::MAX } else { i64::MIN }))
    }

    /// 0 未満を 0 に切り上げる
    pub fn clamp_non_negative(self) -> Self {
        Self(self.0.max(0))
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Self) -> Self::Output {
        Money(self.0.saturating_add(rhs.0))
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Self) -> Self::Output {
        Money(self.0.saturating_sub(rhs.0))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let dollars = (abs / 100).to_string();
        let cents = abs % 100;

        // 3 桁ごとにカンマを挿入
        let mut grouped = String::with_capacity(dollars.len() + dollars.len() / 3);
        for (i, ch) in dollars.chars().enumerate() {
            if i > 0 && (dollars.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }

        write!(f, "{sign}${grouped}.{cents:02}")
    }
}
