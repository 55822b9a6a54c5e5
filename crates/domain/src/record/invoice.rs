//! # 請求書
//!
//! 請求書レコードと、請求書フォームの合計金額計算を定義する。
//!
//! ## 合計金額の計算
//!
//! ```text
//! 小計   = Σ 数量 × 単価
//! 税額   = 小計 × 税率
//! 割引額 = 小計 × 割引率（Percentage） または 固定額（Fixed）
//! 合計   = 小計 + 税額 − 割引額 + 送料（送料ありの場合のみ）
//! ```
//!
//! 割引額が大きすぎる場合、合計は 0 で下げ止まる。

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Record, RecordKind};
use crate::value_objects::{ClientLabel, InvoiceNumber, Money, RecordId};

/// 請求書ステータス
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum InvoiceStatus {
    Draft,
    Sent,
    Paid,
}

/// 請求書
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub id:       RecordId,
    pub number:   InvoiceNumber,
    pub customer: ClientLabel,
    pub amount:   Money,
    pub status:   InvoiceStatus,
    pub date:     NaiveDate,
}

impl Record for Invoice {
    const KIND: RecordKind = RecordKind::Invoice;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![self.number.as_str(), self.customer.as_str()]
    }

    fn display_label(&self) -> String {
        self.number.to_string()
    }
}

/// 請求書の明細行
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub description: String,
    pub quantity:    u32,
    pub unit_price:  Money,
}

impl LineItem {
    pub fn line_total(&self) -> Money {
        self.unit_price.times(self.quantity)
    }
}

/// 割引
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Discount {
    /// 小計に対する割合（ベーシスポイント、`1000` = 10%）
    Percentage(u32),
    /// 固定額
    Fixed(Money),
}

impl Default for Discount {
    fn default() -> Self {
        Self::Percentage(0)
    }
}

/// 請求書フォームの合計金額
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InvoiceTotals {
    pub subtotal: Money,
    pub tax:      Money,
    pub discount: Money,
    pub shipping: Money,
    pub total:    Money,
}

impl InvoiceTotals {
    /// 明細・税率・割引・送料から合計金額を計算する
    ///
    /// # 引数
    ///
    /// - `tax_rate_bps`: 税率（ベーシスポイント、`825` = 8.25%）
    /// - `shipping`: 送料（`None` は送料なし）
    ///
    /// 合計は 0 未満にならない（負になる場合は 0 に切り上げる）。
    /// `discount` には計算どおりの割引額が残る。
    pub fn calculate(
        items: &[LineItem],
        tax_rate_bps: u32,
        discount: Discount,
        shipping: Option<Money>,
    ) -> Self {
        let subtotal: Money = items.iter().map(LineItem::line_total).sum();
        let tax = subtotal.percentage(tax_rate_bps);
        let discount = match discount {
            Discount::Percentage(bps) => subtotal.percentage(bps),
            Discount::Fixed(amount) => amount,
        };
        let shipping = shipping.unwrap_or(Money::ZERO);
        let total = (subtotal + tax - discount + shipping).clamp_non_negative();

        Self {
            subtotal,
            tax,
            discount,
            shipping,
            total,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn items() -> Vec<LineItem> {
        vec![
            LineItem {
                description: "デザイン".to_string(),
                quantity:    2,
                unit_price:  Money::from_dollars(500),
            },
            LineItem {
                description: "ホスティング".to_string(),
                quantity:    3,
                unit_price:  Money::from_cents(1_999),
            },
        ]
    }

    #[rstest]
    fn test_割引と送料なしの合計(items: Vec<LineItem>) {
        let totals = InvoiceTotals::calculate(&items, 0, Discount::default(), None);

        assert_eq!(totals.subtotal, Money::from_cents(105_997));
        assert_eq!(totals.total, Money::from_cents(105_997));
    }

    #[rstest]
    fn test_税率と割合割引と送料を反映する(items: Vec<LineItem>) {
        let totals = InvoiceTotals::calculate(
            &items,
            1_000,
            Discount::Percentage(500),
            Some(Money::from_dollars(15)),
        );

        assert_eq!(
            totals,
            InvoiceTotals {
                subtotal: Money::from_cents(105_997),
                tax:      Money::from_cents(10_600),
                discount: Money::from_cents(5_300),
                shipping: Money::from_cents(1_500),
                total:    Money::from_cents(112_797),
            }
        );
    }

    #[rstest]
    fn test_固定額割引(items: Vec<LineItem>) {
        let totals =
            InvoiceTotals::calculate(&items, 0, Discount::Fixed(Money::from_dollars(100)), None);

        assert_eq!(totals.total, Money::from_cents(95_997));
    }

    #[rstest]
    fn test_割引が合計を超えると0で下げ止まる(items: Vec<LineItem>) {
        let totals = InvoiceTotals::calculate(
            &items,
            0,
            Discount::Fixed(Money::from_dollars(5_000)),
            Some(Money::from_dollars(15)),
        );

        assert_eq!(totals.total, Money::ZERO);
        assert_eq!(totals.discount, Money::from_dollars(5_000));
        assert_eq!(totals.shipping, Money::from_dollars(15));
    }

    #[test]
    fn test_明細なしは0() {
        let totals = InvoiceTotals::calculate(&[], 825, Discount::Percentage(1_000), None);
        assert_eq!(totals.total, Money::ZERO);
    }

    #[test]
    fn test_割引のjson形式() {
        let json = serde_json::to_value(Discount::Percentage(1_000)).unwrap();
        assert_eq!(json, serde_json::json!({ "type": "percentage", "value": 1_000 }));
    }
}
