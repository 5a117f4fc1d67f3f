//! 計量單位模型

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// 計量單位
///
/// `factor` 為一單位相當於多少基準單位；`rounding` 為數量的捨入精度，
/// 同時是「數量不足以計為一個包裝」的忽略門檻。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Uom {
    /// 單位ID
    pub id: String,

    /// 換算係數（相對於基準單位）
    pub factor: Decimal,

    /// 捨入精度
    pub rounding: Decimal,
}

impl Uom {
    /// 創建新的計量單位
    pub fn new(id: impl Into<String>, factor: Decimal, rounding: Decimal) -> Self {
        Self {
            id: id.into(),
            factor,
            rounding,
        }
    }

    /// 創建係數 1、精度 0.01 的計數單位
    pub fn unit(id: impl Into<String>) -> Self {
        Self::new(id, Decimal::ONE, Decimal::new(1, 2))
    }

    /// 單位換算（純函數）
    ///
    /// 將以 `from` 表示的 `qty` 換算為以 `to` 表示的數量，
    /// `round` 為 true 時按 `to` 的捨入精度捨入。
    pub fn compute_qty(from: &Uom, qty: Decimal, to: &Uom, round: bool) -> Decimal {
        let converted = qty * from.factor / to.factor;
        if round {
            to.round(converted)
        } else {
            converted
        }
    }

    /// 按本單位的捨入精度捨入（四捨五入至精度的整數倍）
    pub fn round(&self, qty: Decimal) -> Decimal {
        if self.rounding.is_zero() {
            return qty;
        }
        (qty / self.rounding)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            * self.rounding
    }
}
