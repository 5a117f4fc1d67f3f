//! 包裝模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 包裝（產品的固定容量容器）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Package {
    /// 包裝ID
    pub id: String,

    /// 產品ID
    pub product: String,

    /// 每包裝數量（以 `uom` 表示）
    pub qty: Decimal,

    /// 包裝數量的計量單位
    pub uom: String,
}

impl Package {
    /// 創建新的包裝
    pub fn new(
        id: impl Into<String>,
        product: impl Into<String>,
        qty: Decimal,
        uom: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            product: product.into(),
            qty,
            uom: uom.into(),
        }
    }
}
