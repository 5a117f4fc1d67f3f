//! 批號模型
//!
//! 批號可帶有包裝數量乘數或除數，用於在「標準化包裝數」（以產品預設
//! 包裝計）與批號自身的包裝數之間換算。乘數與除數互斥：同為 1 表示
//! 不換算；設定其中一個為非 1 值時另一個必須為空。

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{Result, StockError};

/// 整數向上取整除法
fn ceil_div(n: i64, d: i64) -> i64 {
    (n + d - 1).div_euclid(d)
}

/// 批號
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lot {
    /// 批號ID
    pub id: String,

    /// 產品ID
    pub product: String,

    /// 本批號使用的包裝
    pub package: Option<String>,

    /// 每包裝數量（以 `product_uom` 表示）
    pub package_qty: Decimal,

    /// 產品計量單位
    pub product_uom: String,

    /// 包裝數量乘數：供應一個預設包裝需要幾個本批號的包裝
    pub number_of_packages_multiplier: Option<i64>,

    /// 包裝數量除數：供應一個本批號的包裝需要幾個預設包裝
    pub number_of_packages_divider: Option<i64>,
}

impl Lot {
    /// 創建新的批號（不帶換算比率）
    pub fn new(
        id: impl Into<String>,
        product: impl Into<String>,
        package_qty: Decimal,
        product_uom: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            product: product.into(),
            package: None,
            package_qty,
            product_uom: product_uom.into(),
            number_of_packages_multiplier: None,
            number_of_packages_divider: None,
        }
    }

    /// 建構器模式：設置包裝
    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package = Some(package.into());
        self
    }

    /// 建構器模式：設置乘數（套用寫入時的正規化規則）
    pub fn with_multiplier(mut self, multiplier: i64) -> Self {
        self.set_multiplier(Some(multiplier));
        self
    }

    /// 建構器模式：設置除數（套用寫入時的正規化規則）
    pub fn with_divider(mut self, divider: i64) -> Self {
        self.set_divider(Some(divider));
        self
    }

    /// 設置乘數
    ///
    /// 寫入時正規化：設為 1 時除數強制同為 1；設為其他值時清除除數；
    /// 設為空時不動除數。
    pub fn set_multiplier(&mut self, multiplier: Option<i64>) {
        self.number_of_packages_multiplier = multiplier;
        match multiplier {
            Some(1) => self.number_of_packages_divider = Some(1),
            Some(_) => self.number_of_packages_divider = None,
            None => {}
        }
    }

    /// 設置除數（正規化規則同 [`set_multiplier`](Self::set_multiplier)）
    pub fn set_divider(&mut self, divider: Option<i64>) {
        self.number_of_packages_divider = divider;
        match divider {
            Some(1) => self.number_of_packages_multiplier = Some(1),
            Some(_) => self.number_of_packages_multiplier = None,
            None => {}
        }
    }

    /// 標準化包裝數 → 本批號包裝數
    ///
    /// 零直接回傳，不經捨入。除數換算向上取整。
    pub fn to_lot_packages(&self, normalized: i64) -> i64 {
        if normalized == 0 {
            return normalized;
        }
        if let Some(divider) = self.number_of_packages_divider {
            ceil_div(normalized, divider)
        } else if let Some(multiplier) = self.number_of_packages_multiplier {
            normalized * multiplier
        } else {
            normalized
        }
    }

    /// 本批號包裝數 → 標準化包裝數
    ///
    /// 零直接回傳。乘數換算向上取整；除數換算為精確乘法。
    pub fn to_normalized_packages(&self, lot_packages: i64) -> i64 {
        if lot_packages == 0 {
            return lot_packages;
        }
        if let Some(divider) = self.number_of_packages_divider {
            lot_packages * divider
        } else if let Some(multiplier) = self.number_of_packages_multiplier {
            ceil_div(lot_packages, multiplier)
        } else {
            lot_packages
        }
    }

    /// Option 版本：空值與零皆原樣回傳
    pub fn compute_number_of_packages(&self, normalized: Option<i64>) -> Option<i64> {
        normalized.map(|n| self.to_lot_packages(n))
    }

    /// Option 版本：空值與零皆原樣回傳
    pub fn compute_normalized_number_of_packages(&self, lot_packages: Option<i64>) -> Option<i64> {
        lot_packages.map(|n| self.to_normalized_packages(n))
    }

    /// 檢查乘數與除數設定是否一致
    ///
    /// 允許的狀態：皆未設定；皆為 1；恰設定其中一個非 1 的正值。
    pub fn check_package_ratio(&self) -> Result<()> {
        if let Some(multiplier) = self.number_of_packages_multiplier {
            if multiplier <= 0 {
                return Err(StockError::NonPositiveMultiplier(self.id.clone()));
            }
        }
        if let Some(divider) = self.number_of_packages_divider {
            if divider <= 0 {
                return Err(StockError::NonPositiveDivider(self.id.clone()));
            }
        }

        let multiplier = self.number_of_packages_multiplier;
        let divider = self.number_of_packages_divider;
        if multiplier.is_none() && divider.is_none() {
            return Ok(());
        }
        if multiplier == Some(1) && divider == Some(1) {
            return Ok(());
        }
        if (multiplier == Some(1) && divider != Some(1))
            || (divider == Some(1) && multiplier != Some(1))
            || (multiplier.is_some() && divider.is_some())
        {
            return Err(StockError::InconsistentPackageRatio(self.id.clone()));
        }
        Ok(())
    }
}
