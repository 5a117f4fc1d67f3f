//! 調撥模型

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 調撥狀態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveState {
    /// 草稿
    Draft,
    /// 已分配
    Assigned,
    /// 完成
    Done,
    /// 取消
    Cancelled,
}

/// 調撥（產品數量在兩庫位間的移動）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Move {
    /// 調撥ID
    pub id: Uuid,

    /// 產品ID
    pub product: String,

    /// 批號
    pub lot: Option<String>,

    /// 包裝
    pub package: Option<String>,

    /// 調撥數量（以 `uom` 表示）
    pub quantity: Decimal,

    /// 計量單位
    pub uom: String,

    /// 包裝數量（None 表示不以包裝計數）
    pub number_of_packages: Option<i64>,

    /// 來源庫位
    pub from_location: String,

    /// 目的庫位
    pub to_location: String,

    /// 計劃日期
    pub planned_date: Option<NaiveDate>,

    /// 來源單據
    pub origin: Option<String>,

    /// 狀態
    pub state: MoveState,
}

impl Move {
    /// 創建新的草稿調撥
    pub fn new(
        product: impl Into<String>,
        quantity: Decimal,
        uom: impl Into<String>,
        from_location: impl Into<String>,
        to_location: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            product: product.into(),
            lot: None,
            package: None,
            quantity,
            uom: uom.into(),
            number_of_packages: None,
            from_location: from_location.into(),
            to_location: to_location.into(),
            planned_date: None,
            origin: None,
            state: MoveState::Draft,
        }
    }

    /// 建構器模式：設置批號
    pub fn with_lot(mut self, lot: impl Into<String>) -> Self {
        self.lot = Some(lot.into());
        self
    }

    /// 建構器模式：設置包裝
    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package = Some(package.into());
        self
    }

    /// 建構器模式：設置包裝數量
    pub fn with_number_of_packages(mut self, number_of_packages: i64) -> Self {
        self.number_of_packages = Some(number_of_packages);
        self
    }

    /// 建構器模式：設置計劃日期
    pub fn with_planned_date(mut self, planned_date: NaiveDate) -> Self {
        self.planned_date = Some(planned_date);
        self
    }

    /// 建構器模式：設置來源單據
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    /// 檢查是否為草稿
    pub fn is_draft(&self) -> bool {
        self.state == MoveState::Draft
    }

    /// 分配生命週期轉換
    pub fn set_assigned(&mut self) {
        self.state = MoveState::Assigned;
    }

    /// 以覆寫欄位複製出兄弟調撥（新ID、草稿狀態）
    pub fn copy_with(&self, values: &MoveOverride) -> Move {
        let mut copied = self.clone();
        copied.id = Uuid::new_v4();
        copied.state = MoveState::Draft;
        values.apply_to(&mut copied);
        copied
    }
}

/// 分配過程允許覆寫的調撥欄位
#[derive(Debug, Clone, Default)]
pub struct MoveOverride {
    /// 來源庫位
    pub from_location: Option<String>,

    /// 批號
    pub lot: Option<String>,

    /// 包裝
    pub package: Option<String>,

    /// 包裝數量
    pub number_of_packages: Option<i64>,

    /// 調撥數量
    pub quantity: Option<Decimal>,
}

impl MoveOverride {
    /// 將設定的欄位寫到調撥上
    pub fn apply_to(&self, mv: &mut Move) {
        if let Some(from_location) = &self.from_location {
            mv.from_location = from_location.clone();
        }
        if let Some(lot) = &self.lot {
            mv.lot = Some(lot.clone());
        }
        if let Some(package) = &self.package {
            mv.package = Some(package.clone());
        }
        if let Some(number_of_packages) = self.number_of_packages {
            mv.number_of_packages = Some(number_of_packages);
        }
        if let Some(quantity) = self.quantity {
            mv.quantity = quantity;
        }
    }
}
