//! 產品模型

use serde::{Deserialize, Serialize};

use crate::location::{Location, LocationKind};

/// 產品
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// 產品ID
    pub id: String,

    /// 預設計量單位
    pub default_uom: String,

    /// 是否要求以包裝計數調撥
    pub package_required: bool,

    /// 是否為消耗品（視為供應無限，分配不足時強制補足）
    pub consumable: bool,

    /// 要求批號管理的庫位類型
    pub lot_required: Vec<LocationKind>,
}

impl Product {
    /// 創建新的產品
    pub fn new(id: impl Into<String>, default_uom: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            default_uom: default_uom.into(),
            package_required: false,
            consumable: false,
            lot_required: Vec::new(),
        }
    }

    /// 建構器模式：設為要求包裝計數
    pub fn with_package_required(mut self) -> Self {
        self.package_required = true;
        self
    }

    /// 建構器模式：設為消耗品
    pub fn as_consumable(mut self) -> Self {
        self.consumable = true;
        self
    }

    /// 建構器模式：設置要求批號管理的庫位類型
    pub fn with_lot_required(mut self, kinds: Vec<LocationKind>) -> Self {
        self.lot_required = kinds;
        self
    }

    /// 兩庫位間的調撥是否要求批號
    pub fn lot_is_required(&self, from: &Location, to: &Location) -> bool {
        self.lot_required.contains(&from.kind) || self.lot_required.contains(&to.kind)
    }
}
