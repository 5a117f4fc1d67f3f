//! 庫位模型

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 庫位類型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocationKind {
    /// 供應商
    Supplier,
    /// 客戶
    Customer,
    /// 儲存
    Storage,
    /// 檢視（倉庫彙總節點）
    View,
    /// 生產
    Production,
    /// 盤損
    Lost,
}

/// 庫位（樹狀節點）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    /// 庫位ID
    pub id: String,

    /// 名稱
    pub name: String,

    /// 庫位類型
    pub kind: LocationKind,

    /// 上層庫位
    pub parent: Option<String>,
}

impl Location {
    /// 創建新的庫位
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: LocationKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            parent: None,
        }
    }

    /// 建構器模式：設置上層庫位
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }
}

/// 庫位樹
///
/// 子庫位依加入順序維護，`descendants` 因此為固定的前序走訪順序。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocationTree {
    locations: HashMap<String, Location>,
    children: HashMap<String, Vec<String>>,
}

impl LocationTree {
    /// 創建空的庫位樹
    pub fn new() -> Self {
        Self::default()
    }

    /// 加入庫位
    pub fn add(&mut self, location: Location) {
        if let Some(parent) = &location.parent {
            self.children
                .entry(parent.clone())
                .or_default()
                .push(location.id.clone());
        }
        self.locations.insert(location.id.clone(), location);
    }

    /// 建構器模式：加入庫位
    pub fn with_location(mut self, location: Location) -> Self {
        self.add(location);
        self
    }

    /// 依ID查找庫位
    pub fn get(&self, id: &str) -> Option<&Location> {
        self.locations.get(id)
    }

    /// 根庫位及其所有子孫（前序走訪）
    pub fn descendants(&self, root: &str) -> Vec<String> {
        let mut result = Vec::new();
        let mut stack = vec![root.to_string()];
        while let Some(id) = stack.pop() {
            if let Some(childs) = self.children.get(&id) {
                // 反向入堆疊以保持加入順序
                for child in childs.iter().rev() {
                    stack.push(child.clone());
                }
            }
            result.push(id);
        }
        result
    }
}
