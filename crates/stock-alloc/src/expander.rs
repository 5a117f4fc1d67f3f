//! 庫位展開
//!
//! 在一次分配批次內快取「根庫位 → 待搜尋庫位」的展開結果，
//! 共用來源庫位的調撥不會重複走訪庫位樹。

use std::collections::HashMap;

use stock_core::LocationTree;

/// 庫位展開器
#[derive(Debug, Default)]
pub struct LocationExpander {
    cache: HashMap<String, Vec<String>>,
}

impl LocationExpander {
    /// 創建新的展開器
    pub fn new() -> Self {
        Self {
            cache: HashMap::new(),
        }
    }

    /// 展開根庫位
    ///
    /// `with_childs` 為 false 時僅回傳根庫位本身；為 true 時回傳根庫位
    /// 及其所有子孫（前序走訪順序）。
    pub fn expand(&mut self, tree: &LocationTree, root: &str, with_childs: bool) -> Vec<String> {
        if let Some(cached) = self.cache.get(root) {
            return cached.clone();
        }
        let expanded = if with_childs {
            tree.descendants(root)
        } else {
            vec![root.to_string()]
        };
        self.cache.insert(root.to_string(), expanded.clone());
        expanded
    }
}
