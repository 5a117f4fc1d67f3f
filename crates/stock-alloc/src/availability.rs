//! 可用量索引
//!
//! 一次分配批次專屬的（庫位、產品）→（批號/包裝 → 包裝數）對照表，
//! 建立後由協調流程以 `adjust` 就地增減：來源扣減、目的補回，
//! 同批次的後續調撥因此看得到前面調撥的效果。

use std::collections::{BTreeMap, BTreeSet};

use crate::query::QuantityKey;

/// 可用量索引
///
/// 走訪順序即 BTreeMap 的鍵排序：外層依（庫位、產品），內層依
/// 批號/包裝ID遞增、`None` 在最前。此順序固定，為揀貨的掃描順序。
#[derive(Debug, Clone, Default)]
pub struct AvailabilityIndex {
    buckets: BTreeMap<(String, String), BTreeMap<Option<String>, i64>>,
}

impl AvailabilityIndex {
    /// 由數量快照建立索引，僅保留嚴格為正的數量
    pub fn from_snapshot(snapshot: &BTreeMap<QuantityKey, i64>) -> Self {
        let mut index = Self::default();
        for ((location, product, key), n_packages) in snapshot {
            if *n_packages <= 0 {
                continue;
            }
            index
                .buckets
                .entry((location.clone(), product.clone()))
                .or_default()
                .insert(key.clone(), *n_packages);
        }
        index
    }

    /// 查詢（庫位、產品）下各鍵的可用包裝數
    pub fn lookup(&self, location: &str, product: &str) -> Option<&BTreeMap<Option<String>, i64>> {
        self.buckets
            .get(&(location.to_string(), product.to_string()))
    }

    /// 增減某鍵的可用量（鍵不存在時自 0 建立）
    ///
    /// 數量允許暫時為負；揀貨一律略過非正數的項目。
    pub fn adjust(&mut self, location: &str, product: &str, key: Option<&str>, delta: i64) {
        let entry = self
            .buckets
            .entry((location.to_string(), product.to_string()))
            .or_default()
            .entry(key.map(|k| k.to_string()))
            .or_insert(0);
        *entry += delta;
    }

    /// 索引中引用到的全部批號/包裝鍵
    pub fn referenced_keys(&self) -> BTreeSet<String> {
        self.buckets
            .values()
            .flat_map(|bucket| bucket.keys().filter_map(|key| key.clone()))
            .collect()
    }
}
