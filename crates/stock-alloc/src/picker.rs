//! 揀貨算法
//!
//! 首次適配的貪婪揀貨：依可用量快照的固定順序掃過各庫位與
//! 批號/包裝，盡可能覆蓋需求；不做最佳化裝箱。

use std::collections::BTreeMap;

use stock_core::{Lot, Result, StockError};

/// 一筆揀貨分配
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Picked {
    /// 來源庫位
    pub location: String,

    /// 批號/包裝鍵（消耗品補足時為 None）
    pub key: Option<String>,

    /// 分配包裝數（來源單位，即該批號自身的包裝數）
    pub number_of_packages: i64,

    /// 分配包裝數（標準化）
    pub normalized_number_of_packages: i64,
}

/// 批號揀選順序掛鉤
///
/// 預設保持快照順序；先進先出等策略可在此改排。
pub fn sort_lots_to_pick(entries: Vec<(String, i64)>) -> Vec<(String, i64)> {
    entries
}

/// 包裝揀貨（不分批號）
///
/// 需求與可用量皆為原始包裝數。掃描順序即 `candidates` 的順序；
/// 可覆蓋需求時就地止步，否則取盡該項後續掃。`consumable_from`
/// 設定時，掃畢仍有缺口的需求以無鍵項自原庫位補足。
pub fn pick_package_number_of_packages(
    needed: i64,
    candidates: &[(String, Vec<(String, i64)>)],
    consumable_from: Option<&str>,
) -> Vec<Picked> {
    let mut to_pick = Vec::new();
    let mut needed_n_packages = needed;
    for (location, available_keys) in candidates {
        for (key, available_n_packages) in available_keys {
            if *available_n_packages <= 0 {
                continue;
            }
            if needed_n_packages <= *available_n_packages {
                to_pick.push(Picked {
                    location: location.clone(),
                    key: Some(key.clone()),
                    number_of_packages: needed_n_packages,
                    normalized_number_of_packages: needed_n_packages,
                });
                return to_pick;
            }
            to_pick.push(Picked {
                location: location.clone(),
                key: Some(key.clone()),
                number_of_packages: *available_n_packages,
                normalized_number_of_packages: *available_n_packages,
            });
            needed_n_packages -= *available_n_packages;
        }
    }
    // 消耗品視為供應無限，強制補足
    if let Some(origin) = consumable_from {
        to_pick.push(Picked {
            location: origin.to_string(),
            key: None,
            number_of_packages: needed_n_packages,
            normalized_number_of_packages: needed_n_packages,
        });
    }
    to_pick
}

/// 批號揀貨
///
/// `needed` 為標準化包裝數。逐批號將未滿足的需求換算為該批號的
/// 包裝數後與可用量比較：可覆蓋則止步；否則取盡該批號，把取得量
/// 換算回標準化遞減需求。向上取整可能使換算後的取得量超過剩餘
/// 需求，需求歸零即提前結束。
pub fn pick_lot_number_of_packages(
    needed: i64,
    candidates: &[(String, Vec<(String, i64)>)],
    lots: &BTreeMap<String, Lot>,
    consumable_from: Option<&str>,
) -> Result<Vec<Picked>> {
    let mut to_pick = Vec::new();
    let mut needed_n_packages = needed;
    for (location, available_keys) in candidates {
        for (lot_id, available_n_packages) in available_keys {
            if *available_n_packages <= 0 {
                continue;
            }
            let lot = lots
                .get(lot_id)
                .ok_or_else(|| StockError::LotNotFound(lot_id.clone()))?;
            let lot_needed_n_packages = lot.to_lot_packages(needed_n_packages);
            if lot_needed_n_packages <= *available_n_packages {
                to_pick.push(Picked {
                    location: location.clone(),
                    key: Some(lot_id.clone()),
                    number_of_packages: lot_needed_n_packages,
                    normalized_number_of_packages: needed_n_packages,
                });
                return Ok(to_pick);
            }
            let normalized_available = lot.to_normalized_packages(*available_n_packages);
            to_pick.push(Picked {
                location: location.clone(),
                key: Some(lot_id.clone()),
                number_of_packages: *available_n_packages,
                normalized_number_of_packages: normalized_available,
            });
            needed_n_packages -= normalized_available;
            if needed_n_packages <= 0 {
                return Ok(to_pick);
            }
        }
    }
    if let Some(origin) = consumable_from {
        to_pick.push(Picked {
            location: origin.to_string(),
            key: None,
            number_of_packages: needed_n_packages,
            normalized_number_of_packages: needed_n_packages,
        });
    }
    Ok(to_pick)
}
