//! 庫存數量查詢
//!
//! 依（庫位、產品[、批號/包裝]）彙總包裝數量的查詢介面，
//! 與測試、示範用的記憶體內實作。

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use stock_core::{Catalog, Result, StockError};

/// 彙總分組方式
///
/// 取代隱式的交易語境旗標：呼叫端明確指定分組。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grouping {
    /// 依產品
    Product,
    /// 依產品＋批號
    ProductLot,
    /// 依產品＋包裝
    ProductPackage,
}

/// 彙總鍵：（庫位、產品、末端鍵）
pub type QuantityKey = (String, String, Option<String>);

/// 庫存數量查詢介面
pub trait QuantityQuery {
    /// 查詢各庫位的包裝數量
    ///
    /// 回傳以包裝數計的整數數量。`normalized` 為 true 時，各批號的
    /// 數量先經其乘數/除數換算為標準化包裝數（乘數：向上取整除法；
    /// 除數：精確乘法），分組不含批號時再彙總。
    fn compute_quantities(
        &self,
        catalog: &Catalog,
        locations: &[String],
        products: &[String],
        grouping: Grouping,
        normalized: bool,
        as_of: NaiveDate,
    ) -> Result<BTreeMap<QuantityKey, i64>>;
}

/// 庫存記錄（某日入庫的在庫包裝數）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockRecord {
    /// 庫位
    pub location: String,

    /// 產品
    pub product: String,

    /// 批號
    pub lot: Option<String>,

    /// 包裝
    pub package: Option<String>,

    /// 包裝數量
    pub number_of_packages: i64,

    /// 入庫日期
    pub date: NaiveDate,
}

impl StockRecord {
    /// 創建新的庫存記錄
    pub fn new(
        location: impl Into<String>,
        product: impl Into<String>,
        number_of_packages: i64,
        date: NaiveDate,
    ) -> Self {
        Self {
            location: location.into(),
            product: product.into(),
            lot: None,
            package: None,
            number_of_packages,
            date,
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
}

/// 記憶體內庫存帳
#[derive(Debug, Clone, Default)]
pub struct StockLedger {
    records: Vec<StockRecord>,
}

impl StockLedger {
    /// 創建空的庫存帳
    pub fn new() -> Self {
        Self::default()
    }

    /// 建構器模式：加入庫存記錄
    pub fn with_record(mut self, record: StockRecord) -> Self {
        self.records.push(record);
        self
    }

    /// 加入庫存記錄
    pub fn add_record(&mut self, record: StockRecord) {
        self.records.push(record);
    }

    /// 某庫位、產品的標準化包裝數
    pub fn normalized_number_of_packages(
        &self,
        catalog: &Catalog,
        location: &str,
        product: &str,
        as_of: NaiveDate,
    ) -> Result<i64> {
        let totals = self.compute_quantities(
            catalog,
            &[location.to_string()],
            &[product.to_string()],
            Grouping::Product,
            true,
            as_of,
        )?;
        Ok(totals.values().sum())
    }
}

impl QuantityQuery for StockLedger {
    fn compute_quantities(
        &self,
        catalog: &Catalog,
        locations: &[String],
        products: &[String],
        grouping: Grouping,
        normalized: bool,
        as_of: NaiveDate,
    ) -> Result<BTreeMap<QuantityKey, i64>> {
        // 標準化換算的比率屬於批號，依包裝分組時無從套用
        if normalized && grouping == Grouping::ProductPackage {
            return Err(StockError::UnexpectedGrouping);
        }

        let selected = self.records.iter().filter(|record| {
            record.date <= as_of
                && locations.contains(&record.location)
                && products.contains(&record.product)
        });

        let mut totals: BTreeMap<QuantityKey, i64> = BTreeMap::new();
        match grouping {
            Grouping::ProductPackage => {
                for record in selected {
                    *totals
                        .entry((
                            record.location.clone(),
                            record.product.clone(),
                            record.package.clone(),
                        ))
                        .or_insert(0) += record.number_of_packages;
                }
            }
            Grouping::Product | Grouping::ProductLot => {
                // 批號是標準化換算的最小粒度，先依批號彙總
                let mut by_lot: BTreeMap<QuantityKey, i64> = BTreeMap::new();
                for record in selected {
                    *by_lot
                        .entry((
                            record.location.clone(),
                            record.product.clone(),
                            record.lot.clone(),
                        ))
                        .or_insert(0) += record.number_of_packages;
                }
                if normalized {
                    // 查無批號者原樣計（LEFT JOIN 語義）
                    by_lot = by_lot
                        .into_iter()
                        .map(|((location, product, lot), n_packages)| {
                            let converted = match lot.as_deref().and_then(|id| catalog.find_lot(id))
                            {
                                Some(lot_entity) => lot_entity.to_normalized_packages(n_packages),
                                None => n_packages,
                            };
                            ((location, product, lot), converted)
                        })
                        .collect();
                }
                match grouping {
                    Grouping::ProductLot => totals = by_lot,
                    _ => {
                        for ((location, product, _), n_packages) in by_lot {
                            *totals.entry((location, product, None)).or_insert(0) += n_packages;
                        }
                    }
                }
            }
        }

        tracing::debug!(
            "庫存快照: {} 筆記錄, {} 個彙總鍵",
            self.records.len(),
            totals.len()
        );
        Ok(totals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use stock_core::Lot;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, 1).unwrap()
    }

    fn sample_catalog() -> Catalog {
        Catalog::new()
            // 乘數 3：3 個本批號包裝供應 1 個預設包裝
            .with_lot(
                Lot::new("LOT-M3", "PROD-001", Decimal::from(10), "unit").with_multiplier(3),
            )
            // 除數 4：1 個本批號包裝供應 4 個預設包裝
            .with_lot(Lot::new("LOT-D4", "PROD-001", Decimal::from(10), "unit").with_divider(4))
    }

    fn sample_ledger() -> StockLedger {
        StockLedger::new()
            .with_record(StockRecord::new("WH/A", "PROD-001", 7, day()).with_lot("LOT-M3"))
            .with_record(StockRecord::new("WH/A", "PROD-001", 3, day()).with_lot("LOT-D4"))
            .with_record(StockRecord::new("WH/A", "PROD-001", 5, day()))
    }

    fn query(
        ledger: &StockLedger,
        grouping: Grouping,
        normalized: bool,
    ) -> BTreeMap<QuantityKey, i64> {
        ledger
            .compute_quantities(
                &sample_catalog(),
                &["WH/A".to_string()],
                &["PROD-001".to_string()],
                grouping,
                normalized,
                day(),
            )
            .unwrap()
    }

    #[test]
    fn test_group_by_product_raw() {
        let totals = query(&sample_ledger(), Grouping::Product, false);

        // 原始包裝數直接相加：7 + 3 + 5
        assert_eq!(
            totals.get(&("WH/A".to_string(), "PROD-001".to_string(), None)),
            Some(&15)
        );
    }

    #[test]
    fn test_group_by_product_normalized() {
        let totals = query(&sample_ledger(), Grouping::Product, true);

        // LOT-M3: ceil(7/3) = 3；LOT-D4: 3 × 4 = 12；無批號: 5
        assert_eq!(
            totals.get(&("WH/A".to_string(), "PROD-001".to_string(), None)),
            Some(&20)
        );
    }

    #[test]
    fn test_group_by_lot_normalized() {
        let totals = query(&sample_ledger(), Grouping::ProductLot, true);

        let key = |lot: Option<&str>| {
            (
                "WH/A".to_string(),
                "PROD-001".to_string(),
                lot.map(|l| l.to_string()),
            )
        };
        assert_eq!(totals.get(&key(Some("LOT-M3"))), Some(&3));
        assert_eq!(totals.get(&key(Some("LOT-D4"))), Some(&12));
        assert_eq!(totals.get(&key(None)), Some(&5));
    }

    #[test]
    fn test_group_by_package() {
        let ledger = StockLedger::new()
            .with_record(StockRecord::new("WH/A", "PROD-001", 4, day()).with_package("BOX-12"))
            .with_record(StockRecord::new("WH/A", "PROD-001", 2, day()).with_package("BOX-12"))
            .with_record(StockRecord::new("WH/A", "PROD-001", 9, day()).with_package("BOX-6"));

        let totals = query(&ledger, Grouping::ProductPackage, false);

        let key = |package: &str| {
            (
                "WH/A".to_string(),
                "PROD-001".to_string(),
                Some(package.to_string()),
            )
        };
        assert_eq!(totals.get(&key("BOX-12")), Some(&6));
        assert_eq!(totals.get(&key("BOX-6")), Some(&9));
    }

    #[test]
    fn test_normalized_with_package_grouping_is_rejected() {
        let result = sample_ledger().compute_quantities(
            &sample_catalog(),
            &["WH/A".to_string()],
            &["PROD-001".to_string()],
            Grouping::ProductPackage,
            true,
            day(),
        );
        assert!(matches!(result, Err(StockError::UnexpectedGrouping)));
    }

    #[test]
    fn test_as_of_filters_later_records() {
        let later = NaiveDate::from_ymd_opt(2025, 12, 1).unwrap();
        let ledger = StockLedger::new()
            .with_record(StockRecord::new("WH/A", "PROD-001", 5, day()))
            .with_record(StockRecord::new("WH/A", "PROD-001", 9, later));

        let totals = query(&ledger, Grouping::Product, false);
        assert_eq!(
            totals.get(&("WH/A".to_string(), "PROD-001".to_string(), None)),
            Some(&5)
        );
    }

    #[test]
    fn test_unknown_lot_counts_as_identity() {
        let ledger = StockLedger::new()
            .with_record(StockRecord::new("WH/A", "PROD-001", 8, day()).with_lot("LOT-GONE"));

        let totals = query(&ledger, Grouping::Product, true);
        assert_eq!(
            totals.get(&("WH/A".to_string(), "PROD-001".to_string(), None)),
            Some(&8)
        );
    }

    #[test]
    fn test_normalized_number_of_packages() {
        let total = sample_ledger()
            .normalized_number_of_packages(&sample_catalog(), "WH/A", "PROD-001", day())
            .unwrap();
        assert_eq!(total, 20);
    }
}
