//! 主檔目錄
//!
//! 產品、包裝、批號與計量單位的記憶體內查找表。

use std::collections::BTreeMap;

use crate::{Lot, Package, Product, Result, StockError, Uom};

/// 主檔目錄
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: BTreeMap<String, Product>,
    packages: BTreeMap<String, Package>,
    lots: BTreeMap<String, Lot>,
    uoms: BTreeMap<String, Uom>,
}

impl Catalog {
    /// 創建空的目錄
    pub fn new() -> Self {
        Self::default()
    }

    /// 建構器模式：加入產品
    pub fn with_product(mut self, product: Product) -> Self {
        self.products.insert(product.id.clone(), product);
        self
    }

    /// 建構器模式：加入包裝
    pub fn with_package(mut self, package: Package) -> Self {
        self.packages.insert(package.id.clone(), package);
        self
    }

    /// 建構器模式：加入批號
    pub fn with_lot(mut self, lot: Lot) -> Self {
        self.lots.insert(lot.id.clone(), lot);
        self
    }

    /// 建構器模式：加入計量單位
    pub fn with_uom(mut self, uom: Uom) -> Self {
        self.uoms.insert(uom.id.clone(), uom);
        self
    }

    /// 依ID查找產品
    pub fn product(&self, id: &str) -> Result<&Product> {
        self.products
            .get(id)
            .ok_or_else(|| StockError::ProductNotFound(id.to_string()))
    }

    /// 依ID查找包裝
    pub fn package(&self, id: &str) -> Result<&Package> {
        self.packages
            .get(id)
            .ok_or_else(|| StockError::PackageNotFound(id.to_string()))
    }

    /// 依ID查找批號
    pub fn lot(&self, id: &str) -> Result<&Lot> {
        self.lots
            .get(id)
            .ok_or_else(|| StockError::LotNotFound(id.to_string()))
    }

    /// 依ID查找批號，查無時回傳 None
    pub fn find_lot(&self, id: &str) -> Option<&Lot> {
        self.lots.get(id)
    }

    /// 依ID查找計量單位
    pub fn uom(&self, id: &str) -> Result<&Uom> {
        self.uoms
            .get(id)
            .ok_or_else(|| StockError::UomNotFound(id.to_string()))
    }
}
