//! # Stock Packages
//!
//! 包裝數量庫存分配套件：核心資料模型與分配引擎的彙總入口

// Re-export 主要類型
pub use stock_alloc::{
    Allocator, AssignOptions, AssignOutcome, AvailabilityIndex, BasicAssigner, Grouping,
    LocationExpander, MoveTableLock, NonPackageAssign, Picked, QuantityKey, QuantityQuery,
    Shortfall, StockLedger, StockRecord,
};
pub use stock_core::{
    Catalog, Location, LocationKind, LocationTree, Lot, Move, MoveOverride, MoveState, Package,
    Product, Result, StockError, Uom,
};
