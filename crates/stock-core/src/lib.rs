//! # Stock Core
//!
//! 核心資料模型與類型定義

pub mod catalog;
pub mod location;
pub mod lot;
pub mod moves;
pub mod package;
pub mod product;
pub mod uom;

// Re-export 主要類型
pub use catalog::Catalog;
pub use location::{Location, LocationKind, LocationTree};
pub use lot::Lot;
pub use moves::{Move, MoveOverride, MoveState};
pub use package::Package;
pub use product::Product;
pub use uom::Uom;

/// 庫存錯誤類型
#[derive(Debug, thiserror::Error)]
pub enum StockError {
    #[error("找不到產品: {0}")]
    ProductNotFound(String),

    #[error("找不到批號: {0}")]
    LotNotFound(String),

    #[error("找不到包裝: {0}")]
    PackageNotFound(String),

    #[error("找不到計量單位: {0}")]
    UomNotFound(String),

    #[error("找不到庫位: {0}")]
    LocationNotFound(String),

    #[error("批號 {0} 的包裝除數與乘數設定不一致")]
    InconsistentPackageRatio(String),

    #[error("批號 {0} 的包裝乘數必須為正數")]
    NonPositiveMultiplier(String),

    #[error("批號 {0} 的包裝除數必須為正數")]
    NonPositiveDivider(String),

    #[error("調撥 {0} 需要指定包裝")]
    PackageRequired(String),

    #[error("調撥 {0} 需要指定包裝數量")]
    NumberOfPackagesRequired(String),

    #[error("不支援的分組方式")]
    UnexpectedGrouping,

    #[error("其他錯誤: {0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, StockError>;
