//! # Stock Allocation Engine
//!
//! 包裝數量分配引擎：將以包裝計數的草稿調撥，自來源庫位子樹的
//! 在庫包裝中貪婪分配，必要時拆分為多筆兄弟調撥。

pub mod availability;
pub mod coordinator;
pub mod expander;
pub mod lock;
pub mod picker;
pub mod query;

// Re-export 主要類型
pub use availability::AvailabilityIndex;
pub use coordinator::{Allocator, AssignOptions, BasicAssigner, NonPackageAssign};
pub use expander::LocationExpander;
pub use lock::MoveTableLock;
pub use picker::Picked;
pub use query::{Grouping, QuantityKey, QuantityQuery, StockLedger, StockRecord};

use uuid::Uuid;

/// 分配結果
#[derive(Debug, Clone)]
pub struct AssignOutcome {
    /// 批次內的調撥是否全數完整分配
    pub success: bool,

    /// 已轉為「已分配」狀態的調撥
    pub assigned: Vec<Uuid>,

    /// 分配過程新建的兄弟調撥
    pub created: Vec<Uuid>,

    /// 因數量不足以計為一個包裝而略過的調撥
    pub skipped: Vec<Uuid>,

    /// 缺口明細
    pub shortfalls: Vec<Shortfall>,

    /// 計算耗時（毫秒）
    pub calculation_time_ms: Option<u128>,
}

impl AssignOutcome {
    /// 創建空的分配結果
    pub fn empty() -> Self {
        Self {
            success: true,
            assigned: Vec::new(),
            created: Vec::new(),
            skipped: Vec::new(),
            shortfalls: Vec::new(),
            calculation_time_ms: None,
        }
    }

    /// 添加缺口明細
    pub fn add_shortfall(&mut self, shortfall: Shortfall) {
        self.shortfalls.push(shortfall);
    }
}

/// 缺口明細（供應不足為業務結果，不是錯誤）
#[derive(Debug, Clone)]
pub struct Shortfall {
    /// 調撥ID
    pub move_id: Uuid,

    /// 需求包裝數（標準化）
    pub requested: i64,

    /// 已分配包裝數（標準化）
    pub picked: i64,
}

impl Shortfall {
    /// 未能分配的包裝數
    pub fn missing(&self) -> i64 {
        self.requested - self.picked
    }
}
