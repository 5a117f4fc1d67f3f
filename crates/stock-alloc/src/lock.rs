//! 調撥表鎖

use std::sync::{Mutex, MutexGuard, PoisonError};

/// 調撥表的建議鎖
///
/// 一次分配批次自建立庫存快照至寫回調撥全程持有，
/// 併發批次對同一張調撥表因此串行化，不會重複分配同一批在庫包裝。
#[derive(Debug, Default)]
pub struct MoveTableLock {
    inner: Mutex<()>,
}

impl MoveTableLock {
    /// 創建新的鎖
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(()),
        }
    }

    /// 取得鎖（阻塞直到取得）
    ///
    /// 可用量索引為批次私有，鎖中毒時直接取回守衛。
    pub fn acquire(&self) -> MutexGuard<'_, ()> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
