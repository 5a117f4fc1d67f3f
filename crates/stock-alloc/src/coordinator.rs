//! 分配協調器
//!
//! 將草稿調撥依追蹤策略分組，建立可用量索引，逐筆揀貨後把結果
//! 寫回調撥：首筆分配就地改寫原調撥，其餘拆分為兄弟調撥，
//! 缺口改寫為剩餘需求並使整批結果標記為未完全成功。

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use stock_core::{
    Catalog, LocationTree, Lot, Move, MoveOverride, Result, StockError, Uom,
};

use crate::availability::AvailabilityIndex;
use crate::expander::LocationExpander;
use crate::lock::MoveTableLock;
use crate::picker;
use crate::query::{Grouping, QuantityQuery};
use crate::{AssignOutcome, Shortfall};

/// 分配選項
#[derive(Debug, Clone)]
pub struct AssignOptions {
    /// 是否搜尋來源庫位的子庫位
    pub with_childs: bool,

    /// 無包裝調撥委派時使用的分組
    pub grouping: Grouping,

    /// 庫存快照基準日
    pub as_of: NaiveDate,
}

impl AssignOptions {
    /// 創建預設選項（搜尋子庫位、依產品分組）
    pub fn new(as_of: NaiveDate) -> Self {
        Self {
            with_childs: true,
            grouping: Grouping::Product,
            as_of,
        }
    }

    /// 建構器模式：設置是否搜尋子庫位
    pub fn with_childs(mut self, with_childs: bool) -> Self {
        self.with_childs = with_childs;
        self
    }

    /// 建構器模式：設置委派分組
    pub fn with_grouping(mut self, grouping: Grouping) -> Self {
        self.grouping = grouping;
        self
    }
}

/// 無包裝調撥的委派分配介面
pub trait NonPackageAssign {
    /// 嘗試分配 `ids` 指定的調撥，回傳是否全數成功
    fn assign_try(
        &self,
        moves: &mut [Move],
        ids: &[Uuid],
        with_childs: bool,
        grouping: Grouping,
    ) -> Result<bool>;
}

/// 預設委派：草稿調撥一律轉為已分配
///
/// 連續數量的分配屬於基礎庫存模組，此處僅提供測試與示範用的替身。
#[derive(Debug, Default)]
pub struct BasicAssigner;

impl NonPackageAssign for BasicAssigner {
    fn assign_try(
        &self,
        moves: &mut [Move],
        ids: &[Uuid],
        _with_childs: bool,
        _grouping: Grouping,
    ) -> Result<bool> {
        for mv in moves.iter_mut() {
            if ids.contains(&mv.id) && mv.is_draft() {
                mv.set_assigned();
            }
        }
        Ok(true)
    }
}

/// 單一策略組的改寫計劃
///
/// 揀貨階段只讀調撥、只寫可用量索引；所有調撥改寫延後到整個批次
/// 揀貨完成後一次套用，結構性錯誤因此不會留下半套用的批次。
#[derive(Debug, Default)]
struct GroupPlan {
    to_write: Vec<(Uuid, MoveOverride)>,
    to_create: Vec<Move>,
    to_assign: Vec<Uuid>,
    shortfalls: Vec<Shortfall>,
    success: bool,
}

/// 分配協調器
pub struct Allocator<'a> {
    /// 庫位樹
    tree: &'a LocationTree,

    /// 主檔目錄
    catalog: &'a Catalog,

    /// 調撥表鎖
    lock: &'a MoveTableLock,

    /// 無包裝調撥的委派對象
    fallback: Option<&'a dyn NonPackageAssign>,
}

impl<'a> Allocator<'a> {
    /// 創建新的協調器
    pub fn new(tree: &'a LocationTree, catalog: &'a Catalog, lock: &'a MoveTableLock) -> Self {
        Self {
            tree,
            catalog,
            lock,
            fallback: None,
        }
    }

    /// 建構器模式：設置無包裝調撥的委派對象
    pub fn with_fallback(mut self, fallback: &'a dyn NonPackageAssign) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// 主分配入口
    ///
    /// 調撥分為四組：數量不足一個包裝者略過；需批號追蹤者依
    /// （產品、批號）分配；需包裝追蹤者依（產品、包裝）分配；
    /// 無包裝者原樣委派給基礎分配。批號/包裝兩組的快照、揀貨與
    /// 寫回全程持有調撥表鎖。
    pub fn assign_try<Q: QuantityQuery>(
        &self,
        ledger: &Q,
        moves: &mut Vec<Move>,
        options: &AssignOptions,
    ) -> Result<AssignOutcome> {
        if options.grouping == Grouping::ProductPackage {
            return Err(StockError::UnexpectedGrouping);
        }

        tracing::info!("開始分配：調撥 {} 筆", moves.len());
        let start_time = std::time::Instant::now();

        let mut outcome = AssignOutcome::empty();

        // Step 1: 依追蹤策略分組；包裝資料缺漏在任何改寫前即失敗
        let mut package_lot_ids = Vec::new();
        let mut package_ids = Vec::new();
        let mut no_package_ids = Vec::new();
        for mv in moves.iter() {
            let product = self.catalog.product(&mv.product)?;
            let default_uom = self.catalog.uom(&product.default_uom)?;
            let move_uom = self.catalog.uom(&mv.uom)?;
            let internal_quantity = Uom::compute_qty(move_uom, mv.quantity, default_uom, false);
            if internal_quantity < default_uom.rounding {
                outcome.skipped.push(mv.id);
                continue;
            }
            if mv.package.is_some() || product.package_required {
                if mv.package.is_none() {
                    return Err(StockError::PackageRequired(mv.id.to_string()));
                }
                if mv.number_of_packages.is_none() {
                    return Err(StockError::NumberOfPackagesRequired(mv.id.to_string()));
                }
                let from = self
                    .tree
                    .get(&mv.from_location)
                    .ok_or_else(|| StockError::LocationNotFound(mv.from_location.clone()))?;
                let to = self
                    .tree
                    .get(&mv.to_location)
                    .ok_or_else(|| StockError::LocationNotFound(mv.to_location.clone()))?;
                if mv.lot.is_some() || product.lot_is_required(from, to) {
                    package_lot_ids.push(mv.id);
                } else {
                    package_ids.push(mv.id);
                }
            } else {
                no_package_ids.push(mv.id);
            }
        }
        tracing::debug!(
            "分組：批號 {} 筆，包裝 {} 筆，無包裝 {} 筆，略過 {} 筆",
            package_lot_ids.len(),
            package_ids.len(),
            no_package_ids.len(),
            outcome.skipped.len()
        );

        // Step 2: 批次全程持有調撥表鎖
        let _guard = self.lock.acquire();

        // Step 3-6: 逐策略組建立快照並揀貨（只讀調撥）
        let mut plans = Vec::new();
        if !package_lot_ids.is_empty() {
            plans.push(self.plan_number_of_packages(
                ledger,
                &*moves,
                &package_lot_ids,
                options,
                Grouping::ProductLot,
            )?);
        }
        if !package_ids.is_empty() {
            plans.push(self.plan_number_of_packages(
                ledger,
                &*moves,
                &package_ids,
                options,
                Grouping::ProductPackage,
            )?);
        }

        // Step 7: 套用改寫、建立兄弟調撥、執行分配轉換
        let mut success = true;
        for plan in plans {
            success &= plan.success;
            Self::apply_plan(moves, plan, &mut outcome);
        }

        // 無包裝調撥原樣委派
        if !no_package_ids.is_empty() {
            let draft_before: Vec<Uuid> = moves
                .iter()
                .filter(|m| no_package_ids.contains(&m.id) && m.is_draft())
                .map(|m| m.id)
                .collect();
            let delegated = match self.fallback {
                Some(fallback) => {
                    fallback.assign_try(moves, &no_package_ids, options.with_childs, options.grouping)?
                }
                None => BasicAssigner.assign_try(
                    moves,
                    &no_package_ids,
                    options.with_childs,
                    options.grouping,
                )?,
            };
            for id in draft_before {
                if moves.iter().any(|m| m.id == id && !m.is_draft()) {
                    outcome.assigned.push(id);
                }
            }
            success &= delegated;
        }

        outcome.success = success;
        outcome.calculation_time_ms = Some(start_time.elapsed().as_millis());
        tracing::info!(
            "分配完成，成功: {}，已分配 {} 筆，新建 {} 筆，缺口 {} 筆，耗時 {:?}",
            outcome.success,
            outcome.assigned.len(),
            outcome.created.len(),
            outcome.shortfalls.len(),
            start_time.elapsed()
        );
        Ok(outcome)
    }

    /// 單一策略組的揀貨計劃
    fn plan_number_of_packages<Q: QuantityQuery>(
        &self,
        ledger: &Q,
        moves: &[Move],
        ids: &[Uuid],
        options: &AssignOptions,
        grouping: Grouping,
    ) -> Result<GroupPlan> {
        if grouping == Grouping::Product {
            return Err(StockError::UnexpectedGrouping);
        }
        let id_set: BTreeSet<Uuid> = ids.iter().copied().collect();

        // Step 3: 展開來源庫位、收集產品
        let mut expander = LocationExpander::new();
        let mut location_ids: BTreeSet<String> = BTreeSet::new();
        let mut product_ids: BTreeSet<String> = BTreeSet::new();
        for mv in moves.iter().filter(|m| id_set.contains(&m.id)) {
            for location in expander.expand(self.tree, &mv.from_location, options.with_childs) {
                location_ids.insert(location);
            }
            product_ids.insert(mv.product.clone());
        }
        let location_ids: Vec<String> = location_ids.into_iter().collect();
        let product_ids: Vec<String> = product_ids.into_iter().collect();

        // Step 4: 數量快照 → 可用量索引（僅保留正數）
        let snapshot = ledger.compute_quantities(
            self.catalog,
            &location_ids,
            &product_ids,
            grouping,
            false,
            options.as_of,
        )?;
        let mut index = AvailabilityIndex::from_snapshot(&snapshot);

        // Step 5: 解析批號
        let mut id2lot: BTreeMap<String, Lot> = BTreeMap::new();
        if grouping == Grouping::ProductLot {
            for key in index.referenced_keys() {
                id2lot.insert(key.clone(), self.catalog.lot(&key)?.clone());
            }
        }

        // Step 6: 逐筆揀貨（輸入順序）
        let mut plan = GroupPlan {
            success: true,
            ..GroupPlan::default()
        };
        for mv in moves.iter().filter(|m| id_set.contains(&m.id)) {
            if !mv.is_draft() {
                continue;
            }
            let needed_n_packages = mv
                .number_of_packages
                .ok_or_else(|| StockError::NumberOfPackagesRequired(mv.id.to_string()))?;
            let move_key = match grouping {
                Grouping::ProductLot => mv.lot.clone(),
                _ => mv.package.clone(),
            };

            // 候選：展開庫位順序 × 快照鍵順序
            let mut candidates: Vec<(String, Vec<(String, i64)>)> = Vec::new();
            for location in expander.expand(self.tree, &mv.from_location, options.with_childs) {
                let Some(bucket) = index.lookup(&location, &mv.product) else {
                    continue;
                };
                match &move_key {
                    None => {
                        // 未指定批號的調撥可揀該庫位的所有批號；無批號庫存除外
                        let entries: Vec<(String, i64)> = bucket
                            .iter()
                            .filter_map(|(key, n)| key.clone().map(|k| (k, *n)))
                            .collect();
                        if !entries.is_empty() {
                            candidates.push((location, picker::sort_lots_to_pick(entries)));
                        }
                    }
                    Some(key) => {
                        if let Some(n) = bucket.get(&Some(key.clone())) {
                            candidates.push((location, vec![(key.clone(), *n)]));
                        }
                    }
                }
            }

            let product = self.catalog.product(&mv.product)?;
            let consumable_from = product.consumable.then_some(mv.from_location.as_str());

            let to_pick = match grouping {
                Grouping::ProductLot => picker::pick_lot_number_of_packages(
                    needed_n_packages,
                    &candidates,
                    &id2lot,
                    consumable_from,
                )?,
                _ => picker::pick_package_number_of_packages(
                    needed_n_packages,
                    &candidates,
                    consumable_from,
                ),
            };

            let picked_n_packages: i64 = to_pick
                .iter()
                .map(|p| p.normalized_number_of_packages)
                .sum();

            // 缺口時原調撥保留為剩餘需求，全部揀得量改掛到兄弟調撥
            let mut first;
            let mut not_picked_n_packages = 0;
            if needed_n_packages > picked_n_packages {
                plan.success = false;
                first = false;
                not_picked_n_packages = needed_n_packages - picked_n_packages;
                plan.shortfalls.push(Shortfall {
                    move_id: mv.id,
                    requested: needed_n_packages,
                    picked: picked_n_packages,
                });
            } else {
                first = true;
            }

            let move_uom = self.catalog.uom(&mv.uom)?;
            for picked in &to_pick {
                let values =
                    self.picked_override(mv, picked, grouping, move_uom)?;

                if first {
                    plan.to_write.push((mv.id, values));
                    plan.to_assign.push(mv.id);
                    first = false;
                } else {
                    let sibling = mv.copy_with(&values);
                    plan.to_assign.push(sibling.id);
                    plan.to_create.push(sibling);
                }

                // 來源扣減、目的補回：同批次後續調撥看得到
                let key = picked.key.as_deref();
                index.adjust(
                    &picked.location,
                    &mv.product,
                    key,
                    -picked.number_of_packages,
                );
                index.adjust(&mv.to_location, &mv.product, key, picked.number_of_packages);
            }

            if not_picked_n_packages > 0 {
                plan.to_write
                    .push((mv.id, self.remainder_override(mv, not_picked_n_packages, move_uom)?));
            }
        }
        Ok(plan)
    }

    /// 由一筆揀貨分配組出調撥覆寫值
    fn picked_override(
        &self,
        mv: &Move,
        picked: &picker::Picked,
        grouping: Grouping,
        move_uom: &Uom,
    ) -> Result<MoveOverride> {
        let mut values = MoveOverride {
            from_location: Some(picked.location.clone()),
            number_of_packages: Some(picked.number_of_packages),
            ..MoveOverride::default()
        };
        if let Some(key) = &picked.key {
            match grouping {
                Grouping::ProductLot => {
                    values.lot = Some(key.clone());
                    let lot = self.catalog.lot(key)?;
                    if let Some(lot_package) = &lot.package {
                        if mv.package.as_deref() != Some(lot_package.as_str()) {
                            values.package = Some(lot_package.clone());
                        }
                    }
                    let lot_uom = self.catalog.uom(&lot.product_uom)?;
                    values.quantity = Some(Uom::compute_qty(
                        lot_uom,
                        Decimal::from(picked.number_of_packages) * lot.package_qty,
                        move_uom,
                        true,
                    ));
                }
                _ => {
                    values.package = Some(key.clone());
                    if mv.package.as_deref() != Some(key.as_str()) {
                        let package = self.catalog.package(key)?;
                        let package_uom = self.catalog.uom(&package.uom)?;
                        values.quantity = Some(Uom::compute_qty(
                            package_uom,
                            Decimal::from(picked.number_of_packages) * package.qty,
                            move_uom,
                            true,
                        ));
                    }
                }
            }
        }
        // 無鍵（消耗品）或同包裝時，以調撥自身的包裝換算數量
        if values.quantity.is_none() {
            if let Some(package_id) = &mv.package {
                let package = self.catalog.package(package_id)?;
                if package.qty > Decimal::ZERO {
                    let package_uom = self.catalog.uom(&package.uom)?;
                    values.quantity = Some(Uom::compute_qty(
                        package_uom,
                        Decimal::from(picked.number_of_packages) * package.qty,
                        move_uom,
                        true,
                    ));
                }
            }
        }
        Ok(values)
    }

    /// 缺口改寫：剩餘包裝數與其換算數量
    fn remainder_override(
        &self,
        mv: &Move,
        not_picked_n_packages: i64,
        move_uom: &Uom,
    ) -> Result<MoveOverride> {
        let package_id = mv
            .package
            .as_ref()
            .ok_or_else(|| StockError::PackageRequired(mv.id.to_string()))?;
        let package = self.catalog.package(package_id)?;
        let package_uom = self.catalog.uom(&package.uom)?;
        Ok(MoveOverride {
            number_of_packages: Some(not_picked_n_packages),
            quantity: Some(Uom::compute_qty(
                package_uom,
                Decimal::from(not_picked_n_packages) * package.qty,
                move_uom,
                true,
            )),
            ..MoveOverride::default()
        })
    }

    /// 套用揀貨計劃：改寫、建立、分配轉換
    fn apply_plan(moves: &mut Vec<Move>, plan: GroupPlan, outcome: &mut AssignOutcome) {
        for (id, values) in &plan.to_write {
            if let Some(mv) = moves.iter_mut().find(|m| m.id == *id) {
                values.apply_to(mv);
            }
        }
        for sibling in plan.to_create {
            outcome.created.push(sibling.id);
            moves.push(sibling);
        }
        for id in plan.to_assign {
            if let Some(mv) = moves.iter_mut().find(|m| m.id == id) {
                mv.set_assigned();
            }
            outcome.assigned.push(id);
        }
        for shortfall in plan.shortfalls {
            outcome.add_shortfall(shortfall);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{StockLedger, StockRecord};
    use stock_core::{Location, LocationKind, Package, Product};

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, 1).unwrap()
    }

    fn sample_tree() -> LocationTree {
        LocationTree::new()
            .with_location(Location::new("WH", "倉庫", LocationKind::View))
            .with_location(Location::new("WH/A", "A區", LocationKind::Storage).with_parent("WH"))
            .with_location(Location::new("WH/B", "B區", LocationKind::Storage).with_parent("WH"))
            .with_location(Location::new("OUT", "出貨", LocationKind::Customer))
    }

    fn sample_catalog() -> Catalog {
        Catalog::new()
            .with_uom(Uom::unit("unit"))
            .with_product(Product::new("PROD-001", "unit").with_package_required())
            .with_package(Package::new("BOX-12", "PROD-001", Decimal::from(12), "unit"))
    }

    #[test]
    fn test_missing_package_aborts_without_mutation() {
        let tree = sample_tree();
        let catalog = sample_catalog();
        let lock = MoveTableLock::new();
        let ledger =
            StockLedger::new().with_record(StockRecord::new("WH/A", "PROD-001", 10, day()).with_package("BOX-12"));

        let mut moves = vec![
            Move::new("PROD-001", Decimal::from(24), "unit", "WH", "OUT")
                .with_package("BOX-12")
                .with_number_of_packages(2),
            // 要求包裝卻未指定
            Move::new("PROD-001", Decimal::from(12), "unit", "WH", "OUT"),
        ];
        let before = moves.clone();

        let allocator = Allocator::new(&tree, &catalog, &lock);
        let result = allocator.assign_try(&ledger, &mut moves, &AssignOptions::new(day()));

        assert!(matches!(result, Err(StockError::PackageRequired(_))));
        // 整批原封不動
        assert_eq!(moves.len(), before.len());
        for (mv, original) in moves.iter().zip(before.iter()) {
            assert_eq!(mv.state, original.state);
            assert_eq!(mv.number_of_packages, original.number_of_packages);
            assert_eq!(mv.quantity, original.quantity);
        }
    }

    #[test]
    fn test_missing_number_of_packages_aborts() {
        let tree = sample_tree();
        let catalog = sample_catalog();
        let lock = MoveTableLock::new();
        let ledger = StockLedger::new();

        let mut moves = vec![
            Move::new("PROD-001", Decimal::from(24), "unit", "WH", "OUT").with_package("BOX-12"),
        ];

        let allocator = Allocator::new(&tree, &catalog, &lock);
        let result = allocator.assign_try(&ledger, &mut moves, &AssignOptions::new(day()));

        assert!(matches!(
            result,
            Err(StockError::NumberOfPackagesRequired(_))
        ));
    }

    #[test]
    fn test_below_rounding_moves_are_skipped() {
        let tree = sample_tree();
        let catalog = sample_catalog();
        let lock = MoveTableLock::new();
        let ledger = StockLedger::new();

        // 0.001 低於 unit 的捨入精度 0.01，整筆視為已滿足
        let mut moves = vec![Move::new(
            "PROD-001",
            Decimal::new(1, 3),
            "unit",
            "WH",
            "OUT",
        )];

        let allocator = Allocator::new(&tree, &catalog, &lock);
        let outcome = allocator
            .assign_try(&ledger, &mut moves, &AssignOptions::new(day()))
            .unwrap();

        assert!(outcome.success);
        assert_eq!(outcome.skipped, vec![moves[0].id]);
        assert!(moves[0].is_draft());
    }

    #[test]
    fn test_no_package_moves_are_delegated() {
        let tree = sample_tree();
        let catalog = Catalog::new()
            .with_uom(Uom::unit("unit"))
            .with_product(Product::new("PROD-002", "unit"));
        let lock = MoveTableLock::new();
        let ledger = StockLedger::new();

        let mut moves = vec![Move::new(
            "PROD-002",
            Decimal::from(7),
            "unit",
            "WH",
            "OUT",
        )];
        let move_id = moves[0].id;

        let allocator = Allocator::new(&tree, &catalog, &lock);
        let outcome = allocator
            .assign_try(&ledger, &mut moves, &AssignOptions::new(day()))
            .unwrap();

        assert!(outcome.success);
        assert_eq!(outcome.assigned, vec![move_id]);
        assert!(!moves[0].is_draft());
    }

    #[test]
    fn test_public_grouping_is_validated() {
        let tree = sample_tree();
        let catalog = sample_catalog();
        let lock = MoveTableLock::new();
        let ledger = StockLedger::new();

        let allocator = Allocator::new(&tree, &catalog, &lock);
        let options = AssignOptions::new(day()).with_grouping(Grouping::ProductPackage);
        let result = allocator.assign_try(&ledger, &mut Vec::new(), &options);

        assert!(matches!(result, Err(StockError::UnexpectedGrouping)));
    }
}
