//! 包裝數量分配完整範例
//!
//! 展示從庫存快照到調撥拆分的完整分配流程

use chrono::NaiveDate;
use rust_decimal::Decimal;
use stock_alloc::{Allocator, AssignOptions, MoveTableLock, StockLedger, StockRecord};
use stock_core::*;

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    println!("===== Number of Packages Assignment Example =====\n");

    // 步驟 1: 建立庫位樹
    println!("[1] Create Location Tree");
    let tree = LocationTree::new()
        .with_location(Location::new("WH", "倉庫", LocationKind::View))
        .with_location(Location::new("WH/A", "A區", LocationKind::Storage).with_parent("WH"))
        .with_location(Location::new("WH/B", "B區", LocationKind::Storage).with_parent("WH"))
        .with_location(Location::new("OUT", "客戶", LocationKind::Customer));
    println!("    WH -> WH/A, WH/B | OUT\n");

    // 步驟 2: 建立主檔
    println!("[2] Create Master Data");
    let catalog = Catalog::new()
        .with_uom(Uom::unit("unit"))
        .with_product(
            Product::new("WIDGET", "unit")
                .with_package_required()
                .with_lot_required(vec![LocationKind::Customer]),
        )
        .with_package(Package::new("BOX-12", "WIDGET", Decimal::from(12), "unit"))
        .with_package(Package::new("BOX-4", "WIDGET", Decimal::from(4), "unit"))
        .with_lot(
            Lot::new("LOT-A", "WIDGET", Decimal::from(4), "unit")
                .with_package("BOX-4")
                .with_multiplier(3),
        )
        .with_lot(Lot::new("LOT-B", "WIDGET", Decimal::from(12), "unit").with_package("BOX-12"));
    println!("    WIDGET: package required, lot required for customer");
    println!("    LOT-A: multiplier 3 (3 packages supply 1 default package)");
    println!("    LOT-B: no conversion\n");

    // 步驟 3: 在庫包裝數
    println!("[3] On-hand Packages");
    let as_of = NaiveDate::from_ymd_opt(2025, 11, 1).ok_or("無效的日期")?;
    let ledger = StockLedger::new()
        .with_record(StockRecord::new("WH/A", "WIDGET", 6, as_of).with_lot("LOT-A"))
        .with_record(StockRecord::new("WH/B", "WIDGET", 40, as_of).with_lot("LOT-B"));
    println!("    WH/A: 6 packages of LOT-A");
    println!("    WH/B: 40 packages of LOT-B");
    println!(
        "    Normalized at WH/A: {}",
        ledger.normalized_number_of_packages(&catalog, "WH/A", "WIDGET", as_of)?
    );
    println!(
        "    Normalized at WH/B: {}\n",
        ledger.normalized_number_of_packages(&catalog, "WH/B", "WIDGET", as_of)?
    );

    // 步驟 4: 建立調撥
    println!("[4] Create Draft Moves");
    let mut moves = vec![
        Move::new("WIDGET", Decimal::from(120), "unit", "WH", "OUT")
            .with_package("BOX-12")
            .with_number_of_packages(10)
            .with_origin("SO-001"),
    ];
    println!("    SO-001: 10 normalized packages from WH to OUT\n");

    // 步驟 5: 執行分配
    println!("[5] Execute Assignment");
    let lock = MoveTableLock::new();
    let allocator = Allocator::new(&tree, &catalog, &lock);
    let outcome = allocator.assign_try(&ledger, &mut moves, &AssignOptions::new(as_of))?;
    println!(
        "    Completed in {} ms\n",
        outcome.calculation_time_ms.unwrap_or(0)
    );

    // 步驟 6: 顯示結果
    println!("[6] Assignment Results");
    println!("    Success: {}", outcome.success);
    println!("    Assigned: {}", outcome.assigned.len());
    println!("    Created siblings: {}", outcome.created.len());
    for shortfall in &outcome.shortfalls {
        println!(
            "    Shortfall: move {} missing {} packages",
            shortfall.move_id,
            shortfall.missing()
        );
    }
    println!();

    for mv in &moves {
        println!(
            "    {:?} | {} | lot {:?} | package {:?} | {} packages | qty {}",
            mv.state,
            mv.from_location,
            mv.lot,
            mv.package,
            mv.number_of_packages.unwrap_or(0),
            mv.quantity
        );
    }
    println!();

    println!("    Moves as JSON:");
    println!("{}", serde_json::to_string_pretty(&moves)?);

    println!("\n===== Assignment Complete =====\n");

    Ok(())
}
