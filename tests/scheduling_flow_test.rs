// ==========================================
// 完工顺延全流程集成测试
// ==========================================
// 测试范围:
// 1. 完工事件触发级联顺延并单事务落库
// 2. 机台自动顺延开关门控
// 3. 顺延后的状态缓存刷新
// 4. 机台维修对状态派生的覆盖
// ==========================================

mod helpers;

use helpers::test_data_builder::{date, setup_repos, MachineBuilder, OrderBuilder};
use workshop_aps::api::{MachineApi, OrderApi};
use workshop_aps::domain::types::{MachineStatus, OrderStatus};

fn setup_apis() -> (OrderApi, MachineApi) {
    let (order_repo, machine_repo) = setup_repos();
    let order_api = OrderApi::new(order_repo.clone(), machine_repo.clone());
    let machine_api = MachineApi::new(machine_repo);
    (order_api, machine_api)
}

#[test]
fn test_finish_event_cascades_and_persists() {
    let (order_api, machine_api) = setup_apis();
    let today = date(2025, 2, 3);

    machine_api
        .upsert_machine(&MachineBuilder::new("一号机").auto_adjust(true).build())
        .unwrap();

    // 完工单: 原计划 02-01 单日
    let finished = order_api
        .create_order(
            OrderBuilder::new("F", "一号机", "WO-F")
                .window(date(2025, 2, 1), Some(date(2025, 2, 1)))
                .build(),
            today,
        )
        .unwrap();

    // 两个同日开始的候选: 跨度 3 天与 5 天 (按创建顺序平票)
    order_api
        .create_order(
            OrderBuilder::new("A", "一号机", "WO-A")
                .window(date(2025, 2, 5), Some(date(2025, 2, 8)))
                .build(),
            today,
        )
        .unwrap();
    order_api
        .create_order(
            OrderBuilder::new("B", "一号机", "WO-B")
                .window(date(2025, 2, 5), Some(date(2025, 2, 10)))
                .build(),
            today,
        )
        .unwrap();

    // 完工: 实际结束 02-10
    let mut update = finished.clone();
    update.actual_end_date = Some(date(2025, 2, 10));
    let outcome = order_api.update_order(update, today).unwrap();

    assert_eq!(outcome.shifted, 2, "两个后续工单被顺延");

    let a = order_api.get_order("A").unwrap();
    assert_eq!(a.start_date, date(2025, 2, 11), "紧跟完工日次日");
    assert_eq!(a.expected_end_date, Some(date(2025, 2, 14)), "保持3天跨度");

    let b = order_api.get_order("B").unwrap();
    assert_eq!(b.start_date, date(2025, 2, 15), "紧跟前单结束次日");
    assert_eq!(b.expected_end_date, Some(date(2025, 2, 20)), "保持5天跨度");

    // 顺延把 A 推到了未来 → 状态缓存同步刷新为未开始
    assert_eq!(a.status, OrderStatus::NotStarted);
    assert_eq!(b.status, OrderStatus::NotStarted);

    // 完工单自身状态: 02-10 晚于预计 02-01 → 延期完成
    let f = order_api.get_order("F").unwrap();
    assert_eq!(f.status, OrderStatus::CompletedLate);
}

#[test]
fn test_auto_adjust_gate_blocks_cascade() {
    let (order_api, machine_api) = setup_apis();
    let today = date(2025, 2, 3);

    machine_api
        .upsert_machine(&MachineBuilder::new("一号机").auto_adjust(false).build())
        .unwrap();

    let finished = order_api
        .create_order(
            OrderBuilder::new("F", "一号机", "WO-F")
                .window(date(2025, 2, 1), Some(date(2025, 2, 1)))
                .build(),
            today,
        )
        .unwrap();
    order_api
        .create_order(
            OrderBuilder::new("A", "一号机", "WO-A")
                .window(date(2025, 2, 5), Some(date(2025, 2, 8)))
                .build(),
            today,
        )
        .unwrap();

    let mut update = finished.clone();
    update.actual_end_date = Some(date(2025, 2, 10));
    let outcome = order_api.update_order(update, today).unwrap();

    assert_eq!(outcome.shifted, 0, "开关关闭不触发级联");
    let a = order_api.get_order("A").unwrap();
    assert_eq!(a.start_date, date(2025, 2, 5), "后续工单日期保持原样");
}

#[test]
fn test_non_finish_update_does_not_cascade() {
    let (order_api, machine_api) = setup_apis();
    let today = date(2025, 2, 3);

    machine_api
        .upsert_machine(&MachineBuilder::new("一号机").auto_adjust(true).build())
        .unwrap();

    let finished = order_api
        .create_order(
            OrderBuilder::new("F", "一号机", "WO-F")
                .window(date(2025, 2, 1), Some(date(2025, 2, 1)))
                .finished(date(2025, 2, 2))
                .build(),
            today,
        )
        .unwrap();
    order_api
        .create_order(
            OrderBuilder::new("A", "一号机", "WO-A")
                .window(date(2025, 2, 5), Some(date(2025, 2, 8)))
                .build(),
            today,
        )
        .unwrap();

    // 已完成工单的再次编辑不算完工事件
    let mut update = finished.clone();
    update.quantity = 120;
    let outcome = order_api.update_order(update, today).unwrap();
    assert_eq!(outcome.shifted, 0, "非完工转变不触发级联");
}

#[test]
fn test_maintenance_machine_forces_paused_status() {
    let (order_api, machine_api) = setup_apis();
    let today = date(2025, 2, 6);

    machine_api
        .upsert_machine(&MachineBuilder::new("一号机").build())
        .unwrap();

    order_api
        .create_order(
            OrderBuilder::new("A", "一号机", "WO-A")
                .window(date(2025, 2, 5), Some(date(2025, 2, 8)))
                .build(),
            today,
        )
        .unwrap();
    assert_eq!(
        order_api.get_order("A").unwrap().status,
        OrderStatus::InProduction
    );

    // 机台进入维修 → 刷新后工单显示暂停中
    machine_api.set_status("一号机", MachineStatus::Maintenance).unwrap();
    let changed = order_api.refresh_statuses(today).unwrap();
    assert_eq!(changed, 1);
    assert_eq!(order_api.get_order("A").unwrap().status, OrderStatus::Paused);

    // 修复后恢复生产中
    machine_api.set_status("一号机", MachineStatus::Normal).unwrap();
    order_api.refresh_statuses(today).unwrap();
    assert_eq!(
        order_api.get_order("A").unwrap().status,
        OrderStatus::InProduction
    );
}

#[test]
fn test_order_no_unique_rules() {
    let (order_api, machine_api) = setup_apis();
    let today = date(2025, 2, 3);

    machine_api
        .upsert_machine(&MachineBuilder::new("一号机").build())
        .unwrap();

    order_api
        .create_order(OrderBuilder::new("A", "一号机", "WO-1").build(), today)
        .unwrap();

    // 同机台重复工单号被拒绝
    let dup = OrderBuilder::new("B", "一号机", "WO-1")
        .window(date(2025, 3, 10), Some(date(2025, 3, 12)))
        .build();
    assert!(order_api.create_order(dup, today).is_err());

    // 更新时排除自身, 不误报
    let mut self_update = order_api.get_order("A").unwrap();
    self_update.quantity = 150;
    assert!(order_api.update_order(self_update, today).is_ok());
}
