// ==========================================
// 车间工单排产系统 - 主入口
// ==========================================
// 用途: 初始化日志与数据库, 刷新状态缓存并输出存量概况;
//       业务接口由上层服务挂接 OrderApi/MachineApi/BoardApi 提供
// ==========================================

use std::sync::Arc;

use workshop_aps::api::{BoardApi, MachineApi, OrderApi};
use workshop_aps::config::get_default_db_path;
use workshop_aps::repository::{MachineRepository, WorkOrderRepository};
use workshop_aps::{i18n, logging};

fn main() -> anyhow::Result<()> {
    // 初始化日志系统
    logging::init();
    i18n::set_locale("zh-CN");

    tracing::info!("==================================================");
    tracing::info!("{}", workshop_aps::APP_NAME);
    tracing::info!("系统版本: {}", workshop_aps::VERSION);
    tracing::info!("==================================================");

    // 获取数据库路径
    let db_path = get_default_db_path();
    tracing::info!("使用数据库: {}", db_path);

    // 初始化仓储 (自动建表)
    let order_repo = Arc::new(WorkOrderRepository::new(&db_path)?);
    let machine_repo = Arc::new(MachineRepository::new(&db_path)?);

    let order_api = OrderApi::new(Arc::clone(&order_repo), Arc::clone(&machine_repo));
    let machine_api = MachineApi::new(Arc::clone(&machine_repo));
    let board_api = BoardApi::new(Arc::clone(&order_repo), Arc::clone(&machine_repo));

    // "今天" 在进程边界取一次, 注入到所有派生逻辑
    let today = chrono::Local::now().date_naive();
    let refreshed = order_api.refresh_statuses(today)?;

    let machines = machine_api.list_machines()?;
    let orders = order_api.list_orders()?;
    let range = board_api.date_range()?;

    tracing::info!(
        machines = machines.len(),
        orders = orders.len(),
        refreshed,
        "存量概况"
    );
    if let (Some(first), Some(last)) = (range.first(), range.last()) {
        tracing::info!(from = %first, to = %last, "甘特日历范围");
    }
    tracing::info!("{}", i18n::t("common.success"));

    Ok(())
}
