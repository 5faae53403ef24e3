// ==========================================
// 测试数据构建器 - 用于集成测试
// ==========================================

use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, Utc};
use workshop_aps::db::open_sqlite_connection;
use workshop_aps::domain::machine::Machine;
use workshop_aps::domain::order::WorkOrder;
use workshop_aps::domain::types::{MachineStatus, OrderStatus};
use workshop_aps::repository::{MachineRepository, WorkOrderRepository};

// ==========================================
// 共享内存库
// ==========================================

/// 打开共享的内存库并在其上初始化两个仓储
pub fn setup_repos() -> (Arc<WorkOrderRepository>, Arc<MachineRepository>) {
    let conn = open_sqlite_connection(":memory:").expect("打开内存库失败");
    let conn = Arc::new(Mutex::new(conn));
    let order_repo =
        WorkOrderRepository::from_connection(Arc::clone(&conn)).expect("初始化工单仓储失败");
    let machine_repo =
        MachineRepository::from_connection(conn).expect("初始化机台仓储失败");
    (Arc::new(order_repo), Arc::new(machine_repo))
}

/// 打开临时文件库 (验证落盘路径)
pub fn setup_file_repos() -> (
    tempfile::NamedTempFile,
    Arc<WorkOrderRepository>,
    Arc<MachineRepository>,
) {
    let temp = tempfile::NamedTempFile::new().expect("创建临时文件失败");
    let path = temp.path().to_string_lossy().to_string();
    let conn = open_sqlite_connection(&path).expect("打开临时库失败");
    let conn = Arc::new(Mutex::new(conn));
    let order_repo =
        WorkOrderRepository::from_connection(Arc::clone(&conn)).expect("初始化工单仓储失败");
    let machine_repo =
        MachineRepository::from_connection(conn).expect("初始化机台仓储失败");
    (temp, Arc::new(order_repo), Arc::new(machine_repo))
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// ==========================================
// WorkOrder 构建器
// ==========================================

pub struct OrderBuilder {
    order: WorkOrder,
}

impl OrderBuilder {
    pub fn new(id: &str, machine: &str, order_no: &str) -> Self {
        let now = Utc::now().naive_utc();
        Self {
            order: WorkOrder {
                id: id.to_string(),
                machine: machine.to_string(),
                order_no: order_no.to_string(),
                material_no: Some("M-100".to_string()),
                material_name: "冷轧板".to_string(),
                quantity: 100,
                reported_quantity: 0,
                priority: 1,
                is_urgent: false,
                start_date: date(2025, 3, 1),
                expected_end_date: Some(date(2025, 3, 5)),
                delayed_expected_end_date: None,
                actual_end_date: None,
                is_paused: false,
                paused_date: None,
                resumed_date: None,
                produced_days: None,
                remaining_days: None,
                original_order_id: None,
                delay_reason: None,
                daily_reports: Default::default(),
                status: OrderStatus::NotStarted,
                created_at: now,
                updated_at: now,
            },
        }
    }

    pub fn window(mut self, start: NaiveDate, end: Option<NaiveDate>) -> Self {
        self.order.start_date = start;
        self.order.expected_end_date = end;
        self
    }

    pub fn delayed_end(mut self, end: NaiveDate) -> Self {
        self.order.delayed_expected_end_date = Some(end);
        self
    }

    pub fn finished(mut self, actual_end: NaiveDate) -> Self {
        self.order.actual_end_date = Some(actual_end);
        self
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.order.priority = priority;
        self
    }

    pub fn urgent(mut self) -> Self {
        self.order.is_urgent = true;
        self.order.priority = 0;
        self
    }

    pub fn quantity(mut self, quantity: i64) -> Self {
        self.order.quantity = quantity;
        self
    }

    pub fn build(self) -> WorkOrder {
        self.order
    }
}

// ==========================================
// Machine 构建器
// ==========================================

pub struct MachineBuilder {
    machine: Machine,
}

impl MachineBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            machine: Machine::new(name),
        }
    }

    pub fn status(mut self, status: MachineStatus) -> Self {
        self.machine.status = status;
        self
    }

    pub fn auto_adjust(mut self, enabled: bool) -> Self {
        self.machine.auto_adjust_orders = enabled;
        self
    }

    pub fn build(self) -> Machine {
        self.machine
    }
}
