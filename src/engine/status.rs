// ==========================================
// 车间工单排产系统 - 工单状态判定引擎
// ==========================================
// 职责: 由工单自身字段 + 机台状态派生显示状态
// 红线: 纯函数, 无 I/O; "今天" 由调用方注入, 禁止内部读系统时钟
// 规则: 按优先级顺序执行, 命中即返回
// ==========================================

use chrono::NaiveDate;
use tracing::instrument;

use crate::domain::machine::Machine;
use crate::domain::order::WorkOrder;
use crate::domain::types::OrderStatus;

// ==========================================
// StatusEngine - 状态判定引擎
// ==========================================
pub struct StatusEngine {
    // 无状态引擎, 不需要注入依赖
}

impl StatusEngine {
    pub fn new() -> Self {
        Self {}
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 派生单个工单的显示状态
    ///
    /// 规则 (优先级递减, 命中即返回):
    /// 1) is_paused → 暂停中
    /// 2) 机台维修中 → 暂停中
    /// 3) 有实际结束日期:
    ///    a. 无预计结束日期 → 正常完成 (无目标无法判定延期)
    ///    b. 实际结束 > 预计结束 → 延期完成, 否则 → 正常完成
    /// 4) 今天 < 开始日期 → 未开始
    /// 5) is_urgent → 紧急生产
    /// 6) 其他 → 生产中
    ///
    /// 边界处理:
    /// - machine 为 None 视为无维修覆盖
    /// - 所有比较均为日历日比较 (NaiveDate, 无时间部分)
    pub fn derive(
        &self,
        order: &WorkOrder,
        machine: Option<&Machine>,
        today: NaiveDate,
    ) -> OrderStatus {
        // 规则1: 手动暂停
        if order.is_paused {
            return OrderStatus::Paused;
        }

        // 规则2: 机台维修覆盖
        if let Some(machine) = machine {
            if machine.is_in_maintenance() {
                return OrderStatus::Paused;
            }
        }

        // 规则3: 已完成 → 判定是否延期
        if let Some(actual_end) = order.actual_end_date {
            return match order.expected_end_date {
                None => OrderStatus::CompletedOnTime,
                Some(expected_end) if actual_end > expected_end => OrderStatus::CompletedLate,
                Some(_) => OrderStatus::CompletedOnTime,
            };
        }

        // 规则4: 未到开始日期
        if today < order.start_date {
            return OrderStatus::NotStarted;
        }

        // 规则5: 紧急工单
        if order.is_urgent {
            return OrderStatus::UrgentProduction;
        }

        // 规则6: 生产中
        OrderStatus::InProduction
    }

    /// 批量刷新工单状态缓存
    ///
    /// 终态工单 (暂停完成) 不参与重算, 其标签由恢复拆单一次性赋值。
    /// 返回状态发生变化的工单数量。
    #[instrument(skip(self, orders, machine_of), fields(count = orders.len()))]
    pub fn refresh_batch<'a, F>(
        &self,
        orders: &mut [WorkOrder],
        machine_of: F,
        today: NaiveDate,
    ) -> usize
    where
        F: Fn(&str) -> Option<&'a Machine>,
    {
        let mut changed = 0;
        for order in orders.iter_mut() {
            if order.status.is_terminal() {
                continue;
            }
            let derived = self.derive(order, machine_of(&order.machine), today);
            if derived != order.status {
                order.status = derived;
                changed += 1;
            }
        }
        changed
    }
}

impl Default for StatusEngine {
    fn default() -> Self {
        Self::new()
    }
}
