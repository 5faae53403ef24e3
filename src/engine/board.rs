// ==========================================
// 车间工单排产系统 - 甘特条展示引擎
// ==========================================
// 职责: 计算工单在甘特图上的展示信息 (条形窗口、完成/延期标记、配色桶)
// 说明: 只产出类型化标记, 具体配色由前端映射
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::order::WorkOrder;

/// 优先级循环配色桶数量
pub const PRIORITY_PALETTE_SIZE: u8 = 8;

// ==========================================
// ColorBucket - 甘特条配色桶
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "index", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ColorBucket {
    Completed,     // 已完成 (覆盖其他配色)
    Paused,        // 暂停中
    Urgent,        // 紧急
    Priority(u8),  // 按优先级循环取色 (0..PRIORITY_PALETTE_SIZE)
}

// ==========================================
// OrderDisplayInfo - 甘特条展示信息
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDisplayInfo {
    pub start_date: NaiveDate,                        // 条形起点
    pub end_date: NaiveDate,                          // 条形终点 (有效结束日期)
    pub expected_end_date: Option<NaiveDate>,         // 原预计结束
    pub delayed_expected_end_date: Option<NaiveDate>, // 延期预计结束
    pub actual_end_date: Option<NaiveDate>,           // 实际结束
    pub is_completed: bool,                           // 是否已完成
    pub is_delayed: bool,                             // 是否延期完成
    pub is_delayed_planned: bool,                     // 是否设置了延期计划
    pub is_paused: bool,                              // 是否暂停
    pub is_urgent: bool,                              // 是否紧急
    pub delayed_days: i64,                            // 延期天数 (未延期为 0)
    pub color: ColorBucket,                           // 配色桶
}

// ==========================================
// BoardEngine - 甘特条展示引擎
// ==========================================
pub struct BoardEngine {
    // 无状态引擎, 不需要注入依赖
}

impl BoardEngine {
    pub fn new() -> Self {
        Self {}
    }

    /// 计算工单的甘特条展示信息
    ///
    /// 配色优先级: 已完成 > 暂停 > 紧急 > 优先级循环色
    pub fn display_info(&self, order: &WorkOrder) -> OrderDisplayInfo {
        let is_completed = order.is_finished();

        let is_delayed = match (order.actual_end_date, order.expected_end_date) {
            (Some(actual), Some(expected)) => actual > expected,
            _ => false,
        };
        let delayed_days = match (order.actual_end_date, order.expected_end_date) {
            (Some(actual), Some(expected)) if actual > expected => (actual - expected).num_days(),
            _ => 0,
        };

        let color = if is_completed {
            ColorBucket::Completed
        } else if order.is_paused {
            ColorBucket::Paused
        } else if order.is_urgent {
            ColorBucket::Urgent
        } else {
            // priority 从 1 起编号, 0 保留给紧急工单
            let slot = (order.priority - 1).rem_euclid(PRIORITY_PALETTE_SIZE as i32) as u8;
            ColorBucket::Priority(slot)
        };

        OrderDisplayInfo {
            start_date: order.start_date,
            end_date: order.effective_end_date(),
            expected_end_date: order.expected_end_date,
            delayed_expected_end_date: order.delayed_expected_end_date,
            actual_end_date: order.actual_end_date,
            is_completed,
            is_delayed,
            is_delayed_planned: order.delayed_expected_end_date.is_some(),
            is_paused: order.is_paused,
            is_urgent: order.is_urgent,
            delayed_days,
            color,
        }
    }
}

impl Default for BoardEngine {
    fn default() -> Self {
        Self::new()
    }
}
