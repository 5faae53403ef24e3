// ==========================================
// 车间工单排产系统 - 工单领域模型
// ==========================================
// 红线: status 为派生缓存, 不得被业务操作直接改写
// ==========================================

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::types::OrderStatus;

// ==========================================
// WorkOrder - 工单
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkOrder {
    pub id: String,                                  // 工单ID (UUID)
    pub machine: String,                             // 机台名称 (外键引用)
    pub order_no: String,                            // 工单号 (机台内唯一)
    pub material_no: Option<String>,                 // 物料编号
    pub material_name: String,                       // 物料名称
    pub quantity: i64,                               // 计划数量
    pub reported_quantity: i64,                      // 已报工数量 (按日累计)
    pub priority: i32,                               // 优先级 (>=1, 0 保留给紧急工单)
    pub is_urgent: bool,                             // 紧急工单标志 (排序优先于优先级)
    pub start_date: NaiveDate,                       // 计划开始日期
    pub expected_end_date: Option<NaiveDate>,        // 预计结束日期 (缺失 = 单日工单)
    pub delayed_expected_end_date: Option<NaiveDate>, // 延期预计结束日期 (覆盖显示窗口)
    pub actual_end_date: Option<NaiveDate>,          // 实际结束日期 (有值 = 已完成)
    pub is_paused: bool,                             // 暂停标志
    pub paused_date: Option<NaiveDate>,              // 暂停日期
    pub resumed_date: Option<NaiveDate>,             // 恢复日期
    pub produced_days: Option<i32>,                  // 暂停时已生产天数 (快照)
    pub remaining_days: Option<i32>,                 // 暂停时剩余天数 (快照)
    pub original_order_id: Option<String>,           // 恢复拆单的原工单ID (弱引用)
    pub delay_reason: Option<String>,                // 延期/备注原因
    pub daily_reports: BTreeMap<NaiveDate, i64>,     // 日报工记录 (日期 -> 数量)
    pub status: OrderStatus,                         // 派生状态缓存
    pub created_at: NaiveDateTime,                   // 创建时间
    pub updated_at: NaiveDateTime,                   // 更新时间
}

impl WorkOrder {
    /// 显示用有效结束日期
    ///
    /// 优先级: actual_end_date > delayed_expected_end_date > expected_end_date > start_date
    pub fn effective_end_date(&self) -> NaiveDate {
        self.actual_end_date
            .or(self.delayed_expected_end_date)
            .or(self.expected_end_date)
            .unwrap_or(self.start_date)
    }

    /// 计划窗口天数跨度 (end - start)
    ///
    /// expected_end_date 缺失按单日工单处理 (跨度 0);
    /// 异常数据 (expected < start) 按 0 兜底, 保证窗口非负
    pub fn planned_duration_days(&self) -> i64 {
        match self.expected_end_date {
            Some(end) => (end - self.start_date).num_days().max(0),
            None => 0,
        }
    }

    /// 判断是否已完成 (存在实际结束日期)
    pub fn is_finished(&self) -> bool {
        self.actual_end_date.is_some()
    }

    /// 判断指定日期是否落在工单显示窗口内 [start, effective_end]
    pub fn occupies(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.effective_end_date()
    }
}
