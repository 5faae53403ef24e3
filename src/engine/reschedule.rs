// ==========================================
// 车间工单排产系统 - 完工顺延引擎
// ==========================================
// 职责: 工单提前/延后完工时, 对同机台后续未完成工单做级联顺延,
//       保持每单计划时长不变, 消除空档与重叠
// 红线: 引擎不做 I/O; 产出的日期变更由调用方在单个事务内持久化
// ==========================================

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::domain::order::WorkOrder;
use crate::engine::error::{EngineError, EngineResult};

// ==========================================
// DateShift - 单个工单的日期变更
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateShift {
    pub order_id: String,          // 工单ID
    pub new_start_date: NaiveDate, // 新开始日期
    pub new_end_date: NaiveDate,   // 新预计结束日期
}

// ==========================================
// Rescheduler - 完工顺延引擎
// ==========================================
pub struct Rescheduler {
    // 无状态引擎, 不需要注入依赖
}

impl Rescheduler {
    pub fn new() -> Self {
        Self {}
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 完工事件级联顺延
    ///
    /// 算法:
    /// 1) 候选 = 同机台 + 未完成 + 非本单 + start_date >= 完工单的原开始日期
    /// 2) 按 start_date 升序稳定排序 (同日保持输入顺序)
    /// 3) 以 cursor = 完工单实际结束日期 游走:
    ///    新开始 = cursor + 1 天, 新结束 = 新开始 + 原计划跨度, cursor = 新结束
    ///
    /// # 参数
    /// - `finished`: 刚完工的工单 (必须已设置 actual_end_date)
    /// - `open_orders`: 同机台全部未完成工单
    /// - `auto_adjust`: 机台级顺延开关 (关闭则返回空列表)
    ///
    /// # 返回
    /// - `Ok(Vec<DateShift>)`: 每个受影响工单的新日期, 按链条顺序
    /// - `Err(PreconditionViolation)`: 完工单缺少实际结束日期 (调用方契约违反)
    #[instrument(skip(self, finished, open_orders), fields(order_id = %finished.id, candidates = open_orders.len()))]
    pub fn cascade(
        &self,
        finished: &WorkOrder,
        open_orders: &[WorkOrder],
        auto_adjust: bool,
    ) -> EngineResult<Vec<DateShift>> {
        let actual_end = finished.actual_end_date.ok_or_else(|| {
            EngineError::PreconditionViolation(format!(
                "完工顺延要求工单已设置实际结束日期: order_id={}",
                finished.id
            ))
        })?;

        // 机台级开关: 由调用方从机台配置读出后传入
        if !auto_adjust {
            return Ok(Vec::new());
        }

        // Step 1: 筛选候选工单
        let mut candidates: Vec<&WorkOrder> = open_orders
            .iter()
            .filter(|order| {
                order.machine == finished.machine
                    && order.actual_end_date.is_none()
                    && order.id != finished.id
                    && order.start_date >= finished.start_date
            })
            .collect();

        // Step 2: 按开始日期升序, 稳定排序保持同日输入顺序
        candidates.sort_by_key(|order| order.start_date);

        // Step 3: 以实际结束日期为游标逐单顺延
        let mut shifts = Vec::with_capacity(candidates.len());
        let mut cursor = actual_end;

        for candidate in candidates {
            let duration_days = candidate.planned_duration_days();
            let new_start = cursor + Duration::days(1);
            let new_end = new_start + Duration::days(duration_days);

            shifts.push(DateShift {
                order_id: candidate.id.clone(),
                new_start_date: new_start,
                new_end_date: new_end,
            });

            cursor = new_end;
        }

        if !shifts.is_empty() {
            tracing::debug!(
                machine = %finished.machine,
                shifted = shifts.len(),
                cascade_end = %cursor,
                "完工顺延计算完成"
            );
        }

        Ok(shifts)
    }
}

impl Default for Rescheduler {
    fn default() -> Self {
        Self::new()
    }
}
