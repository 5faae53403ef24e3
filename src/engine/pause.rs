// ==========================================
// 车间工单排产系统 - 暂停/恢复拆单引擎
// ==========================================
// 职责: 暂停时冻结进度快照 (已产/剩余天数), 恢复时生成续单,
//       紧急插单时圈定需要让位的在产工单
// 红线: 引擎不做 I/O; 生成的新实体由调用方持久化
// ==========================================

use chrono::{Duration, NaiveDate};
use uuid::Uuid;

use crate::domain::order::WorkOrder;
use crate::domain::types::OrderStatus;
use crate::engine::error::{EngineError, EngineResult};

// ==========================================
// PauseOutcome - 暂停进度快照
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PauseOutcome {
    pub produced_days: i32,  // 已生产天数 (含暂停当日)
    pub remaining_days: i32, // 计划剩余天数
}

// ==========================================
// ResumeSplit - 恢复拆单结果
// ==========================================
#[derive(Debug, Clone)]
pub struct ResumeSplit {
    pub successor: WorkOrder,       // 续单 (新实体, 待创建)
    pub closed_original: WorkOrder, // 关闭后的原单 (待更新)
}

// ==========================================
// PauseResumeEngine - 暂停/恢复拆单引擎
// ==========================================
pub struct PauseResumeEngine {
    // 无状态引擎, 不需要注入依赖
}

impl PauseResumeEngine {
    pub fn new() -> Self {
        Self {}
    }

    // ==========================================
    // 暂停进度快照
    // ==========================================

    /// 计算暂停时的进度快照
    ///
    /// 已产天数 = (暂停日 - 开始日) + 1 (暂停当日计入, 早于开始按 0);
    /// 计划总天数 = (预计结束 - 开始) + 1 (缺失预计结束按单日工单);
    /// 剩余天数 = max(0, 总天数 - 已产天数)
    pub fn pause_plan(&self, order: &WorkOrder, pause_date: NaiveDate) -> EngineResult<PauseOutcome> {
        if order.is_finished() {
            return Err(EngineError::InvalidOrderState {
                order_id: order.id.clone(),
                message: "已完成的工单不能暂停".to_string(),
            });
        }

        let produced_days = ((pause_date - order.start_date).num_days() + 1).max(0) as i32;
        let total_days = (order.planned_duration_days() + 1) as i32;
        let remaining_days = (total_days - produced_days).max(0);

        Ok(PauseOutcome {
            produced_days,
            remaining_days,
        })
    }

    // ==========================================
    // 恢复拆单
    // ==========================================

    /// 恢复暂停工单: 生成续单并关闭原单
    ///
    /// 续单: 数量 = 原数量 - 已报工数量, 开始 = 恢复日,
    ///       预计结束 = 恢复日 + 剩余天数 - 1, 工单号加 "-续" 后缀,
    ///       original_order_id 回指原单;
    /// 原单: status = 暂停完成 (终态), actual_end_date = 暂停日
    pub fn resume_split(&self, order: &WorkOrder, resume_date: NaiveDate) -> EngineResult<ResumeSplit> {
        if !order.is_paused {
            return Err(EngineError::InvalidOrderState {
                order_id: order.id.clone(),
                message: "只有暂停中的工单可以恢复".to_string(),
            });
        }
        let paused_date = order.paused_date.ok_or_else(|| {
            EngineError::PreconditionViolation(format!(
                "暂停工单缺少暂停日期: order_id={}",
                order.id
            ))
        })?;

        // 剩余天数快照缺失时按 1 天兜底
        let remaining_days = order.remaining_days.unwrap_or(1).max(1) as i64;
        let expected_end = resume_date + Duration::days(remaining_days - 1);
        let now = chrono::Utc::now().naive_utc();

        let successor = WorkOrder {
            id: Uuid::new_v4().to_string(),
            machine: order.machine.clone(),
            order_no: format!("{}-续", order.order_no),
            material_no: order.material_no.clone(),
            material_name: order.material_name.clone(),
            quantity: order.quantity - order.reported_quantity,
            reported_quantity: 0,
            priority: order.priority,
            is_urgent: order.is_urgent,
            start_date: resume_date,
            expected_end_date: Some(expected_end),
            delayed_expected_end_date: None,
            actual_end_date: None,
            is_paused: false,
            paused_date: None,
            resumed_date: Some(resume_date),
            produced_days: None,
            remaining_days: None,
            original_order_id: Some(order.id.clone()),
            delay_reason: Some(format!("从工单{}恢复生产", order.order_no)),
            daily_reports: Default::default(),
            status: OrderStatus::InProduction,
            created_at: now,
            updated_at: now,
        };

        let mut closed_original = order.clone();
        closed_original.status = OrderStatus::PausedClosed;
        closed_original.actual_end_date = Some(paused_date);
        closed_original.updated_at = now;

        Ok(ResumeSplit {
            successor,
            closed_original,
        })
    }

    // ==========================================
    // 紧急插单让位圈定
    // ==========================================

    /// 紧急插单时需要暂停让位的工单
    ///
    /// 条件: 同机台 + 未完成 + 计划窗口覆盖插单日期
    /// (计划窗口按 start..=expected_end, 缺失预计结束按单日)
    pub fn insertion_conflicts<'a>(
        &self,
        orders: &'a [WorkOrder],
        machine_name: &str,
        insert_date: NaiveDate,
    ) -> Vec<&'a WorkOrder> {
        orders
            .iter()
            .filter(|order| {
                let planned_end = order.expected_end_date.unwrap_or(order.start_date);
                order.machine == machine_name
                    && !order.is_finished()
                    && order.start_date <= insert_date
                    && planned_end >= insert_date
            })
            .collect()
    }
}

impl Default for PauseResumeEngine {
    fn default() -> Self {
        Self::new()
    }
}
