// ==========================================
// 车间工单排产系统 - 工单业务 API
// ==========================================
// 职责: 编排仓储与引擎, 提供工单全生命周期操作
// 红线: 状态缓存只在此处经 StatusEngine 刷新; 完工顺延的
//       落库走单事务; 同机台并发完工事件必须由更外层串行化
//       (例如按机台加锁或单写队列), 本层不做跨进程互斥
// ==========================================

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::instrument;
use uuid::Uuid;

use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::OrderValidator;
use crate::domain::machine::Machine;
use crate::domain::order::WorkOrder;
use crate::engine::pause::PauseResumeEngine;
use crate::engine::reschedule::Rescheduler;
use crate::engine::status::StatusEngine;
use crate::repository::{MachineRepository, WorkOrderRepository};

// ==========================================
// 操作结果类型
// ==========================================

/// 工单更新结果
#[derive(Debug)]
pub struct UpdateOutcome {
    pub order: WorkOrder, // 更新后的工单
    pub shifted: usize,   // 被级联顺延的后续工单数
}

/// 恢复拆单结果
#[derive(Debug)]
pub struct ResumeOutcome {
    pub successor: WorkOrder,       // 新建的续单
    pub closed_original: WorkOrder, // 关闭后的原单
}

/// 紧急插单结果
#[derive(Debug)]
pub struct UrgentInsertOutcome {
    pub new_order: WorkOrder,          // 新建的紧急工单
    pub paused_orders: Vec<WorkOrder>, // 被暂停让位的工单
}

// ==========================================
// OrderApi - 工单业务 API
// ==========================================
pub struct OrderApi {
    order_repo: Arc<WorkOrderRepository>,
    machine_repo: Arc<MachineRepository>,
    status_engine: StatusEngine,
    rescheduler: Rescheduler,
    pause_engine: PauseResumeEngine,
    validator: OrderValidator,
}

impl OrderApi {
    pub fn new(order_repo: Arc<WorkOrderRepository>, machine_repo: Arc<MachineRepository>) -> Self {
        Self {
            order_repo,
            machine_repo,
            status_engine: StatusEngine::new(),
            rescheduler: Rescheduler::new(),
            pause_engine: PauseResumeEngine::new(),
            validator: OrderValidator::new(),
        }
    }

    // ==========================================
    // 内部辅助
    // ==========================================

    fn validate_or_reject(&self, order: &WorkOrder) -> ApiResult<()> {
        let errors = self.validator.validate(order);
        if !errors.is_empty() {
            return Err(ApiError::ValidationError(errors.join(", ")));
        }
        Ok(())
    }

    fn ensure_order_no_free(&self, order: &WorkOrder, exclude_self: bool) -> ApiResult<()> {
        let exclude = if exclude_self { Some(order.id.as_str()) } else { None };
        if self
            .order_repo
            .order_no_taken(&order.machine, &order.order_no, exclude)?
        {
            return Err(ApiError::BusinessRuleViolation(
                "工单号已存在，请使用不同的工单号".to_string(),
            ));
        }
        Ok(())
    }

    fn load_order(&self, id: &str) -> ApiResult<WorkOrder> {
        self.order_repo
            .find_by_id(id)?
            .ok_or_else(|| ApiError::NotFound(format!("工单(id={})不存在", id)))
    }

    fn machine_of(&self, name: &str) -> ApiResult<Option<Machine>> {
        Ok(self.machine_repo.find_by_name(name)?)
    }

    /// 刷新一台机台上所有工单的状态缓存, 返回变化数量
    fn refresh_machine_statuses(&self, machine_name: &str, today: NaiveDate) -> ApiResult<usize> {
        let machine = self.machine_of(machine_name)?;
        let mut orders = self.order_repo.list_by_machine(machine_name)?;

        let changed = self
            .status_engine
            .refresh_batch(&mut orders, |_| machine.as_ref(), today);
        if changed > 0 {
            let updates: Vec<_> = orders
                .iter()
                .map(|o| (o.id.clone(), o.status))
                .collect();
            let now = chrono::Utc::now().naive_utc();
            self.order_repo.update_status_batch(&updates, now)?;
        }
        Ok(changed)
    }

    // ==========================================
    // 创建 / 更新 / 删除
    // ==========================================

    /// 创建工单
    #[instrument(skip(self, order), fields(machine = %order.machine, order_no = %order.order_no))]
    pub fn create_order(&self, mut order: WorkOrder, today: NaiveDate) -> ApiResult<WorkOrder> {
        if order.id.trim().is_empty() {
            order.id = Uuid::new_v4().to_string();
        }
        self.validate_or_reject(&order)?;
        self.ensure_order_no_free(&order, false)?;

        let machine = self.machine_of(&order.machine)?;
        order.status = self.status_engine.derive(&order, machine.as_ref(), today);

        self.order_repo.create(&order)?;
        tracing::info!(order_id = %order.id, "工单已创建");
        Ok(order)
    }

    /// 更新工单
    ///
    /// 完工事件 (actual_end_date 从无到有) 且机台开启自动顺延时,
    /// 对同机台后续未完成工单做级联顺延, 全部日期变更单事务落库
    #[instrument(skip(self, updated), fields(order_id = %updated.id))]
    pub fn update_order(&self, mut updated: WorkOrder, today: NaiveDate) -> ApiResult<UpdateOutcome> {
        self.validate_or_reject(&updated)?;
        self.ensure_order_no_free(&updated, true)?;

        let original = self.load_order(&updated.id)?;
        let machine = self.machine_of(&updated.machine)?;

        // 完工事件检测: 本次更新首次写入实际结束日期
        let is_finish_event =
            updated.actual_end_date.is_some() && original.actual_end_date.is_none();

        let mut shifted = 0;
        if is_finish_event {
            let auto_adjust = machine
                .as_ref()
                .map(|m| m.auto_adjust_orders)
                .unwrap_or(false);

            if auto_adjust {
                let open_orders = self.order_repo.list_open_by_machine(&updated.machine)?;

                // 候选筛选阈值取原计划开始日期 (更新可能同时改动了开始日期)
                let mut finished_view = updated.clone();
                finished_view.start_date = original.start_date;

                let shifts = self
                    .rescheduler
                    .cascade(&finished_view, &open_orders, auto_adjust)?;
                shifted = shifts.len();

                if !shifts.is_empty() {
                    let now = chrono::Utc::now().naive_utc();
                    self.order_repo.apply_date_shifts(&shifts, now)?;
                    tracing::info!(
                        order_id = %updated.id,
                        machine = %updated.machine,
                        shifted,
                        "完工顺延已落库"
                    );
                }
            }
        }

        updated.status = self.status_engine.derive(&updated, machine.as_ref(), today);
        updated.updated_at = chrono::Utc::now().naive_utc();
        self.order_repo.update(&updated)?;

        // 顺延改变了后续工单的窗口, 统一刷新本机台状态缓存
        if shifted > 0 {
            self.refresh_machine_statuses(&updated.machine, today)?;
        }

        Ok(UpdateOutcome { order: updated, shifted })
    }

    /// 删除工单
    pub fn delete_order(&self, id: &str) -> ApiResult<()> {
        let affected = self.order_repo.delete(id)?;
        if affected == 0 {
            return Err(ApiError::NotFound(format!("工单(id={})不存在", id)));
        }
        Ok(())
    }

    // ==========================================
    // 暂停 / 恢复 / 紧急插单
    // ==========================================

    /// 暂停工单: 冻结进度快照并置暂停状态
    #[instrument(skip(self), fields(order_id = %id))]
    pub fn pause_order(&self, id: &str, pause_date: NaiveDate, today: NaiveDate) -> ApiResult<WorkOrder> {
        let mut order = self.load_order(id)?;
        let outcome = self.pause_engine.pause_plan(&order, pause_date)?;

        order.is_paused = true;
        order.paused_date = Some(pause_date);
        order.produced_days = Some(outcome.produced_days);
        order.remaining_days = Some(outcome.remaining_days);

        let machine = self.machine_of(&order.machine)?;
        order.status = self.status_engine.derive(&order, machine.as_ref(), today);
        order.updated_at = chrono::Utc::now().naive_utc();

        self.order_repo.update(&order)?;
        Ok(order)
    }

    /// 恢复工单: 生成续单, 原单关闭为暂停完成 (终态)
    #[instrument(skip(self), fields(order_id = %id))]
    pub fn resume_order(&self, id: &str, resume_date: NaiveDate, today: NaiveDate) -> ApiResult<ResumeOutcome> {
        let order = self.load_order(id)?;
        let split = self.pause_engine.resume_split(&order, resume_date)?;
        let mut successor = split.successor;
        let closed_original = split.closed_original;

        self.ensure_order_no_free(&successor, false)?;

        let machine = self.machine_of(&successor.machine)?;
        successor.status = self
            .status_engine
            .derive(&successor, machine.as_ref(), today);

        self.order_repo.create(&successor)?;
        self.order_repo.update(&closed_original)?;

        tracing::info!(
            original_id = %closed_original.id,
            successor_id = %successor.id,
            "恢复拆单完成"
        );
        Ok(ResumeOutcome {
            successor,
            closed_original,
        })
    }

    /// 紧急插单: 创建紧急工单并暂停计划窗口覆盖插单日的在产工单
    #[instrument(skip(self, order), fields(machine = %target_machine))]
    pub fn insert_urgent_order(
        &self,
        mut order: WorkOrder,
        target_machine: &str,
        insert_date: NaiveDate,
        today: NaiveDate,
    ) -> ApiResult<UrgentInsertOutcome> {
        order.machine = target_machine.to_string();
        order.is_urgent = true;
        order.priority = 0;
        if order.id.trim().is_empty() {
            order.id = Uuid::new_v4().to_string();
        }
        self.validate_or_reject(&order)?;
        self.ensure_order_no_free(&order, false)?;

        let machine = self.machine_of(target_machine)?;
        let open_orders = self.order_repo.list_open_by_machine(target_machine)?;
        let conflict_ids: Vec<String> = self
            .pause_engine
            .insertion_conflicts(&open_orders, target_machine, insert_date)
            .into_iter()
            .map(|o| o.id.clone())
            .collect();

        order.status = self.status_engine.derive(&order, machine.as_ref(), today);
        self.order_repo.create(&order)?;

        let mut paused_orders = Vec::with_capacity(conflict_ids.len());
        for conflict_id in conflict_ids {
            paused_orders.push(self.pause_order(&conflict_id, insert_date, today)?);
        }

        tracing::info!(
            order_id = %order.id,
            paused = paused_orders.len(),
            "紧急插单完成"
        );
        Ok(UrgentInsertOutcome {
            new_order: order,
            paused_orders,
        })
    }

    // ==========================================
    // 报工
    // ==========================================

    /// 按日报工: 记入日报并重新累计已报工数量
    #[instrument(skip(self))]
    pub fn report_work(
        &self,
        id: &str,
        date: NaiveDate,
        quantity: i64,
        delay_reason: Option<String>,
    ) -> ApiResult<WorkOrder> {
        if quantity < 0 {
            return Err(ApiError::InvalidInput("报工数量不能为负数".to_string()));
        }

        let mut order = self.load_order(id)?;
        order.daily_reports.insert(date, quantity);
        order.reported_quantity = order.daily_reports.values().sum();
        if let Some(reason) = delay_reason {
            if !reason.trim().is_empty() {
                order.delay_reason = Some(reason);
            }
        }
        order.updated_at = chrono::Utc::now().naive_utc();

        self.order_repo.update(&order)?;
        Ok(order)
    }

    // ==========================================
    // 查询 / 状态刷新
    // ==========================================

    pub fn get_order(&self, id: &str) -> ApiResult<WorkOrder> {
        self.load_order(id)
    }

    pub fn list_orders(&self) -> ApiResult<Vec<WorkOrder>> {
        Ok(self.order_repo.list_all()?)
    }

    pub fn list_orders_by_machine(&self, machine: &str) -> ApiResult<Vec<WorkOrder>> {
        Ok(self.order_repo.list_by_machine(machine)?)
    }

    /// 全量刷新状态缓存 (任何批量变更后调用), 返回状态变化的工单数
    #[instrument(skip(self))]
    pub fn refresh_statuses(&self, today: NaiveDate) -> ApiResult<usize> {
        let machines: HashMap<String, Machine> = self
            .machine_repo
            .list_all()?
            .into_iter()
            .map(|m| (m.name.clone(), m))
            .collect();
        let mut orders = self.order_repo.list_all()?;

        let changed = self
            .status_engine
            .refresh_batch(&mut orders, |name| machines.get(name), today);
        if changed > 0 {
            let updates: Vec<_> = orders
                .iter()
                .map(|o| (o.id.clone(), o.status))
                .collect();
            let now = chrono::Utc::now().naive_utc();
            self.order_repo.update_status_batch(&updates, now)?;
            tracing::debug!(changed, "状态缓存已刷新");
        }
        Ok(changed)
    }
}
