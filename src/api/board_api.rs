// ==========================================
// 车间工单排产系统 - 甘特看板查询 API
// ==========================================
// 职责: 为甘特图/报表提供日历范围与单元格内容
// 说明: 单元格内的状态为实时派生值, 不读缓存列
// ==========================================

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiResult;
use crate::domain::types::OrderStatus;
use crate::engine::board::{BoardEngine, OrderDisplayInfo};
use crate::engine::calendar::CalendarEngine;
use crate::engine::status::StatusEngine;
use crate::repository::{MachineRepository, WorkOrderRepository};

// ==========================================
// CellOrderView - 单元格内的工单视图
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CellOrderView {
    pub order_id: String,            // 工单ID
    pub order_no: String,            // 工单号
    pub status: OrderStatus,         // 实时派生状态
    pub is_delayed_portion: bool,    // 该日期是否落在延期区段
    pub display: OrderDisplayInfo,   // 甘特条展示信息
}

// ==========================================
// BoardApi - 甘特看板查询 API
// ==========================================
pub struct BoardApi {
    order_repo: Arc<WorkOrderRepository>,
    machine_repo: Arc<MachineRepository>,
    calendar_engine: CalendarEngine,
    board_engine: BoardEngine,
    status_engine: StatusEngine,
}

impl BoardApi {
    pub fn new(order_repo: Arc<WorkOrderRepository>, machine_repo: Arc<MachineRepository>) -> Self {
        Self {
            order_repo,
            machine_repo,
            calendar_engine: CalendarEngine::new(),
            board_engine: BoardEngine::new(),
            status_engine: StatusEngine::new(),
        }
    }

    /// 覆盖全部工单的日历日期序列 (工单集为空时返回固定兜底窗口)
    pub fn date_range(&self) -> ApiResult<Vec<NaiveDate>> {
        let orders = self.order_repo.list_all()?;
        Ok(self.calendar_engine.generate_date_range(&orders))
    }

    /// 机台×日期单元格上的工单, 按展示顺序 (紧急最前, 再按优先级)
    pub fn cells_for(
        &self,
        machine_name: &str,
        date: NaiveDate,
        today: NaiveDate,
    ) -> ApiResult<Vec<CellOrderView>> {
        let machine = self.machine_repo.find_by_name(machine_name)?;
        let orders = self.order_repo.list_by_machine(machine_name)?;

        let views = self
            .calendar_engine
            .orders_on_cell(&orders, machine_name, date)
            .into_iter()
            .map(|order| CellOrderView {
                order_id: order.id.clone(),
                order_no: order.order_no.clone(),
                status: if order.status.is_terminal() {
                    order.status
                } else {
                    self.status_engine.derive(order, machine.as_ref(), today)
                },
                is_delayed_portion: self.calendar_engine.is_in_delayed_portion(order, date),
                display: self.board_engine.display_info(order),
            })
            .collect();

        Ok(views)
    }
}
