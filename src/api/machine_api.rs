// ==========================================
// 车间工单排产系统 - 机台业务 API
// ==========================================
// 职责: 机台增删改查与状态/顺延开关管理
// ==========================================

use std::sync::Arc;

use tracing::instrument;

use crate::api::error::{ApiError, ApiResult};
use crate::domain::machine::Machine;
use crate::domain::types::MachineStatus;
use crate::engine::takt::{ProductionEstimate, TaktEngine};
use crate::repository::MachineRepository;

// ==========================================
// MachineApi - 机台业务 API
// ==========================================
pub struct MachineApi {
    machine_repo: Arc<MachineRepository>,
    takt_engine: TaktEngine,
}

impl MachineApi {
    pub fn new(machine_repo: Arc<MachineRepository>) -> Self {
        Self {
            machine_repo,
            takt_engine: TaktEngine::new(),
        }
    }

    /// 创建或更新机台
    #[instrument(skip(self, machine), fields(name = %machine.name))]
    pub fn upsert_machine(&self, machine: &Machine) -> ApiResult<()> {
        if machine.name.trim().is_empty() {
            return Err(ApiError::InvalidInput("机台名称不能为空".to_string()));
        }
        self.machine_repo.upsert(machine)?;
        Ok(())
    }

    pub fn get_machine(&self, name: &str) -> ApiResult<Machine> {
        self.machine_repo
            .find_by_name(name)?
            .ok_or_else(|| ApiError::NotFound(format!("机台({})不存在", name)))
    }

    pub fn list_machines(&self) -> ApiResult<Vec<Machine>> {
        Ok(self.machine_repo.list_all()?)
    }

    /// 调整机台状态 (维修中的机台其工单显示为暂停中)
    #[instrument(skip(self))]
    pub fn set_status(&self, name: &str, status: MachineStatus) -> ApiResult<Machine> {
        let mut machine = self.get_machine(name)?;
        machine.status = status;
        machine.updated_at = chrono::Utc::now().naive_utc();
        self.machine_repo.upsert(&machine)?;
        tracing::info!(machine = %name, status = %status, "机台状态已调整");
        Ok(machine)
    }

    /// 调整完工自动顺延开关
    pub fn set_auto_adjust(&self, name: &str, enabled: bool) -> ApiResult<Machine> {
        let mut machine = self.get_machine(name)?;
        machine.auto_adjust_orders = enabled;
        machine.updated_at = chrono::Utc::now().naive_utc();
        self.machine_repo.upsert(&machine)?;
        Ok(machine)
    }

    pub fn delete_machine(&self, name: &str) -> ApiResult<()> {
        let affected = self.machine_repo.delete(name)?;
        if affected == 0 {
            return Err(ApiError::NotFound(format!("机台({})不存在", name)));
        }
        Ok(())
    }

    /// 按物料名称与机台 OEE 估算工单生产时长 (机台缺失按默认 OEE)
    pub fn estimate_production_time(
        &self,
        material_name: &str,
        quantity: i64,
        machine_name: &str,
    ) -> ApiResult<ProductionEstimate> {
        let machine = self.machine_repo.find_by_name(machine_name)?;
        Ok(self
            .takt_engine
            .estimate(material_name, quantity, machine.as_ref()))
    }
}
