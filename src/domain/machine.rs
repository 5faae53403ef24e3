// ==========================================
// 车间工单排产系统 - 机台领域模型
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::MachineStatus;

// ==========================================
// Machine - 机台
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Machine {
    pub name: String,             // 机台名称 (唯一键, 被工单引用)
    pub status: MachineStatus,    // 机台状态 (正常/维修/停机)
    pub auto_adjust_orders: bool, // 完工后是否自动顺延后续工单
    pub oee: f64,                 // 设备综合效率 (估算用途)
    pub coefficient: f64,         // 产能系数 (估算用途)
    pub created_at: NaiveDateTime, // 创建时间
    pub updated_at: NaiveDateTime, // 更新时间
}

impl Machine {
    /// 创建默认配置的机台 (正常状态, 自动顺延开启)
    pub fn new(name: &str) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            name: name.to_string(),
            status: MachineStatus::Normal,
            auto_adjust_orders: true,
            oee: 1.0,
            coefficient: 1.0,
            created_at: now,
            updated_at: now,
        }
    }

    /// 判断是否处于维修状态
    pub fn is_in_maintenance(&self) -> bool {
        self.status == MachineStatus::Maintenance
    }
}
