// ==========================================
// 车间工单排产系统 - 领域类型定义
// ==========================================
// 约束: 状态标签与持久化存储/前端契约一致 (中文标签)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 工单状态 (Order Status)
// ==========================================
// 红线: status 是派生缓存, 只由 StatusEngine 写入
// 例外: 暂停完成 为终态, 由恢复拆单关闭原单时一次性赋值
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    #[serde(rename = "未开始")]
    NotStarted, // 未开始
    #[serde(rename = "生产中")]
    InProduction, // 生产中
    #[serde(rename = "紧急生产")]
    UrgentProduction, // 紧急生产
    #[serde(rename = "暂停中")]
    Paused, // 暂停中
    #[serde(rename = "正常完成")]
    CompletedOnTime, // 正常完成
    #[serde(rename = "延期完成")]
    CompletedLate, // 延期完成
    #[serde(rename = "暂停完成")]
    PausedClosed, // 暂停完成 (终态)
}

impl OrderStatus {
    /// 转换为存储标签
    pub fn as_label(&self) -> &'static str {
        match self {
            OrderStatus::NotStarted => "未开始",
            OrderStatus::InProduction => "生产中",
            OrderStatus::UrgentProduction => "紧急生产",
            OrderStatus::Paused => "暂停中",
            OrderStatus::CompletedOnTime => "正常完成",
            OrderStatus::CompletedLate => "延期完成",
            OrderStatus::PausedClosed => "暂停完成",
        }
    }

    /// 从存储标签解析
    pub fn from_label(s: &str) -> Self {
        match s {
            "生产中" => OrderStatus::InProduction,
            "紧急生产" => OrderStatus::UrgentProduction,
            "暂停中" => OrderStatus::Paused,
            "正常完成" => OrderStatus::CompletedOnTime,
            "延期完成" => OrderStatus::CompletedLate,
            "暂停完成" => OrderStatus::PausedClosed,
            _ => OrderStatus::NotStarted, // 默认值
        }
    }

    /// 判断是否为终态 (不再参与状态重算)
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::PausedClosed)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_label())
    }
}

// ==========================================
// 机台状态 (Machine Status)
// ==========================================
// 维修中的机台强制其所有工单显示为暂停中
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MachineStatus {
    #[serde(rename = "正常")]
    Normal, // 正常
    #[serde(rename = "维修")]
    Maintenance, // 维修
    #[serde(rename = "停机")]
    Stopped, // 停机
}

impl MachineStatus {
    /// 转换为存储标签
    pub fn as_label(&self) -> &'static str {
        match self {
            MachineStatus::Normal => "正常",
            MachineStatus::Maintenance => "维修",
            MachineStatus::Stopped => "停机",
        }
    }

    /// 从存储标签解析
    pub fn from_label(s: &str) -> Self {
        match s {
            "维修" => MachineStatus::Maintenance,
            "停机" => MachineStatus::Stopped,
            _ => MachineStatus::Normal, // 默认值
        }
    }
}

impl fmt::Display for MachineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_label())
    }
}
