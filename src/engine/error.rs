// ==========================================
// 车间工单排产系统 - 引擎层错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 引擎层错误类型
///
/// 引擎对形态合法的输入一律走兜底规则, 不抛错;
/// 唯一的失败类别是调用方契约违反 (快速失败, 不静默跳过)
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("前置条件违反: {0}")]
    PreconditionViolation(String),

    #[error("无效的工单状态: order_id={order_id}, {message}")]
    InvalidOrderState { order_id: String, message: String },
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;
