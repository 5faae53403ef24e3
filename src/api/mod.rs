// ==========================================
// 车间工单排产系统 - API 层
// ==========================================
// 职责: 提供业务 API 接口, 供上层 HTTP/桌面命令调用
// ==========================================

pub mod board_api;
pub mod error;
pub mod machine_api;
pub mod order_api;
pub mod validator;

// 重导出核心类型
pub use board_api::{BoardApi, CellOrderView};
pub use error::{ApiError, ApiResult};
pub use machine_api::MachineApi;
pub use order_api::{OrderApi, ResumeOutcome, UpdateOutcome, UrgentInsertOutcome};
pub use validator::OrderValidator;
