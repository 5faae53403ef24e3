// ==========================================
// 车间工单排产系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 工单排程引擎 (状态派生 + 完工顺延 + 甘特看板)
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "zh-CN");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 业务规则
pub mod engine;

// 导入层 - 外部数据
pub mod importer;

// 配置层 - 运行配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 业务接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{MachineStatus, OrderStatus};

// 领域实体
pub use domain::{Machine, WorkOrder};

// 引擎
pub use engine::{
    BoardEngine, CalendarEngine, ColorBucket, DateShift, OrderDisplayInfo, PauseResumeEngine,
    Rescheduler, StatusEngine, TaktEngine,
};

// API
pub use api::{BoardApi, MachineApi, OrderApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "车间工单排产系统";
