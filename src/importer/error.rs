// ==========================================
// 车间工单排产系统 - 导入层错误类型
// ==========================================

use thiserror::Error;

/// 导入层错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("没有找到有效的数据行")]
    NoValidRows,

    #[error("导入失败:\n{}", .errors.join("\n"))]
    RowErrors { errors: Vec<String> },

    #[error("数据解析失败: {0}")]
    ParseError(String),
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
