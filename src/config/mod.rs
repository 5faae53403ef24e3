// ==========================================
// 车间工单排产系统 - 配置层
// ==========================================
// 职责: 数据库路径等运行配置解析
// ==========================================

use std::path::PathBuf;

/// 应用数据目录名
const APP_DIR_NAME: &str = "workshop-aps";

/// 默认数据库文件名
const DB_FILE_NAME: &str = "workshop.db";

/// 解析默认数据库路径
///
/// 优先级:
/// 1) 环境变量 WORKSHOP_APS_DB
/// 2) 系统数据目录下的 workshop-aps/workshop.db
/// 3) 当前目录兜底
pub fn get_default_db_path() -> String {
    if let Ok(path) = std::env::var("WORKSHOP_APS_DB") {
        if !path.trim().is_empty() {
            return path;
        }
    }

    let base: PathBuf = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
    let dir = base.join(APP_DIR_NAME);
    if let Err(e) = std::fs::create_dir_all(&dir) {
        tracing::warn!("创建数据目录失败: {}, 回退到当前目录", e);
        return DB_FILE_NAME.to_string();
    }

    dir.join(DB_FILE_NAME).to_string_lossy().to_string()
}
