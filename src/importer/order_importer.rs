// ==========================================
// 车间工单排产系统 - 工单粘贴导入
// ==========================================
// 职责: 解析从表格粘贴的制表符分隔文本, 生成待创建工单
// 格式: 机台 工单号 物料编号 物料名称 数量 优先级 开始日期 预计结束日期 [实际结束日期 已报工数量]
// 约束: 全量校验通过才返回工单列表 (任一行违规则整批拒绝, 附行号)
// ==========================================

use chrono::NaiveDate;
use tracing::instrument;
use uuid::Uuid;

use crate::api::validator::OrderValidator;
use crate::domain::order::WorkOrder;
use crate::domain::types::OrderStatus;
use crate::importer::error::{ImportError, ImportResult};

/// 每行最少列数
const MIN_COLUMNS: usize = 8;

// ==========================================
// OrderImporter - 工单粘贴导入器
// ==========================================
pub struct OrderImporter {
    validator: OrderValidator,
}

impl OrderImporter {
    pub fn new() -> Self {
        Self {
            validator: OrderValidator::new(),
        }
    }

    /// 解析粘贴文本为待创建工单列表
    ///
    /// 行号从 1 起计, 错误消息逐行聚合
    #[instrument(skip(self, paste_text))]
    pub fn parse_paste(&self, paste_text: &str) -> ImportResult<Vec<WorkOrder>> {
        let trimmed = paste_text.trim();
        if trimmed.is_empty() {
            return Err(ImportError::NoValidRows);
        }

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .flexible(true)
            .from_reader(trimmed.as_bytes());

        let mut orders = Vec::new();
        let mut errors = Vec::new();

        for (index, record) in reader.records().enumerate() {
            let line_no = index + 1;
            let record = match record {
                Ok(r) => r,
                Err(e) => {
                    errors.push(format!("第{}行: 数据解析失败: {}", line_no, e));
                    continue;
                }
            };

            if record.len() < MIN_COLUMNS {
                errors.push(format!("第{}行: 数据格式不正确，需要至少8列数据", line_no));
                continue;
            }

            match self.parse_record(&record) {
                Ok(order) => {
                    let violations = self.validator.validate(&order);
                    if violations.is_empty() {
                        orders.push(order);
                    } else {
                        errors.push(format!("第{}行: {}", line_no, violations.join(", ")));
                    }
                }
                Err(message) => errors.push(format!("第{}行: {}", line_no, message)),
            }
        }

        if !errors.is_empty() {
            return Err(ImportError::RowErrors { errors });
        }
        if orders.is_empty() {
            return Err(ImportError::NoValidRows);
        }

        tracing::info!(imported = orders.len(), "粘贴导入解析完成");
        Ok(orders)
    }

    // ==========================================
    // 行解析
    // ==========================================

    fn parse_record(&self, record: &csv::StringRecord) -> Result<WorkOrder, String> {
        let cell = |idx: usize| record.get(idx).unwrap_or("").trim().to_string();

        let start_date = parse_date_required(&cell(6), "开始日期")?;
        let expected_end_date = parse_date_optional(&cell(7), "预计结束日期")?;
        let actual_end_date = parse_date_optional(&cell(8), "实际结束日期")?;

        let quantity: i64 = cell(4).parse().unwrap_or(0);
        let priority: i32 = cell(5).parse().unwrap_or(1);
        let reported_quantity: i64 = cell(9).parse().unwrap_or(0);
        let material_no = cell(2);
        let now = chrono::Utc::now().naive_utc();

        Ok(WorkOrder {
            id: Uuid::new_v4().to_string(),
            machine: cell(0),
            order_no: cell(1),
            material_no: if material_no.is_empty() { None } else { Some(material_no) },
            material_name: cell(3),
            quantity,
            reported_quantity,
            priority,
            is_urgent: false,
            start_date,
            expected_end_date,
            delayed_expected_end_date: None,
            actual_end_date,
            is_paused: false,
            paused_date: None,
            resumed_date: None,
            produced_days: None,
            remaining_days: None,
            original_order_id: None,
            delay_reason: None,
            daily_reports: Default::default(),
            status: OrderStatus::NotStarted,
            created_at: now,
            updated_at: now,
        })
    }
}

impl Default for OrderImporter {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_date_required(raw: &str, field: &str) -> Result<NaiveDate, String> {
    if raw.is_empty() {
        return Err(format!("{}不能为空", field));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| format!("{}格式不正确: {}", field, raw))
}

fn parse_date_optional(raw: &str, field: &str) -> Result<Option<NaiveDate>, String> {
    if raw.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| format!("{}格式不正确: {}", field, raw))
}

// ==========================================
// 单元测试
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_parse_valid_rows() {
        let importer = OrderImporter::new();
        let text = "一号机\tWO-001\tM-100\t冷轧板\t100\t1\t2025-03-01\t2025-03-05\n\
                    二号机\tWO-002\tM-200\t热轧卷\t50\t2\t2025-03-02\t2025-03-06\t2025-03-07\t50";

        let orders = importer.parse_paste(text).expect("解析应成功");
        assert_eq!(orders.len(), 2);

        assert_eq!(orders[0].machine, "一号机");
        assert_eq!(orders[0].order_no, "WO-001");
        assert_eq!(orders[0].start_date, d(2025, 3, 1));
        assert_eq!(orders[0].expected_end_date, Some(d(2025, 3, 5)));
        assert_eq!(orders[0].actual_end_date, None);
        assert_eq!(orders[0].status, OrderStatus::NotStarted);

        assert_eq!(orders[1].actual_end_date, Some(d(2025, 3, 7)));
        assert_eq!(orders[1].reported_quantity, 50);
    }

    #[test]
    fn test_too_few_columns_reports_line_number() {
        let importer = OrderImporter::new();
        let text = "一号机\tWO-001\tM-100\t冷轧板\t100\t1\t2025-03-01\t2025-03-05\n\
                    坏行\t只有两列";

        let err = importer.parse_paste(text).unwrap_err();
        match err {
            ImportError::RowErrors { errors } => {
                assert_eq!(errors.len(), 1);
                assert!(errors[0].contains("第2行"), "错误应标注行号");
                assert!(errors[0].contains("至少8列"));
            }
            other => panic!("期望 RowErrors, 实际 {:?}", other),
        }
    }

    #[test]
    fn test_validation_failure_rejects_whole_batch() {
        let importer = OrderImporter::new();
        // 第2行数量为0, 校验不通过 → 整批拒绝
        let text = "一号机\tWO-001\tM-100\t冷轧板\t100\t1\t2025-03-01\t2025-03-05\n\
                    一号机\tWO-002\tM-100\t冷轧板\t0\t1\t2025-03-06\t2025-03-08";

        let err = importer.parse_paste(text).unwrap_err();
        assert!(matches!(err, ImportError::RowErrors { .. }));
    }

    #[test]
    fn test_bad_date_format() {
        let importer = OrderImporter::new();
        let text = "一号机\tWO-001\tM-100\t冷轧板\t100\t1\t2025/03/01\t2025-03-05";

        let err = importer.parse_paste(text).unwrap_err();
        match err {
            ImportError::RowErrors { errors } => {
                assert!(errors[0].contains("开始日期格式不正确"));
            }
            other => panic!("期望 RowErrors, 实际 {:?}", other),
        }
    }

    #[test]
    fn test_empty_input() {
        let importer = OrderImporter::new();
        assert!(matches!(
            importer.parse_paste("   \n  "),
            Err(ImportError::NoValidRows)
        ));
    }
}
