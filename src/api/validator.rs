// ==========================================
// 车间工单排产系统 - 工单校验器
// ==========================================
// 职责: 工单字段规则校验, 聚合全部违规后一次性报告
// ==========================================

use crate::domain::order::WorkOrder;

// ==========================================
// OrderValidator - 工单校验器
// ==========================================
pub struct OrderValidator {
    // 无状态校验器
}

impl OrderValidator {
    pub fn new() -> Self {
        Self {}
    }

    /// 校验工单字段
    ///
    /// 规则:
    /// - 机台/工单号/物料名称不能为空
    /// - 数量必须大于0
    /// - 开始日期不能晚于预计结束日期
    /// - 实际结束日期不能早于开始日期
    /// - 优先级 >= 1 (0 保留给紧急工单)
    ///
    /// 返回全部违规消息; 空列表表示通过
    pub fn validate(&self, order: &WorkOrder) -> Vec<String> {
        let mut errors = Vec::new();

        if order.machine.trim().is_empty() {
            errors.push("机台不能为空".to_string());
        }
        if order.order_no.trim().is_empty() {
            errors.push("工单号不能为空".to_string());
        }
        if order.material_name.trim().is_empty() {
            errors.push("物料名称不能为空".to_string());
        }
        if order.quantity <= 0 {
            errors.push("数量必须大于0".to_string());
        }
        if let Some(expected_end) = order.expected_end_date {
            if order.start_date > expected_end {
                errors.push("开始日期不能晚于预计结束日期".to_string());
            }
        }
        if let Some(actual_end) = order.actual_end_date {
            if actual_end < order.start_date {
                errors.push("实际结束日期不能早于开始日期".to_string());
            }
        }
        // 延期计划是"更晚的修订计划", 不得早于原计划窗口
        if let Some(delayed_end) = order.delayed_expected_end_date {
            let floor = order.expected_end_date.unwrap_or(order.start_date);
            if delayed_end < floor {
                errors.push("延期预计结束日期不能早于原预计结束日期".to_string());
            }
        }
        if !order.is_urgent && order.priority < 1 {
            errors.push("优先级必须大于等于1".to_string());
        }

        errors
    }
}

impl Default for OrderValidator {
    fn default() -> Self {
        Self::new()
    }
}

// ==========================================
// 单元测试
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::OrderStatus;
    use chrono::{NaiveDate, Utc};
    use std::collections::BTreeMap;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn valid_order() -> WorkOrder {
        WorkOrder {
            id: "O-1".to_string(),
            machine: "一号机".to_string(),
            order_no: "WO-001".to_string(),
            material_no: None,
            material_name: "冷轧板".to_string(),
            quantity: 100,
            reported_quantity: 0,
            priority: 1,
            is_urgent: false,
            start_date: d(2025, 3, 1),
            expected_end_date: Some(d(2025, 3, 5)),
            delayed_expected_end_date: None,
            actual_end_date: None,
            is_paused: false,
            paused_date: None,
            resumed_date: None,
            produced_days: None,
            remaining_days: None,
            original_order_id: None,
            delay_reason: None,
            daily_reports: BTreeMap::new(),
            status: OrderStatus::NotStarted,
            created_at: Utc::now().naive_utc(),
            updated_at: Utc::now().naive_utc(),
        }
    }

    #[test]
    fn test_valid_order_passes() {
        let validator = OrderValidator::new();
        assert!(validator.validate(&valid_order()).is_empty());
    }

    #[test]
    fn test_required_fields() {
        let validator = OrderValidator::new();

        let mut order = valid_order();
        order.machine = "  ".to_string();
        order.order_no = String::new();
        order.material_name = String::new();
        order.quantity = 0;

        let errors = validator.validate(&order);
        assert_eq!(errors.len(), 4, "应聚合全部违规");
        assert!(errors.iter().any(|e| e.contains("机台")));
        assert!(errors.iter().any(|e| e.contains("工单号")));
        assert!(errors.iter().any(|e| e.contains("物料名称")));
        assert!(errors.iter().any(|e| e.contains("数量")));
    }

    #[test]
    fn test_date_ordering_rules() {
        let validator = OrderValidator::new();

        let mut order = valid_order();
        order.expected_end_date = Some(d(2025, 2, 20));
        let errors = validator.validate(&order);
        assert!(errors.iter().any(|e| e.contains("开始日期不能晚于")));

        let mut order = valid_order();
        order.actual_end_date = Some(d(2025, 2, 20));
        let errors = validator.validate(&order);
        assert!(errors.iter().any(|e| e.contains("实际结束日期不能早于")));
    }

    #[test]
    fn test_delayed_end_must_not_precede_plan() {
        let validator = OrderValidator::new();

        let mut order = valid_order();
        order.delayed_expected_end_date = Some(d(2025, 3, 3));
        let errors = validator.validate(&order);
        assert!(errors.iter().any(|e| e.contains("延期预计结束日期")));

        order.delayed_expected_end_date = Some(d(2025, 3, 8));
        assert!(validator.validate(&order).is_empty(), "晚于原计划的延期合法");
    }

    #[test]
    fn test_priority_zero_reserved_for_urgent() {
        let validator = OrderValidator::new();

        let mut order = valid_order();
        order.priority = 0;
        assert!(!validator.validate(&order).is_empty(), "非紧急工单优先级0不合法");

        order.is_urgent = true;
        assert!(validator.validate(&order).is_empty(), "紧急工单允许优先级0");
    }
}
