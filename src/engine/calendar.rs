// ==========================================
// 车间工单排产系统 - 甘特日历引擎
// ==========================================
// 职责: 机台×日期单元格的工单归属、延期区段判定、日历范围生成
// 红线: 纯函数, 无 I/O, 无保留状态
// ==========================================

use chrono::{Duration, NaiveDate};

use crate::domain::order::WorkOrder;

/// 订单集为空时的固定兜底日历窗口 (起/止, 加边距前)
pub const FALLBACK_RANGE_START: (i32, u32, u32) = (2025, 8, 28);
pub const FALLBACK_RANGE_END: (i32, u32, u32) = (2025, 9, 5);

/// 日历窗口前后各加的边距天数
const RANGE_PADDING_DAYS: i64 = 2;

// ==========================================
// CalendarEngine - 甘特日历引擎
// ==========================================
pub struct CalendarEngine {
    // 无状态引擎, 不需要注入依赖
}

impl CalendarEngine {
    pub fn new() -> Self {
        Self {}
    }

    // ==========================================
    // 单元格归属
    // ==========================================

    /// 指定机台+日期单元格上的工单, 按展示顺序返回
    ///
    /// 归属: machine 匹配且 start_date <= date <= 有效结束日期
    /// (有效结束: actual > delayed > expected > start)
    ///
    /// 排序: 紧急工单最前 (无视优先级数值), 其余按 priority 升序;
    /// 稳定排序, 同键保持输入顺序
    pub fn orders_on_cell<'a>(
        &self,
        orders: &'a [WorkOrder],
        machine_name: &str,
        date: NaiveDate,
    ) -> Vec<&'a WorkOrder> {
        let mut cell: Vec<&WorkOrder> = orders
            .iter()
            .filter(|order| order.machine == machine_name && order.occupies(date))
            .collect();

        cell.sort_by_key(|order| (!order.is_urgent, order.priority));
        cell
    }

    // ==========================================
    // 延期区段判定
    // ==========================================

    /// 判断日期是否落在工单的延期区段
    ///
    /// 延期区段: 严格晚于原预计结束日期, 且不晚于有效结束;
    /// - 已完成: expected < date <= actual
    /// - 设置了延期计划: expected < date <= delayed
    /// - 两者都没有: 任何晚于 expected 的日期都算延期
    /// - 无预计结束日期: 无目标, 一律返回 false
    pub fn is_in_delayed_portion(&self, order: &WorkOrder, date: NaiveDate) -> bool {
        let Some(expected_end) = order.expected_end_date else {
            return false;
        };

        if let Some(actual_end) = order.actual_end_date {
            return date > expected_end && date <= actual_end;
        }

        if let Some(delayed_end) = order.delayed_expected_end_date {
            return date > expected_end && date <= delayed_end;
        }

        date > expected_end
    }

    // ==========================================
    // 日历范围生成
    // ==========================================

    /// 生成覆盖全部工单的日历日期序列 (含前后边距)
    ///
    /// 窗口 = [min(start_date) - 2, max(有效结束) + 2], 逐日枚举;
    /// 工单集为空时采用固定兜底窗口 (同样加边距)
    pub fn generate_date_range(&self, orders: &[WorkOrder]) -> Vec<NaiveDate> {
        let bounds = orders.iter().fold(None::<(NaiveDate, NaiveDate)>, |acc, order| {
            let start = order.start_date;
            let end = order.effective_end_date();
            Some(match acc {
                None => (start, end),
                Some((min, max)) => (min.min(start), max.max(end)),
            })
        });

        let (mut min_date, mut max_date) = bounds.unwrap_or_else(|| {
            let (sy, sm, sd) = FALLBACK_RANGE_START;
            let (ey, em, ed) = FALLBACK_RANGE_END;
            (
                NaiveDate::from_ymd_opt(sy, sm, sd).expect("固定兜底窗口起始日期合法"),
                NaiveDate::from_ymd_opt(ey, em, ed).expect("固定兜底窗口结束日期合法"),
            )
        });

        min_date -= Duration::days(RANGE_PADDING_DAYS);
        max_date += Duration::days(RANGE_PADDING_DAYS);

        let mut dates = Vec::new();
        let mut current = min_date;
        while current <= max_date {
            dates.push(current);
            current += Duration::days(1);
        }
        dates
    }
}

impl Default for CalendarEngine {
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
    use chrono::Utc;
    use std::collections::BTreeMap;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn order(id: &str, machine: &str, start: NaiveDate, end: Option<NaiveDate>) -> WorkOrder {
        WorkOrder {
            id: id.to_string(),
            machine: machine.to_string(),
            order_no: format!("WO-{}", id),
            material_no: None,
            material_name: "冷轧板".to_string(),
            quantity: 100,
            reported_quantity: 0,
            priority: 1,
            is_urgent: false,
            start_date: start,
            expected_end_date: end,
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
    fn test_scenario_1_cell_membership_window() {
        // 场景1: 单元格归属按 [start, 有效结束] 窗口
        let engine = CalendarEngine::new();
        let orders = vec![
            order("A", "一号机", d(2025, 3, 1), Some(d(2025, 3, 5))),
            order("B", "二号机", d(2025, 3, 1), Some(d(2025, 3, 5))),
        ];

        let cell = engine.orders_on_cell(&orders, "一号机", d(2025, 3, 3));
        assert_eq!(cell.len(), 1, "只返回本机台窗口内工单");
        assert_eq!(cell[0].id, "A");

        let cell = engine.orders_on_cell(&orders, "一号机", d(2025, 3, 6));
        assert!(cell.is_empty(), "窗口外日期无归属");
    }

    #[test]
    fn test_scenario_2_urgent_sorts_before_priority() {
        // 场景2: 紧急工单排最前, 无视优先级数值
        let engine = CalendarEngine::new();

        let mut urgent = order("U", "一号机", d(2025, 3, 1), Some(d(2025, 3, 5)));
        urgent.is_urgent = true;
        urgent.priority = 5;

        let mut high_priority = order("P", "一号机", d(2025, 3, 1), Some(d(2025, 3, 5)));
        high_priority.priority = 1;

        let orders = vec![high_priority, urgent];
        let cell = engine.orders_on_cell(&orders, "一号机", d(2025, 3, 2));

        assert_eq!(cell[0].id, "U", "紧急工单优先于低数值优先级");
        assert_eq!(cell[1].id, "P");
    }

    #[test]
    fn test_scenario_3_delayed_end_extends_membership() {
        // 场景3: 延期预计结束日期扩展显示窗口
        let engine = CalendarEngine::new();

        let mut delayed = order("A", "一号机", d(2025, 3, 1), Some(d(2025, 3, 5)));
        delayed.delayed_expected_end_date = Some(d(2025, 3, 8));

        let orders = vec![delayed];
        assert_eq!(engine.orders_on_cell(&orders, "一号机", d(2025, 3, 7)).len(), 1);
        assert!(engine.orders_on_cell(&orders, "一号机", d(2025, 3, 9)).is_empty());
    }

    #[test]
    fn test_scenario_4_delayed_portion_with_delayed_plan() {
        // 场景4: 延期区段判定 (设置了延期计划)
        let engine = CalendarEngine::new();

        let mut o = order("A", "一号机", d(2025, 3, 1), Some(d(2025, 3, 10)));
        o.delayed_expected_end_date = Some(d(2025, 3, 15));

        assert!(!engine.is_in_delayed_portion(&o, d(2025, 3, 9)), "预计结束前不算延期");
        assert!(!engine.is_in_delayed_portion(&o, d(2025, 3, 10)), "预计结束当日不算延期");
        assert!(engine.is_in_delayed_portion(&o, d(2025, 3, 11)));
        assert!(engine.is_in_delayed_portion(&o, d(2025, 3, 15)));
        assert!(!engine.is_in_delayed_portion(&o, d(2025, 3, 16)), "延期计划之后不算");
    }

    #[test]
    fn test_scenario_5_delayed_portion_when_finished() {
        // 场景5: 已完成工单的延期区段按实际结束日期封口
        let engine = CalendarEngine::new();

        let mut o = order("A", "一号机", d(2025, 3, 1), Some(d(2025, 3, 10)));
        o.actual_end_date = Some(d(2025, 3, 13));

        assert!(engine.is_in_delayed_portion(&o, d(2025, 3, 12)));
        assert!(engine.is_in_delayed_portion(&o, d(2025, 3, 13)));
        assert!(!engine.is_in_delayed_portion(&o, d(2025, 3, 14)));
    }

    #[test]
    fn test_scenario_6_delayed_portion_open_ended() {
        // 场景6: 未完成且无延期计划时, 超过预计结束即算延期
        let engine = CalendarEngine::new();

        let o = order("A", "一号机", d(2025, 3, 1), Some(d(2025, 3, 10)));
        assert!(engine.is_in_delayed_portion(&o, d(2025, 3, 11)));
        assert!(engine.is_in_delayed_portion(&o, d(2025, 4, 1)));
    }

    #[test]
    fn test_scenario_7_delayed_portion_without_target() {
        // 场景7: 无预计结束日期无法判定延期
        let engine = CalendarEngine::new();

        let mut o = order("A", "一号机", d(2025, 3, 1), None);
        o.actual_end_date = Some(d(2025, 3, 20));
        assert!(!engine.is_in_delayed_portion(&o, d(2025, 3, 15)));
    }

    #[test]
    fn test_scenario_8_date_range_spans_orders_with_padding() {
        // 场景8: 日历范围覆盖全部工单并加边距
        let engine = CalendarEngine::new();

        let mut late = order("B", "一号机", d(2025, 3, 4), Some(d(2025, 3, 6)));
        late.delayed_expected_end_date = Some(d(2025, 3, 9));
        let orders = vec![
            order("A", "一号机", d(2025, 3, 2), Some(d(2025, 3, 5))),
            late,
        ];

        let range = engine.generate_date_range(&orders);
        assert_eq!(range.first().copied(), Some(d(2025, 2, 28)), "最早开始前推2天");
        assert_eq!(range.last().copied(), Some(d(2025, 3, 11)), "最晚有效结束后延2天");
        assert_eq!(range.len(), 12, "逐日枚举且两端包含");
    }

    #[test]
    fn test_scenario_9_date_range_fallback_window() {
        // 场景9: 空工单集采用固定兜底窗口
        let engine = CalendarEngine::new();

        let range = engine.generate_date_range(&[]);
        assert!(!range.is_empty(), "兜底窗口不为空");
        assert_eq!(range.first().copied(), Some(d(2025, 8, 26)));
        assert_eq!(range.last().copied(), Some(d(2025, 9, 7)));
    }
}
