// ==========================================
// 车间工单排产系统 - 工单仓储
// ==========================================
// 职责: 管理 work_order 表
// 红线: 不含业务逻辑; 所有查询参数化; 完工顺延的批量日期
//       变更必须在单个事务内落库 (同机台并发完工由调用方串行化)
// ==========================================

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection, Result as SqliteResult, Row};

use crate::db::open_sqlite_connection;
use crate::domain::order::WorkOrder;
use crate::domain::types::OrderStatus;
use crate::engine::reschedule::DateShift;
use crate::repository::error::{RepositoryError, RepositoryResult};

pub struct WorkOrderRepository {
    conn: Arc<Mutex<Connection>>,
}

impl WorkOrderRepository {
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        let repo = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        repo.ensure_table()?;
        Ok(repo)
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        let repo = Self { conn };
        repo.ensure_table()?;
        Ok(repo)
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 确保表存在（如果不存在则创建）
    fn ensure_table(&self) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS work_order (
              id TEXT PRIMARY KEY,
              machine TEXT NOT NULL,
              order_no TEXT NOT NULL,
              material_no TEXT,
              material_name TEXT NOT NULL,
              quantity INTEGER NOT NULL,
              reported_quantity INTEGER NOT NULL DEFAULT 0,
              priority INTEGER NOT NULL DEFAULT 1,
              is_urgent INTEGER NOT NULL DEFAULT 0,
              start_date TEXT NOT NULL,
              expected_end_date TEXT,
              delayed_expected_end_date TEXT,
              actual_end_date TEXT,
              is_paused INTEGER NOT NULL DEFAULT 0,
              paused_date TEXT,
              resumed_date TEXT,
              produced_days INTEGER,
              remaining_days INTEGER,
              original_order_id TEXT,
              delay_reason TEXT,
              daily_reports TEXT NOT NULL DEFAULT '{}',
              status TEXT NOT NULL DEFAULT '未开始',
              created_at TEXT NOT NULL,
              updated_at TEXT NOT NULL,
              UNIQUE(machine, order_no)
            );

            CREATE INDEX IF NOT EXISTS idx_work_order_machine
              ON work_order(machine);
            CREATE INDEX IF NOT EXISTS idx_work_order_machine_start
              ON work_order(machine, start_date);
            CREATE INDEX IF NOT EXISTS idx_work_order_open
              ON work_order(machine, actual_end_date);
            "#,
        )?;
        Ok(())
    }

    // ==========================================
    // 行映射
    // ==========================================

    fn map_row(row: &Row<'_>) -> SqliteResult<WorkOrder> {
        let daily_reports_json: String = row.get("daily_reports")?;
        let daily_reports: BTreeMap<NaiveDate, i64> =
            serde_json::from_str(&daily_reports_json).unwrap_or_default();
        let status_label: String = row.get("status")?;

        Ok(WorkOrder {
            id: row.get("id")?,
            machine: row.get("machine")?,
            order_no: row.get("order_no")?,
            material_no: row.get("material_no")?,
            material_name: row.get("material_name")?,
            quantity: row.get("quantity")?,
            reported_quantity: row.get("reported_quantity")?,
            priority: row.get("priority")?,
            is_urgent: row.get("is_urgent")?,
            start_date: row.get("start_date")?,
            expected_end_date: row.get("expected_end_date")?,
            delayed_expected_end_date: row.get("delayed_expected_end_date")?,
            actual_end_date: row.get("actual_end_date")?,
            is_paused: row.get("is_paused")?,
            paused_date: row.get("paused_date")?,
            resumed_date: row.get("resumed_date")?,
            produced_days: row.get("produced_days")?,
            remaining_days: row.get("remaining_days")?,
            original_order_id: row.get("original_order_id")?,
            delay_reason: row.get("delay_reason")?,
            daily_reports,
            status: OrderStatus::from_label(&status_label),
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    fn encode_daily_reports(order: &WorkOrder) -> RepositoryResult<String> {
        serde_json::to_string(&order.daily_reports).map_err(|e| {
            RepositoryError::FieldEncodingError {
                field: "daily_reports".to_string(),
                message: e.to_string(),
            }
        })
    }

    const SELECT_COLUMNS: &'static str = r#"
        SELECT id, machine, order_no, material_no, material_name,
               quantity, reported_quantity, priority, is_urgent,
               start_date, expected_end_date, delayed_expected_end_date, actual_end_date,
               is_paused, paused_date, resumed_date, produced_days, remaining_days,
               original_order_id, delay_reason, daily_reports, status,
               created_at, updated_at
        FROM work_order
    "#;

    // ==========================================
    // 写入
    // ==========================================

    pub fn create(&self, order: &WorkOrder) -> RepositoryResult<()> {
        let daily_reports = Self::encode_daily_reports(order)?;
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO work_order (
                id, machine, order_no, material_no, material_name,
                quantity, reported_quantity, priority, is_urgent,
                start_date, expected_end_date, delayed_expected_end_date, actual_end_date,
                is_paused, paused_date, resumed_date, produced_days, remaining_days,
                original_order_id, delay_reason, daily_reports, status,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12,
                      ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24)
            "#,
            params![
                order.id,
                order.machine,
                order.order_no,
                order.material_no,
                order.material_name,
                order.quantity,
                order.reported_quantity,
                order.priority,
                order.is_urgent,
                order.start_date,
                order.expected_end_date,
                order.delayed_expected_end_date,
                order.actual_end_date,
                order.is_paused,
                order.paused_date,
                order.resumed_date,
                order.produced_days,
                order.remaining_days,
                order.original_order_id,
                order.delay_reason,
                daily_reports,
                order.status.as_label(),
                order.created_at,
                order.updated_at,
            ],
        )?;
        Ok(())
    }

    pub fn update(&self, order: &WorkOrder) -> RepositoryResult<()> {
        let daily_reports = Self::encode_daily_reports(order)?;
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE work_order SET
                machine = ?2,
                order_no = ?3,
                material_no = ?4,
                material_name = ?5,
                quantity = ?6,
                reported_quantity = ?7,
                priority = ?8,
                is_urgent = ?9,
                start_date = ?10,
                expected_end_date = ?11,
                delayed_expected_end_date = ?12,
                actual_end_date = ?13,
                is_paused = ?14,
                paused_date = ?15,
                resumed_date = ?16,
                produced_days = ?17,
                remaining_days = ?18,
                original_order_id = ?19,
                delay_reason = ?20,
                daily_reports = ?21,
                status = ?22,
                updated_at = ?23
            WHERE id = ?1
            "#,
            params![
                order.id,
                order.machine,
                order.order_no,
                order.material_no,
                order.material_name,
                order.quantity,
                order.reported_quantity,
                order.priority,
                order.is_urgent,
                order.start_date,
                order.expected_end_date,
                order.delayed_expected_end_date,
                order.actual_end_date,
                order.is_paused,
                order.paused_date,
                order.resumed_date,
                order.produced_days,
                order.remaining_days,
                order.original_order_id,
                order.delay_reason,
                daily_reports,
                order.status.as_label(),
                order.updated_at,
            ],
        )?;

        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "WorkOrder".to_string(),
                id: order.id.clone(),
            });
        }
        Ok(())
    }

    /// 批量落库完工顺延的日期变更 (单事务)
    ///
    /// 同时把受影响工单的 updated_at 刷到 now; 任一更新失败则整体回滚,
    /// 避免出现半截级联
    pub fn apply_date_shifts(
        &self,
        shifts: &[DateShift],
        now: NaiveDateTime,
    ) -> RepositoryResult<usize> {
        if shifts.is_empty() {
            return Ok(0);
        }

        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let mut applied = 0;
        for shift in shifts {
            let affected = tx.execute(
                r#"
                UPDATE work_order
                SET start_date = ?2, expected_end_date = ?3, updated_at = ?4
                WHERE id = ?1
                "#,
                params![shift.order_id, shift.new_start_date, shift.new_end_date, now],
            )?;
            if affected == 0 {
                return Err(RepositoryError::NotFound {
                    entity: "WorkOrder".to_string(),
                    id: shift.order_id.clone(),
                });
            }
            applied += affected;
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(applied)
    }

    /// 批量刷新派生状态缓存 (单事务)
    pub fn update_status_batch(
        &self,
        updates: &[(String, OrderStatus)],
        now: NaiveDateTime,
    ) -> RepositoryResult<usize> {
        if updates.is_empty() {
            return Ok(0);
        }

        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let mut applied = 0;
        for (order_id, status) in updates {
            applied += tx.execute(
                "UPDATE work_order SET status = ?2, updated_at = ?3 WHERE id = ?1",
                params![order_id, status.as_label(), now],
            )?;
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(applied)
    }

    pub fn delete(&self, id: &str) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM work_order WHERE id = ?1", params![id])?;
        Ok(affected)
    }

    // ==========================================
    // 查询
    // ==========================================

    pub fn find_by_id(&self, id: &str) -> RepositoryResult<Option<WorkOrder>> {
        let conn = self.get_conn()?;
        let sql = format!("{} WHERE id = ?1", Self::SELECT_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;

        let result = stmt.query_row(params![id], Self::map_row);
        match result {
            Ok(order) => Ok(Some(order)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 全部工单, 按创建顺序返回 (级联的同日平票以此为稳定基准)
    pub fn list_all(&self) -> RepositoryResult<Vec<WorkOrder>> {
        let conn = self.get_conn()?;
        let sql = format!("{} ORDER BY created_at ASC, id ASC", Self::SELECT_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], Self::map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(rows)
    }

    pub fn list_by_machine(&self, machine: &str) -> RepositoryResult<Vec<WorkOrder>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "{} WHERE machine = ?1 ORDER BY created_at ASC, id ASC",
            Self::SELECT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![machine], Self::map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(rows)
    }

    /// 机台上全部未完成工单 (完工顺延的候选池)
    pub fn list_open_by_machine(&self, machine: &str) -> RepositoryResult<Vec<WorkOrder>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "{} WHERE machine = ?1 AND actual_end_date IS NULL ORDER BY created_at ASC, id ASC",
            Self::SELECT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![machine], Self::map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(rows)
    }

    /// 判断机台内工单号是否已被占用 (更新时排除自身)
    pub fn order_no_taken(
        &self,
        machine: &str,
        order_no: &str,
        exclude_id: Option<&str>,
    ) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let count: i64 = match exclude_id {
            Some(id) => conn.query_row(
                "SELECT COUNT(*) FROM work_order WHERE machine = ?1 AND order_no = ?2 AND id != ?3",
                params![machine, order_no, id],
                |row| row.get(0),
            )?,
            None => conn.query_row(
                "SELECT COUNT(*) FROM work_order WHERE machine = ?1 AND order_no = ?2",
                params![machine, order_no],
                |row| row.get(0),
            )?,
        };
        Ok(count > 0)
    }

    pub fn count(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM work_order", [], |row| row.get(0))?;
        Ok(count)
    }
}
