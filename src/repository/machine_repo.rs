// ==========================================
// 车间工单排产系统 - 机台仓储
// ==========================================
// 职责: 管理 machine 表
// 红线: 不含业务逻辑; 所有查询参数化
// ==========================================

use std::sync::{Arc, Mutex};

use rusqlite::{params, Connection, Result as SqliteResult, Row};

use crate::db::open_sqlite_connection;
use crate::domain::machine::Machine;
use crate::domain::types::MachineStatus;
use crate::repository::error::{RepositoryError, RepositoryResult};

pub struct MachineRepository {
    conn: Arc<Mutex<Connection>>,
}

impl MachineRepository {
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
            CREATE TABLE IF NOT EXISTS machine (
              name TEXT PRIMARY KEY,
              status TEXT NOT NULL DEFAULT '正常',
              auto_adjust_orders INTEGER NOT NULL DEFAULT 1,
              oee REAL NOT NULL DEFAULT 1.0,
              coefficient REAL NOT NULL DEFAULT 1.0,
              created_at TEXT NOT NULL,
              updated_at TEXT NOT NULL
            );
            "#,
        )?;
        Ok(())
    }

    fn map_row(row: &Row<'_>) -> SqliteResult<Machine> {
        let status_label: String = row.get("status")?;
        Ok(Machine {
            name: row.get("name")?,
            status: MachineStatus::from_label(&status_label),
            auto_adjust_orders: row.get("auto_adjust_orders")?,
            oee: row.get("oee")?,
            coefficient: row.get("coefficient")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// 创建或更新机台 (按名称 Upsert)
    pub fn upsert(&self, machine: &Machine) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO machine (name, status, auto_adjust_orders, oee, coefficient, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(name) DO UPDATE SET
                status = excluded.status,
                auto_adjust_orders = excluded.auto_adjust_orders,
                oee = excluded.oee,
                coefficient = excluded.coefficient,
                updated_at = excluded.updated_at
            "#,
            params![
                machine.name,
                machine.status.as_label(),
                machine.auto_adjust_orders,
                machine.oee,
                machine.coefficient,
                machine.created_at,
                machine.updated_at,
            ],
        )?;
        Ok(())
    }

    pub fn find_by_name(&self, name: &str) -> RepositoryResult<Option<Machine>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT name, status, auto_adjust_orders, oee, coefficient, created_at, updated_at
            FROM machine
            WHERE name = ?1
            "#,
        )?;

        let result = stmt.query_row(params![name], Self::map_row);
        match result {
            Ok(machine) => Ok(Some(machine)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn list_all(&self) -> RepositoryResult<Vec<Machine>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT name, status, auto_adjust_orders, oee, coefficient, created_at, updated_at
            FROM machine
            ORDER BY name ASC
            "#,
        )?;
        let rows = stmt
            .query_map([], Self::map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(rows)
    }

    pub fn delete(&self, name: &str) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM machine WHERE name = ?1", params![name])?;
        Ok(affected)
    }

    pub fn count(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM machine", [], |row| row.get(0))?;
        Ok(count)
    }
}
