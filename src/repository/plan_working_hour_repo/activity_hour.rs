use super::{fmt_ts, get_ts};
use crate::domain::plan_working_hour::ActivityHourEntry;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

// ==========================================
// ActivityHourRepository - 日计划活动工时仓储
// ==========================================
pub struct ActivityHourRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ActivityHourRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // 事务内函数
    // ==========================================

    /// 批量插入活动工时
    ///
    /// # 红线
    /// - (daily_plan_id, activity_id) 唯一，重复插入由唯一约束拦截
    pub fn insert_batch_tx(conn: &Connection, entries: &[ActivityHourEntry]) -> RepositoryResult<usize> {
        if entries.is_empty() {
            return Ok(0);
        }

        let mut stmt = conn.prepare(
            r#"INSERT INTO plan_activity_hour (
                    id, daily_plan_id, activity_id, activities_hour, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5)"#,
        )?;

        for entry in entries {
            stmt.execute(params![
                &entry.id,
                &entry.daily_plan_id,
                &entry.activity_id,
                entry.activities_hour,
                fmt_ts(&entry.created_at),
            ])?;
        }

        Ok(entries.len())
    }

    /// 删除计划头下所有有效日计划的活动工时
    ///
    /// 说明：已软删除日计划上的工时保留，用于历史追溯
    pub fn delete_by_header_tx(conn: &Connection, header_id: &str) -> RepositoryResult<usize> {
        let affected = conn.execute(
            r#"DELETE FROM plan_activity_hour
               WHERE daily_plan_id IN (
                   SELECT id FROM plan_working_hour_daily
                   WHERE plan_working_hour_id = ?1 AND deleted_at IS NULL
               )"#,
            params![header_id],
        )?;
        Ok(affected)
    }

    /// 删除单个日计划的活动工时
    pub fn delete_by_daily_plan_tx(conn: &Connection, daily_plan_id: &str) -> RepositoryResult<usize> {
        let affected = conn.execute(
            "DELETE FROM plan_activity_hour WHERE daily_plan_id = ?1",
            params![daily_plan_id],
        )?;
        Ok(affected)
    }

    /// 查询单个日计划的活动工时
    pub fn find_by_daily_plan_tx(
        conn: &Connection,
        daily_plan_id: &str,
    ) -> RepositoryResult<Vec<ActivityHourEntry>> {
        let mut stmt = conn.prepare(
            r#"SELECT id, daily_plan_id, activity_id, activities_hour, created_at
               FROM plan_activity_hour
               WHERE daily_plan_id = ?1
               ORDER BY activity_id"#,
        )?;
        let entries = stmt
            .query_map(params![daily_plan_id], Self::map_row)?
            .collect::<Result<Vec<ActivityHourEntry>, _>>()?;
        Ok(entries)
    }

    // ==========================================
    // 事务外只读查询
    // ==========================================

    pub fn find_by_daily_plan(&self, daily_plan_id: &str) -> RepositoryResult<Vec<ActivityHourEntry>> {
        let conn = self.get_conn()?;
        Self::find_by_daily_plan_tx(&conn, daily_plan_id)
    }

    /// 批量查询多个日计划的活动工时（按 daily_plan_id 分组）
    ///
    /// 用于分页明细，一页一次查询
    pub fn find_by_daily_plan_ids(
        &self,
        daily_plan_ids: &[String],
    ) -> RepositoryResult<HashMap<String, Vec<ActivityHourEntry>>> {
        let mut grouped: HashMap<String, Vec<ActivityHourEntry>> = HashMap::new();
        if daily_plan_ids.is_empty() {
            return Ok(grouped);
        }

        let conn = self.get_conn()?;
        let placeholders = (1..=daily_plan_ids.len())
            .map(|i| format!("?{}", i))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            r#"SELECT id, daily_plan_id, activity_id, activities_hour, created_at
               FROM plan_activity_hour
               WHERE daily_plan_id IN ({})
               ORDER BY daily_plan_id, activity_id"#,
            placeholders
        );

        let values: Vec<Value> = daily_plan_ids
            .iter()
            .map(|id| Value::from(id.clone()))
            .collect();

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(values), Self::map_row)?
            .collect::<Result<Vec<ActivityHourEntry>, _>>()?;

        for entry in rows {
            grouped
                .entry(entry.daily_plan_id.clone())
                .or_default()
                .push(entry);
        }
        Ok(grouped)
    }

    /// 统计计划头下有效日计划的活动工时条数
    pub fn count_by_header(&self, header_id: &str) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let total: i64 = conn.query_row(
            r#"SELECT COUNT(*) FROM plan_activity_hour a
               JOIN plan_working_hour_daily d ON d.id = a.daily_plan_id
               WHERE d.plan_working_hour_id = ?1 AND d.deleted_at IS NULL"#,
            params![header_id],
            |row| row.get(0),
        )?;
        Ok(total)
    }

    fn map_row(row: &rusqlite::Row) -> rusqlite::Result<ActivityHourEntry> {
        Ok(ActivityHourEntry {
            id: row.get(0)?,
            daily_plan_id: row.get(1)?,
            activity_id: row.get(2)?,
            activities_hour: row.get(3)?,
            created_at: get_ts(row, 4)?,
        })
    }
}
