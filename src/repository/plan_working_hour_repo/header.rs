use super::{fmt_date, fmt_ts, get_date, get_opt_ts, get_ts};
use crate::domain::plan_working_hour::{PlanTotals, PlanWorkingHour};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

const SELECT_COLUMNS: &str = r#"
    id, plan_date, total_calendar_days, total_holiday_days, total_available_days,
    total_working_hour_month, total_working_day_longshift, total_working_hour_day,
    total_working_hour_longshift, total_mohh_per_month, revision,
    created_at, updated_at, deleted_at
"#;

// ==========================================
// PlanWorkingHourRepository - 月度计划头仓储
// ==========================================
pub struct PlanWorkingHourRepository {
    conn: Arc<Mutex<Connection>>,
}

impl PlanWorkingHourRepository {
    /// 创建新的PlanWorkingHourRepository实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // 事务内函数
    // ==========================================

    /// 插入计划头
    pub fn insert_tx(conn: &Connection, plan: &PlanWorkingHour) -> RepositoryResult<()> {
        conn.execute(
            r#"INSERT INTO plan_working_hour (
                id, plan_date, plan_month, total_calendar_days, total_holiday_days,
                total_available_days, total_working_hour_month, total_working_day_longshift,
                total_working_hour_day, total_working_hour_longshift, total_mohh_per_month,
                revision, created_at, updated_at, deleted_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, NULL)"#,
            params![
                &plan.id,
                fmt_date(&plan.plan_date),
                plan.plan_month(),
                plan.totals.total_calendar_days,
                plan.totals.total_holiday_days,
                plan.totals.total_available_days,
                plan.totals.total_working_hour_month,
                plan.totals.total_working_day_longshift,
                plan.totals.total_working_hour_day,
                plan.totals.total_working_hour_longshift,
                plan.totals.total_mohh_per_month,
                plan.revision,
                fmt_ts(&plan.created_at),
                fmt_ts(&plan.updated_at),
            ],
        )?;
        Ok(())
    }

    /// 整体覆盖计划头（仅有效记录）
    ///
    /// # 返回
    /// - 受影响行数（0 表示不存在或已删除）
    pub fn update_tx(conn: &Connection, plan: &PlanWorkingHour) -> RepositoryResult<usize> {
        let affected = conn.execute(
            r#"UPDATE plan_working_hour
               SET plan_date = ?1, plan_month = ?2,
                   total_calendar_days = ?3, total_holiday_days = ?4, total_available_days = ?5,
                   total_working_hour_month = ?6, total_working_day_longshift = ?7,
                   total_working_hour_day = ?8, total_working_hour_longshift = ?9,
                   total_mohh_per_month = ?10, revision = ?11, updated_at = ?12
               WHERE id = ?13 AND deleted_at IS NULL"#,
            params![
                fmt_date(&plan.plan_date),
                plan.plan_month(),
                plan.totals.total_calendar_days,
                plan.totals.total_holiday_days,
                plan.totals.total_available_days,
                plan.totals.total_working_hour_month,
                plan.totals.total_working_day_longshift,
                plan.totals.total_working_hour_day,
                plan.totals.total_working_hour_longshift,
                plan.totals.total_mohh_per_month,
                plan.revision,
                fmt_ts(&plan.updated_at),
                &plan.id,
            ],
        )?;
        Ok(affected)
    }

    /// 软删除计划头（不级联日计划/活动工时）
    pub fn soft_delete_tx(
        conn: &Connection,
        id: &str,
        deleted_at: &chrono::NaiveDateTime,
    ) -> RepositoryResult<usize> {
        let affected = conn.execute(
            r#"UPDATE plan_working_hour
               SET deleted_at = ?1, updated_at = ?1
               WHERE id = ?2 AND deleted_at IS NULL"#,
            params![fmt_ts(deleted_at), id],
        )?;
        Ok(affected)
    }

    /// 按 id 查询有效计划头
    pub fn find_by_id_tx(conn: &Connection, id: &str) -> RepositoryResult<Option<PlanWorkingHour>> {
        let sql = format!(
            "SELECT {} FROM plan_working_hour WHERE id = ?1 AND deleted_at IS NULL",
            SELECT_COLUMNS
        );
        let plan = conn
            .query_row(&sql, params![id], Self::map_row)
            .optional()?;
        Ok(plan)
    }

    /// 查询某月的有效计划头
    ///
    /// # 参数
    /// - `plan_month`: YYYY-MM
    /// - `exclude_id`: 排除的计划头（update 时排除自身）
    pub fn find_active_by_month_tx(
        conn: &Connection,
        plan_month: &str,
        exclude_id: Option<&str>,
    ) -> RepositoryResult<Option<PlanWorkingHour>> {
        let sql = format!(
            r#"SELECT {} FROM plan_working_hour
               WHERE plan_month = ?1 AND deleted_at IS NULL
                 AND (?2 IS NULL OR id <> ?2)
               LIMIT 1"#,
            SELECT_COLUMNS
        );
        let plan = conn
            .query_row(&sql, params![plan_month, exclude_id], Self::map_row)
            .optional()?;
        Ok(plan)
    }

    // ==========================================
    // 事务外只读查询
    // ==========================================

    /// 按 id 查询有效计划头
    pub fn find_by_id(&self, id: &str) -> RepositoryResult<Option<PlanWorkingHour>> {
        let conn = self.get_conn()?;
        Self::find_by_id_tx(&conn, id)
    }

    /// 查询某月的有效计划头
    pub fn find_active_by_month(&self, plan_month: &str) -> RepositoryResult<Option<PlanWorkingHour>> {
        let conn = self.get_conn()?;
        Self::find_active_by_month_tx(&conn, plan_month, None)
    }

    /// 分页查询有效计划头（按 plan_date 降序）
    pub fn list_active_paged(
        &self,
        year: Option<i32>,
        limit: i64,
        offset: i64,
    ) -> RepositoryResult<Vec<PlanWorkingHour>> {
        let conn = self.get_conn()?;
        let year_prefix = year.map(|y| format!("{:04}-%", y));
        let sql = format!(
            r#"SELECT {} FROM plan_working_hour
               WHERE deleted_at IS NULL
                 AND (?1 IS NULL OR plan_month LIKE ?1)
               ORDER BY plan_date DESC
               LIMIT ?2 OFFSET ?3"#,
            SELECT_COLUMNS
        );

        let mut stmt = conn.prepare(&sql)?;
        let plans = stmt
            .query_map(params![year_prefix, limit, offset], Self::map_row)?
            .collect::<Result<Vec<PlanWorkingHour>, _>>()?;

        Ok(plans)
    }

    /// 统计有效计划头数量
    pub fn count_active(&self, year: Option<i32>) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let year_prefix = year.map(|y| format!("{:04}-%", y));
        let total: i64 = conn.query_row(
            r#"SELECT COUNT(*) FROM plan_working_hour
               WHERE deleted_at IS NULL
                 AND (?1 IS NULL OR plan_month LIKE ?1)"#,
            params![year_prefix],
            |row| row.get(0),
        )?;
        Ok(total)
    }

    /// 映射数据库行到PlanWorkingHour对象
    fn map_row(row: &rusqlite::Row) -> rusqlite::Result<PlanWorkingHour> {
        Ok(PlanWorkingHour {
            id: row.get(0)?,
            plan_date: get_date(row, 1)?,
            totals: PlanTotals {
                total_calendar_days: row.get(2)?,
                total_holiday_days: row.get(3)?,
                total_available_days: row.get(4)?,
                total_working_hour_month: row.get(5)?,
                total_working_day_longshift: row.get(6)?,
                total_working_hour_day: row.get(7)?,
                total_working_hour_longshift: row.get(8)?,
                total_mohh_per_month: row.get(9)?,
            },
            revision: row.get(10)?,
            created_at: get_ts(row, 11)?,
            updated_at: get_ts(row, 12)?,
            deleted_at: get_opt_ts(row, 13)?,
        })
    }
}
