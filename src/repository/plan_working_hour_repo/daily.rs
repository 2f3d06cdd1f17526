use super::{fmt_date, fmt_ts, get_date, get_opt_ts, get_ts};
use crate::domain::plan_working_hour::DailyPlan;
use crate::domain::types::CalendarLabel;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

const SELECT_COLUMNS: &str = r#"
    d.id, d.plan_working_hour_id, d.plan_date, d.is_calendar_day, d.is_holiday_day,
    d.is_schedule_day, d.schedule_day, d.working_hour_month, d.working_hour_day,
    d.working_day_longshift, d.working_hour_longshift, d.mohh_per_month,
    d.created_at, d.updated_at, d.deleted_at
"#;

/// 有效日计划：日计划本身与所属计划头均未软删除
const LIVE_JOIN: &str = r#"
    FROM plan_working_hour_daily d
    JOIN plan_working_hour h ON h.id = d.plan_working_hour_id
    WHERE d.deleted_at IS NULL AND h.deleted_at IS NULL
"#;

/// 日计划明细查询过滤条件
#[derive(Debug, Clone, Default)]
pub struct DailyPlanFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub calendar_day: Option<CalendarLabel>,
}

impl DailyPlanFilter {
    /// 拼接 WHERE 条件（追加在 LIVE_JOIN 之后）
    fn push_conditions(&self, sql: &mut String, values: &mut Vec<Value>) {
        if let Some(start) = self.start_date {
            values.push(Value::from(fmt_date(&start)));
            sql.push_str(&format!(" AND d.plan_date >= ?{}", values.len()));
        }
        if let Some(end) = self.end_date {
            values.push(Value::from(fmt_date(&end)));
            sql.push_str(&format!(" AND d.plan_date <= ?{}", values.len()));
        }
        // 口径与 classify_calendar_label 保持一致
        match self.calendar_day {
            Some(CalendarLabel::Available) => sql.push_str(" AND d.schedule_day >= 1"),
            Some(CalendarLabel::OneShift) => {
                sql.push_str(" AND d.schedule_day > 0 AND d.schedule_day < 1")
            }
            Some(CalendarLabel::Holiday) => {
                sql.push_str(" AND (d.schedule_day IS NULL OR d.schedule_day <= 0)")
            }
            None => {}
        }
    }
}

// ==========================================
// DailyPlanRepository - 日计划仓储
// ==========================================
pub struct DailyPlanRepository {
    conn: Arc<Mutex<Connection>>,
}

impl DailyPlanRepository {
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

    /// 批量插入日计划
    ///
    /// # 红线
    /// - 必须在工作单元（事务）中调用
    pub fn insert_batch_tx(conn: &Connection, plans: &[DailyPlan]) -> RepositoryResult<usize> {
        if plans.is_empty() {
            return Ok(0);
        }

        let mut stmt = conn.prepare(
            r#"INSERT INTO plan_working_hour_daily (
                    id, plan_working_hour_id, plan_date, is_calendar_day, is_holiday_day,
                    is_schedule_day, schedule_day, working_hour_month, working_hour_day,
                    working_day_longshift, working_hour_longshift, mohh_per_month,
                    created_at, updated_at, deleted_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, NULL)"#,
        )?;

        for plan in plans {
            stmt.execute(params![
                &plan.id,
                &plan.plan_working_hour_id,
                fmt_date(&plan.plan_date),
                plan.is_calendar_day,
                plan.is_holiday_day,
                plan.is_schedule_day,
                plan.schedule_day,
                plan.working_hour_month,
                plan.working_hour_day,
                plan.working_day_longshift,
                plan.working_hour_longshift,
                plan.mohh_per_month,
                fmt_ts(&plan.created_at),
                fmt_ts(&plan.updated_at),
            ])?;
        }

        Ok(plans.len())
    }

    /// 原地更新日计划（保留 id，不重建）
    pub fn update_tx(conn: &Connection, plan: &DailyPlan) -> RepositoryResult<usize> {
        let affected = conn.execute(
            r#"UPDATE plan_working_hour_daily
               SET is_calendar_day = ?1, is_holiday_day = ?2, is_schedule_day = ?3,
                   schedule_day = ?4, working_hour_month = ?5, working_hour_day = ?6,
                   working_day_longshift = ?7, working_hour_longshift = ?8,
                   mohh_per_month = ?9, updated_at = ?10
               WHERE id = ?11 AND deleted_at IS NULL"#,
            params![
                plan.is_calendar_day,
                plan.is_holiday_day,
                plan.is_schedule_day,
                plan.schedule_day,
                plan.working_hour_month,
                plan.working_hour_day,
                plan.working_day_longshift,
                plan.working_hour_longshift,
                plan.mohh_per_month,
                fmt_ts(&plan.updated_at),
                &plan.id,
            ],
        )?;
        Ok(affected)
    }

    /// 软删除日计划（保留其活动工时）
    pub fn soft_delete_tx(
        conn: &Connection,
        id: &str,
        deleted_at: &NaiveDateTime,
    ) -> RepositoryResult<usize> {
        let affected = conn.execute(
            r#"UPDATE plan_working_hour_daily
               SET deleted_at = ?1, updated_at = ?1
               WHERE id = ?2 AND deleted_at IS NULL"#,
            params![fmt_ts(deleted_at), id],
        )?;
        Ok(affected)
    }

    /// 查询计划头下的全部有效日计划（按日期升序）
    pub fn find_by_header_tx(conn: &Connection, header_id: &str) -> RepositoryResult<Vec<DailyPlan>> {
        let sql = format!(
            "SELECT {} {} AND d.plan_working_hour_id = ?1 ORDER BY d.plan_date ASC",
            SELECT_COLUMNS, LIVE_JOIN
        );
        let mut stmt = conn.prepare(&sql)?;
        let plans = stmt
            .query_map(params![header_id], Self::map_row)?
            .collect::<Result<Vec<DailyPlan>, _>>()?;
        Ok(plans)
    }

    /// 按 id 查询有效日计划
    pub fn find_by_id_tx(conn: &Connection, id: &str) -> RepositoryResult<Option<DailyPlan>> {
        let sql = format!("SELECT {} {} AND d.id = ?1", SELECT_COLUMNS, LIVE_JOIN);
        let plan = conn
            .query_row(&sql, params![id], Self::map_row)
            .optional()?;
        Ok(plan)
    }

    // ==========================================
    // 事务外只读查询
    // ==========================================

    pub fn find_by_header(&self, header_id: &str) -> RepositoryResult<Vec<DailyPlan>> {
        let conn = self.get_conn()?;
        Self::find_by_header_tx(&conn, header_id)
    }

    pub fn find_by_id(&self, id: &str) -> RepositoryResult<Option<DailyPlan>> {
        let conn = self.get_conn()?;
        Self::find_by_id_tx(&conn, id)
    }

    /// 按过滤条件分页查询（按 plan_date 升序）
    pub fn find_paged(
        &self,
        filter: &DailyPlanFilter,
        limit: i64,
        offset: i64,
    ) -> RepositoryResult<Vec<DailyPlan>> {
        let conn = self.get_conn()?;

        let mut sql = format!("SELECT {} {}", SELECT_COLUMNS, LIVE_JOIN);
        let mut values: Vec<Value> = Vec::new();
        filter.push_conditions(&mut sql, &mut values);

        values.push(Value::from(limit));
        sql.push_str(&format!(" ORDER BY d.plan_date ASC LIMIT ?{}", values.len()));
        values.push(Value::from(offset));
        sql.push_str(&format!(" OFFSET ?{}", values.len()));

        let mut stmt = conn.prepare(&sql)?;
        let plans = stmt
            .query_map(params_from_iter(values), Self::map_row)?
            .collect::<Result<Vec<DailyPlan>, _>>()?;
        Ok(plans)
    }

    /// 按过滤条件计数
    pub fn count(&self, filter: &DailyPlanFilter) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;

        let mut sql = format!("SELECT COUNT(*) {}", LIVE_JOIN);
        let mut values: Vec<Value> = Vec::new();
        filter.push_conditions(&mut sql, &mut values);

        let total: i64 = conn.query_row(&sql, params_from_iter(values), |row| row.get(0))?;
        Ok(total)
    }

    /// 映射数据库行到DailyPlan对象
    fn map_row(row: &rusqlite::Row) -> rusqlite::Result<DailyPlan> {
        Ok(DailyPlan {
            id: row.get(0)?,
            plan_working_hour_id: row.get(1)?,
            plan_date: get_date(row, 2)?,
            is_calendar_day: row.get(3)?,
            is_holiday_day: row.get(4)?,
            is_schedule_day: row.get(5)?,
            schedule_day: row.get(6)?,
            working_hour_month: row.get(7)?,
            working_hour_day: row.get(8)?,
            working_day_longshift: row.get(9)?,
            working_hour_longshift: row.get(10)?,
            mohh_per_month: row.get(11)?,
            created_at: get_ts(row, 12)?,
            updated_at: get_ts(row, 13)?,
            deleted_at: get_opt_ts(row, 14)?,
        })
    }
}
