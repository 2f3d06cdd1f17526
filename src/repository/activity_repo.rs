// ==========================================
// 矿山运营报表系统 - 活动主数据仓储（只读）
// ==========================================
// 红线: 工时计划子系统只读取活动目录，不写入
// 说明: activities 表由主数据 CRUD 模块维护；软删除的活动不可见
// ==========================================

use crate::domain::plan_working_hour::Activity;
use crate::domain::types::ActivityStatus;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

// ==========================================
// ActivityDirectory - 活动目录接口
// ==========================================
pub trait ActivityDirectory: Send + Sync {
    /// 列出全部有效活动
    fn list_activities(&self) -> RepositoryResult<Vec<Activity>>;

    /// 按 id 查询活动
    fn get_activity(&self, id: &str) -> RepositoryResult<Option<Activity>>;

    /// 以 id 为键的查找表
    fn activity_lookup(&self) -> RepositoryResult<HashMap<String, Activity>> {
        Ok(self
            .list_activities()?
            .into_iter()
            .map(|a| (a.id.clone(), a))
            .collect())
    }
}

// ==========================================
// ActivityRepository - SQLite 实现
// ==========================================
pub struct ActivityRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ActivityRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_row(row: &rusqlite::Row) -> rusqlite::Result<Activity> {
        let status: Option<String> = row.get(2)?;
        Ok(Activity {
            id: row.get(0)?,
            name: row.get(1)?,
            status: ActivityStatus::from_db(status.as_deref()),
        })
    }
}

impl ActivityDirectory for ActivityRepository {
    fn list_activities(&self) -> RepositoryResult<Vec<Activity>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"SELECT id, name, status
               FROM activities
               WHERE deleted_at IS NULL
               ORDER BY name"#,
        )?;

        let activities = stmt
            .query_map([], Self::map_row)?
            .collect::<Result<Vec<Activity>, _>>()?;

        Ok(activities)
    }

    fn get_activity(&self, id: &str) -> RepositoryResult<Option<Activity>> {
        let conn = self.get_conn()?;

        let activity = conn
            .query_row(
                r#"SELECT id, name, status
                   FROM activities
                   WHERE id = ?1 AND deleted_at IS NULL"#,
                params![id],
                Self::map_row,
            )
            .optional()?;

        Ok(activity)
    }
}
