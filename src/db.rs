// ==========================================
// 矿山运营报表系统 - SQLite 连接初始化与建表
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为（外键、busy_timeout）
// - 统一工时计划子系统的建表脚本（幂等，可重复执行）
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 工时计划子系统建表脚本
///
/// 说明：
/// - activities 由主数据模块维护，本子系统只读
/// - plan_working_hour 的部分唯一索引保证“同月只有一个有效计划”
/// - 删除均为软删除（deleted_at），不做级联
const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS config_kv (
    scope_id TEXT NOT NULL,
    key TEXT NOT NULL,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (scope_id, key)
);

CREATE TABLE IF NOT EXISTS activities (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    status TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now')),
    deleted_at TEXT
);

CREATE TABLE IF NOT EXISTS plan_working_hour (
    id TEXT PRIMARY KEY,
    plan_date TEXT NOT NULL,
    plan_month TEXT NOT NULL,
    total_calendar_days INTEGER NOT NULL,
    total_holiday_days INTEGER NOT NULL,
    total_available_days INTEGER NOT NULL,
    total_working_hour_month REAL NOT NULL,
    total_working_day_longshift REAL NOT NULL,
    total_working_hour_day REAL NOT NULL,
    total_working_hour_longshift REAL NOT NULL,
    total_mohh_per_month REAL NOT NULL,
    revision INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    deleted_at TEXT
);

CREATE UNIQUE INDEX IF NOT EXISTS uq_plan_working_hour_active_month
    ON plan_working_hour(plan_month) WHERE deleted_at IS NULL;

CREATE TABLE IF NOT EXISTS plan_working_hour_daily (
    id TEXT PRIMARY KEY,
    plan_working_hour_id TEXT NOT NULL REFERENCES plan_working_hour(id),
    plan_date TEXT NOT NULL,
    is_calendar_day INTEGER NOT NULL,
    is_holiday_day INTEGER NOT NULL,
    is_schedule_day INTEGER NOT NULL,
    schedule_day REAL,
    working_hour_month REAL NOT NULL,
    working_hour_day REAL NOT NULL,
    working_day_longshift REAL NOT NULL,
    working_hour_longshift REAL NOT NULL,
    mohh_per_month REAL NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    deleted_at TEXT,
    UNIQUE (plan_working_hour_id, plan_date)
);

CREATE INDEX IF NOT EXISTS idx_plan_working_hour_daily_date
    ON plan_working_hour_daily(plan_date);

CREATE TABLE IF NOT EXISTS plan_activity_hour (
    id TEXT PRIMARY KEY,
    daily_plan_id TEXT NOT NULL REFERENCES plan_working_hour_daily(id),
    activity_id TEXT NOT NULL,
    activities_hour REAL NOT NULL,
    created_at TEXT NOT NULL,
    UNIQUE (daily_plan_id, activity_id)
);

CREATE INDEX IF NOT EXISTS idx_plan_activity_hour_daily
    ON plan_activity_hour(daily_plan_id);
"#;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 初始化工时计划子系统 schema（幂等）
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;
    tracing::debug!(version = CURRENT_SCHEMA_VERSION, "schema 初始化完成");
    Ok(())
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> = conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

/// 获取默认数据库路径
///
/// # 返回
/// - 环境变量 MINE_OPS_DB_PATH（若设置）
/// - 用户数据目录/mine-ops-report/mine_ops_report.db
/// - 回退: ./mine_ops_report.db
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var("MINE_OPS_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./mine_ops_report.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("mine-ops-report");
        // best-effort: 目录创建失败时回退到当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("mine_ops_report.db");
        }
    }

    path.to_string_lossy().to_string()
}
