// ==========================================
// 矿山运营报表系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// 缺省: 键不存在或值无法解析时回落到内置默认值
// ==========================================

use std::sync::{Arc, Mutex};

use rusqlite::{params, Connection};

use crate::repository::error::{RepositoryError, RepositoryResult};

const GLOBAL_SCOPE: &str = "global";

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const DEFAULT_MAX_PAGE_SIZE: i64 = 100;
pub const DEFAULT_LOCALE: &str = "en";

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 分页
    pub const PAGE_SIZE_DEFAULT: &str = "plan.page_size_default";
    pub const PAGE_SIZE_MAX: &str = "plan.page_size_max";

    // 界面语言
    pub const LOCALE: &str = "app.locale";
}

/// 分页配置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationConfig {
    pub default_limit: i64,
    pub max_limit: i64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_PAGE_SIZE,
            max_limit: DEFAULT_MAX_PAGE_SIZE,
        }
    }
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 从已有连接创建（与仓储共享同一连接）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 读取 global scope 的配置值
    pub fn get_global_config_value(&self, key: &str) -> RepositoryResult<Option<String>> {
        let conn = self.conn.lock().map_err(|e| RepositoryError::LockError(e.to_string()))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = ?1 AND key = ?2",
            params![GLOBAL_SCOPE, key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 写入 global scope 的配置值（UPSERT）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> RepositoryResult<()> {
        let conn = self.conn.lock().map_err(|e| RepositoryError::LockError(e.to_string()))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES (?1, ?2, ?3)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?3, updated_at = datetime('now')",
            params![GLOBAL_SCOPE, key, value],
        )?;
        Ok(())
    }

    fn get_i64_or(&self, key: &str, default: i64) -> RepositoryResult<i64> {
        let parsed = self
            .get_global_config_value(key)?
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .filter(|v| *v > 0);

        match parsed {
            Some(v) => Ok(v),
            None => {
                tracing::debug!(key, default, "配置缺失或无效，使用默认值");
                Ok(default)
            }
        }
    }

    /// 分页配置
    ///
    /// 默认页大小不会超过最大页大小
    pub fn pagination_config(&self) -> RepositoryResult<PaginationConfig> {
        let max_limit = self.get_i64_or(config_keys::PAGE_SIZE_MAX, DEFAULT_MAX_PAGE_SIZE)?;
        let default_limit = self
            .get_i64_or(config_keys::PAGE_SIZE_DEFAULT, DEFAULT_PAGE_SIZE)?
            .min(max_limit);
        Ok(PaginationConfig {
            default_limit,
            max_limit,
        })
    }

    /// 界面语言（en / id）
    pub fn locale(&self) -> RepositoryResult<String> {
        let locale = self
            .get_global_config_value(config_keys::LOCALE)?
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_LOCALE.to_string());
        Ok(locale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_schema;

    fn manager() -> ConfigManager {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        ConfigManager::from_connection(Arc::new(Mutex::new(conn)))
    }

    #[test]
    fn test_defaults_when_missing() {
        let config = manager();
        assert_eq!(config.pagination_config().unwrap(), PaginationConfig::default());
        assert_eq!(config.locale().unwrap(), "en");
        assert_eq!(config.get_global_config_value("nope").unwrap(), None);
    }

    #[test]
    fn test_overrides_are_read_back() {
        let config = manager();
        config.set_global_config_value(config_keys::PAGE_SIZE_DEFAULT, "25").unwrap();
        config.set_global_config_value(config_keys::PAGE_SIZE_MAX, "50").unwrap();
        config.set_global_config_value(config_keys::LOCALE, "id").unwrap();

        assert_eq!(
            config.pagination_config().unwrap(),
            PaginationConfig {
                default_limit: 25,
                max_limit: 50,
            }
        );
        assert_eq!(config.locale().unwrap(), "id");

        // 覆写
        config.set_global_config_value(config_keys::LOCALE, "en").unwrap();
        assert_eq!(config.locale().unwrap(), "en");
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = manager();
        config.set_global_config_value(config_keys::PAGE_SIZE_DEFAULT, "abc").unwrap();
        config.set_global_config_value(config_keys::PAGE_SIZE_MAX, "-3").unwrap();
        assert_eq!(config.pagination_config().unwrap(), PaginationConfig::default());
    }

    #[test]
    fn test_default_limit_capped_by_max() {
        let config = manager();
        config.set_global_config_value(config_keys::PAGE_SIZE_DEFAULT, "500").unwrap();
        config.set_global_config_value(config_keys::PAGE_SIZE_MAX, "40").unwrap();
        assert_eq!(config.pagination_config().unwrap().default_limit, 40);
    }
}
