// ==========================================
// 矿山运营报表系统 - 工作单元（事务边界）
// ==========================================
// 职责: 把跨表写入（计划头 + 日计划 + 活动工时）包进同一个事务
// 约定: 闭包返回 Ok 则提交；返回 Err（或 panic）则事务随 drop 回滚
// 注意: 闭包内只能使用 `*_tx(&Connection, ..)` 形式的仓储函数，
//       不能再调用会对同一连接加锁的仓储方法
// ==========================================

use crate::repository::error::RepositoryError;
use rusqlite::{Connection, Transaction};
use std::sync::{Arc, Mutex};

pub struct UnitOfWork {
    conn: Arc<Mutex<Connection>>,
}

impl UnitOfWork {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 在事务中执行闭包
    ///
    /// # 返回
    /// - `Ok(T)`: 闭包成功且事务已提交
    /// - `Err`: 闭包失败（已回滚）或提交失败
    pub fn run<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&Transaction) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        match f(&tx) {
            Ok(value) => {
                tx.commit()
                    .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
                Ok(value)
            }
            Err(e) => {
                // tx drop 时回滚
                tracing::warn!("事务执行失败，已回滚");
                Err(e)
            }
        }
    }
}
