// ==========================================
// 矿山运营报表系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，把仓储/台账错误转换为面向用户的错误消息
// 分类: 校验失败 / 未找到 / 冲突 / 存储失败
// ==========================================

use crate::engine::activity_ledger::LedgerError;
use crate::i18n::t_with_args;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 业务规则错误
    // ==========================================
    /// 输入违反业务规则（月初、跨月、天数合计、明细等）
    #[error("数据验证失败: {0}")]
    ValidationError(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    // ==========================================
    // 并发控制错误
    // ==========================================
    /// 同月重复、revision 不一致
    #[error("冲突: {0}")]
    Conflict(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("数据库事务失败: {0}")]
    DatabaseTransactionError(String),
}

impl ApiError {
    /// 对应的 HTTP 状态码（供外层胶水代码使用）
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::ValidationError(_) => 400,
            ApiError::NotFound(_) => 404,
            ApiError::Conflict(_) => 409,
            ApiError::DatabaseError(_)
            | ApiError::DatabaseConnectionError(_)
            | ApiError::DatabaseTransactionError(_) => 500,
        }
    }

    /// 是否为存储层失败
    pub fn is_storage_error(&self) -> bool {
        self.status_code() == 500
    }
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            // 并发控制错误
            RepositoryError::OptimisticLockFailure {
                id,
                expected,
                actual,
            } => ApiError::Conflict(t_with_args(
                "plan.conflict.revision",
                &[
                    ("id", &id),
                    ("expected", &expected.to_string()),
                    ("actual", &actual.to_string()),
                ],
            )),
            RepositoryError::UniqueConstraintViolation(msg) => ApiError::Conflict(msg),

            // 数据库错误
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})", entity, id))
            }
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseTransactionError(msg) => {
                ApiError::DatabaseTransactionError(msg)
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::DatabaseError(format!("外键约束违反: {}", msg))
            }
        }
    }
}

// ==========================================
// 从 LedgerError 转换
// ==========================================
impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::EmptyTemplate => {
                ApiError::ValidationError(t_with_args("plan.validation.detail_empty", &[]))
            }
            LedgerError::DuplicateActivity(activity_id) => ApiError::ValidationError(t_with_args(
                "plan.validation.detail_duplicate_activity",
                &[("activity_id", &activity_id)],
            )),
            LedgerError::InvalidHours { activity_id, .. } => {
                ApiError::ValidationError(t_with_args(
                    "plan.validation.detail_negative_hour",
                    &[("activity_id", &activity_id)],
                ))
            }
            LedgerError::Repository(err) => err.into(),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
