// ==========================================
// 矿山运营报表系统 - 分页响应
// ==========================================
// 约定: page 从 1 开始；limit 缺省取配置默认值，超过上限时截断
// lastPage = ceil(total / limit)
// ==========================================

use serde::{Deserialize, Serialize};

use crate::api::error::{ApiError, ApiResult};
use crate::config::PaginationConfig;
use crate::i18n::t_with_args;

/// 分页元信息
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub last_page: i64,
}

/// 分页响应
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResponse<T> {
    pub status_code: u16,
    pub message: String,
    pub data: Vec<T>,
    pub meta: PageMeta,
}

/// 已归一化的分页参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: i64,
    pub limit: i64,
}

impl PageWindow {
    /// 归一化分页参数
    ///
    /// # 错误
    /// - page < 1 或 limit < 1 → ValidationError
    pub fn resolve(
        page: Option<i64>,
        limit: Option<i64>,
        config: &PaginationConfig,
    ) -> ApiResult<Self> {
        let page = page.unwrap_or(1);
        if page < 1 {
            return Err(ApiError::ValidationError(t_with_args(
                "plan.validation.page_invalid",
                &[("value", &page.to_string())],
            )));
        }

        let limit = limit.unwrap_or(config.default_limit);
        if limit < 1 {
            return Err(ApiError::ValidationError(t_with_args(
                "plan.validation.limit_invalid",
                &[("value", &limit.to_string())],
            )));
        }

        Ok(Self {
            page,
            limit: limit.min(config.max_limit),
        })
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

/// 组装分页响应
pub fn paginate<T>(
    data: Vec<T>,
    total: i64,
    page: i64,
    limit: i64,
    message: impl Into<String>,
) -> PaginatedResponse<T> {
    let last_page = if limit > 0 {
        (total + limit - 1) / limit
    } else {
        0
    };

    PaginatedResponse {
        status_code: 200,
        message: message.into(),
        data,
        meta: PageMeta {
            total,
            page,
            limit,
            last_page,
        },
    }
}
