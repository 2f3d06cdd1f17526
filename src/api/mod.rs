// ==========================================
// 矿山运营报表系统 - API 层
// ==========================================
// 职责: 提供业务 API 接口，供外层 HTTP / CLI 胶水代码调用
// ==========================================

pub mod error;
pub mod pagination;
pub mod plan_working_hour_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use pagination::{paginate, PageMeta, PageWindow, PaginatedResponse};
pub use plan_working_hour_api::{
    CreatePlanInput, CreatedPlanView, DailyDetailView, DailyPlanMetricsView, HeaderReadView,
    PlanDetailQuery, PlanListQuery, PlanSummaryView, PlanWorkingHourApi, UpdateDailyPlanInput,
    UpdatePlanInput,
};
