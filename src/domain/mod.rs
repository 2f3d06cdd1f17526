// ==========================================
// 矿山运营报表系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod plan_working_hour;
pub mod types;

// 重导出核心类型
pub use plan_working_hour::{
    month_key, Activity, ActivityHourEntry, ActivityHourTemplate, DailyPlan, PlanTotals,
    PlanWorkingHour,
};
pub use types::{ActivityStatus, CalendarLabel, StatusGroup};
