// ==========================================
// 矿山运营报表系统 - 引擎层
// ==========================================
// 职责: 日历展开、活动工时台账、可用率指标计算
// 红线: 指标计算为纯函数; 台账写入只在工作单元内进行
// ==========================================

pub mod activity_ledger;
pub mod availability;
pub mod calendar_expander;
pub mod clock;

// 重导出核心引擎
pub use activity_ledger::{validate_template, ActivityHourLedger, LedgerError, LedgerResult};
pub use availability::{
    availability_window, classify, classify_calendar_label, group_activities, metrics, round2,
    ActivityGroups, AvailabilityMetrics, AvailabilityWindow, DowntimeBuckets, GroupedActivity,
};
pub use calendar_expander::{days_in_month, is_first_day_of_month, CalendarExpander};
pub use clock::{Clock, FixedClock, SystemClock};
