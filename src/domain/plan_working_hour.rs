// ==========================================
// 矿山运营报表系统 - 工时计划领域模型
// ==========================================
// PlanWorkingHour (月度计划头) 1—* DailyPlan (日计划) 1—* ActivityHourEntry (活动工时)
// ActivityHourEntry *—1 Activity (主数据，只读)
// ==========================================

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::domain::types::ActivityStatus;

// ==========================================
// PlanTotals - 月度汇总值
// ==========================================
// 计划头上的全部数值字段；日计划由它派生
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanTotals {
    pub total_calendar_days: i32,
    pub total_holiday_days: i32,
    pub total_available_days: i32,
    pub total_working_hour_month: f64,
    pub total_working_day_longshift: f64,
    pub total_working_hour_day: f64,
    pub total_working_hour_longshift: f64,
    pub total_mohh_per_month: f64,
}

impl PlanTotals {
    /// 可用天数 + 假日天数 == 日历天数
    pub fn days_balanced(&self) -> bool {
        self.total_available_days + self.total_holiday_days == self.total_calendar_days
    }
}

// ==========================================
// PlanWorkingHour - 月度工时计划头
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanWorkingHour {
    pub id: String,
    pub plan_date: NaiveDate,           // 必须为当月 1 日
    #[serde(flatten)]
    pub totals: PlanTotals,
    pub revision: i32,                  // 乐观锁：每次 update +1
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub deleted_at: Option<NaiveDateTime>,
}

impl PlanWorkingHour {
    /// 计划月份键（YYYY-MM）
    pub fn plan_month(&self) -> String {
        month_key(self.plan_date)
    }
}

/// 日期对应的月份键（YYYY-MM）
pub fn month_key(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

// ==========================================
// DailyPlan - 日计划
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyPlan {
    pub id: String,
    pub plan_working_hour_id: String,
    pub plan_date: NaiveDate,
    pub is_calendar_day: bool,
    pub is_holiday_day: bool,
    pub is_schedule_day: bool,
    pub schedule_day: Option<f64>,      // 0 / 0.5 / 1
    pub working_hour_month: f64,        // 月总工时 ÷ 当月天数
    pub working_hour_day: f64,
    pub working_day_longshift: f64,
    pub working_hour_longshift: f64,
    pub mohh_per_month: f64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub deleted_at: Option<NaiveDateTime>,
}

// ==========================================
// ActivityHourEntry - 日计划 × 活动 的工时分配
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityHourEntry {
    pub id: String,
    pub daily_plan_id: String,
    pub activity_id: String,
    pub activities_hour: f64,
    pub created_at: NaiveDateTime,
}

// ==========================================
// ActivityHourTemplate - 输入明细模板行
// ==========================================
// 创建/更新时客户端提交的 {activityId, activitiesHour}，每天套用同一模板
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityHourTemplate {
    pub activity_id: String,
    pub activities_hour: f64,
}

impl ActivityHourTemplate {
    pub fn new(activity_id: impl Into<String>, activities_hour: f64) -> Self {
        Self {
            activity_id: activity_id.into(),
            activities_hour,
        }
    }
}

// ==========================================
// Activity - 活动主数据（外部，只读）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: String,
    pub name: String,
    pub status: ActivityStatus,
}
