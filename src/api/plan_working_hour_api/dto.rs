// ==========================================
// 工时计划 API - 输入与读模型
// ==========================================
// JSON 字段统一 camelCase
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::plan_working_hour::{ActivityHourTemplate, DailyPlan, PlanTotals, PlanWorkingHour};
use crate::domain::types::CalendarLabel;
use crate::engine::availability::ActivityGroups;

// ==========================================
// 输入
// ==========================================

/// 创建月度计划
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlanInput {
    pub plan_date: NaiveDate,
    #[serde(flatten)]
    pub totals: PlanTotals,
    pub detail: Vec<ActivityHourTemplate>,
}

/// 更新月度计划（缺省字段保持原值）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdatePlanInput {
    pub plan_date: Option<NaiveDate>,
    pub total_calendar_days: Option<i32>,
    pub total_holiday_days: Option<i32>,
    pub total_available_days: Option<i32>,
    pub total_working_hour_month: Option<f64>,
    pub total_working_day_longshift: Option<f64>,
    pub total_working_hour_day: Option<f64>,
    pub total_working_hour_longshift: Option<f64>,
    pub total_mohh_per_month: Option<f64>,
    /// 非空时整体替换活动工时
    pub detail: Option<Vec<ActivityHourTemplate>>,
    /// 提供时与库中 revision 比对
    pub expected_revision: Option<i32>,
}

impl UpdatePlanInput {
    /// 是否修改了天数字段
    pub fn touches_day_counts(&self) -> bool {
        self.total_calendar_days.is_some()
            || self.total_holiday_days.is_some()
            || self.total_available_days.is_some()
    }

    /// 合并到现有汇总值
    pub fn merge_into(&self, totals: &PlanTotals) -> PlanTotals {
        PlanTotals {
            total_calendar_days: self.total_calendar_days.unwrap_or(totals.total_calendar_days),
            total_holiday_days: self.total_holiday_days.unwrap_or(totals.total_holiday_days),
            total_available_days: self
                .total_available_days
                .unwrap_or(totals.total_available_days),
            total_working_hour_month: self
                .total_working_hour_month
                .unwrap_or(totals.total_working_hour_month),
            total_working_day_longshift: self
                .total_working_day_longshift
                .unwrap_or(totals.total_working_day_longshift),
            total_working_hour_day: self
                .total_working_hour_day
                .unwrap_or(totals.total_working_hour_day),
            total_working_hour_longshift: self
                .total_working_hour_longshift
                .unwrap_or(totals.total_working_hour_longshift),
            total_mohh_per_month: self
                .total_mohh_per_month
                .unwrap_or(totals.total_mohh_per_month),
        }
    }
}

/// 编辑单日计划
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateDailyPlanInput {
    /// 0 / 0.5 / 1
    pub schedule_day: Option<f64>,
    pub working_hour_day: Option<f64>,
    pub working_hour_longshift: Option<f64>,
    pub working_day_longshift: Option<f64>,
    pub mohh_per_month: Option<f64>,
    /// 非空时替换当天活动工时
    pub detail: Option<Vec<ActivityHourTemplate>>,
}

/// 日计划明细查询
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlanDetailQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// available / one-shift / holiday
    pub calendar_day: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// 月度计划列表查询
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlanListQuery {
    pub year: Option<i32>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

// ==========================================
// 读模型
// ==========================================

/// 单日指标（明细列表的一行）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyPlanMetricsView {
    pub id: String,
    pub plan_working_hour_id: String,
    pub plan_date: NaiveDate,
    pub calendar_day: CalendarLabel,
    pub schedule_day: Option<f64>,
    pub is_calendar_day: bool,
    pub is_holiday_day: bool,
    pub is_schedule_day: bool,
    pub working_hour_month: f64,
    pub working_hour_day: f64,
    pub working_day_longshift: f64,
    pub working_hour_longshift: f64,
    pub mohh_per_month: f64,
    pub total_delay: f64,
    pub total_idle: f64,
    pub total_breakdown: f64,
    pub ewh: f64,
    pub pa: f64,
    pub ma: f64,
    pub ua: f64,
    pub eu: f64,
    pub is_available_to_edit: bool,
    pub is_available_to_delete: bool,
}

/// 单日明细（指标 + 分组活动）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyDetailView {
    #[serde(flatten)]
    pub metrics: DailyPlanMetricsView,
    pub activities: ActivityGroups,
}

/// 创建结果: 计划头 + 展开后的日计划
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedPlanView {
    #[serde(flatten)]
    pub header: PlanWorkingHour,
    pub daily_plans: Vec<DailyPlan>,
    pub activity_hour_count: usize,
}

/// 月度计划读模型
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderReadView {
    #[serde(flatten)]
    pub header: PlanWorkingHour,
    pub daily_plan_count: usize,
    pub is_available_to_edit: bool,
    pub is_available_to_delete: bool,
    pub activities: ActivityGroups,
}

/// 月度计划列表行
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanSummaryView {
    #[serde(flatten)]
    pub header: PlanWorkingHour,
    pub is_available_to_edit: bool,
    pub is_available_to_delete: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_input_from_camel_case_json() {
        let raw = r#"{
            "planDate": "2030-05-01",
            "totalCalendarDays": 31,
            "totalHolidayDays": 4,
            "totalAvailableDays": 27,
            "totalWorkingHourMonth": 620,
            "totalWorkingDayLongshift": 2,
            "totalWorkingHourDay": 20,
            "totalWorkingHourLongshift": 22,
            "totalMohhPerMonth": 20,
            "detail": [{"activityId": "A1", "activitiesHour": 1.5}]
        }"#;
        let input: CreatePlanInput = serde_json::from_str(raw).unwrap();
        assert_eq!(input.plan_date, NaiveDate::from_ymd_opt(2030, 5, 1).unwrap());
        assert_eq!(input.totals.total_available_days, 27);
        assert_eq!(input.detail, vec![ActivityHourTemplate::new("A1", 1.5)]);
    }

    #[test]
    fn test_update_merge_keeps_missing_fields() {
        let base = PlanTotals {
            total_calendar_days: 30,
            total_holiday_days: 4,
            total_available_days: 26,
            total_working_hour_month: 600.0,
            total_working_day_longshift: 1.0,
            total_working_hour_day: 20.0,
            total_working_hour_longshift: 22.0,
            total_mohh_per_month: 18.0,
        };
        let patch: UpdatePlanInput =
            serde_json::from_str(r#"{"totalWorkingHourMonth": 900, "expectedRevision": 2}"#)
                .unwrap();

        assert!(!patch.touches_day_counts());
        assert_eq!(patch.expected_revision, Some(2));

        let merged = patch.merge_into(&base);
        assert_eq!(merged.total_working_hour_month, 900.0);
        assert_eq!(merged.total_calendar_days, 30);
        assert_eq!(merged.total_mohh_per_month, 18.0);
    }
}
