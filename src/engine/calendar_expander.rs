// ==========================================
// 矿山运营报表系统 - 日历展开器
// ==========================================
// 职责: 把月度计划头展开为当月每天一条日计划
// 输入: 当月 1 日（由编排层校验）+ 月度汇总值
// 输出: DailyPlan 列表（纯计算，不落库）
// 规则:
// - 周日 → 假日（非日历日、非排班日，schedule_day = 0）
// - 其余 → 日历日 + 排班日（schedule_day = 1）
// - working_hour_month = 月总工时 ÷ 当月天数（平均分摊，不区分假日）
// ==========================================

use chrono::{Datelike, NaiveDate, NaiveDateTime, Weekday};
use tracing::instrument;

use crate::domain::plan_working_hour::{DailyPlan, PlanTotals};

/// 当月天数
///
/// 每月至少 28 天；29..=31 日逐个交给 chrono 判断是否存在（含闰年二月）
pub fn days_in_month(date: NaiveDate) -> u32 {
    (29..=31)
        .take_while(|&day| NaiveDate::from_ymd_opt(date.year(), date.month(), day).is_some())
        .last()
        .unwrap_or(28)
}

/// 是否为当月 1 日
pub fn is_first_day_of_month(date: NaiveDate) -> bool {
    date.day() == 1
}

// ==========================================
// CalendarExpander - 日历展开器
// ==========================================
#[derive(Debug, Default)]
pub struct CalendarExpander;

impl CalendarExpander {
    pub fn new() -> Self {
        Self
    }

    /// 展开当月日计划
    ///
    /// # 参数
    /// - `plan_working_hour_id`: 所属计划头
    /// - `plan_date`: 当月 1 日
    /// - `totals`: 计划头汇总值
    /// - `now`: 写入 created_at / updated_at
    #[instrument(skip(self, totals), fields(month = %plan_date.format("%Y-%m")))]
    pub fn expand(
        &self,
        plan_working_hour_id: &str,
        plan_date: NaiveDate,
        totals: &PlanTotals,
        now: NaiveDateTime,
    ) -> Vec<DailyPlan> {
        let total_days = days_in_month(plan_date);
        let working_hour_month = totals.total_working_hour_month / total_days as f64;

        let days: Vec<DailyPlan> = (1..=total_days)
            .filter_map(|day| plan_date.with_day(day))
            .map(|date| {
                let is_holiday_day = date.weekday() == Weekday::Sun;
                DailyPlan {
                    id: uuid::Uuid::new_v4().to_string(),
                    plan_working_hour_id: plan_working_hour_id.to_string(),
                    plan_date: date,
                    is_calendar_day: !is_holiday_day,
                    is_holiday_day,
                    is_schedule_day: !is_holiday_day,
                    schedule_day: Some(if is_holiday_day { 0.0 } else { 1.0 }),
                    working_hour_month,
                    working_hour_day: totals.total_working_hour_day,
                    working_day_longshift: totals.total_working_day_longshift,
                    working_hour_longshift: totals.total_working_hour_longshift,
                    mohh_per_month: totals.total_mohh_per_month,
                    created_at: now,
                    updated_at: now,
                    deleted_at: None,
                }
            })
            .collect();

        tracing::debug!(days = days.len(), "日计划展开完成");
        days
    }

    /// 用新的汇总值原地刷新已有日计划（保留 id 与日历分类）
    ///
    /// working_hour_month 按现有天数重新平均分摊
    pub fn refresh_from_totals(
        &self,
        days: &mut [DailyPlan],
        totals: &PlanTotals,
        now: NaiveDateTime,
    ) {
        if days.is_empty() {
            return;
        }
        let working_hour_month = totals.total_working_hour_month / days.len() as f64;

        for day in days.iter_mut() {
            day.working_day_longshift = totals.total_working_day_longshift;
            day.working_hour_longshift = totals.total_working_hour_longshift;
            day.working_hour_month = working_hour_month;
            day.working_hour_day = totals.total_working_hour_day;
            day.mohh_per_month = totals.total_mohh_per_month;
            day.updated_at = now;
        }
    }
}
