// ==========================================
// 工时计划 API - 业务校验
// ==========================================
// 红线: 所有校验在任何写入之前完成（fail fast）
// 规则:
// - planDate 必须为当月 1 日，且不早于当前月份
// - 可用天数 + 假日天数 == 日历天数，数值字段非负
// - 明细非空、活动唯一、工时非负、活动必须存在
// - scheduleDay 只能是 0 / 0.5 / 1
// ==========================================

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};

use crate::api::error::{ApiError, ApiResult};
use crate::domain::plan_working_hour::{month_key, Activity, ActivityHourTemplate, PlanTotals};
use crate::domain::types::CalendarLabel;
use crate::engine::activity_ledger::validate_template;
use crate::engine::calendar_expander::is_first_day_of_month;
use crate::i18n::t_with_args;

const SCHEDULE_DAY_WEIGHTS: [f64; 3] = [0.0, 0.5, 1.0];

fn invalid(key: &str, args: &[(&str, &str)]) -> ApiError {
    ApiError::ValidationError(t_with_args(key, args))
}

/// planDate: 当月 1 日，且月份不早于今天所在月份
pub fn validate_plan_date(plan_date: NaiveDate, today: NaiveDate) -> ApiResult<()> {
    if !is_first_day_of_month(plan_date) {
        return Err(invalid(
            "plan.validation.plan_date_not_first_day",
            &[("date", &plan_date.to_string())],
        ));
    }

    if (plan_date.year(), plan_date.month()) < (today.year(), today.month()) {
        return Err(invalid(
            "plan.validation.plan_month_past",
            &[("month", &month_key(plan_date))],
        ));
    }

    Ok(())
}

/// 汇总值: 天数 + 工时
pub fn validate_totals(totals: &PlanTotals) -> ApiResult<()> {
    validate_day_counts(totals)?;
    validate_hour_totals(totals)
}

/// 天数字段: 非负，且可用天数 + 假日天数 == 日历天数
pub fn validate_day_counts(totals: &PlanTotals) -> ApiResult<()> {
    let day_fields = [
        ("totalCalendarDays", totals.total_calendar_days),
        ("totalHolidayDays", totals.total_holiday_days),
        ("totalAvailableDays", totals.total_available_days),
    ];
    for (field, value) in day_fields {
        if value < 0 {
            return Err(invalid("plan.validation.negative_total", &[("field", field)]));
        }
    }

    if !totals.days_balanced() {
        return Err(invalid(
            "plan.validation.days_sum_mismatch",
            &[
                ("available", &totals.total_available_days.to_string()),
                ("holiday", &totals.total_holiday_days.to_string()),
                ("calendar", &totals.total_calendar_days.to_string()),
            ],
        ));
    }

    Ok(())
}

/// 工时字段: 非负
pub fn validate_hour_totals(totals: &PlanTotals) -> ApiResult<()> {
    validate_non_negative(&[
        ("totalWorkingHourMonth", totals.total_working_hour_month),
        ("totalWorkingDayLongshift", totals.total_working_day_longshift),
        ("totalWorkingHourDay", totals.total_working_hour_day),
        ("totalWorkingHourLongshift", totals.total_working_hour_longshift),
        ("totalMohhPerMonth", totals.total_mohh_per_month),
    ])
}

/// 浮点字段非负且有限
pub fn validate_non_negative(fields: &[(&str, f64)]) -> ApiResult<()> {
    for (field, value) in fields {
        if !value.is_finite() || *value < 0.0 {
            return Err(invalid("plan.validation.negative_total", &[("field", field)]));
        }
    }
    Ok(())
}

/// 明细模板: 结构规则 + 活动存在性
pub fn validate_detail(
    detail: &[ActivityHourTemplate],
    activity_lookup: &HashMap<String, Activity>,
) -> ApiResult<()> {
    validate_template(detail)?;

    if let Some(missing) = detail
        .iter()
        .find(|row| !activity_lookup.contains_key(&row.activity_id))
    {
        return Err(invalid(
            "plan.validation.activity_not_found",
            &[("activity_id", &missing.activity_id)],
        ));
    }

    Ok(())
}

/// scheduleDay 权重
pub fn validate_schedule_day(weight: f64) -> ApiResult<()> {
    if SCHEDULE_DAY_WEIGHTS.iter().any(|w| (*w - weight).abs() < f64::EPSILON) {
        Ok(())
    } else {
        Err(invalid(
            "plan.validation.schedule_day_invalid",
            &[("value", &weight.to_string())],
        ))
    }
}

/// 解析 calendarDay 过滤值
pub fn parse_calendar_day(raw: Option<&str>) -> ApiResult<Option<CalendarLabel>> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(value) => value
            .parse::<CalendarLabel>()
            .map(Some)
            .map_err(|_| invalid("plan.validation.calendar_day_invalid", &[("value", value)])),
    }
}

/// 日期区间: start <= end
pub fn validate_date_range(start: Option<NaiveDate>, end: Option<NaiveDate>) -> ApiResult<()> {
    if let (Some(start), Some(end)) = (start, end) {
        if start > end {
            return Err(invalid(
                "plan.validation.date_range_invalid",
                &[("start", &start.to_string()), ("end", &end.to_string())],
            ));
        }
    }
    Ok(())
}
