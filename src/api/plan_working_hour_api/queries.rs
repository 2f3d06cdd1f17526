use std::collections::HashMap;

use chrono::NaiveDate;

use super::dto::{
    DailyDetailView, DailyPlanMetricsView, HeaderReadView, PlanDetailQuery, PlanListQuery,
    PlanSummaryView,
};
use super::validation::{parse_calendar_day, validate_date_range};
use super::{daily_not_found, header_not_found, PlanWorkingHourApi};
use crate::api::error::ApiResult;
use crate::api::pagination::{paginate, PageWindow, PaginatedResponse};
use crate::domain::plan_working_hour::{Activity, ActivityHourEntry, DailyPlan};
use crate::engine::availability::{
    availability_window, classify, classify_calendar_label, group_activities, metrics, round2,
    ActivityGroups,
};
use crate::i18n::t;
use crate::repository::plan_working_hour_repo::DailyPlanFilter;

impl PlanWorkingHourApi {
    // ==========================================
    // 查询接口
    // ==========================================

    /// 查询月度计划（表单回显）
    ///
    /// activities 取最早一个有效日计划的活动工时，按状态分组
    pub fn get_plan(&self, id: &str) -> ApiResult<HeaderReadView> {
        let header = self
            .header_repo
            .find_by_id(id)?
            .ok_or_else(|| header_not_found(id))?;

        let days = self.daily_repo.find_by_header(id)?;
        let activities = match days.first() {
            Some(first_day) => {
                let entries = self.activity_hour_repo.find_by_daily_plan(&first_day.id)?;
                let lookup = self.activity_directory.activity_lookup()?;
                group_activities(&entries, &lookup)
            }
            None => ActivityGroups::default(),
        };

        let window = availability_window(header.plan_date, self.clock.today());
        Ok(HeaderReadView {
            header,
            daily_plan_count: days.len(),
            is_available_to_edit: window.editable,
            is_available_to_delete: window.deletable,
            activities,
        })
    }

    /// 分页查询月度计划（按 planDate 降序）
    pub fn list_plans(&self, query: PlanListQuery) -> ApiResult<PaginatedResponse<PlanSummaryView>> {
        let window = PageWindow::resolve(query.page, query.limit, &self.pagination)?;
        let today = self.clock.today();

        let total = self.header_repo.count_active(query.year)?;
        let rows = self
            .header_repo
            .list_active_paged(query.year, window.limit, window.offset())?
            .into_iter()
            .map(|header| {
                let flags = availability_window(header.plan_date, today);
                PlanSummaryView {
                    header,
                    is_available_to_edit: flags.editable,
                    is_available_to_delete: flags.deletable,
                }
            })
            .collect();

        Ok(paginate(
            rows,
            total,
            window.page,
            window.limit,
            t("plan.response.plan_list"),
        ))
    }

    /// 分页查询日计划明细（按 planDate 升序，读时计算指标）
    pub fn get_plan_detail_list(
        &self,
        query: PlanDetailQuery,
    ) -> ApiResult<PaginatedResponse<DailyPlanMetricsView>> {
        validate_date_range(query.start_date, query.end_date)?;
        let filter = DailyPlanFilter {
            start_date: query.start_date,
            end_date: query.end_date,
            calendar_day: parse_calendar_day(query.calendar_day.as_deref())?,
        };
        let window = PageWindow::resolve(query.page, query.limit, &self.pagination)?;

        let total = self.daily_repo.count(&filter)?;
        let days = self
            .daily_repo
            .find_paged(&filter, window.limit, window.offset())?;

        let ids: Vec<String> = days.iter().map(|d| d.id.clone()).collect();
        let mut entries_by_day = self.activity_hour_repo.find_by_daily_plan_ids(&ids)?;
        let lookup = self.activity_directory.activity_lookup()?;
        let today = self.clock.today();

        let rows = days
            .iter()
            .map(|day| {
                let entries = entries_by_day.remove(&day.id).unwrap_or_default();
                build_metrics_view(day, &entries, &lookup, today)
            })
            .collect();

        tracing::debug!(total, page = window.page, "日计划明细查询完成");
        Ok(paginate(
            rows,
            total,
            window.page,
            window.limit,
            t("plan.response.detail_list"),
        ))
    }

    /// 查询单日明细（指标 + 五组活动）
    pub fn get_plan_detail_by_id(&self, daily_plan_id: &str) -> ApiResult<DailyDetailView> {
        let day = self
            .daily_repo
            .find_by_id(daily_plan_id)?
            .ok_or_else(|| daily_not_found(daily_plan_id))?;

        let entries = self.activity_hour_repo.find_by_daily_plan(&day.id)?;
        let lookup = self.activity_directory.activity_lookup()?;

        Ok(DailyDetailView {
            metrics: build_metrics_view(&day, &entries, &lookup, self.clock.today()),
            activities: group_activities(&entries, &lookup),
        })
    }
}

/// 单日指标行
fn build_metrics_view(
    day: &DailyPlan,
    entries: &[ActivityHourEntry],
    lookup: &HashMap<String, Activity>,
    today: NaiveDate,
) -> DailyPlanMetricsView {
    let buckets = classify(entries, lookup);
    let ratios = metrics(day.mohh_per_month, buckets.delay, buckets.idle, buckets.breakdown);
    let window = availability_window(day.plan_date, today);

    DailyPlanMetricsView {
        id: day.id.clone(),
        plan_working_hour_id: day.plan_working_hour_id.clone(),
        plan_date: day.plan_date,
        calendar_day: classify_calendar_label(day.schedule_day),
        schedule_day: day.schedule_day,
        is_calendar_day: day.is_calendar_day,
        is_holiday_day: day.is_holiday_day,
        is_schedule_day: day.is_schedule_day,
        working_hour_month: round2(day.working_hour_month),
        working_hour_day: day.working_hour_day,
        working_day_longshift: day.working_day_longshift,
        working_hour_longshift: day.working_hour_longshift,
        mohh_per_month: day.mohh_per_month,
        total_delay: buckets.delay,
        total_idle: buckets.idle,
        total_breakdown: buckets.breakdown,
        ewh: ratios.ewh,
        pa: ratios.pa,
        ma: ratios.ma,
        ua: ratios.ua,
        eu: ratios.eu,
        is_available_to_edit: window.editable,
        is_available_to_delete: window.deletable,
    }
}
