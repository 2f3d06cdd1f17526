// ==========================================
// 矿山运营报表系统 - 工时计划 API（编排层）
// ==========================================
// 职责: 月度计划的创建 / 更新 / 删除、单日编辑，以及读时计算指标的查询
// 流程: 校验 → 计划头 → 日历展开 → 活动工时台账（同一工作单元）
// 红线:
// - 校验全部在写入前完成，写入失败整体回滚
// - 活动目录只在工作单元之外读取（与仓储共享同一连接）
// - “今天”由 Clock 注入
// ==========================================

mod dto;
mod queries;
mod validation;

pub use dto::{
    CreatePlanInput, CreatedPlanView, DailyDetailView, DailyPlanMetricsView, HeaderReadView,
    PlanDetailQuery, PlanListQuery, PlanSummaryView, UpdateDailyPlanInput, UpdatePlanInput,
};

use std::sync::{Arc, Mutex};

use rusqlite::Connection;
use tracing::instrument;

use crate::api::error::{ApiError, ApiResult};
use crate::config::{ConfigManager, PaginationConfig};
use crate::domain::plan_working_hour::{month_key, PlanWorkingHour};
use crate::engine::activity_ledger::ActivityHourLedger;
use crate::engine::availability::availability_window;
use crate::engine::calendar_expander::CalendarExpander;
use crate::engine::clock::Clock;
use crate::i18n::t_with_args;
use crate::repository::activity_repo::{ActivityDirectory, ActivityRepository};
use crate::repository::error::RepositoryError;
use crate::repository::plan_working_hour_repo::{
    ActivityHourRepository, DailyPlanRepository, PlanWorkingHourRepository,
};
use crate::repository::unit_of_work::UnitOfWork;

use validation::{
    validate_day_counts, validate_detail, validate_hour_totals, validate_non_negative,
    validate_plan_date, validate_schedule_day, validate_totals,
};

// ==========================================
// PlanWorkingHourApi - 工时计划 API
// ==========================================

/// 工时计划API
///
/// 职责：
/// 1. 月度计划管理（创建、更新、软删除）
/// 2. 单日计划编辑与软删除（仅限未来日期）
/// 3. 明细查询（分页，读时计算 EWH / PA / MA / UA / EU）
pub struct PlanWorkingHourApi {
    unit_of_work: UnitOfWork,
    header_repo: Arc<PlanWorkingHourRepository>,
    daily_repo: Arc<DailyPlanRepository>,
    activity_hour_repo: Arc<ActivityHourRepository>,
    activity_directory: Arc<dyn ActivityDirectory>,
    expander: CalendarExpander,
    ledger: ActivityHourLedger,
    clock: Arc<dyn Clock>,
    pagination: PaginationConfig,
}

impl PlanWorkingHourApi {
    /// 创建新的PlanWorkingHourApi实例
    pub fn new(
        conn: Arc<Mutex<Connection>>,
        activity_directory: Arc<dyn ActivityDirectory>,
        clock: Arc<dyn Clock>,
        pagination: PaginationConfig,
    ) -> Self {
        Self {
            unit_of_work: UnitOfWork::new(conn.clone()),
            header_repo: Arc::new(PlanWorkingHourRepository::new(conn.clone())),
            daily_repo: Arc::new(DailyPlanRepository::new(conn.clone())),
            activity_hour_repo: Arc::new(ActivityHourRepository::new(conn)),
            activity_directory,
            expander: CalendarExpander::new(),
            ledger: ActivityHourLedger::new(),
            clock,
            pagination,
        }
    }

    /// 从共享连接装配（活动目录使用 activities 表，分页读取 config_kv）
    pub fn from_connection(conn: Arc<Mutex<Connection>>, clock: Arc<dyn Clock>) -> ApiResult<Self> {
        let pagination = ConfigManager::from_connection(conn.clone()).pagination_config()?;
        let activity_directory: Arc<dyn ActivityDirectory> =
            Arc::new(ActivityRepository::new(conn.clone()));
        Ok(Self::new(conn, activity_directory, clock, pagination))
    }

    // ==========================================
    // 月度计划管理
    // ==========================================

    /// 创建月度计划
    ///
    /// # 流程
    /// 1. 校验 planDate / 汇总值 / 明细
    /// 2. 工作单元内: 同月查重 → 写计划头 → 展开日计划 → 生成活动工时
    ///
    /// # 返回
    /// - Ok(CreatedPlanView): 计划头与全部日计划
    /// - Err(ApiError): ValidationError / Conflict / 存储错误
    #[instrument(skip(self, input), fields(plan_date = %input.plan_date))]
    pub fn create_plan(&self, input: CreatePlanInput) -> ApiResult<CreatedPlanView> {
        let today = self.clock.today();
        let now = self.clock.now();

        validate_plan_date(input.plan_date, today).map_err(log_rejected)?;
        validate_totals(&input.totals).map_err(log_rejected)?;
        let lookup = self.activity_directory.activity_lookup()?;
        validate_detail(&input.detail, &lookup).map_err(log_rejected)?;

        let header = PlanWorkingHour {
            id: uuid::Uuid::new_v4().to_string(),
            plan_date: input.plan_date,
            totals: input.totals,
            revision: 1,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        let plan_month = header.plan_month();

        let (daily_plans, activity_hour_count) = self.unit_of_work.run(|tx| {
            if PlanWorkingHourRepository::find_active_by_month_tx(tx, &plan_month, None)?
                .is_some()
            {
                return Err(duplicate_month(&plan_month));
            }

            PlanWorkingHourRepository::insert_tx(tx, &header)
                .map_err(|e| map_month_conflict(e, &plan_month))?;

            let days = self
                .expander
                .expand(&header.id, header.plan_date, &header.totals, now);
            DailyPlanRepository::insert_batch_tx(tx, &days)?;

            let entries = self.ledger.materialize(&days, &input.detail, now);
            let inserted = ActivityHourRepository::insert_batch_tx(tx, &entries)?;

            Ok::<_, ApiError>((days, inserted))
        })?;

        tracing::info!(
            header_id = %header.id,
            month = %plan_month,
            days = daily_plans.len(),
            activity_hours = activity_hour_count,
            "月度工时计划已创建"
        );

        Ok(CreatedPlanView {
            header,
            daily_plans,
            activity_hour_count,
        })
    }

    /// 更新月度计划
    ///
    /// # 规则
    /// - 汇总值按字段合并，日计划原地刷新（不重建，id 不变）
    /// - 只有提交了天数字段时才重新校验天数合计
    /// - detail 非空时整体替换活动工时，否则保持不变
    /// - 提供 expectedRevision 时与库中 revision 比对，不一致返回 Conflict
    /// - 修改 planDate 只做月份校验与查重，不重排已有日计划的日期
    ///
    /// # 返回
    /// - 与 get_plan 相同的读模型
    #[instrument(skip(self, patch))]
    pub fn update_plan(&self, id: &str, patch: UpdatePlanInput) -> ApiResult<HeaderReadView> {
        let today = self.clock.today();
        let now = self.clock.now();

        if let Some(plan_date) = patch.plan_date {
            validate_plan_date(plan_date, today).map_err(log_rejected)?;
        }
        let new_detail = patch.detail.as_deref().filter(|d| !d.is_empty());
        if let Some(detail) = new_detail {
            let lookup = self.activity_directory.activity_lookup()?;
            validate_detail(detail, &lookup).map_err(log_rejected)?;
        }

        let updated = self.unit_of_work.run(|tx| {
            let current = PlanWorkingHourRepository::find_by_id_tx(tx, id)?
                .ok_or_else(|| header_not_found(id))?;

            if let Some(expected) = patch.expected_revision {
                if expected != current.revision {
                    return Err(RepositoryError::OptimisticLockFailure {
                        id: id.to_string(),
                        expected,
                        actual: current.revision,
                    }
                    .into());
                }
            }

            let plan_date = patch.plan_date.unwrap_or(current.plan_date);
            let plan_month = month_key(plan_date);
            if patch.plan_date.is_some()
                && PlanWorkingHourRepository::find_active_by_month_tx(tx, &plan_month, Some(id))?
                    .is_some()
            {
                return Err(duplicate_month(&plan_month));
            }

            let totals = patch.merge_into(&current.totals);
            validate_hour_totals(&totals)?;
            if patch.touches_day_counts() {
                validate_day_counts(&totals)?;
            }

            let updated = PlanWorkingHour {
                plan_date,
                totals,
                revision: current.revision + 1,
                updated_at: now,
                ..current
            };
            if PlanWorkingHourRepository::update_tx(tx, &updated)
                .map_err(|e| map_month_conflict(e, &plan_month))?
                == 0
            {
                return Err(header_not_found(id));
            }

            let mut days = DailyPlanRepository::find_by_header_tx(tx, id)?;
            self.expander.refresh_from_totals(&mut days, &updated.totals, now);
            for day in &days {
                DailyPlanRepository::update_tx(tx, day)?;
            }

            if let Some(detail) = new_detail {
                self.ledger.replace_for_header(tx, id, detail, now)?;
            }

            Ok::<_, ApiError>(updated)
        })
        .map_err(log_rejected)?;

        tracing::info!(
            header_id = %id,
            month = %updated.plan_month(),
            revision = updated.revision,
            detail_replaced = new_detail.is_some(),
            "月度工时计划已更新"
        );

        self.get_plan(id)
    }

    /// 软删除月度计划
    ///
    /// 日计划与活动工时保留（不级联），查询中不再可见
    #[instrument(skip(self))]
    pub fn remove_plan(&self, id: &str) -> ApiResult<()> {
        let now = self.clock.now();

        self.unit_of_work.run(|tx| {
            if PlanWorkingHourRepository::soft_delete_tx(tx, id, &now)? == 0 {
                return Err(header_not_found(id));
            }
            Ok::<_, ApiError>(())
        })?;

        tracing::info!(header_id = %id, "月度工时计划已删除");
        Ok(())
    }

    // ==========================================
    // 单日计划
    // ==========================================

    /// 编辑单日计划（仅限今天之后的日期）
    ///
    /// scheduleDay = 0 时视为假日，否则为日历日 + 排班日
    #[instrument(skip(self, patch))]
    pub fn update_daily_plan(
        &self,
        daily_plan_id: &str,
        patch: UpdateDailyPlanInput,
    ) -> ApiResult<DailyDetailView> {
        let today = self.clock.today();
        let now = self.clock.now();

        if let Some(weight) = patch.schedule_day {
            validate_schedule_day(weight).map_err(log_rejected)?;
        }
        let hour_fields: Vec<(&str, f64)> = [
            ("workingHourDay", patch.working_hour_day),
            ("workingHourLongshift", patch.working_hour_longshift),
            ("workingDayLongshift", patch.working_day_longshift),
            ("mohhPerMonth", patch.mohh_per_month),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.map(|v| (field, v)))
        .collect();
        validate_non_negative(&hour_fields).map_err(log_rejected)?;

        let new_detail = patch.detail.as_deref().filter(|d| !d.is_empty());
        if let Some(detail) = new_detail {
            let lookup = self.activity_directory.activity_lookup()?;
            validate_detail(detail, &lookup).map_err(log_rejected)?;
        }

        self.unit_of_work
            .run(|tx| {
                let mut day = DailyPlanRepository::find_by_id_tx(tx, daily_plan_id)?
                    .ok_or_else(|| daily_not_found(daily_plan_id))?;

                if !availability_window(day.plan_date, today).editable {
                    return Err(ApiError::ValidationError(t_with_args(
                        "plan.validation.day_not_editable",
                        &[("date", &day.plan_date.to_string())],
                    )));
                }

                if let Some(weight) = patch.schedule_day {
                    let is_holiday_day = weight <= 0.0;
                    day.schedule_day = Some(weight);
                    day.is_holiday_day = is_holiday_day;
                    day.is_calendar_day = !is_holiday_day;
                    day.is_schedule_day = !is_holiday_day;
                }
                if let Some(v) = patch.working_hour_day {
                    day.working_hour_day = v;
                }
                if let Some(v) = patch.working_hour_longshift {
                    day.working_hour_longshift = v;
                }
                if let Some(v) = patch.working_day_longshift {
                    day.working_day_longshift = v;
                }
                if let Some(v) = patch.mohh_per_month {
                    day.mohh_per_month = v;
                }
                day.updated_at = now;

                DailyPlanRepository::update_tx(tx, &day)?;
                if let Some(detail) = new_detail {
                    self.ledger.replace_for_day(tx, &day, detail, now)?;
                }
                Ok::<_, ApiError>(())
            })
            .map_err(log_rejected)?;

        tracing::info!(daily_plan_id, "日计划已更新");
        self.get_plan_detail_by_id(daily_plan_id)
    }

    /// 软删除单日计划（仅限今天之后的日期，活动工时保留）
    #[instrument(skip(self))]
    pub fn remove_daily_plan(&self, daily_plan_id: &str) -> ApiResult<()> {
        let today = self.clock.today();
        let now = self.clock.now();

        self.unit_of_work
            .run(|tx| {
                let day = DailyPlanRepository::find_by_id_tx(tx, daily_plan_id)?
                    .ok_or_else(|| daily_not_found(daily_plan_id))?;

                if !availability_window(day.plan_date, today).deletable {
                    return Err(ApiError::ValidationError(t_with_args(
                        "plan.validation.day_not_deletable",
                        &[("date", &day.plan_date.to_string())],
                    )));
                }

                DailyPlanRepository::soft_delete_tx(tx, daily_plan_id, &now)?;
                Ok::<_, ApiError>(())
            })
            .map_err(log_rejected)?;

        tracing::info!(daily_plan_id, "日计划已删除");
        Ok(())
    }
}

// ==========================================
// 错误构造
// ==========================================

fn header_not_found(id: &str) -> ApiError {
    ApiError::NotFound(t_with_args("plan.not_found.header", &[("id", id)]))
}

fn daily_not_found(id: &str) -> ApiError {
    ApiError::NotFound(t_with_args("plan.not_found.daily", &[("id", id)]))
}

fn duplicate_month(plan_month: &str) -> ApiError {
    ApiError::Conflict(t_with_args(
        "plan.validation.duplicate_month",
        &[("month", plan_month)],
    ))
}

/// 唯一索引兜底：同月并发创建时由存储层拦截
fn map_month_conflict(err: RepositoryError, plan_month: &str) -> ApiError {
    match err {
        RepositoryError::UniqueConstraintViolation(_) => duplicate_month(plan_month),
        other => other.into(),
    }
}

fn log_rejected(err: ApiError) -> ApiError {
    if err.is_storage_error() {
        tracing::error!(error = %err, "工时计划写入失败");
    } else {
        tracing::warn!(error = %err, "工时计划请求被拒绝");
    }
    err
}
