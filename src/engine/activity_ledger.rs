// ==========================================
// 矿山运营报表系统 - 活动工时台账
// ==========================================
// 职责:
// - 校验输入模板（活动唯一、工时非负）
// - 日计划 × 模板 做笛卡尔积，生成活动工时
// - 按计划头 / 单日整体替换活动工时（先删后建，同一事务）
// 红线: 模板校验失败必须在任何删除之前返回（fail closed）
// ==========================================

use std::collections::HashSet;

use chrono::NaiveDateTime;
use rusqlite::Connection;
use thiserror::Error;

use crate::domain::plan_working_hour::{ActivityHourEntry, ActivityHourTemplate, DailyPlan};
use crate::repository::error::RepositoryError;
use crate::repository::plan_working_hour_repo::{ActivityHourRepository, DailyPlanRepository};

/// 台账错误
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("活动工时模板为空")]
    EmptyTemplate,

    #[error("活动重复: activity_id={0}")]
    DuplicateActivity(String),

    #[error("活动工时无效: activity_id={activity_id}, hours={hours}")]
    InvalidHours { activity_id: String, hours: f64 },

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

pub type LedgerResult<T> = Result<T, LedgerError>;

/// 校验模板: 非空、activity_id 唯一、工时为有限非负数
pub fn validate_template(template: &[ActivityHourTemplate]) -> LedgerResult<()> {
    if template.is_empty() {
        return Err(LedgerError::EmptyTemplate);
    }

    let mut seen: HashSet<&str> = HashSet::with_capacity(template.len());
    for row in template {
        if !seen.insert(row.activity_id.as_str()) {
            return Err(LedgerError::DuplicateActivity(row.activity_id.clone()));
        }
        if !row.activities_hour.is_finite() || row.activities_hour < 0.0 {
            return Err(LedgerError::InvalidHours {
                activity_id: row.activity_id.clone(),
                hours: row.activities_hour,
            });
        }
    }
    Ok(())
}

// ==========================================
// ActivityHourLedger - 活动工时台账
// ==========================================
#[derive(Debug, Default)]
pub struct ActivityHourLedger;

impl ActivityHourLedger {
    pub fn new() -> Self {
        Self
    }

    /// 日计划 × 模板 笛卡尔积
    ///
    /// 模板需已通过 validate_template，(daily_plan_id, activity_id) 因此唯一
    pub fn materialize(
        &self,
        daily_plans: &[DailyPlan],
        template: &[ActivityHourTemplate],
        now: NaiveDateTime,
    ) -> Vec<ActivityHourEntry> {
        daily_plans
            .iter()
            .flat_map(|day| {
                template.iter().map(move |row| ActivityHourEntry {
                    id: uuid::Uuid::new_v4().to_string(),
                    daily_plan_id: day.id.clone(),
                    activity_id: row.activity_id.clone(),
                    activities_hour: row.activities_hour,
                    created_at: now,
                })
            })
            .collect()
    }

    /// 整体替换计划头下所有有效日计划的活动工时
    ///
    /// # 红线
    /// - 必须在工作单元（事务）中调用，删除与重建同成同败
    ///
    /// # 返回
    /// - 新写入的条数
    pub fn replace_for_header(
        &self,
        tx: &Connection,
        header_id: &str,
        template: &[ActivityHourTemplate],
        now: NaiveDateTime,
    ) -> LedgerResult<usize> {
        validate_template(template)?;

        let removed = ActivityHourRepository::delete_by_header_tx(tx, header_id)?;
        let days = DailyPlanRepository::find_by_header_tx(tx, header_id)?;
        let entries = self.materialize(&days, template, now);
        let inserted = ActivityHourRepository::insert_batch_tx(tx, &entries)?;

        tracing::debug!(header_id, removed, inserted, "活动工时已按计划头替换");
        Ok(inserted)
    }

    /// 整体替换单个日计划的活动工时
    pub fn replace_for_day(
        &self,
        tx: &Connection,
        day: &DailyPlan,
        template: &[ActivityHourTemplate],
        now: NaiveDateTime,
    ) -> LedgerResult<usize> {
        validate_template(template)?;

        ActivityHourRepository::delete_by_daily_plan_tx(tx, &day.id)?;
        let entries = self.materialize(std::slice::from_ref(day), template, now);
        let inserted = ActivityHourRepository::insert_batch_tx(tx, &entries)?;
        Ok(inserted)
    }
}
