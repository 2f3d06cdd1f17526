use anyhow::Context;
use chrono::{Datelike, Months, NaiveDate};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

use mine_ops_report::api::{CreatePlanInput, PlanDetailQuery, PlanWorkingHourApi};
use mine_ops_report::config::ConfigManager;
use mine_ops_report::db::{get_default_db_path, init_schema, open_sqlite_connection};
use mine_ops_report::domain::{ActivityHourTemplate, PlanTotals};
use mine_ops_report::engine::{days_in_month, Clock, SystemClock};
use mine_ops_report::{i18n, logging};

// (id, name, status)
const SEED_ACTIVITIES: [(&str, &str, &str); 6] = [
    ("ACT-LOAD", "Loading", "working"),
    ("ACT-HAUL", "Hauling", "working"),
    ("ACT-RAIN", "Rain", "delay"),
    ("ACT-P2H", "P2H Check", "delay"),
    ("ACT-STBY", "Standby", "idle"),
    ("ACT-BD", "Unscheduled Breakdown", "breakdown"),
];

fn main() -> anyhow::Result<()> {
    // MINE_OPS_LOG_FORMAT=json 时输出 JSON 日志
    match std::env::var("MINE_OPS_LOG_FORMAT").as_deref() {
        Ok("json") => logging::init_json(),
        _ => logging::init(),
    }

    let db_path = std::env::args()
        .nth(1)
        .unwrap_or_else(get_default_db_path);

    let conn = open_sqlite_connection(&db_path)
        .with_context(|| format!("无法打开数据库: {}", db_path))?;
    init_schema(&conn).context("schema 初始化失败")?;
    let seeded = seed_activities(&conn)?;
    tracing::info!(db_path = %db_path, seeded, "数据库已就绪");

    let conn = Arc::new(Mutex::new(conn));
    let locale = ConfigManager::from_connection(conn.clone()).locale()?;
    i18n::set_locale(&locale);

    let clock = Arc::new(SystemClock);
    let plan_date = next_month_first_day(clock.today()).context("下月日期超出范围")?;
    let api = PlanWorkingHourApi::from_connection(conn, clock)?;

    let created = api
        .create_plan(build_input(plan_date))
        .with_context(|| format!("创建 {} 月度计划失败", plan_date))?;
    eprintln!(
        "Created plan {} for {} ({} days, {} activity hours)",
        created.header.id,
        created.header.plan_month(),
        created.daily_plans.len(),
        created.activity_hour_count
    );

    let first_page = api.get_plan_detail_list(PlanDetailQuery {
        start_date: Some(plan_date),
        ..Default::default()
    })?;
    println!("{}", serde_json::to_string_pretty(&first_page)?);

    Ok(())
}

/// activities 表为空时写入演示活动
fn seed_activities(conn: &Connection) -> anyhow::Result<usize> {
    let existing: i64 = conn.query_row("SELECT COUNT(*) FROM activities", [], |row| row.get(0))?;
    if existing > 0 {
        return Ok(0);
    }

    let mut stmt = conn.prepare("INSERT INTO activities (id, name, status) VALUES (?1, ?2, ?3)")?;
    for (id, name, status) in SEED_ACTIVITIES {
        stmt.execute(params![id, name, status])?;
    }
    Ok(SEED_ACTIVITIES.len())
}

fn next_month_first_day(today: NaiveDate) -> Option<NaiveDate> {
    today
        .with_day(1)
        .and_then(|first| first.checked_add_months(Months::new(1)))
}

fn build_input(plan_date: NaiveDate) -> CreatePlanInput {
    let calendar_days = days_in_month(plan_date) as i32;
    let sundays = (1..=calendar_days as u32)
        .filter_map(|d| plan_date.with_day(d))
        .filter(|d| d.weekday() == chrono::Weekday::Sun)
        .count() as i32;

    CreatePlanInput {
        plan_date,
        totals: PlanTotals {
            total_calendar_days: calendar_days,
            total_holiday_days: sundays,
            total_available_days: calendar_days - sundays,
            total_working_hour_month: 20.0 * calendar_days as f64,
            total_working_day_longshift: 0.0,
            total_working_hour_day: 20.0,
            total_working_hour_longshift: 0.0,
            total_mohh_per_month: 20.0,
        },
        detail: vec![
            ActivityHourTemplate::new("ACT-LOAD", 8.0),
            ActivityHourTemplate::new("ACT-HAUL", 6.5),
            ActivityHourTemplate::new("ACT-RAIN", 1.25),
            ActivityHourTemplate::new("ACT-P2H", 0.5),
            ActivityHourTemplate::new("ACT-STBY", 2.0),
            ActivityHourTemplate::new("ACT-BD", 1.75),
        ],
    }
}
