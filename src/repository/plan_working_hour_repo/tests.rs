use super::{ActivityHourRepository, DailyPlanFilter, DailyPlanRepository, PlanWorkingHourRepository};
use crate::domain::plan_working_hour::{ActivityHourEntry, DailyPlan, PlanTotals, PlanWorkingHour};
use crate::domain::types::CalendarLabel;
use crate::repository::error::RepositoryError;
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

fn setup_test_db() -> Arc<Mutex<Connection>> {
    let conn = Connection::open_in_memory().unwrap();
    crate::db::configure_sqlite_connection(&conn).unwrap();
    crate::db::init_schema(&conn).unwrap();
    Arc::new(Mutex::new(conn))
}

fn ts() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2030, 1, 1)
        .unwrap()
        .and_hms_opt(8, 0, 0)
        .unwrap()
}

fn make_header(id: &str, plan_date: NaiveDate) -> PlanWorkingHour {
    PlanWorkingHour {
        id: id.to_string(),
        plan_date,
        totals: PlanTotals {
            total_calendar_days: 31,
            total_holiday_days: 4,
            total_available_days: 27,
            total_working_hour_month: 620.0,
            total_working_day_longshift: 2.0,
            total_working_hour_day: 20.0,
            total_working_hour_longshift: 24.0,
            total_mohh_per_month: 20.0,
        },
        revision: 1,
        created_at: ts(),
        updated_at: ts(),
        deleted_at: None,
    }
}

fn make_day(id: &str, header_id: &str, date: NaiveDate, schedule_day: Option<f64>) -> DailyPlan {
    DailyPlan {
        id: id.to_string(),
        plan_working_hour_id: header_id.to_string(),
        plan_date: date,
        is_calendar_day: true,
        is_holiday_day: false,
        is_schedule_day: true,
        schedule_day,
        working_hour_month: 20.0,
        working_hour_day: 20.0,
        working_day_longshift: 2.0,
        working_hour_longshift: 24.0,
        mohh_per_month: 20.0,
        created_at: ts(),
        updated_at: ts(),
        deleted_at: None,
    }
}

fn make_entry(id: &str, daily_id: &str, activity_id: &str, hours: f64) -> ActivityHourEntry {
    ActivityHourEntry {
        id: id.to_string(),
        daily_plan_id: daily_id.to_string(),
        activity_id: activity_id.to_string(),
        activities_hour: hours,
        created_at: ts(),
    }
}

fn d(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2030, 1, day).unwrap()
}

/// 写入一个计划头 + 三天日计划（第 3 天为假日）
fn seed(conn: &Arc<Mutex<Connection>>) {
    let guard = conn.lock().unwrap();
    PlanWorkingHourRepository::insert_tx(&guard, &make_header("H1", d(1))).unwrap();
    DailyPlanRepository::insert_batch_tx(
        &guard,
        &[
            make_day("D1", "H1", d(1), Some(1.0)),
            make_day("D2", "H1", d(2), Some(0.5)),
            make_day("D3", "H1", d(3), Some(0.0)),
        ],
    )
    .unwrap();
    ActivityHourRepository::insert_batch_tx(
        &guard,
        &[
            make_entry("E1", "D1", "A1", 10.0),
            make_entry("E2", "D1", "A2", 2.5),
            make_entry("E3", "D2", "A1", 10.0),
        ],
    )
    .unwrap();
}

#[test]
fn test_header_round_trip_and_soft_delete() {
    let conn = setup_test_db();
    seed(&conn);
    let repo = PlanWorkingHourRepository::new(conn.clone());

    let found = repo.find_by_id("H1").unwrap().unwrap();
    assert_eq!(found.plan_date, d(1));
    assert_eq!(found.totals.total_available_days, 27);
    assert_eq!(found.plan_month(), "2030-01");

    let deleted = {
        let guard = conn.lock().unwrap();
        PlanWorkingHourRepository::soft_delete_tx(&guard, "H1", &ts()).unwrap()
    };
    assert_eq!(deleted, 1);
    assert!(repo.find_by_id("H1").unwrap().is_none());
    assert!(repo.find_active_by_month("2030-01").unwrap().is_none());
}

#[test]
fn test_duplicate_active_month_is_unique_violation() {
    let conn = setup_test_db();
    seed(&conn);

    let guard = conn.lock().unwrap();
    let err = PlanWorkingHourRepository::insert_tx(&guard, &make_header("H2", d(1))).unwrap_err();
    assert!(matches!(err, RepositoryError::UniqueConstraintViolation(_)));
}

#[test]
fn test_find_active_by_month_can_exclude_self() {
    let conn = setup_test_db();
    seed(&conn);

    let guard = conn.lock().unwrap();
    let other = PlanWorkingHourRepository::find_active_by_month_tx(&guard, "2030-01", Some("H1")).unwrap();
    assert!(other.is_none());
    let any = PlanWorkingHourRepository::find_active_by_month_tx(&guard, "2030-01", None).unwrap();
    assert_eq!(any.map(|h| h.id), Some("H1".to_string()));
}

#[test]
fn test_daily_filter_by_calendar_label_and_range() {
    let conn = setup_test_db();
    seed(&conn);
    let repo = DailyPlanRepository::new(conn);

    let all = DailyPlanFilter::default();
    assert_eq!(repo.count(&all).unwrap(), 3);

    let holiday = DailyPlanFilter {
        calendar_day: Some(CalendarLabel::Holiday),
        ..Default::default()
    };
    let rows = repo.find_paged(&holiday, 10, 0).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, "D3");

    let one_shift = DailyPlanFilter {
        calendar_day: Some(CalendarLabel::OneShift),
        ..Default::default()
    };
    assert_eq!(repo.count(&one_shift).unwrap(), 1);

    let range = DailyPlanFilter {
        start_date: Some(d(2)),
        end_date: Some(d(3)),
        calendar_day: None,
    };
    let rows = repo.find_paged(&range, 10, 0).unwrap();
    assert_eq!(rows.iter().map(|r| r.id.as_str()).collect::<Vec<_>>(), vec!["D2", "D3"]);
}

#[test]
fn test_daily_paging_is_ordered_by_date() {
    let conn = setup_test_db();
    seed(&conn);
    let repo = DailyPlanRepository::new(conn);

    let page2 = repo.find_paged(&DailyPlanFilter::default(), 2, 2).unwrap();
    assert_eq!(page2.len(), 1);
    assert_eq!(page2[0].plan_date, d(3));
}

#[test]
fn test_deleted_header_hides_its_days() {
    let conn = setup_test_db();
    seed(&conn);
    {
        let guard = conn.lock().unwrap();
        PlanWorkingHourRepository::soft_delete_tx(&guard, "H1", &ts()).unwrap();
    }
    let repo = DailyPlanRepository::new(conn.clone());
    assert_eq!(repo.count(&DailyPlanFilter::default()).unwrap(), 0);
    assert!(repo.find_by_id("D1").unwrap().is_none());

    // 日计划与工时本身保留
    let raw: i64 = conn
        .lock()
        .unwrap()
        .query_row("SELECT COUNT(*) FROM plan_activity_hour", [], |row| row.get(0))
        .unwrap();
    assert_eq!(raw, 3);
}

#[test]
fn test_activity_hours_grouped_by_daily_plan() {
    let conn = setup_test_db();
    seed(&conn);
    let repo = ActivityHourRepository::new(conn);

    let grouped = repo
        .find_by_daily_plan_ids(&["D1".to_string(), "D2".to_string(), "D3".to_string()])
        .unwrap();
    assert_eq!(grouped.get("D1").map(Vec::len), Some(2));
    assert_eq!(grouped.get("D2").map(Vec::len), Some(1));
    assert!(grouped.get("D3").is_none());
    assert_eq!(repo.count_by_header("H1").unwrap(), 3);
}

#[test]
fn test_delete_by_header_only_touches_live_days() {
    let conn = setup_test_db();
    seed(&conn);
    {
        let guard = conn.lock().unwrap();
        DailyPlanRepository::soft_delete_tx(&guard, "D2", &ts()).unwrap();
        let removed = ActivityHourRepository::delete_by_header_tx(&guard, "H1").unwrap();
        assert_eq!(removed, 2);
    }
    let repo = ActivityHourRepository::new(conn);
    assert_eq!(repo.find_by_daily_plan("D2").unwrap().len(), 1);
    assert!(repo.find_by_daily_plan("D1").unwrap().is_empty());
}

#[test]
fn test_duplicate_activity_on_same_day_is_rejected() {
    let conn = setup_test_db();
    seed(&conn);
    let guard = conn.lock().unwrap();
    let err = ActivityHourRepository::insert_batch_tx(&guard, &[make_entry("E9", "D1", "A1", 1.0)])
        .unwrap_err();
    assert!(matches!(err, RepositoryError::UniqueConstraintViolation(_)));
}
