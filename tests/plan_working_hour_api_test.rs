// ==========================================
// PlanWorkingHourApi 集成测试
// ==========================================
// 测试范围:
// 1. 创建: 日计划数量、月工时平均分摊、活动工时笛卡尔积
// 2. 校验: 月初、跨月、查重、天数合计、明细规则
// 3. 更新: 原地刷新日计划、明细整体替换（幂等）、revision
// 4. 删除: 软删除不级联
// 5. 查询: 读时指标、日历过滤、可编辑窗口、分页
// 6. 单日计划: 编辑 / 删除窗口
// ==========================================


use std::collections::{BTreeMap, HashSet};

use mine_ops_report::api::{
    ApiError, PlanDetailQuery, PlanListQuery, UpdateDailyPlanInput, UpdatePlanInput,
};
use mine_ops_report::domain::{ActivityHourTemplate, CalendarLabel, StatusGroup};
use mine_ops_report::engine::days_in_month;
use test_helpers::*;

fn today() -> chrono::NaiveDate {
    date(2030, 6, 15)
}

/// 日计划 → 按活动排序的 (activity_id, hours)
fn ledger_snapshot(env: &PlanTestEnv, header_id: &str) -> BTreeMap<String, Vec<(String, f64)>> {
    env.daily_repo
        .find_by_header(header_id)
        .expect("查询日计划失败")
        .into_iter()
        .map(|day| {
            let mut rows: Vec<(String, f64)> = env
                .activity_hour_repo
                .find_by_daily_plan(&day.id)
                .expect("查询活动工时失败")
                .into_iter()
                .map(|e| (e.activity_id, e.activities_hour))
                .collect();
            rows.sort_by(|a, b| a.0.cmp(&b.0));
            (day.plan_date.to_string(), rows)
        })
        .collect()
}

// ==========================================
// 创建
// ==========================================

#[test]
fn test_create_plan_日计划数量等于当月天数() {
    let env = PlanTestEnv::new(today());

    for plan_date in [
        date(2030, 7, 1),
        date(2031, 4, 1),
        date(2031, 2, 1),
        date(2032, 2, 1),
    ] {
        let created = env
            .api
            .create_plan(plan_input(plan_date, default_detail()))
            .expect("创建失败");

        let expected = days_in_month(plan_date) as usize;
        assert_eq!(created.daily_plans.len(), expected, "month {}", plan_date);
        assert_eq!(created.activity_hour_count, expected * default_detail().len());

        let stored = env.daily_repo.find_by_header(&created.header.id).unwrap();
        assert_eq!(stored.len(), expected);
    }

    // 闰年二月
    let leap = env
        .api
        .get_plan_detail_list(PlanDetailQuery {
            start_date: Some(date(2032, 2, 1)),
            end_date: Some(date(2032, 2, 29)),
            limit: Some(100),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(leap.meta.total, 29);
}

#[test]
fn test_create_plan_月工时平均分摊() {
    let env = PlanTestEnv::new(today());

    for plan_date in [date(2030, 7, 1), date(2031, 4, 1), date(2031, 2, 1)] {
        let created = env
            .api
            .create_plan(plan_input(plan_date, default_detail()))
            .unwrap();

        let days = env.daily_repo.find_by_header(&created.header.id).unwrap();
        let sum: f64 = days.iter().map(|d| d.working_hour_month).sum();
        assert!(
            (sum - created.header.totals.total_working_hour_month).abs() < 1e-6,
            "sum {} for {}",
            sum,
            plan_date
        );
        assert!(days.iter().all(|d| d.mohh_per_month == 20.0));
        assert!(days.iter().all(|d| d.working_hour_longshift == 22.0));
    }
}

#[test]
fn test_create_plan_周日为假日() {
    let env = PlanTestEnv::new(today());
    let created = env
        .api
        .create_plan(plan_input(date(2030, 7, 1), default_detail()))
        .unwrap();

    let holidays: Vec<u32> = created
        .daily_plans
        .iter()
        .filter(|d| d.is_holiday_day)
        .map(|d| chrono::Datelike::day(&d.plan_date))
        .collect();
    assert_eq!(holidays, vec![7, 14, 21, 28]);
    assert!(created
        .daily_plans
        .iter()
        .filter(|d| !d.is_holiday_day)
        .all(|d| d.is_calendar_day && d.is_schedule_day));
}

// ==========================================
// 校验
// ==========================================

#[test]
fn test_create_plan_非月初被拒绝() {
    let env = PlanTestEnv::new(today());
    let err = env
        .api
        .create_plan(plan_input(date(2030, 8, 15), default_detail()))
        .unwrap_err();

    match err {
        ApiError::ValidationError(msg) => assert!(msg.contains("first day of month"), "{}", msg),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_create_plan_过去月份被拒绝() {
    let env = PlanTestEnv::new(today());
    let err = env
        .api
        .create_plan(plan_input(date(2030, 5, 1), default_detail()))
        .unwrap_err();

    match err {
        ApiError::ValidationError(msg) => {
            assert!(msg.contains("past") || msg.contains("sudah lewat"), "{}", msg)
        }
        other => panic!("unexpected error: {:?}", other),
    }

    // 当月允许
    assert!(env
        .api
        .create_plan(plan_input(date(2030, 6, 1), default_detail()))
        .is_ok());
}

#[test]
fn test_create_plan_明细规则() {
    let env = PlanTestEnv::new(today());
    let plan_date = date(2030, 7, 1);

    let duplicate = vec![
        ActivityHourTemplate::new("A-LOAD", 1.0),
        ActivityHourTemplate::new("A-LOAD", 2.0),
    ];
    assert!(matches!(
        env.api.create_plan(plan_input(plan_date, duplicate)),
        Err(ApiError::ValidationError(_))
    ));

    let negative = vec![ActivityHourTemplate::new("A-LOAD", -1.0)];
    assert!(matches!(
        env.api.create_plan(plan_input(plan_date, negative)),
        Err(ApiError::ValidationError(_))
    ));

    assert!(matches!(
        env.api.create_plan(plan_input(plan_date, vec![])),
        Err(ApiError::ValidationError(_))
    ));

    let unknown = vec![ActivityHourTemplate::new("A-NOPE", 1.0)];
    match env.api.create_plan(plan_input(plan_date, unknown)) {
        Err(ApiError::ValidationError(msg)) => assert!(msg.contains("A-NOPE")),
        other => panic!("unexpected result: {:?}", other.map(|c| c.header.id)),
    }

    // 全部失败后不应留下任何写入
    assert_eq!(
        env.count("SELECT COUNT(*) FROM plan_working_hour WHERE plan_month = ?1", "2030-07"),
        0
    );
}

#[test]
fn test_create_plan_天数合计不平衡被拒绝() {
    let env = PlanTestEnv::new(today());
    let mut input = plan_input(date(2030, 7, 1), default_detail());
    input.totals.total_holiday_days += 1;

    assert!(matches!(
        env.api.create_plan(input),
        Err(ApiError::ValidationError(_))
    ));
}

#[test]
fn test_create_plan_同月重复返回冲突() {
    let env = PlanTestEnv::new(today());
    let first = env
        .api
        .create_plan(plan_input(date(2030, 7, 1), default_detail()))
        .unwrap();

    let err = env
        .api
        .create_plan(plan_input(date(2030, 7, 1), default_detail()))
        .unwrap_err();
    assert!(matches!(err, ApiError::Conflict(_)), "{:?}", err);

    // 删除后可重新创建
    env.api.remove_plan(&first.header.id).unwrap();
    assert!(env
        .api
        .create_plan(plan_input(date(2030, 7, 1), default_detail()))
        .is_ok());
}

#[test]
fn test_create_plan_存储失败整体回滚() {
    let env = PlanTestEnv::new(today());
    {
        let conn = env.conn.lock().unwrap();
        conn.execute_batch("DROP TABLE plan_activity_hour;").unwrap();
    }

    let err = env
        .api
        .create_plan(plan_input(date(2030, 7, 1), default_detail()))
        .unwrap_err();
    assert!(err.is_storage_error(), "{:?}", err);

    assert_eq!(
        env.count("SELECT COUNT(*) FROM plan_working_hour WHERE plan_month = ?1", "2030-07"),
        0
    );
    assert_eq!(
        env.count(
            "SELECT COUNT(*) FROM plan_working_hour_daily WHERE plan_date LIKE ?1",
            "2030-07-%"
        ),
        0
    );
}

// ==========================================
// 更新
// ==========================================

#[test]
fn test_update_plan_原地刷新日计划() {
    let env = PlanTestEnv::new(today());
    let created = env
        .api
        .create_plan(plan_input(date(2030, 7, 1), default_detail()))
        .unwrap();
    let id = created.header.id.clone();
    let before_ids: Vec<String> = created.daily_plans.iter().map(|d| d.id.clone()).collect();
    let before_entries = ledger_snapshot(&env, &id);

    let view = env
        .api
        .update_plan(
            &id,
            UpdatePlanInput {
                total_working_hour_month: Some(930.0),
                total_mohh_per_month: Some(21.0),
                ..Default::default()
            },
        )
        .unwrap();

    assert_eq!(view.header.revision, 2);
    assert_eq!(view.header.totals.total_working_hour_month, 930.0);
    assert_eq!(view.daily_plan_count, 31);

    let days = env.daily_repo.find_by_header(&id).unwrap();
    assert_eq!(days.iter().map(|d| d.id.clone()).collect::<Vec<_>>(), before_ids);
    assert!(days.iter().all(|d| (d.working_hour_month - 30.0).abs() < 1e-9));
    assert!(days.iter().all(|d| d.mohh_per_month == 21.0));

    // 未提供 detail，活动工时不变
    assert_eq!(ledger_snapshot(&env, &id), before_entries);

    // 空 detail 同样视为未提供
    env.api
        .update_plan(
            &id,
            UpdatePlanInput {
                detail: Some(vec![]),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(ledger_snapshot(&env, &id), before_entries);
}

#[test]
fn test_update_plan_明细替换幂等() {
    let env = PlanTestEnv::new(today());
    let created = env
        .api
        .create_plan(plan_input(date(2030, 7, 1), default_detail()))
        .unwrap();
    let id = created.header.id;

    let new_detail = vec![
        ActivityHourTemplate::new("A-LOAD", 9.0),
        ActivityHourTemplate::new("A-RAIN", 2.0),
    ];
    let patch = UpdatePlanInput {
        detail: Some(new_detail.clone()),
        ..Default::default()
    };

    env.api.update_plan(&id, patch.clone()).unwrap();
    let once = ledger_snapshot(&env, &id);
    env.api.update_plan(&id, patch).unwrap();
    let twice = ledger_snapshot(&env, &id);

    assert_eq!(once, twice);
    assert_eq!(env.activity_hour_repo.count_by_header(&id).unwrap(), 31 * 2);
    assert!(twice.values().all(|rows| rows
        == &vec![("A-LOAD".to_string(), 9.0), ("A-RAIN".to_string(), 2.0)]));
}

#[test]
fn test_update_plan_无效明细不删除旧工时() {
    let env = PlanTestEnv::new(today());
    let created = env
        .api
        .create_plan(plan_input(date(2030, 7, 1), default_detail()))
        .unwrap();
    let id = created.header.id;
    let before = ledger_snapshot(&env, &id);

    let err = env
        .api
        .update_plan(
            &id,
            UpdatePlanInput {
                detail: Some(vec![
                    ActivityHourTemplate::new("A-LOAD", 1.0),
                    ActivityHourTemplate::new("A-LOAD", 1.0),
                ]),
                ..Default::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, ApiError::ValidationError(_)));
    assert_eq!(ledger_snapshot(&env, &id), before);
}

#[test]
fn test_update_plan_天数合计校验() {
    let env = PlanTestEnv::new(today());
    let created = env
        .api
        .create_plan(plan_input(date(2030, 7, 1), default_detail()))
        .unwrap();
    let id = created.header.id;

    let err = env
        .api
        .update_plan(
            &id,
            UpdatePlanInput {
                total_holiday_days: Some(10),
                ..Default::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, ApiError::ValidationError(_)));
    assert_eq!(env.api.get_plan(&id).unwrap().header.revision, 1);

    // 只改日历天数同样触发合计校验
    assert!(matches!(
        env.api.update_plan(
            &id,
            UpdatePlanInput {
                total_calendar_days: Some(30),
                ..Default::default()
            },
        ),
        Err(ApiError::ValidationError(_))
    ));

    // 未提交天数字段时只校验工时
    assert!(matches!(
        env.api.update_plan(
            &id,
            UpdatePlanInput {
                total_mohh_per_month: Some(-1.0),
                ..Default::default()
            },
        ),
        Err(ApiError::ValidationError(_))
    ));
    assert_eq!(env.api.get_plan(&id).unwrap().header.revision, 1);

    let ok = env
        .api
        .update_plan(
            &id,
            UpdatePlanInput {
                total_holiday_days: Some(10),
                total_available_days: Some(21),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(ok.header.totals.total_holiday_days, 10);
}

#[test]
fn test_update_plan_revision_冲突() {
    let env = PlanTestEnv::new(today());
    let created = env
        .api
        .create_plan(plan_input(date(2030, 7, 1), default_detail()))
        .unwrap();
    let id = created.header.id;
    assert_eq!(created.header.revision, 1);

    let view = env
        .api
        .update_plan(
            &id,
            UpdatePlanInput {
                total_working_hour_month: Some(700.0),
                expected_revision: Some(1),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(view.header.revision, 2);

    // 过期的 revision
    let err = env
        .api
        .update_plan(
            &id,
            UpdatePlanInput {
                total_working_hour_month: Some(800.0),
                expected_revision: Some(1),
                ..Default::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, ApiError::Conflict(_)), "{:?}", err);

    let current = env.api.get_plan(&id).unwrap();
    assert_eq!(current.header.revision, 2);
    assert_eq!(current.header.totals.total_working_hour_month, 700.0);
}

#[test]
fn test_update_plan_修改月份() {
    let env = PlanTestEnv::new(today());
    let july = env
        .api
        .create_plan(plan_input(date(2030, 7, 1), default_detail()))
        .unwrap();
    env.api
        .create_plan(plan_input(date(2030, 8, 1), default_detail()))
        .unwrap();

    let to_taken = UpdatePlanInput {
        plan_date: Some(date(2030, 8, 1)),
        ..Default::default()
    };
    assert!(matches!(
        env.api.update_plan(&july.header.id, to_taken),
        Err(ApiError::Conflict(_))
    ));

    let to_past = UpdatePlanInput {
        plan_date: Some(date(2030, 5, 1)),
        ..Default::default()
    };
    assert!(matches!(
        env.api.update_plan(&july.header.id, to_past),
        Err(ApiError::ValidationError(_))
    ));

    let mid_month = UpdatePlanInput {
        plan_date: Some(date(2030, 9, 9)),
        ..Default::default()
    };
    assert!(matches!(
        env.api.update_plan(&july.header.id, mid_month),
        Err(ApiError::ValidationError(_))
    ));

    // 自身月份不算重复
    let same = UpdatePlanInput {
        plan_date: Some(date(2030, 7, 1)),
        ..Default::default()
    };
    assert!(env.api.update_plan(&july.header.id, same).is_ok());

    let moved = env
        .api
        .update_plan(
            &july.header.id,
            UpdatePlanInput {
                plan_date: Some(date(2030, 9, 1)),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(moved.header.plan_month(), "2030-09");
    // 已有日计划保持原日期
    assert_eq!(moved.daily_plan_count, 31);
}

#[test]
fn test_update_plan_不存在() {
    let env = PlanTestEnv::new(today());
    assert!(matches!(
        env.api.update_plan("missing", UpdatePlanInput::default()),
        Err(ApiError::NotFound(_))
    ));
}

// ==========================================
// 删除
// ==========================================

#[test]
fn test_remove_plan_软删除不级联() {
    let env = PlanTestEnv::new(today());
    let created = env
        .api
        .create_plan(plan_input(date(2030, 7, 1), default_detail()))
        .unwrap();
    let id = created.header.id;
    let day_id = created.daily_plans[0].id.clone();

    env.api.remove_plan(&id).unwrap();

    assert!(matches!(env.api.get_plan(&id), Err(ApiError::NotFound(_))));
    assert!(matches!(
        env.api.get_plan_detail_by_id(&day_id),
        Err(ApiError::NotFound(_))
    ));
    let list = env
        .api
        .get_plan_detail_list(PlanDetailQuery {
            start_date: Some(date(2030, 7, 1)),
            end_date: Some(date(2030, 7, 31)),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(list.meta.total, 0);

    // 日计划与活动工时保留
    assert_eq!(
        env.count(
            "SELECT COUNT(*) FROM plan_working_hour_daily WHERE plan_working_hour_id = ?1",
            &id
        ),
        31
    );
    assert_eq!(
        env.count(
            r#"SELECT COUNT(*) FROM plan_activity_hour a
               JOIN plan_working_hour_daily d ON d.id = a.daily_plan_id
               WHERE d.plan_working_hour_id = ?1"#,
            &id
        ),
        31 * default_detail().len() as i64
    );

    // 重复删除
    assert!(matches!(env.api.remove_plan(&id), Err(ApiError::NotFound(_))));
}

// ==========================================
// 查询
// ==========================================

#[test]
fn test_get_plan_detail_by_id_五组活动() {
    let env = PlanTestEnv::new(today());
    let created = env
        .api
        .create_plan(plan_input(date(2030, 7, 1), default_detail()))
        .unwrap();

    for day in created.daily_plans.iter().step_by(7) {
        let detail = env.api.get_plan_detail_by_id(&day.id).unwrap();
        let groups = &detail.activities;

        let mut seen: HashSet<String> = HashSet::new();
        for group in StatusGroup::ALL {
            for row in groups.bucket(group) {
                assert!(seen.insert(row.activity_id.clone()), "{} twice", row.activity_id);
            }
        }
        let expected: HashSet<String> =
            default_detail().into_iter().map(|r| r.activity_id).collect();
        assert_eq!(seen, expected);

        assert_eq!(groups.working.len(), 2);
        assert_eq!(groups.delay.len(), 2);
        assert_eq!(groups.idle.len(), 1);
        assert_eq!(groups.breakdown.len(), 1);
        assert_eq!(groups.null.len(), 2);
        assert!(groups.null.iter().any(|r| r.activity_id == "A-PM"));
    }
}

#[test]
fn test_get_plan_detail_list_读时计算指标() {
    let env = PlanTestEnv::new(today());
    env.api
        .create_plan(plan_input(date(2030, 7, 1), default_detail()))
        .unwrap();

    let page = env
        .api
        .get_plan_detail_list(PlanDetailQuery {
            start_date: Some(date(2030, 7, 2)),
            end_date: Some(date(2030, 7, 2)),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(page.meta.total, 1);
    let row = &page.data[0];

    // delay = 1.25 + 0.5, idle = 2, breakdown = 1.75, mohh = 20
    assert_eq!(row.total_delay, 1.75);
    assert_eq!(row.total_idle, 2.0);
    assert_eq!(row.total_breakdown, 1.75);
    assert_eq!(row.ewh, 16.5);
    assert_eq!(row.pa, 1.01);
    assert_eq!(row.ma, 0.9);
    assert_eq!(row.ua, 0.81);
    assert_eq!(row.eu, 0.75);
    assert_eq!(row.calendar_day, CalendarLabel::Available);
    assert_eq!(row.working_hour_month, 20.0);
}

#[test]
fn test_get_plan_detail_list_日历过滤与排序() {
    let env = PlanTestEnv::new(today());
    env.api
        .create_plan(plan_input(date(2030, 7, 1), default_detail()))
        .unwrap();

    let query = |label: &str| PlanDetailQuery {
        calendar_day: Some(label.to_string()),
        limit: Some(100),
        ..Default::default()
    };

    let holidays = env.api.get_plan_detail_list(query("holiday")).unwrap();
    assert_eq!(holidays.meta.total, 4);
    assert!(holidays.data.iter().all(|r| r.is_holiday_day));

    let available = env.api.get_plan_detail_list(query("available")).unwrap();
    assert_eq!(available.meta.total, 27);
    let dates: Vec<_> = available.data.iter().map(|r| r.plan_date).collect();
    let mut sorted = dates.clone();
    sorted.sort();
    assert_eq!(dates, sorted);

    assert_eq!(
        env.api.get_plan_detail_list(query("one-shift")).unwrap().meta.total,
        0
    );

    assert!(matches!(
        env.api.get_plan_detail_list(query("weekend")),
        Err(ApiError::ValidationError(_))
    ));
}

#[test]
fn test_get_plan_detail_list_分页() {
    let env = PlanTestEnv::new(today());
    env.api
        .create_plan(plan_input(date(2030, 7, 1), default_detail()))
        .unwrap();

    let first = env
        .api
        .get_plan_detail_list(PlanDetailQuery::default())
        .unwrap();
    assert_eq!(first.status_code, 200);
    assert_eq!(first.data.len(), 10);
    assert_eq!(first.meta.page, 1);
    assert_eq!(first.meta.limit, 10);
    assert_eq!(first.meta.total, 31);
    assert_eq!(first.meta.last_page, 4);
    assert_eq!(first.data[0].plan_date, date(2030, 7, 1));

    let last = env
        .api
        .get_plan_detail_list(PlanDetailQuery {
            page: Some(4),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(last.data.len(), 1);
    assert_eq!(last.data[0].plan_date, date(2030, 7, 31));

    let clamped = env
        .api
        .get_plan_detail_list(PlanDetailQuery {
            limit: Some(1000),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(clamped.meta.limit, 100);
    assert_eq!(clamped.data.len(), 31);

    assert!(matches!(
        env.api.get_plan_detail_list(PlanDetailQuery {
            page: Some(0),
            ..Default::default()
        }),
        Err(ApiError::ValidationError(_))
    ));
    assert!(matches!(
        env.api.get_plan_detail_list(PlanDetailQuery {
            start_date: Some(date(2030, 7, 10)),
            end_date: Some(date(2030, 7, 1)),
            ..Default::default()
        }),
        Err(ApiError::ValidationError(_))
    ));
}

#[test]
fn test_availability_window_昨天今天明天() {
    let env = PlanTestEnv::new(date(2030, 7, 10));
    env.api
        .create_plan(plan_input(date(2030, 7, 1), default_detail()))
        .unwrap();

    let page = env
        .api
        .get_plan_detail_list(PlanDetailQuery {
            start_date: Some(date(2030, 7, 9)),
            end_date: Some(date(2030, 7, 11)),
            ..Default::default()
        })
        .unwrap();

    let flags: Vec<(bool, bool)> = page
        .data
        .iter()
        .map(|r| (r.is_available_to_edit, r.is_available_to_delete))
        .collect();
    assert_eq!(flags, vec![(false, false), (false, false), (true, true)]);
}

#[test]
fn test_get_plan_表单回显() {
    let env = PlanTestEnv::new(today());
    let created = env
        .api
        .create_plan(plan_input(date(2030, 7, 1), default_detail()))
        .unwrap();

    let view = env.api.get_plan(&created.header.id).unwrap();
    assert_eq!(view.header.id, created.header.id);
    assert_eq!(view.daily_plan_count, 31);
    assert_eq!(view.activities.len(), default_detail().len());
    assert!(view.is_available_to_edit);

    let json = serde_json::to_value(&view).unwrap();
    assert_eq!(json["planDate"], "2030-07-01");
    assert_eq!(json["totalCalendarDays"], 31);
    assert!(json["activities"]["Delay"].is_array());
}

#[test]
fn test_list_plans_降序与年份过滤() {
    let env = PlanTestEnv::new(today());
    for plan_date in [date(2030, 7, 1), date(2031, 1, 1), date(2030, 8, 1)] {
        env.api
            .create_plan(plan_input(plan_date, default_detail()))
            .unwrap();
    }

    let all = env.api.list_plans(PlanListQuery::default()).unwrap();
    assert_eq!(all.meta.total, 3);
    let months: Vec<String> = all.data.iter().map(|p| p.header.plan_month()).collect();
    assert_eq!(months, vec!["2031-01", "2030-08", "2030-07"]);

    let in_2030 = env
        .api
        .list_plans(PlanListQuery {
            year: Some(2030),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(in_2030.meta.total, 2);

    let second = env
        .api
        .list_plans(PlanListQuery {
            page: Some(2),
            limit: Some(1),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(second.meta.last_page, 3);
    assert_eq!(second.data[0].header.plan_month(), "2030-08");
}

// ==========================================
// 单日计划
// ==========================================

#[test]
fn test_update_daily_plan_编辑窗口() {
    let env = PlanTestEnv::new(date(2030, 7, 10));
    let created = env
        .api
        .create_plan(plan_input(date(2030, 7, 1), default_detail()))
        .unwrap();
    let past = created.daily_plans[8].id.clone(); // 07-09
    let today_id = created.daily_plans[9].id.clone(); // 07-10
    let future = created.daily_plans[19].id.clone(); // 07-20

    for id in [&past, &today_id] {
        assert!(matches!(
            env.api.update_daily_plan(
                id,
                UpdateDailyPlanInput {
                    schedule_day: Some(0.5),
                    ..Default::default()
                }
            ),
            Err(ApiError::ValidationError(_))
        ));
    }

    assert!(matches!(
        env.api.update_daily_plan(
            &future,
            UpdateDailyPlanInput {
                schedule_day: Some(0.7),
                ..Default::default()
            }
        ),
        Err(ApiError::ValidationError(_))
    ));

    let view = env
        .api
        .update_daily_plan(
            &future,
            UpdateDailyPlanInput {
                schedule_day: Some(0.5),
                mohh_per_month: Some(10.0),
                detail: Some(vec![ActivityHourTemplate::new("A-BD", 2.5)]),
                ..Default::default()
            },
        )
        .unwrap();

    assert_eq!(view.metrics.calendar_day, CalendarLabel::OneShift);
    assert_eq!(view.metrics.schedule_day, Some(0.5));
    assert_eq!(view.metrics.mohh_per_month, 10.0);
    assert_eq!(view.metrics.total_breakdown, 2.5);
    assert_eq!(view.metrics.ewh, 7.5);
    assert_eq!(view.activities.len(), 1);
    assert_eq!(view.activities.breakdown[0].activities_hour, 2.5);

    // 其它日计划不受影响
    let other = env.api.get_plan_detail_by_id(&created.daily_plans[20].id).unwrap();
    assert_eq!(other.activities.len(), default_detail().len());

    let one_shift = env
        .api
        .get_plan_detail_list(PlanDetailQuery {
            calendar_day: Some("one-shift".to_string()),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(one_shift.meta.total, 1);

    // 改为假日
    let holiday = env
        .api
        .update_daily_plan(
            &future,
            UpdateDailyPlanInput {
                schedule_day: Some(0.0),
                ..Default::default()
            },
        )
        .unwrap();
    assert!(holiday.metrics.is_holiday_day);
    assert!(!holiday.metrics.is_schedule_day);
    assert_eq!(holiday.metrics.calendar_day, CalendarLabel::Holiday);
}

#[test]
fn test_remove_daily_plan_删除窗口() {
    let env = PlanTestEnv::new(date(2030, 7, 10));
    let created = env
        .api
        .create_plan(plan_input(date(2030, 7, 1), default_detail()))
        .unwrap();
    let header_id = created.header.id.clone();
    let past = created.daily_plans[0].id.clone();
    let future = created.daily_plans[30].id.clone();

    assert!(matches!(
        env.api.remove_daily_plan(&past),
        Err(ApiError::ValidationError(_))
    ));

    env.api.remove_daily_plan(&future).unwrap();
    assert!(matches!(
        env.api.get_plan_detail_by_id(&future),
        Err(ApiError::NotFound(_))
    ));
    assert!(matches!(
        env.api.remove_daily_plan(&future),
        Err(ApiError::NotFound(_))
    ));
    assert_eq!(env.api.get_plan(&header_id).unwrap().daily_plan_count, 30);

    // 活动工时保留
    assert_eq!(
        env.count(
            "SELECT COUNT(*) FROM plan_activity_hour WHERE daily_plan_id = ?1",
            &future
        ),
        default_detail().len() as i64
    );

    // 计划头更新只刷新有效日计划
    let view = env
        .api
        .update_plan(
            &header_id,
            UpdatePlanInput {
                total_working_hour_month: Some(600.0),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(view.daily_plan_count, 30);
    let days = env.daily_repo.find_by_header(&header_id).unwrap();
    assert!(days.iter().all(|d| (d.working_hour_month - 20.0).abs() < 1e-9));
}
