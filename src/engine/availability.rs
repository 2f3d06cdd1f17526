// ==========================================
// 矿山运营报表系统 - 设备可用率指标计算
// ==========================================
// 纯函数，无 I/O
// 口径:
// - 分桶: 按活动状态累加 delay / idle / breakdown 工时
// - EWH = max(0, MOHH - delay - breakdown)
// - PA  = (EWH + delay + idle) / MOHH
// - MA  = EWH / (EWH + breakdown)
// - UA  = EWH / (EWH + delay + idle)
// - EU  = EWH / (EWH + delay + idle + breakdown)
// - 明细分组: Delay / Working / Breakdown / Idle / Null 五组
// - 分母为 0 时指标为 0；所有量在定稿时保留 2 位小数且不小于 0，
//   比率公式的输入使用已取整的 MOHH / delay / idle / breakdown / EWH
// ==========================================

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::plan_working_hour::{Activity, ActivityHourEntry};
use crate::domain::types::{ActivityStatus, CalendarLabel, StatusGroup};

/// 保留 2 位小数
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// 保留 2 位小数且下限为 0
fn floor0(value: f64) -> f64 {
    let rounded = round2(value);
    if rounded > 0.0 {
        rounded
    } else {
        0.0
    }
}

/// 分桶结果
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DowntimeBuckets {
    pub delay: f64,
    pub idle: f64,
    pub breakdown: f64,
}

/// 五项可用率指标
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityMetrics {
    pub ewh: f64,
    pub pa: f64,
    pub ma: f64,
    pub ua: f64,
    pub eu: f64,
}

/// 可编辑 / 可删除窗口
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityWindow {
    pub editable: bool,
    pub deletable: bool,
}

/// 按活动状态分桶
///
/// 状态为 working / unknown 或活动无法解析的工时不计入三个桶
pub fn classify(
    entries: &[ActivityHourEntry],
    activity_lookup: &HashMap<String, Activity>,
) -> DowntimeBuckets {
    let mut delay = 0.0;
    let mut idle = 0.0;
    let mut breakdown = 0.0;

    for entry in entries {
        let status = activity_lookup
            .get(&entry.activity_id)
            .map(|a| a.status)
            .unwrap_or(ActivityStatus::Unknown);

        match status {
            ActivityStatus::Delay => delay += entry.activities_hour,
            ActivityStatus::Idle => idle += entry.activities_hour,
            ActivityStatus::Breakdown => breakdown += entry.activities_hour,
            ActivityStatus::Working | ActivityStatus::Unknown => {}
        }
    }

    DowntimeBuckets {
        delay: floor0(delay),
        idle: floor0(idle),
        breakdown: floor0(breakdown),
    }
}

/// 计算五项指标
///
/// EWH 由原始输入相减后再保留 2 位小数；
/// 四个比率使用已舍入的 mohh / delay / idle / breakdown 与 EWH
pub fn metrics(mohh: f64, delay: f64, idle: f64, breakdown: f64) -> AvailabilityMetrics {
    let ewh = floor0(mohh - delay - breakdown);

    let mohh = floor0(mohh);
    let delay = floor0(delay);
    let idle = floor0(idle);
    let breakdown = floor0(breakdown);

    let ratio = |numerator: f64, denominator: f64| {
        if denominator > 0.0 {
            floor0(numerator / denominator)
        } else {
            0.0
        }
    };

    AvailabilityMetrics {
        ewh,
        pa: ratio(ewh + delay + idle, mohh),
        ma: ratio(ewh, ewh + breakdown),
        ua: ratio(ewh, ewh + delay + idle),
        eu: ratio(ewh, ewh + delay + idle + breakdown),
    }
}

/// 日历标签: 1 → available, 0.5 → one-shift, 0 / 空 → holiday
pub fn classify_calendar_label(schedule_day: Option<f64>) -> CalendarLabel {
    match schedule_day {
        Some(weight) if weight >= 1.0 => CalendarLabel::Available,
        Some(weight) if weight > 0.0 => CalendarLabel::OneShift,
        _ => CalendarLabel::Holiday,
    }
}

/// 可编辑 / 可删除窗口: 计划日期严格晚于今天（日粒度）
pub fn availability_window(plan_date: NaiveDate, today: NaiveDate) -> AvailabilityWindow {
    let open = plan_date > today;
    AvailabilityWindow {
        editable: open,
        deletable: open,
    }
}

/// 分组明细行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupedActivity {
    pub activity_id: String,
    pub name: Option<String>,
    pub activities_hour: f64,
}

/// 按状态分组的活动工时
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityGroups {
    #[serde(rename = "Delay")]
    pub delay: Vec<GroupedActivity>,
    #[serde(rename = "Working")]
    pub working: Vec<GroupedActivity>,
    #[serde(rename = "Breakdown")]
    pub breakdown: Vec<GroupedActivity>,
    #[serde(rename = "Idle")]
    pub idle: Vec<GroupedActivity>,
    #[serde(rename = "Null")]
    pub null: Vec<GroupedActivity>,
}

impl ActivityGroups {
    pub fn bucket(&self, group: StatusGroup) -> &[GroupedActivity] {
        match group {
            StatusGroup::Delay => &self.delay,
            StatusGroup::Working => &self.working,
            StatusGroup::Breakdown => &self.breakdown,
            StatusGroup::Idle => &self.idle,
            StatusGroup::Null => &self.null,
        }
    }

    fn bucket_mut(&mut self, group: StatusGroup) -> &mut Vec<GroupedActivity> {
        match group {
            StatusGroup::Delay => &mut self.delay,
            StatusGroup::Working => &mut self.working,
            StatusGroup::Breakdown => &mut self.breakdown,
            StatusGroup::Idle => &mut self.idle,
            StatusGroup::Null => &mut self.null,
        }
    }

    /// 全部分组的行数
    pub fn len(&self) -> usize {
        StatusGroup::ALL.iter().map(|g| self.bucket(*g).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// 按活动状态分为五组，工时保留 2 位小数
///
/// 无法解析的活动落入 Null 组，name 为空
pub fn group_activities(
    entries: &[ActivityHourEntry],
    activity_lookup: &HashMap<String, Activity>,
) -> ActivityGroups {
    let mut groups = ActivityGroups::default();

    for entry in entries {
        let activity = activity_lookup.get(&entry.activity_id);
        let group = activity
            .map(|a| a.status.group())
            .unwrap_or(StatusGroup::Null);

        groups.bucket_mut(group).push(GroupedActivity {
            activity_id: entry.activity_id.clone(),
            name: activity.map(|a| a.name.clone()),
            activities_hour: round2(entry.activities_hour),
        });
    }

    groups
}
