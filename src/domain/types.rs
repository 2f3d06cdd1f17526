// ==========================================
// 矿山运营报表系统 - 领域类型定义
// ==========================================
// 活动状态 / 状态分组 / 日历标签
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// 活动状态 (Activity Status)
// ==========================================
// 主数据中 status 为开放字符串；这里收敛为封闭枚举，
// 无法识别或为空的状态统一落入 Unknown。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityStatus {
    Working,   // 作业
    Delay,     // 延误
    Idle,      // 待机
    Breakdown, // 故障
    Unknown,   // 未分类 / 空
}

impl ActivityStatus {
    /// 从数据库中的原始状态字符串解析（大小写不敏感，空值视为 Unknown）
    pub fn from_db(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("working") => ActivityStatus::Working,
            Some("delay") => ActivityStatus::Delay,
            Some("idle") => ActivityStatus::Idle,
            Some("breakdown") => ActivityStatus::Breakdown,
            _ => ActivityStatus::Unknown,
        }
    }

    /// 对应的展示分组
    pub fn group(self) -> StatusGroup {
        match self {
            ActivityStatus::Working => StatusGroup::Working,
            ActivityStatus::Delay => StatusGroup::Delay,
            ActivityStatus::Idle => StatusGroup::Idle,
            ActivityStatus::Breakdown => StatusGroup::Breakdown,
            ActivityStatus::Unknown => StatusGroup::Null,
        }
    }
}

impl fmt::Display for ActivityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActivityStatus::Working => write!(f, "working"),
            ActivityStatus::Delay => write!(f, "delay"),
            ActivityStatus::Idle => write!(f, "idle"),
            ActivityStatus::Breakdown => write!(f, "breakdown"),
            ActivityStatus::Unknown => write!(f, "unknown"),
        }
    }
}

// ==========================================
// 状态分组 (Status Group)
// ==========================================
// 明细视图的五个分组；Null 收纳无状态或无法解析的活动
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusGroup {
    Delay,
    Working,
    Breakdown,
    Idle,
    Null,
}

impl StatusGroup {
    /// 输出顺序
    pub const ALL: [StatusGroup; 5] = [
        StatusGroup::Delay,
        StatusGroup::Working,
        StatusGroup::Breakdown,
        StatusGroup::Idle,
        StatusGroup::Null,
    ];
}

impl fmt::Display for StatusGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusGroup::Delay => write!(f, "Delay"),
            StatusGroup::Working => write!(f, "Working"),
            StatusGroup::Breakdown => write!(f, "Breakdown"),
            StatusGroup::Idle => write!(f, "Idle"),
            StatusGroup::Null => write!(f, "Null"),
        }
    }
}

// ==========================================
// 日历标签 (Calendar Label)
// ==========================================
// 由 schedule_day 权重推导: 1 → available, 0.5 → one-shift, 0/空 → holiday
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CalendarLabel {
    Available,
    OneShift,
    Holiday,
}

impl CalendarLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            CalendarLabel::Available => "available",
            CalendarLabel::OneShift => "one-shift",
            CalendarLabel::Holiday => "holiday",
        }
    }
}

impl fmt::Display for CalendarLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CalendarLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "available" => Ok(CalendarLabel::Available),
            "one-shift" | "one_shift" | "oneshift" => Ok(CalendarLabel::OneShift),
            "holiday" => Ok(CalendarLabel::Holiday),
            other => Err(other.to_string()),
        }
    }
}
