// ==========================================
// 矿山运营报表系统 - 时钟
// ==========================================
// “今天”是跨月校验与可编辑窗口的唯一外部输入，
// 通过 Clock 注入，测试中使用 FixedClock 固定日期
// ==========================================

use chrono::{Local, NaiveDate, NaiveDateTime};

pub trait Clock: Send + Sync {
    /// 当前日期（日粒度）
    fn today(&self) -> NaiveDate;

    /// 当前时间（用于 created_at / updated_at）
    fn now(&self) -> NaiveDateTime;
}

/// 系统本地时钟
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// 固定时钟
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    now: NaiveDateTime,
}

impl FixedClock {
    pub fn new(now: NaiveDateTime) -> Self {
        Self { now }
    }

    /// 固定在某天 08:00
    pub fn on(date: NaiveDate) -> Self {
        Self {
            now: date.and_hms_opt(8, 0, 0).unwrap_or_default(),
        }
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.now.date()
    }

    fn now(&self) -> NaiveDateTime {
        self.now
    }
}
