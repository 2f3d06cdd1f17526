// ==========================================
// 矿山运营报表系统 - 工时计划数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 约定:
// - `*_tx(&Connection, ..)` 关联函数供工作单元（事务）内调用
// - `&self` 方法每次调用单独加锁，仅用于事务外的只读查询
// - 所有查询默认排除软删除记录
// ==========================================

mod activity_hour;
mod daily;
mod header;

pub use activity_hour::ActivityHourRepository;
pub use daily::{DailyPlanFilter, DailyPlanRepository};
pub use header::PlanWorkingHourRepository;

use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::types::Type;

pub(crate) const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";

pub(crate) fn fmt_ts(ts: &NaiveDateTime) -> String {
    ts.format(TS_FORMAT).to_string()
}

pub(crate) fn fmt_date(date: &NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// 读取 TEXT 列并解析为 NaiveDateTime
pub(crate) fn get_ts(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<NaiveDateTime> {
    let raw: String = row.get(idx)?;
    NaiveDateTime::parse_from_str(&raw, TS_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(crate) fn get_opt_ts(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<Option<NaiveDateTime>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|s| {
        NaiveDateTime::parse_from_str(&s, TS_FORMAT)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
    })
    .transpose()
}

pub(crate) fn get_date(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<NaiveDate> {
    let raw: String = row.get(idx)?;
    NaiveDate::parse_from_str(&raw, DATE_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

#[cfg(test)]
mod tests;
