// ==========================================
// 矿山运营报表系统 - 核心库
// ==========================================
// 范围: 工时计划生成与设备可用率指标（plan working hour）
// 技术栈: Rust + SQLite
// 分层: domain → repository → engine → api
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "en");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 日历展开 / 台账 / 指标
pub mod engine;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 业务接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{ActivityStatus, CalendarLabel, StatusGroup};

// 领域实体
pub use domain::{
    Activity, ActivityHourEntry, ActivityHourTemplate, DailyPlan, PlanTotals, PlanWorkingHour,
};

// 引擎
pub use engine::{
    ActivityHourLedger, AvailabilityMetrics, CalendarExpander, Clock, FixedClock, SystemClock,
};

// API
pub use api::{ApiError, ApiResult, PlanWorkingHourApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "Mine Ops Report";
