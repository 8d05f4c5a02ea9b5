//! 探测调度模块
//!
//! 提供探测事件定义、周期执行和调度循环功能

pub mod cron;
pub mod event;
pub mod executor;
pub mod scheduler;

// 重新导出主要类型
pub use cron::CronSchedule;
pub use event::ProbeEvent;
pub use executor::execute_tick;
pub use scheduler::{ProbeScheduler, Scheduler, SchedulerStatus};
