//! Ping Vitals - 跨平台主机可达性探测工具
//!
//! 这是一个用Rust编写的跨平台主机可达性探测工具，支持：
//! - ICMP/HTTP/TCP/UDP/系统ping五种探测方式
//! - 固定间隔与cron表达式两种调度方式
//! - 协作式取消与优雅停止
//! - 结构化日志记录

pub mod config;
pub mod probe;
pub mod monitor;
pub mod cli;
pub mod error;
pub mod logging;
pub mod signals;

// 重新导出主要类型
pub use config::{Config, GlobalConfig, ProbeConfig};
pub use error::PingVitalsError;
pub use monitor::{ProbeEvent, ProbeScheduler, Scheduler};
pub use probe::{ProbeMode, ProbeStrategy};

/// 应用程序版本信息
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 应用程序名称
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");

/// 应用程序描述
pub const APP_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
