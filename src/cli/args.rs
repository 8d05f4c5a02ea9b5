//! 命令行参数定义
//!
//! clap派生的CLI入口，子命令覆盖服务启动、单次探测、
//! 配置验证与版本查询

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// 跨平台主机可达性探测工具
#[derive(Parser, Debug, Clone)]
#[command(
    name = "ping-vitals",
    version = crate::VERSION,
    about = crate::APP_DESCRIPTION,
    long_about = None
)]
pub struct Args {
    /// 配置文件路径
    #[arg(short, long, value_name = "FILE", env = "PING_VITALS_CONFIG")]
    pub config: Option<PathBuf>,

    /// 日志级别
    #[arg(
        short,
        long,
        value_enum,
        default_value = "info",
        env = "PING_VITALS_LOG_LEVEL"
    )]
    pub log_level: LogLevel,

    /// 输出调试级别日志
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// 日志级别
#[derive(ValueEnum, Clone, Debug, PartialEq)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Error => log::LevelFilter::Error,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 子命令
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// 启动周期探测服务
    Start {
        /// 目标主机，设置后覆盖配置文件
        #[arg(long, value_name = "HOST", env = "PING_VITALS_HOST")]
        host: Option<String>,

        /// 探测模式 (icmp/external/http/tcp/udp)，设置后覆盖配置文件
        #[arg(short, long, value_name = "MODE", env = "PING_VITALS_MODE")]
        mode: Option<String>,

        /// 探测间隔秒数，设置后覆盖配置文件
        #[arg(short, long, value_name = "SECONDS", env = "PING_VITALS_INTERVAL")]
        interval: Option<u64>,

        /// cron调度表达式，可带IANA时区后缀，设置后优先于固定间隔
        #[arg(short, long, value_name = "EXPR", env = "PING_VITALS_SCHEDULE")]
        schedule: Option<String>,
    },

    /// 执行单次可达性探测并输出结果
    Check {
        /// 目标主机，缺省时取配置文件中的主机
        #[arg(value_name = "HOST")]
        host: Option<String>,

        /// 探测模式 (icmp/external/http/tcp/udp)
        #[arg(short, long, value_name = "MODE", env = "PING_VITALS_MODE")]
        mode: Option<String>,

        /// 输出格式
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// 探测超时秒数
        #[arg(short, long, value_name = "SECONDS", default_value_t = 5)]
        timeout: u64,
    },

    /// 验证配置文件
    Validate {
        /// 配置文件路径，缺省时取默认查找路径
        #[arg(value_name = "FILE")]
        config_path: Option<PathBuf>,

        /// 打印解析出的各项配置
        #[arg(short, long)]
        verbose: bool,
    },

    /// 显示版本信息
    Version {
        /// 输出格式
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

/// 输出格式
#[derive(ValueEnum, Clone, Debug, PartialEq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl Args {
    /// 配置文件路径，未显式指定时退回默认查找路径
    pub fn get_config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(crate::config::loader::get_default_config_path)
    }

    /// 是否应输出调试级别日志
    pub fn is_verbose(&self) -> bool {
        self.verbose || self.log_level == LogLevel::Debug
    }
}
