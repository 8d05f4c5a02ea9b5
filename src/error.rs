//! 统一错误类型
//!
//! 顶层错误按来源分组，子错误通过From自动提升

use thiserror::Error;

/// 应用级错误
#[derive(Error, Debug)]
pub enum PingVitalsError {
    /// 配置加载或验证错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    /// 探测器构造错误
    #[error("探测器错误: {0}")]
    Probe(#[from] ProbeError),

    /// 调度循环错误
    #[error("调度错误: {0}")]
    Schedule(#[from] ScheduleError),

    /// IO错误
    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),

    /// JSON编解码错误
    #[error("JSON错误: {0}")]
    Json(#[from] serde_json::Error),

    /// 未归类的错误
    #[error("其他错误: {0}")]
    Other(#[from] anyhow::Error),
}

/// 配置阶段的错误
#[derive(Error, Debug)]
pub enum ConfigError {
    /// TOML内容解析失败
    #[error("配置文件解析失败: {0}")]
    ParseError(String),

    /// 字段取值未通过验证
    #[error("配置验证失败: {0}")]
    ValidationError(String),

    /// 指定路径上没有配置文件
    #[error("配置文件不存在: {path}")]
    FileNotFound { path: String },

    /// 引用的环境变量未定义
    #[error("环境变量替换失败: {var}")]
    EnvVarError { var: String },

    /// 未知的探测模式
    #[error("未知的探测模式: {mode}")]
    UnknownMode { mode: String },

    /// cron表达式解析错误
    #[error("cron表达式解析失败: {expression}: {reason}")]
    InvalidSchedule { expression: String, reason: String },

    /// 未知的时区名称
    #[error("未知的时区名称: {zone}")]
    InvalidTimezone { zone: String },
}

/// 探测器创建错误类型
///
/// 仅覆盖探测器的构造阶段;单次探测失败不是错误,
/// 而是一条 `success = false` 的探测事件。
#[derive(Error, Debug)]
pub enum ProbeError {
    /// ICMP原始套接字创建失败,通常缺少管理员权限
    #[error("ICMP套接字创建失败(可能需要管理员权限): {0}")]
    IcmpSocket(std::io::Error),

    /// 其他探测器初始化失败
    #[error("探测器初始化失败: {0}")]
    Setup(String),
}

/// 调度错误类型
#[derive(Error, Debug)]
pub enum ScheduleError {
    /// 调度器已启动
    #[error("调度器已启动,不能重复启动")]
    AlreadyStarted,

    /// 事件接收端已关闭
    #[error("事件接收端已关闭")]
    SinkClosed,
}

/// 结果类型别名
pub type Result<T> = std::result::Result<T, PingVitalsError>;
