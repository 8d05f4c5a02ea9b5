//! 配置数据结构
//!
//! TOML配置文件的结构定义、字段默认值与取值验证

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

/// 顶层配置，应用级设置与探测设置各占一节
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// `[global]` 节
    #[serde(default)]
    pub global: GlobalConfig,
    /// `[probe]` 节
    #[serde(default)]
    pub probe: ProbeConfig,
}

/// 应用级配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GlobalConfig {
    /// 日志级别 (trace/debug/info/warn/error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// 探测事件通道容量
    #[serde(default = "default_event_buffer_size")]
    pub event_buffer_size: usize,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            event_buffer_size: default_event_buffer_size(),
        }
    }
}

/// 探测配置
///
/// `schedule` 与 `interval_seconds` 互斥:配置了cron表达式时
/// 按表达式触发,否则按固定间隔循环。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProbeConfig {
    /// 目标主机(域名或IP地址)
    #[serde(default = "default_host")]
    pub host: String,
    /// 探测模式(icmp/external/http/tcp/udp,不区分大小写)
    #[serde(default = "default_mode")]
    pub mode: String,
    /// 固定探测间隔（秒）
    #[serde(default = "default_interval")]
    pub interval_seconds: u64,
    /// cron调度表达式,可选,末尾可附带IANA时区名称
    pub schedule: Option<String>,
    /// TCP/UDP探测端口
    #[serde(default = "default_port")]
    pub port: u16,
    /// 单次探测超时时间（秒）
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            mode: default_mode(),
            interval_seconds: default_interval(),
            schedule: None,
            port: default_port(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl ProbeConfig {
    /// 固定探测间隔
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds)
    }

    /// 单次探测超时时间
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

// serde字段默认值
fn default_log_level() -> String {
    "info".to_string()
}
fn default_event_buffer_size() -> usize {
    64
}
fn default_host() -> String {
    "8.8.8.8".to_string()
}
fn default_mode() -> String {
    "icmp".to_string()
}
fn default_interval() -> u64 {
    1
}
fn default_port() -> u16 {
    7
}
fn default_timeout() -> u64 {
    5
}

/// 逐项验证配置取值
///
/// 返回第一处不合法的字段描述，全部合法时返回Ok。
pub fn validate_config(config: &Config) -> Result<(), String> {
    let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_log_levels.contains(&config.global.log_level.as_str()) {
        return Err(format!(
            "不支持的日志级别: {}，可选: {:?}",
            config.global.log_level, valid_log_levels
        ));
    }

    if config.global.event_buffer_size == 0 {
        return Err("事件通道容量不能为0".to_string());
    }

    if config.probe.host.trim().is_empty() {
        return Err("探测主机不能为空".to_string());
    }

    if crate::probe::ProbeMode::from_str(&config.probe.mode).is_err() {
        return Err(format!(
            "未知的探测模式: {}，支持的模式: icmp/external/http/tcp/udp",
            config.probe.mode
        ));
    }

    if config.probe.interval_seconds == 0 {
        return Err("探测间隔不能为0".to_string());
    }

    if let Some(ref expression) = config.probe.schedule {
        if let Err(e) = crate::monitor::CronSchedule::parse(expression) {
            return Err(format!("cron表达式无效: {e}"));
        }
    }

    if config.probe.timeout_seconds == 0 {
        return Err("探测超时时间不能为0".to_string());
    }

    if config.probe.port == 0 {
        return Err("探测端口不能为0".to_string());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_config() -> Config {
        Config {
            global: GlobalConfig {
                log_level: "info".to_string(),
                event_buffer_size: 64,
            },
            probe: ProbeConfig {
                host: "example.com".to_string(),
                mode: "tcp".to_string(),
                interval_seconds: 5,
                schedule: None,
                port: 80,
                timeout_seconds: 3,
            },
        }
    }

    #[test]
    fn test_config_serialization() {
        let config = create_test_config();

        // TOML序列化后再读回,关键字段保持不变
        let serialized = toml::to_string(&config).expect("序列化失败");
        assert!(!serialized.is_empty());

        let deserialized: Config = toml::from_str(&serialized).expect("反序列化失败");
        assert_eq!(config.probe.host, deserialized.probe.host);
        assert_eq!(config.probe.mode, deserialized.probe.mode);
        assert_eq!(
            config.probe.interval_seconds,
            deserialized.probe.interval_seconds
        );
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        // 空配置文件应当得到完整的默认配置
        let config: Config = toml::from_str("").expect("反序列化失败");
        assert_eq!(config.probe.host, "8.8.8.8");
        assert_eq!(config.probe.mode, "icmp");
        assert_eq!(config.probe.interval_seconds, 1);
        assert_eq!(config.probe.port, 7);
        assert_eq!(config.probe.timeout_seconds, 5);
        assert!(config.probe.schedule.is_none());
        assert_eq!(config.global.log_level, "info");
        assert_eq!(config.global.event_buffer_size, 64);
    }

    #[test]
    fn test_config_validation() {
        let config = create_test_config();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_config_validation_empty_host() {
        let mut config = create_test_config();
        config.probe.host = "  ".to_string();

        let result = validate_config(&config);
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("探测主机不能为空"));
    }

    #[test]
    fn test_config_validation_unknown_mode() {
        let mut config = create_test_config();
        config.probe.mode = "quic".to_string();

        let result = validate_config(&config);
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("未知的探测模式"));
    }

    #[test]
    fn test_config_validation_zero_interval() {
        let mut config = create_test_config();
        config.probe.interval_seconds = 0;

        let result = validate_config(&config);
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("探测间隔不能为0"));
    }

    #[test]
    fn test_config_validation_invalid_schedule() {
        let mut config = create_test_config();
        config.probe.schedule = Some("not a cron".to_string());

        let result = validate_config(&config);
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("cron表达式无效"));
    }

    #[test]
    fn test_config_validation_valid_schedule() {
        let mut config = create_test_config();
        config.probe.schedule = Some("0 6 * * * America/Chicago".to_string());

        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = create_test_config();
        config.global.log_level = "verbose".to_string();

        let result = validate_config(&config);
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("不支持的日志级别"));
    }

    #[test]
    fn test_duration_accessors() {
        let config = create_test_config();
        assert_eq!(config.probe.interval(), Duration::from_secs(5));
        assert_eq!(config.probe.timeout(), Duration::from_secs(3));
    }
}
