//! 探测事件数据结构
//!
//! 定义每次探测产生的测量事件类型

use crate::probe::ProbeMode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// 探测事件
///
/// 每个调度周期产生一条事件，探测失败同样是一条
/// `success = false` 的事件，不是错误。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeEvent {
    /// 事件ID
    pub id: Uuid,
    /// 目标主机
    pub host: String,
    /// 探测模式
    pub mode: String,
    /// 目标是否可达
    pub success: bool,
    /// 探测耗时（秒），未测得时整个字段省略
    #[serde(
        rename = "duration",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub duration_secs: Option<f64>,
    /// 事件时间戳
    pub timestamp: DateTime<Utc>,
}

impl ProbeEvent {
    /// 创建新的探测事件
    ///
    /// # 参数
    /// * `host` - 目标主机
    /// * `mode` - 探测模式
    /// * `success` - 目标是否可达
    ///
    /// # 返回
    /// * `Self` - 探测事件实例
    pub fn new(host: String, mode: ProbeMode, success: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            host,
            mode: mode.to_string(),
            success,
            duration_secs: None,
            timestamp: Utc::now(),
        }
    }

    /// 设置探测耗时
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration_secs = Some(duration.as_secs_f64());
        self
    }

    /// 设置事件时间戳
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// 获取探测耗时
    pub fn duration(&self) -> Option<Duration> {
        self.duration_secs.map(Duration::from_secs_f64)
    }

    /// 转换为JSON字符串
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// 从JSON字符串创建
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
