//! HTTP探测策略实现
//!
//! 发送HTTP GET请求，只要收到响应即视为可达，不关心状态码

use crate::error::{ProbeError, Result};
use crate::probe::{ProbeMode, ProbeStrategy};
use async_trait::async_trait;
use reqwest::Client;
use std::time::{Duration, Instant};

/// HTTP探测策略
pub struct HttpProbe {
    /// HTTP客户端，所有探测共用
    client: Client,
    /// 最近一次探测耗时
    last_duration: Option<Duration>,
}

impl HttpProbe {
    /// 创建新的HTTP探测器
    ///
    /// # 参数
    /// * `timeout` - 单次请求超时时间
    ///
    /// # 返回
    /// * `Result<Self>` - 探测器实例
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .user_agent(format!("{}/{}", crate::APP_NAME, crate::VERSION))
            .build()
            .map_err(|e| ProbeError::Setup(format!("HTTP客户端创建失败: {}", e)))?;

        Ok(Self {
            client,
            last_duration: None,
        })
    }

    /// 补全目标URL，未携带协议时默认使用http
    fn normalize_url(host: &str) -> String {
        if host.starts_with("http://") || host.starts_with("https://") {
            host.to_string()
        } else {
            format!("http://{}", host)
        }
    }
}

#[async_trait]
impl ProbeStrategy for HttpProbe {
    async fn attempt(&mut self, host: &str) -> bool {
        let url = Self::normalize_url(host);
        let start = Instant::now();

        // 错误状态码同样证明主机可达,只有请求未完成才算失败
        let reachable = match self.client.get(&url).send().await {
            Ok(response) => {
                tracing::debug!("HTTP探测响应: {} -> {}", url, response.status());
                true
            }
            Err(e) => {
                tracing::debug!("HTTP探测失败: {} -> {}", url, e);
                false
            }
        };

        self.last_duration = Some(start.elapsed());
        reachable
    }

    fn last_duration(&self) -> Option<Duration> {
        self.last_duration
    }

    fn kind(&self) -> ProbeMode {
        ProbeMode::Http
    }
}
