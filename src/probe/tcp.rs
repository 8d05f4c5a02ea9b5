//! TCP探测策略实现
//!
//! 在超时时间内建立一次TCP连接，连接成功即视为可达

use crate::probe::{ProbeMode, ProbeStrategy};
use async_trait::async_trait;
use std::time::{Duration, Instant};
use tokio::net::TcpStream;

/// TCP探测策略
pub struct TcpProbe {
    /// 目标端口
    port: u16,
    /// 单次连接超时时间
    timeout: Duration,
    /// 最近一次探测耗时
    last_duration: Option<Duration>,
}

impl TcpProbe {
    /// 创建新的TCP探测器
    ///
    /// # 参数
    /// * `port` - 目标端口
    /// * `timeout` - 单次连接超时时间
    pub fn new(port: u16, timeout: Duration) -> Self {
        Self {
            port,
            timeout,
            last_duration: None,
        }
    }
}

#[async_trait]
impl ProbeStrategy for TcpProbe {
    async fn attempt(&mut self, host: &str) -> bool {
        let start = Instant::now();

        let reachable =
            match tokio::time::timeout(self.timeout, TcpStream::connect((host, self.port))).await {
                Ok(Ok(stream)) => {
                    // 连接建立即达成目的,立即断开
                    drop(stream);
                    true
                }
                Ok(Err(e)) => {
                    tracing::debug!("TCP探测失败: {}:{} -> {}", host, self.port, e);
                    false
                }
                Err(_) => {
                    tracing::debug!("TCP探测超时: {}:{}", host, self.port);
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
        ProbeMode::Tcp
    }
}
