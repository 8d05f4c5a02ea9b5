//! UDP探测策略实现
//!
//! 向目标端口发送一个数据报，在超时时间内收到任意回复即视为可达

use crate::probe::{resolve_host, ProbeMode, ProbeStrategy};
use async_trait::async_trait;
use std::time::{Duration, Instant};
use tokio::net::UdpSocket;

/// 探测数据报内容
const PAYLOAD: &[u8] = b"ping-vitals";

/// UDP探测策略
///
/// UDP本身无连接,收不到回复既可能是主机离线,也可能是
/// 服务不回包,调用方应按目标服务特性解读结果。
pub struct UdpProbe {
    /// 目标端口
    port: u16,
    /// 等待回复的超时时间
    timeout: Duration,
    /// 最近一次探测耗时
    last_duration: Option<Duration>,
}

impl UdpProbe {
    /// 创建新的UDP探测器
    ///
    /// # 参数
    /// * `port` - 目标端口
    /// * `timeout` - 等待回复的超时时间
    pub fn new(port: u16, timeout: Duration) -> Self {
        Self {
            port,
            timeout,
            last_duration: None,
        }
    }

    /// 完成一次发送加等待回复的交换
    async fn exchange(&self, host: &str) -> bool {
        let Some(ip) = resolve_host(host).await else {
            tracing::debug!("主机解析失败: {}", host);
            return false;
        };

        // 本地套接字地址族必须与目标一致
        let bind_addr = if ip.is_ipv4() { "0.0.0.0:0" } else { "[::]:0" };
        let socket = match UdpSocket::bind(bind_addr).await {
            Ok(socket) => socket,
            Err(e) => {
                tracing::warn!("UDP套接字创建失败: {}", e);
                return false;
            }
        };

        if let Err(e) = socket.send_to(PAYLOAD, (ip, self.port)).await {
            tracing::debug!("UDP发送失败: {}:{} -> {}", host, self.port, e);
            return false;
        }

        let mut buf = [0u8; 512];
        match tokio::time::timeout(self.timeout, socket.recv_from(&mut buf)).await {
            Ok(Ok(_)) => true,
            Ok(Err(e)) => {
                tracing::debug!("UDP接收失败: {}:{} -> {}", host, self.port, e);
                false
            }
            Err(_) => {
                tracing::debug!("UDP探测超时: {}:{}", host, self.port);
                false
            }
        }
    }
}

#[async_trait]
impl ProbeStrategy for UdpProbe {
    async fn attempt(&mut self, host: &str) -> bool {
        let start = Instant::now();
        let reachable = self.exchange(host).await;
        self.last_duration = Some(start.elapsed());
        reachable
    }

    fn last_duration(&self) -> Option<Duration> {
        self.last_duration
    }

    fn kind(&self) -> ProbeMode {
        ProbeMode::Udp
    }
}
