//! ICMP探测策略实现
//!
//! 基于原始套接字发送ICMP echo请求，创建套接字通常需要管理员权限

use crate::error::{ProbeError, Result};
use crate::probe::{resolve_host, ProbeMode, ProbeStrategy};
use async_trait::async_trait;
use std::net::IpAddr;
use std::time::{Duration, Instant};
use surge_ping::{Client, Config, PingIdentifier, PingSequence, ICMP};

/// ICMP echo有效载荷大小（字节）
const PAYLOAD_SIZE: usize = 56;

/// ICMP探测策略
pub struct IcmpProbe {
    /// IPv4 ICMP客户端
    client_v4: Client,
    /// IPv6 ICMP客户端，首次探测IPv6目标时创建
    client_v6: Option<Client>,
    /// 单次探测超时时间
    timeout: Duration,
    /// echo请求序号，每次探测递增
    sequence: u16,
    /// 最近一次探测耗时
    last_duration: Option<Duration>,
}

impl IcmpProbe {
    /// 创建新的ICMP探测器
    ///
    /// # 参数
    /// * `timeout` - 单次探测超时时间
    ///
    /// # 返回
    /// * `Result<Self>` - 探测器实例，缺少原始套接字权限时返回
    ///   `ProbeError::IcmpSocket`
    pub fn new(timeout: Duration) -> Result<Self> {
        let client_v4 = Client::new(&Config::default()).map_err(ProbeError::IcmpSocket)?;

        Ok(Self {
            client_v4,
            client_v6: None,
            timeout,
            sequence: 0,
            last_duration: None,
        })
    }

    /// 选择与目标地址族匹配的客户端
    fn client_for(&mut self, ip: IpAddr) -> Option<Client> {
        match ip {
            IpAddr::V4(_) => Some(self.client_v4.clone()),
            IpAddr::V6(_) => {
                if self.client_v6.is_none() {
                    match Client::new(&Config::builder().kind(ICMP::V6).build()) {
                        Ok(client) => self.client_v6 = Some(client),
                        Err(e) => {
                            tracing::warn!("IPv6 ICMP客户端创建失败: {}", e);
                            return None;
                        }
                    }
                }
                self.client_v6.clone()
            }
        }
    }
}

#[async_trait]
impl ProbeStrategy for IcmpProbe {
    async fn attempt(&mut self, host: &str) -> bool {
        let start = Instant::now();
        self.sequence = self.sequence.wrapping_add(1);

        let Some(ip) = resolve_host(host).await else {
            self.last_duration = Some(start.elapsed());
            tracing::debug!("主机解析失败: {}", host);
            return false;
        };

        let Some(client) = self.client_for(ip) else {
            self.last_duration = Some(start.elapsed());
            return false;
        };

        let mut pinger = client
            .pinger(ip, PingIdentifier(std::process::id() as u16))
            .await;
        pinger.timeout(self.timeout);

        let payload = [0u8; PAYLOAD_SIZE];
        match pinger.ping(PingSequence(self.sequence), &payload).await {
            Ok((_packet, rtt)) => {
                self.last_duration = Some(rtt);
                true
            }
            Err(e) => {
                self.last_duration = Some(start.elapsed());
                tracing::debug!("ICMP探测失败: {} -> {}", host, e);
                false
            }
        }
    }

    fn last_duration(&self) -> Option<Duration> {
        self.last_duration
    }

    fn kind(&self) -> ProbeMode {
        ProbeMode::Icmp
    }
}
