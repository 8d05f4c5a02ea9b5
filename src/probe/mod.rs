//! 探测策略模块
//!
//! 提供ICMP、外部ping、HTTP、TCP、UDP五种可达性探测策略

pub mod external;
pub mod factory;
pub mod http;
pub mod icmp;
pub mod tcp;
pub mod udp;

// 重新导出主要类型
pub use external::ExternalProbe;
pub use factory::create_probe;
pub use http::HttpProbe;
pub use icmp::IcmpProbe;
pub use tcp::TcpProbe;
pub use udp::UdpProbe;

use crate::error::ConfigError;
use async_trait::async_trait;
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;
use std::time::Duration;

/// 探测模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProbeMode {
    /// ICMP echo探测
    Icmp,
    /// 调用系统ping命令探测
    External,
    /// HTTP GET探测
    Http,
    /// TCP连接探测
    Tcp,
    /// UDP数据报探测
    Udp,
}

impl ProbeMode {
    /// 模式的规范名称
    pub fn as_str(&self) -> &'static str {
        match self {
            ProbeMode::Icmp => "icmp",
            ProbeMode::External => "external",
            ProbeMode::Http => "http",
            ProbeMode::Tcp => "tcp",
            ProbeMode::Udp => "udp",
        }
    }
}

impl fmt::Display for ProbeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProbeMode {
    type Err = ConfigError;

    /// 解析探测模式名称，不区分大小写
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "icmp" => Ok(ProbeMode::Icmp),
            "external" => Ok(ProbeMode::External),
            "http" => Ok(ProbeMode::Http),
            "tcp" => Ok(ProbeMode::Tcp),
            "udp" => Ok(ProbeMode::Udp),
            _ => Err(ConfigError::UnknownMode {
                mode: s.to_string(),
            }),
        }
    }
}

/// 探测策略trait，定义统一的探测接口
///
/// 单次探测失败（超时、拒绝、不可达）返回 `false`，不是错误；
/// 只有构造阶段可能失败。每次 `attempt` 都会记录本次耗时，
/// 可通过 `last_duration` 读取。
#[async_trait]
pub trait ProbeStrategy: Send + Sync {
    /// 执行一次探测
    ///
    /// # 参数
    /// * `host` - 目标主机（域名或IP地址）
    ///
    /// # 返回
    /// * `bool` - 目标是否可达
    async fn attempt(&mut self, host: &str) -> bool;

    /// 最近一次探测的耗时，尚未探测时返回None
    fn last_duration(&self) -> Option<Duration>;

    /// 探测模式
    fn kind(&self) -> ProbeMode;
}

impl fmt::Debug for dyn ProbeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProbeStrategy")
            .field("kind", &self.kind())
            .finish()
    }
}

/// 解析主机名，优先返回IPv4地址
///
/// # 参数
/// * `host` - 域名或IP地址
///
/// # 返回
/// * `Option<IpAddr>` - 解析结果，失败时返回None
pub(crate) async fn resolve_host(host: &str) -> Option<IpAddr> {
    if let Ok(ip) = host.parse::<IpAddr>() {
        return Some(ip);
    }

    // lookup_host要求带端口,端口本身不参与域名解析
    let addrs: Vec<IpAddr> = tokio::net::lookup_host((host, 0))
        .await
        .ok()?
        .map(|addr| addr.ip())
        .collect();

    addrs
        .iter()
        .find(|ip| ip.is_ipv4())
        .or_else(|| addrs.first())
        .copied()
}
