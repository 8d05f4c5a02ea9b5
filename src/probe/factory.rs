//! 探测器工厂
//!
//! 根据配置的模式名称创建对应的探测策略实例

use crate::config::ProbeConfig;
use crate::error::Result;
use crate::probe::{
    ExternalProbe, HttpProbe, IcmpProbe, ProbeMode, ProbeStrategy, TcpProbe, UdpProbe,
};
use std::str::FromStr;

/// 根据配置创建探测器
///
/// 模式名称不区分大小写；未知模式立即返回配置错误，不做任何回退。
/// 探测器在此一次性创建完成，权限类问题在调度开始前暴露。
///
/// # 参数
/// * `config` - 探测配置
///
/// # 返回
/// * `Result<Box<dyn ProbeStrategy>>` - 探测器实例或错误
pub fn create_probe(config: &ProbeConfig) -> Result<Box<dyn ProbeStrategy>> {
    let mode = ProbeMode::from_str(&config.mode)?;
    let timeout = config.timeout();

    let probe: Box<dyn ProbeStrategy> = match mode {
        ProbeMode::Icmp => Box::new(IcmpProbe::new(timeout)?),
        ProbeMode::External => Box::new(ExternalProbe::new(timeout)),
        ProbeMode::Http => Box::new(HttpProbe::new(timeout)?),
        ProbeMode::Tcp => Box::new(TcpProbe::new(config.port, timeout)),
        ProbeMode::Udp => Box::new(UdpProbe::new(config.port, timeout)),
    };

    tracing::debug!("探测器创建完成: mode={}", mode);
    Ok(probe)
}
