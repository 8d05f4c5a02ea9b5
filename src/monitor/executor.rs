//! 探测执行器
//!
//! 每个调度周期执行一次探测，并向事件通道产出恰好一条事件

use crate::error::{Result, ScheduleError};
use crate::monitor::event::ProbeEvent;
use crate::probe::ProbeStrategy;
use tokio::sync::mpsc;

/// 执行一个调度周期
///
/// 探测失败产出 `success = false` 的事件而非错误，
/// 只有事件接收端关闭时才返回错误。
///
/// # 参数
/// * `probe` - 探测策略
/// * `host` - 目标主机
/// * `sink` - 事件发送端
///
/// # 返回
/// * `Result<()>` - 接收端关闭时返回 `ScheduleError::SinkClosed`
pub async fn execute_tick(
    probe: &mut dyn ProbeStrategy,
    host: &str,
    sink: &mpsc::Sender<ProbeEvent>,
) -> Result<()> {
    let success = probe.attempt(host).await;

    let mut event = ProbeEvent::new(host.to_string(), probe.kind(), success);
    if let Some(duration) = probe.last_duration() {
        event = event.with_duration(duration);
    }

    if success {
        tracing::debug!(
            "探测成功: host={} mode={} duration={:?}",
            host,
            probe.kind(),
            probe.last_duration()
        );
    } else {
        tracing::warn!("探测失败: host={} mode={}", host, probe.kind());
    }

    sink.send(event)
        .await
        .map_err(|_| ScheduleError::SinkClosed)?;

    Ok(())
}
