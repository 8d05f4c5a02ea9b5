//! 外部ping命令探测策略实现
//!
//! 每次探测调用一次系统ping命令，超时后杀死并回收子进程

use crate::probe::{ProbeMode, ProbeStrategy};
use async_trait::async_trait;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;

/// 外部ping命令探测策略
pub struct ExternalProbe {
    /// 单次探测超时时间
    timeout: Duration,
    /// 最近一次探测耗时
    last_duration: Option<Duration>,
}

impl ExternalProbe {
    /// 创建新的外部ping探测器
    ///
    /// # 参数
    /// * `timeout` - 单次探测超时时间
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            last_duration: None,
        }
    }

    /// 构造平台对应的ping命令，单次请求
    #[cfg(target_os = "windows")]
    fn build_command(&self, host: &str) -> Command {
        let mut command = Command::new("ping");
        command
            .arg("-n")
            .arg("1")
            .arg("-w")
            .arg(self.timeout.as_millis().to_string())
            .arg(host);
        command
    }

    /// 构造平台对应的ping命令，单次请求
    #[cfg(not(target_os = "windows"))]
    fn build_command(&self, host: &str) -> Command {
        let mut command = Command::new("ping");
        command.arg("-c").arg("1").arg(host);
        command
    }
}

#[async_trait]
impl ProbeStrategy for ExternalProbe {
    async fn attempt(&mut self, host: &str) -> bool {
        let start = Instant::now();

        let mut command = self.build_command(host);
        command
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(e) => {
                self.last_duration = Some(start.elapsed());
                tracing::warn!("ping命令启动失败: {}", e);
                return false;
            }
        };

        let reachable = match tokio::time::timeout(self.timeout, child.wait()).await {
            Ok(Ok(status)) => status.success(),
            Ok(Err(e)) => {
                tracing::debug!("等待ping进程失败: {}", e);
                false
            }
            Err(_) => {
                // 超时,杀死并回收子进程,避免僵尸进程残留
                let _ = child.start_kill();
                let _ = child.wait().await;
                tracing::debug!("ping进程超时被终止: {}", host);
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
        ProbeMode::External
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_command_args() {
        let probe = ExternalProbe::new(Duration::from_secs(2));
        let command = probe.build_command("192.0.2.1");

        let args: Vec<String> = command
            .as_std()
            .get_args()
            .map(|arg| arg.to_string_lossy().to_string())
            .collect();

        // 单次请求,目标主机必须是最后一个参数
        assert!(args.contains(&"1".to_string()));
        assert_eq!(args.last().unwrap(), "192.0.2.1");
    }

    #[tokio::test]
    async fn test_external_probe_invalid_host() {
        let mut probe = ExternalProbe::new(Duration::from_secs(2));

        // ping命令不存在或主机无法解析,两种情况都应返回false
        let reachable = probe.attempt("definitely-not-a-real-host.invalid").await;
        assert!(!reachable);
        assert!(probe.last_duration().is_some());
    }

    #[tokio::test]
    #[ignore] // 需要系统ping命令和本地回环网络
    async fn test_external_probe_localhost() {
        let mut probe = ExternalProbe::new(Duration::from_secs(5));

        assert!(probe.attempt("127.0.0.1").await);
        assert_eq!(probe.kind(), ProbeMode::External);
        assert!(probe.last_duration().unwrap() < Duration::from_secs(5));
    }
}
