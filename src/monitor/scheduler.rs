//! 探测调度器模块
//!
//! 提供固定间隔与cron表达式两种调度方式，以及协作式停止控制

use crate::config::ProbeConfig;
use crate::error::{Result, ScheduleError};
use crate::monitor::cron::CronSchedule;
use crate::monitor::event::ProbeEvent;
use crate::monitor::executor::execute_tick;
use crate::probe::{create_probe, ProbeStrategy};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// 调度器状态快照
#[derive(Debug, Clone)]
pub struct SchedulerStatus {
    /// 调度循环是否运行中
    pub is_running: bool,
    /// 已完成的调度周期数
    pub ticks_executed: u64,
    /// 是否已请求停止
    pub stop_requested: bool,
}

/// 调度器trait，定义启动与停止接口
#[async_trait]
pub trait Scheduler: Send + Sync {
    /// 启动调度循环，阻塞到循环结束为止
    ///
    /// # 参数
    /// * `sink` - 探测事件发送端
    ///
    /// # 返回
    /// * `Result<()>` - 循环结束原因，停止请求属于正常结束
    async fn start(&self, sink: mpsc::Sender<ProbeEvent>) -> Result<()>;

    /// 请求停止调度循环
    ///
    /// 幂等，可在任意线程调用，立即返回不等待循环退出。
    fn stop(&self);

    /// 获取状态快照
    fn status(&self) -> SchedulerStatus;
}

/// 探测调度器实现
///
/// 同一实例只允许启动一次；停止请求一经发出不可撤销。
pub struct ProbeScheduler {
    /// 探测配置
    config: ProbeConfig,
    /// 探测器，启动时移交给调度循环
    probe: Mutex<Option<Box<dyn ProbeStrategy>>>,
    /// 停止令牌
    cancel: CancellationToken,
    /// 调度循环是否运行中
    running: AtomicBool,
    /// 已完成的调度周期数
    ticks: AtomicU64,
}

impl ProbeScheduler {
    /// 创建新的探测调度器
    ///
    /// 探测器与cron表达式都在此即刻构建，配置错误和权限问题
    /// 在调度开始前暴露。
    ///
    /// # 参数
    /// * `config` - 已验证的探测配置
    ///
    /// # 返回
    /// * `Result<Self>` - 调度器实例或配置/初始化错误
    pub fn new(config: ProbeConfig) -> Result<Self> {
        let probe = create_probe(&config)?;

        if let Some(ref expression) = config.schedule {
            CronSchedule::parse(expression)?;
        }

        Ok(Self::with_probe(config, probe))
    }

    /// 使用外部提供的探测器创建调度器
    ///
    /// # 参数
    /// * `config` - 探测配置
    /// * `probe` - 探测策略实例
    pub fn with_probe(config: ProbeConfig, probe: Box<dyn ProbeStrategy>) -> Self {
        Self {
            config,
            probe: Mutex::new(Some(probe)),
            cancel: CancellationToken::new(),
            running: AtomicBool::new(false),
            ticks: AtomicU64::new(0),
        }
    }

    /// 固定间隔调度循环
    ///
    /// 先执行一个周期再休眠，休眠随时可被停止请求打断。
    async fn run_interval(
        &self,
        probe: &mut Box<dyn ProbeStrategy>,
        sink: &mpsc::Sender<ProbeEvent>,
    ) -> Result<()> {
        let interval = self.config.interval();
        info!(
            "启动固定间隔调度: host={} interval={:?}",
            self.config.host, interval
        );

        while !self.cancel.is_cancelled() {
            if execute_tick(probe.as_mut(), &self.config.host, sink)
                .await
                .is_err()
            {
                warn!("事件接收端已关闭,调度循环退出");
                break;
            }
            self.ticks.fetch_add(1, Ordering::Relaxed);

            tokio::select! {
                // 停止优先于计时
                biased;
                _ = self.cancel.cancelled() => break,
                _ = tokio::time::sleep(interval) => {}
            }
        }

        Ok(())
    }

    /// cron表达式调度循环
    ///
    /// 触发时刻严格递增；被慢周期拖过的触发点会按顺序补跑，
    /// 单循环保证任意时刻至多一个周期在执行。
    async fn run_schedule(
        &self,
        expression: &str,
        probe: &mut Box<dyn ProbeStrategy>,
        sink: &mpsc::Sender<ProbeEvent>,
    ) -> Result<()> {
        let schedule = CronSchedule::parse(expression)?;
        info!(
            "启动cron调度: host={} expression={} timezone={}",
            self.config.host,
            schedule.expression(),
            schedule.timezone()
        );

        let mut after = Utc::now();
        loop {
            if self.cancel.is_cancelled() {
                break;
            }

            let Some(next_fire) = schedule.next_after(after) else {
                warn!("cron调度已穷尽,调度循环退出: {}", schedule.expression());
                break;
            };

            let wait = (next_fire - Utc::now()).to_std().unwrap_or(Duration::ZERO);
            debug!("下一次触发: {}", next_fire);

            tokio::select! {
                // 停止优先于计时
                biased;
                _ = self.cancel.cancelled() => break,
                _ = tokio::time::sleep(wait) => {}
            }

            if execute_tick(probe.as_mut(), &self.config.host, sink)
                .await
                .is_err()
            {
                warn!("事件接收端已关闭,调度循环退出");
                break;
            }
            self.ticks.fetch_add(1, Ordering::Relaxed);

            after = next_fire;
        }

        Ok(())
    }
}

#[async_trait]
impl Scheduler for ProbeScheduler {
    async fn start(&self, sink: mpsc::Sender<ProbeEvent>) -> Result<()> {
        // 取出探测器,同一实例只允许启动一次
        let mut probe = {
            let mut guard = self.probe.lock().await;
            guard.take().ok_or(ScheduleError::AlreadyStarted)?
        };

        // 启动前已请求停止,一个周期都不执行
        if self.cancel.is_cancelled() {
            info!("启动前已请求停止,调度循环不再执行");
            return Ok(());
        }

        self.running.store(true, Ordering::SeqCst);

        let result = match self.config.schedule.clone() {
            Some(expression) => self.run_schedule(&expression, &mut probe, &sink).await,
            None => self.run_interval(&mut probe, &sink).await,
        };

        self.running.store(false, Ordering::SeqCst);
        info!(
            "调度循环已退出: host={} ticks={}",
            self.config.host,
            self.ticks.load(Ordering::Relaxed)
        );

        result
    }

    fn stop(&self) {
        if !self.cancel.is_cancelled() {
            info!("收到停止请求");
        }
        self.cancel.cancel();
    }

    fn status(&self) -> SchedulerStatus {
        SchedulerStatus {
            is_running: self.running.load(Ordering::SeqCst),
            ticks_executed: self.ticks.load(Ordering::Relaxed),
            stop_requested: self.cancel.is_cancelled(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::ProbeMode;

    /// 立即返回固定结果的探测器
    struct InstantProbe;

    #[async_trait]
    impl ProbeStrategy for InstantProbe {
        async fn attempt(&mut self, _host: &str) -> bool {
            true
        }

        fn last_duration(&self) -> Option<Duration> {
            Some(Duration::from_millis(1))
        }

        fn kind(&self) -> ProbeMode {
            ProbeMode::Tcp
        }
    }

    fn create_test_config() -> ProbeConfig {
        ProbeConfig {
            host: "127.0.0.1".to_string(),
            mode: "tcp".to_string(),
            interval_seconds: 1,
            ..ProbeConfig::default()
        }
    }

    #[tokio::test]
    async fn test_stop_before_start() {
        let scheduler = ProbeScheduler::with_probe(create_test_config(), Box::new(InstantProbe));
        let (tx, mut rx) = mpsc::channel(8);

        scheduler.stop();
        scheduler.start(tx).await.unwrap();

        // 一个周期都不应执行
        assert_eq!(scheduler.status().ticks_executed, 0);
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_stop_is_idempotent() {
        let scheduler = ProbeScheduler::with_probe(create_test_config(), Box::new(InstantProbe));

        scheduler.stop();
        scheduler.stop();
        scheduler.stop();

        assert!(scheduler.status().stop_requested);
        assert!(!scheduler.status().is_running);
    }

    #[tokio::test]
    async fn test_second_start_rejected() {
        let scheduler = ProbeScheduler::with_probe(create_test_config(), Box::new(InstantProbe));
        scheduler.stop();

        let (tx, _rx) = mpsc::channel(8);
        scheduler.start(tx).await.unwrap();

        let (tx, _rx) = mpsc::channel(8);
        let result = scheduler.start(tx).await;
        assert!(matches!(
            result.unwrap_err(),
            crate::error::PingVitalsError::Schedule(ScheduleError::AlreadyStarted)
        ));
    }

    #[tokio::test]
    async fn test_interval_first_tick_is_immediate() {
        let scheduler = std::sync::Arc::new(ProbeScheduler::with_probe(
            create_test_config(),
            Box::new(InstantProbe),
        ));
        let (tx, mut rx) = mpsc::channel(8);

        let handle = {
            let scheduler = std::sync::Arc::clone(&scheduler);
            tokio::spawn(async move { scheduler.start(tx).await })
        };

        // 第一个周期无需等待完整间隔
        let event = tokio::time::timeout(Duration::from_millis(500), rx.recv())
            .await
            .expect("首个事件应立即产出")
            .unwrap();
        assert!(event.success);

        scheduler.stop();
        handle.await.unwrap().unwrap();
        assert!(scheduler.status().ticks_executed >= 1);
        assert!(!scheduler.status().is_running);
    }

    #[tokio::test]
    async fn test_new_rejects_invalid_schedule() {
        let config = ProbeConfig {
            schedule: Some("not a cron".to_string()),
            mode: "tcp".to_string(),
            ..ProbeConfig::default()
        };

        assert!(ProbeScheduler::new(config).is_err());
    }

    #[tokio::test]
    async fn test_sink_closed_ends_loop_cleanly() {
        let scheduler = std::sync::Arc::new(ProbeScheduler::with_probe(
            create_test_config(),
            Box::new(InstantProbe),
        ));
        let (tx, rx) = mpsc::channel(8);
        drop(rx);

        // 接收端关闭视为宿主撤离,正常结束而非报错
        scheduler.start(tx).await.unwrap();
        assert_eq!(scheduler.status().ticks_executed, 0);
    }
}
