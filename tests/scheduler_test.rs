//! 调度循环集成测试
//!
//! 测试固定间隔与cron两种调度方式的节奏、停止响应和事件产出

use async_trait::async_trait;
use ping_vitals::config::ProbeConfig;
use ping_vitals::monitor::{ProbeScheduler, Scheduler};
use ping_vitals::probe::{ProbeMode, ProbeStrategy};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// 立即返回成功的探测器
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

/// 记录并发度的慢速探测器
struct SlowProbe {
    delay: Duration,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

#[async_trait]
impl ProbeStrategy for SlowProbe {
    async fn attempt(&mut self, _host: &str) -> bool {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        true
    }

    fn last_duration(&self) -> Option<Duration> {
        Some(self.delay)
    }

    fn kind(&self) -> ProbeMode {
        ProbeMode::Tcp
    }
}

fn interval_config(interval_seconds: u64) -> ProbeConfig {
    ProbeConfig {
        host: "127.0.0.1".to_string(),
        mode: "tcp".to_string(),
        interval_seconds,
        ..ProbeConfig::default()
    }
}

fn schedule_config(expression: &str) -> ProbeConfig {
    ProbeConfig {
        host: "127.0.0.1".to_string(),
        mode: "tcp".to_string(),
        schedule: Some(expression.to_string()),
        ..ProbeConfig::default()
    }
}

#[tokio::test]
async fn test_interval_tick_count_within_bounds() {
    let scheduler = Arc::new(ProbeScheduler::with_probe(
        interval_config(1),
        Box::new(InstantProbe),
    ));
    let (tx, mut rx) = mpsc::channel(64);

    let handle = {
        let scheduler = Arc::clone(&scheduler);
        tokio::spawn(async move { scheduler.start(tx).await })
    };

    // 以1秒间隔运行约3.2秒
    tokio::time::sleep(Duration::from_millis(3200)).await;
    scheduler.stop();
    handle.await.unwrap().unwrap();

    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }

    // 首个周期立即执行，之后每秒一个：预期 0s/1s/2s/3s 共4个，
    // 调度抖动允许少到2个
    assert!(
        (2..=4).contains(&events.len()),
        "事件数量超出预期范围: {}",
        events.len()
    );
    assert!(events.iter().all(|e| e.success));
}

#[tokio::test]
async fn test_stop_interrupts_long_interval_sleep() {
    let scheduler = Arc::new(ProbeScheduler::with_probe(
        interval_config(60),
        Box::new(InstantProbe),
    ));
    let (tx, mut rx) = mpsc::channel(8);

    let handle = {
        let scheduler = Arc::clone(&scheduler);
        tokio::spawn(async move { scheduler.start(tx).await })
    };

    // 等到首个事件产出，确认循环已进入60秒休眠
    let first = tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("首个事件应立即产出")
        .unwrap();
    assert!(first.success);

    // 停止请求必须打断休眠，不等待剩余间隔
    let stop_at = Instant::now();
    scheduler.stop();
    tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .expect("停止后循环应迅速退出")
        .unwrap()
        .unwrap();

    assert!(stop_at.elapsed() < Duration::from_secs(2));
    assert_eq!(scheduler.status().ticks_executed, 1);
}

#[tokio::test]
async fn test_cron_schedule_fires_every_second() {
    let scheduler = Arc::new(ProbeScheduler::with_probe(
        schedule_config("* * * * * *"),
        Box::new(InstantProbe),
    ));
    let (tx, mut rx) = mpsc::channel(64);

    let handle = {
        let scheduler = Arc::clone(&scheduler);
        tokio::spawn(async move { scheduler.start(tx).await })
    };

    // 每秒触发一次的表达式运行约2.5秒
    tokio::time::sleep(Duration::from_millis(2500)).await;
    scheduler.stop();
    handle.await.unwrap().unwrap();

    let mut count = 0;
    while rx.recv().await.is_some() {
        count += 1;
    }

    assert!(count >= 2, "2.5秒内至少应触发2次: {count}");
}

#[tokio::test]
async fn test_cron_slow_probe_never_overlaps() {
    let in_flight = Arc::new(AtomicUsize::new(0));
    let max_in_flight = Arc::new(AtomicUsize::new(0));

    let probe = SlowProbe {
        delay: Duration::from_millis(1300),
        in_flight: Arc::clone(&in_flight),
        max_in_flight: Arc::clone(&max_in_flight),
    };
    let scheduler = Arc::new(ProbeScheduler::with_probe(
        schedule_config("* * * * * *"),
        Box::new(probe),
    ));
    let (tx, mut rx) = mpsc::channel(16);

    let handle = {
        let scheduler = Arc::clone(&scheduler);
        tokio::spawn(async move { scheduler.start(tx).await })
    };

    // 单个周期耗时1.3秒，超过每秒一次的触发节奏
    tokio::time::sleep(Duration::from_secs(4)).await;
    scheduler.stop();
    handle.await.unwrap().unwrap();

    let mut count = 0;
    while rx.recv().await.is_some() {
        count += 1;
    }

    // 错过的触发点按顺序补跑，但任意时刻至多一个周期在执行
    assert!(count >= 2, "慢速周期也应至少完成2次: {count}");
    assert_eq!(
        max_in_flight.load(Ordering::SeqCst),
        1,
        "调度周期不允许并发执行"
    );
}

#[tokio::test]
async fn test_unreachable_port_yields_failure_event() {
    // 先绑定再释放，拿到一个当前未被监听的端口
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let config = ProbeConfig {
        host: "127.0.0.1".to_string(),
        mode: "tcp".to_string(),
        interval_seconds: 1,
        port,
        timeout_seconds: 1,
        ..ProbeConfig::default()
    };
    let scheduler = Arc::new(ProbeScheduler::new(config).unwrap());
    let (tx, mut rx) = mpsc::channel(8);

    let handle = {
        let scheduler = Arc::clone(&scheduler);
        tokio::spawn(async move { scheduler.start(tx).await })
    };

    // 不可达是一条success=false的事件，不是错误
    let event = tokio::time::timeout(Duration::from_secs(3), rx.recv())
        .await
        .expect("失败事件同样应该产出")
        .unwrap();

    assert!(!event.success);
    assert_eq!(event.host, "127.0.0.1");
    assert_eq!(event.mode, "tcp");
    assert!(event.duration_secs.is_some());

    scheduler.stop();
    handle.await.unwrap().unwrap();
}
