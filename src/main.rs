//! Ping Vitals 主程序入口
//!
//! 跨平台主机可达性探测工具

use anyhow::{Context, Result};
use clap::Parser;
use ping_vitals::cli::args::{Args, Commands};
use ping_vitals::cli::commands::{CheckCommand, Command, ValidateCommand, VersionCommand};
use ping_vitals::config::{self, ConfigLoader, TomlConfigLoader};
use ping_vitals::logging::{LogConfig, LoggingSystem};
use ping_vitals::monitor::{ProbeEvent, ProbeScheduler, Scheduler};
use ping_vitals::signals;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // 初始化日志系统，--verbose直接放大到调试级别
    let log_config = LogConfig {
        level: if args.is_verbose() {
            log::LevelFilter::Debug
        } else {
            args.log_level.clone().into()
        },
        console: true,
        json_format: false,
        ..Default::default()
    };

    let _logging_system = LoggingSystem::setup_logging(log_config).context("初始化日志系统失败")?;

    info!("Ping Vitals v{} 启动", ping_vitals::VERSION);

    if let Err(e) = execute_command(&args).await {
        error!("命令执行失败: {e:#}");
        std::process::exit(1);
    }

    Ok(())
}

/// 按子命令分发执行
async fn execute_command(args: &Args) -> Result<()> {
    match &args.command {
        Commands::Start {
            host,
            mode,
            interval,
            schedule,
        } => {
            execute_start_command(
                args,
                host.clone(),
                mode.clone(),
                *interval,
                schedule.clone(),
            )
            .await
        }
        Commands::Check { .. } => {
            let command = CheckCommand;
            command.execute(args).await.map_err(|e| anyhow::anyhow!(e))
        }
        Commands::Validate { .. } => {
            let command = ValidateCommand;
            command.execute(args).await.map_err(|e| anyhow::anyhow!(e))
        }
        Commands::Version { .. } => {
            let command = VersionCommand;
            command.execute(args).await.map_err(|e| anyhow::anyhow!(e))
        }
    }
}

/// 组装并运行周期探测服务
async fn execute_start_command(
    args: &Args,
    host: Option<String>,
    mode: Option<String>,
    interval: Option<u64>,
    schedule: Option<String>,
) -> Result<()> {
    info!("启动周期探测服务...");

    // 1. 配置加载与验证
    let config = load_and_validate_config(args, host, mode, interval, schedule).await?;

    // 2. 创建探测调度器，配置错误与权限问题在此暴露
    let scheduler =
        Arc::new(ProbeScheduler::new(config.probe.clone()).context("创建探测调度器失败")?);

    // 3. 设置信号处理，关闭信号转换为调度器停止请求
    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    signals::setup_signal_handlers(shutdown_tx)
        .await
        .context("设置信号处理器失败")?;

    let scheduler_for_shutdown = Arc::clone(&scheduler);
    tokio::spawn(async move {
        signals::wait_for_shutdown(shutdown_rx).await;
        scheduler_for_shutdown.stop();
    });

    // 4. 启动事件输出任务，事件以JSON行形式写入stdout
    let (event_tx, mut event_rx) = mpsc::channel::<ProbeEvent>(config.global.event_buffer_size);
    let emitter = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            match event.to_json() {
                Ok(line) => println!("{line}"),
                Err(e) => error!("序列化探测事件失败: {}", e),
            }
        }
    });

    // 5. 运行调度循环，阻塞到停止请求或调度耗尽为止
    scheduler
        .start(event_tx)
        .await
        .context("探测调度循环失败")?;

    // 6. 排空剩余事件后退出
    emitter.await.context("事件输出任务异常退出")?;

    info!("服务已停止");
    Ok(())
}

/// 加载配置并叠加命令行覆盖项
///
/// 配置文件不存在时从默认配置出发。覆盖项全部套用之后
/// 重新验证一次，避免非法组合进入调度器。
///
/// # 参数
/// * `args` - 命令行参数，提供配置文件路径
/// * `host` - 目标主机覆盖值
/// * `mode` - 探测模式覆盖值
/// * `interval` - 探测间隔覆盖值（秒）
/// * `schedule` - cron调度表达式覆盖值
async fn load_and_validate_config(
    args: &Args,
    host: Option<String>,
    mode: Option<String>,
    interval: Option<u64>,
    schedule: Option<String>,
) -> Result<config::Config> {
    let config_path = args.get_config_path();
    let loader = TomlConfigLoader::new(true);

    let mut config = if config_path.exists() {
        loader
            .load_from_file(&config_path)
            .await
            .with_context(|| format!("加载配置文件失败: {}", config_path.display()))?
    } else {
        info!("配置文件不存在，使用默认配置: {}", config_path.display());
        config::Config::default()
    };

    if let Some(host) = host {
        config.probe.host = host;
    }
    if let Some(mode) = mode {
        config.probe.mode = mode;
    }
    if let Some(interval_secs) = interval {
        config.probe.interval_seconds = interval_secs;
    }
    if let Some(expression) = schedule {
        config.probe.schedule = Some(expression);
    }

    config::validate_config(&config).map_err(|e| anyhow::anyhow!("配置验证失败: {}", e))?;

    info!(
        "配置加载完成: host={} mode={}",
        config.probe.host, config.probe.mode
    );
    Ok(config)
}
