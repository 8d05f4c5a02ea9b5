//! CLI子命令实现
//!
//! check、validate与version三个一次性命令的执行逻辑，
//! 常驻的start命令在main中单独组装

use crate::cli::args::{Args, Commands, OutputFormat};
use crate::config::{Config, ConfigLoader, TomlConfigLoader};
use crate::error::Result;
use crate::monitor::ProbeEvent;
use crate::probe::create_probe;
use async_trait::async_trait;
use std::path::Path;

/// 子命令执行接口
#[async_trait]
pub trait Command: Send + Sync {
    async fn execute(&self, args: &Args) -> Result<()>;
}

/// version子命令
pub struct VersionCommand;

#[async_trait]
impl Command for VersionCommand {
    async fn execute(&self, args: &Args) -> Result<()> {
        if let Commands::Version { format } = &args.command {
            match format {
                OutputFormat::Json => {
                    let version_info = serde_json::json!({
                        "name": crate::APP_NAME,
                        "version": crate::VERSION,
                        "description": crate::APP_DESCRIPTION
                    });
                    println!("{}", serde_json::to_string_pretty(&version_info)?);
                }
                OutputFormat::Text => {
                    println!("{} v{}", crate::APP_NAME, crate::VERSION);
                    println!("{}", crate::APP_DESCRIPTION);
                }
            }
        }
        Ok(())
    }
}

/// validate子命令
pub struct ValidateCommand;

#[async_trait]
impl Command for ValidateCommand {
    async fn execute(&self, args: &Args) -> Result<()> {
        if let Commands::Validate {
            config_path,
            verbose,
        } = &args.command
        {
            let config_file = config_path
                .clone()
                .unwrap_or_else(|| args.get_config_path());

            self.validate_config_file(&config_file, *verbose).await
        } else {
            Ok(())
        }
    }
}

impl ValidateCommand {
    /// 加载并验证配置文件，结果打印到stdout
    async fn validate_config_file(&self, config_path: &Path, verbose: bool) -> Result<()> {
        println!("验证配置文件: {}", config_path.display());

        let loader = TomlConfigLoader::new(true);
        let config = loader.load_from_file(config_path).await?;

        if verbose {
            println!("配置有效，解析结果:");
            println!("[global]");
            println!("  log_level = {}", config.global.log_level);
            println!("  event_buffer_size = {}", config.global.event_buffer_size);

            println!("[probe]");
            println!("  host = {}", config.probe.host);
            println!("  mode = {}", config.probe.mode);
            match &config.probe.schedule {
                Some(expression) => println!("  schedule = {expression}"),
                None => println!("  interval_seconds = {}", config.probe.interval_seconds),
            }
            println!("  port = {}", config.probe.port);
            println!("  timeout_seconds = {}", config.probe.timeout_seconds);
        } else {
            println!("✓ 配置文件验证通过");
            println!(
                "✓ 探测目标: {} ({})",
                config.probe.host, config.probe.mode
            );
        }

        Ok(())
    }
}

/// check子命令
pub struct CheckCommand;

#[async_trait]
impl Command for CheckCommand {
    async fn execute(&self, args: &Args) -> Result<()> {
        if let Commands::Check {
            host,
            mode,
            format,
            timeout,
        } = &args.command
        {
            self.perform_check(args, host.as_deref(), mode.as_deref(), format, *timeout)
                .await
        } else {
            Ok(())
        }
    }
}

impl CheckCommand {
    /// 执行一次性可达性探测
    async fn perform_check(
        &self,
        args: &Args,
        host: Option<&str>,
        mode: Option<&str>,
        format: &OutputFormat,
        timeout: u64,
    ) -> Result<()> {
        // 配置文件存在则加载，否则使用默认配置
        let config_path = args.get_config_path();
        let config = if config_path.exists() {
            let loader = TomlConfigLoader::new(true);
            loader.load_from_file(&config_path).await?
        } else {
            Config::default()
        };

        // 应用命令行参数覆盖
        let mut probe_config = config.probe.clone();
        if let Some(host) = host {
            probe_config.host = host.to_string();
        }
        if let Some(mode) = mode {
            probe_config.mode = mode.to_string();
        }
        probe_config.timeout_seconds = timeout;

        // 创建探测器并执行一次探测
        let mut probe = create_probe(&probe_config)?;
        let success = probe.attempt(&probe_config.host).await;

        let mut event = ProbeEvent::new(probe_config.host.clone(), probe.kind(), success);
        if let Some(duration) = probe.last_duration() {
            event = event.with_duration(duration);
        }

        match format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&event)?);
            }
            OutputFormat::Text => {
                let status_icon = if event.success { "✓" } else { "✗" };
                let status_text = if event.success { "可达" } else { "不可达" };
                match event.duration() {
                    Some(duration) => println!(
                        "{} {} ({}) - {} - {}ms",
                        status_icon,
                        event.host,
                        event.mode,
                        status_text,
                        duration.as_millis()
                    ),
                    None => println!(
                        "{} {} ({}) - {}",
                        status_icon, event.host, event.mode, status_text
                    ),
                }
            }
        }

        // 不可达时以非零退出码结束，便于脚本判断
        if !success {
            std::process::exit(1);
        }

        Ok(())
    }
}
