//! 日志系统
//!
//! 基于tracing构建结构化日志，并桥接log宏输出。
//! 控制台日志一律走stderr，stdout保留给探测事件流。

use log::LevelFilter;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};
use tracing_subscriber::filter::Directive;
use tracing_subscriber::{fmt, prelude::*, registry, EnvFilter};

/// 进程内日志初始化状态
#[derive(Debug, Default)]
struct InitState {
    /// 是否已执行过初始化
    done: bool,
    /// 首次初始化的结果，失败时保留错误信息
    outcome: Option<String>,
    /// 生效的日志配置
    config: Option<LogConfig>,
}

static INIT_STATE: OnceLock<Mutex<InitState>> = OnceLock::new();

/// 日志配置
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// 全局日志级别
    pub level: LevelFilter,
    /// 日志文件路径，仅在关闭控制台输出时生效
    pub file_path: Option<PathBuf>,
    /// 是否输出到控制台
    pub console: bool,
    /// 控制台输出是否使用JSON格式
    pub json_format: bool,
    /// 按模块覆盖的日志级别
    pub module_levels: HashMap<String, LevelFilter>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LevelFilter::Info,
            file_path: None,
            console: true,
            json_format: false,
            module_levels: HashMap::new(),
        }
    }
}

/// 日志系统句柄
///
/// 全局subscriber在整个进程内只安装一次，后续调用复用
/// 首次初始化的结果。
pub struct LoggingSystem {
    config: LogConfig,
}

impl LoggingSystem {
    /// 本句柄对应的日志配置
    pub fn config(&self) -> &LogConfig {
        &self.config
    }

    /// 初始化日志系统
    ///
    /// # 参数
    /// * `config` - 日志配置
    ///
    /// # 返回
    /// * `anyhow::Result<Self>` - 初始化结果
    pub fn setup_logging(config: LogConfig) -> anyhow::Result<Self> {
        Self::setup_logging_with_options(config, false)
    }

    /// 初始化日志系统，可选择强制重新执行
    ///
    /// `force_reinit` 仅在测试中使用，生产路径始终传false。
    pub fn setup_logging_with_options(
        config: LogConfig,
        force_reinit: bool,
    ) -> anyhow::Result<Self> {
        let state_mutex = INIT_STATE.get_or_init(|| Mutex::new(InitState::default()));
        let mut state = state_mutex
            .lock()
            .map_err(|e| anyhow::anyhow!("日志状态锁不可用: {}", e))?;

        if state.done && !force_reinit {
            return match &state.outcome {
                None => Ok(Self { config }),
                Some(e) => Err(anyhow::anyhow!("日志系统初始化曾经失败: {}", e)),
            };
        }

        let result = Self::initialize(&config);
        state.done = true;
        state.outcome = result.as_ref().err().map(|e| e.to_string());
        state.config = Some(config.clone());
        drop(state);

        result?;
        Ok(Self { config })
    }

    /// 安装log桥接与tracing subscriber
    fn initialize(config: &LogConfig) -> anyhow::Result<()> {
        Self::bridge_log_crate()?;

        let filter = Self::build_env_filter(config);
        let timer = fmt::time::ChronoUtc::rfc_3339();

        let result = if let (false, Some(path)) = (config.console, config.file_path.as_ref()) {
            let file = std::fs::File::create(path)
                .map_err(|e| anyhow::anyhow!("创建日志文件失败 {}: {}", path.display(), e))?;
            let layer = fmt::layer()
                .with_timer(timer)
                .with_writer(file)
                .with_ansi(false)
                .with_file(true)
                .with_line_number(true);
            registry().with(filter).with(layer).try_init()
        } else if config.json_format {
            let layer = fmt::layer()
                .json()
                .with_timer(timer)
                .with_writer(std::io::stderr)
                .with_file(true)
                .with_line_number(true);
            registry().with(filter).with(layer).try_init()
        } else {
            let layer = fmt::layer()
                .with_timer(timer)
                .with_writer(std::io::stderr)
                .with_ansi(true)
                .with_file(true)
                .with_line_number(true);
            registry().with(filter).with(layer).try_init()
        };

        match result {
            Ok(()) => {
                tracing::info!("日志系统就绪: level={}", Self::level_token(config.level));
                Ok(())
            }
            Err(e) => {
                let msg = e.to_string();
                // 同一进程内重复安装subscriber是测试中的正常路径
                if msg.contains("already been set") || msg.contains("already initialized") {
                    tracing::debug!("全局subscriber已存在，跳过安装");
                    Ok(())
                } else {
                    Err(anyhow::anyhow!("安装tracing subscriber失败: {}", msg))
                }
            }
        }
    }

    /// 把log宏输出转发到tracing
    fn bridge_log_crate() -> anyhow::Result<()> {
        use tracing_log::LogTracer;

        static BRIDGE: OnceLock<Result<(), String>> = OnceLock::new();
        let outcome = BRIDGE.get_or_init(|| LogTracer::init().map_err(|e| e.to_string()));

        match outcome {
            Ok(()) => Ok(()),
            Err(e) => Err(anyhow::anyhow!("log桥接初始化失败: {}", e)),
        }
    }

    /// 组合全局级别、模块覆盖与RUST_LOG环境变量
    fn build_env_filter(config: &LogConfig) -> EnvFilter {
        let mut filter =
            EnvFilter::from_default_env().add_directive(Self::directive_for(config.level));

        for (module, level) in &config.module_levels {
            match format!("{}={}", module, Self::level_token(*level)).parse() {
                Ok(directive) => filter = filter.add_directive(directive),
                Err(e) => tracing::warn!("忽略无效的模块日志指令 {}: {}", module, e),
            }
        }

        filter
    }

    fn directive_for(level: LevelFilter) -> Directive {
        use tracing_subscriber::filter::LevelFilter as TracingLevelFilter;

        let filter = match level {
            LevelFilter::Off => TracingLevelFilter::OFF,
            LevelFilter::Error => TracingLevelFilter::ERROR,
            LevelFilter::Warn => TracingLevelFilter::WARN,
            LevelFilter::Info => TracingLevelFilter::INFO,
            LevelFilter::Debug => TracingLevelFilter::DEBUG,
            LevelFilter::Trace => TracingLevelFilter::TRACE,
        };
        filter.into()
    }

    fn level_token(level: LevelFilter) -> &'static str {
        match level {
            LevelFilter::Off => "off",
            LevelFilter::Error => "error",
            LevelFilter::Warn => "warn",
            LevelFilter::Info => "info",
            LevelFilter::Debug => "debug",
            LevelFilter::Trace => "trace",
        }
    }

    /// 日志系统是否已完成初始化
    pub fn is_initialized() -> bool {
        INIT_STATE
            .get()
            .and_then(|m| m.lock().ok().map(|state| state.done))
            .unwrap_or(false)
    }

    /// 当前生效的日志配置
    pub fn current_config() -> Option<LogConfig> {
        INIT_STATE
            .get()
            .and_then(|m| m.lock().ok().and_then(|state| state.config.clone()))
    }

    /// 清除初始化记录，仅供测试复位状态
    #[cfg(test)]
    pub fn reset_for_testing() {
        if let Some(state_mutex) = INIT_STATE.get() {
            if let Ok(mut state) = state_mutex.lock() {
                *state = InitState::default();
            }
        }
    }
}

/// 默认日志文件路径
pub fn get_default_log_path() -> PathBuf {
    PathBuf::from("/var/log/ping-vitals/ping-vitals.log")
}
