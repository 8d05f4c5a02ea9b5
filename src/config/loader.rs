//! TOML配置加载
//!
//! 负责读取配置文件、展开`${VAR}`形式的环境变量引用并完成解析后验证

use crate::config::types::{validate_config, Config};
use crate::error::{ConfigError, Result};
use async_trait::async_trait;
use regex::Regex;
use std::path::{Path, PathBuf};

/// 配置加载接口
///
/// 文件与字符串两条加载路径共用同一套替换、解析与验证流程。
#[async_trait]
pub trait ConfigLoader: Send + Sync {
    /// 从文件加载并验证配置
    async fn load_from_file<P: AsRef<Path> + Send>(&self, path: P) -> Result<Config>;

    /// 从字符串加载并验证配置
    async fn load_from_string(&self, content: &str) -> Result<Config>;

    /// 验证配置内容
    fn validate(&self, config: &Config) -> Result<()>;
}

/// 基于TOML格式的配置加载器
#[derive(Debug, Clone)]
pub struct TomlConfigLoader {
    /// 为true时展开配置中的`${VAR}`环境变量引用
    enable_env_substitution: bool,
}

impl TomlConfigLoader {
    /// 创建TOML配置加载器
    ///
    /// # 参数
    /// * `enable_env_substitution` - 是否展开环境变量引用
    pub fn new(enable_env_substitution: bool) -> Self {
        Self {
            enable_env_substitution,
        }
    }

    /// 展开内容中的环境变量引用
    ///
    /// 任何一个引用的变量未定义都会使整次加载失败，
    /// 错误信息中带上第一个缺失的变量名。
    fn substitute_env_vars(&self, content: &str) -> Result<String> {
        if !self.enable_env_substitution {
            return Ok(content.to_string());
        }

        let pattern = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}")
            .map_err(|e| ConfigError::ParseError(format!("环境变量模式编译失败: {}", e)))?;

        let mut missing: Option<String> = None;
        let expanded = pattern.replace_all(content, |caps: &regex::Captures<'_>| {
            let name = &caps[1];
            match std::env::var(name) {
                Ok(value) => value,
                Err(_) => {
                    missing.get_or_insert_with(|| name.to_string());
                    String::new()
                }
            }
        });

        match missing {
            Some(var) => Err(ConfigError::EnvVarError { var }.into()),
            None => Ok(expanded.into_owned()),
        }
    }
}

#[async_trait]
impl ConfigLoader for TomlConfigLoader {
    async fn load_from_file<P: AsRef<Path> + Send>(&self, path: P) -> Result<Config> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.display().to_string(),
            }
            .into());
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ConfigError::ParseError(format!("读取配置文件失败: {}", e)))?;

        let config = self.load_from_string(&content).await?;
        log::info!("配置文件加载成功: {}", path.display());

        Ok(config)
    }

    async fn load_from_string(&self, content: &str) -> Result<Config> {
        let expanded = self.substitute_env_vars(content)?;

        let config: Config = toml::from_str(&expanded)
            .map_err(|e| ConfigError::ParseError(format!("TOML解析失败: {}", e)))?;

        self.validate(&config)?;
        log::debug!("配置解析完成: {:?}", config);

        Ok(config)
    }

    fn validate(&self, config: &Config) -> Result<()> {
        validate_config(config).map_err(|e| ConfigError::ValidationError(e).into())
    }
}

/// 默认配置文件路径
///
/// Unix下优先取当前目录的config.toml，其次为用户配置目录
/// （如 `~/.config/ping-vitals/config.toml`）；Windows下取
/// `%APPDATA%\ping-vitals\config.toml`。
pub fn get_default_config_path() -> PathBuf {
    let local = Path::new("config.toml");
    if cfg!(unix) && local.exists() {
        return local.to_path_buf();
    }

    match dirs::config_dir() {
        Some(dir) => dir.join("ping-vitals").join("config.toml"),
        None => PathBuf::from("config.toml"),
    }
}
