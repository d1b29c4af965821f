//! 特效驱动配置
//!
//! 提供TOML/JSON配置文件和环境变量覆盖。配置在构造管理器时读取一次，运行期间不再重新加载。
use crate::core::LOG_TARGET;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use thiserror::Error;

pub mod tuning;

pub use tuning::BaselineTuning;

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 文件读取错误
    #[error("Config file error: {0}")]
    FileError(#[from] std::io::Error),
    /// 解析错误
    #[error("Config parse error: {0}")]
    ParseError(String),
    /// 验证错误
    #[error("Config validation error: {0}")]
    ValidationError(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// 再入特效主配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReentryConfig {
    /// 强度为1时每个发射器的最大粒子数
    pub max_particles: u32,

    /// 强度为1时每个发射器的发射速率（粒子/秒）
    pub max_emission_rate: u32,

    /// 激活阈值，取值 (0, 1]
    ///
    /// 接近0时最微弱的信号即可激活，接近1时需要接近最大的信号。
    pub effect_threshold: f32,

    /// 特效模板在资源库中的路径
    pub asset_path: String,

    /// 气动信号源在宿主对象图中的名称
    pub signal_source_name: String,

    /// 模板中尾迹发射器的名称
    pub trail_emitter: String,

    /// 模板中火花发射器的名称
    pub spark_emitter: String,

    /// 基础调参
    pub tuning: BaselineTuning,

    /// 日志配置
    pub logging: LoggingConfig,
}

impl Default for ReentryConfig {
    fn default() -> Self {
        Self {
            max_particles: 3000,
            max_emission_rate: 400,
            effect_threshold: 0.5,
            asset_path: "Effects/fx_reentryTrail".to_string(),
            signal_source_name: "FXLogic".to_string(),
            trail_emitter: "trail".to_string(),
            spark_emitter: "sparks".to_string(),
            tuning: BaselineTuning::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl ReentryConfig {
    /// 创建默认配置
    pub fn new() -> Self {
        Self::default()
    }

    /// 从TOML文件加载配置
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(ConfigError::FileError)?;
        Self::from_toml_str(&content)
    }

    /// 从TOML字符串解析配置
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// 从JSON文件加载配置
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(ConfigError::FileError)?;
        Self::from_json_str(&content)
    }

    /// 从JSON字符串解析配置
    pub fn from_json_str(content: &str) -> ConfigResult<Self> {
        serde_json::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// 保存为TOML文件
    pub fn save_toml<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        fs::write(path, content).map_err(ConfigError::FileError)
    }

    /// 从环境变量覆盖配置
    ///
    /// 无法解析的值会被忽略并保留原值。
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = env::var("REENTRY_MAX_PARTICLES") {
            if let Ok(count) = val.parse() {
                self.max_particles = count;
            }
        }
        if let Ok(val) = env::var("REENTRY_MAX_EMISSION_RATE") {
            if let Ok(rate) = val.parse() {
                self.max_emission_rate = rate;
            }
        }
        if let Ok(val) = env::var("REENTRY_EFFECT_THRESHOLD") {
            if let Ok(threshold) = val.parse() {
                self.effect_threshold = threshold;
            }
        }
        if let Ok(val) = env::var("REENTRY_ASSET_PATH") {
            if !val.is_empty() {
                self.asset_path = val;
            }
        }
    }

    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        if !(self.effect_threshold > 0.0 && self.effect_threshold <= 1.0) {
            return Err(ConfigError::ValidationError(format!(
                "effect_threshold must be in (0, 1], got {}",
                self.effect_threshold
            )));
        }
        if self.asset_path.is_empty() {
            return Err(ConfigError::ValidationError(
                "asset_path must not be empty".to_string(),
            ));
        }
        if self.signal_source_name.is_empty() {
            return Err(ConfigError::ValidationError(
                "signal_source_name must not be empty".to_string(),
            ));
        }
        if self.trail_emitter.is_empty() || self.spark_emitter.is_empty() {
            return Err(ConfigError::ValidationError(
                "emitter names must not be empty".to_string(),
            ));
        }
        if self.trail_emitter == self.spark_emitter {
            return Err(ConfigError::ValidationError(format!(
                "trail and spark emitters must differ, both are '{}'",
                self.trail_emitter
            )));
        }
        self.tuning.validate()
    }

    /// 从给定路径加载配置，失败时使用默认配置
    ///
    /// 根据扩展名选择JSON或TOML，最后应用环境变量覆盖。
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        let loaded = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_file(path),
            _ => Self::from_toml_file(path),
        };
        let mut config = match loaded {
            Ok(config) => {
                tracing::info!(target: LOG_TARGET, path = %path.display(), "Loaded config");
                config
            }
            Err(err) => {
                tracing::info!(target: LOG_TARGET, path = %path.display(), %err, "Using default configuration");
                Self::default()
            }
        };
        config.apply_env_overrides();
        config
    }
}

/// 日志配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 日志级别
    pub level: LogLevel,

    /// 是否输出ANSI颜色
    pub ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            ansi: true,
        }
    }
}

/// 日志级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// 跟踪
    Trace,
    /// 调试
    Debug,
    /// 信息
    Info,
    /// 警告
    Warn,
    /// 错误
    Error,
}

impl LogLevel {
    /// 对应的 `EnvFilter` 指令
    pub fn as_directive(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ReentryConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_particles, 3000);
        assert_eq!(config.max_emission_rate, 400);
        assert_eq!(config.effect_threshold, 0.5);
    }

    #[test]
    fn test_toml_serialization() {
        let config = ReentryConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: ReentryConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = ReentryConfig::from_toml_str(
            r#"
            effect_threshold = 0.25

            [logging]
            level = "debug"
            "#,
        )
        .unwrap();
        assert_eq!(config.effect_threshold, 0.25);
        assert_eq!(config.max_particles, 3000);
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(config.tuning, BaselineTuning::default());
    }

    #[test]
    fn test_json_parse() {
        let config = ReentryConfig::from_json_str(r#"{"max_particles": 1000}"#).unwrap();
        assert_eq!(config.max_particles, 1000);
        assert_eq!(config.spark_emitter, "sparks");
    }

    #[test]
    fn test_threshold_bounds() {
        for threshold in [0.0, -0.1, 1.5, f32::NAN] {
            let config = ReentryConfig {
                effect_threshold: threshold,
                ..Default::default()
            };
            assert!(config.validate().is_err(), "threshold {} accepted", threshold);
        }

        let config = ReentryConfig {
            effect_threshold: 1.0,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_same_emitter_names_rejected() {
        let config = ReentryConfig {
            spark_emitter: "trail".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reentry.toml");
        let config = ReentryConfig {
            max_emission_rate: 250,
            ..Default::default()
        };
        config.save_toml(&path).unwrap();

        let loaded = ReentryConfig::from_toml_file(&path).unwrap();
        assert_eq!(loaded.max_emission_rate, 250);
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = ReentryConfig::load_or_default(dir.path().join("missing.toml"));
        assert_eq!(config.asset_path, "Effects/fx_reentryTrail");
    }
}
