//! 日志初始化
//!
//! 基于 tracing 的日志输出。`RUST_LOG` 环境变量优先，未设置时回退到配置中的级别。

use crate::config::LoggingConfig;
use tracing_subscriber::EnvFilter;

/// 日志目标名，所有生命周期日志都使用该目标
pub const LOG_TARGET: &str = "reentry_fx";

/// 初始化日志系统
///
/// 重复调用是安全的：已经安装全局订阅者时直接返回。
pub fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.as_directive()));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(config.ansi)
        .try_init();
    tracing::info!(target: LOG_TARGET, level = config.level.as_directive(), "Logging initialized");
}
