//! 统一错误处理模块
//!
//! 提供特效驱动范围内的错误类型定义
//!
//! ## 错误分类
//!
//! - **解析失败** (`AssetUnavailable`): 资源或信号源暂时不可用，本地恢复，不会上报宿主
//! - **资源格式错误** (`MalformedAsset`): 特效模板不满足结构约定，属于打包缺陷，必须给出明确诊断
//! - **配置错误** (`Config`): 构造阶段的配置加载与校验错误
//!
//! 实例被外部销毁（部分失效）不是错误，由管理器直接跳过。

use crate::config::ConfigError;
use thiserror::Error;

/// 特效驱动错误类型
#[derive(Error, Debug)]
pub enum ReentryError {
    #[error("Effect asset unavailable: {path}")]
    AssetUnavailable { path: String },

    #[error("Malformed effect asset: {path}, reason: {reason}")]
    MalformedAsset { path: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl ReentryError {
    /// 是否为可在下一个tick重试的瞬时错误
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::AssetUnavailable { .. })
    }
}

/// 特效驱动结果类型别名
pub type ReentryResult<T> = Result<T, ReentryError>;
