//! 气动信号源缓存
//!
//! 按名称懒解析信号源：解析成功后缓存且不再失效，解析失败不缓存，每次访问都会重试。

use crate::core::LOG_TARGET;
use crate::host::SignalSource;

pub struct CachedSignal<S: SignalSource> {
    source: S,
    name: String,
    cached: Option<S::Handle>,
    attempts: u64,
}

impl<S: SignalSource> CachedSignal<S> {
    pub fn new(source: S, name: impl Into<String>) -> Self {
        Self {
            source,
            name: name.into(),
            cached: None,
            attempts: 0,
        }
    }

    /// 获取信号句柄，必要时重新解析
    pub fn resolve(&mut self) -> Option<&S::Handle> {
        if self.cached.is_none() {
            self.attempts += 1;
            self.cached = self.source.resolve(&self.name);
            match &self.cached {
                Some(_) => tracing::info!(
                    target: LOG_TARGET,
                    name = %self.name,
                    attempts = self.attempts,
                    "Aerodynamics signal source resolved"
                ),
                None => tracing::trace!(target: LOG_TARGET, name = %self.name, "Aerodynamics signal source unresolved"),
            }
        }
        self.cached.as_ref()
    }

    pub fn is_resolved(&self) -> bool {
        self.cached.is_some()
    }

    /// 已进行的解析次数
    pub fn attempts(&self) -> u64 {
        self.attempts
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }
}
