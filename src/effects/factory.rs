//! 特效工厂
//!
//! 从资源库实例化再入特效模板，按名称定位尾迹和火花发射器，并写入固定的基础调参。

use super::instance::{release, EffectInstance};
use crate::config::{BaselineTuning, ReentryConfig};
use crate::core::{ReentryError, ReentryResult, LOG_TARGET};
use crate::host::{EffectAssetStore, EffectHierarchy, ParticleEmitter};

/// 特效工厂
///
/// 缓存已加载的模板；加载失败不会被缓存，下次创建时重试。
pub struct EffectFactory<A: EffectAssetStore> {
    store: A,
    asset_path: String,
    trail_emitter: String,
    spark_emitter: String,
    tuning: BaselineTuning,
    template: Option<A::Template>,
    load_failures: u32,
}

impl<A: EffectAssetStore> EffectFactory<A> {
    pub fn new(store: A, config: &ReentryConfig) -> Self {
        Self {
            store,
            asset_path: config.asset_path.clone(),
            trail_emitter: config.trail_emitter.clone(),
            spark_emitter: config.spark_emitter.clone(),
            tuning: config.tuning.clone(),
            template: None,
            load_failures: 0,
        }
    }

    pub fn store(&self) -> &A {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut A {
        &mut self.store
    }

    pub fn asset_path(&self) -> &str {
        &self.asset_path
    }

    /// 模板是否已加载
    pub fn has_template(&self) -> bool {
        self.template.is_some()
    }

    /// 加载（或复用缓存的）模板并创建实例
    pub fn spawn(&mut self) -> ReentryResult<EffectInstance<A::Emitter, A::Wrapper>> {
        let template = match self.template.take() {
            Some(template) => template,
            None => self.load_template()?,
        };
        let result = self.create_effect(&template);
        self.template = Some(template);
        result
    }

    fn load_template(&mut self) -> ReentryResult<A::Template> {
        match self.store.load(&self.asset_path) {
            Some(template) => {
                if self.load_failures > 0 {
                    tracing::info!(
                        target: LOG_TARGET,
                        path = %self.asset_path,
                        failures = self.load_failures,
                        "Effect asset loaded after retry"
                    );
                }
                Ok(template)
            }
            None => {
                self.load_failures += 1;
                if self.load_failures == 1 {
                    tracing::warn!(target: LOG_TARGET, path = %self.asset_path, "Effect asset unavailable");
                } else {
                    tracing::debug!(
                        target: LOG_TARGET,
                        path = %self.asset_path,
                        failures = self.load_failures,
                        "Effect asset still unavailable"
                    );
                }
                Err(ReentryError::AssetUnavailable {
                    path: self.asset_path.clone(),
                })
            }
        }
    }

    /// 由模板创建新的特效实例
    ///
    /// 实例化得到的层级必须包含配置中命名的尾迹和火花发射器以及至少一个包装资源，
    /// 否则返回 `MalformedAsset`，并释放已经实例化出的全部资源。
    /// 层级中多余的发射器和包装资源会被立即释放。
    pub fn create_effect(
        &mut self,
        template: &A::Template,
    ) -> ReentryResult<EffectInstance<A::Emitter, A::Wrapper>> {
        let EffectHierarchy { emitters, wrappers } = self.store.instantiate(template);

        let mut trail = None;
        let mut sparks = None;
        let mut surplus = Vec::new();
        for node in emitters {
            if trail.is_none() && node.name == self.trail_emitter {
                trail = Some(node.emitter);
            } else if sparks.is_none() && node.name == self.spark_emitter {
                sparks = Some(node.emitter);
            } else {
                surplus.push(node.emitter);
            }
        }

        let mut wrappers = wrappers.into_iter();
        let wrapper = wrappers.next();
        for mut extra in wrappers {
            release(&mut extra);
        }
        for mut extra in surplus {
            release(&mut extra);
        }

        match (trail, sparks, wrapper) {
            (Some(mut trail), Some(mut sparks), Some(wrapper)) => {
                trail.set_start_size(self.tuning.trail_start_size);
                trail.set_start_speed(self.tuning.trail_start_speed);
                trail.set_playback_speed(self.tuning.playback_speed);
                sparks.set_playback_speed(self.tuning.playback_speed);
                Ok(EffectInstance::new(trail, sparks, wrapper))
            }
            (trail, sparks, wrapper) => {
                let mut missing = Vec::new();
                if trail.is_none() {
                    missing.push(format!("emitter '{}'", self.trail_emitter));
                }
                if sparks.is_none() {
                    missing.push(format!("emitter '{}'", self.spark_emitter));
                }
                if wrapper.is_none() {
                    missing.push("wrapper resource".to_string());
                }

                for mut emitter in trail.into_iter().chain(sparks) {
                    release(&mut emitter);
                }
                if let Some(mut wrapper) = wrapper {
                    release(&mut wrapper);
                }

                Err(ReentryError::MalformedAsset {
                    path: self.asset_path.clone(),
                    reason: format!("missing {}", missing.join(", ")),
                })
            }
        }
    }
}
