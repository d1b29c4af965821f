//! 特效生命周期管理器
//!
//! 每个载具至多一个特效实例，按载具标识索引。宿主每个固定tick调用一次 [`EffectLifecycleManager::tick`]，
//! 在载具销毁通知时调用 [`EffectLifecycleManager::on_vehicle_destroyed`]。
//!
//! ## 条目状态
//!
//! ```text
//!   (无条目) ──首次见到已加载载具──▶ Live ──卸载──▶ Disposed
//!      ▲                              │                │
//!      └─────────── 销毁通知 ─────────┴────────────────┘
//! ```
//!
//! 卸载只释放资源，条目以 `Disposed` 留在表中；之后即使载具重新加载，也不会再次分配实例。
//! 只有销毁通知会移除条目。

use super::factory::EffectFactory;
use super::instance::{EffectDrive, EffectInstance};
use super::signal::CachedSignal;
use super::strength::EffectStrength;
use crate::config::ReentryConfig;
use crate::core::{ReentryResult, LOG_TARGET};
use crate::host::{
    AeroReading, AeroSignal, EffectAssetStore, FxResource, ParticleEmitter, SignalSource,
    VehicleDirectory, VehicleId, VehicleRef,
};
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::mem;

/// 跟踪表中的条目
#[derive(Debug)]
pub enum TrackedEffect<E, W> {
    /// 持有有效实例
    Live(EffectInstance<E, W>),
    /// 资源已释放，条目保留
    Disposed,
}

impl<E, W> TrackedEffect<E, W> {
    pub fn is_live(&self) -> bool {
        matches!(self, Self::Live(_))
    }

    pub fn instance(&self) -> Option<&EffectInstance<E, W>> {
        match self {
            Self::Live(instance) => Some(instance),
            Self::Disposed => None,
        }
    }
}

impl<E: ParticleEmitter, W: FxResource> TrackedEffect<E, W> {
    /// 释放实例并转为 `Disposed`；已释放时为空操作
    ///
    /// 返回本次是否真正释放了资源。
    pub fn dispose(&mut self) -> bool {
        match mem::replace(self, Self::Disposed) {
            Self::Live(instance) => {
                instance.dispose();
                true
            }
            Self::Disposed => false,
        }
    }
}

/// 单个tick的统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickStats {
    /// 本tick遍历的载具数
    pub vehicles: u32,
    /// 新建实例数
    pub created: u32,
    /// 因卸载释放的实例数
    pub disposed: u32,
    /// 被驱动（强度 > 0）的实例数
    pub driven: u32,
    /// 被抑制的实例数
    pub suppressed: u32,
    /// 条目已释放或实例失效而跳过的载具数
    pub skipped: u32,
}

/// 特效生命周期管理器
pub struct EffectLifecycleManager<S: SignalSource, A: EffectAssetStore> {
    config: ReentryConfig,
    factory: EffectFactory<A>,
    signal: CachedSignal<S>,
    tracked: HashMap<VehicleId, TrackedEffect<A::Emitter, A::Wrapper>>,
    last_tick: TickStats,
}

impl<S: SignalSource, A: EffectAssetStore> EffectLifecycleManager<S, A> {
    /// 创建管理器
    ///
    /// 配置在这里校验一次，之后不再重新读取。
    pub fn new(config: ReentryConfig, signal_source: S, asset_store: A) -> ReentryResult<Self> {
        config.validate()?;
        let factory = EffectFactory::new(asset_store, &config);
        let signal = CachedSignal::new(signal_source, config.signal_source_name.clone());
        Ok(Self {
            config,
            factory,
            signal,
            tracked: HashMap::new(),
            last_tick: TickStats::default(),
        })
    }

    /// 固定tick更新
    ///
    /// 总是处理完所有载具才返回；任何查找失败都只会让本tick的特效被抑制。
    pub fn tick<D: VehicleDirectory + ?Sized>(&mut self, directory: &D, fixed_dt: f32) -> TickStats {
        let mut stats = TickStats::default();
        let reading = self.signal.resolve().map(|handle| handle.read());
        let active = reading.as_ref().is_some_and(|reading| {
            EffectStrength::from_reading(reading, self.config.effect_threshold).is_active()
        });

        match directory.list_vehicles() {
            Some(vehicles) => {
                // 逆序遍历；顺序本身没有语义
                for vehicle in vehicles.iter().rev() {
                    stats.vehicles += 1;
                    self.reconcile(vehicle, reading.as_ref(), fixed_dt, &mut stats);
                }
                if !active {
                    // 已从列表消失但尚未收到销毁通知的载具同样需要关闭发射
                    let listed: HashSet<VehicleId> = vehicles.iter().map(|v| v.id).collect();
                    stats.suppressed += self.suppress_tracked(|id| !listed.contains(id));
                }
            }
            None => {
                tracing::trace!(target: LOG_TARGET, "Vehicle list unavailable, suppressing all effects");
                stats.suppressed += self.suppress_tracked(|_| true);
            }
        }

        tracing::trace!(
            target: LOG_TARGET,
            vehicles = stats.vehicles,
            created = stats.created,
            disposed = stats.disposed,
            driven = stats.driven,
            suppressed = stats.suppressed,
            skipped = stats.skipped,
            "Reentry tick complete"
        );
        self.last_tick = stats;
        stats
    }

    /// 关闭满足条件的有效实例，返回被抑制的数量
    fn suppress_tracked<F: Fn(&VehicleId) -> bool>(&mut self, filter: F) -> u32 {
        let mut suppressed = 0;
        for (id, entry) in self.tracked.iter_mut() {
            if let TrackedEffect::Live(instance) = entry {
                if filter(id) && instance.is_intact() {
                    instance.suppress();
                    suppressed += 1;
                }
            }
        }
        suppressed
    }

    fn reconcile(
        &mut self,
        vehicle: &VehicleRef,
        reading: Option<&AeroReading>,
        fixed_dt: f32,
        stats: &mut TickStats,
    ) {
        let entry = match self.tracked.entry(vehicle.id) {
            Entry::Occupied(occupied) => occupied.into_mut(),
            Entry::Vacant(vacant) => {
                // 未加载的载具不跟踪
                if !vehicle.loaded {
                    return;
                }
                match self.factory.spawn() {
                    Ok(instance) => {
                        stats.created += 1;
                        tracing::debug!(target: LOG_TARGET, vehicle = %vehicle.id, "Reentry effect created");
                        vacant.insert(TrackedEffect::Live(instance))
                    }
                    Err(err) if err.is_transient() => {
                        // 资源暂不可用：不建条目，下个tick重试
                        return;
                    }
                    Err(err) => {
                        tracing::error!(target: LOG_TARGET, vehicle = %vehicle.id, %err, "Reentry effect creation aborted");
                        vacant.insert(TrackedEffect::Disposed);
                        return;
                    }
                }
            }
        };

        if !vehicle.loaded {
            if entry.dispose() {
                stats.disposed += 1;
                tracing::debug!(target: LOG_TARGET, vehicle = %vehicle.id, "Reentry effect disposed on unload");
            }
            return;
        }

        let instance = match entry {
            TrackedEffect::Live(instance) if instance.is_intact() => instance,
            _ => {
                stats.skipped += 1;
                return;
            }
        };

        let Some(reading) = reading else {
            instance.suppress();
            stats.suppressed += 1;
            return;
        };

        let strength = EffectStrength::from_reading(reading, self.config.effect_threshold);
        if strength.is_active() {
            let drive = EffectDrive {
                position: EffectDrive::dead_reckon(
                    vehicle.center_of_mass,
                    vehicle.body_velocity,
                    fixed_dt,
                ),
                effective_velocity: reading.effective_velocity(),
                max_particles: strength.scale_budget(self.config.max_particles),
                emission_rate: strength.scale_budget(self.config.max_emission_rate),
            };
            instance.drive(&drive, &self.config.tuning);
            stats.driven += 1;
        } else {
            instance.suppress();
            stats.suppressed += 1;
        }
    }

    /// 载具销毁通知
    ///
    /// 释放实例（已释放时为空操作）并无条件移除条目。返回该载具之前是否被跟踪。
    pub fn on_vehicle_destroyed(&mut self, id: VehicleId) -> bool {
        match self.tracked.remove(&id) {
            Some(mut entry) => {
                if entry.dispose() {
                    tracing::debug!(target: LOG_TARGET, vehicle = %id, "Reentry effect disposed on destroy");
                }
                true
            }
            None => false,
        }
    }

    /// 释放全部实例并清空跟踪表，用于宿主关闭场景
    pub fn dispose_all(&mut self) -> usize {
        let released = self
            .tracked
            .drain()
            .map(|(_, mut entry)| entry.dispose())
            .filter(|released| *released)
            .count();
        tracing::debug!(target: LOG_TARGET, released, "All reentry effects disposed");
        released
    }

    /// 跟踪中的载具数（含已释放的条目）
    pub fn tracked_count(&self) -> usize {
        self.tracked.len()
    }

    /// 持有有效实例的条目数
    pub fn live_count(&self) -> usize {
        self.tracked.values().filter(|entry| entry.is_live()).count()
    }

    pub fn entry(&self, id: VehicleId) -> Option<&TrackedEffect<A::Emitter, A::Wrapper>> {
        self.tracked.get(&id)
    }

    pub fn instance(&self, id: VehicleId) -> Option<&EffectInstance<A::Emitter, A::Wrapper>> {
        self.tracked.get(&id).and_then(TrackedEffect::instance)
    }

    pub fn last_tick_stats(&self) -> TickStats {
        self.last_tick
    }

    pub fn config(&self) -> &ReentryConfig {
        &self.config
    }

    pub fn is_signal_resolved(&self) -> bool {
        self.signal.is_resolved()
    }

    pub fn asset_store(&self) -> &A {
        self.factory.store()
    }

    pub fn asset_store_mut(&mut self) -> &mut A {
        self.factory.store_mut()
    }

    pub fn signal_source(&self) -> &S {
        self.signal.source()
    }

    pub fn signal_source_mut(&mut self) -> &mut S {
        self.signal.source_mut()
    }
}
