//! ECS 适配层
//!
//! 把 [`EffectLifecycleManager`] 嵌入 bevy_ecs 调度：
//! - **State (Resource)**: `ReentryFx`（持有管理器）、`FixedTime`
//! - **Component**: `Vehicle`、`VehicleKinematics`
//! - **Event**: `VehicleDestroyed`
//! - **System**: `reentry_vehicle_destroyed_system`、`reentry_fixed_tick_system`
//!
//! 宿主负责每帧调用 `Events::<VehicleDestroyed>::update`。

use crate::effects::EffectLifecycleManager;
use crate::host::{EffectAssetStore, SignalSource, VehicleId, VehicleRef};
use bevy_ecs::prelude::*;
use glam::Vec3;


// --- Components ---

/// 宿主载具
#[derive(Component, Clone, Copy, Debug)]
pub struct Vehicle {
    pub id: VehicleId,
    pub loaded: bool,
}

/// 载具运动学状态，缺失时按静止处理
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct VehicleKinematics {
    pub center_of_mass: Vec3,
    pub velocity: Vec3,
}

// --- Resources ---

/// 固定步长
#[derive(Resource, Clone, Copy, Debug)]
pub struct FixedTime {
    pub fixed_time_step: f32,
}

impl Default for FixedTime {
    fn default() -> Self {
        Self {
            fixed_time_step: 0.02,
        }
    }
}

/// 持有特效管理器的资源
pub struct ReentryFx<S: SignalSource, A: EffectAssetStore> {
    pub manager: EffectLifecycleManager<S, A>,
}

impl<S: SignalSource, A: EffectAssetStore> ReentryFx<S, A> {
    pub fn new(manager: EffectLifecycleManager<S, A>) -> Self {
        Self { manager }
    }
}

impl<S, A> Resource for ReentryFx<S, A>
where
    S: SignalSource + 'static,
    A: EffectAssetStore + 'static,
    Self: Send + Sync + 'static,
{
}

// --- Events ---

/// 载具销毁通知
#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub struct VehicleDestroyed(pub VehicleId);

// --- Systems ---

/// 转发销毁通知
pub fn reentry_vehicle_destroyed_system<S, A>(
    mut fx: ResMut<ReentryFx<S, A>>,
    mut events: EventReader<VehicleDestroyed>,
) where
    S: SignalSource + 'static,
    A: EffectAssetStore + 'static,
    ReentryFx<S, A>: Resource,
{
    for VehicleDestroyed(id) in events.read() {
        fx.manager.on_vehicle_destroyed(*id);
    }
}

/// 固定tick：收集载具快照并驱动管理器
pub fn reentry_fixed_tick_system<S, A>(
    mut fx: ResMut<ReentryFx<S, A>>,
    time: Option<Res<FixedTime>>,
    vehicles: Query<(&Vehicle, Option<&VehicleKinematics>)>,
) where
    S: SignalSource + 'static,
    A: EffectAssetStore + 'static,
    ReentryFx<S, A>: Resource,
{
    let fixed_dt = time
        .map(|t| t.fixed_time_step)
        .unwrap_or_else(|| FixedTime::default().fixed_time_step);
    let snapshot: Vec<VehicleRef> = vehicles
        .iter()
        .map(|(vehicle, kinematics)| {
            let kinematics = kinematics.copied().unwrap_or_default();
            VehicleRef {
                id: vehicle.id,
                loaded: vehicle.loaded,
                center_of_mass: kinematics.center_of_mass,
                body_velocity: kinematics.velocity,
            }
        })
        .collect();
    fx.manager.tick(snapshot.as_slice(), fixed_dt);
}

/// 插入管理器以及它依赖的资源
pub fn insert_reentry_resources<S, A>(world: &mut World, manager: EffectLifecycleManager<S, A>)
where
    S: SignalSource + 'static,
    A: EffectAssetStore + 'static,
    ReentryFx<S, A>: Resource,
{
    world.insert_resource(ReentryFx::new(manager));
    world.init_resource::<Events<VehicleDestroyed>>();
    world.init_resource::<FixedTime>();
}

/// 注册系统：先处理销毁通知，再执行固定tick
pub fn add_reentry_systems<S, A>(schedule: &mut Schedule)
where
    S: SignalSource + 'static,
    A: EffectAssetStore + 'static,
    ReentryFx<S, A>: Resource,
{
    schedule.add_systems(
        (
            reentry_vehicle_destroyed_system::<S, A>,
            reentry_fixed_tick_system::<S, A>,
        )
            .chain(),
    );
}
