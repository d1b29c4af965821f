//! 特效实例
//!
//! 一个实例独占三个宿主资源：尾迹发射器、火花发射器和一个包装资源。
//! 释放通过消耗 `self` 完成，因此同一个实例不可能被释放两次。

use crate::config::BaselineTuning;
use crate::host::{FxResource, ParticleEmitter, ScalingMode};
use glam::Vec3;

/// 一次激活tick的驱动参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectDrive {
    /// 外推后的发射器位置
    pub position: Vec3,
    /// 有效速度（信号方向 * 信号空速）
    pub effective_velocity: Vec3,
    pub max_particles: u32,
    pub emission_rate: u32,
}

impl EffectDrive {
    /// 单步外推：`position + velocity * dt`，避免粒子落后一帧
    pub fn dead_reckon(center_of_mass: Vec3, body_velocity: Vec3, fixed_dt: f32) -> Vec3 {
        center_of_mass + body_velocity * fixed_dt
    }

    /// 发射器前向轴：有效速度归一化后取反
    ///
    /// 有效速度为零时返回 `None`，保持当前朝向。
    pub fn forward(&self) -> Option<Vec3> {
        self.effective_velocity.try_normalize().map(|dir| -dir)
    }
}

/// 绑定到单个载具的再入特效
#[derive(Debug)]
pub struct EffectInstance<E, W> {
    trail: E,
    sparks: E,
    wrapper: W,
}

impl<E: ParticleEmitter, W: FxResource> EffectInstance<E, W> {
    pub(crate) fn new(trail: E, sparks: E, wrapper: W) -> Self {
        Self {
            trail,
            sparks,
            wrapper,
        }
    }

    pub fn trail(&self) -> &E {
        &self.trail
    }

    pub fn sparks(&self) -> &E {
        &self.sparks
    }

    pub fn wrapper(&self) -> &W {
        &self.wrapper
    }

    /// 三个资源是否都仍然有效
    ///
    /// 任意一个被外部销毁时实例即视为失效，不做修复。
    pub fn is_intact(&self) -> bool {
        self.trail.is_alive() && self.sparks.is_alive() && self.wrapper.is_alive()
    }

    /// 关闭两个发射器的发射，其余参数保持不变
    pub fn suppress(&mut self) {
        self.trail.set_emission_enabled(false);
        self.sparks.set_emission_enabled(false);
    }

    /// 按本tick的驱动参数更新两个发射器
    pub fn drive(&mut self, drive: &EffectDrive, tuning: &BaselineTuning) {
        self.trail
            .set_scaling(ScalingMode::Local, Vec3::splat(tuning.trail_local_scale));
        self.trail.set_position(drive.position);
        self.trail.set_emission_enabled(true);
        self.sparks.set_position(drive.position);
        self.sparks.set_emission_enabled(true);

        // 火花的起始速度决定发射锥角，不跟随有效速度
        self.trail.set_start_speed(drive.effective_velocity.length());

        if let Some(forward) = drive.forward() {
            self.trail.set_forward(forward);
            self.sparks.set_forward(forward);
        }

        for emitter in [&mut self.trail, &mut self.sparks] {
            emitter.set_max_particles(drive.max_particles);
            emitter.set_emission_rate(drive.emission_rate);
        }
    }

    /// 释放全部资源
    ///
    /// 已被外部销毁的资源不会再次释放。
    pub fn dispose(mut self) {
        release(&mut self.wrapper);
        release(&mut self.trail);
        release(&mut self.sparks);
    }
}

/// 资源仍有效时释放
pub(crate) fn release<R: FxResource>(resource: &mut R) {
    if resource.is_alive() {
        resource.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{EffectAssetStore, HeadlessAssetStore, HeadlessEmitter, HeadlessWrapper, InstanceProbe};

    fn build() -> (EffectInstance<HeadlessEmitter, HeadlessWrapper>, InstanceProbe) {
        let mut store = HeadlessAssetStore::with_reentry_trail("fx");
        let template = store.load("fx").unwrap();
        let mut hierarchy = store.instantiate(&template);
        let wrapper = hierarchy.wrappers.remove(0);
        let sparks = hierarchy.emitters.remove(1).emitter;
        let trail = hierarchy.emitters.remove(0).emitter;
        let probe = store.spawned()[0].clone();
        (EffectInstance::new(trail, sparks, wrapper), probe)
    }

    #[test]
    fn test_dispose_releases_each_resource_once() {
        let (instance, probe) = build();
        assert!(instance.is_intact());

        instance.dispose();

        assert_eq!(probe.emitter("trail").unwrap().snapshot().destroy_calls, 1);
        assert_eq!(probe.emitter("sparks").unwrap().snapshot().destroy_calls, 1);
        assert_eq!(probe.wrappers[0].destroy_calls(), 1);
        assert!(probe.fully_released());
    }

    #[test]
    fn test_dispose_skips_externally_destroyed() {
        let (instance, probe) = build();
        probe.emitter("sparks").unwrap().invalidate();
        assert!(!instance.is_intact());

        instance.dispose();

        assert_eq!(probe.emitter("sparks").unwrap().snapshot().destroy_calls, 0);
        assert_eq!(probe.emitter("trail").unwrap().snapshot().destroy_calls, 1);
        assert_eq!(probe.wrappers[0].destroy_calls(), 1);
    }

    #[test]
    fn test_dispose_skips_destroyed_wrapper() {
        let (instance, probe) = build();
        probe.wrappers[0].invalidate();
        assert!(!instance.wrapper().is_alive());
        assert!(instance.trail().is_alive());
        assert!(instance.sparks().is_alive());
        assert!(!instance.is_intact());

        instance.dispose();

        assert_eq!(probe.wrappers[0].destroy_calls(), 0);
        assert_eq!(probe.emitter("trail").unwrap().snapshot().destroy_calls, 1);
        assert_eq!(probe.emitter("sparks").unwrap().snapshot().destroy_calls, 1);
    }

    #[test]
    fn test_drive_sets_both_emitters() {
        let (mut instance, probe) = build();
        let drive = EffectDrive {
            position: Vec3::new(1.0, 2.0, 3.0),
            effective_velocity: Vec3::new(0.0, 0.0, -10.0),
            max_particles: 2400,
            emission_rate: 320,
        };
        instance.drive(&drive, &BaselineTuning::default());

        let trail = probe.emitter("trail").unwrap().snapshot();
        let sparks = probe.emitter("sparks").unwrap().snapshot();
        for state in [&trail, &sparks] {
            assert!(state.emission_enabled);
            assert_eq!(state.position, Vec3::new(1.0, 2.0, 3.0));
            assert_eq!(state.forward, Vec3::Z);
            assert_eq!(state.max_particles, 2400);
            assert_eq!(state.emission_rate, 320);
        }
        assert_eq!(trail.start_speed, 10.0);
        assert_eq!(trail.scaling_mode, ScalingMode::Local);
        assert_eq!(trail.local_scale, Vec3::splat(0.15));
        // 火花起始速度不受驱动
        assert_eq!(sparks.start_speed, 1.0);
    }

    #[test]
    fn test_zero_velocity_keeps_orientation() {
        let drive = EffectDrive {
            position: Vec3::ZERO,
            effective_velocity: Vec3::ZERO,
            max_particles: 1,
            emission_rate: 1,
        };
        assert_eq!(drive.forward(), None);
    }

    #[test]
    fn test_dead_reckon() {
        let pos = EffectDrive::dead_reckon(Vec3::new(0.0, 100.0, 0.0), Vec3::new(0.0, -50.0, 0.0), 0.02);
        assert_eq!(pos, Vec3::new(0.0, 99.0, 0.0));
    }

    #[test]
    fn test_suppress_leaves_transform() {
        let (mut instance, probe) = build();
        instance.suppress();
        let trail = probe.emitter("trail").unwrap().snapshot();
        assert!(!trail.emission_enabled);
        assert_eq!(trail.transform_updates, 0);
    }
}
