//! 宿主能力接口
//!
//! 管理器不直接调用任何宿主API，所有对载具、气动信号和特效资源的访问
//! 都经过本模块定义的能力 trait，由嵌入它的宿主适配层实现。
//!
//! ```text
//! ┌──────────────────────┐   list_vehicles()    ┌────────────────────┐
//! │ EffectLifecycle      │ ───────────────────▶ │ VehicleDirectory   │
//! │ Manager              │   resolve(name)      ├────────────────────┤
//! │                      │ ───────────────────▶ │ SignalSource       │
//! │                      │   load/instantiate   ├────────────────────┤
//! │                      │ ───────────────────▶ │ EffectAssetStore   │
//! └──────────────────────┘                      └────────────────────┘
//! ```

pub mod headless;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

pub use headless::{
    EmitterProbe, EmitterState, HeadlessAeroSignal, HeadlessAssetStore, HeadlessEmitter,
    HeadlessSignalSource, HeadlessTemplate, HeadlessVehicleDirectory, HeadlessWrapper,
    InstanceProbe, WrapperProbe,
};

// ============================================================================
// 载具
// ============================================================================

/// 载具标识
///
/// 由宿主分配，全局唯一且在载具生命周期内保持不变。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VehicleId(pub Uuid);

impl VehicleId {
    /// 生成新的随机标识
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// 宿主载具快照
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VehicleRef {
    /// 载具标识
    pub id: VehicleId,
    /// 载具当前是否处于加载状态
    pub loaded: bool,
    /// 质心位置
    pub center_of_mass: Vec3,
    /// 刚体速度
    pub body_velocity: Vec3,
}

/// 宿主载具目录
pub trait VehicleDirectory {
    /// 返回宿主当前完整的、有序的载具列表
    ///
    /// 宿主暂时无法提供列表时返回 `None`，这是正常状态而不是错误。
    fn list_vehicles(&self) -> Option<Vec<VehicleRef>>;
}

impl VehicleDirectory for [VehicleRef] {
    fn list_vehicles(&self) -> Option<Vec<VehicleRef>> {
        Some(self.to_vec())
    }
}

impl VehicleDirectory for Vec<VehicleRef> {
    fn list_vehicles(&self) -> Option<Vec<VehicleRef>> {
        Some(self.clone())
    }
}

// ============================================================================
// 气动信号
// ============================================================================

/// 单个tick的气动信号读数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AeroReading {
    /// 归一化强度
    pub intensity: f32,
    /// 阶段：0 = 凝结，1 = 再入
    pub phase: f32,
    /// 气流速度方向
    pub velocity_direction: Vec3,
    /// 空速大小
    pub air_speed: f64,
}

impl AeroReading {
    /// 有效速度：信号方向乘以信号空速
    ///
    /// 注意这里不使用载具自身速度，载具速度只参与位置外推。
    pub fn effective_velocity(&self) -> Vec3 {
        self.velocity_direction * self.air_speed as f32
    }
}

impl Default for AeroReading {
    fn default() -> Self {
        Self {
            intensity: 0.0,
            phase: 0.0,
            velocity_direction: Vec3::ZERO,
            air_speed: 0.0,
        }
    }
}

/// 已解析的气动信号句柄
pub trait AeroSignal {
    /// 读取当前信号
    fn read(&self) -> AeroReading;
}

/// 气动信号源发现接口
///
/// 在宿主的活动对象图中按名称查找信号源，可能暂时找不到。
pub trait SignalSource {
    /// 解析成功后得到的句柄
    type Handle: AeroSignal;

    /// 按名称解析信号源
    fn resolve(&mut self, name: &str) -> Option<Self::Handle>;
}

// ============================================================================
// 特效资源
// ============================================================================

/// 粒子缩放模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScalingMode {
    /// 继承层级缩放
    #[default]
    Hierarchy,
    /// 仅使用自身本地缩放
    Local,
}

/// 宿主拥有的可释放资源
pub trait FxResource {
    /// 资源是否仍然有效（可能被外部销毁）
    fn is_alive(&self) -> bool;

    /// 释放资源
    fn destroy(&mut self);
}

/// 粒子发射器句柄
pub trait ParticleEmitter: FxResource {
    fn set_position(&mut self, position: Vec3);
    /// 设置前向轴（单位向量）
    fn set_forward(&mut self, forward: Vec3);
    fn set_scaling(&mut self, mode: ScalingMode, local_scale: Vec3);
    fn set_emission_enabled(&mut self, enabled: bool);
    fn set_start_size(&mut self, size: f32);
    fn set_start_speed(&mut self, speed: f32);
    fn set_playback_speed(&mut self, speed: f32);
    fn set_max_particles(&mut self, count: u32);
    fn set_emission_rate(&mut self, rate: u32);
}

/// 实例化层级中带名称的发射器节点
#[derive(Debug)]
pub struct EmitterNode<E> {
    pub name: String,
    pub emitter: E,
}

/// 模板实例化后的层级（与模板相互独立的深拷贝）
#[derive(Debug)]
pub struct EffectHierarchy<E, W> {
    /// 按层级顺序排列的发射器
    pub emitters: Vec<EmitterNode<E>>,
    /// 辅助包装资源
    pub wrappers: Vec<W>,
}

/// 特效资源库
pub trait EffectAssetStore {
    /// 已加载的模板
    type Template;
    type Emitter: ParticleEmitter;
    type Wrapper: FxResource;

    /// 加载模板，失败时返回 `None`
    fn load(&mut self, path: &str) -> Option<Self::Template>;

    /// 深拷贝实例化模板
    fn instantiate(
        &mut self,
        template: &Self::Template,
    ) -> EffectHierarchy<Self::Emitter, Self::Wrapper>;
}
