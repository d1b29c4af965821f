//! 无头宿主
//!
//! 所有能力 trait 的内存实现，不依赖任何渲染后端。发射器与包装资源的状态
//! 放在共享单元里，管理器持有句柄的同时，调用方可以通过探针观察或外部销毁它们。

use super::{
    AeroReading, AeroSignal, EffectAssetStore, EffectHierarchy, EmitterNode, FxResource,
    ParticleEmitter, ScalingMode, SignalSource, VehicleDirectory, VehicleId, VehicleRef,
};
use glam::Vec3;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

fn lock<T>(cell: &Mutex<T>) -> MutexGuard<'_, T> {
    cell.lock().unwrap_or_else(PoisonError::into_inner)
}

// ============================================================================
// 发射器
// ============================================================================

/// 无头发射器的可观察状态
#[derive(Debug, Clone, PartialEq)]
pub struct EmitterState {
    pub name: String,
    pub alive: bool,
    /// 通过 `destroy` 释放的次数
    pub destroy_calls: u32,
    pub position: Vec3,
    pub forward: Vec3,
    pub scaling_mode: ScalingMode,
    pub local_scale: Vec3,
    pub emission_enabled: bool,
    pub start_size: f32,
    pub start_speed: f32,
    pub playback_speed: f32,
    pub max_particles: u32,
    pub emission_rate: u32,
    /// 位置被写入的次数
    pub transform_updates: u32,
}

impl EmitterState {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            alive: true,
            destroy_calls: 0,
            position: Vec3::ZERO,
            forward: Vec3::Z,
            scaling_mode: ScalingMode::Hierarchy,
            local_scale: Vec3::ONE,
            emission_enabled: true,
            start_size: 1.0,
            start_speed: 1.0,
            playback_speed: 1.0,
            max_particles: 1000,
            emission_rate: 10,
            transform_updates: 0,
        }
    }
}

/// 无头发射器句柄
#[derive(Debug)]
pub struct HeadlessEmitter {
    state: Arc<Mutex<EmitterState>>,
}

impl HeadlessEmitter {
    fn with_state<F: FnOnce(&mut EmitterState)>(&mut self, f: F) {
        let mut state = lock(&self.state);
        // 已销毁的发射器不再接受写入
        if state.alive {
            f(&mut *state);
        }
    }
}

impl FxResource for HeadlessEmitter {
    fn is_alive(&self) -> bool {
        lock(&self.state).alive
    }

    fn destroy(&mut self) {
        let mut state = lock(&self.state);
        state.alive = false;
        state.destroy_calls += 1;
    }
}

impl ParticleEmitter for HeadlessEmitter {
    fn set_position(&mut self, position: Vec3) {
        self.with_state(|s| {
            s.position = position;
            s.transform_updates += 1;
        });
    }

    fn set_forward(&mut self, forward: Vec3) {
        self.with_state(|s| s.forward = forward);
    }

    fn set_scaling(&mut self, mode: ScalingMode, local_scale: Vec3) {
        self.with_state(|s| {
            s.scaling_mode = mode;
            s.local_scale = local_scale;
        });
    }

    fn set_emission_enabled(&mut self, enabled: bool) {
        self.with_state(|s| s.emission_enabled = enabled);
    }

    fn set_start_size(&mut self, size: f32) {
        self.with_state(|s| s.start_size = size);
    }

    fn set_start_speed(&mut self, speed: f32) {
        self.with_state(|s| s.start_speed = speed);
    }

    fn set_playback_speed(&mut self, speed: f32) {
        self.with_state(|s| s.playback_speed = speed);
    }

    fn set_max_particles(&mut self, count: u32) {
        self.with_state(|s| s.max_particles = count);
    }

    fn set_emission_rate(&mut self, rate: u32) {
        self.with_state(|s| s.emission_rate = rate);
    }
}

/// 发射器探针
#[derive(Debug, Clone)]
pub struct EmitterProbe {
    state: Arc<Mutex<EmitterState>>,
}

impl EmitterProbe {
    /// 当前状态快照
    pub fn snapshot(&self) -> EmitterState {
        lock(&self.state).clone()
    }

    pub fn is_alive(&self) -> bool {
        lock(&self.state).alive
    }

    /// 模拟宿主在管理器之外销毁该发射器
    pub fn invalidate(&self) {
        lock(&self.state).alive = false;
    }
}

// ============================================================================
// 包装资源
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct WrapperState {
    alive: bool,
    destroy_calls: u32,
}

/// 无头包装资源
#[derive(Debug)]
pub struct HeadlessWrapper {
    state: Arc<Mutex<WrapperState>>,
}

impl FxResource for HeadlessWrapper {
    fn is_alive(&self) -> bool {
        lock(&self.state).alive
    }

    fn destroy(&mut self) {
        let mut state = lock(&self.state);
        state.alive = false;
        state.destroy_calls += 1;
    }
}

/// 包装资源探针
#[derive(Debug, Clone)]
pub struct WrapperProbe {
    state: Arc<Mutex<WrapperState>>,
}

impl WrapperProbe {
    pub fn is_alive(&self) -> bool {
        lock(&self.state).alive
    }

    pub fn destroy_calls(&self) -> u32 {
        lock(&self.state).destroy_calls
    }

    pub fn invalidate(&self) {
        lock(&self.state).alive = false;
    }
}

/// 一次实例化产生的全部探针
#[derive(Debug, Clone)]
pub struct InstanceProbe {
    pub emitters: Vec<EmitterProbe>,
    pub wrappers: Vec<WrapperProbe>,
}

impl InstanceProbe {
    /// 按名称查找发射器探针
    pub fn emitter(&self, name: &str) -> Option<&EmitterProbe> {
        self.emitters.iter().find(|p| lock(&p.state).name == name)
    }

    /// 实例化出的资源是否已全部释放
    pub fn fully_released(&self) -> bool {
        self.emitters.iter().all(|p| !p.is_alive()) && self.wrappers.iter().all(|p| !p.is_alive())
    }
}

// ============================================================================
// 资源库
// ============================================================================

/// 无头特效模板
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadlessTemplate {
    /// 层级中发射器名称（按顺序）
    pub emitters: Vec<String>,
    /// 包装资源数量
    pub wrappers: usize,
}

impl HeadlessTemplate {
    /// 标准再入尾迹模板：尾迹、火花和一个包装资源
    pub fn reentry_trail() -> Self {
        Self {
            emitters: vec!["trail".to_string(), "sparks".to_string()],
            wrappers: 1,
        }
    }
}

/// 无头资源库
#[derive(Debug, Default)]
pub struct HeadlessAssetStore {
    templates: HashMap<String, HeadlessTemplate>,
    spawned: Vec<InstanceProbe>,
    load_calls: u32,
}

impl HeadlessAssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 在指定路径注册标准再入尾迹模板
    pub fn with_reentry_trail(path: &str) -> Self {
        Self::new().with_template(path, HeadlessTemplate::reentry_trail())
    }

    pub fn with_template(mut self, path: &str, template: HeadlessTemplate) -> Self {
        self.insert_template(path, template);
        self
    }

    pub fn insert_template(&mut self, path: &str, template: HeadlessTemplate) {
        self.templates.insert(path.to_string(), template);
    }

    pub fn remove_template(&mut self, path: &str) -> Option<HeadlessTemplate> {
        self.templates.remove(path)
    }

    /// 每次实例化的探针，按实例化顺序
    pub fn spawned(&self) -> &[InstanceProbe] {
        &self.spawned
    }

    pub fn instantiate_count(&self) -> usize {
        self.spawned.len()
    }

    pub fn load_calls(&self) -> u32 {
        self.load_calls
    }
}

impl EffectAssetStore for HeadlessAssetStore {
    type Template = HeadlessTemplate;
    type Emitter = HeadlessEmitter;
    type Wrapper = HeadlessWrapper;

    fn load(&mut self, path: &str) -> Option<HeadlessTemplate> {
        self.load_calls += 1;
        self.templates.get(path).cloned()
    }

    fn instantiate(
        &mut self,
        template: &HeadlessTemplate,
    ) -> EffectHierarchy<HeadlessEmitter, HeadlessWrapper> {
        let mut probe = InstanceProbe {
            emitters: Vec::with_capacity(template.emitters.len()),
            wrappers: Vec::with_capacity(template.wrappers),
        };

        let emitters = template
            .emitters
            .iter()
            .map(|name| {
                let state = Arc::new(Mutex::new(EmitterState::new(name)));
                probe.emitters.push(EmitterProbe {
                    state: Arc::clone(&state),
                });
                EmitterNode {
                    name: name.clone(),
                    emitter: HeadlessEmitter { state },
                }
            })
            .collect();

        let wrappers = (0..template.wrappers)
            .map(|_| {
                let state = Arc::new(Mutex::new(WrapperState {
                    alive: true,
                    destroy_calls: 0,
                }));
                probe.wrappers.push(WrapperProbe {
                    state: Arc::clone(&state),
                });
                HeadlessWrapper { state }
            })
            .collect();

        self.spawned.push(probe);
        EffectHierarchy { emitters, wrappers }
    }
}

// ============================================================================
// 气动信号
// ============================================================================

/// 无头气动信号，克隆共享同一读数
#[derive(Debug, Clone, Default)]
pub struct HeadlessAeroSignal {
    reading: Arc<Mutex<AeroReading>>,
}

impl HeadlessAeroSignal {
    pub fn new(reading: AeroReading) -> Self {
        Self {
            reading: Arc::new(Mutex::new(reading)),
        }
    }

    pub fn set_reading(&self, reading: AeroReading) {
        *lock(&self.reading) = reading;
    }
}

impl AeroSignal for HeadlessAeroSignal {
    fn read(&self) -> AeroReading {
        *lock(&self.reading)
    }
}

/// 无头信号源：按名称注册的对象图
#[derive(Debug, Default)]
pub struct HeadlessSignalSource {
    objects: HashMap<String, HeadlessAeroSignal>,
    resolve_calls: u32,
}

impl HeadlessSignalSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册信号对象，返回共享同一读数的句柄
    pub fn register(&mut self, name: &str, reading: AeroReading) -> HeadlessAeroSignal {
        let signal = HeadlessAeroSignal::new(reading);
        self.objects.insert(name.to_string(), signal.clone());
        signal
    }

    pub fn unregister(&mut self, name: &str) -> bool {
        self.objects.remove(name).is_some()
    }

    pub fn resolve_calls(&self) -> u32 {
        self.resolve_calls
    }
}

impl SignalSource for HeadlessSignalSource {
    type Handle = HeadlessAeroSignal;

    fn resolve(&mut self, name: &str) -> Option<HeadlessAeroSignal> {
        self.resolve_calls += 1;
        self.objects.get(name).cloned()
    }
}

// ============================================================================
// 载具目录
// ============================================================================

/// 无头载具目录
#[derive(Debug, Clone)]
pub struct HeadlessVehicleDirectory {
    vehicles: Vec<VehicleRef>,
    available: bool,
}

impl Default for HeadlessVehicleDirectory {
    fn default() -> Self {
        Self {
            vehicles: Vec::new(),
            available: true,
        }
    }
}

impl HeadlessVehicleDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加载具并返回其标识
    pub fn spawn(&mut self, loaded: bool, center_of_mass: Vec3, body_velocity: Vec3) -> VehicleId {
        let id = VehicleId::new_v4();
        self.vehicles.push(VehicleRef {
            id,
            loaded,
            center_of_mass,
            body_velocity,
        });
        id
    }

    pub fn set_loaded(&mut self, id: VehicleId, loaded: bool) -> bool {
        match self.vehicles.iter_mut().find(|v| v.id == id) {
            Some(vehicle) => {
                vehicle.loaded = loaded;
                true
            }
            None => false,
        }
    }

    pub fn set_kinematics(&mut self, id: VehicleId, center_of_mass: Vec3, body_velocity: Vec3) -> bool {
        match self.vehicles.iter_mut().find(|v| v.id == id) {
            Some(vehicle) => {
                vehicle.center_of_mass = center_of_mass;
                vehicle.body_velocity = body_velocity;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: VehicleId) -> bool {
        let before = self.vehicles.len();
        self.vehicles.retain(|v| v.id != id);
        self.vehicles.len() != before
    }

    /// 模拟宿主暂时无法提供载具列表
    pub fn set_available(&mut self, available: bool) {
        self.available = available;
    }

    pub fn vehicles(&self) -> &[VehicleRef] {
        &self.vehicles
    }
}

impl VehicleDirectory for HeadlessVehicleDirectory {
    fn list_vehicles(&self) -> Option<Vec<VehicleRef>> {
        self.available.then(|| self.vehicles.clone())
    }
}
