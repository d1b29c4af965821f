use anyhow::Result;
use glam::Vec3;
use reentry_fx::config::ReentryConfig;
use reentry_fx::effects::{EffectLifecycleManager, TrackedEffect};
use reentry_fx::host::{
    AeroReading, HeadlessAeroSignal, HeadlessAssetStore, HeadlessSignalSource,
    HeadlessVehicleDirectory,
};

const DT: f32 = 0.02;

fn reading(intensity: f32, phase: f32) -> AeroReading {
    AeroReading {
        intensity,
        phase,
        velocity_direction: Vec3::new(0.0, -0.6, -0.8),
        air_speed: 2000.0,
    }
}

fn manager(
    config: ReentryConfig,
) -> Result<(
    EffectLifecycleManager<HeadlessSignalSource, HeadlessAssetStore>,
    HeadlessAeroSignal,
)> {
    let mut source = HeadlessSignalSource::new();
    let signal = source.register(&config.signal_source_name, reading(0.0, 0.0));
    let store = HeadlessAssetStore::with_reentry_trail(&config.asset_path);
    Ok((EffectLifecycleManager::new(config, source, store)?, signal))
}

#[test]
fn test_full_descent() -> Result<()> {
    let (mut manager, signal) = manager(ReentryConfig::default())?;
    let mut vehicles = HeadlessVehicleDirectory::new();
    let id = vehicles.spawn(true, Vec3::new(0.0, 70_000.0, 0.0), Vec3::new(0.0, -2000.0, 0.0));

    // 凝结阶段：实例已创建但不发射
    manager.tick(&vehicles, DT);
    let probe = manager.asset_store().spawned()[0].clone();
    assert!(!probe.emitter("trail").unwrap().snapshot().emission_enabled);

    // 再入峰值
    signal.set_reading(reading(1.0, 1.0));
    let stats = manager.tick(&vehicles, DT);
    assert_eq!(stats.driven, 1);
    let trail = probe.emitter("trail").unwrap().snapshot();
    assert!(trail.emission_enabled);
    assert_eq!(trail.max_particles, 3000);
    assert!((trail.forward - Vec3::new(0.0, 0.6, 0.8)).length() < 1e-5);

    // 减速后低于阈值
    signal.set_reading(reading(0.4, 1.0));
    manager.tick(&vehicles, DT);
    assert!(!probe.emitter("sparks").unwrap().snapshot().emission_enabled);

    // 载具被销毁
    vehicles.remove(id);
    assert!(manager.on_vehicle_destroyed(id));
    assert!(probe.fully_released());
    assert_eq!(manager.tracked_count(), 0);
    Ok(())
}

#[test]
fn test_reload_cycle_keeps_stale_entry_until_destroyed() -> Result<()> {
    let (mut manager, signal) = manager(ReentryConfig::default())?;
    signal.set_reading(reading(1.0, 1.0));
    let mut vehicles = HeadlessVehicleDirectory::new();
    let id = vehicles.spawn(true, Vec3::ZERO, Vec3::ZERO);

    manager.tick(&vehicles, DT);
    vehicles.set_loaded(id, false);
    manager.tick(&vehicles, DT);
    vehicles.set_loaded(id, true);
    manager.tick(&vehicles, DT);
    manager.tick(&vehicles, DT);

    assert_eq!(manager.asset_store().instantiate_count(), 1);
    assert!(matches!(manager.entry(id), Some(TrackedEffect::Disposed)));

    manager.on_vehicle_destroyed(id);
    manager.on_vehicle_destroyed(id);
    assert_eq!(manager.asset_store().spawned()[0].wrappers[0].destroy_calls(), 1);
    Ok(())
}

#[test]
fn test_custom_budget_from_toml() -> Result<()> {
    let config = ReentryConfig::from_toml_str(
        r#"
        max_particles = 1000
        max_emission_rate = 100
        effect_threshold = 0.25
        "#,
    )?;
    let (mut manager, signal) = manager(config)?;
    // 0.5 * 1.0 => (0.5 - 0.25) / 0.25 = 1.0
    signal.set_reading(reading(0.5, 1.0));
    let mut vehicles = HeadlessVehicleDirectory::new();
    vehicles.spawn(true, Vec3::ZERO, Vec3::ZERO);
    manager.tick(&vehicles, DT);

    let sparks = manager.asset_store().spawned()[0]
        .emitter("sparks")
        .unwrap()
        .snapshot();
    assert_eq!(sparks.max_particles, 1000);
    assert_eq!(sparks.emission_rate, 100);
    Ok(())
}

#[test]
fn test_many_vehicles_with_mixed_states() -> Result<()> {
    let (mut manager, signal) = manager(ReentryConfig::default())?;
    signal.set_reading(reading(1.0, 1.0));
    let mut vehicles = HeadlessVehicleDirectory::new();
    let ids: Vec<_> = (0..20)
        .map(|i| vehicles.spawn(i % 2 == 0, Vec3::splat(i as f32), Vec3::ZERO))
        .collect();

    let stats = manager.tick(&vehicles, DT);
    assert_eq!(stats.vehicles, 20);
    assert_eq!(stats.created, 10);
    assert_eq!(manager.live_count(), 10);

    for id in ids.iter().step_by(4) {
        manager.on_vehicle_destroyed(*id);
    }
    assert_eq!(manager.live_count(), 5);
    assert_eq!(manager.dispose_all(), 5);
    Ok(())
}
