//! 再入下降演示
//!
//! 在无头宿主上模拟三艘载具的再入过程：凝结、再入峰值、减速，
//! 中途卸载一艘并销毁另一艘，每秒输出一次tick统计。
//!
//! 运行：`cargo run --example reentry_descent [config.toml]`

use glam::Vec3;
use reentry_fx::config::ReentryConfig;
use reentry_fx::core::{init_logging, ReentryResult, LOG_TARGET};
use reentry_fx::effects::EffectLifecycleManager;
use reentry_fx::host::{AeroReading, HeadlessAssetStore, HeadlessSignalSource, HeadlessVehicleDirectory};

const FIXED_DT: f32 = 0.02;
const TICKS: u32 = 1500;

/// 按下降进度生成信号读数
fn scripted_reading(progress: f32) -> AeroReading {
    let (intensity, phase) = if progress < 0.2 {
        (progress * 2.0, 0.0)
    } else if progress < 0.7 {
        (1.0 - (progress - 0.45).abs(), 1.0)
    } else {
        ((1.0 - progress) * 2.0, 1.0)
    };
    let air_speed = 7800.0 * (1.0 - progress as f64 * 0.9);
    AeroReading {
        intensity,
        phase,
        velocity_direction: Vec3::new(0.3, -0.5, -0.8).normalize(),
        air_speed,
    }
}

fn run() -> ReentryResult<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => ReentryConfig::load_or_default(path),
        None => {
            let mut config = ReentryConfig::default();
            config.apply_env_overrides();
            config
        }
    };
    init_logging(&config.logging);

    let mut source = HeadlessSignalSource::new();
    let signal = source.register(&config.signal_source_name, scripted_reading(0.0));
    let store = HeadlessAssetStore::with_reentry_trail(&config.asset_path);
    let mut manager = EffectLifecycleManager::new(config, source, store)?;

    let mut vehicles = HeadlessVehicleDirectory::new();
    let velocity = Vec3::new(2000.0, -3500.0, -5800.0);
    let capsule = vehicles.spawn(true, Vec3::new(0.0, 120_000.0, 0.0), velocity);
    let booster = vehicles.spawn(true, Vec3::new(40.0, 120_000.0, 0.0), velocity);
    let debris = vehicles.spawn(false, Vec3::new(-40.0, 118_000.0, 0.0), velocity);

    for tick in 0..TICKS {
        let progress = tick as f32 / TICKS as f32;
        signal.set_reading(scripted_reading(progress));

        let elapsed = tick as f32 * FIXED_DT;
        for id in [capsule, booster, debris] {
            let altitude = 120_000.0 - 60.0 * elapsed * (1.0 - progress * 0.5);
            vehicles.set_kinematics(id, Vec3::new(0.0, altitude, 0.0), velocity * (1.0 - progress * 0.9));
        }

        if tick == 300 {
            vehicles.set_loaded(debris, true);
        }
        if tick == 600 {
            tracing::info!(target: LOG_TARGET, vehicle = %booster, "Booster leaves physics range");
            vehicles.set_loaded(booster, false);
        }
        if tick == 900 {
            vehicles.remove(debris);
            manager.on_vehicle_destroyed(debris);
        }

        let stats = manager.tick(&vehicles, FIXED_DT);
        if tick % 50 == 0 {
            tracing::info!(
                target: LOG_TARGET,
                tick,
                progress,
                vehicles = stats.vehicles,
                driven = stats.driven,
                suppressed = stats.suppressed,
                tracked = manager.tracked_count(),
                live = manager.live_count(),
                "Descent progress"
            );
        }
    }

    let released = manager.dispose_all();
    tracing::info!(
        target: LOG_TARGET,
        released,
        instantiated = manager.asset_store().instantiate_count(),
        "Descent finished"
    );
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Reentry demo failed: {}", e);
        std::process::exit(1);
    }
}
