//! # Reentry FX
//!
//! Per-tick atmospheric reentry particle effect driver for simulated flight vehicles.
//!
//! ## Features
//!
//! - **Lifecycle Management**: one effect instance per tracked vehicle, created on first loaded
//!   sighting, released on unload or destroy notification
//! - **Signal Driven**: effect strength derived from an external aerodynamics signal every fixed tick
//! - **Host Agnostic**: vehicles, signal source and effect assets are reached through small
//!   capability traits
//! - **ECS Integration**: bevy_ecs resource, events and systems embedding the manager
//!
//! ## Architecture Design
//!
//! - **Capabilities** (`host`): `VehicleDirectory`, `SignalSource`, `EffectAssetStore`
//! - **Factory** (`effects::factory`): instantiates and tunes effect templates
//! - **Manager** (`effects::manager`): per-tick reconciliation and parameter drive
//! - **System** (`ecs`): orchestration inside an ECS schedule
//!
//! ### Example
//!
//! ```rust
//! use reentry_fx::config::ReentryConfig;
//! use reentry_fx::effects::EffectLifecycleManager;
//! use reentry_fx::host::{AeroReading, HeadlessAssetStore, HeadlessSignalSource, HeadlessVehicleDirectory};
//! use glam::Vec3;
//!
//! let config = ReentryConfig::default();
//! let mut source = HeadlessSignalSource::new();
//! source.register(&config.signal_source_name, AeroReading {
//!     intensity: 1.0,
//!     phase: 1.0,
//!     velocity_direction: Vec3::NEG_Y,
//!     air_speed: 2200.0,
//! });
//! let store = HeadlessAssetStore::with_reentry_trail(&config.asset_path);
//! let mut manager = EffectLifecycleManager::new(config, source, store).unwrap();
//!
//! let mut vehicles = HeadlessVehicleDirectory::new();
//! let id = vehicles.spawn(true, Vec3::ZERO, Vec3::new(0.0, -2200.0, 0.0));
//! manager.tick(&vehicles, 0.02);
//! assert!(manager.instance(id).is_some());
//!
//! manager.on_vehicle_destroyed(id);
//! assert_eq!(manager.tracked_count(), 0);
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Errors and logging
//! - [`config`]: Configuration
//! - [`host`]: Host capability traits and the headless host
//! - [`effects`]: Effect strength, instances, factory and lifecycle manager
//! - [`ecs`]: bevy_ecs integration

/// Error types and logging initialization
pub mod core;
/// Configuration system
pub mod config;
/// Host capability interfaces
pub mod host;
/// Reentry effect lifecycle
pub mod effects;
/// bevy_ecs integration
pub mod ecs;

pub use crate::config::ReentryConfig;
pub use crate::core::{ReentryError, ReentryResult};
pub use crate::effects::{EffectFactory, EffectInstance, EffectLifecycleManager, EffectStrength};
