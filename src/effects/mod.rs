//! 再入特效模块
//!
//! ## 架构设计
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │              EffectLifecycleManager (每个固定tick)        │
//! ├─────────────────────────────────────────────────────────┤
//! │  1. 解析气动信号源（失败则本tick全部抑制）                  │
//! │  2. 计算特效强度 (S * phase - threshold) / threshold      │
//! │  3. 与宿主载具列表对账：首次见到已加载载具时创建实例        │
//! │  4. 驱动发射参数：位置外推、朝向、粒子预算、发射速率        │
//! │  5. 卸载时释放资源，销毁通知时移除条目                      │
//! └─────────────────────────────────────────────────────────┘
//!                            │
//!                            ▼
//!                     EffectFactory
//!          (实例化模板 + 定位发射器 + 基础调参)
//! ```

pub mod factory;
pub mod instance;
pub mod manager;
pub mod signal;
pub mod strength;


pub use factory::EffectFactory;
pub use instance::{EffectDrive, EffectInstance};
pub use manager::{EffectLifecycleManager, TickStats, TrackedEffect};
pub use signal::CachedSignal;
pub use strength::EffectStrength;
