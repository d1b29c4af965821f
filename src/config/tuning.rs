use super::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};

/// 特效实例的基础调参
///
/// 由 `EffectFactory` 在实例化时一次性写入，之后只有起始速度会被逐帧驱动。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaselineTuning {
    /// 尾迹粒子起始大小
    pub trail_start_size: f32,

    /// 尾迹粒子起始速度（单位/秒），激活后被有效速度覆盖
    pub trail_start_speed: f32,

    /// 两个发射器的内部播放倍率
    pub playback_speed: f32,

    /// 激活期间尾迹发射器的本地缩放
    pub trail_local_scale: f32,
}

impl Default for BaselineTuning {
    fn default() -> Self {
        Self {
            trail_start_size: 3.5,
            trail_start_speed: 3.5,
            playback_speed: 5.0,
            trail_local_scale: 0.15,
        }
    }
}

impl BaselineTuning {
    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        let fields = [
            ("trail_start_size", self.trail_start_size),
            ("trail_start_speed", self.trail_start_speed),
            ("playback_speed", self.playback_speed),
            ("trail_local_scale", self.trail_local_scale),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::ValidationError(format!(
                    "tuning.{} must be a positive finite number, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}
