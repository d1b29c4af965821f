//! 特效强度

use crate::host::AeroReading;

/// 每个tick由气动信号推导出的特效强度
///
/// `strength = (intensity * phase - threshold) / threshold`
///
/// 强度不做上限截断：阈值较低且信号很强时，粒子预算可以超过配置的最大值。
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct EffectStrength(f32);

impl EffectStrength {
    /// 由原始信号分量计算强度
    pub fn compute(intensity: f32, phase: f32, threshold: f32) -> Self {
        Self((intensity * phase - threshold) / threshold)
    }

    /// 由一次信号读数计算强度
    pub fn from_reading(reading: &AeroReading, threshold: f32) -> Self {
        Self::compute(reading.intensity, reading.phase, threshold)
    }

    pub fn value(self) -> f32 {
        self.0
    }

    /// 强度大于0时特效可见；NaN视为抑制
    pub fn is_active(self) -> bool {
        self.0 > 0.0
    }

    /// 按强度缩放预算
    ///
    /// 四舍五入（远离零），负值和非有限值得到0。
    pub fn scale_budget(self, max: u32) -> u32 {
        let scaled = (max as f32 * self.0).round();
        if scaled.is_finite() && scaled > 0.0 {
            // `as` 在溢出时饱和到 u32::MAX
            scaled as u32
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_strength() {
        let strength = EffectStrength::compute(1.0, 1.0, 0.5);
        assert_eq!(strength.value(), 1.0);
        assert!(strength.is_active());
    }

    #[test]
    fn test_suppressed_strength() {
        let strength = EffectStrength::compute(0.5, 0.5, 0.5);
        assert_eq!(strength.value(), -0.5);
        assert!(!strength.is_active());
    }

    #[test]
    fn test_exact_threshold_is_suppressed() {
        let strength = EffectStrength::compute(0.5, 1.0, 0.5);
        assert_eq!(strength.value(), 0.0);
        assert!(!strength.is_active());
    }

    #[test]
    fn test_condensation_phase_is_suppressed() {
        // 凝结阶段 phase = 0
        let strength = EffectStrength::compute(1.0, 0.0, 0.5);
        assert_eq!(strength.value(), -1.0);
        assert!(!strength.is_active());
    }

    #[test]
    fn test_budget_scaling() {
        let strength = EffectStrength(0.8);
        assert_eq!(strength.scale_budget(3000), 2400);
        assert_eq!(strength.scale_budget(400), 320);
    }

    #[test]
    fn test_budget_rounds_to_nearest() {
        let strength = EffectStrength(0.0015);
        // 3000 * 0.0015 = 4.5 -> 5（截断会得到4）
        assert_eq!(strength.scale_budget(3000), 5);
        assert_eq!(EffectStrength(0.001).scale_budget(400), 0);
    }

    #[test]
    fn test_budget_never_negative() {
        assert_eq!(EffectStrength(-0.5).scale_budget(3000), 0);
        assert_eq!(EffectStrength(f32::NAN).scale_budget(3000), 0);
    }

    #[test]
    fn test_strength_not_clamped() {
        // 阈值0.25、满信号 => 强度3
        let strength = EffectStrength::compute(1.0, 1.0, 0.25);
        assert_eq!(strength.value(), 3.0);
        assert_eq!(strength.scale_budget(3000), 9000);
    }
}
