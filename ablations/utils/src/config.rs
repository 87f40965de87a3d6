//! 消融实验配置. 优先读取环境变量, 否则使用默认值.

use mic_berry::Idx3d;
use std::env;

/// 默认体数据形状 `(z, h, w)`.
pub const DEFAULT_SHAPE: Idx3d = (32, 256, 256);

/// 默认前景对象个数.
pub const DEFAULT_LABELS: usize = 400;

/// 默认重复轮数.
pub const DEFAULT_ROUNDS: u32 = 8;

/// 消融实验配置.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct AblationConfig {
    /// 体数据形状 `(z, h, w)`.
    pub shape: Idx3d,

    /// 前景对象个数 (稀疏编号前).
    pub labels: usize,

    /// 每种算法重复运行的轮数.
    pub rounds: u32,
}

impl Default for AblationConfig {
    fn default() -> Self {
        Self {
            shape: DEFAULT_SHAPE,
            labels: DEFAULT_LABELS,
            rounds: DEFAULT_ROUNDS,
        }
    }
}

impl AblationConfig {
    /// 从环境变量加载配置.
    ///
    /// 1. `$MIC_ABLATION_SHAPE`, 形如 `32x256x256`;
    /// 2. `$MIC_ABLATION_LABELS`, 前景对象个数;
    /// 3. `$MIC_ABLATION_ROUNDS`, 重复轮数.
    ///
    /// 未设置或无法解析的项使用默认值.
    pub fn from_env_or_default() -> Self {
        let d = Self::default();
        Self {
            shape: env::var("MIC_ABLATION_SHAPE")
                .ok()
                .and_then(|s| parse_shape(&s))
                .unwrap_or(d.shape),
            labels: env::var("MIC_ABLATION_LABELS")
                .ok()
                .and_then(|s| s.trim().parse().ok())
                .filter(|&n| n > 0)
                .unwrap_or(d.labels),
            rounds: env::var("MIC_ABLATION_ROUNDS")
                .ok()
                .and_then(|s| s.trim().parse().ok())
                .filter(|&n| n > 0)
                .unwrap_or(d.rounds),
        }
    }

    /// 体素个数.
    #[inline]
    pub fn voxels(&self) -> usize {
        let (z, h, w) = self.shape;
        z * h * w
    }
}

/// 解析形如 `32x256x256` 的形状. 任一维为 0 时返回 `None`.
pub fn parse_shape(s: &str) -> Option<Idx3d> {
    let mut it = s.trim().split(['x', 'X']).map(|p| p.trim().parse::<usize>());
    let z = it.next()?.ok()?;
    let h = it.next()?.ok()?;
    let w = it.next()?.ok()?;
    if it.next().is_some() || z == 0 || h == 0 || w == 0 {
        return None;
    }
    Some((z, h, w))
}

#[cfg(test)]
mod tests {
    use super::parse_shape;

    #[test]
    fn test_parse_shape() {
        assert_eq!(parse_shape("32x256x256"), Some((32, 256, 256)));
        assert_eq!(parse_shape(" 1X2x3 "), Some((1, 2, 3)));
        assert_eq!(parse_shape("1x2"), None);
        assert_eq!(parse_shape("1x2x3x4"), None);
        assert_eq!(parse_shape("0x2x3"), None);
        assert_eq!(parse_shape("ax2x3"), None);
    }
}
