use num::{NumCast, ToPrimitive};

/// 体素样本类型.
///
/// 任何可以与 `usize` 互相转换的原生数值类型 (`u8`, `u16`, `u32`, `i16`, `f32`, ...)
/// 都自动实现了该 trait.
///
/// 样本转换为标签时, 浮点数按照 **向零截断** 处理 (与 `as` 转换一致);
/// 负数, NaN 和无穷大无法转换, 被所有直方图视为越界样本.
pub trait Sample: Copy + ToPrimitive + NumCast + Send + Sync {
    /// 样本对应的整数标签. 无法表示为非负整数时返回 `None`.
    #[inline]
    fn to_label(self) -> Option<usize> {
        self.to_usize()
    }

    /// 标签对应的样本. 超出 `Self` 的表示范围时返回 `None`.
    #[inline]
    fn from_label(label: usize) -> Option<Self> {
        <Self as NumCast>::from(label)
    }
}

impl<T: Copy + ToPrimitive + NumCast + Send + Sync> Sample for T {}

#[cfg(test)]
mod tests {
    use super::Sample;

    #[test]
    fn test_integer_samples() {
        assert_eq!(7u8.to_label(), Some(7));
        assert_eq!(65535u16.to_label(), Some(65535));
        assert_eq!((-1i16).to_label(), None);
        assert_eq!(u8::from_label(255), Some(255));
        assert_eq!(u8::from_label(256), None);
    }

    #[test]
    fn test_float_samples() {
        assert_eq!(3.99f64.to_label(), Some(3));
        assert_eq!((-0.25f32).to_label(), Some(0));
        assert_eq!((-1.0f32).to_label(), None);
        assert_eq!(f64::INFINITY.to_label(), None);
        assert_eq!(f32::from_label(12), Some(12.0));
    }
}
