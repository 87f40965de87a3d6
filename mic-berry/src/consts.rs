//! 通用常量.

/// 背景的标签值. 标签压缩时背景永远映射到背景.
pub const BACKGROUND: usize = 0;

/// 以无符号 16 位形式保存的有符号 16 位样本的偏移量.
///
/// 即 `raw = value + SIGNED16_OFFSET`.
pub const SIGNED16_OFFSET: i32 = 32768;

/// 默认的 IoU 匹配阈值.
///
/// 当阈值不小于 0.5 时, 每个真值标签至多与一个测试标签匹配, 反之亦然.
pub const DEFAULT_MATCH_THRESHOLD: f64 = 0.5;

/// 标签是否是背景?
#[inline]
pub const fn is_background(label: usize) -> bool {
    label == BACKGROUND
}

/// 标签是否是前景 (即某个对象)?
#[inline]
pub const fn is_object(label: usize) -> bool {
    !is_background(label)
}
