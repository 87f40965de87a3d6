//! 有符号 16 位像素编码修正.
//!
//! 部分图像加载层会把有符号 16 位图像以 "无符号值 + 偏移量" 的方式保存.
//! 在提取标签前, 需要先把样本放宽到 `i32` 还原真实数值, 再转换回无符号表示.
//! 该步骤属于输入规范化, 不属于直方图/IoU 核心.

use super::LabelVolume;
use crate::consts::SIGNED16_OFFSET;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 图像加载层报告的 16 位样本编码方式.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SampleEncoding {
    /// 普通无符号样本, 无需修正.
    #[default]
    Unsigned,

    /// 以 `raw = value + 32768` 方式保存的有符号 16 位样本.
    Signed16,
}

/// 修正有符号 16 位编码: `raw -> clamp(raw - 32768, 0, u16::MAX)`.
///
/// 负数样本 (无法作为标签) 被截断为背景. 返回被截断的样本个数.
pub fn normalize_signed16(volume: &mut LabelVolume<u16>) -> usize {
    let mut clamped = 0usize;
    volume.data_mut().iter_mut().for_each(|p| {
        let wide = i32::from(*p) - SIGNED16_OFFSET;
        if wide < 0 {
            clamped += 1;
        }
        *p = wide.clamp(0, i32::from(u16::MAX)) as u16;
    });
    if clamped > 0 {
        log::warn!("有符号 16 位修正: {clamped} 个负数样本被截断为背景");
    }
    clamped
}

/// 仅当 `encoding` 为 [`SampleEncoding::Signed16`] 时执行 [`normalize_signed16`].
///
/// 返回被截断的样本个数.
#[inline]
pub fn normalize_if_signed(volume: &mut LabelVolume<u16>, encoding: SampleEncoding) -> usize {
    match encoding {
        SampleEncoding::Signed16 => normalize_signed16(volume),
        SampleEncoding::Unsigned => 0,
    }
}
