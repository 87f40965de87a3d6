//! 一维占用直方图 (标签 -> 体素数) 与二维联合直方图 (标签对 -> 共现体素数).
//!
//! 直方图的容量由调用方声明的最大标签决定. 超出容量 (或无法转换为非负整数)
//! 的体素不会被计入直方图, 但会被单独计数, 并在每次调用结束时报告一次.

use std::fmt;
use std::ops::{AddAssign, Index};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::consts::is_object;
use crate::volume::{LabelPlane, LabelVolume, Sample};
use crate::{MicError, MicResult};

mod joint;

#[cfg(feature = "rayon")]
mod par;

pub use joint::JointHistogram2D;

/// 标签越界诊断信息 (非致命).
///
/// 越界体素已从直方图中排除. 若该值频繁出现, 通常说明调用方声明的最大标签过小.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LabelOutOfRange {
    /// 被排除的体素个数.
    pub excluded: u64,
}

impl fmt::Display for LabelOutOfRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} 个体素的标签超出直方图容量, 已被排除", self.excluded)
    }
}

/// 最大标签 `max_label` 对应的直方图容量 `max_label + 1`.
///
/// 加法溢出时返回 `Err(MicError::LabelTooLarge)`.
#[inline]
pub(crate) fn capacity(max_label: usize) -> MicResult<usize> {
    max_label
        .checked_add(1)
        .ok_or(MicError::LabelTooLarge { label: max_label })
}

/// 由越界计数生成诊断信息. 计数为 0 时返回 `None`.
#[inline]
fn diagnostic_of(excluded: u64) -> Option<LabelOutOfRange> {
    (excluded > 0).then_some(LabelOutOfRange { excluded })
}

/// 一维占用直方图. 第 `i` 个桶是标签 `i` 的体素个数.
///
/// 长度恒为 `max_label + 1`.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Histogram1D {
    bins: Vec<u64>,
    out_of_range: u64,
}

impl Index<usize> for Histogram1D {
    type Output = u64;

    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        &self.bins[index]
    }
}

impl Histogram1D {
    /// 创建容量为 `max_label + 1` 的空直方图.
    ///
    /// `max_label == usize::MAX` 时返回 `Err(MicError::LabelTooLarge)`.
    #[inline]
    pub fn zeros(max_label: usize) -> MicResult<Self> {
        Ok(Self {
            bins: vec![0; capacity(max_label)?],
            out_of_range: 0,
        })
    }

    /// 统计 `volume` 的一维占用直方图, 桶范围为 `[0, max_label]`.
    ///
    /// 越界体素被排除并计数; 若存在越界体素, 本次调用会输出一条警告日志,
    /// 其数量也可以通过 [`Self::diagnostic`] 获取.
    ///
    /// 容量溢出时返回 `Err(MicError::LabelTooLarge)`, 不读取任何体素.
    pub fn build<T: Sample>(volume: &LabelVolume<T>, max_label: usize) -> MicResult<Self> {
        let mut histo = Self::zeros(max_label)?;
        for plane in volume.plane_iter() {
            histo.accumulate(&plane);
        }
        histo.report();
        Ok(histo)
    }

    /// 将单层切片累加进直方图. 不输出日志.
    pub fn accumulate<T: Sample>(&mut self, plane: &LabelPlane<'_, T>) {
        for label in plane.labels() {
            match label.and_then(|l| self.bins.get_mut(l)) {
                Some(bin) => *bin += 1,
                None => self.out_of_range += 1,
            }
        }
    }

    /// 若存在越界体素, 输出一次警告.
    pub(crate) fn report(&self) {
        if let Some(d) = self.diagnostic() {
            log::warn!("一维直方图 (容量 {}): {d}", self.len());
        }
    }

    /// 桶的个数, 即 `max_label + 1`.
    #[inline]
    pub fn len(&self) -> usize {
        self.bins.len()
    }

    /// 直方图是否没有任何桶? 由 [`Self::zeros`] 创建的直方图总是非空的.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    /// 直方图能容纳的最大标签.
    #[inline]
    pub fn max_label(&self) -> usize {
        self.len().saturating_sub(1)
    }

    /// 标签 `label` 的体素个数. 超出容量的标签返回 0.
    #[inline]
    pub fn count(&self, label: usize) -> u64 {
        self.bins.get(label).copied().unwrap_or(0)
    }

    /// 所有桶.
    #[inline]
    pub fn bins(&self) -> &[u64] {
        &self.bins
    }

    /// 被排除的越界体素个数.
    #[inline]
    pub fn out_of_range(&self) -> u64 {
        self.out_of_range
    }

    /// 越界诊断信息. 不存在越界体素时返回 `None`.
    #[inline]
    pub fn diagnostic(&self) -> Option<LabelOutOfRange> {
        diagnostic_of(self.out_of_range)
    }

    /// 计入直方图的体素总数 (不含越界体素).
    #[inline]
    pub fn total(&self) -> u64 {
        self.bins.iter().sum()
    }

    /// 按升序迭代所有出现过的前景标签 (不含背景).
    pub fn populated_labels(&self) -> impl Iterator<Item = usize> + '_ {
        self.bins
            .iter()
            .enumerate()
            .filter_map(|(label, &n)| (n > 0 && is_object(label)).then_some(label))
    }

    /// 直接获得底层数据.
    #[inline]
    pub fn into_raw(self) -> Vec<u64> {
        self.bins
    }
}

/// 逐元素相加合并. 两者长度不同时, 结果取较长者的长度.
impl AddAssign<&Histogram1D> for Histogram1D {
    fn add_assign(&mut self, rhs: &Histogram1D) {
        if self.bins.len() < rhs.bins.len() {
            self.bins.resize(rhs.bins.len(), 0);
        }
        for (l, r) in self.bins.iter_mut().zip(rhs.bins.iter()) {
            *l += *r;
        }
        self.out_of_range += rhs.out_of_range;
    }
}

#[cfg(test)]
mod tests {
    use super::{Histogram1D, LabelOutOfRange};
    use crate::{LabelVolume, MicError};
    use ndarray::{array, Array3};

    fn init_logger() {
        let _ = simple_logger::SimpleLogger::new()
            .with_level(log::LevelFilter::Warn)
            .init();
    }

    #[test]
    fn test_histo_1d_basic() {
        let truth = LabelVolume::from_plane(array![[1u8, 1], [0, 2]]);
        let h = Histogram1D::build(&truth, 2).unwrap();
        assert_eq!(h.bins(), &[1, 2, 1]);
        assert_eq!(h.diagnostic(), None);
        assert_eq!(h.populated_labels().collect::<Vec<_>>(), vec![1, 2]);
    }

    /// `sum(histogram) + 越界数 == 体素数`.
    #[test]
    fn test_histo_1d_out_of_range_counted() {
        init_logger();
        let raw = Array3::from_shape_vec((2, 2, 2), vec![0u16, 5, 9, 1, 1, 12, 3, 0]).unwrap();
        let v = LabelVolume::new(raw).unwrap();
        let h = Histogram1D::build(&v, 5).unwrap();
        assert_eq!(h.len(), 6);
        assert_eq!(h.out_of_range(), 2);
        assert_eq!(h.diagnostic(), Some(LabelOutOfRange { excluded: 2 }));
        assert_eq!(h.total() + h.out_of_range(), v.size() as u64);
        assert_eq!(h[1], 2);
        assert_eq!(h.count(100), 0);
    }

    #[test]
    fn test_histo_1d_float_and_negative() {
        init_logger();
        let v = LabelVolume::from_plane(array![[1.0f32, 1.7, -2.0], [f32::NAN, 0.0, 2.0]]);
        let h = Histogram1D::build(&v, 2).unwrap();
        assert_eq!(h.bins(), &[1, 2, 1]);
        assert_eq!(h.out_of_range(), 2);
    }

    #[test]
    fn test_histo_1d_capacity_overflow() {
        let v = LabelVolume::from_plane(array![[0usize, usize::MAX]]);
        let err = Histogram1D::build(&v, usize::MAX).unwrap_err();
        assert!(matches!(err, MicError::LabelTooLarge { label: usize::MAX }));
        assert!(Histogram1D::zeros(usize::MAX).is_err());
    }

    #[test]
    fn test_histo_1d_merge() {
        let mut a = Histogram1D::zeros(1).unwrap();
        let v = LabelVolume::from_plane(array![[0u8, 3, 3]]);
        let b = Histogram1D::build(&v, 3).unwrap();
        a += &b;
        assert_eq!(a.bins(), &[1, 0, 0, 2]);
        assert_eq!(a.max_label(), 3);
    }
}
