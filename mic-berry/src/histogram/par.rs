//! 按切片并行累加直方图.
//!
//! 每个 rayon 任务持有自己的局部直方图, 最后逐元素相加合并.
//! 直方图加法满足交换律和结合律, 因此结果与顺序版本完全相同.

use rayon::iter::{IndexedParallelIterator, ParallelIterator};

use super::{Histogram1D, JointHistogram2D};
use crate::volume::{LabelVolume, Sample};
use crate::MicResult;

/// 并发操作部分
impl Histogram1D {
    /// 借助 `rayon`, 并行地统计 `volume` 的一维占用直方图.
    ///
    /// 语义与 [`Self::build`] 完全相同, 包括越界体素的处理和日志.
    pub fn par_build<T: Sample>(volume: &LabelVolume<T>, max_label: usize) -> MicResult<Self> {
        let empty = Self::zeros(max_label)?;
        let histo = volume
            .par_plane_iter()
            .fold(
                || empty.clone(),
                |mut acc, plane| {
                    acc.accumulate(&plane);
                    acc
                },
            )
            .reduce(
                || empty.clone(),
                |mut l, r| {
                    l += &r;
                    l
                },
            );
        histo.report();
        Ok(histo)
    }
}

/// 并发操作部分
impl JointHistogram2D {
    /// 借助 `rayon`, 并行地统计 `a` 和 `b` 的联合直方图.
    ///
    /// 语义与 [`Self::build`] 完全相同.
    pub fn par_build<A: Sample, B: Sample>(
        a: &LabelVolume<A>,
        max_a: usize,
        b: &LabelVolume<B>,
        max_b: usize,
    ) -> MicResult<Self> {
        a.ensure_same_shape(b)?;
        let empty = Self::zeros(max_a, max_b)?;
        let histo = a
            .par_plane_iter()
            .zip(b.par_plane_iter())
            .fold(
                || empty.clone(),
                |mut acc, (pa, pb)| {
                    acc.accumulate_unchecked(&pa, &pb);
                    acc
                },
            )
            .reduce(
                || empty.clone(),
                |mut l, r| {
                    l += &r;
                    l
                },
            );
        histo.report();
        Ok(histo)
    }
}
