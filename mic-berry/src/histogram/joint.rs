use std::ops::AddAssign;

use ndarray::{s, Array2, ArrayView2, Axis};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{capacity, diagnostic_of, LabelOutOfRange};
use crate::volume::{LabelPlane, LabelVolume, Sample};
use crate::{Idx2d, MicError, MicResult};

/// 二维联合直方图. 单元 `[[a, b]]` 是第一个体数据标签为 `a`
/// 且第二个体数据在同一位置标签为 `b` 的体素个数.
///
/// 形状恒为 `(max_a + 1, max_b + 1)`.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct JointHistogram2D {
    cells: Array2<u64>,
    out_of_range: u64,
}

impl JointHistogram2D {
    /// 创建形状为 `(max_a + 1, max_b + 1)` 的空联合直方图.
    ///
    /// 任一最大标签为 `usize::MAX` 时返回 `Err(MicError::LabelTooLarge)`.
    #[inline]
    pub fn zeros(max_a: usize, max_b: usize) -> MicResult<Self> {
        Ok(Self {
            cells: Array2::zeros((capacity(max_a)?, capacity(max_b)?)),
            out_of_range: 0,
        })
    }

    /// 统计 `a` 和 `b` 的联合直方图.
    ///
    /// 两者形状 `(z, h, w)` 不一致时返回 `Err(MicError::DimensionMismatch)`,
    /// 不产生任何部分结果.
    ///
    /// 任一标签超出声明范围的体素位置会被排除并计数, 与 [`super::Histogram1D::build`]
    /// 的处理方式一致. 一般情况下 `max_a`/`max_b` 取各自体数据的最大标签,
    /// 此时不会出现越界.
    pub fn build<A: Sample, B: Sample>(
        a: &LabelVolume<A>,
        max_a: usize,
        b: &LabelVolume<B>,
        max_b: usize,
    ) -> MicResult<Self> {
        a.ensure_same_shape(b)?;
        let mut histo = Self::zeros(max_a, max_b)?;
        for (pa, pb) in a.plane_iter().zip(b.plane_iter()) {
            histo.accumulate_unchecked(&pa, &pb);
        }
        histo.report();
        Ok(histo)
    }

    /// 将一对同形状切片累加进联合直方图. 不输出日志.
    ///
    /// 两个切片形状不一致时返回 `Err(MicError::DimensionMismatch)`
    /// (形状记为深度 1 的体数据), 直方图不做任何修改.
    pub fn accumulate<A: Sample, B: Sample>(
        &mut self,
        a: &LabelPlane<'_, A>,
        b: &LabelPlane<'_, B>,
    ) -> MicResult<()> {
        let ((ha, wa), (hb, wb)) = (a.shape(), b.shape());
        if (ha, wa) != (hb, wb) {
            return Err(MicError::DimensionMismatch {
                left: (1, ha, wa),
                right: (1, hb, wb),
            });
        }
        self.accumulate_unchecked(a, b);
        Ok(())
    }

    /// 调用方已保证两个切片形状一致.
    pub(crate) fn accumulate_unchecked<A: Sample, B: Sample>(
        &mut self,
        a: &LabelPlane<'_, A>,
        b: &LabelPlane<'_, B>,
    ) {
        for pair in a.labels().zip(b.labels()) {
            match pair {
                (Some(la), Some(lb)) => match self.cells.get_mut((la, lb)) {
                    Some(cell) => *cell += 1,
                    None => self.out_of_range += 1,
                },
                _ => self.out_of_range += 1,
            }
        }
    }

    /// 若存在越界体素, 输出一次警告.
    pub(crate) fn report(&self) {
        if let Some(d) = self.diagnostic() {
            log::warn!("联合直方图 (形状 {:?}): {d}", self.shape());
        }
    }

    /// 形状 `(max_a + 1, max_b + 1)`.
    #[inline]
    pub fn shape(&self) -> Idx2d {
        self.cells.dim()
    }

    /// 标签对 `(a, b)` 的共现体素个数. 超出范围时返回 0.
    #[inline]
    pub fn get(&self, a: usize, b: usize) -> u64 {
        self.cells.get((a, b)).copied().unwrap_or(0)
    }

    /// 获得数据的一份不可变 shallow copy.
    #[inline]
    pub fn cells(&self) -> ArrayView2<'_, u64> {
        self.cells.view()
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
        self.cells.sum()
    }

    /// 按行、列求和得到的两个边缘分布 `(a 的分布, b 的分布)`.
    ///
    /// 没有越界体素时, 它们与两个体数据各自的一维直方图相同.
    pub fn marginals(&self) -> (Vec<u64>, Vec<u64>) {
        (
            self.cells.sum_axis(Axis(1)).to_vec(),
            self.cells.sum_axis(Axis(0)).to_vec(),
        )
    }

    /// 直接获得底层数据.
    #[inline]
    pub fn into_raw(self) -> Array2<u64> {
        self.cells
    }
}

/// 逐元素相加合并. 两者形状不同时, 结果在每个方向上取较大者.
impl AddAssign<&JointHistogram2D> for JointHistogram2D {
    fn add_assign(&mut self, rhs: &JointHistogram2D) {
        let (lr, lc) = self.shape();
        let (rr, rc) = rhs.shape();
        if rr > lr || rc > lc {
            let mut grown = Array2::<u64>::zeros((lr.max(rr), lc.max(rc)));
            grown.slice_mut(s![..lr, ..lc]).assign(&self.cells);
            self.cells = grown;
        }
        let mut dst = self.cells.slice_mut(s![..rr, ..rc]);
        dst += &rhs.cells;
        self.out_of_range += rhs.out_of_range;
    }
}

#[cfg(test)]
mod tests {
    use super::JointHistogram2D;
    use crate::{Histogram1D, LabelVolume, MicError};
    use ndarray::{array, Array3};

    #[test]
    fn test_joint_basic() {
        let truth = LabelVolume::from_plane(array![[1u8, 1], [0, 2]]);
        let test = LabelVolume::from_plane(array![[1u8, 0], [0, 2]]);
        let j = JointHistogram2D::build(&truth, 2, &test, 2).unwrap();
        assert_eq!(
            j.cells(),
            array![[1u64, 0, 0], [1, 1, 0], [0, 0, 1]].view()
        );
        assert_eq!(j.get(1, 1), 1);
        assert_eq!(j.get(1, 0), 1);
        assert_eq!(j.get(2, 2), 1);
        assert_eq!(j.get(5, 5), 0);
        assert_eq!(j.total(), 4);
    }

    #[test]
    fn test_joint_dimension_mismatch() {
        let a = LabelVolume::new(Array3::<u8>::zeros((2, 3, 3))).unwrap();
        let b = LabelVolume::new(Array3::<u8>::zeros((1, 3, 3))).unwrap();
        let err = JointHistogram2D::build(&a, 0, &b, 0).unwrap_err();
        assert!(matches!(err, MicError::DimensionMismatch { .. }));
    }

    /// 每个体素恰好贡献一次计数, 且边缘分布与一维直方图一致.
    #[test]
    fn test_joint_total_and_marginals() {
        let raw_a: Vec<u16> = (0..60).map(|i| (i % 7) as u16).collect();
        let raw_b: Vec<f32> = (0..60).map(|i| ((i / 4) % 5) as f32).collect();
        let a = LabelVolume::from_shape_vec((3, 4, 5), raw_a).unwrap();
        let b = LabelVolume::from_shape_vec((3, 4, 5), raw_b).unwrap();
        let (ma, mb) = (a.max_label().unwrap(), b.max_label().unwrap());

        let j = JointHistogram2D::build(&a, ma, &b, mb).unwrap();
        assert_eq!(j.shape(), (7, 5));
        assert_eq!(j.total(), a.size() as u64);
        assert_eq!(j.diagnostic(), None);

        let (row, col) = j.marginals();
        assert_eq!(row, Histogram1D::build(&a, ma).unwrap().into_raw());
        assert_eq!(col, Histogram1D::build(&b, mb).unwrap().into_raw());
    }

    #[test]
    fn test_joint_undersized_capacity() {
        let a = LabelVolume::from_plane(array![[0u8, 1, 4]]);
        let b = LabelVolume::from_plane(array![[0u8, 3, 1]]);
        let j = JointHistogram2D::build(&a, 1, &b, 1).unwrap();
        assert_eq!(j.out_of_range(), 2);
        assert_eq!(j.total() + j.out_of_range(), 3);
    }

    /// 形状不一致的切片对不会产生部分计数.
    #[test]
    fn test_joint_accumulate_plane_mismatch() {
        let a = LabelVolume::from_plane(array![[1u8, 1, 1]]);
        let b = LabelVolume::from_plane(array![[1u8, 1], [1, 1]]);
        let mut j = JointHistogram2D::zeros(1, 1).unwrap();
        let err = j.accumulate(&a.plane_at(0), &b.plane_at(0)).unwrap_err();
        assert!(matches!(
            err,
            MicError::DimensionMismatch {
                left: (1, 1, 3),
                right: (1, 2, 2)
            }
        ));
        assert_eq!(j.total() + j.out_of_range(), 0);

        let c = LabelVolume::from_plane(array![[1u8, 0, 1]]);
        j.accumulate(&a.plane_at(0), &c.plane_at(0)).unwrap();
        assert_eq!(j.get(1, 1), 2);
        assert_eq!(j.get(1, 0), 1);
    }

    #[test]
    fn test_joint_capacity_overflow() {
        assert!(matches!(
            JointHistogram2D::zeros(3, usize::MAX),
            Err(MicError::LabelTooLarge { label: usize::MAX })
        ));
        let a = LabelVolume::from_plane(array![[0usize, usize::MAX]]);
        let b = LabelVolume::from_plane(array![[0u8, 1]]);
        assert!(JointHistogram2D::build(&a, usize::MAX, &b, 1).is_err());
    }

    #[test]
    fn test_joint_merge_grows() {
        let mut l = JointHistogram2D::zeros(0, 1).unwrap();
        let a = LabelVolume::from_plane(array![[2u8, 0]]);
        let b = LabelVolume::from_plane(array![[0u8, 0]]);
        let r = JointHistogram2D::build(&a, 2, &b, 0).unwrap();
        l += &r;
        assert_eq!(l.shape(), (3, 2));
        assert_eq!(l.get(2, 0), 1);
        assert_eq!(l.get(0, 0), 1);
    }
}
