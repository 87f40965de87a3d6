//! 标签体数据. 为单层 2D 图像和多层 3D 图像提供统一的体素访问方式.

use std::ops::{Index, IndexMut};

use ndarray::{Array2, Array3, ArrayView, ArrayViewMut, Axis, Ix3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Idx2d, Idx3d, MicError, MicResult};

mod iter;
mod plane;
mod sample;
mod signed16;

pub use iter::PosIter;
pub use plane::{LabelPlane, LabelPlaneMut};
pub use sample::Sample;
pub use signed16::{normalize_if_signed, normalize_signed16, SampleEncoding};

/// 标签体数据, 由深度至少为 1 的若干层等大的 2D 标签切片组成.
///
/// 数据按照 `(z, h, w)` 模式存储和访问. 样本类型 `T` 可以是任意原生数值类型,
/// 读取时统一转换为 `usize` 标签 (见 [`Sample`]).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LabelVolume<T> {
    data: Array3<T>,
}

impl<T> Index<Idx3d> for LabelVolume<T> {
    type Output = T;

    #[inline]
    fn index(&self, index: Idx3d) -> &Self::Output {
        &self.data[index]
    }
}

impl<T> IndexMut<Idx3d> for LabelVolume<T> {
    #[inline]
    fn index_mut(&mut self, index: Idx3d) -> &mut Self::Output {
        &mut self.data[index]
    }
}

impl<T: Sample> LabelVolume<T> {
    /// 从按 `(z, h, w)` 组织的数据创建体数据.
    ///
    /// 如果 `z == 0`, 则返回 `Err(MicError::EmptyVolume)`.
    pub fn new(data: Array3<T>) -> MicResult<Self> {
        if data.len_of(Axis(0)) == 0 {
            return Err(MicError::EmptyVolume);
        }
        Ok(Self { data })
    }

    /// 从单层 2D 图像 (按 `(h, w)` 组织) 创建深度为 1 的体数据.
    #[inline]
    pub fn from_plane(plane: Array2<T>) -> Self {
        Self {
            data: plane.insert_axis(Axis(0)),
        }
    }

    /// 从行优先的原始样本创建体数据. 形状与样本个数不符时返回 `Err`.
    pub fn from_shape_vec(shape: Idx3d, raw: Vec<T>) -> MicResult<Self> {
        Self::new(Array3::from_shape_vec(shape, raw)?)
    }

    /// 获取数据形状 `(z, h, w)`.
    #[inline]
    pub fn shape(&self) -> Idx3d {
        self.data.dim()
    }

    /// 获取单层切片形状 `(h, w)`.
    #[inline]
    pub fn plane_shape(&self) -> Idx2d {
        let (_, h, w) = self.shape();
        (h, w)
    }

    /// 获取切片层数.
    #[inline]
    pub fn depth(&self) -> usize {
        self.shape().0
    }

    /// 获取体素个数.
    #[inline]
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// 是否只有一层切片?
    #[inline]
    pub fn is_single_plane(&self) -> bool {
        self.depth() == 1
    }

    /// 检查索引是否合法.
    #[inline]
    pub fn check(&self, &(z0, h0, w0): &Idx3d) -> bool {
        let (z, h, w) = self.shape();
        z0 < z && h0 < h && w0 < w
    }

    /// 确认 `self` 与 `other` 的形状完全一致, 否则返回 `Err(MicError::DimensionMismatch)`.
    pub fn ensure_same_shape<U: Sample>(&self, other: &LabelVolume<U>) -> MicResult<()> {
        let (left, right) = (self.shape(), other.shape());
        if left == right {
            Ok(())
        } else {
            Err(MicError::DimensionMismatch { left, right })
        }
    }

    /// 获取给定体素的整数标签.
    ///
    /// 越界, 或样本无法转换为非负整数时返回 `None`.
    #[inline]
    pub fn get(&self, pos: Idx3d) -> Option<usize> {
        self.data.get(pos).and_then(|s| s.to_label())
    }

    /// 将给定体素设置为标签 `label`.
    ///
    /// 越界, 或 `label` 无法用 `T` 表示时不做修改, 并返回 `false`.
    pub fn set(&mut self, pos: Idx3d, label: usize) -> bool {
        match (self.data.get_mut(pos), T::from_label(label)) {
            (Some(pix), Some(v)) => {
                *pix = v;
                true
            }
            _ => false,
        }
    }

    /// 以切片优先、行优先、列优先的顺序迭代所有体素的整数标签.
    /// 每个体素恰好访问一次. 无法转换的样本产生 `None`.
    #[inline]
    pub fn labels(&self) -> impl ExactSizeIterator<Item = Option<usize>> + '_ {
        self.data.iter().map(|s| s.to_label())
    }

    /// 以与 [`Self::labels`] 相同的顺序迭代所有体素索引.
    #[inline]
    pub fn pos_iter(&self) -> PosIter {
        PosIter::new(self.shape())
    }

    /// 以与 [`Self::labels`] 相同的顺序迭代所有 `(索引, 标签)`.
    #[inline]
    pub fn indexed_labels(&self) -> impl Iterator<Item = (Idx3d, Option<usize>)> + '_ {
        self.data.indexed_iter().map(|(pos, s)| (pos, s.to_label()))
    }

    /// 全体数据统计: 获取最大的合法标签. 若没有任何合法标签, 则返回 `None`.
    #[inline]
    pub fn max_label(&self) -> Option<usize> {
        self.labels().flatten().max()
    }

    /// 获取标签为 `label` 的体素个数.
    #[inline]
    pub fn count(&self, label: usize) -> usize {
        self.labels().filter(|l| *l == Some(label)).count()
    }

    /// 获取第 `z_index` 层不可变切片.
    ///
    /// 当 `z_index` 越界时 panic.
    #[inline]
    pub fn plane_at(&self, z_index: usize) -> LabelPlane<'_, T> {
        LabelPlane::new(self.data.index_axis(Axis(0), z_index))
    }

    /// 获取第 `z_index` 层可变切片.
    ///
    /// 当 `z_index` 越界时 panic.
    #[inline]
    pub fn plane_at_mut(&mut self, z_index: usize) -> LabelPlaneMut<'_, T> {
        LabelPlaneMut::new(self.data.index_axis_mut(Axis(0), z_index))
    }

    /// 获取能按升序迭代不可变切片的迭代器.
    #[inline]
    pub fn plane_iter(&self) -> impl ExactSizeIterator<Item = LabelPlane<'_, T>> {
        self.data.axis_iter(Axis(0)).map(LabelPlane::new)
    }

    /// 获取能按升序迭代可变切片的迭代器.
    #[inline]
    pub fn plane_iter_mut(&mut self) -> impl ExactSizeIterator<Item = LabelPlaneMut<'_, T>> {
        self.data.axis_iter_mut(Axis(0)).map(LabelPlaneMut::new)
    }

    /// 获得数据的一份不可变 shallow copy.
    #[inline]
    pub fn data(&self) -> ArrayView<'_, T, Ix3> {
        self.data.view()
    }

    /// 获得数据的一份可变 shallow copy.
    #[inline]
    pub fn data_mut(&mut self) -> ArrayViewMut<'_, T, Ix3> {
        self.data.view_mut()
    }

    /// 直接获得底层数据.
    #[inline]
    pub fn into_raw(self) -> Array3<T> {
        self.data
    }
}

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        use rayon::iter::{IndexedParallelIterator, IntoParallelIterator, ParallelIterator};
    }
}

/// 并发操作部分
#[cfg(feature = "rayon")]
impl<T: Sample> LabelVolume<T> {
    /// 借助 `rayon`, 获取能并行迭代不可变切片的迭代器.
    #[inline]
    pub fn par_plane_iter(&self) -> impl IndexedParallelIterator<Item = LabelPlane<'_, T>> {
        self.data
            .axis_iter(Axis(0))
            .into_par_iter()
            .map(LabelPlane::new)
    }

    /// 借助 `rayon`, 获取能并行迭代可变切片的迭代器.
    #[inline]
    pub fn par_plane_iter_mut(
        &mut self,
    ) -> impl IndexedParallelIterator<Item = LabelPlaneMut<'_, T>> {
        self.data
            .axis_iter_mut(Axis(0))
            .into_par_iter()
            .map(LabelPlaneMut::new)
    }
}

#[cfg(test)]
mod tests {
    use super::LabelVolume;
    use crate::MicError;
    use ndarray::{array, Array3};

    #[test]
    fn test_empty_volume_rejected() {
        let err = LabelVolume::new(Array3::<u8>::zeros((0, 4, 4))).unwrap_err();
        assert!(matches!(err, MicError::EmptyVolume));
    }

    #[test]
    fn test_bad_raw_shape() {
        let err = LabelVolume::from_shape_vec((1, 2, 2), vec![0u8; 3]).unwrap_err();
        assert!(matches!(err, MicError::Shape(_)));
    }

    #[test]
    fn test_single_plane_is_depth_one() {
        let v = LabelVolume::from_plane(array![[1u16, 1], [0, 2]]);
        assert!(v.is_single_plane());
        assert_eq!(v.shape(), (1, 2, 2));
        assert_eq!(v.get((0, 0, 1)), Some(1));
        assert_eq!(v.get((0, 1, 1)), Some(2));
        assert_eq!(v.get((1, 0, 0)), None);
    }

    #[test]
    fn test_float_samples_truncate() {
        let v = LabelVolume::from_plane(array![[2.9f32, -0.5], [-3.0, f32::NAN]]);
        let labels: Vec<_> = v.labels().collect();
        assert_eq!(labels, vec![Some(2), Some(0), None, None]);
        assert_eq!(v.max_label(), Some(2));
    }

    #[test]
    fn test_traversal_is_total_and_ordered() {
        let raw: Vec<u32> = (0..24).collect();
        let v = LabelVolume::from_shape_vec((2, 3, 4), raw.clone()).unwrap();
        let labels: Vec<_> = v.labels().map(Option::unwrap).collect();
        assert_eq!(labels, raw.iter().map(|&x| x as usize).collect::<Vec<_>>());

        let positions: Vec<_> = v.pos_iter().collect();
        let indexed: Vec<_> = v.indexed_labels().map(|(p, _)| p).collect();
        assert_eq!(positions, indexed);
        assert_eq!(positions.len(), v.size());
    }

    #[test]
    fn test_set_and_shape_check() {
        let mut a = LabelVolume::new(Array3::<u8>::zeros((2, 2, 2))).unwrap();
        assert!(a.set((1, 1, 0), 7));
        assert!(!a.set((2, 0, 0), 7));
        assert!(!a.set((0, 0, 0), 300));
        assert_eq!(a.count(7), 1);
        assert_eq!(a[(1, 1, 0)], 7);

        let b = LabelVolume::new(Array3::<f32>::zeros((2, 2, 2))).unwrap();
        assert!(a.ensure_same_shape(&b).is_ok());

        let c = LabelVolume::new(Array3::<u8>::zeros((1, 2, 2))).unwrap();
        let err = a.ensure_same_shape(&c).unwrap_err();
        assert!(matches!(
            err,
            MicError::DimensionMismatch {
                left: (2, 2, 2),
                right: (1, 2, 2)
            }
        ));
    }
}
