use super::Sample;
use crate::consts::is_background;
use crate::Idx2d;
use ndarray::iter::{Iter, IterMut};
use ndarray::{ArrayView2, ArrayViewMut2, Ix2};
use std::ops::{Index, IndexMut};

/// 不可变、借用的二维标签切片.
pub struct LabelPlane<'a, T> {
    /// 底层数据的轻量级视图, 借用于 [`crate::LabelVolume`].
    data: ArrayView2<'a, T>,
}

impl<T> Index<Idx2d> for LabelPlane<'_, T> {
    type Output = T;

    #[inline]
    fn index(&self, index: Idx2d) -> &Self::Output {
        &self.data[index]
    }
}

/// 可变、借用的二维标签切片.
pub struct LabelPlaneMut<'a, T> {
    /// 底层数据的轻量级视图, 借用于 [`crate::LabelVolume`].
    data: ArrayViewMut2<'a, T>,
}

/// 可变方法集合.
impl<'a, T: Sample> LabelPlaneMut<'a, T> {
    /// 获得 **底层** 数据的一份可变 shallow copy.
    #[inline]
    pub fn array_view_mut(&mut self) -> ArrayViewMut2<T> {
        self.data.view_mut()
    }

    /// 获取可以迭代并修改像素样本的迭代器.
    #[inline]
    pub fn iter_mut(&mut self) -> IterMut<'_, T, Ix2> {
        self.data.iter_mut()
    }

    /// 将给定位置 (高, 宽) 设置为标签 `label`.
    ///
    /// 越界, 或 `label` 无法用 `T` 表示时不做修改, 并返回 `false`.
    pub fn set(&mut self, pos: Idx2d, label: usize) -> bool {
        match (self.data.get_mut(pos), T::from_label(label)) {
            (Some(pix), Some(v)) => {
                *pix = v;
                true
            }
            _ => false,
        }
    }
}

impl<T> Index<Idx2d> for LabelPlaneMut<'_, T> {
    type Output = T;

    #[inline]
    fn index(&self, index: Idx2d) -> &Self::Output {
        &self.data[index]
    }
}

impl<T> IndexMut<Idx2d> for LabelPlaneMut<'_, T> {
    #[inline]
    fn index_mut(&mut self, index: Idx2d) -> &mut Self::Output {
        &mut self.data[index]
    }
}

/// 不可变方法集合.
macro_rules! impl_label_plane_immut {
    ($life: lifetime, $plane: ty, $array: ty) => {
        /// 不可变方法集合.
        impl<$life, T: Sample> $plane {
            /// 直接初始化.
            #[inline]
            pub(crate) fn new(data: $array) -> Self {
                Self { data }
            }

            /// 获得 **底层** 数据的一份不可变 shallow copy.
            #[inline]
            pub fn array_view(&self) -> ArrayView2<T> {
                self.data.view()
            }

            /// 获取可以迭代像素样本的迭代器.
            #[inline]
            pub fn iter(&self) -> Iter<'_, T, Ix2> {
                self.data.iter()
            }

            /// 以行优先规则迭代所有像素的整数标签. 无法转换的样本产生 `None`.
            #[inline]
            pub fn labels(&self) -> impl ExactSizeIterator<Item = Option<usize>> + '_ {
                self.data.iter().map(|s| s.to_label())
            }

            /// 获取给定位置 (高, 宽) 的整数标签. 越界或无法转换时返回 `None`.
            #[inline]
            pub fn get(&self, pos: Idx2d) -> Option<usize> {
                self.data.get(pos).and_then(|s| s.to_label())
            }

            /// 图像的分辨率 (高, 宽).
            #[inline]
            pub fn shape(&self) -> Idx2d {
                self.data.dim()
            }

            /// 图像的像素个数.
            #[inline]
            pub fn size(&self) -> usize {
                let (h, w) = self.shape();
                h * w
            }

            /// 获得图像的高.
            #[inline]
            pub fn height(&self) -> usize {
                self.shape().0
            }

            /// 获得图像的宽.
            #[inline]
            pub fn width(&self) -> usize {
                self.shape().1
            }

            /// 判断一个索引是否合法 (未越界).
            #[inline]
            pub fn check(&self, (h, w): Idx2d) -> bool {
                let (h_len, w_len) = self.shape();
                h < h_len && w < w_len
            }

            /// 该图是否为全背景图?
            #[inline]
            pub fn is_background(&self) -> bool {
                self.labels().all(|l| l.is_some_and(is_background))
            }

            /// 统计图像中标签为 `label` 的像素总个数.
            #[inline]
            pub fn count(&self, label: usize) -> usize {
                self.labels().filter(|l| *l == Some(label)).count()
            }

            /// 获取图像中最大的合法标签. 若没有任何合法标签, 则返回 `None`.
            #[inline]
            pub fn max_label(&self) -> Option<usize> {
                self.labels().flatten().max()
            }

            /// 获得一份不可变的 **本体** shallow copy.
            #[inline]
            pub fn shallow_copy(&self) -> LabelPlane<'_, T> {
                LabelPlane {
                    data: self.array_view(),
                }
            }
        }
    };
}

impl_label_plane_immut!('a, LabelPlane<'a, T>, ArrayView2<'a, T>);
impl_label_plane_immut!('a, LabelPlaneMut<'a, T>, ArrayViewMut2<'a, T>);

#[cfg(test)]
mod tests {
    use crate::LabelVolume;
    use ndarray::{array, Array3};

    #[test]
    fn test_plane_views() {
        let raw = Array3::from_shape_vec((2, 2, 3), vec![0u8, 1, 1, 0, 2, 2, 0, 0, 0, 0, 0, 0])
            .unwrap();
        let mut v = LabelVolume::new(raw).unwrap();
        assert_eq!(v.plane_iter().len(), 2);

        let p0 = v.plane_at(0);
        assert_eq!(p0.shape(), (2, 3));
        assert_eq!(p0.count(2), 2);
        assert_eq!(p0.max_label(), Some(2));
        assert!(!p0.is_background());
        assert!(v.plane_at(1).is_background());

        let mut p1 = v.plane_at_mut(1);
        assert!(p1.set((1, 2), 5));
        assert!(!p1.set((2, 0), 5));
        assert_eq!(p1.get((1, 2)), Some(5));
        assert_eq!(p1.shallow_copy().max_label(), Some(5));
        assert_eq!(v.get((1, 1, 2)), Some(5));
    }

    #[test]
    fn test_plane_index() {
        let mut v = LabelVolume::from_plane(array![[1u32, 2], [3, 4]]);
        let mut p = v.plane_at_mut(0);
        p[(0, 1)] = 9;
        assert_eq!(p[(0, 1)], 9);
        assert_eq!(v.plane_at(0)[(0, 1)], 9);
    }
}
