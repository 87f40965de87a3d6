use crate::Idx3d;

/// 切片优先、行优先的三维索引迭代器.
///
/// 虽然如下函数也能实现相同的功能:
///
/// ```
/// type Idx3d = (usize, usize, usize);
///
/// fn pos_iter_auto((z, h, w): Idx3d) -> impl Iterator<Item = Idx3d> {
///     (0..z).flat_map(move |a| (0..h).flat_map(move |b| (0..w).map(move |c| (a, b, c))))
/// }
///
/// // ...
/// ```
///
/// 但该迭代器对象占用的空间远大于手写的 `PosIter`. 因此为性能考虑,
/// 我们保留该结构.
#[derive(Debug, Clone)]
pub struct PosIter {
    cur: Idx3d,
    shape: Idx3d,
    remaining: usize,
}

impl PosIter {
    /// 以 `(z, h, w)` 形状初始化.
    #[inline]
    pub fn new(shape: Idx3d) -> Self {
        let (z, h, w) = shape;
        Self {
            cur: (0, 0, 0),
            shape,
            remaining: z * h * w,
        }
    }
}

impl Iterator for PosIter {
    type Item = Idx3d;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let ret_pos = self.cur;
        let (_, h, w) = self.shape;
        let (cz, ch, cw) = &mut self.cur;
        if *cw + 1 < w {
            *cw += 1;
        } else if *ch + 1 < h {
            *cw = 0;
            *ch += 1;
        } else {
            *cw = 0;
            *ch = 0;
            *cz += 1;
        }
        Some(ret_pos)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for PosIter {}
