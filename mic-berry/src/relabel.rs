//! 标签压缩: 将稀疏、不连续的标签编号重新映射为从 1 开始的稠密连续编号.
//!
//! 该过程被拆成可单独调用的四步:
//!
//! 1. [`LabelVolume::max_label`] 求最大标签;
//! 2. [`Histogram1D::build`] 统计一维直方图;
//! 3. [`CompactionMap::derive`] 推导压缩映射 (纯函数, 始终顺序执行);
//! 4. [`CompactionMap::apply`] 就地修改体数据.
//!
//! [`CompactionMap::of`] 串起前三步, [`correct_numbering`] 再加上第四步.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::consts::BACKGROUND;
use crate::volume::{LabelPlaneMut, LabelVolume, Sample};
use crate::{Histogram1D, MicError, MicResult};

/// 标签压缩映射. 以旧标签为索引, 值为新标签.
///
/// 性质:
///
/// 1. 背景永远映射到背景 (`map[0] == 0`);
/// 2. 出现过的前景标签按旧标签升序依次获得 `1, 2, ..., k`;
/// 3. 未出现的标签映射到 0.
///
/// 反序列化时会重新检查上述性质 (见 `TryFrom<Vec<usize>>`).
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(into = "Vec<usize>", try_from = "Vec<usize>")
)]
pub struct CompactionMap {
    map: Vec<usize>,
    distinct: usize,
}

impl CompactionMap {
    /// 从一维直方图推导压缩映射.
    ///
    /// 从索引 1 开始升序扫描, 每个计数为正的桶获得下一个新标签.
    pub fn derive(histo: &Histogram1D) -> Self {
        let mut map = vec![BACKGROUND; histo.len()];
        let mut value = BACKGROUND;
        for (old, &n) in histo.bins().iter().enumerate().skip(1) {
            if n > 0 {
                value += 1;
                map[old] = value;
            }
        }
        Self {
            map,
            distinct: value,
        }
    }

    /// 依次执行最大标签 -> 一维直方图 -> [`Self::derive`], 推导 `volume` 的压缩映射.
    ///
    /// 只读取体数据. 最大标签为 `usize::MAX` 时返回 `Err(MicError::LabelTooLarge)`.
    pub fn of<T: Sample>(volume: &LabelVolume<T>) -> MicResult<Self> {
        let max = volume.max_label().unwrap_or(BACKGROUND);
        let map = Self::derive(&Histogram1D::build(volume, max)?);
        log::debug!("标签压缩: 最大标签 {max}, 共 {} 个对象", map.distinct());
        Ok(map)
    }

    /// 旧标签 `old` 对应的新标签. 超出映射范围时返回 `None`.
    #[inline]
    pub fn get(&self, old: usize) -> Option<usize> {
        self.map.get(old).copied()
    }

    /// 映射长度, 即推导时直方图的长度.
    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// 映射是否为空?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// 出现过的前景标签个数 `k`, 同时也是最大的新标签.
    #[inline]
    pub fn distinct(&self) -> usize {
        self.distinct
    }

    /// 映射是否不改变任何出现过的标签? 即原标签已经是稠密的 `0..=k`.
    pub fn is_identity(&self) -> bool {
        self.map
            .iter()
            .enumerate()
            .all(|(old, &new)| new == old || new == BACKGROUND)
    }

    /// 以切片形式获得底层映射.
    #[inline]
    pub fn as_slice(&self) -> &[usize] {
        &self.map
    }

    /// 将映射就地应用到 `volume` 上, 返回整个体数据中出现的最大新标签.
    ///
    /// 旧标签超出映射范围 (或无法转换) 的体素被设置为背景.
    /// 调用后原有的标签编号即被丢弃.
    pub fn apply<T: Sample>(&self, volume: &mut LabelVolume<T>) -> usize {
        volume
            .plane_iter_mut()
            .map(|mut plane| plane.apply_map(self))
            .max()
            .unwrap_or(BACKGROUND)
    }
}

impl From<CompactionMap> for Vec<usize> {
    #[inline]
    fn from(map: CompactionMap) -> Self {
        map.map
    }
}

/// 检查映射性质: 非空, `map[0] == 0`, 非零的新标签按旧标签升序恰好为 `1, 2, ..., k`.
///
/// 满足这些性质的映射中, 新标签一定不大于旧标签.
impl TryFrom<Vec<usize>> for CompactionMap {
    type Error = MicError;

    fn try_from(map: Vec<usize>) -> MicResult<Self> {
        match map.first() {
            Some(&BACKGROUND) => {}
            first => {
                return Err(MicError::InvalidCompactionMap {
                    old: BACKGROUND,
                    new: first.copied().unwrap_or(BACKGROUND),
                })
            }
        }
        let mut distinct = BACKGROUND;
        for (old, &new) in map.iter().enumerate().skip(1) {
            if new == BACKGROUND {
                continue;
            }
            if new != distinct + 1 {
                return Err(MicError::InvalidCompactionMap { old, new });
            }
            distinct = new;
        }
        Ok(Self { map, distinct })
    }
}

/// 标签压缩实现块
impl<T: Sample> LabelPlaneMut<'_, T> {
    /// 将压缩映射就地应用到该切片上, 返回切片中出现的最大新标签.
    pub fn apply_map(&mut self, map: &CompactionMap) -> usize {
        let mut max = BACKGROUND;
        for pix in self.iter_mut() {
            let new = pix
                .to_label()
                .and_then(|old| map.get(old))
                .unwrap_or(BACKGROUND);
            // 所有构造途径都保证新标签不大于旧标签, 因此一定能用 `T` 表示.
            *pix = T::from_label(new).unwrap_or_else(|| unreachable!());
            max = max.max(new);
        }
        max
    }
}

/// 修正体数据的标签编号, 返回最大的新标签 (即前景对象个数).
///
/// 依次执行: 全体数据统计最大标签 -> 一维直方图 -> 推导压缩映射 -> 应用映射.
/// 对已经稠密编号的体数据, 该操作不产生任何修改.
///
/// 最大标签为 `usize::MAX` 时返回 `Err(MicError::LabelTooLarge)`, 体数据不被修改.
pub fn correct_numbering<T: Sample>(volume: &mut LabelVolume<T>) -> MicResult<usize> {
    let map = CompactionMap::of(volume)?;
    Ok(map.apply(volume))
}

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        use rayon::iter::ParallelIterator;
    }
}

/// 并发操作部分
#[cfg(feature = "rayon")]
impl CompactionMap {
    /// 借助 `rayon`, 按切片并行地将映射就地应用到 `volume` 上.
    ///
    /// 语义与 [`Self::apply`] 完全相同. 映射本身的推导仍然是顺序的.
    pub fn par_apply<T: Sample>(&self, volume: &mut LabelVolume<T>) -> usize {
        volume
            .par_plane_iter_mut()
            .map(|mut plane| plane.apply_map(self))
            .max()
            .unwrap_or(BACKGROUND)
    }
}
