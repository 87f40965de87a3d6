//! IoU (Intersection-over-Union) 矩阵.
//!
//! 由联合直方图和两个一维直方图计算:
//!
//! ```text
//! IoU(a, b) = joint[a, b] / (truth[a] + test[b] - joint[a, b])
//! ```
//!
//! 矩阵会遍历联合直方图的每一个单元, 与其稀疏程度无关.

use ndarray::{Array2, ArrayView2};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Histogram1D, Idx2d, JointHistogram2D, MicError, MicResult};

/// 分母为 0 (即 `a` 和 `b` 都不出现, 0/0) 时 IoU 的取值策略.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DegeneratePolicy {
    /// 记为 `0.0`: 不存在的对象之间没有重叠.
    #[default]
    Zero,

    /// 记为 `f64::NAN`, 交由调用方自行处理.
    Nan,
}

impl DegeneratePolicy {
    /// 该策略下 0/0 的取值.
    #[inline]
    pub const fn value(self) -> f64 {
        match self {
            Self::Zero => 0.0,
            Self::Nan => f64::NAN,
        }
    }
}

/// IoU 矩阵. 单元 `[[truth, test]]` 是真值标签 `truth`
/// 与测试标签 `test` 之间的 IoU, 取值范围为 `[0, 1]`.
/// 唯一的例外是 [`DegeneratePolicy::Nan`] 下的 0/0 单元, 其值为 NaN.
///
/// 该结构是只读的.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IouMatrix {
    scores: Array2<f64>,
    degenerate: usize,
    policy: DegeneratePolicy,
}

impl IouMatrix {
    /// 计算 IoU 矩阵. 结果形状与 `joint` 相同.
    ///
    /// 若 `histo_truth` 或 `histo_test` 的长度不足以覆盖 `joint` 的对应维度,
    /// 则返回 `Err(MicError::MarginalMismatch)`.
    pub fn compute(
        joint: &JointHistogram2D,
        histo_truth: &Histogram1D,
        histo_test: &Histogram1D,
        policy: DegeneratePolicy,
    ) -> MicResult<Self> {
        let (rows, cols) = joint.shape();
        if histo_truth.len() < rows || histo_test.len() < cols {
            return Err(MicError::MarginalMismatch {
                joint: (rows, cols),
                truth: histo_truth.len(),
                test: histo_test.len(),
            });
        }

        let cells = joint.cells();
        let mut degenerate = 0usize;
        let scores = Array2::from_shape_fn((rows, cols), |(a, b)| {
            let inter = cells[(a, b)];
            let union = (histo_truth[a] + histo_test[b]).saturating_sub(inter);
            if union == 0 {
                degenerate += 1;
                policy.value()
            } else {
                inter as f64 / union as f64
            }
        });

        if degenerate > 0 {
            log::debug!("IoU 矩阵 {rows}x{cols}: {degenerate} 个 0/0 单元, 按 {policy:?} 处理");
        }
        Ok(Self {
            scores,
            degenerate,
            policy,
        })
    }

    /// 真值标签 `truth` 与测试标签 `test` 之间的 IoU. 越界时返回 `None`.
    #[inline]
    pub fn get(&self, truth: usize, test: usize) -> Option<f64> {
        self.scores.get((truth, test)).copied()
    }

    /// 形状 `(真值标签数, 测试标签数)`.
    #[inline]
    pub fn shape(&self) -> Idx2d {
        self.scores.dim()
    }

    /// 获得数据的一份不可变 shallow copy.
    #[inline]
    pub fn scores(&self) -> ArrayView2<'_, f64> {
        self.scores.view()
    }

    /// 0/0 单元的个数.
    #[inline]
    pub fn degenerate_cells(&self) -> usize {
        self.degenerate
    }

    /// 计算时使用的 0/0 策略.
    #[inline]
    pub fn policy(&self) -> DegeneratePolicy {
        self.policy
    }

    /// 直接获得底层数据.
    #[inline]
    pub fn into_raw(self) -> Array2<f64> {
        self.scores
    }
}
