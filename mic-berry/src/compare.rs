//! 两份标签体数据的完整比较流程.
//!
//! 形状检查 -> (可选) 标签压缩 -> 各自的最大标签 -> 两个一维直方图
//! -> 联合直方图 -> IoU 矩阵.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::consts::{BACKGROUND, DEFAULT_MATCH_THRESHOLD};
use crate::volume::{LabelVolume, Sample};
use crate::{
    CompactionMap, DegeneratePolicy, Histogram1D, IouMatrix, JointHistogram2D, MatchSummary,
    MicResult,
};

/// 比较选项.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CompareOptions {
    /// IoU 为 0/0 时的取值策略.
    pub degenerate: DegeneratePolicy,

    /// [`Comparison::summary`] 使用的匹配阈值.
    pub match_threshold: f64,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            degenerate: DegeneratePolicy::default(),
            match_threshold: DEFAULT_MATCH_THRESHOLD,
        }
    }
}

impl CompareOptions {
    /// 设置 0/0 策略.
    #[inline]
    pub fn with_degenerate(mut self, policy: DegeneratePolicy) -> Self {
        self.degenerate = policy;
        self
    }

    /// 设置匹配阈值.
    #[inline]
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.match_threshold = threshold;
        self
    }
}

/// 一次比较的全部产物.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Comparison {
    histo_truth: Histogram1D,
    histo_test: Histogram1D,
    joint: JointHistogram2D,
    iou: IouMatrix,
    threshold: f64,
}

impl Comparison {
    /// 真值的一维直方图.
    #[inline]
    pub fn histo_truth(&self) -> &Histogram1D {
        &self.histo_truth
    }

    /// 测试的一维直方图.
    #[inline]
    pub fn histo_test(&self) -> &Histogram1D {
        &self.histo_test
    }

    /// 联合直方图.
    #[inline]
    pub fn joint(&self) -> &JointHistogram2D {
        &self.joint
    }

    /// IoU 矩阵.
    #[inline]
    pub fn iou(&self) -> &IouMatrix {
        &self.iou
    }

    /// 真值的最大标签.
    #[inline]
    pub fn max_truth(&self) -> usize {
        self.histo_truth.max_label()
    }

    /// 测试的最大标签.
    #[inline]
    pub fn max_test(&self) -> usize {
        self.histo_test.max_label()
    }

    /// 以比较选项中的阈值统计匹配.
    #[inline]
    pub fn summary(&self) -> MatchSummary {
        self.summary_at(self.threshold)
    }

    /// 以任意阈值统计匹配.
    #[inline]
    pub fn summary_at(&self, threshold: f64) -> MatchSummary {
        MatchSummary::at_threshold(&self.iou, &self.histo_truth, &self.histo_test, threshold)
    }

    /// 拆分为 `(真值直方图, 测试直方图, 联合直方图, IoU 矩阵)`.
    #[inline]
    pub fn into_parts(self) -> (Histogram1D, Histogram1D, JointHistogram2D, IouMatrix) {
        (self.histo_truth, self.histo_test, self.joint, self.iou)
    }
}

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        #[inline]
        fn histo_1d<T: Sample>(v: &LabelVolume<T>, max: usize) -> MicResult<Histogram1D> {
            Histogram1D::par_build(v, max)
        }

        #[inline]
        fn histo_2d<A: Sample, B: Sample>(
            a: &LabelVolume<A>,
            max_a: usize,
            b: &LabelVolume<B>,
            max_b: usize,
        ) -> MicResult<JointHistogram2D> {
            JointHistogram2D::par_build(a, max_a, b, max_b)
        }
    } else {
        #[inline]
        fn histo_1d<T: Sample>(v: &LabelVolume<T>, max: usize) -> MicResult<Histogram1D> {
            Histogram1D::build(v, max)
        }

        #[inline]
        fn histo_2d<A: Sample, B: Sample>(
            a: &LabelVolume<A>,
            max_a: usize,
            b: &LabelVolume<B>,
            max_b: usize,
        ) -> MicResult<JointHistogram2D> {
            JointHistogram2D::build(a, max_a, b, max_b)
        }
    }
}

/// 比较真值 `truth` 与测试 `test`.
///
/// 直方图容量取各自体数据的最大标签 (没有合法标签时取 0).
/// 两者形状不一致时返回 `Err(MicError::DimensionMismatch)`;
/// 任一最大标签为 `usize::MAX` 时返回 `Err(MicError::LabelTooLarge)`.
pub fn compare<A: Sample, B: Sample>(
    truth: &LabelVolume<A>,
    test: &LabelVolume<B>,
    options: &CompareOptions,
) -> MicResult<Comparison> {
    truth.ensure_same_shape(test)?;

    let max_truth = truth.max_label().unwrap_or(BACKGROUND);
    let max_test = test.max_label().unwrap_or(BACKGROUND);

    let histo_truth = histo_1d(truth, max_truth)?;
    let histo_test = histo_1d(test, max_test)?;
    let joint = histo_2d(truth, max_truth, test, max_test)?;
    let iou = IouMatrix::compute(&joint, &histo_truth, &histo_test, options.degenerate)?;

    log::debug!(
        "比较完成: 形状 {:?}, 真值最大标签 {max_truth}, 测试最大标签 {max_test}",
        truth.shape()
    );
    Ok(Comparison {
        histo_truth,
        histo_test,
        joint,
        iou,
        threshold: options.match_threshold,
    })
}

/// 先分别修正 `truth` 和 `test` 的标签编号, 再比较.
///
/// 压缩后 IoU 矩阵的尺寸只取决于对象个数, 与原始编号无关.
/// 形状检查和两个压缩映射的推导都在修改任何数据之前完成:
/// 任一步骤出错时两者都不会被修改.
pub fn compact_and_compare<A: Sample, B: Sample>(
    truth: &mut LabelVolume<A>,
    test: &mut LabelVolume<B>,
    options: &CompareOptions,
) -> MicResult<Comparison> {
    truth.ensure_same_shape(test)?;
    let map_truth = CompactionMap::of(truth)?;
    let map_test = CompactionMap::of(test)?;
    map_truth.apply(truth);
    map_test.apply(test);
    compare(truth, test, options)
}
