//! 基于 IoU 矩阵的对象匹配统计.
//!
//! 背景 (标签 0) 所在的行和列不参与匹配.

use std::cmp::Reverse;

use itertools::Itertools;
use ordered_float::OrderedFloat;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::consts::BACKGROUND;
use crate::{Histogram1D, IouMatrix};

/// 在 `(标签, IoU)` 序列中找到 IoU 最大且为正的一项.
/// NaN 被跳过; IoU 相同时取标签较小者.
fn best_of<I: Iterator<Item = (usize, f64)>>(it: I) -> Option<(usize, f64)> {
    it.filter(|&(_, v)| !v.is_nan() && v > 0.0)
        .max_by_key(|&(label, v)| (OrderedFloat(v), Reverse(label)))
}

/// 匹配实现块
impl IouMatrix {
    /// 与真值标签 `truth` 重叠最大的测试前景标签及其 IoU.
    ///
    /// `truth` 为背景、越界, 或与任何测试对象都没有重叠时返回 `None`.
    pub fn best_match_for_truth(&self, truth: usize) -> Option<(usize, f64)> {
        if truth == BACKGROUND || truth >= self.shape().0 {
            return None;
        }
        let scores = self.scores();
        best_of(scores.row(truth).iter().copied().enumerate().skip(1))
    }

    /// 与测试标签 `test` 重叠最大的真值前景标签及其 IoU.
    ///
    /// `test` 为背景、越界, 或与任何真值对象都没有重叠时返回 `None`.
    pub fn best_match_for_test(&self, test: usize) -> Option<(usize, f64)> {
        if test == BACKGROUND || test >= self.shape().1 {
            return None;
        }
        let scores = self.scores();
        best_of(scores.column(test).iter().copied().enumerate().skip(1))
    }
}

/// 给定 IoU 阈值下的匹配统计.
///
/// IoU **严格大于** 阈值的 `(真值, 测试)` 对按 IoU 降序贪心匹配,
/// 每个对象至多被匹配一次. 阈值不小于 0.5 时, 贪心匹配就是唯一的匹配.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MatchSummary {
    threshold: f64,
    matches: Vec<(usize, usize, f64)>,
    truth_objects: usize,
    test_objects: usize,
}

impl MatchSummary {
    /// 以阈值 `threshold` 统计匹配.
    ///
    /// 对象个数取自两个一维直方图中出现过的前景标签.
    ///
    /// 负数 (以及 NaN) 阈值按 0 处理: IoU 为 0 的标签对永远不构成匹配.
    pub fn at_threshold(
        iou: &IouMatrix,
        histo_truth: &Histogram1D,
        histo_test: &Histogram1D,
        threshold: f64,
    ) -> Self {
        let threshold = threshold.max(0.0);
        let (rows, cols) = iou.shape();
        let scores = iou.scores();
        let candidates = (1..rows)
            .cartesian_product(1..cols)
            .filter_map(|(a, b)| {
                let v = scores[(a, b)];
                // NaN 的比较结果恒为 false, 因此会被自然排除.
                (v > threshold).then_some((a, b, v))
            })
            .sorted_by_key(|&(a, b, v)| (Reverse(OrderedFloat(v)), a, b));

        let mut used_truth = vec![false; rows];
        let mut used_test = vec![false; cols];
        let mut matches = Vec::new();
        for (a, b, v) in candidates {
            if used_truth[a] || used_test[b] {
                continue;
            }
            used_truth[a] = true;
            used_test[b] = true;
            matches.push((a, b, v));
        }

        Self {
            threshold,
            matches,
            truth_objects: histo_truth.populated_labels().count(),
            test_objects: histo_test.populated_labels().count(),
        }
    }

    /// 匹配阈值.
    #[inline]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// 所有匹配对 `(真值标签, 测试标签, IoU)`, 按 IoU 降序排列.
    #[inline]
    pub fn matches(&self) -> &[(usize, usize, f64)] {
        &self.matches
    }

    /// 真正例: 成功匹配的对象对个数.
    #[inline]
    pub fn true_positives(&self) -> usize {
        self.matches.len()
    }

    /// 假正例: 未被匹配的测试对象个数.
    #[inline]
    pub fn false_positives(&self) -> usize {
        self.test_objects.saturating_sub(self.true_positives())
    }

    /// 假反例: 未被匹配的真值对象个数.
    #[inline]
    pub fn false_negatives(&self) -> usize {
        self.truth_objects.saturating_sub(self.true_positives())
    }

    /// `TP / (TP + FP)`. 不存在测试对象时返回 `None`.
    pub fn precision(&self) -> Option<f64> {
        ratio(
            self.true_positives(),
            self.true_positives() + self.false_positives(),
        )
    }

    /// `TP / (TP + FN)`. 不存在真值对象时返回 `None`.
    pub fn recall(&self) -> Option<f64> {
        ratio(
            self.true_positives(),
            self.true_positives() + self.false_negatives(),
        )
    }

    /// `2TP / (2TP + FP + FN)`. 两边都不存在对象时返回 `None`.
    pub fn f1(&self) -> Option<f64> {
        let tp2 = 2 * self.true_positives();
        ratio(tp2, tp2 + self.false_positives() + self.false_negatives())
    }

    /// 匹配对的平均 IoU. 没有匹配时返回 `None`.
    pub fn mean_matched_iou(&self) -> Option<f64> {
        match self.matches.len() {
            0 => None,
            n => Some(self.matches.iter().map(|m| m.2).sum::<f64>() / n as f64),
        }
    }
}

#[inline]
fn ratio(num: usize, den: usize) -> Option<f64> {
    (den > 0).then(|| num as f64 / den as f64)
}

#[cfg(test)]
mod tests {
    use super::MatchSummary;
    use crate::{DegeneratePolicy, Histogram1D, IouMatrix, JointHistogram2D, LabelVolume};
    use ndarray::array;

    fn f64_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    fn setup(
        truth: &LabelVolume<u8>,
        test: &LabelVolume<u8>,
    ) -> (IouMatrix, Histogram1D, Histogram1D) {
        let (mt, ms) = (truth.max_label().unwrap(), test.max_label().unwrap());
        let joint = JointHistogram2D::build(truth, mt, test, ms).unwrap();
        let ht = Histogram1D::build(truth, mt).unwrap();
        let hs = Histogram1D::build(test, ms).unwrap();
        let iou = IouMatrix::compute(&joint, &ht, &hs, DegeneratePolicy::Nan).unwrap();
        (iou, ht, hs)
    }

    #[test]
    fn test_best_match() {
        let truth = LabelVolume::from_plane(array![[1u8, 1, 1, 0, 2, 2]]);
        let test = LabelVolume::from_plane(array![[1u8, 1, 2, 0, 0, 0]]);
        let (iou, _, _) = setup(&truth, &test);

        let (label, v) = iou.best_match_for_truth(1).unwrap();
        assert_eq!(label, 1);
        assert!(f64_eq(v, 2.0 / 3.0));
        assert_eq!(iou.best_match_for_truth(2), None);
        assert_eq!(iou.best_match_for_truth(0), None);
        assert_eq!(iou.best_match_for_truth(9), None);

        let (label, v) = iou.best_match_for_test(2).unwrap();
        assert_eq!(label, 1);
        assert!(f64_eq(v, 1.0 / 3.0));
    }

    #[test]
    fn test_best_match_tie_prefers_lower_label() {
        let truth = LabelVolume::from_plane(array![[1u8, 1]]);
        let test = LabelVolume::from_plane(array![[2u8, 1]]);
        let (iou, _, _) = setup(&truth, &test);
        assert_eq!(iou.best_match_for_truth(1).map(|m| m.0), Some(1));
    }

    #[test]
    fn test_summary_counts() {
        // 真值对象: 1 (完全匹配), 2 (部分匹配), 3 (漏检).
        // 测试对象: 5 -> 1, 6 -> 2, 7 (误检).
        let truth = LabelVolume::from_plane(array![
            [1u8, 1, 0, 2, 2, 2, 2],
            [0, 0, 0, 3, 3, 0, 0]
        ]);
        let test = LabelVolume::from_plane(array![
            [5u8, 5, 0, 6, 6, 6, 0],
            [0, 0, 0, 0, 0, 7, 7]
        ]);
        let (iou, ht, hs) = setup(&truth, &test);

        let s = MatchSummary::at_threshold(&iou, &ht, &hs, 0.5);
        assert_eq!(s.true_positives(), 2);
        assert_eq!(s.false_positives(), 1);
        assert_eq!(s.false_negatives(), 1);
        assert_eq!(s.matches()[0], (1, 5, 1.0));
        assert_eq!((s.matches()[1].0, s.matches()[1].1), (2, 6));
        assert!(f64_eq(s.matches()[1].2, 0.75));
        assert!(f64_eq(s.precision().unwrap(), 2.0 / 3.0));
        assert!(f64_eq(s.recall().unwrap(), 2.0 / 3.0));
        assert!(f64_eq(s.f1().unwrap(), 2.0 / 3.0));
        assert!(f64_eq(s.mean_matched_iou().unwrap(), 0.875));

        let strict = MatchSummary::at_threshold(&iou, &ht, &hs, 0.8);
        assert_eq!(strict.true_positives(), 1);
        assert_eq!(strict.false_negatives(), 2);
    }

    #[test]
    fn test_summary_negative_threshold_clamped() {
        let truth = LabelVolume::from_plane(array![[1u8, 0, 0]]);
        let test = LabelVolume::from_plane(array![[0u8, 0, 2]]);
        let (mt, ms) = (truth.max_label().unwrap(), test.max_label().unwrap());
        let joint = JointHistogram2D::build(&truth, mt, &test, ms).unwrap();
        let ht = Histogram1D::build(&truth, mt).unwrap();
        let hs = Histogram1D::build(&test, ms).unwrap();
        let iou = IouMatrix::compute(&joint, &ht, &hs, DegeneratePolicy::Zero).unwrap();

        let s = MatchSummary::at_threshold(&iou, &ht, &hs, -1.0);
        assert_eq!(s.threshold(), 0.0);
        assert_eq!(s.true_positives(), 0);
        assert_eq!(s.false_positives(), 1);
        assert_eq!(s.false_negatives(), 1);
        assert_eq!(MatchSummary::at_threshold(&iou, &ht, &hs, f64::NAN).threshold(), 0.0);
    }

    #[test]
    fn test_summary_empty() {
        let truth = LabelVolume::from_plane(array![[0u8, 0]]);
        let test = LabelVolume::from_plane(array![[0u8, 0]]);
        let (iou, ht, hs) = setup(&truth, &test);
        let s = MatchSummary::at_threshold(&iou, &ht, &hs, 0.5);
        assert_eq!(s.true_positives(), 0);
        assert_eq!(s.precision(), None);
        assert_eq!(s.recall(), None);
        assert_eq!(s.f1(), None);
        assert_eq!(s.mean_matched_iou(), None);
    }
}
