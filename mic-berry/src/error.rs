//! 运行时错误.

use crate::{Idx2d, Idx3d};
use thiserror::Error;

/// 直方图、标签压缩与 IoU 计算的运行时错误.
///
/// 越界标签不属于错误, 而是以 [`crate::LabelOutOfRange`] 诊断信息的形式返回.
#[derive(Debug, Clone, Error)]
pub enum MicError {
    /// 参与联合计算的两个体数据形状 `(z, h, w)` 不一致.
    #[error("体数据形状不一致: {left:?} vs {right:?}")]
    DimensionMismatch {
        /// 第一个 (真值) 体数据的形状.
        left: Idx3d,

        /// 第二个 (测试) 体数据的形状.
        right: Idx3d,
    },

    /// 边缘直方图的长度不足以覆盖联合直方图.
    #[error("边缘直方图长度 ({truth}, {test}) 无法覆盖联合直方图 {joint:?}")]
    MarginalMismatch {
        /// 联合直方图的形状 `(真值标签数, 测试标签数)`.
        joint: Idx2d,

        /// 真值一维直方图的长度.
        truth: usize,

        /// 测试一维直方图的长度.
        test: usize,
    },

    /// 最大标签过大, 无法确定直方图容量 `max_label + 1`.
    #[error("最大标签 {label} 过大, 无法作为直方图容量")]
    LabelTooLarge {
        /// 声明的最大标签.
        label: usize,
    },

    /// 压缩映射不满足 "背景 -> 背景, 前景按升序获得 1, 2, ..., k" 的性质.
    #[error("非法的标签压缩映射: 旧标签 {old} -> 新标签 {new}")]
    InvalidCompactionMap {
        /// 第一个违反性质的旧标签.
        old: usize,

        /// 其对应的新标签.
        new: usize,
    },

    /// 体数据不含任何切片.
    #[error("体数据不含任何切片")]
    EmptyVolume,

    /// 原始数据无法构成给定形状.
    #[error("原始数据无法构成给定形状: {0}")]
    Shape(#[from] ndarray::ShapeError),
}

/// 直方图 / IoU 计算运行时结果.
pub type MicResult<T> = Result<T, MicError>;
