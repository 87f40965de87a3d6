#![warn(missing_docs)] // <= 合适时移除它.
// #![warn(clippy::missing_docs_in_private_items)]  // <= too strict.

//! 核心库. 比较两份分割标签体数据 (真值 vs 测试), 计算所有标签对之间的
//! IoU (Intersection-over-Union) 矩阵, 并将稀疏、不连续的标签编号压缩为稠密连续编号.
//!
//! 该 crate 目前仅提供 `safe` 接口.
//!
//! # 注意
//!
//! 1. 该 crate 不负责读取任何图像文件格式. 调用方需要先把标签图像解码成
//!   [`ndarray::Array3`] (或单层的 [`ndarray::Array2`]), 再交给 [`LabelVolume`].
//! 2. 标签值必须是非负整数 (或值为整数的浮点数). 0 代表背景.
//! 3. 浮点样本按照 **向零截断** 的规则转换为整数标签. 负数和 NaN 被视为越界样本.
//!
//! # 开发计划
//!
//! ### 统一的单层/多层标签体数据视图 ✅
//!
//! 单层 2D 图像被视为深度为 1 的 3D 体数据, 不再区分两套代码路径.
//!
//! 实现位于 `mic-berry/src/volume`.
//!
//! ### 一维占用直方图 & 二维联合直方图 ✅
//!
//! 越界标签不会被悄悄丢弃: 每次调用统计一次越界体素数, 并以
//! [`LabelOutOfRange`] 的形式交还给调用方.
//!
//! 实现位于 `mic-berry/src/histogram`.
//!
//! ### 标签压缩 (重新编号) ✅
//!
//! 推导压缩映射和就地应用映射是两个独立的步骤,
//! [`correct_numbering`] 只是把它们串起来.
//!
//! 实现位于 `mic-berry/src/relabel.rs`.
//!
//! ### IoU 矩阵 ✅
//!
//! 0/0 的情况由 [`DegeneratePolicy`] 显式决定, 默认记为 `0.0`.
//!
//! 实现位于 `mic-berry/src/iou.rs`.
//!
//! ### 匹配统计 ✅
//!
//! 基于 IoU 阈值的 TP/FP/FN, 以及 precision/recall/F1.
//!
//! 实现位于 `mic-berry/src/metrics.rs`.
//!
//! ### 多线程直方图累加 ✅
//!
//! 开启 `rayon` feature 后, 按切片分别累加, 最后逐元素相加合并.
//! 标签压缩映射的推导始终是顺序的.
//!
//! ### 有符号 16 位像素编码修正 ✅
//!
//! 供图像加载层使用的预处理步骤, 不属于直方图/IoU 核心.
//!
//! 实现位于 `mic-berry/src/volume/signed16.rs`.

/// 二维索引 `(h, w)`, 同时也可一定程度上用作非负整数向量.
pub type Idx2d = (usize, usize);

/// 三维索引 `(z, h, w)`, 同时也可一定程度上用作非负整数向量.
pub type Idx3d = (usize, usize, usize);

pub mod consts;

mod error;

pub mod volume;

pub mod histogram;

pub mod relabel;

pub mod iou;

pub mod compare;

pub mod metrics;

pub mod prelude;

pub use error::{MicError, MicResult};

pub use volume::{
    normalize_if_signed, normalize_signed16, LabelPlane, LabelPlaneMut, LabelVolume, Sample,
    SampleEncoding,
};

pub use histogram::{Histogram1D, JointHistogram2D, LabelOutOfRange};

pub use relabel::{correct_numbering, CompactionMap};

pub use iou::{DegeneratePolicy, IouMatrix};

pub use compare::{compact_and_compare, compare, CompareOptions, Comparison};

pub use metrics::MatchSummary;
