//! 合成标签体数据. 不依赖磁盘上的任何数据集.
//!
//! 体数据由等大的方块组成, 方块边缘为背景. 测试体数据相对真值沿宽度方向偏移一个体素,
//! 且两者都使用稀疏编号 (真值为 3 的倍数, 测试为 5 的倍数).

use mic_berry::{Idx3d, LabelVolume, MicResult};
use ndarray::Array3;

/// 真值标签的编号步长.
const TRUTH_STRIDE: u32 = 3;

/// 测试标签的编号步长.
const TEST_STRIDE: u32 = 5;

/// 生成形状为 `shape`, 约含 `labels` 个对象的 `(真值, 测试)` 体数据对.
pub fn block_pair(shape: Idx3d, labels: usize) -> MicResult<(LabelVolume<u32>, LabelVolume<u32>)> {
    let labels = labels.max(1);
    let side = block_side(shape, labels);
    let truth = blocks(shape, side, labels, 0, TRUTH_STRIDE)?;
    let test = blocks(shape, side, labels, 1, TEST_STRIDE)?;
    Ok((truth, test))
}

/// 让每层切片大约容纳 `labels` 个方块.
fn block_side((_, h, w): Idx3d, labels: usize) -> usize {
    let area = (h * w / labels).max(4);
    ((area as f64).sqrt() as usize).max(2)
}

fn blocks(
    shape: Idx3d,
    side: usize,
    labels: usize,
    shift: usize,
    stride: u32,
) -> MicResult<LabelVolume<u32>> {
    let per_row = shape.2.div_ceil(side) + 1;
    let data = Array3::from_shape_fn(shape, |(k, i, j)| {
        let j = j + shift;
        if i % side == 0 || j % side == 0 {
            return 0;
        }
        let id = (k / side * 7 + i / side * per_row + j / side) % labels + 1;
        id as u32 * stride
    });
    LabelVolume::new(data)
}
