//! 三种比较方式.
//!
//! - `sequential`: 逐体素顺序累加直方图, 在原始 (稀疏) 编号上计算 IoU.
//! - `parallel`: 按切片并行累加直方图, 在原始编号上计算 IoU.
//! - `compacted`: 先 (并行) 修正标签编号, 再并行比较. IoU 矩阵只与对象个数有关.

mod profile;

use mic_berry::prelude::*;
use utils::config::AblationConfig;

pub use profile::Profile;

/// 一种比较方式.
pub type Algo = fn(&AblationConfig, &LabelVolume<u32>, &LabelVolume<u32>) -> Profile;

/// 记录一轮比较的产出.
fn record(
    p: &mut Profile,
    ht: &Histogram1D,
    hs: &Histogram1D,
    joint: &JointHistogram2D,
    iou: &IouMatrix,
) {
    let (rows, cols) = iou.shape();
    let summary = MatchSummary::at_threshold(iou, ht, hs, DEFAULT_MATCH_THRESHOLD);
    p.record(
        rows * cols,
        joint.out_of_range() + ht.out_of_range() + hs.out_of_range(),
        summary.true_positives(),
        summary.mean_matched_iou(),
    );
}

pub fn sequential(
    cfg: &AblationConfig,
    truth: &LabelVolume<u32>,
    test: &LabelVolume<u32>,
) -> Profile {
    let mut p = Profile::new(cfg.voxels());
    let max_truth = truth.max_label().unwrap_or(BACKGROUND);
    let max_test = test.max_label().unwrap_or(BACKGROUND);

    for _ in 0..cfg.rounds {
        p.round_start();
        let ht = Histogram1D::build(truth, max_truth).expect("Label too large");
        let hs = Histogram1D::build(test, max_test).expect("Label too large");
        let joint = JointHistogram2D::build(truth, max_truth, test, max_test)
            .expect("Volume shape mismatch");
        let iou = IouMatrix::compute(&joint, &ht, &hs, DegeneratePolicy::Zero)
            .expect("Marginal histogram mismatch");
        p.round_elapsed();
        record(&mut p, &ht, &hs, &joint, &iou);
    }
    p.finish()
}

pub fn parallel(
    cfg: &AblationConfig,
    truth: &LabelVolume<u32>,
    test: &LabelVolume<u32>,
) -> Profile {
    let mut p = Profile::new(cfg.voxels());
    let max_truth = truth.max_label().unwrap_or(BACKGROUND);
    let max_test = test.max_label().unwrap_or(BACKGROUND);

    for _ in 0..cfg.rounds {
        p.round_start();
        let ht = Histogram1D::par_build(truth, max_truth).expect("Label too large");
        let hs = Histogram1D::par_build(test, max_test).expect("Label too large");
        let joint = JointHistogram2D::par_build(truth, max_truth, test, max_test)
            .expect("Volume shape mismatch");
        let iou = IouMatrix::compute(&joint, &ht, &hs, DegeneratePolicy::Zero)
            .expect("Marginal histogram mismatch");
        p.round_elapsed();
        record(&mut p, &ht, &hs, &joint, &iou);
    }
    p.finish()
}

pub fn compacted(
    cfg: &AblationConfig,
    truth: &LabelVolume<u32>,
    test: &LabelVolume<u32>,
) -> Profile {
    let mut p = Profile::new(cfg.voxels());

    for _ in 0..cfg.rounds {
        // 复制不计入比较时间.
        let mut truth = truth.clone();
        let mut test = test.clone();

        p.round_start();
        for v in [&mut truth, &mut test] {
            let max = v.max_label().unwrap_or(BACKGROUND);
            let map = CompactionMap::derive(
                &Histogram1D::par_build(&*v, max).expect("Label too large"),
            );
            map.par_apply(v);
        }
        let c =
            compare(&truth, &test, &CompareOptions::default()).expect("Volume shape mismatch");
        p.round_elapsed();
        record(&mut p, c.histo_truth(), c.histo_test(), c.joint(), c.iou());
    }
    p.finish()
}
