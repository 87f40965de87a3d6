//! 程序运行函数.

use crate::algos::{self, Algo};
use crate::result::AblationResult;
use utils::config::AblationConfig;
use utils::phantom;

/// 实际运行.
pub fn run() -> AblationResult {
    let cfg = AblationConfig::from_env_or_default();
    let (z, h, w) = cfg.shape;
    log::info!("Ablation config: {cfg:?}");

    let (truth, test) = phantom::block_pair(cfg.shape, cfg.labels).expect("Phantom building error");

    println!(
        "Running ablation studies on {z}x{h}x{w} with {} cpus...",
        utils::cpus()
    );

    // 依次运行, 避免并行算法之间互相争抢核心.
    let studies: [(&'static str, Algo); 3] = [
        ("sequential", algos::sequential),
        ("parallel", algos::parallel),
        ("compacted", algos::compacted),
    ];
    AblationResult::from_iter(
        studies
            .into_iter()
            .map(|(name, t)| (name, t(&cfg, &truth, &test))),
    )
}
