//! 算法运行统计.

use std::time::{Duration, Instant};

/// ablation/benchmark 计时器.
///
/// 该计时器支持 "中途中断" 与 "结束中断, 继续开始计时".
#[derive(Clone, Debug)]
struct AccTimer {
    consumed: Duration,
    since: Instant,
}

impl AccTimer {
    /// 初始化计时器. 初始化时会视为已经开始计时 (`self.start()`).
    #[inline]
    pub fn new() -> Self {
        Self {
            consumed: Duration::ZERO,
            since: Instant::now(),
        }
    }

    /// 开始计时.
    #[inline]
    pub fn start(&mut self) {
        self.since = Instant::now();
    }

    /// 结束计时, 并将这一区间的时间累加. 返回本轮计时时长.
    ///
    /// # 注意
    ///
    /// 上一次调用必须是 `self.start()`, 否则计算时间值无意义.
    #[inline]
    pub fn elapsed(&mut self) -> Duration {
        let d = self.since.elapsed();
        self.consumed += d;
        d
    }

    /// 获得总共累计下来的时间综合 (以微秒为单位).
    #[inline]
    pub fn get_total_us(&self) -> u64 {
        self.consumed.as_micros() as u64
    }
}

impl Default for AccTimer {
    fn default() -> Self {
        Self::new()
    }
}

/// ablation/benchmark 数据统计.
#[derive(Clone, Debug)]
pub struct Profile {
    /// 完成的比较轮数.
    rounds: u64,

    /// 每轮处理的体素个数 (单份体数据).
    voxels: u64,

    /// 最后一轮得到的 IoU 矩阵单元个数.
    cells: u64,

    /// 最后一轮被排除的越界体素个数 (两份体数据之和).
    out_of_range: u64,

    /// 最后一轮以 0.5 为阈值匹配成功的对象对个数.
    matched: Option<u64>,

    /// 最后一轮匹配对的平均 IoU.
    mean_matched_iou: Option<f64>,

    /// 比较本身花费的总时间 (不含数据准备).
    round_time: AccTimer,

    /// 整个任务花费的总时间 (包括复制体数据等准备工作).
    real_time: AccTimer,

    /// 最耗时的一轮所消耗的时间.
    most: Duration,
}

impl Profile {
    /// 初始化. `voxels` 为单份体数据的体素个数.
    #[inline]
    pub fn new(voxels: usize) -> Self {
        Self {
            rounds: 0,
            voxels: voxels as u64,
            cells: 0,
            out_of_range: 0,
            matched: None,
            mean_matched_iou: None,
            round_time: AccTimer::default(),
            real_time: AccTimer::default(),
            most: Duration::MAX,
        }
    }

    /// 开始新一轮计时.
    #[inline]
    pub fn round_start(&mut self) {
        self.round_time.start();
    }

    /// 结束一轮计时.
    #[inline]
    pub fn round_elapsed(&mut self) {
        let d = self.round_time.elapsed();
        self.rounds += 1;
        self.most = match self.most {
            Duration::MAX => d,
            once_duration => std::cmp::max(d, once_duration),
        };
    }

    /// 记录一轮比较的产出.
    #[inline]
    pub fn record(&mut self, cells: usize, out_of_range: u64, matched: usize, mean: Option<f64>) {
        self.cells = cells as u64;
        self.out_of_range = out_of_range;
        self.matched = Some(matched as u64);
        self.mean_matched_iou = mean;
    }

    /// 结束全部计时.
    #[inline]
    pub fn finish(mut self) -> Self {
        self.real_time.elapsed();
        self
    }

    #[inline]
    pub fn get_rounds(&self) -> u64 {
        self.rounds
    }

    #[inline]
    pub fn get_voxels(&self) -> u64 {
        self.voxels
    }

    #[inline]
    pub fn get_cells(&self) -> u64 {
        self.cells
    }

    #[inline]
    pub fn get_out_of_range(&self) -> u64 {
        self.out_of_range
    }

    #[inline]
    pub fn get_matched(&self) -> Option<u64> {
        self.matched
    }

    #[inline]
    pub fn get_mean_matched_iou(&self) -> Option<f64> {
        self.mean_matched_iou
    }

    /// 以微秒为单位获得比较本身的总花费自然时间.
    #[inline]
    pub fn get_round_time_us(&self) -> u64 {
        self.round_time.get_total_us()
    }

    /// 以微秒为单位获得算法运行到目前的总自然时间.
    #[inline]
    pub fn get_real_time_us(&self) -> u64 {
        self.real_time.get_total_us()
    }

    /// 以微秒为单位获得每轮的平均时间.
    #[inline]
    pub fn get_avg_round_time_us(&self) -> Option<f64> {
        match self.rounds {
            0 => None,
            rounds => Some(self.get_round_time_us() as f64 / rounds as f64),
        }
    }

    /// 获取最耗时的一轮所消耗的时间.
    ///
    /// 如果不存在任务, 则返回 `None`.
    pub fn get_most_time_consuming(&self) -> Option<Duration> {
        match self.most {
            Duration::MAX => None,
            d => Some(d),
        }
    }
}
