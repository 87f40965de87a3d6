//! 消融实验: 顺序累加 vs 按切片并行累加 vs 先压缩标签再比较.

mod algos;
mod result;
mod runner;

fn main() {
    simple_logger::SimpleLogger::new()
        .with_level(log::LevelFilter::Info)
        .env()
        .init()
        .expect("Logger initialization error");

    runner::run().analyze();
}
