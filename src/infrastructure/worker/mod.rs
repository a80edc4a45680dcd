//! Worker Layer - Background Task Processing
//!
//! 实现 GenerationWorker，处理队列中的生成任务

mod generation_worker;

pub use generation_worker::{GenerationWorker, GenerationWorkerConfig};
