//! Generation Worker - Background Generation Task Processor

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::application::generation::GenerationExecutor;
use crate::application::ports::GenerationMessage;

/// Worker 配置
#[derive(Debug, Clone)]
pub struct GenerationWorkerConfig {
    /// 最大并发生成数
    pub max_concurrent: usize,
}

impl Default for GenerationWorkerConfig {
    fn default() -> Self {
        Self { max_concurrent: 2 }
    }
}

/// 生成 Worker
///
/// 后台任务处理器，从队列消费生成消息并走内联执行路径
pub struct GenerationWorker {
    config: GenerationWorkerConfig,
    queue_receiver: mpsc::Receiver<GenerationMessage>,
    executor: Arc<GenerationExecutor>,
}

impl GenerationWorker {
    pub fn new(
        config: GenerationWorkerConfig,
        queue_receiver: mpsc::Receiver<GenerationMessage>,
        executor: Arc<GenerationExecutor>,
    ) -> Self {
        Self {
            config,
            queue_receiver,
            executor,
        }
    }

    /// 启动 Worker，队列关闭后返回
    pub async fn run(mut self) {
        tracing::info!(
            max_concurrent = self.config.max_concurrent,
            "GenerationWorker started"
        );

        // 使用 semaphore 控制并发
        let semaphore = Arc::new(tokio::sync::Semaphore::new(self.config.max_concurrent));
        let mut in_flight = tokio::task::JoinSet::new();

        while let Some(message) = self.queue_receiver.recv().await {
            let permit = match semaphore.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to acquire semaphore permit");
                    continue;
                }
            };

            let executor = self.executor.clone();
            in_flight.spawn(async move {
                let _permit = permit; // 持有 permit 直到任务完成
                Self::process(executor, message).await;
            });

            // 回收已结束的任务
            while in_flight.try_join_next().is_some() {}
        }

        while in_flight.join_next().await.is_some() {}
        tracing::info!("GenerationWorker stopped");
    }

    async fn process(executor: Arc<GenerationExecutor>, message: GenerationMessage) {
        let task_id = message.task_id;
        tracing::info!(
            task_id = %task_id,
            novel_id = %message.target.novel_id(),
            "Processing queued generation"
        );

        match executor.execute(task_id, message.target).await {
            Ok(task) => tracing::info!(
                task_id = %task_id,
                status = %task.status,
                "Queued generation finished"
            ),
            Err(e) => tracing::error!(
                task_id = %task_id,
                error = %e,
                "Queued generation failed"
            ),
        }
    }
}
