//! Task Queries - 供轮询方查询生成任务状态

use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct GetTask {
    pub task_id: Uuid,
}

/// 进行中的任务（PENDING / PROCESSING）
#[derive(Debug, Clone)]
pub struct ListActiveTasks;

/// 某个生成单元（小说或章节）的任务，最新在前
#[derive(Debug, Clone)]
pub struct ListTasksBySubject {
    pub subject_id: Uuid,
}

/// 长时间停留在 PROCESSING 的任务
#[derive(Debug, Clone)]
pub struct ListStaleTasks {
    pub older_than_secs: u64,
}
