// ==========================================
// 联系人导入 - 导入执行器
// ==========================================
// 职责: 操作员确认后，将预览列表逐条提交到持久化边界
// 语义:
// - 单条失败只计数，不中断、不回滚后续提交
// - 进度百分比单调不减，最终必为 100
// - 并发度默认 1（按输入顺序逐条 await）
// ==========================================

use crate::domain::contact::{
    CandidateRecord, FailedSubmission, ImportOutcome, ImportProgress, ImportSession, SessionState,
};
use crate::importer::error::{ImportError, ImportResult};
use crate::repository::contact_repo::ContactRepository;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, instrument, warn};

/// 执行器配置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutorConfig {
    /// 同时在途的提交数（最小 1）
    pub concurrency: usize,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self { concurrency: 1 }
    }
}

impl ExecutorConfig {
    pub fn with_concurrency(concurrency: usize) -> Self {
        Self {
            concurrency: concurrency.max(1),
        }
    }
}

// ==========================================
// ImportExecutor
// ==========================================
pub struct ImportExecutor {
    repo: Arc<dyn ContactRepository>,
    config: ExecutorConfig,
}

impl ImportExecutor {
    pub fn new(repo: Arc<dyn ContactRepository>, config: ExecutorConfig) -> Self {
        Self { repo, config }
    }

    pub fn config(&self) -> ExecutorConfig {
        self.config
    }

    /// 提交一批候选联系人
    ///
    /// # 参数
    /// - records: 预览列表（按输入顺序）
    /// - progress: 进度通道（可选；接收端关闭后静默忽略）
    ///
    /// # 返回
    /// - ImportOutcome: 成功数、失败数与失败明细
    pub async fn execute(
        &self,
        records: &[CandidateRecord],
        progress: Option<&UnboundedSender<ImportProgress>>,
    ) -> ImportOutcome {
        self.submit_all(records, |event| emit(progress, event)).await
    }

    /// 逐条提交，每处理一条回调一次进度
    #[instrument(skip(self, records, on_progress), fields(total = records.len(), concurrency = self.config.concurrency))]
    pub(crate) async fn submit_all(
        &self,
        records: &[CandidateRecord],
        mut on_progress: impl FnMut(ImportProgress),
    ) -> ImportOutcome {
        let total = records.len();
        let mut outcome = ImportOutcome::default();

        if total == 0 {
            on_progress(ImportProgress {
                processed: 0,
                total: 0,
                percent: 100,
                success: 0,
                errors: 0,
            });
            info!("没有待提交的联系人");
            return outcome;
        }

        let repo = &self.repo;
        let mut submissions = stream::iter(records.iter().enumerate())
            .map(|(position, record)| async move {
                (position, record, repo.insert_contact(record).await)
            })
            .buffer_unordered(self.config.concurrency.max(1));

        let mut processed = 0usize;
        while let Some((position, record, result)) = submissions.next().await {
            processed += 1;
            match result {
                Ok(_) => outcome.success += 1,
                Err(e) => {
                    warn!(
                        row_number = record.row_number,
                        name = %record.name,
                        error = %e,
                        "联系人提交失败，继续后续提交"
                    );
                    outcome.errors += 1;
                    outcome.failed.push(FailedSubmission {
                        position,
                        row_number: record.row_number,
                        name: record.name.clone(),
                        reason: e.to_string(),
                    });
                }
            }

            on_progress(ImportProgress {
                processed,
                total,
                percent: ImportProgress::percent_of(processed, total),
                success: outcome.success,
                errors: outcome.errors,
            });
        }

        // 并发完成顺序不定，失败明细按输入顺序给出
        outcome.failed.sort_by_key(|f| f.position);

        info!(
            success = outcome.success,
            errors = outcome.errors,
            "导入执行完成"
        );
        outcome
    }

    /// 消费会话中的预览（仅一次）
    ///
    /// # 返回
    /// - Err(SessionAlreadyExecuted): 会话已执行或已取消
    pub async fn run_session(
        &self,
        session: &mut ImportSession,
        progress: Option<&UnboundedSender<ImportProgress>>,
    ) -> ImportResult<ImportOutcome> {
        if session.state != SessionState::Previewed {
            return Err(ImportError::SessionAlreadyExecuted(session.session_id.clone()));
        }

        // 先置状态，保证同一预览不会被二次提交
        session.state = SessionState::Executed;

        let preview = &session.preview;
        let session_progress = &mut session.progress;
        let outcome = self
            .submit_all(preview, |event| {
                *session_progress = event.percent;
                emit(progress, event);
            })
            .await;
        session.result = Some(outcome.clone());
        Ok(outcome)
    }
}

fn emit(progress: Option<&UnboundedSender<ImportProgress>>, event: ImportProgress) {
    if let Some(tx) = progress {
        let _ = tx.send(event);
    }
}
