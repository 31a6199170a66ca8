// ==========================================
// 联系人导入 - 联系人 Repository Trait
// ==========================================
// 职责: 持久化边界（执行器逐条提交的目标）
// 红线: Repository 不含业务规则，只做写入/查询
// ==========================================

use crate::domain::contact::CandidateRecord;
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;

// ==========================================
// ContactRepository Trait
// ==========================================
// 实现者: SqliteContactRepository；远程 API 适配器可自行实现
#[async_trait]
pub trait ContactRepository: Send + Sync {
    /// 写入一条已确认的联系人
    ///
    /// # 返回
    /// - Ok(String): 新记录 ID
    /// - Err: 被拒绝或写入失败（由执行器计入失败数，不中断批次）
    async fn insert_contact(&self, record: &CandidateRecord) -> RepositoryResult<String>;

    /// 已存储联系人数量
    async fn count_contacts(&self) -> RepositoryResult<usize>;
}
