// ==========================================
// 联系人导入 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供持久化接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod contact_repo;
pub mod contact_repo_impl;
pub mod error;

// 重导出核心仓储
pub use contact_repo::ContactRepository;
pub use contact_repo_impl::{SqliteContactRepository, StoredContact};
pub use error::{RepositoryError, RepositoryResult};
