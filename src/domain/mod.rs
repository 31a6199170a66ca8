// ==========================================
// 联系人导入 - 领域模型层
// ==========================================
// 职责: 定义导入过程中的实体、值对象与导入规则
// 红线: 不含数据访问逻辑,不含文件解析逻辑
// ==========================================

pub mod contact;
pub mod schema;

// 重导出核心类型
pub use contact::{
    CandidateRecord, CanonicalField, ColumnRole, FailedSubmission, Gender, ImportOutcome,
    ImportPreview, ImportProgress, ImportSession, RawGrid, RowError, RowErrorKind, SessionState,
};
pub use schema::{FieldAliases, GenderGroup, ImportSchema, DEFAULT_SOURCE};
