// ==========================================
// 联系人导入 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 表格联系人导入（预览 → 人工确认 → 提交）
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "en");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与导入规则
pub mod domain;

// 数据仓储层 - 持久化边界
pub mod repository;

// 导入层 - 解析/推断/规范化/执行
pub mod importer;

// 配置层 - 运行期配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// ==========================================
// 重导出核心类型
// ==========================================

pub use domain::{
    CandidateRecord, Gender, ImportOutcome, ImportPreview, ImportProgress, ImportSchema,
    ImportSession, RawGrid, RowError, SessionState,
};

pub use importer::{
    ContactImporter, ContactImporterImpl, ExecutorConfig, ImportError, ImportExecutor,
    ImportResult,
};

pub use repository::{ContactRepository, SqliteContactRepository};

pub use config::{ConfigManager, ImportConfigReader};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "contact-import";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
