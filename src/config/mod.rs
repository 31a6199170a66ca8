// ==========================================
// 联系人导入 - 配置层
// ==========================================
// 职责: 运行期配置读取（抽样行数、并发度、规则覆写等）
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod import_config_trait;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager};
pub use import_config_trait::ImportConfigReader;
