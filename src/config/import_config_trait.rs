// ==========================================
// 联系人导入 - 导入配置读取 Trait
// ==========================================
// 职责: 定义导入模块所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::domain::schema::ImportSchema;
use crate::importer::error::ImportResult;
use async_trait::async_trait;

// ==========================================
// ImportConfigReader Trait
// ==========================================
// 用途: 导入模块所需的配置读取接口
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait ImportConfigReader: Send + Sync {
    // ===== 预览配置 =====

    /// 无表头时列推断的抽样行数
    ///
    /// # 默认值
    /// - 5
    async fn get_sample_rows(&self) -> ImportResult<usize>;

    /// 导入规则覆写（JSON 形式的 ImportSchema）
    ///
    /// # 返回
    /// - None: 未配置，使用内置规则
    async fn get_schema_override(&self) -> ImportResult<Option<ImportSchema>>;

    /// 未提供来源时写入的默认来源
    ///
    /// # 返回
    /// - None: 未配置，沿用导入规则中的 default_source（内置为 "Importação"）
    async fn get_default_source(&self) -> ImportResult<Option<String>>;

    // ===== 执行配置 =====

    /// 执行器并发度（最小 1）
    ///
    /// # 默认值
    /// - 1（严格按输入顺序逐条提交）
    async fn get_executor_concurrency(&self) -> ImportResult<usize>;

    // ===== 外部服务 =====

    /// 文档类文件的表格抽取服务地址
    ///
    /// # 返回
    /// - None: 未配置，文档类文件将以 UnsupportedContent 拒绝
    async fn get_extractor_url(&self) -> ImportResult<Option<String>>;

    /// 生效的导入规则: 覆写规则（或内置规则）+ 默认来源
    async fn get_effective_schema(&self) -> ImportResult<ImportSchema> {
        let mut schema = self.get_schema_override().await?.unwrap_or_default();
        if let Some(source) = self.get_default_source().await? {
            schema.default_source = source;
        }
        Ok(schema)
    }
}
