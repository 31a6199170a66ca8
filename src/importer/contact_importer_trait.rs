// ==========================================
// 联系人导入 - 导入接口 Trait
// ==========================================
// 职责: 定义导入管道各边界的接口（不包含实现）
// ==========================================

use crate::domain::contact::{ImportSession, RawGrid};
use crate::importer::error::ImportResult;
use async_trait::async_trait;

// ==========================================
// ContactImporter Trait
// ==========================================
// 用途: 导入主接口（读取 → 表头判定 → 列推断 → 映射 → 规范化）
// 实现者: ContactImporterImpl
#[async_trait]
pub trait ContactImporter: Send + Sync {
    /// 读取上传文件并生成待审阅的导入会话
    ///
    /// # 参数
    /// - file_name: 原始文件名（用于按扩展名分派）
    /// - bytes: 文件内容
    ///
    /// # 返回
    /// - Ok(ImportSession): 预览 + 行级错误
    /// - Err: 致命错误（格式不支持 / 无数据 / 无姓名列 / 抽取失败）
    async fn prepare(&self, file_name: &str, bytes: &[u8]) -> ImportResult<ImportSession>;
}

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 同步格式解析（CSV / Excel）
// 实现者: CsvParser, ExcelParser
pub trait FileParser: Send + Sync {
    /// 将文件字节解析为 RawGrid
    ///
    /// # 返回
    /// - Ok(RawGrid): 完整的单元格表
    /// - Err: 解析失败（不返回截断结果）
    fn parse_to_grid(&self, bytes: &[u8]) -> ImportResult<RawGrid>;
}

/// 远程抽取服务的响应契约
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionResponse {
    Data(Vec<Vec<String>>),
    Error(String),
}

// ==========================================
// TableExtractor Trait
// ==========================================
// 用途: 文档类文件（扫描件 / 结构化文本）交给外部服务抽取表格
// 实现者: HttpTableExtractor；测试中可替换为内存实现
#[async_trait]
pub trait TableExtractor: Send + Sync {
    /// 提交文件内容，返回 `{data}` 或 `{error}`
    ///
    /// # 返回
    /// - Ok(ExtractionResponse): 服务给出了明确答复
    /// - Err: 传输层失败
    async fn extract(&self, file_name: &str, bytes: &[u8]) -> ImportResult<ExtractionResponse>;
}
