// ==========================================
// 联系人导入 - 导入层
// ==========================================
// 职责: 表格文件 → 联系人预览 → 确认后提交
// 支持: Excel (.xlsx/.xls), CSV, 文档类（经远程抽取服务）
// ==========================================

// 模块声明
pub mod column_sampler;
pub mod contact_importer_impl;
pub mod contact_importer_trait;
pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod header_classifier;
pub mod import_executor;
pub mod reject_report;
pub mod row_normalizer;
pub mod table_extractor;

// 重导出核心类型
pub use column_sampler::{ColumnSampler, SampledColumns, DEFAULT_SAMPLE_ROWS};
pub use contact_importer_impl::{build_preview, ContactImporterImpl, PreparedGrid};
pub use error::{ImportError, ImportResult};
pub use field_mapper::{FieldIndices, FieldMapper};
pub use file_parser::{CsvParser, DocumentParser, ExcelParser, UniversalFileParser};
pub use header_classifier::{HeaderClassifier, HeaderDecision};
pub use import_executor::{ExecutorConfig, ImportExecutor};
pub use row_normalizer::{normalize_rows, RowNormalizer};
pub use table_extractor::HttpTableExtractor;

// 重导出 Trait 接口
pub use contact_importer_trait::{ContactImporter, ExtractionResponse, FileParser, TableExtractor};
